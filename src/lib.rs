//! Lucky Reels - A three-reel browser slot machine
//!
//! Core modules:
//! - `sim`: Deterministic game core (reels, paylines, ledger, state machine, spin controller)
//! - `config`: Tunable game rules and timings
//! - `settings`: Player preferences persisted in LocalStorage
//! - `loader`: Asset manifest and loading progress

pub mod config;
pub mod loader;
pub mod settings;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use settings::{Settings, SpinSpeed};

/// Game configuration constants
pub mod consts {
    /// Host frame length the reel speeds are tuned against (60 Hz)
    pub const FRAME_MS: f32 = 16.6667;
    /// Maximum frames a single update may advance (a stalled tab must not teleport the reels)
    pub const MAX_FRAME_DELTA: f32 = 6.0;

    /// Reel layout
    pub const REEL_COUNT: usize = 3;
    pub const VISIBLE_ROWS: usize = 3;
    /// Visible rows plus two overscan slots above and below
    pub const STRIP_LEN: usize = VISIBLE_ROWS + 4;

    /// Economy defaults
    pub const STARTING_BALANCE: u64 = 100;
    pub const DEFAULT_STAKE: u64 = 10;
    pub const BET_OPTIONS: [u64; 4] = [10, 25, 50, 100];

    /// Reel motion (slots per frame)
    pub const BASE_REEL_SPEED: f32 = 0.5;
    pub const REEL_SPEED_STEP: f32 = 0.15;
    /// Multiplicative speed decay per frame while stopping
    pub const REEL_DECAY: f32 = 0.95;
    /// Speed at or below which a stopping reel snaps to rest
    pub const REEL_STOP_THRESHOLD: f32 = 0.05;

    /// Round timings (ms)
    pub const STOP_DELAY_MS: f64 = 1000.0;
    pub const STOP_STAGGER_MS: f64 = 600.0;
    pub const RESULT_DISPLAY_MS: f64 = 1500.0;

    /// Bonus and autoplay
    pub const BONUS_PROBABILITY: f64 = 0.2;
    pub const BONUS_FREE_SPINS: u32 = 1;
    pub const MAX_AUTOPLAY_ROUNDS: u32 = 10;
}

/// Convert a host frame delta in milliseconds to reel frames, clamped to `[0, MAX_FRAME_DELTA]`
#[inline]
pub fn frames_from_ms(delta_ms: f64) -> f32 {
    use consts::{FRAME_MS, MAX_FRAME_DELTA};
    if !delta_ms.is_finite() {
        return 0.0;
    }
    (delta_ms as f32 / FRAME_MS).clamp(0.0, MAX_FRAME_DELTA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_from_ms() {
        assert!((frames_from_ms(16.6667) - 1.0).abs() < 0.0001);
        assert!((frames_from_ms(33.3334) - 2.0).abs() < 0.0001);
        assert_eq!(frames_from_ms(-5.0), 0.0);
        assert_eq!(frames_from_ms(10_000.0), consts::MAX_FRAME_DELTA);
        assert_eq!(frames_from_ms(f64::NAN), 0.0);
    }
}
