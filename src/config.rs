//! Game rules and timings
//!
//! Defaults reproduce the classic three-reel machine. A config can also be parsed from
//! JSON, with missing fields falling back to the defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{PayLine, ReelMotion};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("a machine needs at least one reel")]
    NoReels,
    #[error("reel strip of {len} slots is too short (minimum {min})")]
    StripTooShort { len: usize, min: usize },
    #[error("bonus probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
    #[error("stake {0} is not one of the offered bets")]
    StakeNotOffered(u64),
    #[error("stake can only change while the machine is idle")]
    NotIdle,
    #[error("reel speed must be positive and finite (base {base}, step {step})")]
    InvalidSpeed { base: f32, step: f32 },
    #[error("invalid reel motion (decay {decay}, stop threshold {threshold})")]
    InvalidMotion { decay: f32, threshold: f32 },
    #[error("invalid timings (stop {stop_delay}, stagger {stagger}, display {display})")]
    InvalidTiming {
        stop_delay: f64,
        stagger: f64,
        display: f64,
    },
    #[error("invalid config JSON: {0}")]
    Parse(String),
}

/// Complete machine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of reels
    pub reel_count: usize,
    /// Slots per reel (visible rows plus overscan)
    pub strip_len: usize,
    /// Session starting balance
    pub starting_balance: u64,
    /// Stake debited per paid round
    pub stake: u64,
    /// Stakes the player may choose from
    pub bet_options: Vec<u64>,
    /// Speed of reel 0 (slots per frame)
    pub base_speed: f32,
    /// Extra speed per reel index
    pub speed_step: f32,
    /// Delay before reel 0 is asked to stop (ms)
    pub stop_delay_ms: f64,
    /// Extra stop delay per reel index (ms)
    pub stop_stagger_ms: f64,
    /// Reel deceleration tuning
    pub motion: ReelMotion,
    /// How long the round result stays up before the next round may start (ms)
    pub result_display_ms: f64,
    /// Chance per round of a bonus free-spin grant
    pub bonus_probability: f64,
    /// Free spins granted by a successful bonus roll
    pub bonus_free_spins: u32,
    /// Rounds played when autoplay is switched on
    pub max_autoplay_rounds: u32,
    /// Paylines, evaluated in order
    pub paylines: Vec<PayLine>,
    /// RNG seed for symbols and bonus rolls
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            reel_count: REEL_COUNT,
            strip_len: STRIP_LEN,
            starting_balance: STARTING_BALANCE,
            stake: DEFAULT_STAKE,
            bet_options: BET_OPTIONS.to_vec(),
            base_speed: BASE_REEL_SPEED,
            speed_step: REEL_SPEED_STEP,
            stop_delay_ms: STOP_DELAY_MS,
            stop_stagger_ms: STOP_STAGGER_MS,
            motion: ReelMotion::default(),
            result_display_ms: RESULT_DISPLAY_MS,
            bonus_probability: BONUS_PROBABILITY,
            bonus_free_spins: BONUS_FREE_SPINS,
            max_autoplay_rounds: MAX_AUTOPLAY_ROUNDS,
            paylines: PayLine::standard(),
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Smallest strip that still holds the visible window below the top overscan slot
    pub const MIN_STRIP_LEN: usize = VISIBLE_ROWS + 1;

    /// Default rules with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Speed of reel `index` at spin start
    pub fn reel_speed(&self, index: usize) -> f32 {
        self.base_speed + index as f32 * self.speed_step
    }

    /// Delay before reel `index` is asked to stop
    pub fn stop_delay(&self, index: usize) -> f64 {
        self.stop_delay_ms + index as f64 * self.stop_stagger_ms
    }

    pub fn is_bet_offered(&self, amount: u64) -> bool {
        self.bet_options.contains(&amount)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reel_count == 0 {
            return Err(ConfigError::NoReels);
        }
        if self.strip_len < Self::MIN_STRIP_LEN {
            return Err(ConfigError::StripTooShort {
                len: self.strip_len,
                min: Self::MIN_STRIP_LEN,
            });
        }
        if !(0.0..=1.0).contains(&self.bonus_probability) {
            return Err(ConfigError::InvalidProbability(self.bonus_probability));
        }
        if !self.is_bet_offered(self.stake) {
            return Err(ConfigError::StakeNotOffered(self.stake));
        }
        let speeds_ok = self.base_speed.is_finite()
            && self.speed_step.is_finite()
            && self.base_speed > 0.0
            && self.speed_step >= 0.0;
        if !speeds_ok {
            return Err(ConfigError::InvalidSpeed {
                base: self.base_speed,
                step: self.speed_step,
            });
        }
        let ReelMotion {
            decay,
            stop_threshold,
            ..
        } = self.motion;
        if !(decay > 0.0 && decay < 1.0 && stop_threshold > 0.0 && stop_threshold.is_finite()) {
            return Err(ConfigError::InvalidMotion {
                decay,
                threshold: stop_threshold,
            });
        }
        // Stops must fire in reel order, and only after the spin started
        let timings = [
            self.stop_delay_ms,
            self.stop_stagger_ms,
            self.result_display_ms,
        ];
        if !timings.iter().all(|t| t.is_finite() && *t >= 0.0) {
            return Err(ConfigError::InvalidTiming {
                stop_delay: self.stop_delay_ms,
                stagger: self.stop_stagger_ms,
                display: self.result_display_ms,
            });
        }
        Ok(())
    }
}
