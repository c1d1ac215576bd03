//! Player preferences
//!
//! Persisted in LocalStorage. Only preferences live here; balance and free spins are
//! session-only and reset on reload.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::consts::{DEFAULT_STAKE, MAX_AUTOPLAY_ROUNDS};

/// Spin speed presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpinSpeed {
    #[default]
    Normal,
    Turbo,
}

impl SpinSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpinSpeed::Normal => "Normal",
            SpinSpeed::Turbo => "Turbo",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(SpinSpeed::Normal),
            "turbo" | "fast" => Some(SpinSpeed::Turbo),
            _ => None,
        }
    }

    /// Multiplier for stop delays and result display time
    pub fn delay_scale(&self) -> f64 {
        match self {
            SpinSpeed::Normal => 1.0,
            SpinSpeed::Turbo => 0.5,
        }
    }

    /// Multiplier for reel speeds
    pub fn speed_scale(&self) -> f32 {
        match self {
            SpinSpeed::Normal => 1.0,
            SpinSpeed::Turbo => 1.5,
        }
    }
}

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Spin speed preset
    pub spin_speed: SpinSpeed,
    /// Last chosen stake
    pub stake: u64,
    /// Rounds played per autoplay session
    pub autoplay_rounds: u32,
    /// Skip the bonus character animation
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            spin_speed: SpinSpeed::Normal,
            stake: DEFAULT_STAKE,
            autoplay_rounds: MAX_AUTOPLAY_ROUNDS,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Apply preferences to a config. A stake the config doesn't offer is ignored.
    pub fn apply(&self, config: &mut GameConfig) {
        let delay = self.spin_speed.delay_scale();
        let speed = self.spin_speed.speed_scale();
        config.stop_delay_ms *= delay;
        config.stop_stagger_ms *= delay;
        config.result_display_ms *= delay;
        config.base_speed *= speed;
        config.speed_step *= speed;

        if config.is_bet_offered(self.stake) {
            config.stake = self.stake;
        } else {
            log::warn!(
                "Saved stake {} not offered, keeping {}",
                self.stake,
                config.stake
            );
        }
        config.max_autoplay_rounds = self.autoplay_rounds;
    }

    /// Whether the bonus character animation should play
    pub fn bonus_animation(&self) -> bool {
        !self.reduced_motion
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "lucky_reels_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
