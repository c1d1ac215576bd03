//! Asset manifest and loading progress
//!
//! The host loads every manifest entry before the machine leaves `Loading`. Progress is
//! tracked here so the bar and the completion check don't depend on the browser.

use serde::{Deserialize, Serialize};

use crate::sim::Symbol;

/// Background aliases
pub const MAIN_BG: &str = "mainBG";
pub const SECONDARY_BG: &str = "secondaryBG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub alias: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub entries: Vec<AssetEntry>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::standard()
    }
}

impl AssetManifest {
    /// The six symbol images followed by the two backgrounds
    pub fn standard() -> Self {
        let symbols = Symbol::ALL.iter().map(|symbol| AssetEntry {
            alias: symbol.alias().to_string(),
            src: format!("assets/{}.png", symbol.alias()),
        });
        let backgrounds = [
            (MAIN_BG, "assets/main_bg.png"),
            (SECONDARY_BG, "assets/secondary_bg.png"),
        ]
        .into_iter()
        .map(|(alias, src)| AssetEntry {
            alias: alias.to_string(),
            src: src.to_string(),
        });
        Self {
            entries: symbols.chain(backgrounds).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn src(&self, alias: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.alias == alias)
            .map(|e| e.src.as_str())
    }

    pub fn symbol_src(&self, symbol: Symbol) -> Option<&str> {
        self.src(symbol.alias())
    }
}

/// Counts finished loads. Each asset should be reported once, either loaded or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadProgress {
    pub total: usize,
    pub loaded: usize,
    pub failed: usize,
}

impl LoadProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            loaded: 0,
            failed: 0,
        }
    }

    pub fn mark_loaded(&mut self) {
        if !self.all_reported() {
            self.loaded += 1;
        }
    }

    pub fn mark_failed(&mut self) {
        if !self.all_reported() {
            self.failed += 1;
        }
    }

    fn all_reported(&self) -> bool {
        self.loaded + self.failed >= self.total
    }

    /// Fraction of assets loaded, in [0, 1]. An empty manifest counts as fully loaded.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        (self.loaded as f32 / self.total as f32).clamp(0.0, 1.0)
    }

    /// Every asset loaded successfully
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.loaded >= self.total
    }

    pub fn has_failed(&self) -> bool {
        self.failed > 0
    }
}
