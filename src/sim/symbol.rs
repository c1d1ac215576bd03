//! Reel symbols and the seeded source that draws them

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// A reel symbol. Equality is the only relation that matters for paylines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Cherry,
    Bell,
    Lemon,
    Orange,
    Star,
    Seven,
}

impl Symbol {
    /// The full alphabet, in a fixed order
    pub const ALL: [Symbol; 6] = [
        Symbol::Cherry,
        Symbol::Bell,
        Symbol::Lemon,
        Symbol::Orange,
        Symbol::Star,
        Symbol::Seven,
    ];

    /// Asset alias of the symbol's image
    pub fn alias(&self) -> &'static str {
        match self {
            Symbol::Cherry => "cherry",
            Symbol::Bell => "bell",
            Symbol::Lemon => "lemon",
            Symbol::Orange => "orange",
            Symbol::Star => "star",
            Symbol::Seven => "seven",
        }
    }

    /// Text fallback used when images are unavailable
    pub fn glyph(&self) -> &'static str {
        match self {
            Symbol::Cherry => "🍒",
            Symbol::Bell => "🔔",
            Symbol::Lemon => "🍋",
            Symbol::Orange => "🍊",
            Symbol::Star => "⭐",
            Symbol::Seven => "7️⃣",
        }
    }
}

/// Seeded randomness for the game: uniform symbols and the bonus roll
#[derive(Debug, Clone)]
pub struct SymbolSource {
    seed: u64,
    rng: Pcg32,
}

impl SymbolSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed this source was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw a uniformly random symbol
    pub fn next_symbol(&mut self) -> Symbol {
        Symbol::ALL[self.rng.random_range(0..Symbol::ALL.len())]
    }

    /// Independent Bernoulli draw. `p` is clamped to `[0, 1]`.
    pub fn chance(&mut self, p: f64) -> bool {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self.rng.random_bool(p)
    }

    /// Fill a strip of `len` random symbols
    pub fn strip(&mut self, len: usize) -> Vec<Symbol> {
        (0..len).map(|_| self.next_symbol()).collect()
    }
}
