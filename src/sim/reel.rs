//! Reel model: a scrolling strip of symbol slots
//!
//! Position is measured in slot heights. Slot `i` is drawn at row offset `i - position`,
//! so a settled reel (position 0) shows every slot on its resting row.

use serde::{Deserialize, Serialize};

use super::symbol::{Symbol, SymbolSource};
use crate::consts::{REEL_DECAY, REEL_STOP_THRESHOLD};

/// What happens to the scroll overflow when the front slot is recycled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapPolicy {
    /// Keep the remainder past the slot boundary (smooth cadence)
    #[default]
    Carry,
    /// Drop the remainder and restart the slot at 0 (classic look, visible hitch)
    Reset,
}

/// Deceleration tuning shared by every reel of a machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelMotion {
    /// Speed multiplier applied every frame while stopping
    pub decay: f32,
    /// Speed at or below which a stopping reel settles
    pub stop_threshold: f32,
    pub wrap: WrapPolicy,
}

impl Default for ReelMotion {
    fn default() -> Self {
        Self {
            decay: REEL_DECAY,
            stop_threshold: REEL_STOP_THRESHOLD,
            wrap: WrapPolicy::Carry,
        }
    }
}

/// A single reel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reel {
    /// Symbol slots, front (index 0) at the top of the strip
    slots: Vec<Symbol>,
    /// Scroll offset in slot heights, in [0, 1)
    position: f32,
    /// Slots advanced per frame
    speed: f32,
    spinning: bool,
    stopping: bool,
    motion: ReelMotion,
}

impl Reel {
    /// Create a resting reel with `len` random slots
    pub fn new(len: usize, source: &mut SymbolSource, motion: ReelMotion) -> Self {
        Self::from_slots(source.strip(len), motion)
    }

    /// Create a resting reel with the given slots
    pub fn from_slots(slots: Vec<Symbol>, motion: ReelMotion) -> Self {
        Self {
            slots,
            position: 0.0,
            speed: 0.0,
            spinning: false,
            stopping: false,
            motion,
        }
    }

    pub fn slots(&self) -> &[Symbol] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping
    }

    /// True when the reel is not moving
    pub fn is_at_rest(&self) -> bool {
        !self.spinning
    }

    /// Row offset (in slot heights) at which slot `index` is currently drawn
    #[inline]
    pub fn slot_offset(&self, index: usize) -> f32 {
        index as f32 - self.position
    }

    /// Start spinning at `speed` slots per frame
    pub fn begin_spin(&mut self, speed: f32) {
        self.spinning = true;
        self.stopping = false;
        self.speed = speed.max(0.0);
    }

    /// Ask the reel to decelerate; it settles on a later `advance`
    pub fn request_stop(&mut self) {
        if self.spinning {
            self.stopping = true;
        }
    }

    /// Advance by `delta_frames`. Returns true exactly on the frame the reel settles.
    pub fn advance(&mut self, delta_frames: f32, source: &mut SymbolSource) -> bool {
        if !self.spinning {
            return false;
        }

        self.position += self.speed * delta_frames.max(0.0);
        while self.position >= 1.0 {
            self.recycle_front(source);
            match self.motion.wrap {
                WrapPolicy::Carry => self.position -= 1.0,
                WrapPolicy::Reset => self.position = 0.0,
            }
        }

        if !self.stopping {
            return false;
        }

        if self.speed > self.motion.stop_threshold {
            self.speed *= self.motion.decay;
            false
        } else {
            self.settle();
            true
        }
    }

    /// Move the front slot to the back with a fresh symbol
    fn recycle_front(&mut self, source: &mut SymbolSource) {
        if self.slots.is_empty() {
            return;
        }
        self.slots.rotate_left(1);
        if let Some(last) = self.slots.last_mut() {
            *last = source.next_symbol();
        }
    }

    /// Snap to the resting rows
    fn settle(&mut self) {
        self.position = 0.0;
        self.speed = 0.0;
        self.spinning = false;
        self.stopping = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn motion(wrap: WrapPolicy) -> ReelMotion {
        ReelMotion {
            wrap,
            ..Default::default()
        }
    }

    #[test]
    fn test_idle_reel_does_not_move() {
        let mut source = SymbolSource::new(1);
        let mut reel = Reel::new(7, &mut source, ReelMotion::default());
        let before = reel.slots().to_vec();
        assert!(!reel.advance(10.0, &mut source));
        assert_eq!(reel.slots(), before.as_slice());
        assert_eq!(reel.position(), 0.0);
    }

    #[test]
    fn test_recycle_shifts_slots_up() {
        let mut source = SymbolSource::new(2);
        let slots = vec![
            Symbol::Cherry,
            Symbol::Bell,
            Symbol::Lemon,
            Symbol::Orange,
            Symbol::Star,
        ];
        let mut reel = Reel::from_slots(slots.clone(), ReelMotion::default());
        reel.begin_spin(0.5);
        reel.advance(1.0, &mut source);
        assert_eq!(reel.slots(), slots.as_slice());
        reel.advance(1.0, &mut source);
        // Front slot left the top, everything moved up a row
        assert_eq!(&reel.slots()[..4], &slots[1..]);
        assert_eq!(reel.len(), 5);
    }

    #[test]
    fn test_carry_keeps_remainder() {
        let mut source = SymbolSource::new(3);
        let mut reel = Reel::new(7, &mut source, motion(WrapPolicy::Carry));
        reel.begin_spin(0.4);
        reel.advance(3.0, &mut source);
        assert!((reel.position() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_reset_drops_remainder() {
        let mut source = SymbolSource::new(3);
        let mut reel = Reel::new(7, &mut source, motion(WrapPolicy::Reset));
        reel.begin_spin(0.4);
        reel.advance(3.0, &mut source);
        assert_eq!(reel.position(), 0.0);
    }

    #[test]
    fn test_large_delta_recycles_multiple_slots() {
        let mut source = SymbolSource::new(4);
        let slots = vec![Symbol::Cherry, Symbol::Bell, Symbol::Lemon, Symbol::Seven];
        let mut reel = Reel::from_slots(slots, motion(WrapPolicy::Carry));
        reel.begin_spin(1.0);
        reel.advance(2.5, &mut source);
        assert_eq!(reel.slots()[0], Symbol::Lemon);
        assert_eq!(reel.slots()[1], Symbol::Seven);
        assert!((reel.position() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_stop_decays_then_settles_once() {
        let mut source = SymbolSource::new(5);
        let mut reel = Reel::new(7, &mut source, ReelMotion::default());
        reel.begin_spin(0.8);
        reel.request_stop();

        let mut settles = 0;
        let mut last_speed = reel.speed();
        for _ in 0..1000 {
            if reel.advance(1.0, &mut source) {
                settles += 1;
            }
            if reel.is_spinning() {
                assert!(reel.speed() < last_speed);
                last_speed = reel.speed();
            }
        }

        assert_eq!(settles, 1);
        assert!(reel.is_at_rest());
        assert!(!reel.is_stopping());
        assert_eq!(reel.speed(), 0.0);
        assert_eq!(reel.position(), 0.0);
        for i in 0..reel.len() {
            assert_eq!(reel.slot_offset(i), i as f32);
        }
    }

    #[test]
    fn test_slow_reel_settles_on_first_stopping_frame() {
        let mut source = SymbolSource::new(6);
        let mut reel = Reel::new(7, &mut source, ReelMotion::default());
        reel.begin_spin(0.01);
        assert!(!reel.advance(1.0, &mut source));
        reel.request_stop();
        assert!(reel.advance(1.0, &mut source));
    }

    #[test]
    fn test_stop_request_ignored_at_rest() {
        let mut source = SymbolSource::new(6);
        let mut reel = Reel::new(7, &mut source, ReelMotion::default());
        reel.request_stop();
        assert!(!reel.is_stopping());
        assert!(!reel.advance(1.0, &mut source));
    }

    proptest! {
        #[test]
        fn prop_strip_length_and_position_hold(
            seed in any::<u64>(),
            len in 1usize..12,
            speed in 0.01f32..2.0,
            deltas in proptest::collection::vec(0.0f32..6.0, 1..200),
            reset in any::<bool>(),
        ) {
            let wrap = if reset { WrapPolicy::Reset } else { WrapPolicy::Carry };
            let mut source = SymbolSource::new(seed);
            let mut reel = Reel::new(len, &mut source, motion(wrap));
            reel.begin_spin(speed);
            for delta in deltas {
                reel.advance(delta, &mut source);
                prop_assert_eq!(reel.len(), len);
                prop_assert!(reel.position() >= 0.0 && reel.position() < 1.0);
            }
        }
    }
}
