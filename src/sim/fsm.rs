//! Game state machine with change notifications

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Current phase of the slot machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Assets loading, no input accepted
    Loading,
    /// Waiting for a spin
    Idle,
    /// Reels in motion
    Spinning,
    /// Every stop has been requested, reels decelerating
    Stopping,
    /// Evaluating and showing the round result
    ShowWin,
    /// A free-spin credit was consumed and its spin is about to start
    FreeSpin,
}

impl GameState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Loading => "LOADING",
            GameState::Idle => "IDLE",
            GameState::Spinning => "SPINNING",
            GameState::Stopping => "STOPPING",
            GameState::ShowWin => "SHOW_WIN",
            GameState::FreeSpin => "FREE_SPIN",
        }
    }

    /// States in which a spin request is accepted
    pub fn accepts_spin(&self) -> bool {
        matches!(self, GameState::Idle | GameState::FreeSpin)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A published state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: GameState,
    pub to: GameState,
}

/// Shared handle to a transition listener
pub type Listener = Rc<dyn Fn(Transition)>;

/// Handle returned by [`StateMachine::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

pub struct StateMachine {
    state: GameState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u32,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: GameState::Loading,
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Move to `to` and notify listeners. Returns false (no notification) if already there.
    pub fn transition(&mut self, to: GameState) -> bool {
        if self.state == to {
            return false;
        }
        let change = Transition {
            from: self.state,
            to,
        };
        self.state = to;
        log::info!("FSM: {} -> {}", change.from, change.to);

        // Iterate a snapshot so the list may change while listeners run
        let listeners: Vec<Listener> = self.listeners.iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(change);
        }
        true
    }

    /// Register a listener. Subscribing the same handle twice returns the original id.
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        if let Some((id, _)) = self
            .listeners
            .iter()
            .find(|(_, existing)| Rc::ptr_eq(existing, &listener))
        {
            return *id;
        }
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<Transition>>>, Listener) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let listener: Listener = Rc::new(move |t| sink.borrow_mut().push(t));
        (log, listener)
    }

    #[test]
    fn test_starts_loading() {
        assert_eq!(StateMachine::new().state(), GameState::Loading);
    }

    #[test]
    fn test_transition_notifies_with_old_state() {
        let mut fsm = StateMachine::new();
        let (log, listener) = recorder();
        fsm.subscribe(listener);

        assert!(fsm.transition(GameState::Idle));
        assert!(fsm.transition(GameState::Spinning));
        assert_eq!(
            *log.borrow(),
            vec![
                Transition {
                    from: GameState::Loading,
                    to: GameState::Idle
                },
                Transition {
                    from: GameState::Idle,
                    to: GameState::Spinning
                },
            ]
        );
    }

    #[test]
    fn test_same_state_is_silent() {
        let mut fsm = StateMachine::new();
        let (log, listener) = recorder();
        fsm.subscribe(listener);
        fsm.transition(GameState::Idle);
        assert!(!fsm.transition(GameState::Idle));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_duplicate_subscription_ignored() {
        let mut fsm = StateMachine::new();
        let (log, listener) = recorder();
        let a = fsm.subscribe(listener.clone());
        let b = fsm.subscribe(listener);
        assert_eq!(a, b);
        assert_eq!(fsm.listener_count(), 1);
        fsm.transition(GameState::Idle);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let mut fsm = StateMachine::new();
        let (log, listener) = recorder();
        let id = fsm.subscribe(listener);
        assert!(fsm.unsubscribe(id));
        assert!(!fsm.unsubscribe(id));
        fsm.transition(GameState::Idle);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_accepts_spin() {
        assert!(GameState::Idle.accepts_spin());
        assert!(GameState::FreeSpin.accepts_spin());
        for state in [
            GameState::Loading,
            GameState::Spinning,
            GameState::Stopping,
            GameState::ShowWin,
        ] {
            assert!(!state.accepts_spin());
        }
    }
}
