//! Deterministic game core
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual time only (the host feeds frame deltas)
//! - Seeded RNG only
//! - Fixed reel iteration order
//! - No rendering or platform dependencies

pub mod fsm;
pub mod ledger;
pub mod machine;
pub mod payline;
pub mod reel;
pub mod symbol;
pub mod timer;

pub use fsm::{GameState, Listener, StateMachine, SubscriptionId, Transition};
pub use ledger::{Ledger, LedgerError};
pub use machine::{
    AutoplayStatus, NullPresenter, Presenter, RoundContext, SlotMachine, SpinError, SpinOutcome,
};
pub use payline::{Evaluation, Grid, LineId, PayLine, RowSelector, evaluate};
pub use reel::{Reel, ReelMotion, WrapPolicy};
pub use symbol::{Symbol, SymbolSource};
pub use timer::TimerQueue;
