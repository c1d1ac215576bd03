//! Spin controller
//!
//! Owns the reels, ledger, state machine and timer queue, and sequences each round:
//!
//! ```text
//! Idle -> Spinning -> Stopping -> ShowWin -> Idle
//!                                        \-> FreeSpin -> Spinning ...
//! ```
//!
//! The host calls [`SlotMachine::update`] once per frame. Timers fire first (staggered reel
//! stops, round finish), then spinning reels advance. A round ends when every reel has
//! settled; it is evaluated on that same frame and the next round, if any, starts after the
//! result display delay.

use thiserror::Error;

use super::fsm::{GameState, StateMachine};
use super::ledger::{Ledger, LedgerError};
use super::payline::{Evaluation, Grid, evaluate};
use super::reel::Reel;
use super::symbol::SymbolSource;
use super::timer::TimerQueue;
use crate::config::{ConfigError, GameConfig};
use crate::frames_from_ms;

/// Presentation capability the controller reports to. Every method defaults to a no-op.
pub trait Presenter {
    /// A reel moved (or settled) this frame
    fn draw_reel(&mut self, _index: usize, _reel: &Reel) {}
    fn balance_changed(&mut self, _balance: u64) {}
    fn free_spins_changed(&mut self, _free_spins: u32) {}
    /// Show a transient message for `duration_ms`
    fn show_message(&mut self, _text: &str, _duration_ms: f64) {}
    /// First bonus grant of a free-spin streak
    fn bonus_started(&mut self) {}
    /// Free-spin streak is over
    fn bonus_ended(&mut self) {}
    /// A timer-driven spin (autoplay continuation) was refused
    fn spin_rejected(&mut self, _error: &SpinError) {}
}

/// Presenter that ignores everything (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpinError {
    #[error("not enough balance to spin (balance {balance}, stake {stake})")]
    InsufficientFunds { balance: u64, stake: u64 },
}

/// Result of an accepted or ignored spin request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinOutcome {
    Started {
        round: u64,
        stake_debited: u64,
        free: bool,
    },
    /// A round is already in flight (or the game is still loading)
    Ignored,
}

/// Autoplay mode after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayStatus {
    /// Switched on and the first spin started
    Started,
    /// Switched on, continues after the current round
    Armed,
    Off,
}

/// Per-round bookkeeping, dropped when the round finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundContext {
    pub id: u64,
    pub stake_debited: u64,
    /// Reels settled so far
    pub settled: usize,
    pub free: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    StopReel { round: u64, reel: usize },
    FinishRound { round: u64 },
}

pub struct SlotMachine<P: Presenter = NullPresenter> {
    config: GameConfig,
    fsm: StateMachine,
    ledger: Ledger,
    reels: Vec<Reel>,
    source: SymbolSource,
    timers: TimerQueue<TimerEvent>,
    presenter: P,
    round: Option<RoundContext>,
    next_round_id: u64,
    autoplay: bool,
    /// Inside a free-spin streak (bonus presentation running)
    bonus_active: bool,
    last_evaluation: Option<Evaluation>,
}

impl<P: Presenter> SlotMachine<P> {
    /// Build a machine with random reel strips drawn from the config seed
    pub fn new(config: GameConfig, presenter: P) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut source = SymbolSource::new(config.seed);
        let reels = (0..config.reel_count)
            .map(|_| Reel::new(config.strip_len, &mut source, config.motion))
            .collect();
        Ok(Self::assemble(config, reels, source, presenter))
    }

    /// Build a machine around prepared reels (reel count is taken from `reels`)
    pub fn with_reels(
        mut config: GameConfig,
        reels: Vec<Reel>,
        presenter: P,
    ) -> Result<Self, ConfigError> {
        config.reel_count = reels.len();
        config.validate()?;
        if let Some(short) = reels.iter().find(|r| r.len() < GameConfig::MIN_STRIP_LEN) {
            return Err(ConfigError::StripTooShort {
                len: short.len(),
                min: GameConfig::MIN_STRIP_LEN,
            });
        }
        let source = SymbolSource::new(config.seed);
        Ok(Self::assemble(config, reels, source, presenter))
    }

    fn assemble(config: GameConfig, reels: Vec<Reel>, source: SymbolSource, presenter: P) -> Self {
        Self {
            ledger: Ledger::new(config.starting_balance),
            config,
            fsm: StateMachine::new(),
            reels,
            source,
            timers: TimerQueue::new(),
            presenter,
            round: None,
            next_round_id: 1,
            autoplay: false,
            bonus_active: false,
            last_evaluation: None,
        }
    }

    // === Accessors ===

    pub fn state(&self) -> GameState {
        self.fsm.state()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    /// Snapshot of the current reel slots
    pub fn grid(&self) -> Grid {
        Grid::from_reels(&self.reels)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn round(&self) -> Option<&RoundContext> {
        self.round.as_ref()
    }

    pub fn last_evaluation(&self) -> Option<&Evaluation> {
        self.last_evaluation.as_ref()
    }

    pub fn autoplay_active(&self) -> bool {
        self.autoplay
    }

    pub fn now_ms(&self) -> f64 {
        self.timers.now_ms()
    }

    /// Virtual time until the next scheduled stop or round finish
    pub fn next_timer_in(&self) -> Option<f64> {
        self.timers.next_due_in()
    }

    /// For subscribing to state transitions
    pub fn state_machine_mut(&mut self) -> &mut StateMachine {
        &mut self.fsm
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// A spin request would be accepted right now
    pub fn can_spin(&self) -> bool {
        self.fsm.state().accepts_spin()
    }

    /// Whether the manual spin button should be enabled
    pub fn spin_enabled(&self) -> bool {
        self.fsm.state() == GameState::Idle && !self.autoplay && self.ledger.free_spins() == 0
    }

    // === Lifecycle ===

    /// Assets are ready: Loading -> Idle. Returns false if not loading.
    pub fn finish_loading(&mut self) -> bool {
        if self.fsm.state() != GameState::Loading {
            return false;
        }
        self.fsm.transition(GameState::Idle);
        self.presenter.balance_changed(self.ledger.balance());
        self.presenter.free_spins_changed(self.ledger.free_spins());
        for (i, reel) in self.reels.iter().enumerate() {
            self.presenter.draw_reel(i, reel);
        }
        true
    }

    /// Asset loading failed. The machine stays in Loading and never accepts spins.
    pub fn loading_failed(&mut self, reason: &str) {
        log::error!(
            "Loading failed, game stays in {}: {}",
            self.fsm.state(),
            reason
        );
    }

    /// Change the stake. Only allowed before a round starts.
    pub fn set_stake(&mut self, amount: u64) -> Result<(), ConfigError> {
        if !matches!(self.fsm.state(), GameState::Idle | GameState::Loading) {
            return Err(ConfigError::NotIdle);
        }
        if !self.config.is_bet_offered(amount) {
            return Err(ConfigError::StakeNotOffered(amount));
        }
        self.config.stake = amount;
        log::info!("Stake set to {}", amount);
        Ok(())
    }

    // === Input ===

    /// Start a round if the machine is idle (or a free spin is pending)
    pub fn request_spin(&mut self) -> Result<SpinOutcome, SpinError> {
        let state = self.fsm.state();
        if !state.accepts_spin() {
            log::debug!("Spin ignored in {}", state);
            return Ok(SpinOutcome::Ignored);
        }

        // FreeSpin state means the credit was already consumed when the state was entered
        let free = if state == GameState::FreeSpin {
            true
        } else if self.ledger.consume_free_spin() {
            self.presenter.free_spins_changed(self.ledger.free_spins());
            true
        } else {
            false
        };

        let stake = self.config.stake;
        let stake_debited = if free {
            0
        } else {
            match self.ledger.debit(stake) {
                Ok(()) => {
                    self.presenter.balance_changed(self.ledger.balance());
                    stake
                }
                Err(LedgerError::Overdraft { balance, .. }) => {
                    self.stop_autoplay();
                    let err = SpinError::InsufficientFunds { balance, stake };
                    log::warn!("Spin rejected: {}", err);
                    return Err(err);
                }
            }
        };

        let id = self.next_round_id;
        self.next_round_id += 1;
        self.round = Some(RoundContext {
            id,
            stake_debited,
            settled: 0,
            free,
        });
        self.last_evaluation = None;
        self.fsm.transition(GameState::Spinning);

        for (i, reel) in self.reels.iter_mut().enumerate() {
            reel.begin_spin(self.config.reel_speed(i));
            self.timers.schedule(
                self.config.stop_delay(i),
                TimerEvent::StopReel { round: id, reel: i },
            );
        }

        let kind = if free {
            "free spin".to_string()
        } else {
            format!("stake {}", stake)
        };
        log::info!(
            "Round {} started ({}, balance {})",
            id,
            kind,
            self.ledger.balance()
        );
        Ok(SpinOutcome::Started {
            round: id,
            stake_debited,
            free,
        })
    }

    /// Switch autoplay on or off
    pub fn toggle_autoplay(&mut self) -> Result<AutoplayStatus, SpinError> {
        if self.autoplay {
            self.stop_autoplay();
            log::info!("Autoplay off");
            return Ok(AutoplayStatus::Off);
        }

        let state = self.fsm.state();
        if state == GameState::Loading {
            return Ok(AutoplayStatus::Off);
        }
        let stake = self.config.stake;
        if state == GameState::Idle
            && self.ledger.free_spins() == 0
            && !self.ledger.can_afford(stake)
        {
            return Err(SpinError::InsufficientFunds {
                balance: self.ledger.balance(),
                stake,
            });
        }

        self.autoplay = true;
        self.ledger.set_autoplay(self.config.max_autoplay_rounds);
        log::info!("Autoplay on ({} rounds)", self.config.max_autoplay_rounds);

        if state == GameState::Idle {
            self.request_spin()?;
            Ok(AutoplayStatus::Started)
        } else {
            Ok(AutoplayStatus::Armed)
        }
    }

    fn stop_autoplay(&mut self) {
        self.autoplay = false;
        self.ledger.clear_autoplay();
    }

    // === Frame driver ===

    /// Advance virtual time by `delta_ms`: fire due timers, then move the reels
    pub fn update(&mut self, delta_ms: f64) {
        self.timers.advance(delta_ms);
        while let Some(event) = self.timers.pop_due() {
            self.handle_timer(event);
        }
        self.tick_reels(frames_from_ms(delta_ms));
    }

    fn tick_reels(&mut self, frames: f32) {
        if frames <= 0.0 {
            return;
        }
        let mut settled = 0;
        for (i, reel) in self.reels.iter_mut().enumerate() {
            if !reel.is_spinning() {
                continue;
            }
            if reel.advance(frames, &mut self.source) {
                log::debug!("Reel {} settled", i);
                settled += 1;
            }
            self.presenter.draw_reel(i, reel);
        }
        for _ in 0..settled {
            self.on_reel_settled();
        }
    }

    fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::StopReel { round, reel } => self.stop_reel(round, reel),
            TimerEvent::FinishRound { round } => self.finish_round(round),
        }
    }

    fn is_current_round(&self, id: u64) -> bool {
        self.round.is_some_and(|r| r.id == id)
    }

    fn stop_reel(&mut self, round: u64, reel: usize) {
        let state = self.fsm.state();
        if !self.is_current_round(round)
            || !matches!(state, GameState::Spinning | GameState::Stopping)
        {
            log::debug!("Stale stop for reel {} of round {} ignored", reel, round);
            return;
        }
        if let Some(r) = self.reels.get_mut(reel) {
            r.request_stop();
        }
        if reel + 1 == self.reels.len() {
            self.fsm.transition(GameState::Stopping);
        }
    }

    fn on_reel_settled(&mut self) {
        let reel_count = self.reels.len();
        let complete = match self.round.as_mut() {
            Some(round) if round.settled < reel_count => {
                round.settled += 1;
                round.settled == reel_count
            }
            Some(_) => false,
            None => {
                log::debug!("Reel settled outside a round");
                false
            }
        };
        if complete {
            self.fsm.transition(GameState::ShowWin);
            self.evaluate_round();
        }
    }

    fn evaluate_round(&mut self) {
        let Some(round) = self.round else {
            return;
        };

        let evaluation = evaluate(&self.grid(), &self.config.paylines);
        self.ledger.credit(evaluation.total_payout);
        self.presenter.balance_changed(self.ledger.balance());

        if self.source.chance(self.config.bonus_probability) {
            self.grant_bonus();
        }

        log::info!(
            "Round {} result: payout {} lines {:?} balance {}",
            round.id,
            evaluation.total_payout,
            evaluation.matched_lines,
            self.ledger.balance()
        );
        self.presenter
            .show_message(&evaluation.message(), self.config.result_display_ms);
        self.last_evaluation = Some(evaluation);

        self.timers.schedule(
            self.config.result_display_ms,
            TimerEvent::FinishRound { round: round.id },
        );
    }

    fn grant_bonus(&mut self) {
        let spins = self.config.bonus_free_spins;
        if spins == 0 {
            return;
        }
        self.ledger.grant_free_spins(spins);
        self.presenter.free_spins_changed(self.ledger.free_spins());
        log::info!("Bonus! +{} free spin(s)", spins);
        if !self.bonus_active {
            self.bonus_active = true;
            self.presenter.bonus_started();
        }
    }

    fn finish_round(&mut self, round: u64) {
        if !self.is_current_round(round) || self.fsm.state() != GameState::ShowWin {
            log::debug!("Stale finish for round {} ignored", round);
            return;
        }
        self.round = None;

        if self.ledger.consume_free_spin() {
            self.presenter.free_spins_changed(self.ledger.free_spins());
            self.fsm.transition(GameState::FreeSpin);
            self.chain_spin();
            return;
        }

        if self.bonus_active {
            self.bonus_active = false;
            self.presenter.bonus_ended();
        }

        if self.autoplay && self.ledger.consume_autoplay_round() {
            self.fsm.transition(GameState::Idle);
            self.chain_spin();
        } else {
            if self.autoplay {
                log::info!("Autoplay finished");
                self.stop_autoplay();
            }
            self.fsm.transition(GameState::Idle);
        }
    }

    /// Start the follow-up round of a free spin or autoplay
    fn chain_spin(&mut self) {
        if let Err(err) = self.request_spin() {
            self.presenter.spin_rejected(&err);
        }
    }
}
