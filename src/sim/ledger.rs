//! Player economy: balance, free-spin credits and autoplay rounds
//!
//! Session-only. Nothing here is persisted, a reload starts from the configured balance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("cannot debit {amount} from balance {balance}")]
    Overdraft { balance: u64, amount: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    balance: u64,
    free_spins: u32,
    autoplay_rounds: u32,
}

impl Ledger {
    pub fn new(balance: u64) -> Self {
        Self {
            balance,
            free_spins: 0,
            autoplay_rounds: 0,
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn free_spins(&self) -> u32 {
        self.free_spins
    }

    pub fn autoplay_rounds(&self) -> u32 {
        self.autoplay_rounds
    }

    /// Whether `amount` could be debited right now
    pub fn can_afford(&self, amount: u64) -> bool {
        self.balance >= amount
    }

    pub fn debit(&mut self, amount: u64) -> Result<(), LedgerError> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(LedgerError::Overdraft {
                balance: self.balance,
                amount,
            })?;
        Ok(())
    }

    pub fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    pub fn grant_free_spins(&mut self, n: u32) {
        self.free_spins = self.free_spins.saturating_add(n);
    }

    /// Use one free-spin credit. Returns false (and changes nothing) when none are left.
    pub fn consume_free_spin(&mut self) -> bool {
        if self.free_spins == 0 {
            return false;
        }
        self.free_spins -= 1;
        true
    }

    pub fn set_autoplay(&mut self, rounds: u32) {
        self.autoplay_rounds = rounds;
    }

    pub fn consume_autoplay_round(&mut self) -> bool {
        if self.autoplay_rounds == 0 {
            return false;
        }
        self.autoplay_rounds -= 1;
        true
    }

    pub fn clear_autoplay(&mut self) {
        self.autoplay_rounds = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_and_credit() {
        let mut ledger = Ledger::new(100);
        ledger.debit(10).unwrap();
        assert_eq!(ledger.balance(), 90);
        ledger.credit(100);
        assert_eq!(ledger.balance(), 190);
    }

    #[test]
    fn test_overdraft_rejected() {
        let mut ledger = Ledger::new(5);
        assert!(!ledger.can_afford(10));
        assert_eq!(
            ledger.debit(10),
            Err(LedgerError::Overdraft {
                balance: 5,
                amount: 10
            })
        );
        assert_eq!(ledger.balance(), 5);
        // Exact balance is affordable
        ledger.debit(5).unwrap();
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn test_free_spins_floor_at_zero() {
        let mut ledger = Ledger::new(0);
        assert!(!ledger.consume_free_spin());
        ledger.grant_free_spins(2);
        assert!(ledger.consume_free_spin());
        assert!(ledger.consume_free_spin());
        assert!(!ledger.consume_free_spin());
        assert_eq!(ledger.free_spins(), 0);
    }

    #[test]
    fn test_autoplay_rounds() {
        let mut ledger = Ledger::new(0);
        ledger.set_autoplay(2);
        assert!(ledger.consume_autoplay_round());
        assert_eq!(ledger.autoplay_rounds(), 1);
        ledger.clear_autoplay();
        assert!(!ledger.consume_autoplay_round());
    }
}
