//! Currency ledger backing character bank balances.
use std::collections::HashMap;

use bevy::prelude::Resource;
use thiserror::Error;

use crate::preferences::SessionId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("no bank account registered for {0}")]
    UnknownAccount(SessionId),
    #[error("insufficient funds for {session}: requested {requested}, available {available}")]
    InsufficientFunds {
        session: SessionId,
        requested: i32,
        available: i32,
    },
    #[error("invalid withdrawal amount {0}")]
    InvalidAmount(i32),
    #[error("ledger rejected the withdrawal: {0}")]
    Rejected(String),
}

/// Persistent store of spendable currency.
pub trait CurrencyLedger: Send + Sync {
    /// Current balance, or `None` when the session has no loaded account.
    fn balance(&self, session: SessionId) -> Option<i32>;

    /// Withdraws exactly `amount`, returning the new balance.
    fn withdraw(&mut self, session: SessionId, amount: i32) -> Result<i32, LedgerError>;
}

/// Ledger keeping balances in memory for the lifetime of the app.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    accounts: HashMap<SessionId, i32>,
}

impl InMemoryLedger {
    pub fn with_account(mut self, session: SessionId, balance: i32) -> Self {
        self.open_account(session, balance);
        self
    }

    pub fn open_account(&mut self, session: SessionId, balance: i32) {
        self.accounts.insert(session, balance.max(0));
    }
}

impl CurrencyLedger for InMemoryLedger {
    fn balance(&self, session: SessionId) -> Option<i32> {
        self.accounts.get(&session).copied()
    }

    fn withdraw(&mut self, session: SessionId, amount: i32) -> Result<i32, LedgerError> {
        if amount < 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let balance = self
            .accounts
            .get_mut(&session)
            .ok_or(LedgerError::UnknownAccount(session))?;

        if amount > *balance {
            return Err(LedgerError::InsufficientFunds {
                session,
                requested: amount,
                available: *balance,
            });
        }

        *balance -= amount;
        Ok(*balance)
    }
}

/// Resource exposing the active ledger implementation.
#[derive(Resource)]
pub struct BankLedger {
    inner: Box<dyn CurrencyLedger>,
}

impl BankLedger {
    pub fn new(inner: Box<dyn CurrencyLedger>) -> Self {
        Self { inner }
    }

    pub fn balance(&self, session: SessionId) -> Option<i32> {
        self.inner.balance(session)
    }

    pub fn withdraw(&mut self, session: SessionId, amount: i32) -> Result<i32, LedgerError> {
        self.inner.withdraw(session, amount)
    }
}

impl Default for BankLedger {
    fn default() -> Self {
        Self::new(Box::new(InMemoryLedger::default()))
    }
}
