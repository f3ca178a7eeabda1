//! Economy module hosting the currency ledger characters spend from.
pub mod ledger;

pub use ledger::{BankLedger, CurrencyLedger, InMemoryLedger, LedgerError};
