//! Ledger store and metrics calculator for LIF3.
//!
//! [`Ledger`] owns the SQLite connection and exposes every read and write on
//! accounts, transactions and goals. [`metrics`] turns a [`LedgerSnapshot`]
//! into the figures everything else reports.

pub use accounts::Account;
pub use categories::{AccountCategory, LifeCategory, Recurrence, TransactionCategory};
pub use commands::{
    AccountFilter, GoalFilter, GoalSpec, NewAccount, NewTransaction, RevenueEntry,
    TransactionFilter,
};
pub use currency::Currency;
pub use error::LedgerError;
pub use goals::{Goal, GoalMetric, GoalPriority, GoalRef, GoalStatus};
pub use metrics::{LedgerSnapshot, MetricsReport, RevenueTotals};
pub use money::Money;
pub use ops::{BalanceDrift, Ledger, LedgerBuilder};
pub use transactions::Transaction;

pub mod metrics;

mod accounts;
mod categories;
mod commands;
mod currency;
mod error;
mod goals;
mod money;
mod ops;
mod transactions;
mod util;

type ResultLedger<T> = Result<T, LedgerError>;
