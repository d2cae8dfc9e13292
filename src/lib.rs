//! Economy Core
//!
//! Virtual-currency ledger engine for gamified economies.
//!
//! # Architecture
//!
//! - **Currency Registry**: closed set of currency kinds, fixed at startup
//! - **Account Store**: per-currency integer balances behind per-account locks
//! - **Transaction Engine**: multi-leg deposits, withdrawals, and transfers
//!   applied all-or-nothing
//! - **Audit Log**: append-only, totally ordered record of every submission
//!
//! # Invariants
//!
//! - Balances are integers in minimal units; no fractional arithmetic
//! - No balance falls below its floor (zero unless overdraft is granted)
//! - Replaying committed records from empty state reproduces the balances
//! - Commits are linearizable per account; locks are taken in sorted order

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications, clippy::all)]

pub mod accounts;
pub mod audit;
pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod registry;
pub mod types;

// Re-exports
pub use accounts::AccountStore;
pub use audit::AuditLog;
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use metrics::Metrics;
pub use registry::CurrencyRegistry;
pub use types::{
    AccountId, Currency, CurrencyId, Leg, Outcome, Transaction, TransactionKind,
    TransactionRecord,
};
