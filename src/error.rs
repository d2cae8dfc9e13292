//! Error types for the ledger

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Every rejection a submission can produce is captured here. The enum is
/// serializable because rejected transactions are recorded in the audit log
/// together with their reason.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Error {
    /// Currency identifier is not registered
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Account does not exist (or was closed)
    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    /// Currency identifier already registered
    #[error("Duplicate currency: {0}")]
    DuplicateCurrency(String),

    /// Account identifier already open
    #[error("Duplicate account: {0}")]
    DuplicateAccount(String),

    /// Transfer legs for a currency do not sum to zero
    #[error("Unbalanced transaction: legs for {currency} sum to {sum}")]
    UnbalancedTransaction {
        /// Currency whose legs fail to balance
        currency: String,
        /// Nonzero sum of the merged legs
        sum: i64,
    },

    /// A projected balance would fall below the account's floor
    #[error(
        "Insufficient funds: account {account} would reach {projected} {currency}, floor is {floor}"
    )]
    InsufficientFunds {
        /// Account whose balance would breach its floor
        account: String,
        /// Currency of the failing leg
        currency: String,
        /// Balance the commit would have produced
        projected: i64,
        /// Minimum permitted balance
        floor: i64,
    },

    /// A merged leg sum or projected balance cannot be represented in i64
    #[error("Balance overflow: account {account}, currency {currency}")]
    BalanceOverflow {
        /// Account whose balance would leave the representable range
        account: String,
        /// Currency of the overflowing sum
        currency: String,
    },

    /// Account close attempted while a balance is nonzero
    #[error("Non-zero balance: account {account} still holds {balance} {currency}")]
    NonZeroBalance {
        /// Account that cannot be closed
        account: String,
        /// Currency with the remaining balance
        currency: String,
        /// Remaining balance in minimal units
        balance: i64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
