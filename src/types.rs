//! Core types for the ledger
//!
//! All types are designed for:
//! - Exact arithmetic (balances are integers in minimal currency units)
//! - Deterministic serialization (serde derives on every audit-facing type)
//! - Memory safety (no unsafe code)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::{Error, Result};

/// Account identifier (player id, guild vault, quest pool, etc.)
///
/// `Ord` is derived so the engine can take account locks in a fixed,
/// deterministic order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Currency identifier ("gold", "gems", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyId(String);

impl CurrencyId {
    /// Create new currency ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Currency definition
///
/// Immutable once registered. Balances are kept in minimal units; `scale`
/// only tells presentation layers where the decimal point goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Unique identifier
    pub id: CurrencyId,

    /// Number of fractional decimal places in the minimal unit
    pub scale: u32,

    /// Optional display symbol
    pub symbol: Option<String>,
}

impl Currency {
    /// Create a currency with no display symbol
    pub fn new(id: impl Into<String>, scale: u32) -> Self {
        Self {
            id: CurrencyId::new(id),
            scale,
            symbol: None,
        }
    }

    /// Set the display symbol
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

/// One balance change of a transaction: (account, currency, signed delta)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    /// Account whose balance changes
    pub account: AccountId,

    /// Currency of the change
    pub currency: CurrencyId,

    /// Signed change in minimal units
    pub delta: i64,
}

impl Leg {
    /// Create a leg
    pub fn new(account: AccountId, currency: CurrencyId, delta: i64) -> Self {
        Self {
            account,
            currency,
            delta,
        }
    }
}

/// Transaction kind, deciding which balance policy applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Legs must sum to zero per currency; value only moves between accounts
    Transfer,

    /// Mint/burn against the outside world; legs need not balance
    Adjustment,
}

/// An immutable set of balance changes submitted as one atomic unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID
    pub tx_id: Uuid,

    /// Kind (transfer or adjustment)
    pub kind: TransactionKind,

    /// Ordered legs as submitted
    pub legs: Vec<Leg>,
}

impl Transaction {
    fn new(kind: TransactionKind, legs: Vec<Leg>) -> Self {
        Self {
            tx_id: Uuid::new_v4(),
            kind,
            legs,
        }
    }

    /// Balanced multi-leg transfer
    pub fn transfer(legs: Vec<Leg>) -> Self {
        Self::new(TransactionKind::Transfer, legs)
    }

    /// Mint/burn adjustment
    pub fn adjustment(legs: Vec<Leg>) -> Self {
        Self::new(TransactionKind::Adjustment, legs)
    }

    /// Deposit `amount` minimal units into one account
    pub fn deposit(account: AccountId, currency: CurrencyId, amount: i64) -> Self {
        Self::adjustment(vec![Leg::new(account, currency, amount)])
    }

    /// Withdraw `amount` minimal units from one account
    pub fn withdraw(account: AccountId, currency: CurrencyId, amount: i64) -> Self {
        Self::adjustment(vec![Leg::new(account, currency, -amount)])
    }

    /// Move `amount` minimal units from one account to another
    pub fn transfer_between(
        from: AccountId,
        to: AccountId,
        currency: CurrencyId,
        amount: i64,
    ) -> Self {
        Self::transfer(vec![
            Leg::new(from, currency.clone(), -amount),
            Leg::new(to, currency, amount),
        ])
    }

    /// Merge legs per (account, currency) by summation, dropping legs that
    /// cancel out. Result is sorted by (account, currency), which is also
    /// the engine's lock order. Fails with `BalanceOverflow` if a merged
    /// sum cannot be represented.
    pub fn merged_legs(&self) -> Result<Vec<Leg>> {
        let mut merged: BTreeMap<(AccountId, CurrencyId), i64> = BTreeMap::new();
        for leg in &self.legs {
            let entry = merged
                .entry((leg.account.clone(), leg.currency.clone()))
                .or_insert(0);
            *entry = entry
                .checked_add(leg.delta)
                .ok_or_else(|| Error::BalanceOverflow {
                    account: leg.account.to_string(),
                    currency: leg.currency.to_string(),
                })?;
        }
        Ok(merged
            .into_iter()
            .filter(|(_, delta)| *delta != 0)
            .map(|((account, currency), delta)| Leg::new(account, currency, delta))
            .collect())
    }
}

/// Outcome of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// All legs applied atomically
    Committed,

    /// Nothing applied; the reason the engine refused
    Rejected(Error),
}

impl Outcome {
    /// True for committed records
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed)
    }
}

/// Audit log entry: one record per submission, committed or rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Monotonic sequence number, the canonical global order
    pub sequence: u64,

    /// Logical timestamp assigned at append time
    pub timestamp: DateTime<Utc>,

    /// Transaction as submitted
    pub transaction: Transaction,

    /// Committed or rejected (with reason)
    pub outcome: Outcome,
}

impl TransactionRecord {
    /// True if this record changed balances
    pub fn is_committed(&self) -> bool {
        self.outcome.is_committed()
    }

    /// True if any leg references `account`
    pub fn touches(&self, account: &AccountId) -> bool {
        self.transaction.legs.iter().any(|l| &l.account == account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_legs_sums_duplicates() {
        let alice = AccountId::new("alice");
        let gold = CurrencyId::new("gold");
        let tx = Transaction::adjustment(vec![
            Leg::new(alice.clone(), gold.clone(), 10),
            Leg::new(alice.clone(), gold.clone(), 5),
        ]);

        let merged = tx.merged_legs().unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].delta, 15);
    }

    #[test]
    fn test_merged_legs_drops_cancelled() {
        let alice = AccountId::new("alice");
        let gold = CurrencyId::new("gold");
        let tx = Transaction::adjustment(vec![
            Leg::new(alice.clone(), gold.clone(), 10),
            Leg::new(alice.clone(), gold.clone(), -10),
        ]);

        assert!(tx.merged_legs().unwrap().is_empty());
    }

    #[test]
    fn test_merged_legs_overflow_rejected() {
        let alice = AccountId::new("alice");
        let gold = CurrencyId::new("gold");
        let tx = Transaction::adjustment(vec![
            Leg::new(alice.clone(), gold.clone(), i64::MAX),
            Leg::new(alice, gold, 1),
        ]);

        let err = tx.merged_legs().unwrap_err();
        assert!(matches!(err, Error::BalanceOverflow { .. }));
    }

    #[test]
    fn test_merged_legs_sorted_by_account() {
        let gold = CurrencyId::new("gold");
        let tx = Transaction::transfer(vec![
            Leg::new(AccountId::new("zoe"), gold.clone(), 7),
            Leg::new(AccountId::new("amy"), gold.clone(), -7),
        ]);

        let merged = tx.merged_legs().unwrap();
        assert_eq!(merged[0].account, AccountId::new("amy"));
        assert_eq!(merged[1].account, AccountId::new("zoe"));
    }

    #[test]
    fn test_transfer_between_balances() {
        let tx = Transaction::transfer_between(
            AccountId::new("alice"),
            AccountId::new("bob"),
            CurrencyId::new("gold"),
            50,
        );

        assert_eq!(tx.kind, TransactionKind::Transfer);
        let sum: i64 = tx.legs.iter().map(|l| l.delta).sum();
        assert_eq!(sum, 0);
    }
}
