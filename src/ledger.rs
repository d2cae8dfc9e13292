//! Main ledger orchestration layer
//!
//! This module ties together the currency registry, account store, and audit
//! log into the transaction engine: `submit` is the only entry point that
//! mutates balances.
//!
//! # Example
//!
//! ```
//! use economy_core::{AccountId, Config, CurrencyId, Ledger, Transaction};
//!
//! fn main() -> economy_core::Result<()> {
//!     let config: Config = toml::from_str(
//!         r#"
//!         currencies = [{ id = "gold" }]
//!         accounts = [{ id = "alice" }, { id = "bob" }]
//!         "#,
//!     )
//!     .unwrap();
//!     let ledger = Ledger::open(config)?;
//!
//!     let gold = CurrencyId::new("gold");
//!     ledger.submit(Transaction::deposit(AccountId::new("alice"), gold.clone(), 100))?;
//!     ledger.submit(Transaction::transfer_between(
//!         AccountId::new("alice"),
//!         AccountId::new("bob"),
//!         gold.clone(),
//!         50,
//!     ))?;
//!
//!     assert_eq!(ledger.balance(&AccountId::new("bob"), &gold)?, 50);
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, MutexGuard};

use crate::accounts::{Account, AccountStore};
use crate::audit::AuditLog;
use crate::registry::CurrencyRegistry;
use crate::types::{
    AccountId, CurrencyId, Outcome, Transaction, TransactionKind, TransactionRecord,
};
use crate::{Config, Error, Metrics, Result};

/// Main ledger interface
///
/// Commits are all-or-nothing: either every leg of a transaction is applied
/// and a committed record appended, or no balance changes and a rejected
/// record captures the reason.
///
/// Two submissions touching the same account are ordered by lock
/// acquisition, not by submission order. This non-FIFO fairness is a
/// deliberate trade-off; the sequence number is the canonical order.
#[derive(Debug)]
pub struct Ledger {
    /// Valid currencies, read-only after `open`
    registry: CurrencyRegistry,

    /// Accounts and balances
    accounts: AccountStore,

    /// Append-only record of every submission
    audit: AuditLog,

    /// Prometheus metrics
    metrics: Metrics,
}

impl Ledger {
    /// Open a ledger: register configured currencies, open initial accounts
    pub fn open(config: Config) -> Result<Self> {
        let mut registry = CurrencyRegistry::new();
        for def in config.currencies {
            registry.register(def.into())?;
        }

        let metrics = Metrics::new()
            .map_err(|e| Error::Config(format!("Failed to create metrics: {}", e)))?;

        let ledger = Self {
            registry,
            accounts: AccountStore::new(),
            audit: AuditLog::new(),
            metrics,
        };

        for def in config.accounts {
            let floors = def
                .floors
                .iter()
                .map(|f| (CurrencyId::new(f.currency.clone()), f.floor))
                .collect();
            ledger.open_account_with_floors(AccountId::new(def.id), floors)?;
        }

        tracing::info!(
            currencies = ledger.registry.len(),
            accounts = ledger.accounts.len(),
            "Ledger opened"
        );

        Ok(ledger)
    }

    /// Open an account with zero balances and no overdraft
    pub fn open_account(&self, id: AccountId) -> Result<()> {
        self.open_account_with_floors(id, Vec::new())
    }

    /// Open an account with per-currency overdraft floors
    pub fn open_account_with_floors(
        &self,
        id: AccountId,
        floors: Vec<(CurrencyId, i64)>,
    ) -> Result<()> {
        for (currency, _) in &floors {
            self.registry.lookup(currency)?;
        }
        self.accounts.open(id.clone(), floors.into_iter().collect())?;
        self.metrics.record_account_opened();
        tracing::debug!(account = %id, "Account opened");
        Ok(())
    }

    /// Close an account; fails with `NonZeroBalance` if anything remains
    pub fn close_account(&self, id: &AccountId) -> Result<()> {
        self.accounts.close(id)?;
        self.metrics.record_account_closed();
        tracing::debug!(account = %id, "Account closed");
        Ok(())
    }

    /// Current balance for `(account, currency)`
    pub fn balance(&self, account: &AccountId, currency: &CurrencyId) -> Result<i64> {
        self.registry.lookup(currency)?;
        self.accounts.balance(account, currency)
    }

    /// Submit a transaction; the sole balance-mutating entry point.
    ///
    /// Returns the committed record's sequence number. Rejections append a
    /// rejected record (so "attempted and rejected" is distinguishable from
    /// "never attempted") and return the same error to the caller.
    pub fn submit(&self, transaction: Transaction) -> Result<u64> {
        let started = Instant::now();
        match self.submit_inner(&transaction) {
            Ok(sequence) => {
                self.metrics.record_commit(started.elapsed().as_secs_f64());
                tracing::debug!(sequence, tx_id = %transaction.tx_id, "Transaction committed");
                Ok(sequence)
            }
            Err(err) => {
                let sequence = self
                    .audit
                    .append(transaction.clone(), Outcome::Rejected(err.clone()));
                self.metrics.record_reject(started.elapsed().as_secs_f64());
                tracing::debug!(
                    sequence,
                    tx_id = %transaction.tx_id,
                    error = %err,
                    "Transaction rejected"
                );
                Err(err)
            }
        }
    }

    fn submit_inner(&self, transaction: &Transaction) -> Result<u64> {
        // Step 1: every leg as submitted must reference a known account and
        // currency. Checked before merging, so legs that cancel out cannot
        // smuggle an unknown reference past validation. Merging then sums
        // per (account, currency) and fails on i64 overflow; merged legs
        // come back sorted by account id, the lock order.
        for leg in &transaction.legs {
            self.registry.lookup(&leg.currency)?;
            self.accounts.handle(&leg.account)?;
        }
        let legs = transaction.merged_legs()?;
        let mut handles: Vec<(AccountId, Arc<Mutex<Account>>)> = Vec::new();
        for leg in &legs {
            let seen = handles.last().map_or(false, |(id, _)| id == &leg.account);
            if !seen {
                handles.push((leg.account.clone(), self.accounts.handle(&leg.account)?));
            }
        }

        // Step 2: transfers must sum to zero per currency, checked before
        // any lock is taken.
        if transaction.kind == TransactionKind::Transfer {
            // summed in i128 so a cross-account sum cannot wrap to zero
            let mut sums: BTreeMap<&CurrencyId, i128> = BTreeMap::new();
            for leg in &legs {
                *sums.entry(&leg.currency).or_insert(0) += i128::from(leg.delta);
            }
            if let Some((currency, sum)) = sums.into_iter().find(|(_, sum)| *sum != 0) {
                return Err(Error::UnbalancedTransaction {
                    currency: currency.to_string(),
                    // clamped for reporting only; the zero test above is exact
                    sum: sum.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64,
                });
            }
        }

        // Step 3: exclusive access to every account, in ascending id order
        // so overlapping submissions cannot deadlock.
        let mut guards: Vec<MutexGuard<'_, Account>> =
            handles.iter().map(|(_, handle)| handle.lock()).collect();
        for ((id, _), guard) in handles.iter().zip(&guards) {
            // an account closed after step 1 is unknown by the time we hold
            // its lock
            if guard.is_closed() {
                return Err(Error::UnknownAccount(id.to_string()));
            }
        }

        // Step 4: project post-balances against the floors; any breach
        // aborts with nothing applied.
        let mut idx = 0;
        for leg in &legs {
            while handles[idx].0 != leg.account {
                idx += 1;
            }
            let guard = &guards[idx];
            let projected = guard
                .balance(&leg.currency)
                .checked_add(leg.delta)
                .ok_or_else(|| Error::BalanceOverflow {
                    account: leg.account.to_string(),
                    currency: leg.currency.to_string(),
                })?;
            let floor = guard.floor(&leg.currency);
            if projected < floor {
                return Err(Error::InsufficientFunds {
                    account: leg.account.to_string(),
                    currency: leg.currency.to_string(),
                    projected,
                    floor,
                });
            }
        }

        // Step 5: apply every leg and append the committed record while the
        // account locks are still held, so log and balances never diverge.
        let mut idx = 0;
        for leg in &legs {
            while handles[idx].0 != leg.account {
                idx += 1;
            }
            guards[idx].apply(&leg.currency, leg.delta);
        }
        Ok(self.audit.append(transaction.clone(), Outcome::Committed))
    }

    /// Records whose legs touch `account`, from `since_sequence` onwards
    pub fn history(&self, account: &AccountId, since_sequence: u64) -> Vec<TransactionRecord> {
        self.audit
            .iter_from(since_sequence)
            .filter(|record| record.touches(account))
            .collect()
    }

    /// The audit log, for external reporting
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// The currency registry
    pub fn registry(&self) -> &CurrencyRegistry {
        &self.registry
    }

    /// Number of open accounts
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Check the replay invariant
    ///
    /// Replays every committed record from empty state and compares the
    /// result against the live balances. Accounts are snapshotted one at a
    /// time, so call this quiesced for an exact answer.
    pub fn check_conservation(&self) -> bool {
        let mut replayed: BTreeMap<(AccountId, CurrencyId), i64> = BTreeMap::new();
        for record in self.audit.iter_from(0) {
            if !record.is_committed() {
                continue;
            }
            // committed records passed checked merging, so this cannot fail;
            // a log where it does is by definition not reconstructible
            let Ok(legs) = record.transaction.merged_legs() else {
                return false;
            };
            for leg in legs {
                *replayed.entry((leg.account, leg.currency)).or_insert(0) += leg.delta;
            }
        }
        replayed.retain(|_, balance| *balance != 0);

        let mut live: BTreeMap<(AccountId, CurrencyId), i64> = BTreeMap::new();
        for (account, balances) in self.accounts.snapshot() {
            for (currency, balance) in balances {
                live.insert((account.clone(), currency), balance);
            }
        }

        replayed == live
    }
}
