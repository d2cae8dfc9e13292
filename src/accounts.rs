//! Account store
//!
//! Owns every account and its per-currency balances. The map itself is a
//! `DashMap` so lookups from concurrent submitters do not contend; each
//! account sits behind its own `parking_lot::Mutex`, which is the exclusive
//! access the transaction engine acquires (in sorted id order) around a
//! commit.
//!
//! Balance mutation happens only through [`Account::apply`], and only the
//! engine calls it, inside a commit's critical section.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::types::{AccountId, CurrencyId};
use crate::{Error, Result};

/// One account: per-currency balances plus per-currency overdraft floors
#[derive(Debug, Default)]
pub struct Account {
    balances: HashMap<CurrencyId, i64>,
    floors: HashMap<CurrencyId, i64>,
    closed: bool,
}

impl Account {
    fn new(floors: HashMap<CurrencyId, i64>) -> Self {
        Self {
            balances: HashMap::new(),
            floors,
            closed: false,
        }
    }

    /// Balance in minimal units; a registered currency never touched is 0
    pub fn balance(&self, currency: &CurrencyId) -> i64 {
        self.balances.get(currency).copied().unwrap_or(0)
    }

    /// Minimum permitted balance for `currency` (0 unless overdraft granted)
    pub fn floor(&self, currency: &CurrencyId) -> i64 {
        self.floors.get(currency).copied().unwrap_or(0)
    }

    /// True once `close` has succeeded; in-flight submitters check this
    /// after acquiring the lock and treat the account as unknown.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Adjust the balance. Engine-only, inside a commit.
    pub(crate) fn apply(&mut self, currency: &CurrencyId, delta: i64) {
        let entry = self.balances.entry(currency.clone()).or_insert(0);
        *entry = entry
            .checked_add(delta)
            .expect("projection bounds every applied delta");
    }

    fn first_nonzero(&self) -> Option<(&CurrencyId, i64)> {
        self.balances
            .iter()
            .find(|(_, balance)| **balance != 0)
            .map(|(currency, balance)| (currency, *balance))
    }

    /// Nonzero balances, for reporting and replay verification
    pub fn nonzero_balances(&self) -> Vec<(CurrencyId, i64)> {
        self.balances
            .iter()
            .filter(|(_, balance)| **balance != 0)
            .map(|(currency, balance)| (currency.clone(), *balance))
            .collect()
    }
}

/// Concurrent map of accounts
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: DashMap<AccountId, Arc<Mutex<Account>>>,
}

impl AccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an account with zero balances and the given overdraft floors
    pub fn open(&self, id: AccountId, floors: HashMap<CurrencyId, i64>) -> Result<()> {
        match self.accounts.entry(id) {
            Entry::Occupied(occupied) => Err(Error::DuplicateAccount(occupied.key().to_string())),
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(Mutex::new(Account::new(floors))));
                Ok(())
            }
        }
    }

    /// Close an account; fails if any balance is nonzero
    pub fn close(&self, id: &AccountId) -> Result<()> {
        let handle = self.handle(id)?;
        {
            let mut account = handle.lock();
            if account.closed {
                return Err(Error::UnknownAccount(id.to_string()));
            }
            if let Some((currency, balance)) = account.first_nonzero() {
                return Err(Error::NonZeroBalance {
                    account: id.to_string(),
                    currency: currency.to_string(),
                    balance,
                });
            }
            // Submitters holding a stale Arc observe the flag and reject.
            account.closed = true;
        }
        self.accounts.remove(id);
        Ok(())
    }

    /// Current balance for `(id, currency)`
    pub fn balance(&self, id: &AccountId, currency: &CurrencyId) -> Result<i64> {
        let handle = self.handle(id)?;
        let account = handle.lock();
        if account.closed {
            return Err(Error::UnknownAccount(id.to_string()));
        }
        Ok(account.balance(currency))
    }

    /// Shared handle to the account's lock. The dashmap guard is dropped
    /// before the caller locks the mutex, so shard locks are never held
    /// across account locks.
    pub(crate) fn handle(&self, id: &AccountId) -> Result<Arc<Mutex<Account>>> {
        self.accounts
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::UnknownAccount(id.to_string()))
    }

    /// Number of open accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True if no account is open
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Nonzero balances of every open account. Locks one account at a time,
    /// so this is a per-account (not globally atomic) snapshot; callers
    /// wanting an exact picture quiesce submissions first.
    ///
    /// Handles are collected before any account lock is taken: `close` holds
    /// an account lock while removing the map entry, so locking accounts
    /// while still iterating the map could deadlock against it.
    pub fn snapshot(&self) -> Vec<(AccountId, Vec<(CurrencyId, i64)>)> {
        let handles: Vec<(AccountId, Arc<Mutex<Account>>)> = self
            .accounts
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        handles
            .into_iter()
            .map(|(id, handle)| {
                let balances = handle.lock().nonzero_balances();
                (id, balances)
            })
            .collect()
    }
}
