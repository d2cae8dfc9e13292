//! Currency registry
//!
//! The set of valid currencies is fixed at startup: `Ledger::open` registers
//! every configured currency, then the registry is only ever read. No other
//! component may mutate it, so it needs no interior mutability.

use std::collections::HashMap;

use crate::types::{Currency, CurrencyId};
use crate::{Error, Result};

/// Registry of valid currency kinds
#[derive(Debug, Default)]
pub struct CurrencyRegistry {
    currencies: HashMap<CurrencyId, Currency>,
}

impl CurrencyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a currency. Only called during ledger initialization.
    pub fn register(&mut self, currency: Currency) -> Result<()> {
        if self.currencies.contains_key(&currency.id) {
            return Err(Error::DuplicateCurrency(currency.id.to_string()));
        }
        self.currencies.insert(currency.id.clone(), currency);
        Ok(())
    }

    /// Look up a currency definition
    pub fn lookup(&self, id: &CurrencyId) -> Result<&Currency> {
        self.currencies
            .get(id)
            .ok_or_else(|| Error::UnknownCurrency(id.to_string()))
    }

    /// True if `id` is registered
    pub fn contains(&self, id: &CurrencyId) -> bool {
        self.currencies.contains_key(id)
    }

    /// Registered currency ids
    pub fn ids(&self) -> impl Iterator<Item = &CurrencyId> {
        self.currencies.keys()
    }

    /// Number of registered currencies
    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = CurrencyRegistry::new();
        registry
            .register(Currency::new("gold", 0).with_symbol("g"))
            .unwrap();

        let gold = registry.lookup(&CurrencyId::new("gold")).unwrap();
        assert_eq!(gold.scale, 0);
        assert_eq!(gold.symbol.as_deref(), Some("g"));
    }

    #[test]
    fn test_duplicate_currency_rejected() {
        let mut registry = CurrencyRegistry::new();
        registry.register(Currency::new("gold", 0)).unwrap();

        let err = registry.register(Currency::new("gold", 2)).unwrap_err();
        assert_eq!(err, Error::DuplicateCurrency("gold".to_string()));
        // the original definition is untouched
        assert_eq!(registry.lookup(&CurrencyId::new("gold")).unwrap().scale, 0);
    }

    #[test]
    fn test_unknown_currency() {
        let registry = CurrencyRegistry::new();
        let err = registry.lookup(&CurrencyId::new("gems")).unwrap_err();
        assert_eq!(err, Error::UnknownCurrency("gems".to_string()));
    }
}
