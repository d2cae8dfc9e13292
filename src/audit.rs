//! Append-only audit log
//!
//! One record per submission, committed or rejected, in sequence order.
//! `append` is called exclusively by the transaction engine, inside the same
//! critical section as the balance writes it documents, so the log and the
//! balances never diverge. Records are never mutated or deleted.
//!
//! Every record draws from the same monotonic counter, so `sequence` is also
//! the record's index in the log.

use parking_lot::Mutex;

use chrono::Utc;

use crate::types::{Outcome, Transaction, TransactionRecord};

#[derive(Debug, Default)]
struct AuditInner {
    records: Vec<TransactionRecord>,
    next_sequence: u64,
}

/// Ordered, append-only record of every submission
#[derive(Debug, Default)]
pub struct AuditLog {
    inner: Mutex<AuditInner>,
}

impl AuditLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next sequence number and append a record. Engine-only.
    pub(crate) fn append(&self, transaction: Transaction, outcome: Outcome) -> u64 {
        let mut inner = self.inner.lock();
        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        inner.records.push(TransactionRecord {
            sequence,
            timestamp: Utc::now(),
            transaction,
            outcome,
        });
        sequence
    }

    /// Snapshot cursor over records with `sequence >= from_sequence`, in
    /// ascending order. Never blocks on future writes: records appended
    /// after this call are not observed.
    pub fn iter_from(&self, from_sequence: u64) -> impl Iterator<Item = TransactionRecord> {
        let inner = self.inner.lock();
        // sequence == index, so the cursor is a simple suffix copy
        let records: Vec<TransactionRecord> = inner
            .records
            .get(from_sequence as usize..)
            .unwrap_or(&[])
            .to_vec();
        records.into_iter()
    }

    /// Number of records appended so far
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// True if nothing was ever submitted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sequence number the next record will receive
    pub fn next_sequence(&self) -> u64 {
        self.inner.lock().next_sequence
    }
}
