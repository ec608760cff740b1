//! Ordered, role-gated record collection.

use devhub_auth::{Capability, Role, authorize};
use devhub_core::{DomainError, DomainResult, RecordId};

use crate::Record;

/// In-memory collection of records in insertion order.
///
/// Reads are open to every role. Every mutation first checks
/// [`Capability::Edit`]; a rejected call leaves the collection untouched.
#[derive(Debug, Clone)]
pub struct ContentStore<T> {
    records: Vec<T>,
}

impl<T> Default for ContentStore<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Record> ContentStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from existing records, keeping their ids.
    ///
    /// Records with an unassigned or duplicate id get a fresh one. A record
    /// that needs a fresh id once the id space is exhausted is dropped.
    pub fn seeded(records: impl IntoIterator<Item = T>) -> Self {
        let mut store = Self::new();
        for mut record in records {
            let id = record.id();
            if !id.is_assigned() || store.get(id).is_some() {
                let Some(fresh) = store.next_id() else {
                    tracing::warn!(kind = T::KIND, title = record.title(), "no free id; seed record dropped");
                    continue;
                };
                record.set_id(fresh);
            }
            store.records.push(record);
        }
        store
    }

    pub fn list(&self) -> &[T] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Id the next accepted record will get: one past the current maximum.
    /// `None` when the maximum is already `u64::MAX`.
    pub fn next_id(&self) -> Option<RecordId> {
        match self.records.iter().map(|r| r.id()).max() {
            Some(max) => max.next(),
            None => Some(RecordId::FIRST),
        }
    }

    /// Append a record under a freshly allocated id. Any id on `record` is ignored.
    pub fn add(&mut self, role: Role, mut record: T) -> DomainResult<RecordId> {
        self.check(role, "add")?;
        record.validate()?;

        let id = self
            .next_id()
            .ok_or_else(|| DomainError::invalid_id(format!("no {} id left to allocate", T::KIND)))?;
        record.set_id(id);
        tracing::info!(kind = T::KIND, %id, title = record.title(), %role, "record added");
        self.records.push(record);
        Ok(id)
    }

    /// Replace the record stored under `id`, keeping its position and id.
    ///
    /// Returns `Ok(false)` when no such record exists.
    pub fn update(&mut self, role: Role, id: RecordId, mut record: T) -> DomainResult<bool> {
        self.check(role, "update")?;
        record.validate()?;

        let Some(slot) = self.records.iter_mut().find(|r| r.id() == id) else {
            tracing::debug!(kind = T::KIND, %id, "update of missing record ignored");
            return Ok(false);
        };
        record.set_id(id);
        *slot = record;
        tracing::info!(kind = T::KIND, %id, %role, "record updated");
        Ok(true)
    }

    /// Remove the record stored under `id`. Returns `Ok(false)` when absent.
    pub fn remove(&mut self, role: Role, id: RecordId) -> DomainResult<bool> {
        self.check(role, "remove")?;

        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        let removed = self.records.len() != before;
        if removed {
            tracing::info!(kind = T::KIND, %id, %role, "record removed");
        }
        Ok(removed)
    }

    fn check(&self, role: Role, action: &'static str) -> DomainResult<()> {
        authorize(role, Capability::Edit).map_err(|e| {
            tracing::debug!(kind = T::KIND, action, %role, "mutation rejected");
            e.into()
        })
    }
}
