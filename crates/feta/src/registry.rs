//! Out-of-band record of the methods each mocked object had before mocking.
//!
//! Records sit next to a weak handle of their object. Records of dropped
//! objects are pruned on every `mock`, so the registry does not keep their
//! original methods (and whatever those capture) alive.

use crate::object::{MethodSlot, MockId, MockObject, WeakObject};
use crate::result::{FetaError, FetaResult};
use std::collections::{BTreeMap, HashMap};

/// Slots captured by `mock`, written back by `restore`
#[derive(Debug, Clone, Default)]
pub struct OriginalRecord {
    methods: BTreeMap<String, MethodSlot>,
}

impl OriginalRecord {
    /// Captured method names
    #[must_use]
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    /// Number of captured methods
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether nothing was captured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

struct RegistryEntry {
    object: WeakObject,
    record: OriginalRecord,
}

/// Registry of mocked objects, keyed by object identity
#[derive(Default)]
pub struct MockRegistry {
    records: HashMap<MockId, RegistryEntry>,
}

impl std::fmt::Debug for MockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRegistry")
            .field("records", &self.records.len())
            .field("live", &self.live_count())
            .finish()
    }
}

impl MockRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare `object` for stubbing, or create a blank object when `None`.
    ///
    /// Every existing method is recorded. When `poison` is set, each is then
    /// replaced with a stub failing with [`FetaError::MethodNotMocked`].
    /// The returned handle is the same object.
    pub fn mock(&mut self, object: Option<&MockObject>, poison: bool) -> MockObject {
        self.prune();

        let Some(object) = object else {
            let blank = MockObject::new("mock");
            self.insert(&blank, OriginalRecord::default());
            tracing::debug!(id = %blank.id(), "blank mock created");
            return blank;
        };

        if self.records.contains_key(&object.id()) {
            tracing::warn!(
                object = %object.label(),
                "object mocked twice; its current methods replace the earlier snapshot"
            );
        }

        let record = OriginalRecord {
            methods: object.snapshot(),
        };
        tracing::debug!(
            object = %object.label(),
            methods = record.len(),
            poison,
            "object mocked"
        );
        self.insert(object, record);
        if poison {
            object.poison_all();
        }
        object.clone()
    }

    /// Write every recorded method back onto `object`.
    ///
    /// Methods added after mocking are left in place. The record is kept, so
    /// restoring again repeats the same merge.
    pub fn restore(&self, object: &MockObject) -> FetaResult<()> {
        let record = self.record(object).ok_or(FetaError::NotMocked)?;
        for (name, slot) in &record.methods {
            object.set_slot(name.clone(), slot.clone());
        }
        tracing::debug!(object = %object.label(), methods = record.len(), "object restored");
        Ok(())
    }

    /// Whether `object` has a record
    #[must_use]
    pub fn is_mocked(&self, object: &MockObject) -> bool {
        self.records.contains_key(&object.id())
    }

    /// Record held for `object`
    #[must_use]
    pub fn record(&self, object: &MockObject) -> Option<&OriginalRecord> {
        self.records.get(&object.id()).map(|entry| &entry.record)
    }

    /// Drop the record for `object`; later `restore` calls fail with `NotMocked`.
    ///
    /// A record whose original methods capture the object itself keeps that
    /// object alive, so pruning never reclaims it; forget it explicitly.
    pub fn forget(&mut self, object: &MockObject) -> Option<OriginalRecord> {
        self.records.remove(&object.id()).map(|entry| entry.record)
    }

    /// Drop records of objects that no longer exist; returns how many went
    pub fn prune(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|_, entry| entry.object.is_alive());
        let pruned = before - self.records.len();
        if pruned > 0 {
            tracing::debug!(pruned, "records of dropped objects pruned");
        }
        pruned
    }

    /// Number of records, including ones for objects dropped since the last prune
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Number of records whose object is still alive
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.records
            .values()
            .filter(|entry| entry.object.is_alive())
            .count()
    }

    fn insert(&mut self, object: &MockObject, record: OriginalRecord) {
        self.records.insert(
            object.id(),
            RegistryEntry {
                object: object.downgrade(),
                record,
            },
        );
    }

    /// Whether nothing is mocked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
