use super::{Record, RecordType};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Records grouped by type, each group in first-seen order.
///
/// Built once through [`RecordSetBuilder`] and read-only afterwards. A type
/// with no records is absent, which callers observe as an empty slice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: BTreeMap<RecordType, Vec<Record>>,
}

impl RecordSet {
    pub fn builder() -> RecordSetBuilder {
        RecordSetBuilder::default()
    }

    pub fn get(&self, record_type: RecordType) -> &[Record] {
        self.records
            .get(&record_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_type(&self, record_type: RecordType) -> bool {
        !self.get(record_type).is_empty()
    }

    pub fn values(&self, record_type: RecordType) -> impl Iterator<Item = &str> {
        self.get(record_type).iter().map(|r| r.value.as_str())
    }

    pub fn types(&self) -> impl Iterator<Item = RecordType> + '_ {
        self.records.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordType, &[Record])> {
        self.records.iter().map(|(t, v)| (*t, v.as_slice()))
    }

    /// Total number of records across all types.
    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Exclusive writer for a [`RecordSet`].
#[derive(Debug, Default)]
pub struct RecordSetBuilder {
    records: BTreeMap<RecordType, Vec<Record>>,
    index: HashMap<(RecordType, String), usize>,
}

impl RecordSetBuilder {
    /// Insert a record or merge it into an existing one with the same key.
    ///
    /// Returns `true` when the value was not seen before.
    pub fn insert(&mut self, record: Record) -> bool {
        let key = (record.record_type, record.key());
        let group = self.records.entry(record.record_type).or_default();

        if let Some(&pos) = self.index.get(&key) {
            let existing = &mut group[pos];
            for resolver in &record.resolvers {
                existing.merge(record.ttl, resolver);
            }
            existing.malformed |= record.malformed;
            return false;
        }

        self.index.insert(key, group.len());
        group.push(record);
        true
    }

    pub fn build(self) -> RecordSet {
        RecordSet {
            records: self.records,
        }
    }
}
