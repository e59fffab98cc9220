use std::collections::HashMap;

use minim_core::{Characteristics, SubjectId};
use serde::Serialize;

/// One randomised subject: identifier, validated covariates and allocated arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectRecord {
    id: SubjectId,
    characteristics: Characteristics,
    arm: String,
    #[serde(skip)]
    arm_index: usize,
}

impl SubjectRecord {
    pub(crate) fn new(
        id: SubjectId,
        characteristics: Characteristics,
        arm: String,
        arm_index: usize,
    ) -> Self {
        Self {
            id,
            characteristics,
            arm,
            arm_index,
        }
    }

    /// Subject identifier.
    pub fn id(&self) -> &SubjectId {
        &self.id
    }

    /// Covariate values keyed by variable name.
    pub fn characteristics(&self) -> &Characteristics {
        &self.characteristics
    }

    /// Value recorded for `variable`, if configured.
    pub fn characteristic(&self, variable: &str) -> Option<&str> {
        self.characteristics.get(variable).map(String::as_str)
    }

    /// Allocated arm label.
    pub fn arm(&self) -> &str {
        &self.arm
    }

    /// Position of the allocated arm in the configured arm list.
    pub fn arm_index(&self) -> usize {
        self.arm_index
    }
}

/// Append-only, insertion-ordered store of randomised subjects.
///
/// Records live in a `Vec` in randomisation order; a hash index from subject id
/// to position gives constant-time duplicate checks. Balancing scans are
/// linear in the number of stored records.
#[derive(Debug, Clone, Default)]
pub struct SubjectRegistry {
    records: Vec<SubjectRecord>,
    index: HashMap<SubjectId, usize>,
}

impl SubjectRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of randomised subjects.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no subject has been randomised yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `id` has already been randomised.
    pub fn contains(&self, id: &SubjectId) -> bool {
        self.index.contains_key(id)
    }

    /// Looks up the record for `id`.
    pub fn get(&self, id: &SubjectId) -> Option<&SubjectRecord> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    /// Zero-based randomisation position of `id`.
    pub fn position(&self, id: &SubjectId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Records in randomisation order.
    pub fn records(&self) -> &[SubjectRecord] {
        &self.records
    }

    /// Iterates over records in randomisation order.
    pub fn iter(&self) -> std::slice::Iter<'_, SubjectRecord> {
        self.records.iter()
    }

    /// The first randomised subject.
    pub fn first(&self) -> Option<&SubjectRecord> {
        self.records.first()
    }

    /// Owned copy of all records, in order.
    pub fn snapshot(&self) -> Vec<SubjectRecord> {
        self.records.clone()
    }

    /// Number of subjects per arm index for a trial with `arm_count` arms.
    pub fn arm_counts(&self, arm_count: usize) -> Vec<usize> {
        let mut counts = vec![0; arm_count];
        for record in &self.records {
            if let Some(slot) = counts.get_mut(record.arm_index) {
                *slot += 1;
            }
        }
        counts
    }

    /// Appends a record. Callers must have checked [`contains`](Self::contains).
    pub(crate) fn append(&mut self, record: SubjectRecord) {
        debug_assert!(!self.index.contains_key(&record.id));
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
    }
}

impl<'a> IntoIterator for &'a SubjectRegistry {
    type Item = &'a SubjectRecord;
    type IntoIter = std::slice::Iter<'a, SubjectRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
