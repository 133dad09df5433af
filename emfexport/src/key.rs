// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Grouping keys.
//!
//! A [`GroupKey`] identifies one grouped record within a batch. It is built from the
//! [`GroupingMetadata`] of a data point and its label set, with the labels sorted, so that the
//! order labels were inserted in never affects grouping.

use emfexport_core::GroupingMetadata;
use hashbrown::Equivalent;
use smallvec::SmallVec;

/// Most points carry only a handful of labels.
const INLINE_LABELS: usize = 8;

/// The identity of a grouped record.
///
/// Two keys are equal exactly when their grouping metadata is equal and their label sets are equal
/// as sets of `(name, value)` pairs.
///
/// ```
/// # use emfexport::GroupKey;
/// # use emfexport::core::GroupingMetadata;
/// let metadata = GroupingMetadata::default();
/// let a = GroupKey::new(&metadata, [("Service", "api"), ("Operation", "get")]);
/// let b = GroupKey::new(&metadata, [("Operation", "get"), ("Service", "api")]);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    metadata: GroupingMetadata,
    labels: SmallVec<[(String, String); INLINE_LABELS]>,
}

impl GroupKey {
    /// Build the key for `metadata` and `labels`
    pub fn new<'a>(
        metadata: &'a GroupingMetadata,
        labels: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self::from(&GroupKeyRef::new(metadata, labels))
    }

    /// The grouping metadata of this key
    pub fn metadata(&self) -> &GroupingMetadata {
        &self.metadata
    }

    /// The labels of this key, sorted
    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A borrowed [`GroupKey`], used to look up a group without allocating.
///
/// Hashes identically to the [`GroupKey`] it is [equivalent](Equivalent) to.
#[derive(Debug, Hash, PartialEq, Eq)]
pub(crate) struct GroupKeyRef<'a> {
    metadata: &'a GroupingMetadata,
    labels: SmallVec<[(&'a str, &'a str); INLINE_LABELS]>,
}

impl<'a> GroupKeyRef<'a> {
    pub(crate) fn new(
        metadata: &'a GroupingMetadata,
        labels: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut labels: SmallVec<_> = labels.into_iter().collect();
        labels.sort_unstable();
        Self { metadata, labels }
    }
}

impl Equivalent<GroupKey> for GroupKeyRef<'_> {
    fn equivalent(&self, key: &GroupKey) -> bool {
        *self.metadata == key.metadata
            && self.labels.len() == key.labels.len()
            && self
                .labels
                .iter()
                .zip(&key.labels)
                .all(|((n1, v1), (n2, v2))| n1 == n2 && v1 == v2)
    }
}

impl From<&'_ GroupKeyRef<'_>> for GroupKey {
    fn from(key: &GroupKeyRef<'_>) -> Self {
        Self {
            metadata: key.metadata.clone(),
            labels: key
                .labels
                .iter()
                .map(|&(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::hash::BuildHasher;

    use emfexport_core::MetricDataType;

    use super::*;

    fn metadata() -> GroupingMetadata {
        GroupingMetadata {
            namespace: "namespace".into(),
            timestamp_ms: 1_600_000_000_000,
            log_group: "log-group".into(),
            log_stream: "log-stream".into(),
            data_type: MetricDataType::Gauge,
        }
    }

    #[test]
    fn label_order_does_not_matter() {
        let metadata = metadata();
        let forward = [("a", "1"), ("b", "2"), ("c", "3")];
        let mut backward = forward;
        backward.reverse();
        assert_eq!(
            GroupKey::new(&metadata, forward),
            GroupKey::new(&metadata, backward)
        );
    }

    #[test]
    fn different_label_values_differ() {
        let metadata = metadata();
        assert_ne!(
            GroupKey::new(&metadata, [("a", "1"), ("b", "2")]),
            GroupKey::new(&metadata, [("a", "1"), ("b", "3")])
        );
        // moving text between name and value must not collide
        assert_ne!(
            GroupKey::new(&metadata, [("ab", "c")]),
            GroupKey::new(&metadata, [("a", "bc")])
        );
        assert_ne!(
            GroupKey::new(&metadata, [("a", "1")]),
            GroupKey::new(&metadata, [("a", "1"), ("b", "")])
        );
    }

    #[test]
    fn different_metadata_differs() {
        let metadata = metadata();
        let mut later = metadata.clone();
        later.timestamp_ms += 1;
        let mut other_type = metadata.clone();
        other_type.data_type = MetricDataType::Sum;
        let key = GroupKey::new(&metadata, [("a", "1")]);
        assert_ne!(key, GroupKey::new(&later, [("a", "1")]));
        assert_ne!(key, GroupKey::new(&other_type, [("a", "1")]));
    }

    #[test]
    fn borrowed_key_hashes_like_owned_key() {
        let metadata = metadata();
        let labels = [("z", "26"), ("a", "1"), ("m", "13")];
        let borrowed = GroupKeyRef::new(&metadata, labels);
        let owned = GroupKey::new(&metadata, labels);
        let hasher = hashbrown::DefaultHashBuilder::default();
        assert_eq!(hasher.hash_one(&borrowed), hasher.hash_one(&owned));
        assert!(borrowed.equivalent(&owned));
        assert!(!GroupKeyRef::new(&metadata, [("a", "1")]).equivalent(&owned));
    }

    #[test]
    fn labels_built_from_owned_strings() {
        let metadata = metadata();
        let owned: Vec<(String, String)> = (0..3)
            .map(|i| (format!("label-{i}"), i.to_string()))
            .collect();
        let key = GroupKey::new(&metadata, owned.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        drop(owned);
        assert_eq!(key.metadata(), &metadata);
        assert_eq!(
            key.labels().collect::<Vec<_>>(),
            [("label-0", "0"), ("label-1", "1"), ("label-2", "2")]
        );
    }

    #[test]
    fn labels_are_exposed_sorted() {
        let key = GroupKey::new(&metadata(), [("b", "2"), ("a", "1")]);
        assert_eq!(key.labels().collect::<Vec<_>>(), [("a", "1"), ("b", "2")]);
        assert_eq!(key.metadata(), &metadata());
    }
}
