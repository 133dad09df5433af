// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use emfexport_core::{Labels, MetricMetadata, MetricRecord};
use hashbrown::hash_map::EntryRef;
use serde::Serialize;

use crate::key::{GroupKey, GroupKeyRef};

/// A set of metrics sharing the same grouping metadata and labels.
///
/// Within a batch, each metric name appears at most once in [`metrics`](Self::metrics).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupedRecord {
    /// Labels shared by every metric in the group
    pub labels: Labels,
    /// Metrics by name
    pub metrics: BTreeMap<String, MetricRecord>,
    /// Metadata of the first data point that created the group
    pub metadata: MetricMetadata,
}

/// The grouped records of one batch.
///
/// A `GroupedRecords` belongs to exactly one batch: create one per batch, fill it with
/// [`aggregate`](Self::aggregate), then hand it downstream. Batches processed in parallel each use
/// their own instance.
#[derive(Debug, Default)]
pub struct GroupedRecords {
    groups: hashbrown::HashMap<GroupKey, GroupedRecord>,
    duplicates: usize,
}

impl GroupedRecords {
    /// Create an empty set of groups
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no data point was merged yet
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The group stored under `key`
    pub fn get(&self, key: &GroupKey) -> Option<&GroupedRecord> {
        self.groups.get(key)
    }

    /// Iterate over the groups in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &GroupedRecord)> {
        self.groups.iter()
    }

    /// Number of data points that were dropped because their group already held a metric of the
    /// same name
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Consume the batch, returning the groups ordered by [`GroupKey`]
    pub fn into_sorted_records(self) -> Vec<GroupedRecord> {
        let mut groups: Vec<_> = self.groups.into_iter().collect();
        groups.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
        groups.into_iter().map(|(_, record)| record).collect()
    }

    /// Merge one metric value into the group for `metadata` and `labels`.
    ///
    /// The first value for a metric name in a group wins; later ones are reported and dropped.
    pub(crate) fn insert(
        &mut self,
        metadata: &MetricMetadata,
        labels: &Labels,
        metric_name: &str,
        record: MetricRecord,
    ) {
        let key = GroupKeyRef::new(
            &metadata.grouping,
            labels.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        match self.groups.entry_ref(&key) {
            EntryRef::Occupied(mut group) => {
                let metrics = &mut group.get_mut().metrics;
                if metrics.contains_key(metric_name) {
                    tracing::warn!(
                        message = "duplicate metric found",
                        metric = %metric_name,
                        labels = ?labels,
                    );
                    self.duplicates += 1;
                } else {
                    metrics.insert(metric_name.to_owned(), record);
                }
            }
            EntryRef::Vacant(vacant) => {
                vacant.insert(GroupedRecord {
                    labels: labels.clone(),
                    metrics: BTreeMap::from([(metric_name.to_owned(), record)]),
                    metadata: metadata.clone(),
                });
            }
        }
    }
}

impl IntoIterator for GroupedRecords {
    type Item = (GroupKey, GroupedRecord);
    type IntoIter = hashbrown::hash_map::IntoIter<GroupKey, GroupedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use emfexport_core::PointValue;

    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn first_value_wins() {
        let mut records = GroupedRecords::new();
        let metadata = MetricMetadata::default();
        let labels = labels(&[("label", "value")]);
        records.insert(
            &metadata,
            &labels,
            "metric",
            MetricRecord::new(PointValue::Int(1), "Count"),
        );
        records.insert(
            &metadata,
            &labels,
            "metric",
            MetricRecord::new(PointValue::Int(2), "Count"),
        );
        check!(records.len() == 1);
        check!(records.duplicates() == 1);

        let key = GroupKey::new(&metadata.grouping, [("label", "value")]);
        let group = records.get(&key).unwrap();
        check!(group.metrics["metric"] == MetricRecord::new(PointValue::Int(1), "Count"));
    }

    #[test]
    fn distinct_names_share_a_group() {
        let mut records = GroupedRecords::new();
        let metadata = MetricMetadata::default();
        let labels = labels(&[("label", "value")]);
        for name in ["a", "b", "c"] {
            records.insert(
                &metadata,
                &labels,
                name,
                MetricRecord::new(PointValue::Double(1.0), ""),
            );
        }
        check!(records.len() == 1);
        check!(records.duplicates() == 0);
        let (_, group) = records.iter().next().unwrap();
        check!(group.metrics.keys().collect::<Vec<_>>() == ["a", "b", "c"]);
    }

    #[test]
    fn sorted_records_follow_key_order() {
        let mut records = GroupedRecords::new();
        let metadata = MetricMetadata::default();
        for value in ["c", "a", "b"] {
            records.insert(
                &metadata,
                &labels(&[("label", value)]),
                "metric",
                MetricRecord::new(PointValue::Int(0), ""),
            );
        }
        let order: Vec<_> = records
            .into_sorted_records()
            .into_iter()
            .map(|record| record.labels["label"].clone())
            .collect();
        check!(order == ["a", "b", "c"]);
    }
}
