// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Grouping of data points into [`GroupedRecords`].

use std::fmt;

use emfexport_core::{
    DataPoint, ExporterConfig, MetricDescriptors, MetricMetadata, MetricRecord, MetricSource,
    translate_unit,
};

use crate::grouped::GroupedRecords;
use crate::schema::{SchemaError, add_kubernetes_wrapper, is_kubernetes_object};

impl GroupedRecords {
    /// Merge every retained data point of `metric` into this batch.
    ///
    /// For each point:
    /// - if kubernetes enrichment is enabled and the point is a `Pod` or `Container`, the
    ///   `kubernetes` label is added to its labels first;
    /// - the value and the [translated unit](translate_unit) become a [`MetricRecord`];
    /// - a non-zero timestamp replaces the timestamp of `metadata`, for this point and every later
    ///   point of the same call;
    /// - the record is added to the group keyed by the metadata and labels. If that group already
    ///   has a metric with this name, the new value is dropped with a warning and counted in
    ///   [`duplicates`](Self::duplicates).
    ///
    /// If building the `kubernetes` label fails, the remaining points of `metric` are not
    /// processed and the error is returned. Points merged before the failure stay merged.
    /// [`KUBERNETES_SCHEMA`](crate::schema::KUBERNETES_SCHEMA) only produces JSON strings and
    /// objects, which always serialize, so with it this error does not occur in practice.
    pub fn aggregate(
        &mut self,
        metric: &impl MetricSource,
        metadata: &MetricMetadata,
        descriptors: &MetricDescriptors,
        config: &ExporterConfig,
    ) -> Result<(), AggregateError> {
        let name = metric.name();
        let unit = translate_unit(name, metric.unit(), descriptors);
        let mut metadata = metadata.clone();

        for point in metric.data_points() {
            let DataPoint {
                mut labels,
                value,
                timestamp_ms,
                retained,
            } = point;
            if !retained {
                continue;
            }

            if config.create_kubernetes_object && is_kubernetes_object(&labels) {
                if let Err(err) = add_kubernetes_wrapper(&mut labels) {
                    tracing::warn!(
                        message = "issue forming kubernetes object",
                        metric = %name,
                        error = %err,
                    );
                    return Err(err.into());
                }
            }

            if timestamp_ms > 0 {
                metadata.grouping.timestamp_ms = timestamp_ms;
            }

            self.insert(
                &metadata,
                &labels,
                name,
                MetricRecord::new(value, unit.as_ref()),
            );
        }
        Ok(())
    }
}

/// Errors from [`GroupedRecords::aggregate`].
#[derive(Debug)]
#[non_exhaustive]
pub enum AggregateError {
    /// The `kubernetes` label could not be built
    Enrichment(SchemaError),
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enrichment(err) => write!(f, "couldn't form kubernetes object: {err}"),
        }
    }
}

impl std::error::Error for AggregateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Enrichment(err) => Some(err),
        }
    }
}

impl From<SchemaError> for AggregateError {
    fn from(value: SchemaError) -> Self {
        Self::Enrichment(value)
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use emfexport_core::{
        DataPoint, GroupingMetadata, Labels, Metric, MetricDataType, MetricDescriptor, PointValue,
    };

    use super::*;
    use crate::key::GroupKey;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    fn metadata() -> MetricMetadata {
        MetricMetadata {
            grouping: GroupingMetadata {
                namespace: "namespace".into(),
                timestamp_ms: 1_000,
                log_group: "log-group".into(),
                log_stream: "log-stream".into(),
                data_type: MetricDataType::Gauge,
            },
            scope_name: "cloudwatch-otel".into(),
        }
    }

    fn aggregate(records: &mut GroupedRecords, metric: &Metric) -> Result<(), AggregateError> {
        records.aggregate(
            metric,
            &metadata(),
            &MetricDescriptors::default(),
            &ExporterConfig::default(),
        )
    }

    #[test]
    fn no_data_points_is_a_no_op() {
        let mut records = GroupedRecords::new();
        aggregate(&mut records, &Metric::new("empty", "ms", MetricDataType::Gauge)).unwrap();
        check!(records.is_empty());
    }

    #[test]
    fn filtered_points_are_skipped() {
        let mut records = GroupedRecords::new();
        let metric = Metric::new("metric", "", MetricDataType::Gauge)
            .with_point(DataPoint::new(labels(&[("a", "1")]), 1i64).filtered())
            .with_point(DataPoint::new(labels(&[("a", "2")]), 2i64));
        aggregate(&mut records, &metric).unwrap();
        check!(records.len() == 1);
        let (key, _) = records.iter().next().unwrap();
        check!(key.labels().collect::<Vec<_>>() == [("a", "2")]);
    }

    #[test]
    fn unit_is_translated() {
        let mut records = GroupedRecords::new();
        let metric = Metric::new("latency", "ms", MetricDataType::Gauge)
            .with_point(DataPoint::new(Labels::new(), 0.5));
        aggregate(&mut records, &metric).unwrap();
        let (_, group) = records.iter().next().unwrap();
        check!(group.metrics["latency"] == MetricRecord::new(PointValue::Double(0.5), "Milliseconds"));
    }

    #[test]
    fn descriptor_overrides_unit() {
        let mut records = GroupedRecords::new();
        let descriptors: MetricDescriptors = [MetricDescriptor {
            metric_name: "latency".into(),
            unit: "Seconds".into(),
            overwrite: true,
        }]
        .into_iter()
        .collect();
        let metric = Metric::new("latency", "ms", MetricDataType::Gauge)
            .with_point(DataPoint::new(Labels::new(), 2i64));
        records
            .aggregate(&metric, &metadata(), &descriptors, &ExporterConfig::default())
            .unwrap();
        let (_, group) = records.iter().next().unwrap();
        check!(group.metrics["latency"].unit() == "Seconds");
    }

    #[test]
    fn timestamp_carries_to_later_points() {
        let mut records = GroupedRecords::new();
        let metric = Metric::new("metric", "", MetricDataType::Gauge)
            .with_point(DataPoint::new(labels(&[("a", "1")]), 1i64))
            .with_point(DataPoint::new(labels(&[("a", "2")]), 2i64).with_timestamp_ms(5_000))
            .with_point(DataPoint::new(labels(&[("a", "3")]), 3i64));
        aggregate(&mut records, &metric).unwrap();

        let mut timestamps: Vec<_> = records
            .iter()
            .map(|(key, group)| {
                check!(key.metadata().timestamp_ms == group.metadata.grouping.timestamp_ms);
                (group.labels["a"].clone(), key.metadata().timestamp_ms)
            })
            .collect();
        timestamps.sort();
        let expected: Vec<(String, i64)> = vec![
            ("1".into(), 1_000),
            ("2".into(), 5_000),
            ("3".into(), 5_000),
        ];
        check!(timestamps == expected);
    }

    #[test]
    fn duplicate_metric_keeps_first_value() {
        let mut records = GroupedRecords::new();
        let metric = Metric::new("metric", "", MetricDataType::Gauge)
            .with_point(DataPoint::new(labels(&[("a", "1"), ("b", "2")]), 1i64))
            .with_point(DataPoint::new(labels(&[("b", "2"), ("a", "1")]), 2i64));
        aggregate(&mut records, &metric).unwrap();
        check!(records.len() == 1);
        check!(records.duplicates() == 1);
        let key = GroupKey::new(&metadata().grouping, [("a", "1"), ("b", "2")]);
        check!(*records.get(&key).unwrap().metrics["metric"].value() == PointValue::Int(1));
    }

    #[test]
    fn metrics_with_same_labels_share_a_group() {
        let mut records = GroupedRecords::new();
        for (name, value) in [("cpu", 1i64), ("memory", 2i64)] {
            let metric = Metric::new(name, "", MetricDataType::Gauge)
                .with_point(DataPoint::new(labels(&[("host", "h1")]), value));
            aggregate(&mut records, &metric).unwrap();
        }
        check!(records.len() == 1);
        check!(records.duplicates() == 0);
        let (_, group) = records.iter().next().unwrap();
        check!(group.metrics.len() == 2);
        check!(group.metadata == metadata());
    }

    #[test]
    fn kubernetes_object_only_when_enabled() {
        let metric = Metric::new("pod_cpu", "", MetricDataType::Gauge).with_point(DataPoint::new(
            labels(&[("Type", "Pod"), ("pod_name", "web")]),
            1i64,
        ));
        let mut config = ExporterConfig::default();

        let mut records = GroupedRecords::new();
        records
            .aggregate(&metric, &metadata(), &MetricDescriptors::default(), &config)
            .unwrap();
        let (_, group) = records.iter().next().unwrap();
        check!(!group.labels.contains_key("kubernetes"));

        config.create_kubernetes_object = true;
        let mut records = GroupedRecords::new();
        records
            .aggregate(&metric, &metadata(), &MetricDescriptors::default(), &config)
            .unwrap();
        let (key, group) = records.iter().next().unwrap();
        check!(group.labels["kubernetes"] == r#"{"pod_name":"web"}"#);
        check!(key.labels().any(|(k, _)| k == "kubernetes"));
    }

    #[test]
    fn kubernetes_object_needs_pod_or_container() {
        let config = ExporterConfig {
            create_kubernetes_object: true,
            ..Default::default()
        };
        let metric = Metric::new("node_cpu", "", MetricDataType::Gauge).with_point(
            DataPoint::new(labels(&[("Type", "Node"), ("pod_name", "web")]), 1i64),
        );
        let mut records = GroupedRecords::new();
        records
            .aggregate(&metric, &metadata(), &MetricDescriptors::default(), &config)
            .unwrap();
        let (_, group) = records.iter().next().unwrap();
        check!(!group.labels.contains_key("kubernetes"));
    }
}
