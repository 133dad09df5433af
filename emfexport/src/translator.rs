// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Translation of one resource batch at a time.

use std::time::{SystemTime, UNIX_EPOCH};

use emfexport_core::{
    AttributeSource, Attributes, ExporterConfig, GroupingMetadata, Metric, MetricDescriptors,
    MetricMetadata, MetricSource,
};
use emfexport_destination::{LogDestination, resolve_log_destination, resolve_namespace};

use crate::aggregator::AggregateError;
use crate::grouped::GroupedRecords;

/// Metrics of one resource, as received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceMetrics<A = Attributes, M = Metric> {
    /// Resource attributes
    pub resource: A,
    /// Metrics by instrumentation scope
    pub scopes: Vec<ScopeMetrics<M>>,
}

/// Metrics produced by one instrumentation scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeMetrics<M = Metric> {
    /// Instrumentation scope name
    pub name: String,
    /// The metrics
    pub metrics: Vec<M>,
}

/// The result of translating one resource batch.
#[derive(Debug)]
pub struct TranslatedBatch {
    /// Namespace of every record in the batch
    pub namespace: String,
    /// Where the records are written
    pub destination: LogDestination,
    /// The grouped records
    pub records: GroupedRecords,
}

/// Translates resource batches into grouped records.
///
/// A `Translator` only holds configuration, so one instance can translate batches on several
/// threads at once. Each call works on its own [`GroupedRecords`].
///
/// ```
/// # use emfexport::{ResourceMetrics, ScopeMetrics, Translator};
/// # use emfexport::core::{Attributes, DataPoint, ExporterConfig, Labels, Metric, MetricDataType};
/// let translator = Translator::new(ExporterConfig {
///     namespace: "MyApp".into(),
///     ..Default::default()
/// });
/// let batch = ResourceMetrics {
///     resource: Attributes::new(),
///     scopes: vec![ScopeMetrics {
///         name: "my-scope".into(),
///         metrics: vec![Metric::new("latency", "ms", MetricDataType::Gauge)
///             .with_point(DataPoint::new(Labels::new(), 1.5))],
///     }],
/// };
///
/// let translated = translator.translate(&batch).unwrap();
/// assert_eq!(translated.destination.log_group, "/metrics/MyApp");
/// assert_eq!(translated.records.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Translator {
    config: ExporterConfig,
    descriptors: MetricDescriptors,
}

impl Translator {
    /// Create a translator. Invalid metric descriptors are dropped here, with a warning.
    pub fn new(config: ExporterConfig) -> Self {
        let descriptors = config.descriptors();
        Self {
            config,
            descriptors,
        }
    }

    /// The configuration of this translator
    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    /// Translate one resource batch, using the current time for points without a timestamp.
    pub fn translate<A, M>(
        &self,
        batch: &ResourceMetrics<A, M>,
    ) -> Result<TranslatedBatch, AggregateError>
    where
        A: AttributeSource,
        M: MetricSource,
    {
        self.translate_at(batch, now_ms())
    }

    /// Translate one resource batch, using `now_ms` for points without a timestamp.
    ///
    /// The namespace and log destination are resolved from the resource attributes, then every
    /// metric of every scope is [aggregated](GroupedRecords::aggregate) into a new set of records.
    /// The first error aborts the batch.
    pub fn translate_at<A, M>(
        &self,
        batch: &ResourceMetrics<A, M>,
        now_ms: i64,
    ) -> Result<TranslatedBatch, AggregateError>
    where
        A: AttributeSource,
        M: MetricSource,
    {
        let namespace = resolve_namespace(&batch.resource, &self.config.namespace);
        let destination = resolve_log_destination(&batch.resource, &namespace, &self.config);
        let mut records = GroupedRecords::new();

        for scope in &batch.scopes {
            let mut metadata = MetricMetadata {
                grouping: GroupingMetadata {
                    namespace: namespace.clone(),
                    timestamp_ms: now_ms,
                    log_group: destination.log_group.clone(),
                    log_stream: destination.log_stream.clone(),
                    data_type: Default::default(),
                },
                scope_name: scope.name.clone(),
            };
            for metric in &scope.metrics {
                metadata.grouping.data_type = metric.data_type();
                records.aggregate(metric, &metadata, &self.descriptors, &self.config)?;
            }
        }

        Ok(TranslatedBatch {
            namespace,
            destination,
            records,
        })
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
