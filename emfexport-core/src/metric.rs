// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The data model for metrics entering the translation pipeline.
//!
//! An upstream receiver produces values implementing [`MetricSource`]. Each metric exposes its
//! [`DataPoint`]s, each of which has already been marked as retained or filtered out. The
//! grouping engine turns retained points into [`MetricRecord`]s stored under a grouped record.

use std::collections::BTreeMap;

use serde::Serialize;

/// Labels attached to a data point.
///
/// Ordered by key, so that records built from these labels serialize the same way every time.
pub type Labels = BTreeMap<String, String>;

/// Min/max/count/sum statistics of a histogram or summary data point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SummaryStats {
    /// Largest observed value
    pub max: f64,
    /// Smallest observed value
    pub min: f64,
    /// Number of observations
    pub count: u64,
    /// Sum of all observations
    pub sum: f64,
}

/// The value carried by a single data point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PointValue {
    /// An integer gauge or sum
    Int(i64),
    /// A floating-point gauge or sum
    Double(f64),
    /// Statistics of a histogram or summary
    Stats(SummaryStats),
}

impl From<i64> for PointValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PointValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<SummaryStats> for PointValue {
    fn from(value: SummaryStats) -> Self {
        Self::Stats(value)
    }
}

/// A single timestamped observation and its labels.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    /// Labels of this point
    pub labels: Labels,
    /// Observed value
    pub value: PointValue,
    /// Milliseconds since the Unix epoch. `0` means unset.
    pub timestamp_ms: i64,
    /// `false` if an upstream filter dropped this point. Such points are skipped silently.
    pub retained: bool,
}

impl DataPoint {
    /// Create a retained data point with no timestamp
    pub fn new(labels: Labels, value: impl Into<PointValue>) -> Self {
        Self {
            labels,
            value: value.into(),
            timestamp_ms: 0,
            retained: true,
        }
    }

    /// Set the timestamp of this point
    pub fn with_timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Mark this point as filtered out upstream
    pub fn filtered(mut self) -> Self {
        self.retained = false;
        self
    }
}

/// The OpenTelemetry data type a metric was received as.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MetricDataType {
    /// Gauge
    #[default]
    Gauge,
    /// Sum (counter or up-down counter)
    Sum,
    /// Explicit bucket histogram
    Histogram,
    /// Exponential histogram
    ExponentialHistogram,
    /// Summary
    Summary,
}

/// A metric as handed over by the upstream receiver.
pub trait MetricSource {
    /// The metric name
    fn name(&self) -> &str;

    /// The unit string as received, possibly empty
    fn unit(&self) -> &str;

    /// The data type of this metric
    fn data_type(&self) -> MetricDataType;

    /// The data points of this metric. This may be produced lazily.
    fn data_points(&self) -> impl Iterator<Item = DataPoint> + '_;
}

/// A fully materialized metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Metric name
    pub name: String,
    /// Raw unit string
    pub unit: String,
    /// Data type
    pub data_type: MetricDataType,
    /// Data points
    pub points: Vec<DataPoint>,
}

impl Metric {
    /// Create a metric with no data points
    pub fn new(name: impl Into<String>, unit: impl Into<String>, data_type: MetricDataType) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            data_type,
            points: vec![],
        }
    }

    /// Add a data point
    pub fn with_point(mut self, point: DataPoint) -> Self {
        self.points.push(point);
        self
    }
}

impl MetricSource for Metric {
    fn name(&self) -> &str {
        &self.name
    }

    fn unit(&self) -> &str {
        &self.unit
    }

    fn data_type(&self) -> MetricDataType {
        self.data_type
    }

    fn data_points(&self) -> impl Iterator<Item = DataPoint> + '_ {
        self.points.iter().cloned()
    }
}

/// Metadata that decides which group a data point lands in.
///
/// Two points are only grouped together if their `GroupingMetadata` is equal.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupingMetadata {
    /// Metric namespace
    pub namespace: String,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// Destination log group
    pub log_group: String,
    /// Destination log stream
    pub log_stream: String,
    /// Data type of the metrics in the group
    pub data_type: MetricDataType,
}

/// Everything known about where a metric came from and where it is going.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricMetadata {
    /// The grouping dimensions
    #[serde(flatten)]
    pub grouping: GroupingMetadata,
    /// Name of the instrumentation scope that produced the metric. Not a grouping dimension.
    pub scope_name: String,
}

/// A translated value with its CloudWatch unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricRecord {
    value: PointValue,
    unit: String,
}

impl MetricRecord {
    /// Create a new record
    pub fn new(value: PointValue, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// The recorded value
    pub fn value(&self) -> &PointValue {
        &self.value
    }

    /// The CloudWatch unit name, possibly empty
    pub fn unit(&self) -> &str {
        &self.unit
    }
}
