// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Core types shared by the `emfexport` crates.
//!
//! This crate holds the pieces of the metrics translation pipeline that do not depend on
//! grouping or on destination naming:
//!
//! - the [data model](crate::metric) for incoming metrics and their data points,
//! - the [attribute view](crate::attributes) over resource attributes,
//! - [unit](crate::unit) translation onto CloudWatch unit names,
//! - the [exporter configuration](crate::config).
//!
//! The grouping engine lives in `emfexport`, and log group / log stream naming lives in
//! `emfexport-destination`.

#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use crate::attributes::{AttributeSource, AttributeValue, Attributes};
pub use crate::config::{ConfigError, ExporterConfig, MetricDescriptor, MetricDescriptors};
pub use crate::metric::{
    DataPoint, GroupingMetadata, Labels, Metric, MetricDataType, MetricMetadata, MetricRecord,
    MetricSource, PointValue, SummaryStats,
};
pub use crate::unit::{Unit, translate_unit};

pub mod attributes;
pub mod config;
pub mod metric;
pub mod unit;
