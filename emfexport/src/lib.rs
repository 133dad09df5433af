// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Groups OpenTelemetry metric data points into records for the Amazon CloudWatch
//! [Embedded Metric Format](https://docs.aws.amazon.com/AmazonCloudWatch/latest/monitoring/CloudWatch_Embedded_Metric_Format_Specification.html).
//!
//! A receiver hands over metrics one resource at a time. For each resource batch:
//!
//! 1. the namespace and the CloudWatch Logs destination are resolved from the resource attributes
//!    (see [`emfexport_destination`]),
//! 2. every retained data point is turned into a [`MetricRecord`](emfexport_core::MetricRecord)
//!    with a CloudWatch unit,
//! 3. records are merged into [`GroupedRecord`]s keyed by [`GroupKey`], so that metrics sharing
//!    their labels and grouping metadata end up in the same EMF log event.
//!
//! [`Translator`] runs all three steps. [`GroupedRecords::aggregate`] can be used directly when
//! the caller already knows the metadata.
//!
//! Shipping the records to CloudWatch Logs is not part of this crate.

#![deny(missing_docs)]

mod aggregator;
mod grouped;
mod key;
pub mod schema;
mod translator;

pub use aggregator::AggregateError;
pub use grouped::{GroupedRecord, GroupedRecords};
pub use key::GroupKey;
pub use translator::{ResourceMetrics, ScopeMetrics, TranslatedBatch, Translator};

pub use emfexport_core as core;
pub use emfexport_destination as destination;
