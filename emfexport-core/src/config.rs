// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Exporter configuration.
//!
//! Configuration is deserialized with serde. Locating and reading the configuration source is the
//! job of the embedding application; [`ExporterConfig::from_toml`] is provided for the common case
//! of a TOML document.
//!
//! ```
//! # use emfexport_core::ExporterConfig;
//! let config = ExporterConfig::from_toml(r#"
//!     log_group_name = "/aws/ecs/containerinsights/{ClusterName}/performance"
//!     log_stream_name = "{TaskId}"
//!     create_kubernetes_object = true
//!
//!     [[metric_descriptors]]
//!     metric_name = "memory_usage"
//!     unit = "Bytes"
//!     overwrite = true
//! "#).unwrap();
//!
//! assert_eq!(config.log_stream_name, "{TaskId}");
//! assert!(config.descriptors().get("memory_usage").is_some());
//! ```

use std::{collections::HashMap, fmt};

use serde::Deserialize;

use crate::unit::Unit;

/// Configuration of the translation stage.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExporterConfig {
    /// Namespace for all metrics. When empty, the namespace is derived from the `service.namespace`
    /// and `service.name` resource attributes.
    pub namespace: String,
    /// Log group name, possibly containing `{Placeholder}` tokens. When empty, defaults to
    /// `/metrics/{namespace}`.
    pub log_group_name: String,
    /// Log stream name, possibly containing `{Placeholder}` tokens.
    pub log_stream_name: String,
    /// Per-metric unit overrides
    pub metric_descriptors: Vec<MetricDescriptor>,
    /// Attach a structured `kubernetes` object to `Pod` and `Container` metrics
    pub create_kubernetes_object: bool,
}

impl ExporterConfig {
    /// Parse a configuration from a TOML document
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }

    /// Build the per-metric descriptor table.
    ///
    /// Descriptors with an empty metric name or with a unit that is not a CloudWatch unit name are
    /// dropped with a warning. If several descriptors name the same metric, the last one wins.
    pub fn descriptors(&self) -> MetricDescriptors {
        self.metric_descriptors
            .iter()
            .filter(|descriptor| match descriptor.validate() {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(
                        message = "dropped metric descriptor",
                        metric = %descriptor.metric_name,
                        unit = %descriptor.unit,
                        error = %err,
                    );
                    false
                }
            })
            .cloned()
            .collect()
    }
}

/// Overrides the unit of a single metric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricDescriptor {
    /// Name of the metric the descriptor applies to
    pub metric_name: String,
    /// CloudWatch unit name, for example `Bytes`
    pub unit: String,
    /// If true, `unit` replaces the unit of the metric even when the metric carries one
    #[serde(default)]
    pub overwrite: bool,
}

impl MetricDescriptor {
    /// Check that this descriptor names a metric and a CloudWatch unit
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metric_name.is_empty() {
            return Err(ConfigError::Invalid("metric name can't be empty".into()));
        }
        if Unit::from_name(&self.unit).is_none() {
            return Err(ConfigError::Invalid(format!(
                "`{}` is not a CloudWatch unit",
                self.unit
            )));
        }
        Ok(())
    }
}

/// Metric descriptors keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricDescriptors(HashMap<String, MetricDescriptor>);

impl MetricDescriptors {
    /// Look up the descriptor for `metric_name`
    pub fn get(&self, metric_name: &str) -> Option<&MetricDescriptor> {
        self.0.get(metric_name)
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no descriptors
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<MetricDescriptor> for MetricDescriptors {
    fn from_iter<T: IntoIterator<Item = MetricDescriptor>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|descriptor| (descriptor.metric_name.clone(), descriptor))
                .collect(),
        )
    }
}

/// Errors from parsing or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The document could not be parsed
    Parse(toml::de::Error),
    /// A value was rejected
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid configuration: {err}"),
            Self::Invalid(reason) => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}
