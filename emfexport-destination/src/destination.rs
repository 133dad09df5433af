// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use emfexport_core::{AttributeSource, ExporterConfig};

use crate::pattern::resolve_pattern;

/// CloudWatch Logs log group and log stream that a batch is written to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LogDestination {
    /// Log group name. Empty if there is neither a configured name nor a namespace.
    pub log_group: String,
    /// Log stream name. Empty unless configured.
    pub log_stream: String,
}

/// Resolve the log destination of one resource batch.
///
/// - Without a configured log group name, the log group is `/metrics/{namespace}`, or empty if
///   `namespace` is empty.
/// - Without a configured log stream name, the log stream is empty. There is no default.
/// - Configured names are passed through [`resolve_pattern`] against `attributes`.
pub fn resolve_log_destination(
    attributes: &impl AttributeSource,
    namespace: &str,
    config: &ExporterConfig,
) -> LogDestination {
    let log_group = if !config.log_group_name.is_empty() {
        resolve_pattern(&config.log_group_name, attributes)
    } else if !namespace.is_empty() {
        format!("/metrics/{namespace}")
    } else {
        String::new()
    };
    let log_stream = if config.log_stream_name.is_empty() {
        String::new()
    } else {
        resolve_pattern(&config.log_stream_name, attributes)
    };
    LogDestination {
        log_group,
        log_stream,
    }
}
