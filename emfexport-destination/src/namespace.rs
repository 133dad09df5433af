// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use emfexport_core::AttributeSource;

/// Resource attribute naming the service
pub const SERVICE_NAME: &str = "service.name";
/// Resource attribute naming the namespace of the service
pub const SERVICE_NAMESPACE: &str = "service.namespace";

/// Pick the metric namespace for a resource batch.
///
/// A non-empty `configured` namespace is returned as is. Otherwise the namespace is
/// `{service.namespace}/{service.name}`, or whichever of the two attributes is present, or empty
/// if neither is.
pub fn resolve_namespace(attributes: &impl AttributeSource, configured: &str) -> String {
    if !configured.is_empty() {
        return configured.to_owned();
    }
    match (
        attributes.get_str(SERVICE_NAMESPACE),
        attributes.get_str(SERVICE_NAME),
    ) {
        (Some(namespace), Some(name)) => format!("{namespace}/{name}"),
        (Some(namespace), None) => namespace.into_owned(),
        (None, Some(name)) => name.into_owned(),
        (None, None) => String::new(),
    }
}
