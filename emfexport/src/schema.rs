// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Projection of flat labels onto a nested JSON structure.
//!
//! A [`SchemaNode`] tree describes the shape of the output. Each [`SchemaNode::Leaf`] names the
//! label whose value goes there; labels that are missing drop their leaf, and branches that end
//! up empty are dropped as well.
//!
//! This is used to attach the `kubernetes` object that CloudWatch Container Insights expects on
//! Fargate pod and container metrics:
//!
//! ```
//! # use emfexport::schema::add_kubernetes_wrapper;
//! # use emfexport::core::Labels;
//! let mut labels = Labels::new();
//! labels.insert("pod_name".into(), "web-1".into());
//! labels.insert("app".into(), "web".into());
//!
//! add_kubernetes_wrapper(&mut labels).unwrap();
//! assert_eq!(labels["kubernetes"], r#"{"labels":{"app":"web"},"pod_name":"web-1"}"#);
//! ```

use std::fmt;

use emfexport_core::Labels;
use serde_json::{Map, Value};

/// Label that receives the serialized `kubernetes` object
pub const KUBERNETES_LABEL: &str = "kubernetes";

/// Label holding the Container Insights object type
pub const TYPE_LABEL: &str = "Type";

/// Object types that get a `kubernetes` object when enrichment is enabled
pub const KUBERNETES_OBJECT_TYPES: [&str; 2] = ["Pod", "Container"];

/// A node of a schema template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaNode<'a> {
    /// Filled with the value of the named label
    Leaf(&'a str),
    /// A nested object with the given fields, in order
    Branch(&'a [SchemaField<'a>]),
}

/// A named child of a [`SchemaNode::Branch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField<'a> {
    /// Output field name
    pub name: &'a str,
    /// Field contents
    pub node: SchemaNode<'a>,
}

/// Builds a [`SchemaNode`] from a JSON-like literal.
///
/// `"label"` is a [`SchemaNode::Leaf`], `{ "field": ..., }` is a [`SchemaNode::Branch`].
macro_rules! schema {
    ($label:literal) => {
        SchemaNode::Leaf($label)
    };
    ({ $($name:literal : $node:tt),* $(,)? }) => {
        SchemaNode::Branch(&[$(SchemaField {
            name: $name,
            node: schema!($node),
        }),*])
    };
}

/// The `kubernetes` object of Container Insights on EKS Fargate.
pub const KUBERNETES_SCHEMA: SchemaNode<'static> = schema!({
    "host": "host_name",
    "labels": {
        "app": "app",
        "pod-template-hash": "pod-template-hash",
    },
    "namespace_name": "namespace_name",
    "pod_id": "pod_id",
    "pod_name": "pod_name",
    "pod_owners": {
        "owner_kind": "owner_kind",
        "owner_name": "owner_name",
    },
    "service_name": "service_name",
});

/// Fill `node` from `labels`.
///
/// Returns `None` if nothing below `node` found a label.
pub fn fill(labels: &Labels, node: &SchemaNode<'_>) -> Option<Value> {
    match node {
        SchemaNode::Leaf(label) => labels.get(*label).map(|value| Value::String(value.clone())),
        SchemaNode::Branch(fields) => {
            let object: Map<String, Value> = fields
                .iter()
                .filter_map(|field| Some((field.name.to_owned(), fill(labels, &field.node)?)))
                .collect();
            (!object.is_empty()).then_some(Value::Object(object))
        }
    }
}

/// Fill `node` from `labels` and serialize the result as JSON.
///
/// An object with nothing in it serializes as `{}`.
pub fn fill_to_string(labels: &Labels, node: &SchemaNode<'_>) -> Result<String, SchemaError> {
    let value = fill(labels, node).unwrap_or_else(|| Value::Object(Map::new()));
    Ok(serde_json::to_string(&value)?)
}

/// Returns true if `labels` describe a pod or container
pub fn is_kubernetes_object(labels: &Labels) -> bool {
    labels
        .get(TYPE_LABEL)
        .is_some_and(|object_type| KUBERNETES_OBJECT_TYPES.contains(&object_type.as_str()))
}

/// Add the [`KUBERNETES_LABEL`] built from [`KUBERNETES_SCHEMA`] to `labels`.
pub fn add_kubernetes_wrapper(labels: &mut Labels) -> Result<(), SchemaError> {
    let object = fill_to_string(labels, &KUBERNETES_SCHEMA)?;
    labels.insert(KUBERNETES_LABEL.to_owned(), object);
    Ok(())
}

/// The filled structure could not be serialized.
#[derive(Debug)]
pub struct SchemaError(serde_json::Error);

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "couldn't serialize schema: {}", self.0)
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(value: serde_json::Error) -> Self {
        Self(value)
    }
}
