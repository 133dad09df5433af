// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! A read-only view over resource-level and metric-level attributes.
//!
//! Destination naming and namespace derivation only ever read attributes, so they are written
//! against the [`AttributeSource`] trait rather than a concrete map type.

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    fmt,
};

/// The value of a single attribute.
///
/// [`AttributeValue::Null`] is an attribute that is present but carries no value. Lookups that
/// need a usable value treat it the same as a missing attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Present, but empty
    Null,
    /// A string value
    String(String),
    /// A boolean value
    Bool(bool),
    /// A signed integer value
    Int(i64),
    /// A floating-point value
    Double(f64),
}

impl AttributeValue {
    /// Returns the textual form of this value, or `None` for [`AttributeValue::Null`].
    pub fn as_str(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::String(s) => Some(Cow::Borrowed(s)),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    /// Returns true if this is [`AttributeValue::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => fmt::Display::fmt(b, f),
            Self::Int(i) => fmt::Display::fmt(i, f),
            Self::Double(d) => fmt::Display::fmt(d, f),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

/// Read-only key/value lookup over attributes.
///
/// Implementations must not change their contents while a batch is being translated, which makes
/// it safe to share one source between parallel batch workers.
pub trait AttributeSource {
    /// Look up the raw value for `key`.
    fn get(&self, key: &str) -> Option<&AttributeValue>;

    /// Look up `key` as text. Missing and [`AttributeValue::Null`] attributes both give `None`.
    fn get_str(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).and_then(AttributeValue::as_str)
    }
}

impl<T: AttributeSource + ?Sized> AttributeSource for &T {
    fn get(&self, key: &str) -> Option<&AttributeValue> {
        (**self).get(key)
    }
}

impl<S: std::hash::BuildHasher> AttributeSource for HashMap<String, AttributeValue, S> {
    fn get(&self, key: &str) -> Option<&AttributeValue> {
        HashMap::get(self, key)
    }
}

impl AttributeSource for BTreeMap<String, AttributeValue> {
    fn get(&self, key: &str) -> Option<&AttributeValue> {
        BTreeMap::get(self, key)
    }
}

/// An owned attribute map.
///
/// ```
/// # use emfexport_core::{AttributeSource, Attributes};
/// let mut attributes = Attributes::new();
/// attributes.insert("aws.ecs.task.id", "test-task-id");
/// attributes.insert_null("ClusterName");
///
/// assert_eq!(attributes.get_str("aws.ecs.task.id").as_deref(), Some("test-task-id"));
/// assert_eq!(attributes.get_str("ClusterName"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    /// Create an empty attribute map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the attribute `key`
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert `key` as a present-but-null attribute
    pub fn insert_null(&mut self, key: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), AttributeValue::Null);
        self
    }

    /// Number of attributes, including null ones
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no attributes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the attributes in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl AttributeSource for Attributes {
    fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
