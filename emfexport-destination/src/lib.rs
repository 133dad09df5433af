// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Resolves where translated metrics are published.
//!
//! Each resource batch gets a namespace ([`resolve_namespace`]) and a CloudWatch Logs
//! [`LogDestination`] ([`resolve_log_destination`]). Configured log group and log stream names
//! may contain `{Placeholder}` tokens which are filled in from resource attributes by
//! [`resolve_pattern`].
//!
//! Nothing here is cached: resource attributes differ between batches, so every batch is
//! resolved on its own.

#![deny(missing_docs)]

mod destination;
mod namespace;
mod pattern;

pub use destination::{LogDestination, resolve_log_destination};
pub use namespace::{SERVICE_NAME, SERVICE_NAMESPACE, resolve_namespace};
pub use pattern::{PLACEHOLDERS, Placeholder, UNDEFINED, resolve_pattern};
