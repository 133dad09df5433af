// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;

use emfexport_core::AttributeSource;

/// Substituted for a known placeholder when none of its attributes has a value.
pub const UNDEFINED: &str = "undefined";

/// A `{Name}` token that can be used in log group and log stream names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    /// The name between the braces
    pub name: &'static str,
    /// The resource attribute holding the value. If it is missing or null, an attribute called
    /// [`name`](Self::name) is tried instead.
    pub attribute: &'static str,
}

impl Placeholder {
    /// Attribute keys to try, in priority order
    pub fn candidates(&self) -> [&'static str; 2] {
        [self.attribute, self.name]
    }

    fn resolve<'a>(&self, attributes: &'a impl AttributeSource) -> Cow<'a, str> {
        for key in self.candidates() {
            if let Some(value) = attributes.get_str(key) {
                return value;
            }
        }
        tracing::debug!(
            message = "no attribute for placeholder, substituting `undefined`",
            placeholder = self.name,
        );
        Cow::Borrowed(UNDEFINED)
    }
}

/// Every placeholder that [`resolve_pattern`] knows about.
pub const PLACEHOLDERS: &[Placeholder] = &[
    Placeholder {
        name: "ClusterName",
        attribute: "aws.ecs.cluster.name",
    },
    Placeholder {
        name: "TaskId",
        attribute: "aws.ecs.task.id",
    },
    Placeholder {
        name: "NodeName",
        attribute: "k8s.node.name",
    },
    Placeholder {
        name: "ContainerInstanceId",
        attribute: "aws.ecs.container.instance.id",
    },
    Placeholder {
        name: "TaskDefinitionFamily",
        attribute: "aws.ecs.task.family",
    },
];

fn placeholder(name: &str) -> Option<&'static Placeholder> {
    PLACEHOLDERS.iter().find(|p| p.name == name)
}

/// Fill in the `{Placeholder}` tokens of `template` from `attributes`.
///
/// - Tokens naming one of the [`PLACEHOLDERS`] are replaced by the first of its
///   [candidate attributes](Placeholder::candidates) that is present and not null, or by
///   [`UNDEFINED`] if there is none.
/// - Any other token is left exactly as written.
///
/// The template is scanned once from left to right, so substituted values are never expanded
/// again.
///
/// ```
/// # use emfexport_core::Attributes;
/// # use emfexport_destination::resolve_pattern;
/// let attributes: Attributes = [("aws.ecs.task.id", "test-task-id")].into_iter().collect();
///
/// assert_eq!(resolve_pattern("{TaskId}", &attributes), "test-task-id");
/// assert_eq!(resolve_pattern("/ecs/{ClusterName}", &attributes), "/ecs/undefined");
/// assert_eq!(resolve_pattern("/ecs/{WrongKey}", &attributes), "/ecs/{WrongKey}");
/// ```
pub fn resolve_pattern(template: &str, attributes: &impl AttributeSource) -> String {
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            break;
        };
        let name = &after_open[..close];
        // in `{a{Name}`, the token starts at the last `{`
        if let Some(inner) = name.rfind('{') {
            let token_start = open + 1 + inner;
            resolved.push_str(&rest[..token_start]);
            rest = &rest[token_start..];
            continue;
        }
        resolved.push_str(&rest[..open]);
        match placeholder(name) {
            Some(placeholder) => resolved.push_str(&placeholder.resolve(attributes)),
            None => resolved.push_str(&rest[open..open + close + 2]),
        }
        rest = &after_open[close + 1..];
    }
    resolved.push_str(rest);
    resolved
}
