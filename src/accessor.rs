//! Accessor plan synthesis
//!
//! Turns a member's `TypeShape` into an `AccessorPlan`: a tree of
//! transformation steps that produces the cloned value from the source
//! value. The tree mirrors the shape one level at a time, so null guards sit
//! at exactly the nesting depth where the shape was nullable.

use crate::shape::{ConstructionStrategy, TypeShape};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Which whole-type operation a deep-clone call site invokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CloneOp {
    /// No cycle protection
    Fast,
    /// Threads the shared visited stack
    Safe,
}

/// Transformation from a source value to its cloned value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum AccessorPlan {
    /// Copy as-is (reference types alias the source)
    CopyScalar,
    /// Invoke the value's own clone operation
    CallClone { nullable: bool, op: CloneOp },
    /// Null short-circuits to null without running `inner`
    NullGuard { inner: Box<AccessorPlan> },
    /// New array of the same length, each slot transformed
    MapArray { element: Box<AccessorPlan> },
    /// New container built per `strategy` from transformed elements
    MapSequence {
        container: String,
        element: Box<AccessorPlan>,
        strategy: ConstructionStrategy,
    },
    /// New container built per `strategy` from independently transformed keys and values
    MapMap {
        container: String,
        key_type: String,
        value_type: String,
        key: Box<AccessorPlan>,
        value: Box<AccessorPlan>,
        strategy: ConstructionStrategy,
    },
    /// Lazy transformed sequence, not materialized
    ProjectSequence { element: Box<AccessorPlan> },
    /// Pass the source through by reference
    Identity,
}

impl AccessorPlan {
    /// Copies the value without any clone work
    pub fn is_copy(&self) -> bool {
        matches!(self, AccessorPlan::CopyScalar | AccessorPlan::Identity)
    }

    /// Same tree with every deep-clone call site targeting `op`
    pub fn with_op(&self, op: CloneOp) -> AccessorPlan {
        match self {
            AccessorPlan::CopyScalar => AccessorPlan::CopyScalar,
            AccessorPlan::Identity => AccessorPlan::Identity,
            AccessorPlan::CallClone { nullable, .. } => AccessorPlan::CallClone {
                nullable: *nullable,
                op,
            },
            AccessorPlan::NullGuard { inner } => AccessorPlan::NullGuard {
                inner: Box::new(inner.with_op(op)),
            },
            AccessorPlan::MapArray { element } => AccessorPlan::MapArray {
                element: Box::new(element.with_op(op)),
            },
            AccessorPlan::MapSequence {
                container,
                element,
                strategy,
            } => AccessorPlan::MapSequence {
                container: container.clone(),
                element: Box::new(element.with_op(op)),
                strategy: *strategy,
            },
            AccessorPlan::MapMap {
                container,
                key_type,
                value_type,
                key,
                value,
                strategy,
            } => AccessorPlan::MapMap {
                container: container.clone(),
                key_type: key_type.clone(),
                value_type: value_type.clone(),
                key: Box::new(key.with_op(op)),
                value: Box::new(value.with_op(op)),
                strategy: *strategy,
            },
            AccessorPlan::ProjectSequence { element } => AccessorPlan::ProjectSequence {
                element: Box::new(element.with_op(op)),
            },
        }
    }

    /// Number of deep-clone call sites in the tree
    pub fn call_sites(&self) -> usize {
        match self {
            AccessorPlan::CopyScalar | AccessorPlan::Identity => 0,
            AccessorPlan::CallClone { .. } => 1,
            AccessorPlan::NullGuard { inner } => inner.call_sites(),
            AccessorPlan::MapArray { element }
            | AccessorPlan::MapSequence { element, .. }
            | AccessorPlan::ProjectSequence { element } => element.call_sites(),
            AccessorPlan::MapMap { key, value, .. } => key.call_sites() + value.call_sites(),
        }
    }

    /// Every deep-clone call site targets `op`
    pub fn targets(&self, op: CloneOp) -> bool {
        match self {
            AccessorPlan::CopyScalar | AccessorPlan::Identity => true,
            AccessorPlan::CallClone { op: site, .. } => *site == op,
            AccessorPlan::NullGuard { inner } => inner.targets(op),
            AccessorPlan::MapArray { element }
            | AccessorPlan::MapSequence { element, .. }
            | AccessorPlan::ProjectSequence { element } => element.targets(op),
            AccessorPlan::MapMap { key, value, .. } => key.targets(op) && value.targets(op),
        }
    }
}

/// Compact one-line notation, e.g. `guard(array(clone?))`
impl fmt::Display for AccessorPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessorPlan::CopyScalar => write!(f, "copy"),
            AccessorPlan::Identity => write!(f, "identity"),
            AccessorPlan::CallClone { nullable, op } => {
                let name = match op {
                    CloneOp::Fast => "clone",
                    CloneOp::Safe => "clone_safe",
                };
                write!(f, "{}{}", name, if *nullable { "?" } else { "" })
            }
            AccessorPlan::NullGuard { inner } => write!(f, "guard({})", inner),
            AccessorPlan::MapArray { element } => write!(f, "array({})", element),
            AccessorPlan::MapSequence {
                container,
                element,
                strategy,
            } => write!(f, "{}[{}]({})", container, strategy.as_str(), element),
            AccessorPlan::MapMap {
                container,
                key,
                value,
                strategy,
                ..
            } => {
                let strategy = strategy.as_str();
                write!(f, "{}[{}]({}, {})", container, strategy, key, value)
            }
            AccessorPlan::ProjectSequence { element } => write!(f, "project({})", element),
        }
    }
}

/// Build the accessor plan for a shape; call sites target the fast operation
pub fn synthesize(path: &str, shape: &TypeShape) -> AccessorPlan {
    let plan = match shape {
        TypeShape::Scalar | TypeShape::Unknown { .. } => AccessorPlan::CopyScalar,
        TypeShape::Nullable { inner } => guard(synthesize(path, inner)),
        TypeShape::DeepCloneable { .. } => AccessorPlan::CallClone {
            nullable: false,
            op: CloneOp::Fast,
        },
        TypeShape::Array { element } => AccessorPlan::MapArray {
            element: Box::new(synthesize(&format!("{}[]", path), element)),
        },
        TypeShape::SequenceContainer {
            strategy: ConstructionStrategy::Identity,
            ..
        }
        | TypeShape::MapContainer {
            strategy: ConstructionStrategy::Identity,
            ..
        } => AccessorPlan::Identity,
        TypeShape::SequenceContainer {
            container,
            element,
            strategy,
        } => AccessorPlan::MapSequence {
            container: container.clone(),
            element: Box::new(synthesize(&format!("{}[]", path), element)),
            strategy: *strategy,
        },
        TypeShape::MapContainer {
            container,
            key_type,
            value_type,
            key,
            value,
            strategy,
        } => AccessorPlan::MapMap {
            container: container.clone(),
            key_type: key_type.clone(),
            value_type: value_type.clone(),
            key: Box::new(synthesize(&format!("{}.Key", path), key)),
            value: Box::new(synthesize(&format!("{}.Value", path), value)),
            strategy: *strategy,
        },
        TypeShape::GenericEnumerable { element } => AccessorPlan::ProjectSequence {
            element: Box::new(synthesize(&format!("{}[]", path), element)),
        },
    };
    trace!(path, ?plan, "synthesized accessor");
    plan
}

fn guard(inner: AccessorPlan) -> AccessorPlan {
    match inner {
        // Null copies through unchanged.
        AccessorPlan::CopyScalar | AccessorPlan::Identity => inner,
        AccessorPlan::CallClone { op, .. } => AccessorPlan::CallClone { nullable: true, op },
        AccessorPlan::NullGuard { .. } => inner,
        other => AccessorPlan::NullGuard {
            inner: Box::new(other),
        },
    }
}
