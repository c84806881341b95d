//! Container shape resolution
//!
//! Classifies a `TypeRef` into a `TypeShape` tree and decides how container
//! types can be rebuilt. Resolution is a pure function over the metadata and
//! never fails: anything it cannot classify degrades to `Unknown`, which is
//! copied as-is.
//!
//! Construction strategies are probed in a fixed priority order over a
//! closed set (see [`ConstructionStrategy::PRIORITY`]); the first match wins.
//!
//! # Limitation
//!
//! A container type with no usable constructor resolves to
//! [`ConstructionStrategy::Identity`]: the source container is passed
//! through by reference and its elements are not cloned. Mutating such a
//! container on the clone mutates the original.

use crate::descriptor::{CtorParam, TypeKind, TypeRef};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Resolved shape of a type reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TypeShape {
    /// Primitive, value or string-like type
    Scalar,
    /// Optional reference or nullable value type
    Nullable { inner: Box<TypeShape> },
    /// Type carrying its own compiled clone operations
    DeepCloneable { type_name: String },
    Array { element: Box<TypeShape> },
    SequenceContainer {
        container: String,
        element: Box<TypeShape>,
        strategy: ConstructionStrategy,
    },
    MapContainer {
        container: String,
        key_type: String,
        value_type: String,
        key: Box<TypeShape>,
        value: Box<TypeShape>,
        strategy: ConstructionStrategy,
    },
    /// The generic sequence interface itself; cloned as a lazy projection
    GenericEnumerable { element: Box<TypeShape> },
    /// Unclassified; treated as scalar
    Unknown { type_name: String },
}

/// How a container instance is rebuilt from its transformed elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionStrategy {
    /// A constructor accepts the container's own interface type
    SelfConstructible,
    /// A constructor accepts a generic sequence of the element type
    EnumerableConstructible,
    /// A constructor accepts a sequence of key/value pairs (maps only)
    KeyValueConstructible,
    /// No usable constructor; the source container is passed through
    Identity,
}

impl ConstructionStrategy {
    /// Probe order; `Identity` is the fallback and always last
    pub const PRIORITY: [ConstructionStrategy; 4] = [
        ConstructionStrategy::SelfConstructible,
        ConstructionStrategy::EnumerableConstructible,
        ConstructionStrategy::KeyValueConstructible,
        ConstructionStrategy::Identity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConstructionStrategy::SelfConstructible => "self",
            ConstructionStrategy::EnumerableConstructible => "enumerable",
            ConstructionStrategy::KeyValueConstructible => "key_value",
            ConstructionStrategy::Identity => "identity",
        }
    }
}

/// What a container exposes through its collection interfaces
enum ContainerKind<'a> {
    Sequence {
        element: &'a TypeRef,
    },
    Mapping {
        key: &'a TypeRef,
        value: &'a TypeRef,
        entry: Option<&'a TypeRef>,
    },
}

impl TypeShape {
    /// Replace every deep-cloneable leaf with a plain copy
    pub fn without_deep_clone(self) -> TypeShape {
        match self {
            TypeShape::DeepCloneable { type_name } => TypeShape::Unknown { type_name },
            TypeShape::Nullable { inner } => TypeShape::Nullable {
                inner: Box::new(inner.without_deep_clone()),
            },
            TypeShape::Array { element } => TypeShape::Array {
                element: Box::new(element.without_deep_clone()),
            },
            TypeShape::SequenceContainer {
                container,
                element,
                strategy,
            } => TypeShape::SequenceContainer {
                container,
                element: Box::new(element.without_deep_clone()),
                strategy,
            },
            TypeShape::MapContainer {
                container,
                key_type,
                value_type,
                key,
                value,
                strategy,
            } => TypeShape::MapContainer {
                container,
                key_type,
                value_type,
                key: Box::new(key.without_deep_clone()),
                value: Box::new(value.without_deep_clone()),
                strategy,
            },
            TypeShape::GenericEnumerable { element } => TypeShape::GenericEnumerable {
                element: Box::new(element.without_deep_clone()),
            },
            other => other,
        }
    }
}

/// Resolve the shape of a type reference
pub fn resolve(typ: &TypeRef) -> TypeShape {
    if typ.kind == TypeKind::Parameter {
        debug!(type_name = %typ.name, "open generic parameter resolves to unknown");
        return unknown(typ);
    }

    if typ.nullable {
        return TypeShape::Nullable {
            inner: Box::new(resolve(&typ.non_nullable())),
        };
    }

    if let Some(options) = &typ.cloneable {
        if options.allows_deep_copy() {
            return TypeShape::DeepCloneable {
                type_name: typ.name.clone(),
            };
        }
    }

    match typ.kind {
        TypeKind::String | TypeKind::Value => TypeShape::Scalar,
        TypeKind::Array => match &typ.element {
            Some(element) => TypeShape::Array {
                element: Box::new(resolve(element)),
            },
            None => {
                debug!(type_name = %typ.name, "array without element type resolves to unknown");
                unknown(typ)
            }
        },
        TypeKind::Reference => resolve_container(typ).unwrap_or_else(|| unknown(typ)),
        TypeKind::Parameter => unknown(typ),
    }
}

fn unknown(typ: &TypeRef) -> TypeShape {
    TypeShape::Unknown {
        type_name: typ.name.clone(),
    }
}

fn container_kind(typ: &TypeRef) -> Option<ContainerKind<'_>> {
    // Mapping takes precedence over sequence when both are implemented.
    if let Some((key, value)) = typ.mapping_interface() {
        return Some(ContainerKind::Mapping {
            key,
            value,
            entry: typ.sequence_element(),
        });
    }
    typ.sequence_element()
        .map(|element| ContainerKind::Sequence { element })
}

fn resolve_container(typ: &TypeRef) -> Option<TypeShape> {
    let kind = container_kind(typ)?;
    let strategy = resolve_strategy(typ, &kind);

    let shape = match kind {
        ContainerKind::Mapping { key, value, .. } => TypeShape::MapContainer {
            container: typ.name.clone(),
            key_type: key.name.clone(),
            value_type: value.name.clone(),
            key: Box::new(resolve(key)),
            value: Box::new(resolve(value)),
            strategy,
        },
        ContainerKind::Sequence { element }
            if typ.sequence_interface && strategy == ConstructionStrategy::Identity =>
        {
            TypeShape::GenericEnumerable {
                element: Box::new(resolve(element)),
            }
        }
        ContainerKind::Sequence { element } => TypeShape::SequenceContainer {
            container: typ.name.clone(),
            element: Box::new(resolve(element)),
            strategy,
        },
    };

    if strategy == ConstructionStrategy::Identity
        && !matches!(shape, TypeShape::GenericEnumerable { .. })
    {
        debug!(
            container = %typ.name,
            "no usable constructor, container is passed through unmodified"
        );
    }

    Some(shape)
}

fn resolve_strategy(typ: &TypeRef, kind: &ContainerKind<'_>) -> ConstructionStrategy {
    ConstructionStrategy::PRIORITY
        .into_iter()
        .find(|strategy| strategy_applies(*strategy, typ, kind))
        .unwrap_or(ConstructionStrategy::Identity)
}

fn strategy_applies(
    strategy: ConstructionStrategy,
    typ: &TypeRef,
    kind: &ContainerKind<'_>,
) -> bool {
    match strategy {
        ConstructionStrategy::SelfConstructible => {
            typ.has_ctor_param(|p| matches!(p, CtorParam::OwnInterface))
        }
        ConstructionStrategy::EnumerableConstructible => {
            let element = match kind {
                ContainerKind::Sequence { element } => Some(*element),
                ContainerKind::Mapping { entry, .. } => *entry,
            };
            element.is_some_and(|element| {
                typ.has_ctor_param(
                    |p| matches!(p, CtorParam::Sequence { element: e } if *e == element.name),
                )
            })
        }
        ConstructionStrategy::KeyValueConstructible => match kind {
            ContainerKind::Mapping { key, value, .. } => typ.has_ctor_param(|p| {
                matches!(
                    p,
                    CtorParam::PairSequence { key: k, value: v }
                        if *k == key.name && *v == value.name
                )
            }),
            ContainerKind::Sequence { .. } => false,
        },
        ConstructionStrategy::Identity => true,
    }
}
