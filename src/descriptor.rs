//! Type descriptors: the compiler's input model
//!
//! A `TypeDescriptor` is the already-extracted metadata of one cloneable
//! type: its identity, its ordered members, and the clone markers attached
//! to the type and to each member. The markers are plain data
//! (`CloneOptions`, `MemberOptions`) resolved once by the extractor.
//!
//! ## Example Descriptor
//!
//! ```yaml
//! name: DeepListClone
//! namespace: Cloneable.Sample
//! members:
//!   - name: A
//!     type: { name: string, kind: string }
//!   - name: B
//!     type:
//!       name: global::System.Collections.Generic.List<global::Cloneable.Sample.SimpleClone>
//!       interfaces:
//!         - kind: sequence
//!           element:
//!             name: global::Cloneable.Sample.SimpleClone
//!             cloneable: {}
//!       constructors:
//!         - params: []
//!         - params:
//!             - kind: sequence
//!               element: global::Cloneable.Sample.SimpleClone
//! ```

use crate::error::{Error, Result};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Metadata of one cloneable type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(
    title = "Type Descriptor",
    description = "Extracted member metadata of a cloneable type"
)]
pub struct TypeDescriptor {
    /// Simple type name
    pub name: String,

    /// Fully-qualified name; derived from namespace and name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqn: Option<String>,

    /// Containing namespace (empty for the global namespace)
    #[serde(default)]
    pub namespace: String,

    /// Declared visibility of the type
    #[serde(default)]
    pub visibility: Visibility,

    /// Options from the type's cloneable marker
    #[serde(default, skip_serializing_if = "CloneOptions::is_default")]
    pub options: CloneOptions,

    /// Members in declaration order
    #[serde(default)]
    pub members: Vec<MemberDescriptor>,
}

/// Type visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Internal,
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Internal => "internal",
        }
    }
}

/// Options carried by a type's cloneable marker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CloneOptions {
    /// Only members carrying the explicit include marker participate
    #[serde(default)]
    pub explicit_declaration: bool,

    /// When `Some(true)`, references to this type are copied instead of deep-cloned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_deep_copy: Option<bool>,
}

impl CloneOptions {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Whether a reference to a type with these options is deep-cloned
    pub fn allows_deep_copy(&self) -> bool {
        !self.prevent_deep_copy.unwrap_or(false)
    }
}

/// A member (property or field) of a cloneable type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MemberDescriptor {
    /// Member name
    pub name: String,

    /// Member type
    #[serde(rename = "type")]
    pub typ: TypeRef,

    /// Member has no mutator
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,

    /// Markers attached to the member
    #[serde(default, skip_serializing_if = "MemberOptions::is_default")]
    pub options: MemberOptions,
}

/// Markers attached to a member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MemberOptions {
    /// Ignore marker: never deep-cloned
    #[serde(default)]
    pub ignore: bool,

    /// Explicit include marker (required when the type uses explicit declaration)
    #[serde(default)]
    pub include: bool,

    /// Member-level override of deep copying
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_deep_copy: Option<bool>,
}

impl MemberOptions {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Extracted metadata of a type reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TypeRef {
    /// Display name used by renderers (fully qualified where the target needs it)
    pub name: String,

    /// Broad kind of the type
    #[serde(default)]
    pub kind: TypeKind,

    /// Nullable annotation (optional reference or nullable value type)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,

    /// Present when the type itself carries the cloneable marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloneable: Option<CloneOptions>,

    /// Element type of an array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<TypeRef>>,

    /// Collection interfaces the type implements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<InterfaceRef>,

    /// The type is the generic sequence interface itself
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sequence_interface: bool,

    /// Public constructors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<Constructor>,
}

/// Broad kind of a type reference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// Primitive or user value type
    Value,
    /// String-like type
    String,
    #[default]
    Reference,
    Array,
    /// Open generic parameter
    Parameter,
}

/// A collection interface implemented by a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterfaceRef {
    /// Single-element sequence interface
    Sequence { element: TypeRef },
    /// Key/value mapping interface
    Mapping { key: TypeRef, value: TypeRef },
}

/// A constructor signature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Constructor {
    #[serde(default)]
    pub params: Vec<CtorParam>,
}

/// A constructor parameter, as far as container reconstruction cares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CtorParam {
    /// An instance of the container's own collection interface
    OwnInterface,
    /// A generic sequence of `element`
    Sequence { element: String },
    /// A generic sequence of key/value pairs
    PairSequence { key: String, value: String },
    /// Anything else
    Other { name: String },
}

impl TypeRef {
    /// Shorthand for a named reference type with no further metadata
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn value(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Value,
            ..Self::named(name)
        }
    }

    pub fn string() -> Self {
        Self {
            kind: TypeKind::String,
            ..Self::named("string")
        }
    }

    pub fn cloneable(name: impl Into<String>) -> Self {
        Self {
            cloneable: Some(CloneOptions::default()),
            ..Self::named(name)
        }
    }

    pub fn array_of(element: TypeRef) -> Self {
        Self {
            name: format!("{}[]", element.name),
            kind: TypeKind::Array,
            element: Some(Box::new(element)),
            ..Self::default()
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Same type without the nullable annotation
    pub fn non_nullable(&self) -> Self {
        Self {
            nullable: false,
            ..self.clone()
        }
    }

    /// Mapping interface type arguments, if implemented
    pub fn mapping_interface(&self) -> Option<(&TypeRef, &TypeRef)> {
        self.interfaces.iter().find_map(|i| match i {
            InterfaceRef::Mapping { key, value } => Some((key, value)),
            InterfaceRef::Sequence { .. } => None,
        })
    }

    /// Sequence interface element type, if implemented
    pub fn sequence_element(&self) -> Option<&TypeRef> {
        self.interfaces.iter().find_map(|i| match i {
            InterfaceRef::Sequence { element } => Some(element),
            InterfaceRef::Mapping { .. } => None,
        })
    }

    /// Any constructor has a parameter matching `pred`
    pub fn has_ctor_param(&self, pred: impl Fn(&CtorParam) -> bool) -> bool {
        self.constructors
            .iter()
            .any(|c| c.params.iter().any(&pred))
    }
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>, typ: TypeRef) -> Self {
        Self {
            name: name.into(),
            typ,
            read_only: false,
            options: MemberOptions::default(),
        }
    }

    pub fn ignored(mut self) -> Self {
        self.options.ignore = true;
        self
    }

    pub fn included(mut self) -> Self {
        self.options.include = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Multi-type descriptor document
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct DescriptorSet {
    types: Vec<TypeDescriptor>,
}

/// Parse a document holding either one descriptor or a `types:` list
pub fn parse_descriptors(yaml: &str) -> Result<Vec<TypeDescriptor>> {
    let doc: serde_norway::Value =
        serde_norway::from_str(yaml).map_err(|e| Error::DescriptorParse(e.to_string()))?;
    if doc.get("types").is_some() {
        let set: DescriptorSet =
            serde_norway::from_value(doc).map_err(|e| Error::DescriptorParse(e.to_string()))?;
        Ok(set.types)
    } else {
        serde_norway::from_value(doc)
            .map(|d| vec![d])
            .map_err(|e| Error::DescriptorParse(e.to_string()))
    }
}

/// C# identifier: optional `@`, a letter or `_`, then letters, digits,
/// combining marks, connectors and formatting characters
fn identifier_pattern() -> &'static Regex {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT.get_or_init(|| {
        Regex::new(r"^@?[\p{L}\p{Nl}_][\p{L}\p{Nl}\p{Nd}\p{Mn}\p{Mc}\p{Pc}\p{Cf}]*$")
            .expect("valid identifier regex")
    })
}

impl TypeDescriptor {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    pub fn explicit(mut self) -> Self {
        self.options.explicit_declaration = true;
        self
    }

    /// Parse descriptor from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::DescriptorParse(e.to_string()))
    }

    /// Serialize descriptor to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_norway::to_string(self).map_err(|e| Error::DescriptorParse(e.to_string()))
    }

    /// Parse descriptor from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::DescriptorParse(e.to_string()))
    }

    /// Serialize descriptor to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::DescriptorParse(e.to_string()))
    }

    /// Fully-qualified name
    pub fn fqn(&self) -> String {
        match &self.fqn {
            Some(fqn) => fqn.clone(),
            None if self.namespace.is_empty() => format!("global::{}", self.name),
            None => format!("global::{}.{}", self.namespace, self.name),
        }
    }

    /// Compute hash of descriptor for provenance
    pub fn hash(&self) -> String {
        use sha2::{Digest, Sha256};
        let content = self.to_yaml().unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("sha256:{}", hex::encode(&hasher.finalize()[..8]))
    }

    /// Check the invariants the extractor is expected to uphold
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let ident = identifier_pattern();

        if !ident.is_match(&self.name) {
            errors.push(format!("Type name `{}` is not a valid identifier", self.name));
        }

        let mut seen = HashSet::new();
        for member in &self.members {
            if !ident.is_match(&member.name) {
                errors.push(format!(
                    "Member name `{}` is not a valid identifier",
                    member.name
                ));
            }
            if !seen.insert(member.name.as_str()) {
                errors.push(format!("Duplicate member `{}`", member.name));
            }
            if member.read_only && member.options.include {
                errors.push(format!(
                    "Member `{}` is marked for cloning but has no mutator",
                    member.name
                ));
            }
            if member.typ.name.is_empty() {
                errors.push(format!("Member `{}` has an empty type name", member.name));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(name: &str) -> MemberDescriptor {
        MemberDescriptor::new(name, TypeRef::string())
    }

    const SIMPLE: &str = r#"
name: SimpleClone
namespace: Cloneable.Sample
members:
  - name: A
    type: { name: string, kind: string }
  - name: B
    type: { name: int, kind: value }
    options: { ignore: true }
"#;

    #[test]
    fn test_parse_yaml() {
        let desc = TypeDescriptor::from_yaml(SIMPLE).unwrap();
        assert_eq!(desc.name, "SimpleClone");
        assert_eq!(desc.members.len(), 2);
        assert_eq!(desc.members[0].typ.kind, TypeKind::String);
        assert!(desc.members[1].options.ignore);
        assert_eq!(desc.visibility, Visibility::Public);
    }

    #[test]
    fn test_fqn_defaults() {
        let desc = TypeDescriptor::from_yaml(SIMPLE).unwrap();
        assert_eq!(desc.fqn(), "global::Cloneable.Sample.SimpleClone");

        let global = TypeDescriptor::new("", "Root");
        assert_eq!(global.fqn(), "global::Root");
    }

    #[test]
    fn test_parse_descriptor_set() {
        let yaml = r#"
types:
  - name: First
  - name: Second
    visibility: internal
"#;
        let descs = parse_descriptors(yaml).unwrap();
        assert_eq!(descs.len(), 2);
        assert_eq!(descs[1].visibility, Visibility::Internal);

        let single = parse_descriptors(SIMPLE).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_parse_container_metadata() {
        let yaml = r#"
name: Holder
members:
  - name: Items
    type:
      name: List<Item>
      interfaces:
        - kind: sequence
          element: { name: Item, cloneable: {} }
      constructors:
        - params: [{ kind: sequence, element: Item }]
"#;
        let desc = TypeDescriptor::from_yaml(yaml).unwrap();
        let typ = &desc.members[0].typ;
        assert_eq!(typ.sequence_element().unwrap().name, "Item");
        assert!(typ.has_ctor_param(
            |p| matches!(p, CtorParam::Sequence { element } if element == "Item")
        ));
        assert!(typ.mapping_interface().is_none());
    }

    #[test]
    fn test_hash_stable() {
        let a = TypeDescriptor::from_yaml(SIMPLE).unwrap();
        let b = TypeDescriptor::from_yaml(SIMPLE).unwrap();
        assert_eq!(a.hash(), b.hash());
        assert!(a.hash().starts_with("sha256:"));
    }

    #[test]
    fn test_validate_reports_problems() {
        let desc = TypeDescriptor::new("Ns", "Broken")
            .with_member(text("A"))
            .with_member(text("A"))
            .with_member(text("Fixed").read_only().included())
            .with_member(text("bad name"));

        let errors = desc.validate();
        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(errors.iter().any(|e| e.contains("Duplicate member `A`")));
        assert!(errors.iter().any(|e| e.contains("no mutator")));
        assert!(errors.iter().any(|e| e.contains("bad name")));
    }

    #[test]
    fn test_unicode_identifiers_are_valid() {
        let desc = TypeDescriptor::new("Ns", "Größe")
            .with_member(text("Länge"))
            .with_member(text("名前"))
            .with_member(text("_Δx2"))
            .with_member(text("@class"));
        assert!(desc.validate().is_empty(), "{:?}", desc.validate());

        let desc = TypeDescriptor::new("Ns", "Bad")
            .with_member(text("1st"))
            .with_member(text("a-b"));
        assert_eq!(desc.validate().len(), 2);
    }

    #[test]
    fn test_read_only_without_marker_is_valid() {
        let desc = TypeDescriptor::new("Ns", "Ok")
            .with_member(text("Computed").read_only());
        assert!(desc.validate().is_empty());
    }

    #[test]
    fn test_yaml_roundtrip_skips_defaults() {
        let desc = TypeDescriptor::new("Ns", "T").with_member(text("A"));
        let yaml = desc.to_yaml().unwrap();
        assert!(!yaml.contains("read_only"));
        assert!(!yaml.contains("options"));
        assert_eq!(TypeDescriptor::from_yaml(&yaml).unwrap(), desc);
    }
}
