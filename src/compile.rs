//! Clone plan compilation
//!
//! Assembles per-member accessor plans into the two whole-type operations:
//! the fast clone (no cycle protection) and the safe clone (threads a
//! visited stack through every deep-clone call site).
//!
//! Member selection:
//! - read-only members are never eligible
//! - members with the ignore marker are never deep-cloned; the
//!   [`IgnorePolicy`] decides whether they are shallow-copied or left out
//! - with explicit declaration on the type, only members carrying the
//!   include marker participate
//!
//! The output is deterministic: the same descriptor always compiles to the
//! same plan, in declaration order.

use crate::accessor::{synthesize, AccessorPlan, CloneOp};
use crate::descriptor::{MemberDescriptor, TypeDescriptor, Visibility};
use crate::error::{Error, Result};
use crate::shape::resolve;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What happens to members carrying the ignore marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IgnorePolicy {
    /// Copied by plain assignment, never deep-cloned
    #[default]
    ShallowCopy,
    /// Left at the target's default value
    Omit,
}

/// Names of the two generated operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OperationNames {
    #[serde(default = "default_fast_name")]
    pub fast: String,
    #[serde(default = "default_safe_name")]
    pub safe: String,
}

fn default_fast_name() -> String {
    "Clone".to_string()
}

fn default_safe_name() -> String {
    "CloneSafe".to_string()
}

impl Default for OperationNames {
    fn default() -> Self {
        Self {
            fast: default_fast_name(),
            safe: default_safe_name(),
        }
    }
}

/// Compiler options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CompileOptions {
    #[serde(default)]
    pub ignore_policy: IgnorePolicy,
    #[serde(default)]
    pub operations: OperationNames,
}

/// One member's accessor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MemberPlan {
    pub name: String,
    pub accessor: AccessorPlan,
}

/// Ignored member copied by plain assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RetainedMember {
    pub name: String,
    /// Number of cloned members declared ahead of this one
    pub position: usize,
}

/// One assignment of a generated operation, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment<'a> {
    Cloned(&'a MemberPlan),
    Retained(&'a str),
}

impl<'a> Assignment<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            Assignment::Cloned(member) => &member.name,
            Assignment::Retained(name) => name,
        }
    }
}

/// Compiled clone operations of one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(
    title = "Clone Plan",
    description = "Compiled fast and safe clone operations of a type"
)]
pub struct ClonePlan {
    pub type_name: String,
    pub fqn: String,
    pub namespace: String,
    pub visibility: Visibility,
    pub operations: OperationNames,
    /// Accessors of the fast operation, in declaration order
    pub fast: Vec<MemberPlan>,
    /// Accessors of the safe operation, in declaration order
    pub safe: Vec<MemberPlan>,
    /// Ignored members copied by plain assignment
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retained: Vec<RetainedMember>,
    pub descriptor_hash: String,
}

impl ClonePlan {
    /// Accessor plan for `op`
    pub fn members(&self, op: CloneOp) -> &[MemberPlan] {
        match op {
            CloneOp::Fast => &self.fast,
            CloneOp::Safe => &self.safe,
        }
    }

    /// Names of the members carrying an accessor, in order
    pub fn member_names(&self) -> Vec<&str> {
        self.fast.iter().map(|m| m.name.as_str()).collect()
    }

    /// Cloned and retained members of `op` interleaved in declaration order
    pub fn assignments(&self, op: CloneOp) -> Vec<Assignment<'_>> {
        let members = self.members(op);
        let mut out = Vec::with_capacity(members.len() + self.retained.len());
        let mut next = 0;
        for kept in &self.retained {
            let upto = kept.position.min(members.len());
            if upto > next {
                out.extend(members[next..upto].iter().map(Assignment::Cloned));
                next = upto;
            }
            out.push(Assignment::Retained(&kept.name));
        }
        out.extend(members[next..].iter().map(Assignment::Cloned));
        out
    }

    /// Name of the operation for `op`
    pub fn operation(&self, op: CloneOp) -> &str {
        match op {
            CloneOp::Fast => &self.operations.fast,
            CloneOp::Safe => &self.operations.safe,
        }
    }

    /// Serialize plan to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::Json)
    }
}

/// Member selection outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    Clone,
    Retain,
    Skip,
}

/// Clone plan compiler
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Compile a descriptor into its clone plan
    pub fn compile(&self, desc: &TypeDescriptor) -> Result<ClonePlan> {
        let errors = desc.validate();
        if !errors.is_empty() {
            return Err(Error::InvalidDescriptor {
                type_name: desc.name.clone(),
                reason: errors.join("; "),
            });
        }

        let mut fast = Vec::new();
        let mut safe = Vec::new();
        let mut retained = Vec::new();

        for member in &desc.members {
            match self.select(desc, member) {
                Selection::Skip => {
                    debug!(type_name = %desc.name, member = %member.name, "member not eligible");
                }
                Selection::Retain => retained.push(RetainedMember {
                    name: member.name.clone(),
                    position: fast.len(),
                }),
                Selection::Clone => {
                    let accessor = member_accessor(member);
                    safe.push(MemberPlan {
                        name: member.name.clone(),
                        accessor: accessor.with_op(CloneOp::Safe),
                    });
                    fast.push(MemberPlan {
                        name: member.name.clone(),
                        accessor,
                    });
                }
            }
        }

        info!(
            type_name = %desc.name,
            members = fast.len(),
            retained = retained.len(),
            "compiled clone plan"
        );

        Ok(ClonePlan {
            type_name: desc.name.clone(),
            fqn: desc.fqn(),
            namespace: desc.namespace.clone(),
            visibility: desc.visibility,
            operations: self.options.operations.clone(),
            fast,
            safe,
            retained,
            descriptor_hash: desc.hash(),
        })
    }

    fn select(&self, desc: &TypeDescriptor, member: &MemberDescriptor) -> Selection {
        if member.read_only {
            return Selection::Skip;
        }
        if desc.options.explicit_declaration && !member.options.include {
            return Selection::Skip;
        }
        if member.options.ignore {
            return match self.options.ignore_policy {
                IgnorePolicy::ShallowCopy => Selection::Retain,
                IgnorePolicy::Omit => Selection::Skip,
            };
        }
        Selection::Clone
    }
}

fn member_accessor(member: &MemberDescriptor) -> AccessorPlan {
    let mut shape = resolve(&member.typ);
    if member.options.prevent_deep_copy == Some(true) {
        shape = shape.without_deep_clone();
    }
    synthesize(&member.name, &shape)
}

/// Compile with default options
pub fn compile(desc: &TypeDescriptor) -> Result<ClonePlan> {
    Compiler::default().compile(desc)
}
