//! Template context structures
//!
//! Converts a `ClonePlan` plus its rendered member expressions into
//! template-friendly data.

use crate::compile::ClonePlan;
use crate::render::RenderConfig;
use serde::Serialize;

/// Context for clone plan template rendering
#[derive(Debug, Clone, Serialize)]
pub struct PlanContext {
    /// Simple type name
    pub type_name: String,
    /// Module the type is imported from
    pub module: String,
    /// Fast operation name as declared in the plan
    pub fast_op: String,
    /// Safe operation name as declared in the plan
    pub safe_op: String,
    /// Provenance header text, empty when disabled
    pub header: String,
    /// Whether to emit doc comments
    pub comments: bool,
    /// Member assignments of the fast operation
    pub fast: Vec<MemberView>,
    /// Member assignments of the safe operation
    pub safe: Vec<MemberView>,
}

/// One member assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberView {
    pub name: String,
    pub expr: String,
}

impl PlanContext {
    /// Build context from a plan and its pre-rendered assignments
    pub fn from_plan(
        plan: &ClonePlan,
        config: &RenderConfig,
        header: Vec<String>,
        fast: Vec<MemberView>,
        safe: Vec<MemberView>,
    ) -> Self {
        Self {
            type_name: plan.type_name.clone(),
            module: format!("./{}", plan.type_name),
            fast_op: plan.operations.fast.clone(),
            safe_op: plan.operations.safe.clone(),
            header: header.join("\n"),
            comments: config.comments,
            fast,
            safe,
        }
    }
}
