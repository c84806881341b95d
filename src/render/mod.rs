//! Code rendering: emit source code from clone plans
//!
//! Renders a `ClonePlan` as the fast and safe clone operations of a target
//! language. Every target preserves the plan's operation names, member
//! order, and null-guard placement.
//!
//! - C# is rendered with genco
//! - TypeScript is rendered through an embedded MiniJinja template

mod csharp;
mod typescript;

use crate::accessor::CloneOp;
use crate::compile::ClonePlan;
use crate::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Target language for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    CSharp,
    TypeScript,
}

impl Target {
    /// Parse a language name or file extension
    pub fn parse(lang: &str) -> Option<Target> {
        match lang.to_lowercase().as_str() {
            "csharp" | "cs" | "c#" => Some(Target::CSharp),
            "typescript" | "ts" => Some(Target::TypeScript),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Target::CSharp => "cs",
            Target::TypeScript => "ts",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::CSharp => write!(f, "csharp"),
            Target::TypeScript => write!(f, "typescript"),
        }
    }
}

/// Render a plan with the default configuration
pub fn render(plan: &ClonePlan, target: Target) -> Result<String> {
    Renderer::new(target).render(plan)
}

/// Code renderer
pub struct Renderer {
    target: Target,
    config: RenderConfig,
}

/// Render configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Include doc comments on generated operations
    pub comments: bool,
    /// Include provenance header
    pub provenance: bool,
    /// Include a generation timestamp in the provenance header
    pub timestamp: bool,
    /// Directory with template overrides
    pub template_dir: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            comments: true,
            provenance: true,
            timestamp: false,
            template_dir: None,
        }
    }
}

/// One rendered output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedUnit {
    pub file_name: String,
    pub content: String,
}

impl Renderer {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            config: RenderConfig::default(),
        }
    }

    pub fn with_config(target: Target, config: RenderConfig) -> Self {
        Self { target, config }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Render plan to code
    pub fn render(&self, plan: &ClonePlan) -> Result<String> {
        match self.target {
            Target::CSharp => csharp::render(plan, &self.config),
            Target::TypeScript => typescript::render(plan, &self.config),
        }
    }

    /// Render plan to a named output unit
    pub fn render_unit(&self, plan: &ClonePlan) -> Result<RenderedUnit> {
        Ok(RenderedUnit {
            file_name: file_name(plan, self.target),
            content: self.render(plan)?,
        })
    }
}

/// Output file name for a plan
pub fn file_name(plan: &ClonePlan, target: Target) -> String {
    let stem = match target {
        Target::CSharp if !plan.namespace.is_empty() => {
            format!("{}.{}", plan.namespace, plan.type_name)
        }
        _ => plan.type_name.clone(),
    };
    format!("{}.cloneable.g.{}", stem, target.extension())
}

/// Provenance header lines, without comment markers
pub(crate) fn provenance_lines(plan: &ClonePlan, config: &RenderConfig) -> Vec<String> {
    if !config.provenance {
        return Vec::new();
    }
    let mut lines = vec![
        format!("GENERATED FROM: {}", plan.fqn),
        format!("DESCRIPTOR HASH: {}", plan.descriptor_hash),
    ];
    if config.timestamp {
        lines.push(format!("GENERATED: {}", chrono::Utc::now().to_rfc3339()));
    }
    lines.push("DO NOT EDIT - regenerate from descriptor".to_string());
    lines
}

/// Lambda parameter for one nesting level below `parent`
pub(crate) fn lambda_var(parent: &str) -> String {
    format!("{}x", parent)
}

/// Operation called at a deep-clone site
pub(crate) fn call_name(plan: &ClonePlan, op: CloneOp) -> &str {
    plan.operation(op)
}

/// Constructor name of a possibly generic type (`Map<K, V>` -> `Map`)
pub(crate) fn bare_type_name(name: &str) -> &str {
    name.split('<').next().unwrap_or(name).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::descriptor::{MemberDescriptor, TypeDescriptor, TypeRef};

    fn sample_plan() -> ClonePlan {
        let desc = TypeDescriptor::new("Cloneable.Sample", "DeepCloneNullable")
            .with_member(MemberDescriptor::new("A", TypeRef::string()))
            .with_member(MemberDescriptor::new(
                "Simple",
                TypeRef::cloneable("global::Cloneable.Sample.SimpleClone").nullable(),
            ));
        compile(&desc).unwrap()
    }

    #[test]
    fn test_target_parse() {
        assert_eq!(Target::parse("cs"), Some(Target::CSharp));
        assert_eq!(Target::parse("C#"), Some(Target::CSharp));
        assert_eq!(Target::parse("TypeScript"), Some(Target::TypeScript));
        assert_eq!(Target::parse("cobol"), None);
    }

    #[test]
    fn test_file_name() {
        let plan = sample_plan();
        assert_eq!(
            file_name(&plan, Target::CSharp),
            "Cloneable.Sample.DeepCloneNullable.cloneable.g.cs"
        );
        assert_eq!(
            file_name(&plan, Target::TypeScript),
            "DeepCloneNullable.cloneable.g.ts"
        );
    }

    #[test]
    fn test_provenance_without_timestamp() {
        let plan = sample_plan();
        let lines = provenance_lines(&plan, &RenderConfig::default());
        assert!(lines[0].contains("global::Cloneable.Sample.DeepCloneNullable"));
        assert!(lines[1].contains("sha256:"));
        assert!(!lines.iter().any(|l| l.starts_with("GENERATED:")));

        let none = provenance_lines(
            &plan,
            &RenderConfig {
                provenance: false,
                ..RenderConfig::default()
            },
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_bare_type_name() {
        assert_eq!(bare_type_name("Map<string, Foo>"), "Map");
        assert_eq!(bare_type_name("Set"), "Set");
    }

    #[test]
    fn test_render_both_targets() {
        let plan = sample_plan();
        let cs = render(&plan, Target::CSharp).unwrap();
        assert!(cs.contains("partial class DeepCloneNullable"));
        assert!(cs.contains("Simple = this.Simple?.Clone(),"));

        let ts = render(&plan, Target::TypeScript).unwrap();
        assert!(ts.contains("clone.Simple = this.Simple?.clone();"));
    }

    #[test]
    fn test_rendering_is_reproducible() {
        let plan = sample_plan();
        assert_eq!(
            render(&plan, Target::CSharp).unwrap(),
            render(&plan, Target::CSharp).unwrap()
        );
        assert_eq!(
            render(&plan, Target::TypeScript).unwrap(),
            render(&plan, Target::TypeScript).unwrap()
        );
    }
}
