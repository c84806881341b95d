//! Template-based code generation
//!
//! Uses MiniJinja templates for properly formatted code generation.
//! Templates are embedded by default, with optional override via:
//! - `--template-dir` CLI flag
//! - `.cloneplan.yaml` config: `render.template_dir`

pub mod context;
pub mod filters;

use minijinja::Environment;
use std::path::Path;
use std::sync::OnceLock;

use crate::render::Target;

// Embedded templates (compiled into binary)
mod embedded {
    pub const TYPESCRIPT_PLAN: &str = include_str!("../../templates/plans/typescript.jinja");
}

/// Template engine singleton
static ENGINE: OnceLock<Environment<'static>> = OnceLock::new();

/// Initialize the template engine with embedded templates
fn init_engine() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);

    filters::register_filters(&mut env);

    env.add_template("plans/typescript.jinja", embedded::TYPESCRIPT_PLAN)
        .expect("Failed to load typescript plan template");

    env
}

/// Get the global template engine
pub fn engine() -> &'static Environment<'static> {
    ENGINE.get_or_init(init_engine)
}

/// Create a new template engine with custom template directory
/// Templates in custom_dir override embedded templates
pub fn engine_with_override(custom_dir: &Path) -> Result<Environment<'static>, TemplateError> {
    let mut env = init_engine();
    load_custom_templates(&mut env, custom_dir)?;
    Ok(env)
}

/// Load custom templates from a directory
fn load_custom_templates(env: &mut Environment<'static>, dir: &Path) -> Result<(), TemplateError> {
    for target in [Target::CSharp, Target::TypeScript] {
        let Some(name) = plan_template_name(target) else {
            continue;
        };
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        let content = std::fs::read_to_string(&path).map_err(|e| {
            TemplateError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        env.add_template_owned(name, content)
            .map_err(|e| TemplateError::ParseError(target.to_string(), e.to_string()))?;
    }
    Ok(())
}

/// Template name for a target language; C# is emitted through genco
pub fn plan_template_name(target: Target) -> Option<&'static str> {
    match target {
        Target::TypeScript => Some("plans/typescript.jinja"),
        Target::CSharp => None,
    }
}

/// Render a plan context with the given engine
pub fn render_plan(
    env: &Environment<'_>,
    target: Target,
    ctx: &context::PlanContext,
) -> Result<String, TemplateError> {
    let name = plan_template_name(target)
        .ok_or_else(|| TemplateError::TemplateNotFound(format!("no {} template", target)))?;
    let template = env
        .get_template(name)
        .map_err(|e| TemplateError::TemplateNotFound(e.to_string()))?;
    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

/// Template errors
#[derive(Debug, Clone)]
pub enum TemplateError {
    /// Template not found
    TemplateNotFound(String),
    /// Template parse error
    ParseError(String, String),
    /// Template render error
    RenderError(String),
    /// IO error loading custom templates
    IoError(String),
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::TemplateNotFound(msg) => write!(f, "Template not found: {}", msg),
            TemplateError::ParseError(lang, msg) => {
                write!(f, "Template parse error for {}: {}", lang, msg)
            }
            TemplateError::RenderError(msg) => write!(f, "Template render error: {}", msg),
            TemplateError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for TemplateError {}

impl From<TemplateError> for crate::error::Error {
    fn from(err: TemplateError) -> Self {
        crate::error::Error::Render(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use context::{MemberView, PlanContext};
    use tempfile::TempDir;

    fn sample_context() -> PlanContext {
        PlanContext {
            type_name: "SimpleClone".into(),
            module: "./SimpleClone".into(),
            fast_op: "Clone".into(),
            safe_op: "CloneSafe".into(),
            header: "GENERATED FROM: SimpleClone".into(),
            comments: false,
            fast: vec![MemberView {
                name: "A".into(),
                expr: "this.A".into(),
            }],
            safe: vec![MemberView {
                name: "A".into(),
                expr: "this.A".into(),
            }],
        }
    }

    #[test]
    fn test_engine_initialization() {
        let env = engine();
        assert!(env.get_template("plans/typescript.jinja").is_ok());
    }

    #[test]
    fn test_template_names() {
        assert_eq!(
            plan_template_name(Target::TypeScript),
            Some("plans/typescript.jinja")
        );
        assert_eq!(plan_template_name(Target::CSharp), None);
    }

    #[test]
    fn test_csharp_has_no_plan_template() {
        assert!(matches!(
            render_plan(engine(), Target::CSharp, &sample_context()),
            Err(TemplateError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_render_typescript_plan() {
        let code = render_plan(engine(), Target::TypeScript, &sample_context()).unwrap();
        assert!(code.starts_with("// GENERATED FROM: SimpleClone\n"));
        assert!(code.contains("import { SimpleClone } from \"./SimpleClone\";"));
        assert!(code.contains("SimpleClone.prototype.clone = function"));
        assert!(code.contains("SimpleClone.prototype.cloneSafe = function"));
        assert!(code.contains("    clone.A = this.A;\n"));
        assert!(code.contains("if (referenceChain?.includes(this)) return this;"));
        assert!(!code.contains("/**"));
    }

    #[test]
    fn test_override_replaces_embedded() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("plans")).unwrap();
        std::fs::write(
            dir.path().join("plans/typescript.jinja"),
            "// custom {{ type_name }}\n",
        )
        .unwrap();

        let env = engine_with_override(dir.path()).unwrap();
        let code = render_plan(&env, Target::TypeScript, &sample_context()).unwrap();
        assert_eq!(code.trim(), "// custom SimpleClone");
    }

    #[test]
    fn test_override_parse_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("plans")).unwrap();
        std::fs::write(dir.path().join("plans/typescript.jinja"), "{% for %}").unwrap();

        assert!(matches!(
            engine_with_override(dir.path()),
            Err(TemplateError::ParseError(lang, _)) if lang == "typescript"
        ));
    }
}
