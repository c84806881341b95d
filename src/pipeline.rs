//! Load, compile and render in one pass
//!
//! Descriptors compile independently, so `compile_all` and `render_all`
//! fan out over rayon's pool. Results come back in input order and the
//! first failing descriptor (by position) decides the error.

use crate::compile::{ClonePlan, CompileOptions, Compiler};
use crate::config::ProjectConfig;
use crate::descriptor::{parse_descriptors, TypeDescriptor};
use crate::error::Result;
use crate::render::{RenderConfig, RenderedUnit, Renderer, Target};
use rayon::prelude::*;
use tracing::info;

/// Descriptor-to-source pipeline
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    compiler: Compiler,
    render: RenderConfig,
}

impl Pipeline {
    pub fn new(options: CompileOptions, render: RenderConfig) -> Self {
        Self {
            compiler: Compiler::new(options),
            render,
        }
    }

    pub fn from_config(config: &ProjectConfig) -> Self {
        Self::new(config.compile.clone(), config.render_config())
    }

    /// Parse a descriptor document
    pub fn load(&self, yaml: &str) -> Result<Vec<TypeDescriptor>> {
        parse_descriptors(yaml)
    }

    /// Compile every descriptor
    pub fn compile_all(&self, descriptors: &[TypeDescriptor]) -> Result<Vec<ClonePlan>> {
        let results: Vec<Result<ClonePlan>> = descriptors
            .par_iter()
            .map(|desc| self.compiler.compile(desc))
            .collect();
        let plans = results.into_iter().collect::<Result<Vec<_>>>()?;
        info!(count = plans.len(), "compiled descriptors");
        Ok(plans)
    }

    /// Render every plan for one target
    pub fn render_all(&self, plans: &[ClonePlan], target: Target) -> Result<Vec<RenderedUnit>> {
        let renderer = Renderer::with_config(target, self.render.clone());
        let results: Vec<Result<RenderedUnit>> = plans
            .par_iter()
            .map(|plan| renderer.render_unit(plan))
            .collect();
        results.into_iter().collect()
    }

    /// Load, compile and render a descriptor document
    pub fn run(&self, yaml: &str, target: Target) -> Result<Vec<RenderedUnit>> {
        let descriptors = self.load(yaml)?;
        let plans = self.compile_all(&descriptors)?;
        self.render_all(&plans, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const TYPES: &str = r#"
types:
  - name: First
    namespace: Sample
    members:
      - name: A
        type: { name: string, kind: string }
  - name: Second
    namespace: Sample
    members:
      - name: Next
        type: { name: First, cloneable: {}, nullable: true }
"#;

    #[test]
    fn test_run_preserves_order() {
        let units = Pipeline::default().run(TYPES, Target::CSharp).unwrap();
        let names: Vec<&str> = units.iter().map(|u| u.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Sample.First.cloneable.g.cs", "Sample.Second.cloneable.g.cs"]
        );
        assert!(units[1].content.contains("Next = this.Next?.Clone(),"));
    }

    #[test]
    fn test_first_error_by_position() {
        let descriptors = vec![
            TypeDescriptor::new("Ns", "Fine"),
            TypeDescriptor::new("Ns", "1Bad"),
            TypeDescriptor::new("Ns", "2Bad"),
        ];
        match Pipeline::default().compile_all(&descriptors) {
            Err(Error::InvalidDescriptor { type_name, .. }) => assert_eq!(type_name, "1Bad"),
            other => panic!("Expected invalid descriptor, got {:?}", other),
        }
    }
}
