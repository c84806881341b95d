//! TypeScript code generation
//!
//! Member expressions are built here; the surrounding module comes from the
//! `plans/typescript.jinja` template.

use crate::accessor::{AccessorPlan, CloneOp};
use crate::compile::{Assignment, ClonePlan};
use crate::error::Result;
use crate::shape::ConstructionStrategy;
use crate::templates::context::{MemberView, PlanContext};
use crate::templates::{self, engine, engine_with_override};
use crate::util::to_camel_case;

use super::{bare_type_name, call_name, lambda_var, provenance_lines, RenderConfig, Target};

/// Render plan to TypeScript code
pub fn render(plan: &ClonePlan, config: &RenderConfig) -> Result<String> {
    let renderer = TypeScriptRenderer { plan };
    let ctx = PlanContext::from_plan(
        plan,
        config,
        provenance_lines(plan, config),
        renderer.members(CloneOp::Fast),
        renderer.members(CloneOp::Safe),
    );

    let code = match &config.template_dir {
        Some(dir) => {
            let env = engine_with_override(dir)?;
            templates::render_plan(&env, Target::TypeScript, &ctx)?
        }
        None => templates::render_plan(engine(), Target::TypeScript, &ctx)?,
    };
    Ok(code)
}

struct TypeScriptRenderer<'a> {
    plan: &'a ClonePlan,
}

impl<'a> TypeScriptRenderer<'a> {
    fn members(&self, op: CloneOp) -> Vec<MemberView> {
        self.plan
            .assignments(op)
            .into_iter()
            .map(|assignment| {
                let name = assignment.name();
                let source = format!("this.{}", name);
                let expr = match assignment {
                    Assignment::Cloned(member) => self.expr(&member.accessor, &source, name),
                    Assignment::Retained(_) => source,
                };
                MemberView {
                    name: name.to_string(),
                    expr,
                }
            })
            .collect()
    }

    fn call(&self, op: CloneOp) -> String {
        let name = to_camel_case(call_name(self.plan, op));
        match op {
            CloneOp::Fast => format!("{}()", name),
            CloneOp::Safe => format!("{}(referenceChain)", name),
        }
    }

    fn expr(&self, plan: &AccessorPlan, src: &str, var: &str) -> String {
        match plan {
            AccessorPlan::CopyScalar | AccessorPlan::Identity => src.to_string(),
            AccessorPlan::CallClone { nullable, op } => {
                let dot = if *nullable { "?." } else { "." };
                format!("{}{}{}", src, dot, self.call(*op))
            }
            AccessorPlan::NullGuard { inner } => match inner.as_ref() {
                AccessorPlan::MapArray { element } => {
                    let x = lambda_var(var);
                    format!("{}?.map(({}) => {})", src, x, self.expr(element, &x, &x))
                }
                _ => format!("{} == null ? {} : {}", src, src, self.expr(inner, src, var)),
            },
            AccessorPlan::MapArray { element } => {
                let x = lambda_var(var);
                format!("{}.map(({}) => {})", src, x, self.expr(element, &x, &x))
            }
            AccessorPlan::ProjectSequence { element } => {
                let x = lambda_var(var);
                format!(
                    "(function* (s) {{ for (const {} of s) yield {}; }})({})",
                    x,
                    self.expr(element, &x, &x),
                    src
                )
            }
            AccessorPlan::MapSequence {
                container,
                element,
                strategy,
            } => {
                let ctor = bare_type_name(container);
                if *strategy == ConstructionStrategy::SelfConstructible && element.is_copy() {
                    return format!("new {}({})", ctor, src);
                }
                let x = lambda_var(var);
                format!(
                    "new {}(Array.from({}, ({}) => {}))",
                    ctor,
                    src,
                    x,
                    self.expr(element, &x, &x)
                )
            }
            AccessorPlan::MapMap {
                container,
                key,
                value,
                strategy,
                ..
            } => {
                let ctor = bare_type_name(container);
                if *strategy == ConstructionStrategy::SelfConstructible
                    && key.is_copy()
                    && value.is_copy()
                {
                    return format!("new {}({})", ctor, src);
                }
                let x = lambda_var(var);
                let (k, v) = (format!("{}Key", x), format!("{}Value", x));
                format!(
                    "new {}(Array.from({}, ([{}, {}]) => [{}, {}]))",
                    ctor,
                    src,
                    k,
                    v,
                    self.expr(key, &k, &x),
                    self.expr(value, &v, &x)
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::descriptor::{
        Constructor, CtorParam, InterfaceRef, MemberDescriptor, TypeDescriptor, TypeRef,
    };

    fn render_desc(desc: &TypeDescriptor) -> String {
        render(&compile(desc).unwrap(), &RenderConfig::default()).unwrap()
    }

    fn list_of(element: TypeRef) -> TypeRef {
        let name = element.name.clone();
        TypeRef {
            name: format!("List<{}>", name),
            interfaces: vec![InterfaceRef::Sequence { element }],
            constructors: vec![Constructor {
                params: vec![CtorParam::Sequence { element: name }],
            }],
            ..TypeRef::default()
        }
    }

    #[test]
    fn test_operations_declared() {
        let desc = TypeDescriptor::new("Cloneable.Sample", "SimpleClone")
            .with_member(MemberDescriptor::new("A", TypeRef::string()))
            .with_member(MemberDescriptor::new("B", TypeRef::value("int")).ignored());
        let code = render_desc(&desc);

        assert!(code.contains("// GENERATED FROM: global::Cloneable.Sample.SimpleClone"));
        assert!(code.contains("clone(): SimpleClone;"));
        assert!(code.contains("cloneSafe(referenceChain?: object[]): SimpleClone;"));
        assert!(code.contains("clone.A = this.A;"));
        assert!(code.contains("clone.B = this.B;"));
    }

    #[test]
    fn test_sequence_rebuilt() {
        let desc = TypeDescriptor::new("Ns", "Holder").with_member(MemberDescriptor::new(
            "Items",
            list_of(TypeRef::cloneable("Simple").nullable()).nullable(),
        ));
        let code = render_desc(&desc);
        assert!(code.contains(
            "clone.Items = this.Items == null ? this.Items : new List(Array.from(this.Items, (Itemsx) => Itemsx?.clone()));"
        ));
        assert!(code.contains("Itemsx?.cloneSafe(referenceChain)"));
    }

    #[test]
    fn test_array_guard() {
        let desc = TypeDescriptor::new("Ns", "Holder").with_member(MemberDescriptor::new(
            "Items",
            TypeRef::array_of(TypeRef::cloneable("Simple")).nullable(),
        ));
        let code = render_desc(&desc);
        assert!(code.contains("clone.Items = this.Items?.map((Itemsx) => Itemsx.clone());"));
    }

    #[test]
    fn test_map_entries() {
        let map = TypeRef {
            name: "Map<string, Simple>".into(),
            interfaces: vec![InterfaceRef::Mapping {
                key: TypeRef::string(),
                value: TypeRef::cloneable("Simple"),
            }],
            constructors: vec![Constructor {
                params: vec![CtorParam::OwnInterface],
            }],
            ..TypeRef::default()
        };
        let desc =
            TypeDescriptor::new("Ns", "Holder").with_member(MemberDescriptor::new("Lookup", map));
        let code = render_desc(&desc);
        assert!(code.contains(
            "new Map(Array.from(this.Lookup, ([LookupxKey, LookupxValue]) => [LookupxKey, LookupxValue.clone()]))"
        ));
    }
}
