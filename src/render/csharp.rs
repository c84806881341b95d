//! C# code generation using genco

use crate::accessor::{AccessorPlan, CloneOp};
use crate::compile::{Assignment, ClonePlan};
use crate::error::{Error, Result};
use crate::shape::ConstructionStrategy;
use genco::prelude::*;

use super::{call_name, lambda_var, provenance_lines, RenderConfig};

const STACK: &str = "global::System.Collections.Generic.Stack<object>";
const PAIR: &str = "global::System.Collections.Generic.KeyValuePair";

/// Render plan to C# code
pub fn render(plan: &ClonePlan, config: &RenderConfig) -> Result<String> {
    let tokens = CSharpRenderer { config, plan }.render();
    tokens
        .to_file_string()
        .map_err(|e| Error::Render(format!("C# formatting failed: {}", e)))
}

struct CSharpRenderer<'a> {
    config: &'a RenderConfig,
    plan: &'a ClonePlan,
}

impl<'a> CSharpRenderer<'a> {
    fn render(&self) -> csharp::Tokens {
        let plan = self.plan;
        let header = provenance_lines(plan, self.config);
        let mut namespace = csharp::Tokens::new();
        if !plan.namespace.is_empty() {
            namespace.append(format!("namespace {};", plan.namespace));
            namespace.line();
        }

        quote! {
            $(for line in &header => $(format!("// {}", line))$['\r'])
            $(if !header.is_empty() => $['\n'])
            $("// <auto-generated/>")
            $("#nullable enable")
            $['\n']
            $("using System;")
            $("using System.Linq;")
            $['\n']
            $namespace
            $(format!("{} partial class {}", plan.visibility.keyword(), plan.type_name))
            {
                $(self.render_fast())
                $['\n']
                $(self.render_safe())
            }
        }
    }

    fn render_fast(&self) -> csharp::Tokens {
        let plan = self.plan;
        let op = call_name(plan, CloneOp::Fast);
        let mut tokens = csharp::Tokens::new();

        if self.config.comments {
            self.summary(
                &mut tokens,
                &[
                    "Creates a copy of this object.",
                    "Deep-cloneable members are cloned without cycle protection;",
                    "use the cycle-safe operation for graphs that may contain cycles.",
                ],
            );
        }
        tokens.append(quote! {
            $(format!("public {} {}()", plan.fqn, op))
            {
                $(self.initializer("return", CloneOp::Fast))
            }
        });
        tokens
    }

    fn render_safe(&self) -> csharp::Tokens {
        let plan = self.plan;
        let op = call_name(plan, CloneOp::Safe);
        let mut tokens = csharp::Tokens::new();

        if self.config.comments {
            self.summary(
                &mut tokens,
                &[
                    "Creates a copy of this object, passing objects already being cloned",
                    "on the current path by reference so reference cycles terminate.",
                ],
            );
            tokens.append(
                "/// <param name=\"referenceChain\">Objects on the current clone path.</param>",
            );
            tokens.push();
        }
        tokens.append(quote! {
            $(format!("public {} {}({}? referenceChain = null)", plan.fqn, op, STACK))
            {
                $("if (referenceChain?.Contains(this) == true) return this;")
                $(format!("referenceChain ??= new {}();", STACK))
                $("referenceChain.Push(this);")
                $(self.initializer("var clone =", CloneOp::Safe))
                $("referenceChain.Pop();")
                $("return clone;")
            }
        });
        tokens
    }

    fn summary(&self, tokens: &mut csharp::Tokens, lines: &[&str]) {
        tokens.append("/// <summary>");
        tokens.push();
        for line in lines {
            tokens.append(format!("/// {}", line));
            tokens.push();
        }
        tokens.append("/// </summary>");
        tokens.push();
    }

    /// `<lead> new T { ... };` with one assignment per member
    fn initializer(&self, lead: &str, op: CloneOp) -> csharp::Tokens {
        let plan = self.plan;
        let mut tokens = csharp::Tokens::new();
        tokens.append(format!("{} new {}", lead, plan.fqn));
        tokens.push();
        tokens.append("{");
        tokens.indent();
        for assignment in plan.assignments(op) {
            let name = assignment.name();
            let source = format!("this.{}", name);
            let value = match assignment {
                Assignment::Cloned(member) => self.expr(&member.accessor, &source, name, false),
                Assignment::Retained(_) => source,
            };
            tokens.append(format!("{} = {},", name, value));
            tokens.push();
        }
        tokens.unindent();
        tokens.append("};");
        tokens
    }

    /// Expression producing the cloned value of `src`
    ///
    /// `var` is the stem for lambda parameters introduced below this level.
    /// `lifted` marks a receiver already known to be possibly null, so member
    /// access on it is null-conditional.
    fn expr(&self, plan: &AccessorPlan, src: &str, var: &str, lifted: bool) -> String {
        let dot = if lifted { "?." } else { "." };
        match plan {
            AccessorPlan::CopyScalar | AccessorPlan::Identity => src.to_string(),
            AccessorPlan::CallClone { nullable, op } => {
                let dot = if *nullable || lifted { "?." } else { "." };
                let name = call_name(self.plan, *op);
                match op {
                    CloneOp::Fast => format!("{}{}{}()", src, dot, name),
                    CloneOp::Safe => format!("{}{}{}(referenceChain)", src, dot, name),
                }
            }
            AccessorPlan::NullGuard { inner } => match inner.as_ref() {
                AccessorPlan::MapArray { .. } | AccessorPlan::ProjectSequence { .. } => {
                    self.expr(inner, src, var, true)
                }
                _ => {
                    let guarded = self.expr(inner, src, var, false);
                    format!("{} is null ? null : {}", src, guarded)
                }
            },
            AccessorPlan::MapArray { element } => {
                let x = lambda_var(var);
                let projected = self.expr(element, &x, &x, false);
                format!("{}{}Select({} => {}).ToArray()", src, dot, x, projected)
            }
            AccessorPlan::ProjectSequence { element } => {
                let x = lambda_var(var);
                let projected = self.expr(element, &x, &x, false);
                format!("{}{}Select({} => {})", src, dot, x, projected)
            }
            AccessorPlan::MapSequence {
                container,
                element,
                strategy,
            } => {
                let x = lambda_var(var);
                let projected = self.expr(element, &x, &x, false);
                match strategy {
                    ConstructionStrategy::SelfConstructible if element.is_copy() => {
                        format!("new {}({})", container, src)
                    }
                    ConstructionStrategy::SelfConstructible => {
                        format!(
                            "new {}({}.Select({} => {}).ToList())",
                            container, src, x, projected
                        )
                    }
                    _ => format!("new {}({}.Select({} => {}))", container, src, x, projected),
                }
            }
            AccessorPlan::MapMap {
                container,
                key_type,
                value_type,
                key,
                value,
                strategy,
            } => {
                let x = lambda_var(var);
                let k = self.expr(key, &format!("{}.Key", x), &x, false);
                let v = self.expr(value, &format!("{}.Value", x), &x, false);
                match strategy {
                    ConstructionStrategy::SelfConstructible if key.is_copy() && value.is_copy() => {
                        format!("new {}({})", container, src)
                    }
                    ConstructionStrategy::SelfConstructible => format!(
                        "new {}({}.ToDictionary({} => {}, {} => {}))",
                        container, src, x, k, x, v
                    ),
                    _ => format!(
                        "new {}({}.Select({} => new {}<{}, {}>({}, {})))",
                        container, src, x, PAIR, key_type, value_type, k, v
                    ),
                }
            }
        }
    }
}
