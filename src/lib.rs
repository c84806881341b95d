// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # cloneplan: deep-clone plans for described types
//!
//! Compiles **type descriptors** into clone plans: for every member, a small
//! tree of steps that copies, clones, or rebuilds its value. Each type gets
//! two operations:
//!
//! - **fast** clone: copies the graph with no cycle protection
//! - **safe** clone: threads a stack of the objects currently being cloned
//!   and passes any object already on it by reference, so cycles terminate
//!
//! Plans can be rendered as C# or TypeScript source, or executed directly
//! against the runtime object model in [`exec`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cloneplan::{compile, render, Target, TypeDescriptor};
//!
//! let desc = TypeDescriptor::from_yaml(r#"
//!   name: DeepClone
//!   namespace: Cloneable.Sample
//!   members:
//!     - name: A
//!       type: { name: string, kind: string }
//!     - name: Simple
//!       type: { name: SimpleClone, cloneable: {}, nullable: true }
//! "#)?;
//!
//! let plan = compile(&desc)?;
//! let csharp = render(&plan, Target::CSharp)?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                             │
//! │  DESCRIPTOR (YAML / JSON)                                   │
//! │       │                                                     │
//! │       ├──► shape::resolve(type) ──► TypeShape               │
//! │       │                                                     │
//! │       ├──► accessor::synthesize(shape) ──► AccessorPlan     │
//! │       │                                                     │
//! │       └──► compile(descriptor) ──► ClonePlan                │
//! │                                                             │
//! │  CLONE PLAN                                                 │
//! │       │                                                     │
//! │       ├──► render(plan, target) ──► C# / TypeScript         │
//! │       │                                                     │
//! │       └──► Interpreter::clone_safe(value) ──► Value         │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// Input model and analysis
pub mod descriptor;
pub mod error;
pub mod shape;

// Plan construction
pub mod accessor;
pub mod compile;

// Backends
pub mod exec;
pub mod render;
pub mod templates;

// Driver and ambient
pub mod config;
pub mod pipeline;
pub mod util;

// Re-exports
pub use accessor::{synthesize, AccessorPlan, CloneOp};
pub use compile::{
    compile, Assignment, ClonePlan, CompileOptions, Compiler, IgnorePolicy, MemberPlan,
    OperationNames, RetainedMember,
};
pub use config::ProjectConfig;
pub use descriptor::{
    parse_descriptors, CloneOptions, Constructor, CtorParam, InterfaceRef, MemberDescriptor,
    MemberOptions, TypeDescriptor, TypeKind, TypeRef, Visibility,
};
pub use error::{Error, Result};
pub use exec::{Interpreter, PlanSet, Value, VisitedStack};
pub use pipeline::Pipeline;
pub use render::{render, RenderConfig, RenderedUnit, Renderer, Target};
pub use shape::{resolve, ConstructionStrategy, TypeShape};

/// Version of cloneplan
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
