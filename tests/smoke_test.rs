//! Smoke test to verify basic functionality

use cloneplan::*;
use std::fs;
use tempfile::TempDir;

const TYPES: &str = r#"
types:
  - name: SimpleClone
    namespace: Cloneable.Sample
    members:
      - name: A
        type: { name: string, kind: string }
      - name: B
        type: { name: int, kind: value }
        options: { ignore: true }
  - name: DeepClone
    namespace: Cloneable.Sample
    members:
      - name: Simple
        type: { name: global::Cloneable.Sample.SimpleClone, cloneable: {} }
"#;

#[test]
fn smoke_test_pipeline() {
    let units = Pipeline::default().run(TYPES, Target::CSharp).unwrap();
    assert_eq!(units.len(), 2);
    assert!(units.iter().all(|u| u.content.contains("// <auto-generated/>")));
    assert!(units[1].content.contains("Simple = this.Simple.Clone(),"));
}

#[test]
fn smoke_test_pipeline_from_discovered_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".cloneplan.yaml"),
        r#"
version: 1
compile:
  ignore_policy: omit
  operations: { fast: Copy, safe: CopySafe }
render:
  targets: [typescript]
  comments: false
"#,
    )
    .unwrap();
    let nested = dir.path().join("src");
    fs::create_dir_all(&nested).unwrap();

    let config = ProjectConfig::discover(&nested).unwrap().unwrap();
    assert_eq!(config.render.targets, vec![Target::TypeScript]);

    let pipeline = Pipeline::from_config(&config);
    let units = pipeline.run(TYPES, config.render.targets[0]).unwrap();
    let simple = &units[0].content;
    assert!(simple.contains("SimpleClone.prototype.copy = function"));
    assert!(simple.contains("SimpleClone.prototype.copySafe = function"));
    assert!(!simple.contains("this.B"));
    assert!(!simple.contains("/**"));
}

#[test]
fn smoke_test_interpret_compiled_plans() {
    let pipeline = Pipeline::default();
    let plans: PlanSet = pipeline
        .compile_all(&pipeline.load(TYPES).unwrap())
        .unwrap()
        .into_iter()
        .collect();

    let interp = Interpreter::new(&plans);
    let simple = Value::object(
        "SimpleClone",
        [("A", Value::str("x")), ("B", Value::Int(5))],
    );
    let deep = Value::object("DeepClone", [("Simple", simple.clone())]);

    let clone = interp.clone_safe(&deep).unwrap();
    assert!(clone.structural_eq(&deep));
    assert!(!clone.field("Simple").same(&simple));
}
