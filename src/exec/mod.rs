//! Direct interpretation of clone plans
//!
//! Executes compiled `ClonePlan`s against the runtime object model in
//! [`value`], without emitting any source text.
//!
//! The fast operation has no cycle protection: a true reference cycle
//! recurses until the thread's stack is exhausted. Callers accept that risk
//! when they choose it.
//!
//! The safe operation tracks the identities of the objects currently being
//! cloned in a [`VisitedStack`]:
//! - on entry, an object already on the stack is returned as-is (aliasing
//!   breaks the cycle)
//! - otherwise its identity is pushed, its members are cloned with the same
//!   stack, and the identity is popped before the clone is returned
//!
//! A stack lives for one top-level call only; independent calls never
//! share one.

pub mod value;

pub use value::{Mapping, Object, Sequence, Value};

use crate::accessor::{AccessorPlan, CloneOp};
use crate::compile::{Assignment, ClonePlan};
use crate::error::{Error, Result};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use tracing::trace;

/// Identities of the objects on the current safe-clone path
#[derive(Debug, Default)]
pub struct VisitedStack {
    entries: Vec<usize>,
}

impl VisitedStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, value: &Value) -> bool {
        value
            .identity()
            .is_some_and(|id| self.entries.contains(&id))
    }

    /// Mark `value` so it is passed by reference instead of cloned
    pub fn push(&mut self, value: &Value) {
        if let Some(id) = value.identity() {
            self.entries.push(id);
        }
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compiled plans, looked up by fully-qualified or simple type name
#[derive(Debug, Clone, Default)]
pub struct PlanSet {
    plans: Vec<ClonePlan>,
    by_name: HashMap<String, usize>,
}

impl PlanSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, plan: ClonePlan) {
        let index = self.plans.len();
        self.by_name.insert(plan.fqn.clone(), index);
        self.by_name.entry(plan.type_name.clone()).or_insert(index);
        self.plans.push(plan);
    }

    pub fn get(&self, type_name: &str) -> Option<&ClonePlan> {
        self.by_name.get(type_name).map(|&i| &self.plans[i])
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

impl FromIterator<ClonePlan> for PlanSet {
    fn from_iter<I: IntoIterator<Item = ClonePlan>>(iter: I) -> Self {
        let mut set = PlanSet::new();
        for plan in iter {
            set.insert(plan);
        }
        set
    }
}

/// Plan interpreter
pub struct Interpreter<'a> {
    plans: &'a PlanSet,
    calls: Cell<usize>,
}

impl<'a> Interpreter<'a> {
    pub fn new(plans: &'a PlanSet) -> Self {
        Self {
            plans,
            calls: Cell::new(0),
        }
    }

    /// Number of object clone operations invoked so far
    pub fn clone_calls(&self) -> usize {
        self.calls.get()
    }

    /// Fast clone of an object; no cycle protection
    pub fn clone_fast(&self, value: &Value) -> Result<Value> {
        self.clone_object(value, CloneOp::Fast, &mut VisitedStack::new())
    }

    /// Cycle-safe clone of an object with a fresh visited stack
    pub fn clone_safe(&self, value: &Value) -> Result<Value> {
        let mut visited = VisitedStack::new();
        self.clone_safe_in(value, &mut visited)
    }

    /// Cycle-safe clone sharing a caller-supplied visited stack
    ///
    /// Objects already on the stack are returned by reference.
    pub fn clone_safe_in(&self, value: &Value, visited: &mut VisitedStack) -> Result<Value> {
        self.clone_object(value, CloneOp::Safe, visited)
    }

    fn clone_object(
        &self,
        value: &Value,
        op: CloneOp,
        visited: &mut VisitedStack,
    ) -> Result<Value> {
        let Value::Object(source) = value else {
            return Err(Error::NotCloneable(value.kind().to_string()));
        };

        if op == CloneOp::Safe && visited.contains(value) {
            trace!(?value, "already on the clone path, passing by reference");
            return Ok(value.clone());
        }

        let type_name = source.borrow().type_name.clone();
        let plan = self
            .plans
            .get(&type_name)
            .ok_or_else(|| Error::MissingPlan(type_name.clone()))?;

        self.calls.set(self.calls.get() + 1);
        trace!(type_name = %type_name, ?op, "cloning object");

        if op == CloneOp::Safe {
            visited.push(value);
        }

        let built = self.build(source, plan, op, visited);

        if op == CloneOp::Safe {
            visited.pop();
        }

        let fields = built?;
        Ok(Value::Object(Rc::new(RefCell::new(Object {
            type_name,
            fields,
        }))))
    }

    fn build(
        &self,
        source: &Rc<RefCell<Object>>,
        plan: &ClonePlan,
        op: CloneOp,
        visited: &mut VisitedStack,
    ) -> Result<BTreeMap<String, Value>> {
        let mut fields = BTreeMap::new();

        for assignment in plan.assignments(op) {
            let name = assignment.name();
            let current = source
                .borrow()
                .fields
                .get(name)
                .cloned()
                .unwrap_or_default();
            let value = match assignment {
                Assignment::Cloned(member) => {
                    self.eval(&member.accessor, &current, name, visited)?
                }
                Assignment::Retained(_) => current,
            };
            fields.insert(name.to_string(), value);
        }

        Ok(fields)
    }

    fn eval(
        &self,
        plan: &AccessorPlan,
        value: &Value,
        member: &str,
        visited: &mut VisitedStack,
    ) -> Result<Value> {
        match plan {
            AccessorPlan::CopyScalar | AccessorPlan::Identity => Ok(value.clone()),
            AccessorPlan::CallClone { nullable, op } => {
                if value.is_null() {
                    return if *nullable {
                        Ok(Value::Null)
                    } else {
                        Err(null_reference(member))
                    };
                }
                self.clone_object(value, *op, visited)
            }
            AccessorPlan::NullGuard { inner } => {
                if value.is_null() {
                    Ok(Value::Null)
                } else {
                    self.eval(inner, value, member, visited)
                }
            }
            AccessorPlan::MapArray { element } => match value {
                Value::Array(items) => {
                    let items = items.borrow().clone();
                    let mapped = self.map_items(element, &items, member, visited)?;
                    Ok(Value::array(mapped))
                }
                Value::Null => Err(null_reference(member)),
                other => Err(mismatch(member, "array", other)),
            },
            AccessorPlan::MapSequence { element, .. }
            | AccessorPlan::ProjectSequence { element } => match value {
                Value::Sequence(seq) => {
                    let (type_name, items) = {
                        let seq = seq.borrow();
                        (seq.type_name.clone(), seq.items.clone())
                    };
                    let mapped = self.map_items(element, &items, member, visited)?;
                    Ok(Value::sequence(&type_name, mapped))
                }
                // Projections accept any enumerable source.
                Value::Array(items) if matches!(plan, AccessorPlan::ProjectSequence { .. }) => {
                    let items = items.borrow().clone();
                    let mapped = self.map_items(element, &items, member, visited)?;
                    Ok(Value::array(mapped))
                }
                Value::Null => Err(null_reference(member)),
                other => Err(mismatch(member, "sequence", other)),
            },
            AccessorPlan::MapMap { key, value: val, .. } => match value {
                Value::Mapping(map) => {
                    let (type_name, entries) = {
                        let map = map.borrow();
                        (map.type_name.clone(), map.entries.clone())
                    };
                    let mut mapped = Vec::with_capacity(entries.len());
                    for (k, v) in &entries {
                        let k = self.eval(key, k, member, visited)?;
                        let v = self.eval(val, v, member, visited)?;
                        mapped.push((k, v));
                    }
                    Ok(Value::mapping(&type_name, mapped))
                }
                Value::Null => Err(null_reference(member)),
                other => Err(mismatch(member, "mapping", other)),
            },
        }
    }

    fn map_items(
        &self,
        element: &AccessorPlan,
        items: &[Value],
        member: &str,
        visited: &mut VisitedStack,
    ) -> Result<Vec<Value>> {
        items
            .iter()
            .map(|item| self.eval(element, item, member, visited))
            .collect()
    }
}

fn null_reference(member: &str) -> Error {
    Error::NullReference {
        member: member.to_string(),
    }
}

fn mismatch(member: &str, expected: &'static str, found: &Value) -> Error {
    Error::ShapeMismatch {
        member: member.to_string(),
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::descriptor::{MemberDescriptor, TypeDescriptor, TypeRef};

    fn node_plans() -> PlanSet {
        let next = TypeRef::cloneable("Node").nullable();
        let node = TypeDescriptor::new("Graph", "Node")
            .with_member(MemberDescriptor::new("Label", TypeRef::string()))
            .with_member(MemberDescriptor::new("Next", next));
        [compile(&node).unwrap()].into_iter().collect()
    }

    fn node(label: &str, next: Value) -> Value {
        Value::object("Node", [("Label", Value::str(label)), ("Next", next)])
    }

    #[test]
    fn test_plan_lookup_by_both_names() {
        let plans = node_plans();
        assert!(plans.get("Node").is_some());
        assert!(plans.get("global::Graph.Node").is_some());
        assert!(plans.get("Other").is_none());
        assert_eq!(plans.len(), 1);
    }

    #[test]
    fn test_visited_stack_balanced() {
        let plans = node_plans();
        let interp = Interpreter::new(&plans);
        let tail = node("tail", Value::Null);
        let head = node("head", tail);

        let mut visited = VisitedStack::new();
        interp.clone_safe_in(&head, &mut visited).unwrap();
        assert!(visited.is_empty());
        assert_eq!(interp.clone_calls(), 2);
    }

    #[test]
    fn test_preseeded_stack_passes_by_reference() {
        let plans = node_plans();
        let interp = Interpreter::new(&plans);
        let shared = Value::object("Node", [("Label", Value::str("shared"))]);
        let head = node("head", shared.clone());

        let mut visited = VisitedStack::new();
        visited.push(&shared);
        let clone = interp.clone_safe_in(&head, &mut visited).unwrap();
        assert!(!clone.same(&head));
        assert!(clone.field("Next").same(&shared));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_missing_plan() {
        let plans = node_plans();
        let interp = Interpreter::new(&plans);
        let stranger = Value::object("Stranger", []);
        assert!(matches!(
            interp.clone_fast(&stranger),
            Err(Error::MissingPlan(name)) if name == "Stranger"
        ));
    }

    #[test]
    fn test_not_cloneable() {
        let plans = node_plans();
        let interp = Interpreter::new(&plans);
        assert!(matches!(
            interp.clone_fast(&Value::Int(3)),
            Err(Error::NotCloneable(kind)) if kind == "int"
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let holder = TypeDescriptor::new("Ns", "Holder").with_member(MemberDescriptor::new(
            "Items",
            TypeRef::array_of(TypeRef::string()),
        ));
        let plans: PlanSet = [compile(&holder).unwrap()].into_iter().collect();
        let interp = Interpreter::new(&plans);
        let value = Value::object("Holder", [("Items", Value::Int(1))]);
        assert!(matches!(
            interp.clone_fast(&value),
            Err(Error::ShapeMismatch { expected: "array", found: "int", .. })
        ));
    }
}
