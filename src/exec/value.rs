//! Runtime object model for plan interpretation
//!
//! Heap values are shared (`Rc<RefCell<_>>`), so cloning a `Value` aliases
//! the referent. Identity is pointer identity; `structural_eq` compares
//! contents and is only meant for acyclic graphs.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub type ObjectRef = Rc<RefCell<Object>>;
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type SequenceRef = Rc<RefCell<Sequence>>;
pub type MappingRef = Rc<RefCell<Mapping>>;

/// An instance of a described type
#[derive(Debug, Clone, Default)]
pub struct Object {
    pub type_name: String,
    pub fields: BTreeMap<String, Value>,
}

/// A sequence container instance
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    pub type_name: String,
    pub items: Vec<Value>,
}

/// A mapping container instance
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    pub type_name: String,
    pub entries: Vec<(Value, Value)>,
}

/// A runtime value
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Object(ObjectRef),
    Array(ArrayRef),
    Sequence(SequenceRef),
    Mapping(MappingRef),
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn object(
        type_name: &str,
        fields: impl IntoIterator<Item = (&'static str, Value)>,
    ) -> Self {
        Value::Object(Rc::new(RefCell::new(Object {
            type_name: type_name.to_string(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        })))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn sequence(type_name: &str, items: Vec<Value>) -> Self {
        Value::Sequence(Rc::new(RefCell::new(Sequence {
            type_name: type_name.to_string(),
            items,
        })))
    }

    pub fn mapping(type_name: &str, entries: Vec<(Value, Value)>) -> Self {
        Value::Mapping(Rc::new(RefCell::new(Mapping {
            type_name: type_name.to_string(),
            entries,
        })))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Field of an object value (`Null` when absent or not an object)
    pub fn field(&self, name: &str) -> Value {
        self.as_object()
            .and_then(|obj| obj.borrow().fields.get(name).cloned())
            .unwrap_or_default()
    }

    /// Set a field on an object value; no-op for other values
    pub fn set_field(&self, name: &str, value: Value) {
        if let Some(obj) = self.as_object() {
            obj.borrow_mut().fields.insert(name.to_string(), value);
        }
    }

    /// Heap identity, if any
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(r) => Some(Rc::as_ptr(r) as *const () as usize),
            Value::Array(r) => Some(Rc::as_ptr(r) as *const () as usize),
            Value::Sequence(r) => Some(Rc::as_ptr(r) as *const () as usize),
            Value::Mapping(r) => Some(Rc::as_ptr(r) as *const () as usize),
            _ => None,
        }
    }

    /// Same heap instance
    pub fn same(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Field-by-field equality; does not terminate on cyclic graphs
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.type_name == b.type_name
                    && a.fields.len() == b.fields.len()
                    && a.fields.iter().zip(&b.fields).all(|((ka, va), (kb, vb))| {
                        ka == kb && va.structural_eq(vb)
                    })
            }
            (Value::Array(a), Value::Array(b)) => items_eq(&a.borrow(), &b.borrow()),
            (Value::Sequence(a), Value::Sequence(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.type_name == b.type_name && items_eq(&a.items, &b.items)
            }
            (Value::Mapping(a), Value::Mapping(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.type_name == b.type_name
                    && a.entries.len() == b.entries.len()
                    && a.entries.iter().zip(&b.entries).all(|((ka, va), (kb, vb))| {
                        ka.structural_eq(kb) && va.structural_eq(vb)
                    })
            }
            _ => false,
        }
    }
}

fn items_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structural_eq(y))
}

// Heap values print as `kind<type>@address` so cyclic graphs stay printable.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Object(obj) => match obj.try_borrow() {
                Ok(o) => write!(f, "{}@{:#x}", o.type_name, self.identity().unwrap_or(0)),
                Err(_) => write!(f, "object@{:#x}", self.identity().unwrap_or(0)),
            },
            Value::Array(items) => write!(
                f,
                "array[{}]@{:#x}",
                items.borrow().len(),
                self.identity().unwrap_or(0)
            ),
            Value::Sequence(seq) => {
                let seq = seq.borrow();
                write!(
                    f,
                    "{}[{}]@{:#x}",
                    seq.type_name,
                    seq.items.len(),
                    self.identity().unwrap_or(0)
                )
            }
            Value::Mapping(map) => {
                let map = map.borrow();
                write!(
                    f,
                    "{}{{{}}}@{:#x}",
                    map.type_name,
                    map.entries.len(),
                    self.identity().unwrap_or(0)
                )
            }
        }
    }
}
