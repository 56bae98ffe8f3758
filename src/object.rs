use crate::ast::{BlockStatement, Identifier};
use crate::builtins::Builtin;
use crate::environment::Env;
use rustc_hash::{FxHashMap, FxHasher};
use std::cell::RefCell;
use std::fmt;
use std::hash::Hasher;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Integer,
    String,
    Boolean,
    Null,
    Return,
    Error,
    Function,
    Builtin,
    Array,
    Hash,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ObjectKind::Integer => "INTEGER",
            ObjectKind::String => "STRING",
            ObjectKind::Boolean => "BOOLEAN",
            ObjectKind::Null => "NULL",
            ObjectKind::Return => "RETURN",
            ObjectKind::Error => "ERROR",
            ObjectKind::Function => "FUNCTION",
            ObjectKind::Builtin => "BUILTIN",
            ObjectKind::Array => "ARRAY",
            ObjectKind::Hash => "HASH",
        };
        write!(f, "{}", name)
    }
}

/// Runtime values.
///
/// `Boolean` and `Null` stand for the three canonical singletons; they carry
/// nothing but their content, so comparing them by value is comparing them by
/// identity. Arrays, hashes and functions live behind `Rc` and compare by
/// pointer.
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    String(String),
    Boolean(bool),
    Null,
    /// Control object used to unwind out of a function body.
    Return(Box<Object>),
    Error(String),
    Function(Rc<Function>),
    Builtin(&'static Builtin),
    Array(Rc<RefCell<Vec<Object>>>),
    Hash(Rc<HashObject>),
}

#[derive(Debug)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    /// Scope the literal was evaluated in.
    pub env: Env,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: ObjectKind,
    pub value: u64,
}

#[derive(Debug, Clone)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

#[derive(Debug, Default)]
pub struct HashObject {
    pub pairs: FxHashMap<HashKey, HashPair>,
}

impl Object {
    pub const TRUE: Object = Object::Boolean(true);
    pub const FALSE: Object = Object::Boolean(false);
    pub const NULL: Object = Object::Null;

    pub fn from_bool(value: bool) -> Object {
        if value {
            Object::TRUE
        } else {
            Object::FALSE
        }
    }

    pub fn error(message: impl Into<String>) -> Object {
        Object::Error(message.into())
    }

    pub fn array(elements: Vec<Object>) -> Object {
        Object::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Integer(_) => ObjectKind::Integer,
            Object::String(_) => ObjectKind::String,
            Object::Boolean(_) => ObjectKind::Boolean,
            Object::Null => ObjectKind::Null,
            Object::Return(_) => ObjectKind::Return,
            Object::Error(_) => ObjectKind::Error,
            Object::Function(_) => ObjectKind::Function,
            Object::Builtin(_) => ObjectKind::Builtin,
            Object::Array(_) => ObjectKind::Array,
            Object::Hash(_) => ObjectKind::Hash,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    /// `Some` for the hashable kinds: integers, booleans and strings.
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Object::Integer(n) => *n as u64,
            Object::Boolean(b) => u64::from(*b),
            Object::String(s) => {
                let mut hasher = FxHasher::default();
                hasher.write(s.as_bytes());
                hasher.finish()
            }
            _ => return None,
        };
        Some(HashKey {
            kind: self.kind(),
            value,
        })
    }

    /// Identity comparison used by `==`/`!=` when no typed rule applies.
    pub fn same_object(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Boolean(l), Object::Boolean(r)) => l == r,
            (Object::Null, Object::Null) => true,
            (Object::Array(l), Object::Array(r)) => Rc::ptr_eq(l, r),
            (Object::Hash(l), Object::Hash(r)) => Rc::ptr_eq(l, r),
            (Object::Function(l), Object::Function(r)) => Rc::ptr_eq(l, r),
            (Object::Builtin(l), Object::Builtin(r)) => std::ptr::eq(*l, *r),
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Object::Integer(n) => write!(f, "{}", n),
            Object::String(s) => write!(f, "{}", s),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::Null => write!(f, "null"),
            Object::Return(value) => write!(f, "{}", value),
            Object::Error(message) => write!(f, "ERROR: {}", message),
            Object::Function(function) => {
                write!(f, "func(")?;
                for (i, param) in function.parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") {}", function.body)
            }
            Object::Builtin(_) => write!(f, "builtin function"),
            Object::Array(elements) => {
                write!(f, "[")?;
                for (i, item) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Object::Hash(hash) => {
                write!(f, "{{")?;
                for (i, pair) in hash.pairs.values().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", pair.key, pair.value)?;
                }
                write!(f, "}}")
            }
        }
    }
}
