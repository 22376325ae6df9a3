use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

static INTERNED: Lazy<Mutex<HashSet<&'static str>>> = Lazy::new(Default::default);

/// A blackboard variable or port name. Names are interned once, so the
/// map lookups on every tick compare and hash a pointer, not characters.
#[derive(Clone, Copy)]
pub struct Symbol(&'static str);

impl Symbol {
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        let mut interned = INTERNED.lock().unwrap();
        match interned.get(name) {
            Some(&existing) => Symbol(existing),
            None => {
                let name: &'static str = Box::leak(name.to_owned().into_boxed_str());
                interned.insert(name);
                Symbol(name)
            }
        }
    }
}

// Interning guarantees one allocation per distinct name, so identity by
// address agrees with identity by content.
impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.0.as_ptr() as usize).hash(state);
    }
}

impl Debug for Symbol {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        Debug::fmt(self.0, fmt)
    }
}

impl Display for Symbol {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str(self.0)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PortType {
    Input,
    Output,
    InOut,
}

/// A port declared by a subtree, together with its direction.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PortSpec {
    pub ty: PortType,
    pub key: Symbol,
}

impl PortSpec {
    pub fn new_in(key: impl Into<Symbol>) -> Self {
        Self {
            ty: PortType::Input,
            key: key.into(),
        }
    }

    pub fn new_out(key: impl Into<Symbol>) -> Self {
        Self {
            ty: PortType::Output,
            key: key.into(),
        }
    }

    pub fn new_inout(key: impl Into<Symbol>) -> Self {
        Self {
            ty: PortType::InOut,
            key: key.into(),
        }
    }
}

/// What a node port is bound to at its call site: a blackboard variable
/// (with the direction the call site declared) or a literal string.
/// Never conflate the two; a literal can only ever be read.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum BlackboardValue {
    Ref(Symbol, PortType),
    Literal(String),
}

impl From<&str> for BlackboardValue {
    fn from(s: &str) -> Self {
        Self::Literal(s.to_string())
    }
}
