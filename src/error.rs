use crate::Symbol;
use thiserror::Error;

/// Malformed DSL source. The message names the failing production and a
/// snippet of the input where parsing stopped.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadError {
    #[error("node type or subtree name not found: {0:?}")]
    MissingNode(String),
    #[error("infinite recursion: the subtree {node:?} is used in itself")]
    InfiniteRecursion { node: String },
}

/// Errors raised while ticking, from a port access that is structurally
/// wrong at the call site. Reads never raise; writes are strict.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TickError {
    #[error("attempt to assign to the undefined port {0:?}")]
    UndefinedPort(Symbol),
    #[error("attempt to assign to the input port {0:?}")]
    WriteToInputPort(Symbol),
    #[error("attempt to assign through port {0:?}, which is bound to a literal")]
    WriteToLiteral(Symbol),
    #[error("the count port did not hold a positive decimal integer")]
    InvalidCount,
    /// Reserved. Reads of a missing variable currently yield `None` instead.
    #[error("could not find the named variable {0:?}")]
    UndefinedVariable(Symbol),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadYamlError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error("node type not found: {0:?}")]
    MissingNode(String),
    #[error("the document does not contain a behavior_tree mapping")]
    Missing,
}
