use mapper_types::NodeId;
use thiserror::Error;

/// Result alias used across the runtime.
pub type ReflectResult<T> = Result<T, ReflectError>;

/// Errors raised while evaluating method bodies.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReflectError {
    /// The dynamic accessor API was given a key matching no field.
    #[error("Unknown field: {key}")]
    UnknownField { key: String },

    /// A value of the wrong kind crossed a cast or a parameter binding.
    #[error("cannot convert {found} to {expected}")]
    Conversion { expected: String, found: String },

    /// Instance method or sequence operation invoked on null.
    #[error("cannot invoke '{method}' on a null receiver")]
    NullReceiver { method: String },

    /// A sequence operation was handed null instead of a sequence.
    #[error("'{method}' was given a null argument")]
    NullArgument { method: String },

    #[error("class '{class}' has no method '{method}'")]
    NoSuchMethod { class: String, method: String },

    #[error("class '{class}' has no field '{field}'")]
    NoSuchField { class: String, field: String },

    #[error("class '{class}' has no nested accessor type")]
    MissingAccessorType { class: String },

    #[error("node {0} is not a method")]
    NotAMethod(NodeId),

    #[error("node {0} is not a class")]
    NotAClass(NodeId),

    #[error("method '{method}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        method: String,
        expected: usize,
        found: usize,
    },

    /// The method is declared but its implementation lives outside the tree.
    #[error("method '{method}' has no body")]
    AbstractMethod { method: String },

    #[error("heap handle {0} does not exist")]
    DanglingHandle(String),

    #[error("expected an object, found {found}")]
    NotAnObject { found: String },

    #[error("expected a sequence, found {found}")]
    NotASequence { found: String },

    #[error("local '{name}' is not bound")]
    MissingLocal { name: String },

    #[error("call depth exceeded {limit}")]
    CallDepthExceeded { limit: usize },
}
