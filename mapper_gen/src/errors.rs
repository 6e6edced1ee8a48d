use mapper_types::{NodeId, TreeError};
use std::path::PathBuf;
use thiserror::Error;

/// Generation-time errors. Any of these rejects the class it names; the
/// rest of the batch is unaffected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenError {
    #[error("class '{class}' is missing getter '{method}' for field '{field}'")]
    MissingGetter {
        class: String,
        field: String,
        method: String,
    },

    #[error("class '{class}' is missing setter '{method}' for field '{field}'")]
    MissingSetter {
        class: String,
        field: String,
        method: String,
    },

    #[error("class '{class}' declares field '{field}' more than once")]
    DuplicateField { class: String, field: String },

    #[error("class '{class}' declares a field with an empty name")]
    EmptyFieldName { class: String },

    #[error(
        "class '{class}': fields '{first}' and '{second}' both map to accessor suffix '{suffix}'"
    )]
    AccessorCollision {
        class: String,
        first: String,
        second: String,
        suffix: String,
    },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Raised when a synthesized type cannot be attached to the requested class.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InjectError {
    #[error("type synthesized for {expected} cannot be injected into {actual}")]
    HostMismatch { expected: NodeId, actual: NodeId },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config format: {0}")]
    InvalidFormat(#[from] serde_yml::Error),
}
