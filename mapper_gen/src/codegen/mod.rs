pub mod java;

pub use java::{java_type, EmitError, JavaEmitter, JavaEmitterOptions};

/// File extension of emitted host sources.
pub const JAVA_EXTENSION: &str = "java";
