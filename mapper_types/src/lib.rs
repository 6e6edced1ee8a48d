//! Field Mapper Type Definitions
//!
//! This crate contains the structural program representation consumed and
//! extended by the field-accessor synthesis engine: an arena of class, field
//! and method nodes, the type descriptors attached to them, the method-body
//! IR, and the YAML schema used to describe classes on disk. It holds no
//! generation logic.

pub mod body;
pub mod builder;
pub mod hierarchy;
pub mod naming;
pub mod schema;
pub mod tree;
pub mod types;

// Re-export commonly used types at the crate root
pub use body::*;
pub use builder::ClassBuilder;
pub use hierarchy::TypeHierarchy;
pub use naming::{capitalize, getter_name, setter_name};
pub use schema::{AccessorSpec, ClassDef, ClassFile, FieldDef, MethodDef, ParamDef, SchemaError};
pub use tree::*;
pub use types::*;
