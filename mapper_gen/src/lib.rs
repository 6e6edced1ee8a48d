//! Field accessor synthesis.
//!
//! For every class marked as an entity, the engine catalogs its fields,
//! checks that the conventional `get<Cap>` / `set<Cap>` accessors exist,
//! builds a nested `FieldMapper` type exposing a string-keyed dynamic API and
//! a per-field typed API, and splices it into the class exactly once.
//!
//! The three core steps are pure functions over a [`ProgramTree`]:
//! [`synthesize`] followed by [`inject`]. The [`Driver`] runs them over a
//! whole batch and routes problems to a [`DiagnosticSink`].

pub mod catalog;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod errors;
pub mod inject;
pub mod synth;

pub use catalog::{FieldCatalog, FieldDescriptor, FieldType};
pub use config::MapperConfig;
pub use diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, Severity, TracingSink};
pub use driver::{BatchReport, Driver, ENTITY_MARKER};
pub use errors::{ConfigError, GenError, InjectError};
pub use inject::{find_reserved, inject, InjectOutcome};
pub use synth::{AccessorSynthesizer, MethodDescriptor, SynthesizedType};

use mapper_types::{NodeId, ProgramTree, TypeHierarchy};

/// Catalogs `class` and builds its accessor type without touching the tree.
pub fn synthesize(
    tree: &ProgramTree,
    class: NodeId,
    hierarchy: &TypeHierarchy,
) -> Result<SynthesizedType, Vec<GenError>> {
    let fields = FieldCatalog::new(tree, hierarchy).catalog(class)?;
    let synthesizer = AccessorSynthesizer::new(tree, class, &fields).map_err(|err| vec![err])?;
    Ok(synthesizer.synthesize())
}
