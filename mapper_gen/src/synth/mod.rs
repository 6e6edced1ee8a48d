//! Accessor synthesis.
//!
//! Builds the companion `FieldMapper` type for one host class from its
//! validated field descriptors. Two method families are produced:
//!
//! * the dynamic API, `set(instance, field, value)` and `get(instance, field)`,
//!   dispatching on the field name over the untyped value channel;
//! * the typed API, one `set<Cap>(instance, value)` / `get<Cap>(instance)`
//!   pair per field with the field's declared type and no casts.
//!
//! For any field and value both families must behave identically. Sequence
//! fields share one mutate-in-place-else-replace policy (see [`sequence`]).

mod dynamic;
mod sequence;
mod typed;

use crate::catalog::FieldDescriptor;
use crate::errors::GenError;
use mapper_types::{
    Block, ClassDecl, MethodDecl, NodeId, Origin, Param, ProgramTree, TypeDescriptor,
    FIELD_MAPPER_NAME,
};
use serde_derive::Serialize;

pub(crate) const INSTANCE_PARAM: &str = "instance";
pub(crate) const FIELD_PARAM: &str = "field";
pub(crate) const VALUE_PARAM: &str = "value";
pub(crate) const INCOMING_LOCAL: &str = "incoming";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub is_static: bool,
    pub params: Vec<Param>,
    pub return_type: TypeDescriptor,
    pub body: Block,
}

impl MethodDescriptor {
    pub fn to_decl(&self) -> MethodDecl {
        MethodDecl {
            name: self.name.clone(),
            is_static: self.is_static,
            params: self.params.clone(),
            return_type: self.return_type.clone(),
            body: Some(self.body.clone()),
            annotations: Vec::new(),
        }
    }
}

/// Companion accessor type built for `host`, not yet attached to the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizedType {
    pub name: String,
    pub host: NodeId,
    pub methods: Vec<MethodDescriptor>,
}

impl SynthesizedType {
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub(crate) fn class_decl(&self) -> ClassDecl {
        ClassDecl {
            name: self.name.clone(),
            is_static: true,
            origin: Origin::Synthesized,
            ..ClassDecl::default()
        }
    }
}

pub struct AccessorSynthesizer<'a> {
    host: NodeId,
    host_type: TypeDescriptor,
    fields: &'a [FieldDescriptor],
}

impl<'a> AccessorSynthesizer<'a> {
    pub fn new(
        tree: &ProgramTree,
        host: NodeId,
        fields: &'a [FieldDescriptor],
    ) -> Result<Self, GenError> {
        let class = tree.expect_class(host)?;
        Ok(Self {
            host,
            host_type: TypeDescriptor::named(class.name.clone()),
            fields,
        })
    }

    /// Methods in order: `set`, `get`, then `set<Cap>` / `get<Cap>` for each
    /// field in declaration order.
    pub fn synthesize(&self) -> SynthesizedType {
        let mut methods = Vec::with_capacity(2 + self.fields.len() * 2);
        methods.push(self.dynamic_set());
        methods.push(self.dynamic_get());
        for field in self.fields {
            methods.push(self.typed_set(field));
            methods.push(self.typed_get(field));
        }
        SynthesizedType {
            name: FIELD_MAPPER_NAME.to_string(),
            host: self.host,
            methods,
        }
    }

    fn instance_param(&self) -> Param {
        Param::new(INSTANCE_PARAM, self.host_type.clone())
    }
}
