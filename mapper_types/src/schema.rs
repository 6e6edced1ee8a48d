use crate::builder::ClassBuilder;
use crate::tree::{FieldDecl, MethodDecl, NodeId, ProgramTree};
use crate::types::TypeDescriptor;
use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/* ============================================================================
   Class description files
   ============================================================================ */

/* Which conventional accessors a field declares */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AccessorSpec {
    #[default]
    GetSet,
    Get,
    Set,
    None,
}

impl AccessorSpec {
    pub fn has_getter(self) -> bool {
        matches!(self, AccessorSpec::GetSet | AccessorSpec::Get)
    }

    pub fn has_setter(self) -> bool {
        matches!(self, AccessorSpec::GetSet | AccessorSpec::Set)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub accessors: AccessorSpec,
    #[serde(default)]
    pub annotations: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ParamDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

/* Method declared without a body; its implementation lives outside the tree */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct MethodDef {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDef>,
    #[serde(default = "void_type")]
    pub returns: TypeDescriptor,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub annotations: Vec<String>,
}

fn void_type() -> TypeDescriptor {
    TypeDescriptor::Void
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub supertypes: Vec<TypeDescriptor>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ClassFile {
    #[serde(default)]
    pub classes: Vec<ClassDef>,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid class file: {0}")]
    Yaml(#[from] serde_yml::Error),
}

impl ClassFile {
    pub fn from_yaml(content: &str) -> Result<Self, SchemaError> {
        Ok(serde_yml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /* Add every class to `tree`, returning the new class ids in file order */
    pub fn populate(&self, tree: &mut ProgramTree) -> Vec<NodeId> {
        self.classes.iter().map(|class| class.populate(tree)).collect()
    }

    pub fn into_tree(self) -> ProgramTree {
        let mut tree = ProgramTree::new();
        self.populate(&mut tree);
        tree
    }
}

impl ClassDef {
    /* Members are laid out as: each field followed by its accessors, then
     * the explicitly declared methods */
    pub fn populate(&self, tree: &mut ProgramTree) -> NodeId {
        let mut builder: ClassBuilder<'_> = tree.build_class(self.name.clone());
        for marker in &self.annotations {
            builder = builder.annotate(marker.clone());
        }
        for supertype in &self.supertypes {
            builder = builder.extends(supertype.clone());
        }
        for field in &self.fields {
            builder = builder.field_decl(FieldDecl {
                name: field.name.clone(),
                ty: field.ty.clone(),
                annotations: field.annotations.clone(),
            });
            if field.accessors.has_getter() {
                builder = builder.getter(&field.name, field.ty.clone());
            }
            if field.accessors.has_setter() {
                builder = builder.setter(&field.name, field.ty.clone());
            }
        }
        for method in &self.methods {
            let mut decl = MethodDecl::new(method.name.clone(), method.returns.clone());
            for param in &method.params {
                decl = decl.with_param(param.name.clone(), param.ty.clone());
            }
            decl.is_static = method.is_static;
            decl.annotations = method.annotations.clone();
            builder = builder.method(decl);
        }
        builder.finish()
    }
}
