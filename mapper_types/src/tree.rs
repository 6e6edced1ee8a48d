//! Arena-backed program tree.
//!
//! Every class, field and method is stored once in a flat vector and
//! addressed by its [`NodeId`]. Parent links and member lists hold ids only,
//! so the tree can be freely shared, serialized and extended without any
//! ownership cycles. Nodes are never removed.

use crate::body::Block;
use crate::types::TypeDescriptor;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reserved name of the synthesized accessor type nested in each host class.
pub const FIELD_MAPPER_NAME: &str = "FieldMapper";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Declared in the input program.
    #[default]
    User,
    /// Produced by the accessor synthesis engine.
    Synthesized,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub supertypes: Vec<TypeDescriptor>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub origin: Origin,
    /// Fields, methods and nested classes in declaration order.
    #[serde(default)]
    pub members: Vec<NodeId>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn has_annotation(&self, marker: &str) -> bool {
        self.annotations.iter().any(|a| a == marker)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub annotations: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub params: Vec<Param>,
    pub return_type: TypeDescriptor,
    /// `None` for methods whose implementation lives outside the tree.
    #[serde(default)]
    pub body: Option<Block>,
    #[serde(default)]
    pub annotations: Vec<String>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, return_type: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            params: Vec::new(),
            return_type,
            body: None,
            annotations: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.params.push(Param::new(name, ty));
        self
    }

    pub fn with_body(mut self, body: Block) -> Self {
        self.body = Some(body);
        self
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "node", rename_all = "kebab-case")]
pub enum Node {
    Class(ClassDecl),
    Field(FieldDecl),
    Method(MethodDecl),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Class(class) => &class.name,
            Node::Field(field) => &field.name,
            Node::Method(method) => &method.name,
        }
    }

    pub fn annotations(&self) -> &[String] {
        match self {
            Node::Class(class) => &class.annotations,
            Node::Field(field) => &field.annotations,
            Node::Method(method) => &method.annotations,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct NodeEntry {
    #[serde(default)]
    parent: Option<NodeId>,
    node: Node,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0} is not a class")]
    NotAClass(NodeId),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ProgramTree {
    nodes: Vec<NodeEntry>,
    roots: Vec<NodeId>,
}

impl ProgramTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level classes in declaration order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).map(|entry| &entry.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|entry| entry.parent)
    }

    pub fn class(&self, id: NodeId) -> Option<&ClassDecl> {
        match self.node(id) {
            Some(Node::Class(class)) => Some(class),
            _ => None,
        }
    }

    pub fn class_mut(&mut self, id: NodeId) -> Option<&mut ClassDecl> {
        match self.nodes.get_mut(id.index()).map(|entry| &mut entry.node) {
            Some(Node::Class(class)) => Some(class),
            _ => None,
        }
    }

    pub fn field(&self, id: NodeId) -> Option<&FieldDecl> {
        match self.node(id) {
            Some(Node::Field(field)) => Some(field),
            _ => None,
        }
    }

    pub fn method(&self, id: NodeId) -> Option<&MethodDecl> {
        match self.node(id) {
            Some(Node::Method(method)) => Some(method),
            _ => None,
        }
    }

    /// Class node or a [`TreeError`] describing why `id` is not one.
    pub fn expect_class(&self, id: NodeId) -> Result<&ClassDecl, TreeError> {
        match self.node(id) {
            Some(Node::Class(class)) => Ok(class),
            Some(_) => Err(TreeError::NotAClass(id)),
            None => Err(TreeError::UnknownNode(id)),
        }
    }

    /// Every class in the tree, nested ones included, in node order.
    pub fn classes(&self) -> impl Iterator<Item = (NodeId, &ClassDecl)> {
        self.iter().filter_map(|(id, node)| match node {
            Node::Class(class) => Some((id, class)),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, entry)| (NodeId(idx as u32), &entry.node))
    }

    /// First top-level class with the given name.
    pub fn find_class(&self, name: &str) -> Option<NodeId> {
        self.roots
            .iter()
            .copied()
            .find(|id| self.class(*id).is_some_and(|class| class.name == name))
    }

    pub fn members(&self, class: NodeId) -> impl Iterator<Item = (NodeId, &Node)> {
        self.class(class)
            .map(|decl| decl.members.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.node(*id).map(|node| (*id, node)))
    }

    pub fn fields_of(&self, class: NodeId) -> impl Iterator<Item = (NodeId, &FieldDecl)> {
        self.members(class).filter_map(|(id, node)| match node {
            Node::Field(field) => Some((id, field)),
            _ => None,
        })
    }

    pub fn methods_of(&self, class: NodeId) -> impl Iterator<Item = (NodeId, &MethodDecl)> {
        self.members(class).filter_map(|(id, node)| match node {
            Node::Method(method) => Some((id, method)),
            _ => None,
        })
    }

    pub fn nested_of(&self, class: NodeId) -> impl Iterator<Item = (NodeId, &ClassDecl)> {
        self.members(class).filter_map(|(id, node)| match node {
            Node::Class(nested) => Some((id, nested)),
            _ => None,
        })
    }

    /// Nearest class containing `id` (the node itself when it is a class).
    pub fn enclosing_class(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.class(node).is_some() {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    pub fn add_class(&mut self, class: ClassDecl) -> NodeId {
        let id = self.push(None, Node::Class(class));
        self.roots.push(id);
        id
    }

    pub fn add_nested_class(&mut self, parent: NodeId, class: ClassDecl) -> Result<NodeId, TreeError> {
        self.expect_class(parent)?;
        Ok(self.attach(parent, Node::Class(class)))
    }

    pub fn add_field(&mut self, owner: NodeId, field: FieldDecl) -> Result<NodeId, TreeError> {
        self.expect_class(owner)?;
        Ok(self.attach(owner, Node::Field(field)))
    }

    pub fn add_method(&mut self, owner: NodeId, method: MethodDecl) -> Result<NodeId, TreeError> {
        self.expect_class(owner)?;
        Ok(self.attach(owner, Node::Method(method)))
    }

    fn push(&mut self, parent: Option<NodeId>, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeEntry { parent, node });
        id
    }

    /// Appends `node` to the member list of `owner`, which must be a class.
    pub(crate) fn attach(&mut self, owner: NodeId, node: Node) -> NodeId {
        let id = self.push(Some(owner), node);
        if let Some(class) = self.class_mut(owner) {
            class.members.push(id);
        }
        id
    }
}
