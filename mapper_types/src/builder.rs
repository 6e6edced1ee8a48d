use crate::body::{Expr, Stmt};
use crate::naming::{getter_name, setter_name};
use crate::tree::{ClassDecl, FieldDecl, MethodDecl, Node, NodeId, ProgramTree};
use crate::types::TypeDescriptor;

/// Fluent construction of a top-level class.
///
/// Conventional accessors get field-backed bodies: the getter returns
/// `this.<field>` and the setter stores its single parameter into it.
pub struct ClassBuilder<'t> {
    tree: &'t mut ProgramTree,
    class: NodeId,
}

impl ProgramTree {
    pub fn build_class(&mut self, name: impl Into<String>) -> ClassBuilder<'_> {
        let class = self.add_class(ClassDecl::new(name));
        ClassBuilder { tree: self, class }
    }
}

impl<'t> ClassBuilder<'t> {
    pub fn annotate(mut self, marker: impl Into<String>) -> Self {
        if let Some(class) = self.tree.class_mut(self.class) {
            class.annotations.push(marker.into());
        }
        self
    }

    pub fn extends(mut self, supertype: TypeDescriptor) -> Self {
        if let Some(class) = self.tree.class_mut(self.class) {
            class.supertypes.push(supertype);
        }
        self
    }

    pub fn field(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.field_decl(FieldDecl {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        })
    }

    pub fn field_decl(mut self, field: FieldDecl) -> Self {
        self.tree.attach(self.class, Node::Field(field));
        self
    }

    pub fn getter(self, field: &str, ty: TypeDescriptor) -> Self {
        let body = vec![Stmt::ret(Expr::load_field(Expr::This, field))];
        self.method(MethodDecl::new(getter_name(field), ty).with_body(body))
    }

    pub fn setter(self, field: &str, ty: TypeDescriptor) -> Self {
        let body = vec![Stmt::StoreField {
            object: Expr::This,
            field: field.to_string(),
            value: Expr::local(field),
        }];
        self.method(
            MethodDecl::new(setter_name(field), TypeDescriptor::Void)
                .with_param(field, ty)
                .with_body(body),
        )
    }

    /// Field plus conventional getter and setter.
    pub fn property(self, name: &str, ty: TypeDescriptor) -> Self {
        self.field(name, ty.clone())
            .getter(name, ty.clone())
            .setter(name, ty)
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.tree.attach(self.class, Node::Method(method));
        self
    }

    pub fn finish(self) -> NodeId {
        self.class
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveType;

    #[test]
    fn property_adds_field_getter_and_setter_in_order() {
        let mut tree = ProgramTree::new();
        let class = tree
            .build_class("Entity")
            .annotate("Entity")
            .property("id", TypeDescriptor::Primitive(PrimitiveType::Int64))
            .finish();

        let names: Vec<&str> = tree.members(class).map(|(_, node)| node.name()).collect();
        assert_eq!(names, vec!["id", "getId", "setId"]);

        let (_, setter) = tree.methods_of(class).nth(1).unwrap();
        assert_eq!(setter.params.len(), 1);
        assert_eq!(setter.params[0].name, "id");
        assert_eq!(setter.return_type, TypeDescriptor::Void);
        assert!(tree.class(class).unwrap().has_annotation("Entity"));
    }
}
