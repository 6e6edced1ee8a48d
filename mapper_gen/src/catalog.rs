//! Field extraction, classification and accessor resolution.

use crate::errors::GenError;
use mapper_types::{
    capitalize, getter_name, setter_name, FieldDecl, MethodDecl, NodeId, ProgramTree,
    TypeDescriptor, TypeHierarchy,
};
use serde_derive::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Declared type of a field tagged with its value kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "type", rename_all = "kebab-case")]
pub enum FieldType {
    Scalar(TypeDescriptor),
    Sequence(TypeDescriptor),
}

impl FieldType {
    pub fn declared(&self) -> &TypeDescriptor {
        match self {
            FieldType::Scalar(ty) | FieldType::Sequence(ty) => ty,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, FieldType::Sequence(_))
    }
}

/// A field whose conventional getter and setter were both resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    /// Field name with its first character capitalized.
    pub capitalized: String,
    pub ty: FieldType,
    pub field: NodeId,
    pub getter: NodeId,
    pub setter: NodeId,
}

impl FieldDescriptor {
    pub fn declared_type(&self) -> &TypeDescriptor {
        self.ty.declared()
    }

    pub fn getter_name(&self) -> String {
        format!("get{}", self.capitalized)
    }

    pub fn setter_name(&self) -> String {
        format!("set{}", self.capitalized)
    }
}

pub struct FieldCatalog<'a> {
    tree: &'a ProgramTree,
    hierarchy: &'a TypeHierarchy,
}

impl<'a> FieldCatalog<'a> {
    pub fn new(tree: &'a ProgramTree, hierarchy: &'a TypeHierarchy) -> Self {
        Self { tree, hierarchy }
    }

    pub fn classify(&self, ty: &TypeDescriptor) -> FieldType {
        if self.hierarchy.is_sequence(ty) {
            FieldType::Sequence(ty.clone())
        } else {
            FieldType::Scalar(ty.clone())
        }
    }

    /// Validated descriptors in field declaration order.
    ///
    /// Every problem found in the class is returned, not only the first.
    pub fn catalog(&self, class: NodeId) -> Result<Vec<FieldDescriptor>, Vec<GenError>> {
        let decl = self.tree.expect_class(class).map_err(|err| vec![err.into()])?;
        let class_name = decl.name.as_str();

        let mut errors = Vec::new();
        let mut descriptors = Vec::new();
        let mut seen_names = HashSet::new();
        let mut seen_suffixes: HashMap<String, &str> = HashMap::new();

        for (field_id, field) in self.tree.fields_of(class) {
            if field.name.is_empty() {
                errors.push(GenError::EmptyFieldName {
                    class: class_name.to_string(),
                });
                continue;
            }
            if !seen_names.insert(field.name.as_str()) {
                errors.push(GenError::DuplicateField {
                    class: class_name.to_string(),
                    field: field.name.clone(),
                });
                continue;
            }
            let suffix = capitalize(&field.name);
            if let Some(first) = seen_suffixes.get(&suffix) {
                errors.push(GenError::AccessorCollision {
                    class: class_name.to_string(),
                    first: first.to_string(),
                    second: field.name.clone(),
                    suffix,
                });
                continue;
            }
            seen_suffixes.insert(suffix.clone(), field.name.as_str());

            let ty = self.classify(&field.ty);
            debug!(
                class = class_name,
                field = %field.name,
                sequence = ty.is_sequence(),
                "classified field"
            );

            let getter = self.resolve_getter(class, field);
            let setter = self.resolve_setter(class, field);
            if getter.is_none() {
                errors.push(GenError::MissingGetter {
                    class: class_name.to_string(),
                    field: field.name.clone(),
                    method: getter_name(&field.name),
                });
            }
            if setter.is_none() {
                errors.push(GenError::MissingSetter {
                    class: class_name.to_string(),
                    field: field.name.clone(),
                    method: setter_name(&field.name),
                });
            }
            if let (Some(getter), Some(setter)) = (getter, setter) {
                descriptors.push(FieldDescriptor {
                    name: field.name.clone(),
                    capitalized: suffix,
                    ty,
                    field: field_id,
                    getter,
                    setter,
                });
            }
        }

        if errors.is_empty() {
            Ok(descriptors)
        } else {
            Err(errors)
        }
    }

    /* Instance method `get<Cap>()` with no parameters */
    fn resolve_getter(&self, class: NodeId, field: &FieldDecl) -> Option<NodeId> {
        let name = getter_name(&field.name);
        self.instance_methods(class, &name, 0)
            .min_by_key(|(_, method)| method.return_type != field.ty)
            .map(|(id, _)| id)
    }

    /* Instance method `set<Cap>(value)`; an exact parameter type match wins
     * over other single-parameter overloads */
    fn resolve_setter(&self, class: NodeId, field: &FieldDecl) -> Option<NodeId> {
        let name = setter_name(&field.name);
        self.instance_methods(class, &name, 1)
            .min_by_key(|(_, method)| method.params[0].ty != field.ty)
            .map(|(id, _)| id)
    }

    fn instance_methods<'n>(
        &'n self,
        class: NodeId,
        name: &'n str,
        arity: usize,
    ) -> impl Iterator<Item = (NodeId, &'a MethodDecl)> + 'n {
        self.tree.methods_of(class).filter(move |(_, method)| {
            !method.is_static && method.name == name && method.params.len() == arity
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapper_types::{MethodDecl, PrimitiveType};

    fn int64() -> TypeDescriptor {
        TypeDescriptor::Primitive(PrimitiveType::Int64)
    }

    #[test]
    fn classifies_and_resolves_in_declaration_order() {
        let mut tree = ProgramTree::new();
        let class = tree
            .build_class("Entity")
            .property("tags", TypeDescriptor::sequence_of(TypeDescriptor::string()))
            .property("id", int64())
            .finish();
        let hierarchy = TypeHierarchy::from_tree(&tree);

        let fields = FieldCatalog::new(&tree, &hierarchy).catalog(class).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "tags");
        assert!(fields[0].ty.is_sequence());
        assert_eq!(fields[1].ty, FieldType::Scalar(int64()));
        assert_eq!(tree.method(fields[1].getter).unwrap().name, "getId");
        assert_eq!(tree.method(fields[1].setter).unwrap().name, "setId");
        assert_eq!(fields[1].setter_name(), "setId");
    }

    #[test]
    fn reports_every_missing_accessor() {
        let mut tree = ProgramTree::new();
        let class = tree
            .build_class("Broken")
            .field("name", TypeDescriptor::string())
            .getter("name", TypeDescriptor::string())
            .field("members", TypeDescriptor::sequence_of(TypeDescriptor::string()))
            .setter("members", TypeDescriptor::sequence_of(TypeDescriptor::string()))
            .finish();
        let hierarchy = TypeHierarchy::from_tree(&tree);

        let errors = FieldCatalog::new(&tree, &hierarchy).catalog(class).unwrap_err();
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("setName") && messages[0].contains("Broken"));
        assert!(messages[1].contains("getMembers") && messages[1].contains("Broken"));
    }

    #[test]
    fn ignores_static_and_wrong_arity_accessors() {
        let mut tree = ProgramTree::new();
        let class = tree
            .build_class("Odd")
            .field("id", int64())
            .method(MethodDecl::new("getId", int64()).into_static())
            .method(
                MethodDecl::new("setId", TypeDescriptor::Void)
                    .with_param("a", int64())
                    .with_param("b", int64()),
            )
            .finish();
        let hierarchy = TypeHierarchy::from_tree(&tree);

        let errors = FieldCatalog::new(&tree, &hierarchy).catalog(class).unwrap_err();
        assert_eq!(
            errors,
            vec![
                GenError::MissingGetter {
                    class: "Odd".into(),
                    field: "id".into(),
                    method: "getId".into(),
                },
                GenError::MissingSetter {
                    class: "Odd".into(),
                    field: "id".into(),
                    method: "setId".into(),
                },
            ]
        );
    }

    #[test]
    fn prefers_setter_overload_matching_field_type() {
        let mut tree = ProgramTree::new();
        let class = tree
            .build_class("Overloaded")
            .field("id", int64())
            .getter("id", int64())
            .method(MethodDecl::new("setId", TypeDescriptor::Void).with_param("raw", TypeDescriptor::string()))
            .setter("id", int64())
            .finish();
        let hierarchy = TypeHierarchy::from_tree(&tree);

        let fields = FieldCatalog::new(&tree, &hierarchy).catalog(class).unwrap();
        let setter = tree.method(fields[0].setter).unwrap();
        assert_eq!(setter.params[0].ty, int64());
    }

    #[test]
    fn rejects_duplicate_and_colliding_fields() {
        let mut tree = ProgramTree::new();
        let class = tree
            .build_class("Clash")
            .property("id", int64())
            .field("id", int64())
            .field("Id", int64())
            .finish();
        let hierarchy = TypeHierarchy::from_tree(&tree);

        let errors = FieldCatalog::new(&tree, &hierarchy).catalog(class).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], GenError::DuplicateField { field, .. } if field == "id"));
        assert!(matches!(
            &errors[1],
            GenError::AccessorCollision { first, second, suffix, .. }
                if first == "id" && second == "Id" && suffix == "Id"
        ));
    }

    #[test]
    fn rejects_non_class_nodes() {
        let mut tree = ProgramTree::new();
        let class = tree.build_class("Entity").property("id", int64()).finish();
        let field = tree.fields_of(class).next().unwrap().0;
        let hierarchy = TypeHierarchy::from_tree(&tree);

        let errors = FieldCatalog::new(&tree, &hierarchy).catalog(field).unwrap_err();
        assert_eq!(errors, vec![GenError::Tree(mapper_types::TreeError::NotAClass(field))]);
    }
}
