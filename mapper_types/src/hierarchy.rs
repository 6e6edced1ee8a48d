//! Nominal subtyping over erased type descriptors.

use crate::tree::ProgramTree;
use crate::types::{TypeDescriptor, LIST_TYPE, SEQUENCE_TYPE, STRING_TYPE};
use std::collections::{HashMap, HashSet};

/// Maps each known type name to its declared direct supertypes.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    supertypes: HashMap<String, Vec<String>>,
}

impl TypeHierarchy {
    /// Built-in reference types only.
    pub fn builtin() -> Self {
        let mut hierarchy = Self::default();
        hierarchy.declare(SEQUENCE_TYPE, Vec::<String>::new());
        hierarchy.declare(LIST_TYPE, [SEQUENCE_TYPE]);
        hierarchy.declare(STRING_TYPE, Vec::<String>::new());
        hierarchy
    }

    /// Built-ins plus every class in `tree` with its declared supertypes.
    pub fn from_tree(tree: &ProgramTree) -> Self {
        let mut hierarchy = Self::builtin();
        for (_, class) in tree.classes() {
            let supers: Vec<String> = class
                .supertypes
                .iter()
                .filter_map(|ty| ty.name().map(str::to_string))
                .collect();
            hierarchy.declare(class.name.clone(), supers);
        }
        hierarchy
    }

    pub fn declare<I, S>(&mut self, name: impl Into<String>, supertypes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.supertypes.entry(name.into()).or_default();
        for sup in supertypes {
            let sup = sup.into();
            if !entry.contains(&sup) {
                entry.push(sup);
            }
        }
    }

    /// Reflexive, transitive nominal subtype test. Cycles in the declared
    /// hierarchy are tolerated.
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        let mut pending = vec![sub];
        let mut seen = HashSet::new();
        while let Some(current) = pending.pop() {
            if current == sup {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(parents) = self.supertypes.get(current) {
                pending.extend(parents.iter().map(String::as_str));
            }
        }
        false
    }

    /// Assignability of the erasure of `from` to the erasure of `to`.
    pub fn is_assignable(&self, from: &TypeDescriptor, to: &TypeDescriptor) -> bool {
        match (from.erasure(), to.erasure()) {
            (_, TypeDescriptor::Any) => true,
            (TypeDescriptor::Named { name: sub, .. }, TypeDescriptor::Named { name: sup, .. }) => {
                self.is_subtype(&sub, &sup)
            }
            (from, to) => from == to,
        }
    }

    /// True when `ty` belongs to the ordered homogeneous collection family.
    pub fn is_sequence(&self, ty: &TypeDescriptor) -> bool {
        self.is_assignable(ty, &TypeDescriptor::named(SEQUENCE_TYPE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ClassDecl;
    use crate::types::PrimitiveType;

    #[test]
    fn builtin_sequence_family() {
        let hierarchy = TypeHierarchy::builtin();
        assert!(hierarchy.is_sequence(&TypeDescriptor::sequence_of(TypeDescriptor::string())));
        assert!(hierarchy.is_sequence(&"list<int64>".parse().unwrap()));
        assert!(!hierarchy.is_sequence(&TypeDescriptor::string()));
        assert!(!hierarchy.is_sequence(&TypeDescriptor::Primitive(PrimitiveType::Int32)));
        assert!(!hierarchy.is_sequence(&"set<string>".parse().unwrap()));
    }

    #[test]
    fn user_classes_extend_the_family_transitively() {
        let mut tree = ProgramTree::new();
        let mut tags = ClassDecl::new("TagList");
        tags.supertypes.push("list<string>".parse().unwrap());
        tree.add_class(tags);
        let mut sorted = ClassDecl::new("SortedTagList");
        sorted.supertypes.push(TypeDescriptor::named("TagList"));
        tree.add_class(sorted);

        let hierarchy = TypeHierarchy::from_tree(&tree);
        assert!(hierarchy.is_sequence(&TypeDescriptor::named("SortedTagList")));
        assert!(hierarchy.is_subtype("SortedTagList", LIST_TYPE));
        assert!(!hierarchy.is_subtype(LIST_TYPE, "SortedTagList"));
    }

    #[test]
    fn tolerates_cycles() {
        let mut hierarchy = TypeHierarchy::builtin();
        hierarchy.declare("A", ["B"]);
        hierarchy.declare("B", ["A"]);
        assert!(!hierarchy.is_subtype("A", SEQUENCE_TYPE));
        assert!(hierarchy.is_subtype("A", "B"));
    }

    #[test]
    fn primitives_only_match_themselves() {
        let hierarchy = TypeHierarchy::builtin();
        let int = TypeDescriptor::Primitive(PrimitiveType::Int32);
        assert!(hierarchy.is_assignable(&int, &int));
        assert!(!hierarchy.is_assignable(&int, &TypeDescriptor::Boxed(PrimitiveType::Int32)));
        assert!(hierarchy.is_assignable(&int, &TypeDescriptor::Any));
    }
}
