//! Idempotent attachment of a synthesized type to its host class.

use crate::errors::InjectError;
use crate::synth::SynthesizedType;
use mapper_types::{NodeId, Origin, ProgramTree, FIELD_MAPPER_NAME};
use serde_derive::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InjectOutcome {
    /// The candidate was appended as a new nested class.
    Injected(NodeId),
    /// A nested type with the reserved name already existed; the candidate
    /// was discarded and the tree left untouched.
    AlreadyPresent { existing: NodeId, origin: Origin },
}

impl InjectOutcome {
    pub fn node(self) -> NodeId {
        match self {
            InjectOutcome::Injected(id) => id,
            InjectOutcome::AlreadyPresent { existing, .. } => existing,
        }
    }

    pub fn was_injected(self) -> bool {
        matches!(self, InjectOutcome::Injected(_))
    }
}

/// First nested type of `class` carrying the reserved accessor-type name.
pub fn find_reserved(tree: &ProgramTree, class: NodeId) -> Option<(NodeId, Origin)> {
    tree.nested_of(class)
        .find(|(_, nested)| nested.name == FIELD_MAPPER_NAME)
        .map(|(id, nested)| (id, nested.origin))
}

/// Appends `synthesized` to the members of `class` unless a type with the
/// reserved name is already there. No existing member is touched either way.
pub fn inject(
    tree: &mut ProgramTree,
    class: NodeId,
    synthesized: &SynthesizedType,
) -> Result<InjectOutcome, InjectError> {
    let host = tree.expect_class(class)?.name.clone();
    if synthesized.host != class {
        return Err(InjectError::HostMismatch {
            expected: synthesized.host,
            actual: class,
        });
    }

    if let Some((existing, origin)) = find_reserved(tree, class) {
        debug!(class = %host, ?origin, "accessor type already present");
        return Ok(InjectOutcome::AlreadyPresent { existing, origin });
    }

    let nested = tree.add_nested_class(class, synthesized.class_decl())?;
    for method in &synthesized.methods {
        tree.add_method(nested, method.to_decl())?;
    }
    info!(
        class = %host,
        methods = synthesized.methods.len(),
        "injected {}",
        FIELD_MAPPER_NAME
    );
    Ok(InjectOutcome::Injected(nested))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesize;
    use assert_matches::assert_matches;
    use mapper_types::{ClassDecl, PrimitiveType, TypeDescriptor, TypeHierarchy};

    fn entity() -> (ProgramTree, NodeId) {
        let mut tree = ProgramTree::new();
        let class = tree
            .build_class("Entity")
            .property("id", TypeDescriptor::Primitive(PrimitiveType::Int64))
            .finish();
        (tree, class)
    }

    #[test]
    fn injects_once_and_then_leaves_the_tree_alone() {
        let (mut tree, class) = entity();
        let hierarchy = TypeHierarchy::from_tree(&tree);
        let synthesized = synthesize(&tree, class, &hierarchy).unwrap();

        let first = inject(&mut tree, class, &synthesized).unwrap();
        assert!(first.was_injected());
        let nested = tree.class(first.node()).unwrap();
        assert!(nested.is_static);
        assert_eq!(nested.origin, Origin::Synthesized);
        assert_eq!(nested.members.len(), synthesized.methods.len());
        assert_eq!(tree.parent(first.node()), Some(class));

        let snapshot = tree.clone();
        let second = inject(&mut tree, class, &synthesized).unwrap();
        assert_eq!(
            second,
            InjectOutcome::AlreadyPresent {
                existing: first.node(),
                origin: Origin::Synthesized,
            }
        );
        assert_eq!(tree, snapshot);
    }

    #[test]
    fn user_declared_reserved_type_counts_as_present() {
        let (mut tree, class) = entity();
        let user = tree
            .add_nested_class(class, ClassDecl::new(FIELD_MAPPER_NAME))
            .unwrap();
        let hierarchy = TypeHierarchy::from_tree(&tree);
        let synthesized = synthesize(&tree, class, &hierarchy).unwrap();

        let outcome = inject(&mut tree, class, &synthesized).unwrap();
        assert_eq!(
            outcome,
            InjectOutcome::AlreadyPresent {
                existing: user,
                origin: Origin::User,
            }
        );
        assert!(tree.class(user).unwrap().members.is_empty());
    }

    #[test]
    fn rejects_foreign_host() {
        let (mut tree, class) = entity();
        let other = tree.add_class(ClassDecl::new("Other"));
        let hierarchy = TypeHierarchy::from_tree(&tree);
        let synthesized = synthesize(&tree, class, &hierarchy).unwrap();

        assert_matches!(
            inject(&mut tree, other, &synthesized),
            Err(InjectError::HostMismatch { expected, actual }) if expected == class && actual == other
        );
        assert!(find_reserved(&tree, other).is_none());
    }
}
