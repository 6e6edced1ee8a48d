//! Batch driver.
//!
//! Walks every class carrying the [`ENTITY_MARKER`] annotation and runs the
//! catalog, synthesis and injection steps on it. A failure in one class is
//! reported through the diagnostic sink and never stops its siblings.

use crate::config::MapperConfig;
use crate::diagnostics::DiagnosticSink;
use crate::inject::{inject, InjectOutcome};
use crate::synthesize;
use mapper_types::{Node, NodeId, Origin, ProgramTree, TypeHierarchy, FIELD_MAPPER_NAME};
use serde_derive::Serialize;
use tracing::{debug, info, warn};

/// Annotation marking a class as eligible for accessor synthesis.
pub const ENTITY_MARKER: &str = "Entity";

/// Host class ids grouped by what happened to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub injected: Vec<NodeId>,
    pub already_present: Vec<NodeId>,
    /// Eligible classes without any declared field.
    pub skipped: Vec<NodeId>,
    pub failed: Vec<NodeId>,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.injected.is_empty()
            && self.already_present.is_empty()
            && self.skipped.is_empty()
            && self.failed.is_empty()
    }
}

pub struct Driver {
    config: MapperConfig,
}

impl Driver {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, tree: &mut ProgramTree, sink: &mut impl DiagnosticSink) -> BatchReport {
        let mut report = BatchReport::default();
        /* Marker misuse is reported whether or not injection is enabled */
        report_misplaced_markers(tree, sink);
        if !self.config.inline {
            debug!("inline injection disabled, nothing to do");
            return report;
        }

        let hierarchy = TypeHierarchy::from_tree(tree);
        let candidates: Vec<NodeId> = tree
            .classes()
            .filter(|(_, class)| class.has_annotation(ENTITY_MARKER))
            .map(|(id, _)| id)
            .collect();

        for class in candidates {
            self.process(tree, class, &hierarchy, sink, &mut report);
        }

        info!(
            injected = report.injected.len(),
            already_present = report.already_present.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "batch complete"
        );
        report
    }

    fn process(
        &self,
        tree: &mut ProgramTree,
        class: NodeId,
        hierarchy: &TypeHierarchy,
        sink: &mut impl DiagnosticSink,
        report: &mut BatchReport,
    ) {
        let name = tree.class(class).map(|c| c.name.clone()).unwrap_or_default();
        if tree.fields_of(class).next().is_none() {
            debug!(class = %name, "no declared fields, skipping");
            report.skipped.push(class);
            return;
        }

        let synthesized = match synthesize(tree, class, hierarchy) {
            Ok(synthesized) => synthesized,
            Err(errors) => {
                for error in errors {
                    sink.error(class, error.to_string());
                }
                report.failed.push(class);
                return;
            }
        };

        match inject(tree, class, &synthesized) {
            Ok(InjectOutcome::Injected(_)) => report.injected.push(class),
            Ok(InjectOutcome::AlreadyPresent { origin, .. }) => {
                if origin == Origin::User {
                    sink.warning(
                        class,
                        format!(
                            "fmapper: {name} already declares a nested type named {FIELD_MAPPER_NAME}; \
                             accessors were not injected"
                        ),
                    );
                }
                report.already_present.push(class);
            }
            Err(error) => {
                warn!(class = %name, %error, "injection failed");
                sink.warning(
                    class,
                    format!("fmapper: inline injection failed for {name} ({error})"),
                );
                report.failed.push(class);
            }
        }
    }
}

/* Fields and methods carrying the marker are reported against their class */
fn report_misplaced_markers(tree: &ProgramTree, sink: &mut impl DiagnosticSink) {
    for (id, node) in tree.iter() {
        if matches!(node, Node::Class(_)) {
            continue;
        }
        if node.annotations().iter().any(|a| a == ENTITY_MARKER) {
            let anchor = tree
                .parent(id)
                .and_then(|parent| tree.enclosing_class(parent))
                .unwrap_or(id);
            sink.error(anchor, format!("@{ENTITY_MARKER} can only be applied to classes"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Diagnostics, Severity};
    use crate::inject::find_reserved;
    use mapper_types::{ClassDecl, FieldDecl, PrimitiveType, TypeDescriptor};

    fn enabled() -> Driver {
        Driver::new(MapperConfig::default().with_inline(true))
    }

    fn batch() -> (ProgramTree, NodeId, NodeId, NodeId) {
        let mut tree = ProgramTree::new();
        let good = tree
            .build_class("Good")
            .annotate(ENTITY_MARKER)
            .property("id", TypeDescriptor::Primitive(PrimitiveType::Int64))
            .finish();
        let broken = tree
            .build_class("Broken")
            .annotate(ENTITY_MARKER)
            .field("name", TypeDescriptor::string())
            .getter("name", TypeDescriptor::string())
            .finish();
        let empty = tree.build_class("Empty").annotate(ENTITY_MARKER).finish();
        tree.build_class("Plain")
            .property("id", TypeDescriptor::Primitive(PrimitiveType::Int64))
            .finish();
        (tree, good, broken, empty)
    }

    #[test]
    fn disabled_switch_produces_nothing() {
        let (mut tree, ..) = batch();
        let snapshot = tree.clone();
        let mut sink = Diagnostics::new();

        let report = Driver::new(MapperConfig::default()).run(&mut tree, &mut sink);
        assert!(report.is_empty());
        assert!(sink.is_empty());
        assert_eq!(tree, snapshot);
    }

    #[test]
    fn broken_class_does_not_stop_its_siblings() {
        let (mut tree, good, broken, empty) = batch();
        let mut sink = Diagnostics::new();

        let report = enabled().run(&mut tree, &mut sink);
        assert_eq!(report.injected, vec![good]);
        assert_eq!(report.failed, vec![broken]);
        assert_eq!(report.skipped, vec![empty]);

        let errors: Vec<_> = sink.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].anchor, broken);
        assert!(errors[0].message.contains("setName"));

        assert!(find_reserved(&tree, good).is_some());
        assert!(find_reserved(&tree, broken).is_none());
        assert!(find_reserved(&tree, empty).is_none());
        let plain = tree.find_class("Plain").unwrap();
        assert!(find_reserved(&tree, plain).is_none());
    }

    #[test]
    fn second_run_is_a_no_op() {
        let (mut tree, good, ..) = batch();
        let driver = enabled();
        driver.run(&mut tree, &mut Diagnostics::new());
        let snapshot = tree.clone();

        let report = driver.run(&mut tree, &mut Diagnostics::new());
        assert_eq!(report.already_present, vec![good]);
        assert!(report.injected.is_empty());
        assert_eq!(tree, snapshot);
    }

    #[test]
    fn user_declared_accessor_type_is_kept_with_a_warning() {
        let mut tree = ProgramTree::new();
        let class = tree
            .build_class("Custom")
            .annotate(ENTITY_MARKER)
            .property("id", TypeDescriptor::Primitive(PrimitiveType::Int64))
            .finish();
        let user = tree
            .add_nested_class(class, ClassDecl::new(FIELD_MAPPER_NAME))
            .unwrap();
        let mut sink = Diagnostics::new();

        let report = enabled().run(&mut tree, &mut sink);
        assert_eq!(report.already_present, vec![class]);
        assert_eq!(find_reserved(&tree, class), Some((user, Origin::User)));
        let warning = sink.warnings().next().unwrap();
        assert_eq!(warning.severity, Severity::Warning);
        assert!(warning.message.contains("Custom"));
    }

    fn holder_with_marked_field() -> (ProgramTree, NodeId) {
        let mut tree = ProgramTree::new();
        let class = tree.add_class(ClassDecl::new("Holder"));
        tree.add_field(
            class,
            FieldDecl {
                name: "id".into(),
                ty: TypeDescriptor::Primitive(PrimitiveType::Int32),
                annotations: vec![ENTITY_MARKER.to_string()],
            },
        )
        .unwrap();
        (tree, class)
    }

    #[test]
    fn marker_on_a_field_is_an_error() {
        let (mut tree, class) = holder_with_marked_field();
        let mut sink = Diagnostics::new();

        let report = enabled().run(&mut tree, &mut sink);
        assert!(report.is_empty());
        let errors: Vec<_> = sink.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "@Entity can only be applied to classes");
        assert_eq!(errors[0].anchor, class);
    }

    #[test]
    fn marker_misuse_is_reported_with_injection_disabled() {
        let (mut tree, class) = holder_with_marked_field();
        let snapshot = tree.clone();
        let mut sink = Diagnostics::new();

        let report = Driver::new(MapperConfig::default()).run(&mut tree, &mut sink);
        assert!(report.is_empty());
        assert_eq!(sink.errors().count(), 1);
        assert_eq!(sink.entries()[0].anchor, class);
        assert_eq!(tree, snapshot);
    }
}
