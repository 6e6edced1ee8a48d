use mapper_types::NodeId;
use serde_derive::Serialize;
use std::fmt;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A message anchored at the tree node it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub anchor: NodeId,
}

/// Receiver of everything the driver has to say about a batch.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);

    fn error(&mut self, anchor: NodeId, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.report(Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            anchor,
        });
    }

    fn warning(&mut self, anchor: NodeId, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.report(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            anchor,
        });
    }
}

/// Collecting sink.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }
}

/// Forwards every diagnostic to `tracing` before handing it to the inner sink.
pub struct TracingSink<S> {
    inner: S,
}

impl<S: DiagnosticSink> TracingSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: DiagnosticSink> DiagnosticSink for TracingSink<S> {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => error!(anchor = %diagnostic.anchor, "{}", diagnostic.message),
            Severity::Warning => warn!(anchor = %diagnostic.anchor, "{}", diagnostic.message),
        }
        self.inner.report(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapper_types::{ClassDecl, ProgramTree};

    #[test]
    fn collects_by_severity() {
        let mut tree = ProgramTree::new();
        let class = tree.add_class(ClassDecl::new("Entity"));

        let mut sink = TracingSink::new(Diagnostics::new());
        sink.warning(class, "first");
        sink.error(class, "second");
        let diagnostics = sink.into_inner();

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.errors().next().unwrap().message, "second");
        assert_eq!(diagnostics.warnings().count(), 1);
        assert_eq!(diagnostics.entries()[0].anchor, class);
    }
}
