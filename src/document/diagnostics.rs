//! Non-fatal diagnostics accumulated during schema dispatch.
//!
//! Individual diagnostics never abort parsing; the caller decides the
//! pass/fail policy once the whole document has been walked. The strict
//! entry points treat any accumulated diagnostic as a parse failure.

use std::fmt;

/// Category of a schema-dispatch diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A property name no element recognized.
    UnknownProperty,
    /// A property carried a JSON value of the wrong kind.
    TypeMismatch,
    /// Anything else worth reporting (bad enum value, malformed object).
    Invalid,
}

/// One recorded diagnostic with the element path it occurred at.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Where in the document, e.g. `accessors[3].sparse`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Shared accumulator for schema-dispatch diagnostics.
#[derive(Default, Debug, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, path: impl Into<String>, message: impl Into<String>) {
        let diag = Diagnostic { kind, path: path.into(), message: message.into() };
        tracing::debug!(target: "gltfkit::parse", "{diag}");
        self.entries.push(diag);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn first(&self) -> Option<&Diagnostic> {
        self.entries.first()
    }
}
