//! Non-fatal conversion warnings
//!
//! Source schemas are loosely documented, so builders never abort on an
//! element they do not understand. They push a [`Diagnostic`] into a
//! [`Diagnostics`] sink and carry on; the caller decides whether to show,
//! log or ignore the collected list.

use std::fmt;
use std::path::PathBuf;

/// A recoverable condition found while building or rewriting an interview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An element carries a child tag the builder does not recognize
    UnknownElement { context: String, tag: String },
    /// A field's declared type tag is missing from the datatype table
    UnknownFieldType { field: String, type_tag: String },
    /// An attribute is present but its value cannot be used
    InvalidAttribute {
        context: String,
        attribute: String,
        value: String,
    },
    /// A required attribute is absent, so the element was skipped
    MissingAttribute { context: String, attribute: String },
    /// A directive names neither a known computation nor a known variable
    UnresolvedReference { directive: String },
    /// No component library master file was found in the directory
    MissingMasterFile { directory: PathBuf },
    /// A candidate master file could not be read or decoded
    UnreadableCandidate { path: PathBuf, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownElement { context, tag } => {
                write!(f, "unknown {} element: {}", context, tag)
            }
            Diagnostic::UnknownFieldType { field, type_tag } => {
                write!(f, "unknown type '{}' on field {}", type_tag, field)
            }
            Diagnostic::InvalidAttribute {
                context,
                attribute,
                value,
            } => write!(
                f,
                "invalid {} attribute {}='{}'",
                context, attribute, value
            ),
            Diagnostic::MissingAttribute { context, attribute } => {
                write!(f, "{} element without {} attribute", context, attribute)
            }
            Diagnostic::UnresolvedReference { directive } => {
                write!(f, "unresolved reference: {}", directive)
            }
            Diagnostic::MissingMasterFile { directory } => {
                write!(
                    f,
                    "no component library master file in {}",
                    directory.display()
                )
            }
            Diagnostic::UnreadableCandidate { path, reason } => {
                write!(f, "skipping {}: {}", path.display(), reason)
            }
        }
    }
}

/// Ordered collection of diagnostics, mirrored to `tracing` as they arrive
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
