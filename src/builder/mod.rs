//! Intermediate model builders
//!
//! One builder per source format. They share no implementation, only the
//! [`InterviewSource`] capability: produce the ordered output documents and
//! report what was skipped along the way.
//!
//! - [`wizard`]: single-file page-graph guides (`...Guide.xml`)
//! - [`library`]: component-library directories (`*.cmp`)

pub mod library;
pub mod wizard;

use serde_json::Value;

use crate::diagnostics::Diagnostic;

pub use library::LibraryInterview;
pub use wizard::WizardInterview;

/// A built interview that can be rendered to output documents
pub trait InterviewSource {
    /// Documents in emission order
    fn to_documents(&self) -> Vec<Value>;

    /// Warnings collected while building
    fn diagnostics(&self) -> &[Diagnostic];
}
