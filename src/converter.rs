//! Conversion entry point
//!
//! Ties the pipeline together: a builder produces the intermediate model,
//! the model renders to documents, and the emitter serializes them.
//!
//! ```text
//! source tree → builder → substitution + dedup → documents → emitter → text
//! ```
//!
//! # Examples
//!
//! ```rust
//! use interview_converter::builder::WizardInterview;
//! use interview_converter::converter::InterviewConverter;
//!
//! let xml = br#"<TEMPLATE><PAGES><PAGE NAME="Intro"><TEXT>Hello</TEXT></PAGE></PAGES></TEMPLATE>"#;
//! let interview = WizardInterview::from_bytes(xml).expect("parse");
//!
//! let output = InterviewConverter::new().convert(&interview);
//! assert!(output.yaml.contains("id: \"intro\""));
//! assert!(output.diagnostics.is_empty());
//! ```

use std::path::Path;
use std::time::Instant;

use crate::builder::{InterviewSource, LibraryInterview, WizardInterview};
use crate::diagnostics::Diagnostic;
use crate::emitter::to_yaml;
use crate::error::Result;

/// Conversion options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// File extension of component-library candidates, without the dot
    pub library_extension: String,
    /// Hoist identical option lists into shared choice sets
    pub dedupe_choices: bool,
    /// Emit placeholder documents for computation scripts
    pub include_computations: bool,
    /// Emit `= False` defaults for prompt-less true/false variables
    pub include_boolean_defaults: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            library_extension: "cmp".to_string(),
            dedupe_choices: true,
            include_computations: true,
            include_boolean_defaults: true,
        }
    }
}

/// Emitted text plus everything that was skipped or left unresolved
#[derive(Debug, Clone, Default)]
pub struct ConversionOutput {
    pub yaml: String,
    pub document_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ConversionOutput {
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Builds interviews from source files and renders them
#[derive(Debug, Clone, Default)]
pub struct InterviewConverter {
    options: ConversionOptions,
}

impl InterviewConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// ```rust
    /// use interview_converter::converter::{ConversionOptions, InterviewConverter};
    ///
    /// let converter = InterviewConverter::with_options(ConversionOptions {
    ///     dedupe_choices: false,
    ///     ..Default::default()
    /// });
    /// assert!(!converter.options().dedupe_choices);
    /// ```
    pub fn with_options(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Build a wizard guide from a single file
    ///
    /// # Errors
    ///
    /// The file cannot be read, is empty, or its encoding is unusable.
    pub fn load_wizard(&self, path: &Path) -> Result<WizardInterview> {
        tracing::debug!(path = %path.display(), "loading wizard guide");
        WizardInterview::from_path(path)
    }

    /// Build a component library from its directory
    ///
    /// # Errors
    ///
    /// The directory cannot be listed. A directory without a master file is
    /// not an error.
    pub fn load_library(&self, dir: &Path) -> Result<LibraryInterview> {
        tracing::debug!(dir = %dir.display(), "loading component library");
        LibraryInterview::from_dir(dir, &self.options)
    }

    /// Render a built interview
    pub fn convert(&self, source: &dyn InterviewSource) -> ConversionOutput {
        let start = Instant::now();
        let documents = source.to_documents();
        let yaml = to_yaml(&documents);
        let diagnostics = source.diagnostics().to_vec();

        tracing::info!(
            documents = documents.len(),
            bytes = yaml.len(),
            warnings = diagnostics.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "conversion complete"
        );

        ConversionOutput {
            yaml,
            document_count: documents.len(),
            diagnostics,
        }
    }
}
