//! Interview converter
//!
//! Converts legal-interview definitions from two desktop authoring formats
//! into the questionnaire dialect an interview runtime reads:
//!
//! - page-graph **wizard** guides, one XML file per interview
//! - **component libraries**, a directory of namespaced XML files
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `parser`: XML parsing using xml5ever, plus DOM helpers
//! - `charset`: Character encoding detection for source files
//! - `sanitize`: Source names to target identifiers
//! - `markup`: Inline markup and display codes to Markdown
//! - `script`: Chevron directive and macro substitution
//! - `model`: Intermediate model shared by both formats
//! - `builder`: One model builder per source format
//! - `choices`: Shared choice-set deduplication
//! - `emitter`: Structured document serializer
//! - `converter`: Options and the conversion entry point
//! - `diagnostics`: Non-fatal warnings collected during a run
//! - `error`: Fatal errors
//!
//! # Examples
//!
//! ```rust
//! use interview_converter::{InterviewConverter, WizardInterview};
//!
//! let xml = br#"<TEMPLATE>
//!   <PAGES>
//!     <PAGE NAME="Intro"><TEXT><P>Welcome</P></TEXT>
//!       <BUTTONS><BUTTON NEXT="Done"/></BUTTONS></PAGE>
//!     <PAGE NAME="Done"><TEXT>Thanks</TEXT></PAGE>
//!   </PAGES>
//! </TEMPLATE>"#;
//!
//! let interview = WizardInterview::from_bytes(xml).unwrap();
//! let output = InterviewConverter::new().convert(&interview);
//! assert!(output.yaml.starts_with("---\nmetadata: {}\n---\nsections: []\n---\nid: \"intro\"\n"));
//! ```

pub mod builder;
pub mod charset;
pub mod choices;
pub mod converter;
pub mod diagnostics;
pub mod emitter;
pub mod error;
pub mod markup;
pub mod model;
pub mod parser;
pub mod sanitize;
pub mod script;

// Re-export main types for convenience
pub use builder::{InterviewSource, LibraryInterview, WizardInterview};
pub use converter::{ConversionOptions, ConversionOutput, InterviewConverter};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::ConversionError;
pub use parser::parse_xml;
