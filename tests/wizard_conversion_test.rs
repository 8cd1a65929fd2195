//! End-to-end tests for wizard guide conversion
//!
//! Guides are written to a temporary directory and loaded the way the CLI
//! loads them, so file reading and charset handling are covered too.

use interview_converter::builder::{InterviewSource, WizardInterview};
use interview_converter::converter::InterviewConverter;
use interview_converter::diagnostics::Diagnostic;
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

const EVICTION_GUIDE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TEMPLATE>
  <INFO>
    <TITLE>Eviction Answer</TITLE>
    <AUTHORS><AUTHOR><NAME>Pat Doe</NAME></AUTHOR></AUTHORS>
  </INFO>
  <STEPS>
    <STEP NUMBER="0"><TEXT>Start</TEXT></STEP>
  </STEPS>
  <PAGES>
    <PAGE NAME="1-Welcome" STEP="0">
      <TEXT><P>Welcome</P><P>This tool helps you <B>answer</B> an eviction.</P></TEXT>
      <BUTTONS><BUTTON NEXT="2-Name"><LABEL>Begin</LABEL></BUTTON></BUTTONS>
    </PAGE>
    <PAGE NAME="2-Name" STEP="0">
      <TEXT><P>What is your name?</P></TEXT>
      <FIELDS><FIELD TYPE="text"><NAME>Client name TE</NAME><LABEL>Name</LABEL></FIELD></FIELDS>
      <BUTTONS><BUTTON NEXT="FAIL" URL="https://example.org/exit"><LABEL>Quit</LABEL></BUTTON></BUTTONS>
    </PAGE>
  </PAGES>
</TEMPLATE>"#;

fn write_guide(dir: &TempDir, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join("EvictionGuide.xml");
    fs::write(&path, bytes).expect("write guide");
    path
}

#[test]
fn test_full_guide_output() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_guide(&dir, EVICTION_GUIDE.as_bytes());

    let converter = InterviewConverter::new();
    let interview = converter.load_wizard(&path).expect("load");
    let output = converter.convert(&interview);

    let expected = "---
metadata:
  title: \"Eviction Answer\"
  authors:
    - name: \"Pat Doe\"
---
sections:
  - Start: \"start\"
---
id: \"welcome\"
question: \"Welcome\"
subquestion: \"This tool helps you **answer** an eviction.\"
section: \"start\"
continue button field: \"welcome\"
continue button label: \"Begin\"
---
id: \"name\"
question: \"What is your name?\"
section: \"start\"
fields:
  - label: \"Name\"
    field: client_name
    datatype: text
";
    assert_eq!(output.yaml, expected);
    assert_eq!(output.document_count, 4);
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_graph_edges_and_exit() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_guide(&dir, EVICTION_GUIDE.as_bytes());
    let interview = WizardInterview::from_path(&path).expect("load");

    let welcome = interview.screen("welcome").expect("welcome");
    assert_eq!(welcome.successors.len(), 1);
    assert!(welcome.successors.contains("name"));
    assert!(welcome.exit_url.is_none());

    let name = interview.screen("name").expect("name");
    assert!(name.successors.is_empty());
    assert_eq!(name.exit_url.as_deref(), Some("https://example.org/exit"));

    assert!(interview.document().dangling_successors().is_empty());
    assert_eq!(interview.first_page(), Some("welcome"));
}

#[test]
fn test_two_pages_minimal() {
    let xml = br#"<TEMPLATE><PAGES>
        <PAGE NAME="One"><BUTTONS><BUTTON NEXT="Two"/></BUTTONS></PAGE>
        <PAGE NAME="Two"/>
    </PAGES></TEMPLATE>"#;
    let interview = WizardInterview::from_bytes(xml).expect("parse");

    let one: Vec<&String> = interview.screen("one").expect("one").successors.iter().collect();
    assert_eq!(one, vec!["two"]);
    assert!(interview.screen("two").expect("two").successors.is_empty());
}

#[test]
fn test_windows_1252_guide() {
    let mut bytes = br#"<?xml version="1.0" encoding="windows-1252"?>
<TEMPLATE><PAGES><PAGE NAME="Caf"#
        .to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(br#""><TEXT><P>Bienvenue au caf"#);
    bytes.push(0xE9);
    bytes.extend_from_slice(b"</P></TEXT></PAGE></PAGES></TEMPLATE>");

    let dir = TempDir::new().expect("tempdir");
    let path = write_guide(&dir, &bytes);
    let interview = WizardInterview::from_path(&path).expect("load");

    // é is dropped by the sanitizer but kept in text
    let screen = interview.screen("caf").expect("screen");
    assert_eq!(screen.question, "Bienvenue au café");
}

#[test]
fn test_invalid_utf8_guide_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_guide(&dir, b"<TEMPLATE>\xFF</TEMPLATE>");
    let result = WizardInterview::from_path(&path);
    assert!(matches!(
        result,
        Err(interview_converter::ConversionError::Encoding(_))
    ));
}

#[test]
fn test_unknown_type_keeps_field() {
    let xml = br#"<TEMPLATE><PAGES><PAGE NAME="P">
        <FIELDS><FIELD TYPE="hologram"><NAME>Thing</NAME><LABEL>Thing?</LABEL></FIELD></FIELDS>
    </PAGE></PAGES></TEMPLATE>"#;
    let interview = WizardInterview::from_bytes(xml).expect("parse");
    let docs = interview.to_documents();

    let field = &docs[2]["fields"][0];
    assert_eq!(field["field"], "thing");
    assert_eq!(field["label"], "Thing?");
    assert!(field.get("datatype").is_none());
    assert_eq!(
        interview.diagnostics(),
        &[Diagnostic::UnknownFieldType {
            field: "thing".to_string(),
            type_tag: "hologram".to_string(),
        }]
    );
}

#[test]
fn test_lists_and_help() {
    let xml = br#"<TEMPLATE><PAGES><PAGE NAME="Rights">
        <TEXT><P>Your rights</P><UL><LI>Notice</LI><LI>Hearing</LI></UL><OL><LI>Read</LI><LI>Sign</LI></OL></TEXT>
        <HELP><P>Call <A HREF="tel:211">211</A></P></HELP>
        <LEARN><P>More</P></LEARN>
    </PAGE></PAGES></TEMPLATE>"#;
    let interview = WizardInterview::from_bytes(xml).expect("parse");
    let screen = interview.screen("rights").expect("screen");

    assert_eq!(screen.question, "Your rights");
    assert_eq!(screen.subquestion, "* Notice\n* Hearing\n\n0. Read\n1. Sign");
    assert_eq!(screen.help.as_deref(), Some("Call [211](tel:211)"));
    assert!(interview.diagnostics().is_empty());
}

proptest! {
    #[test]
    fn prop_chain_of_pages_links_each_to_next(count in 2usize..8) {
        let pages: String = (0..count)
            .map(|i| {
                let next = if i + 1 < count {
                    format!(r#"<BUTTONS><BUTTON NEXT="Page {}"/></BUTTONS>"#, i + 1)
                } else {
                    String::new()
                };
                format!(r#"<PAGE NAME="Page {}">{}</PAGE>"#, i, next)
            })
            .collect();
        let xml = format!("<TEMPLATE><PAGES>{}</PAGES></TEMPLATE>", pages);
        let interview = WizardInterview::from_bytes(xml.as_bytes()).expect("parse");

        prop_assert_eq!(interview.document().screens().len(), count);
        prop_assert!(interview.document().dangling_successors().is_empty());
        for i in 0..count {
            let screen = interview.screen(&format!("page_{}", i)).expect("screen");
            let expected = usize::from(i + 1 < count);
            prop_assert_eq!(screen.successors.len(), expected);
        }
    }
}
