//! End-to-end tests for component library conversion
//!
//! Each test lays out a library directory with tempfile and runs it through
//! the converter the way the CLI does.

use interview_converter::builder::LibraryInterview;
use interview_converter::builder::library::LIBRARY_NAMESPACE;
use interview_converter::converter::{ConversionOptions, InterviewConverter};
use interview_converter::diagnostics::Diagnostic;
use interview_converter::model::ChoiceSource;
use interview_converter::InterviewSource;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn master(components: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<componentLibrary xmlns="{LIBRARY_NAMESPACE}">
  <preferences><preference name="CUSTOM_INTERVIEW">ASK About you</preference></preferences>
  <components>{components}</components>
</componentLibrary>"#
    )
}

fn library_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents).expect("write");
    }
    dir
}

fn convert(dir: &Path, options: ConversionOptions) -> interview_converter::ConversionOutput {
    let converter = InterviewConverter::with_options(options);
    let interview = converter.load_library(dir).expect("load");
    converter.convert(&interview)
}

const ABOUT_YOU: &str = r#"
    <text name="Client name TE"><prompt>Your «.b»full«.be» name</prompt></text>
    <multipleChoice name="Housing MC">
      <prompt>Where do you live?</prompt>
      <options><option name="Rent"><prompt>I rent</prompt></option><option name="Own"/></options>
      <singleSelection style="dropDownList"/>
    </multipleChoice>
    <dialogElement name="Intro"><caption>Hello «Client name TE»</caption></dialogElement>
    <dialog name="About you">
      <title>About you</title>
      <contents><item name="Intro"/><item name="Client name TE"/><item name="Housing MC"/></contents>
    </dialog>
    <trueFalse name="Has kids TF"/>
    <computation name="Kid count CO" resultType="number"><script>SET x TO 1</script></computation>
"#;

#[test]
fn test_full_library_output() {
    let dir = library_dir(&[("About.cmp", &master(ABOUT_YOU))]);
    let output = convert(dir.path(), ConversionOptions::default());

    let expected = "---
metadata: {}
---
id: \"About you\"
question: \"About you\"
subquestion: \"Hello ${ client_name }\"
fields:
  - label: \"Your **full** name\"
    field: client_name
    datatype: text
  - label: \"Where do you live?\"
    field: housing
    datatype: dropdown
    choices:
      - I rent: \"Rent\"
      - \"Own\"
---
id: \"kid_count\"
code: |
  def kid_count():
    # result type: number
    # SET x TO 1
    return None
---
code: |
  has_kids = False
";
    assert_eq!(output.yaml, expected);
    assert_eq!(output.document_count, 4);
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_optional_documents_can_be_turned_off() {
    let dir = library_dir(&[("About.cmp", &master(ABOUT_YOU))]);
    let output = convert(
        dir.path(),
        ConversionOptions {
            include_computations: false,
            include_boolean_defaults: false,
            ..Default::default()
        },
    );

    assert_eq!(output.document_count, 2);
    assert!(!output.yaml.contains("kid_count"));
    assert!(!output.yaml.contains("has_kids"));
}

#[test]
fn test_identical_option_lists_share_a_choice_set() {
    let components = r#"
        <multipleChoice name="Plaintiff state MC"><prompt>State</prompt>
          <options><option name="WA"/><option name="OR"/></options></multipleChoice>
        <multipleChoice name="Defendant state MC"><prompt>State</prompt>
          <options><option name="OR"/><option name="WA"/></options></multipleChoice>
        <multipleChoice name="Answer MC"><prompt>Answer</prompt>
          <options><option name="Yes"/><option name="No"/></options></multipleChoice>
        <dialog name="States"><contents>
          <item name="Plaintiff state MC"/><item name="Defendant state MC"/><item name="Answer MC"/>
        </contents></dialog>
    "#;
    let dir = library_dir(&[("lib.cmp", &master(components))]);

    let interview =
        LibraryInterview::from_dir(dir.path(), &ConversionOptions::default()).expect("load");
    assert_eq!(interview.choice_sets().len(), 1);
    assert_eq!(interview.choice_sets()[0].name, "plaintiff_state_choices");
    for name in ["Plaintiff state MC", "Defendant state MC"] {
        assert_eq!(
            interview.variable(name).and_then(|v| v.options()),
            Some(&ChoiceSource::Shared("plaintiff_state_choices".to_string()))
        );
    }
    assert!(matches!(
        interview.variable("Answer MC").and_then(|v| v.options()),
        Some(ChoiceSource::List(_))
    ));

    let output = InterviewConverter::new().convert(&interview);
    assert!(output.yaml.starts_with(
        "---\nmetadata: {}\n---\nvariable name: \"plaintiff_state_choices\"\ndata:\n  - \"OR\"\n  - \"WA\"\n"
    ));
    assert!(output
        .yaml
        .contains("    code: |\n      plaintiff_state_choices\n"));
}

#[test]
fn test_dedupe_can_be_disabled() {
    let components = r#"
        <multipleChoice name="A MC"><prompt>A</prompt><options><option name="x"/></options></multipleChoice>
        <multipleChoice name="B MC"><prompt>B</prompt><options><option name="x"/></options></multipleChoice>
    "#;
    let dir = library_dir(&[("lib.cmp", &master(components))]);
    let interview = LibraryInterview::from_dir(
        dir.path(),
        &ConversionOptions {
            dedupe_choices: false,
            ..Default::default()
        },
    )
    .expect("load");
    assert!(interview.choice_sets().is_empty());
}

#[test]
fn test_master_is_found_among_other_files() {
    let dir = library_dir(&[
        ("a_notes.cmp", "<notes>not a library</notes>"),
        ("b_broken.cmp", ""),
        ("readme.txt", "ignored"),
        ("z_master.CMP", &master(ABOUT_YOU)),
    ]);
    let interview =
        LibraryInterview::from_dir(dir.path(), &ConversionOptions::default()).expect("load");

    assert_eq!(
        interview.master_file().and_then(|p| p.file_name()),
        Some(std::ffi::OsStr::new("z_master.CMP"))
    );
    assert_eq!(interview.dialogs().len(), 1);
    // the empty candidate fails to parse and is reported
    assert!(matches!(
        interview.diagnostics(),
        [Diagnostic::UnreadableCandidate { .. }]
    ));
}

#[test]
fn test_custom_extension() {
    let dir = library_dir(&[("lib.xml", &master(ABOUT_YOU))]);
    let options = ConversionOptions {
        library_extension: "xml".to_string(),
        ..Default::default()
    };
    let interview = LibraryInterview::from_dir(dir.path(), &options).expect("load");
    assert!(interview.master_file().is_some());
}

#[test]
fn test_directory_without_master_emits_metadata_only() {
    let dir = library_dir(&[("other.cmp", "<something/>")]);
    let output = convert(dir.path(), ConversionOptions::default());

    assert_eq!(output.yaml, "---\nmetadata: {}\n");
    assert!(matches!(
        output.diagnostics.as_slice(),
        [Diagnostic::MissingMasterFile { .. }]
    ));
}

#[test]
fn test_utf16_master_file() {
    let text = master(r#"<text name="Name TE"><prompt>Nom complet</prompt></text>"#);
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("lib.cmp"), bytes).expect("write");

    let interview =
        LibraryInterview::from_dir(dir.path(), &ConversionOptions::default()).expect("load");
    assert_eq!(
        interview.variable("Name TE").and_then(|v| v.prompt.as_deref()),
        Some("Nom complet")
    );
}

#[test]
fn test_unresolved_directives_are_reported() {
    let components = r#"
        <text name="Ask TE"><prompt>«IF Missing TF»Yes«ELSE»No«END IF» for «Nobody»</prompt></text>
    "#;
    let dir = library_dir(&[("lib.cmp", &master(components))]);
    let interview =
        LibraryInterview::from_dir(dir.path(), &ConversionOptions::default()).expect("load");

    let prompt = interview
        .variable("Ask TE")
        .and_then(|v| v.prompt.clone())
        .expect("prompt");
    assert!(prompt.contains("% if missing:"));
    assert!(prompt.contains("% else"));
    assert!(prompt.contains("% endif"));
    assert!(prompt.ends_with("for nobody"));
    assert_eq!(
        interview.diagnostics(),
        &[Diagnostic::UnresolvedReference {
            directive: "Nobody".to_string(),
        }]
    );
}

#[test]
fn test_documents_are_stable_across_runs() {
    let dir = library_dir(&[("About.cmp", &master(ABOUT_YOU))]);
    let first = convert(dir.path(), ConversionOptions::default());
    let second = convert(dir.path(), ConversionOptions::default());
    assert_eq!(first.yaml, second.yaml);

    let interview =
        LibraryInterview::from_dir(dir.path(), &ConversionOptions::default()).expect("load");
    assert_eq!(interview.to_documents().len(), first.document_count);
}

#[test]
fn test_yes_no_choices_survive_as_strings() {
    let components = r#"
        <multipleChoice name="Served MC"><prompt>Were you served?</prompt>
          <options><option name="yes"><prompt>Yes</prompt></option><option name="no"><prompt>No</prompt></option></options>
        </multipleChoice>
        <dialog name="Service"><contents><item name="Served MC"/></contents></dialog>
    "#;
    let dir = library_dir(&[("lib.cmp", &master(components))]);
    let output = convert(dir.path(), ConversionOptions::default());

    assert!(output.yaml.contains(
        "    choices:\n      - \"Yes\": \"yes\"\n      - \"No\": \"no\"\n"
    ));
}
