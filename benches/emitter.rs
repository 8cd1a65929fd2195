//! Benchmarks for the conversion pipeline.
//!
//! Run with: cargo bench

use std::fmt::Write;

use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};

use interview_converter::diagnostics::Diagnostics;
use interview_converter::emitter::to_yaml;
use interview_converter::script::{SymbolTable, substitute};
use interview_converter::{InterviewConverter, WizardInterview};

const PAGE_COUNT: usize = 200;

/// A linear guide with one text field per page
fn sample_guide() -> String {
    let mut xml = String::from("<TEMPLATE><INFO><TITLE>Bench</TITLE></INFO><PAGES>");
    for i in 0..PAGE_COUNT {
        let _ = write!(
            xml,
            r#"<PAGE NAME="Page {i}"><TEXT><P>Question <B>{i}</B></P><P>Details for %%[Answer {i} TE]%%</P></TEXT>
<FIELDS><FIELD TYPE="text"><NAME>Answer {i} TE</NAME><LABEL>Answer</LABEL></FIELD></FIELDS>
<BUTTONS><BUTTON NEXT="Page {next}"><LABEL>Next</LABEL></BUTTON></BUTTONS></PAGE>"#,
            next = i + 1
        );
    }
    xml.push_str("</PAGES></TEMPLATE>");
    xml
}

fn sample_documents() -> Vec<Value> {
    (0..PAGE_COUNT)
        .map(|i| {
            json!({
                "id": format!("page_{i}"),
                "question": "What is your name?",
                "subquestion": "Line one\n\nLine two",
                "fields": [
                    {"label": "Name", "field": format!("name_{i}"), "datatype": "text"},
                    {"label": "County", "field": "county", "datatype": "radio",
                     "choices": [{"King": "king"}, "Pierce"]},
                ],
            })
        })
        .collect()
}

// ============================================================================
// Pipeline Benchmarks
// ============================================================================

fn bench_build_wizard(c: &mut Criterion) {
    let xml = sample_guide();
    c.bench_function("build_wizard", |b| {
        b.iter(|| WizardInterview::from_bytes(xml.as_bytes()));
    });
}

fn bench_convert_wizard(c: &mut Criterion) {
    let xml = sample_guide();
    let interview = match WizardInterview::from_bytes(xml.as_bytes()) {
        Ok(interview) => interview,
        Err(e) => panic!("sample guide failed to parse: {e}"),
    };
    let converter = InterviewConverter::new();
    c.bench_function("convert_wizard", |b| {
        b.iter(|| converter.convert(&interview));
    });
}

// ============================================================================
// Component Benchmarks
// ============================================================================

fn bench_emit(c: &mut Criterion) {
    let documents = sample_documents();
    c.bench_function("emit_documents", |b| {
        b.iter(|| to_yaml(&documents));
    });
}

fn bench_substitute(c: &mut Criterion) {
    let mut symbols = SymbolTable::new();
    for i in 0..100 {
        symbols.add_variable(&format!("Var {i} TE"));
        symbols.add_computation(&format!("Calc {i} CO"));
    }
    let text = "«IF Calc 3 CO»Dear «Var 7 TE»,«ELSE»Hello «.b»friend«.be»«END IF» see «.w \"https://example.org\" site»"
        .repeat(20);

    c.bench_function("substitute", |b| {
        b.iter(|| {
            let mut diagnostics = Diagnostics::new();
            substitute(&text, &symbols, &mut diagnostics)
        });
    });
}

criterion_group!(
    benches,
    bench_build_wizard,
    bench_convert_wizard,
    bench_emit,
    bench_substitute
);
criterion_main!(benches);
