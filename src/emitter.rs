//! Structured document emitter
//!
//! Serializes a list of documents into the block/flow markup dialect the
//! interview runtime reads. A generic serializer does not fit: how a scalar is
//! written depends on the key it sits under, and how a map or list opens
//! depends on whether its parent was a map, a list or the document itself.
//!
//! # Scalar styles
//!
//! | Value                                   | Written as                  |
//! |-----------------------------------------|-----------------------------|
//! | string under `code`                     | `|` block scalar            |
//! | string containing a newline or `"`      | `|` block scalar            |
//! | string under `datatype`, `input type`, `field` | bare token           |
//! | ...unless it reads as a bool, null or number   | double-quoted        |
//! | any other string                        | double-quoted               |
//! | string with `\r` or a control character | double-quoted, escaped      |
//! | number, bool, null                      | bare token                  |
//! | empty map / empty list                  | `{}` / `[]`                 |
//!
//! # Example
//!
//! ```rust
//! use interview_converter::emitter::to_yaml;
//! use serde_json::json;
//!
//! let doc = json!({
//!     "id": "intro",
//!     "fields": [{"label": "Name", "field": "client_name"}],
//! });
//! assert_eq!(
//!     to_yaml(&[doc]),
//!     "---\nid: \"intro\"\nfields:\n  - label: \"Name\"\n    field: client_name\n"
//! );
//! ```

use serde_json::{Map, Value};

/// Document separator
const SEPARATOR: &str = "---\n";

/// Spaces per nesting level
const INDENT_WIDTH: usize = 2;

/// Keys whose string values are script and must never be quoted
const CODE_KEYS: &[&str] = &["code"];

/// Keys whose string values are enumeration-like tokens
const BARE_KEYS: &[&str] = &["datatype", "input type", "field"];

/// Plain scalars a YAML 1.1 loader reads as booleans, null or special floats
const RESERVED_WORDS: &[&str] = &[
    "y", "n", "yes", "no", "true", "false", "on", "off", "null", "~", ".inf", "-.inf", "+.inf",
    ".nan",
];

/// What the value being written is nested in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parent {
    Document,
    Map,
    List,
}

/// How a string scalar under the current key is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarStyle {
    Quoted,
    Block,
    Bare,
}

impl ScalarStyle {
    fn for_key(key: &str) -> Self {
        if CODE_KEYS.contains(&key) {
            ScalarStyle::Block
        } else if BARE_KEYS.contains(&key) {
            ScalarStyle::Bare
        } else {
            ScalarStyle::Quoted
        }
    }
}

/// Emit documents as one `---`-separated stream
pub fn to_yaml(documents: &[Value]) -> String {
    let mut output = String::with_capacity(256 * documents.len().max(1));
    for document in documents {
        write_document(&mut output, document);
    }
    output
}

/// Emit a single document, separator included
pub fn write_document(output: &mut String, document: &Value) {
    output.push_str(SEPARATOR);
    write_value(output, document, 0, Parent::Document, ScalarStyle::Quoted);
}

/// Write `value`; `indent` is the column of the construct that owns it
fn write_value(
    output: &mut String,
    value: &Value,
    indent: usize,
    parent: Parent,
    style: ScalarStyle,
) {
    match value {
        Value::Object(map) if map.is_empty() => output.push_str("{}\n"),
        Value::Array(list) if list.is_empty() => output.push_str("[]\n"),
        Value::Object(map) => write_map(output, map, indent, parent),
        Value::Array(list) => write_list(output, list, indent, parent),
        Value::String(text) => write_string(output, text, indent, style),
        Value::Number(n) => {
            output.push_str(&n.to_string());
            output.push('\n');
        }
        other => {
            output.push_str(&other.to_string());
            output.push('\n');
        }
    }
}

fn write_map(output: &mut String, map: &Map<String, Value>, indent: usize, parent: Parent) {
    let key_col = match parent {
        Parent::Document => indent,
        Parent::Map | Parent::List => indent + INDENT_WIDTH,
    };

    for (idx, (key, value)) in map.iter().enumerate() {
        if idx == 0 {
            // after `key:` the block starts on its own line, after `- ` it stays inline
            if parent == Parent::Map {
                output.push('\n');
                push_indent(output, key_col);
            }
        } else {
            push_indent(output, key_col);
        }

        write_key(output, key);
        output.push(':');
        if !opens_block(value) {
            output.push(' ');
        }
        write_value(output, value, key_col, Parent::Map, ScalarStyle::for_key(key));
    }
}

fn write_list(output: &mut String, list: &[Value], indent: usize, parent: Parent) {
    let item_col = match parent {
        Parent::Document => indent,
        Parent::Map | Parent::List => indent + INDENT_WIDTH,
    };

    for (idx, item) in list.iter().enumerate() {
        if idx == 0 {
            match parent {
                Parent::Map => {
                    output.push('\n');
                    push_indent(output, item_col);
                }
                Parent::List | Parent::Document => {}
            }
        } else {
            push_indent(output, item_col);
        }
        output.push_str("- ");
        write_value(output, item, item_col, Parent::List, ScalarStyle::Quoted);
    }
}

/// Non-empty maps and lists start on the next line after their key
fn opens_block(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(list) => !list.is_empty(),
        _ => false,
    }
}

fn write_string(output: &mut String, text: &str, indent: usize, style: ScalarStyle) {
    let multi_line = text.contains('\n');
    match style {
        // block scalars cannot carry escapes
        _ if text.contains('\r') || text.chars().any(|c| !is_printable(c)) => {
            write_quoted(output, text);
            output.push('\n');
        }
        ScalarStyle::Bare if !multi_line && is_plain_token(text) => {
            output.push_str(text);
            output.push('\n');
        }
        ScalarStyle::Block => write_block_scalar(output, text, indent),
        _ if multi_line || text.contains('"') => write_block_scalar(output, text, indent),
        _ => {
            write_quoted(output, text);
            output.push('\n');
        }
    }
}

/// Literal block scalar, content indented one level below `indent`
///
/// Empty lines are written without indentation. A first content line that
/// begins with a space needs an explicit indentation indicator.
fn write_block_scalar(output: &mut String, text: &str, indent: usize) {
    let content_col = indent + INDENT_WIDTH;
    let leading_space = text
        .lines()
        .find(|line| !line.is_empty())
        .is_some_and(|line| line.starts_with(' '));

    output.push('|');
    if leading_space {
        output.push_str(&INDENT_WIDTH.to_string());
    }
    output.push('\n');

    for line in text.lines() {
        if !line.is_empty() {
            push_indent(output, content_col);
            output.push_str(line);
        }
        output.push('\n');
    }
    if text.lines().next().is_none() {
        // block scalars need at least one content line
        push_indent(output, content_col);
        output.push('\n');
    }
}

fn write_quoted(output: &mut String, value: &str) {
    output.push('"');
    for ch in value.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if !is_printable(c) => {
                let code = u32::from(c);
                if code <= 0xFF {
                    output.push_str(&format!("\\x{:02X}", code));
                } else {
                    output.push_str(&format!("\\u{:04X}", code));
                }
            }
            _ => output.push(ch),
        }
    }
    output.push('"');
}

/// Keys are bare unless they would be misread
fn write_key(output: &mut String, key: &str) {
    let plain = !key.is_empty()
        && key.trim() == key
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.' | '(' | ')'))
        && !key.starts_with('-')
        && is_plain_token(key);
    if plain {
        output.push_str(key);
    } else {
        write_quoted(output, key);
    }
}

/// Characters that can be written raw
///
/// YAML printables, minus the extra line breaks a 1.1 loader folds.
fn is_printable(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{2027}'
        | '\u{202A}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Non-empty text that a loader would read back as the same string
fn is_plain_token(text: &str) -> bool {
    !text.is_empty()
        && !RESERVED_WORDS
            .iter()
            .any(|word| word.eq_ignore_ascii_case(text))
        && text.parse::<f64>().is_err()
        && !looks_numeric(text)
}

/// YAML 1.1 integer forms `f64` parsing does not cover: `1_000`, `0x1F`, `+5`
fn looks_numeric(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit() || c == '_');
    }
    digits.starts_with(|c: char| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '_' | '.' | ':'))
}

fn push_indent(output: &mut String, width: usize) {
    output.extend(std::iter::repeat_n(' ', width));
}
