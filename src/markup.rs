//! Inline markup conversion
//!
//! Free text in both source formats carries presentational markup that the
//! target runtime renders from a lightweight Markdown dialect instead.
//!
//! # Wizard format (element markup)
//!
//! Page text is HTML-ish markup embedded in the XML tree. The converter walks
//! it depth-first, in document order:
//!
//! - `b`/`strong` → `**text**`
//! - `i`/`em` → `*text*`
//! - `a` → `[label](href)`, the label converted recursively
//! - `u` → content kept, underline dropped (the target has no underline)
//! - anything else (`font`, `span`, ...) → unwrapped, content kept
//!
//! Inline runs are flattened to one line: newlines become spaces and the
//! fixed-width padding the authoring tool leaves behind is collapsed.
//!
//! Block content one level up (see [`convert_block`]):
//!
//! - `p` → inline content followed by a blank line
//! - `ul` → `* item` lines
//! - `ol` → `0. item`, `1. item`, ... lines (zero-based, as the wizard counts)
//! - any other element → its raw text and a newline
//!
//! # Component-library format (bracket codes)
//!
//! Captions and prompts use `«.b»`-style codes instead of elements; see
//! [`convert_display_codes`]. There underline is upgraded to bold, because
//! that tool's authors use underline for emphasis.
//!
//! # Examples
//!
//! ```rust
//! use interview_converter::markup::convert_inline;
//! use interview_converter::parser::{document_element, parse_xml};
//!
//! let dom = parse_xml(b"<P>Say <B>Hello</B> to <A HREF=\"https://x.org\">us</A></P>").unwrap();
//! let para = document_element(&dom).unwrap();
//! assert_eq!(convert_inline(&para), "Say **Hello** to [us](https://x.org)");
//! ```

use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;
use std::sync::OnceLock;

use crate::parser::{attr_ignore_case, child_elements, lowercase_name, text_content};

/// Run of spaces the wizard authoring tool pads fixed-width text with
const PADDING_RUN: &str = "           ";

/// Elements that start their own block inside a text container
const BLOCK_ELEMENTS: &[&str] = &["p", "ul", "ol"];

/// Elements that belong to an inline run even when they sit at block level
const INLINE_ELEMENTS: &[&str] = &["b", "strong", "i", "em", "u", "a", "font", "span"];

/// Component-library bracket codes and their replacements
const DISPLAY_CODES: &[(&str, &str)] = &[
    ("«.b»", "**"),
    ("«.be»", "**"),
    ("«.i»", "*"),
    ("«.ie»", "*"),
    ("«.u»", "**"),
    ("«.ue»", "**"),
    ("«.lq»", "\u{201c}"),
    ("«.rq»", "\u{201d}"),
    ("«.lsq»", "\u{2018}"),
    ("«.rsq»", "\u{2019}"),
    ("«.c»", ""),
    ("«.ce»", ""),
    ("«.l»", ""),
    ("«.le»", ""),
    ("«.r»", ""),
    ("«.re»", ""),
    ("«.kt»", ""),
    ("«.kte»", ""),
    ("«.pb»", ""),
];

/// Convert an element's inline content to a single Markdown line
pub fn convert_inline(node: &Handle) -> String {
    let mut output = String::new();
    for child in node.children.borrow().iter() {
        write_inline_node(child, &mut output);
    }
    normalize_inline(&output)
}

fn write_inline_node(node: &Handle, output: &mut String) {
    match node.data {
        NodeData::Text { ref contents } => output.push_str(&contents.borrow()),
        NodeData::Element { .. } => write_inline_element(node, output),
        _ => {}
    }
}

fn write_inline_element(node: &Handle, output: &mut String) {
    let tag = lowercase_name(node).unwrap_or_default();
    match tag.as_str() {
        "strong" | "b" => wrap_emphasis(node, "**", output),
        "em" | "i" => wrap_emphasis(node, "*", output),
        "a" => handle_link(node, output),
        // underline, font, span and unknown wrappers: keep the content only
        _ => {
            for child in node.children.borrow().iter() {
                write_inline_node(child, output);
            }
        }
    }
}

fn wrap_emphasis(node: &Handle, marker: &str, output: &mut String) {
    let content = convert_inline(node);
    if content.is_empty() {
        return;
    }
    output.push_str(marker);
    output.push_str(&content);
    output.push_str(marker);
}

fn handle_link(node: &Handle, output: &mut String) {
    let label = convert_inline(node);
    match attr_ignore_case(node, "href") {
        Some(href) => {
            output.push('[');
            output.push_str(&label);
            output.push_str("](");
            output.push_str(&href);
            output.push(')');
        }
        None => output.push_str(&label),
    }
}

fn normalize_inline(text: &str) -> String {
    text.replace('\n', " ").replace(PADDING_RUN, " ")
}

/// Convert a paragraph element: inline content followed by a blank line
pub fn convert_paragraph(node: &Handle) -> String {
    let mut text = convert_inline(node);
    text.push_str("\n\n");
    text
}

/// Convert a text container (a wizard `TEXT`, `HELP` or `LEARN` element)
///
/// Loose text and inline elements between blocks are converted as one
/// inline run; paragraphs and lists get blank-line separation.
pub fn convert_block(container: &Handle) -> String {
    let mut output = String::new();
    let mut run = String::new();

    for child in container.children.borrow().iter() {
        let tag = match child.data {
            NodeData::Text { ref contents } => {
                run.push_str(&contents.borrow());
                continue;
            }
            NodeData::Element { .. } => lowercase_name(child).unwrap_or_default(),
            _ => continue,
        };

        if INLINE_ELEMENTS.contains(&tag.as_str()) {
            write_inline_element(child, &mut run);
            continue;
        }

        flush_run(&mut run, &mut output);
        if BLOCK_ELEMENTS.contains(&tag.as_str()) {
            ensure_blank_line(&mut output);
        }

        match tag.as_str() {
            "p" => output.push_str(&convert_paragraph(child)),
            "ul" => {
                for item in child_elements(child) {
                    output.push_str("* ");
                    output.push_str(&convert_inline(&item));
                    output.push('\n');
                }
                output.push('\n');
            }
            "ol" => {
                for (idx, item) in child_elements(child).iter().enumerate() {
                    output.push_str(&format!("{}. ", idx));
                    output.push_str(&convert_inline(item));
                    output.push('\n');
                }
                output.push('\n');
            }
            _ => {
                output.push_str(&text_content(child));
                output.push('\n');
            }
        }
    }
    flush_run(&mut run, &mut output);

    output
}

fn flush_run(run: &mut String, output: &mut String) {
    let text = normalize_inline(run);
    let text = text.trim();
    if !text.is_empty() {
        output.push_str(text);
    }
    run.clear();
}

fn ensure_blank_line(output: &mut String) {
    if !output.is_empty() && !output.ends_with("\n\n") {
        if output.ends_with('\n') {
            output.push('\n');
        } else {
            output.push_str("\n\n");
        }
    }
}

fn web_link_code() -> Option<&'static Regex> {
    static WEB_LINK: OnceLock<Option<Regex>> = OnceLock::new();
    WEB_LINK
        .get_or_init(|| Regex::new(r#"«\.w\s+"([^"]*)"\s*([^»]*)»"#).ok())
        .as_ref()
}

/// Rewrite component-library bracket codes into Markdown
///
/// ```rust
/// use interview_converter::markup::convert_display_codes;
///
/// assert_eq!(convert_display_codes("«.b»Note«.be»: «.u»read«.ue»"), "**Note**: **read**");
/// assert_eq!(
///     convert_display_codes(r#"See «.w "https://law.org" the guide»."#),
///     "See [the guide](https://law.org)."
/// );
/// ```
pub fn convert_display_codes(text: &str) -> String {
    let mut output = text.to_string();
    for (code, replacement) in DISPLAY_CODES {
        if output.contains(code) {
            output = output.replace(code, replacement);
        }
    }

    if let Some(regex) = web_link_code() {
        output = regex
            .replace_all(&output, |caps: &regex::Captures| {
                let url = &caps[1];
                let label = caps[2].trim();
                let label = if label.is_empty() { url } else { label };
                format!("[{}]({})", label, url)
            })
            .into_owned();
    }

    output
}
