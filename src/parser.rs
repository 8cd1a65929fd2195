//! XML parser using xml5ever
//!
//! This module turns raw source bytes into a namespace-resolved DOM tree and
//! provides the small set of tree queries the model builders share.
//!
//! # Overview
//!
//! Both source formats are XML, but neither authoring tool is strict about it:
//! wizard exports embed HTML-ish inline markup in page text, and component
//! libraries are written in several encodings. The parser therefore:
//!
//! - detects and transcodes the encoding before parsing (see [`crate::charset`])
//! - uses xml5ever, which recovers from malformed markup instead of failing
//! - resolves `xmlns` declarations so element names carry their namespace URI
//!
//! # Examples
//!
//! ```rust
//! use interview_converter::parser::{document_element, local_name, parse_xml};
//!
//! let dom = parse_xml(b"<TEMPLATE><INFO/></TEMPLATE>").expect("parse");
//! let root = document_element(&dom).expect("root element");
//! assert_eq!(local_name(&root), Some("TEMPLATE"));
//! ```

use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::borrow::Cow;
use xml5ever::driver::{XmlParseOpts, parse_document};
use xml5ever::tendril::TendrilSink;

use crate::charset::detect_charset;
use crate::error::ConversionError;

/// Parse XML bytes into a DOM tree
///
/// # Errors
///
/// - `ConversionError::InvalidInput`: the input is empty
/// - `ConversionError::Encoding`: the detected charset is unsupported, or the
///   bytes are invalid for it
pub fn parse_xml(xml: &[u8]) -> Result<RcDom, ConversionError> {
    if xml.is_empty() {
        return Err(ConversionError::InvalidInput("XML input is empty".to_string()));
    }

    let detected_charset = detect_charset(xml);
    let text = decode_xml_to_utf8(xml, &detected_charset)?;

    let dom = parse_document(RcDom::default(), XmlParseOpts::default()).one(text.as_ref());

    Ok(dom)
}

fn decode_xml_to_utf8<'a>(
    xml: &'a [u8],
    detected_charset: &str,
) -> Result<Cow<'a, str>, ConversionError> {
    // The tree builder must never see a byte-order mark
    let bom_len = encoding_rs::Encoding::for_bom(xml).map_or(0, |(_, len)| len);
    let body = &xml[bom_len..];

    if detected_charset.eq_ignore_ascii_case("UTF-8") {
        return std::str::from_utf8(body).map(Cow::Borrowed).map_err(|e| {
            ConversionError::Encoding(format!(
                "Invalid UTF-8 at byte position {}: {}",
                e.valid_up_to() + bom_len,
                e
            ))
        });
    }

    let encoding =
        encoding_rs::Encoding::for_label(detected_charset.as_bytes()).ok_or_else(|| {
            ConversionError::Encoding(format!(
                "Unsupported charset '{}' for XML parsing",
                detected_charset
            ))
        })?;

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            ConversionError::Encoding(format!(
                "Invalid byte sequence for charset '{}'",
                detected_charset
            ))
        })
}

/// The root element of a parsed document, skipping declarations and comments
pub fn document_element(dom: &RcDom) -> Option<Handle> {
    dom.document
        .children
        .borrow()
        .iter()
        .find(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
}

/// Local (unprefixed) tag name of an element node
pub fn local_name(node: &Handle) -> Option<&str> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(&*name.local),
        _ => None,
    }
}

/// Namespace URI of an element node, empty when the element has none
pub fn namespace_uri(node: &Handle) -> Option<&str> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(&*name.ns),
        _ => None,
    }
}

/// Lower-cased local name, for formats whose tag case is not reliable
pub fn lowercase_name(node: &Handle) -> Option<String> {
    local_name(node).map(str::to_ascii_lowercase)
}

/// Element children only, in document order
pub fn child_elements(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

pub fn has_child_elements(node: &Handle) -> bool {
    node.children
        .borrow()
        .iter()
        .any(|child| matches!(child.data, NodeData::Element { .. }))
}

/// Get attribute value by exact local name
pub fn attr(node: &Handle, name: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Get attribute value ignoring ASCII case (`NEXT`, `next` and `Next` all match)
pub fn attr_ignore_case(node: &Handle, name: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref().eq_ignore_ascii_case(name))
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Concatenated text of a node and all its descendants
pub fn text_content(node: &Handle) -> String {
    let mut output = String::new();
    extract_text_content(node, &mut output);
    output
}

fn extract_text_content(node: &Handle, output: &mut String) {
    match node.data {
        NodeData::Text { ref contents } => {
            output.push_str(&contents.borrow());
        }
        NodeData::Element { .. } | NodeData::Document => {
            for child in node.children.borrow().iter() {
                extract_text_content(child, output);
            }
        }
        _ => {}
    }
}
