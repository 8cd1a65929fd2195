//! Character encoding detection for source XML files
//!
//! Authoring tools for both source formats write XML in whatever encoding the
//! desktop happened to use: UTF-8 with or without a byte-order mark, UTF-16
//! from newer component-library releases, windows-1252 from older wizard
//! exports. The parser needs to know which before it can hand text to the
//! tree builder.
//!
//! # Detection Cascade
//!
//! 1. **Byte-order mark**: UTF-8, UTF-16LE and UTF-16BE marks are authoritative
//! 2. **XML declaration**: the `encoding="..."` pseudo-attribute of `<?xml ...?>`
//! 3. **Default to UTF-8**: if both fail, use UTF-8
//!
//! # Examples
//!
//! ```rust
//! use interview_converter::charset::detect_charset;
//!
//! let xml = b"<?xml version=\"1.0\" encoding=\"windows-1252\"?><TEMPLATE/>";
//! assert_eq!(detect_charset(xml), "WINDOWS-1252");
//!
//! assert_eq!(detect_charset(b"\xEF\xBB\xBF<root/>"), "UTF-8");
//! assert_eq!(detect_charset(b"<root/>"), "UTF-8");
//! ```

use regex::Regex;
use std::sync::OnceLock;

/// Default charset when detection fails
const DEFAULT_CHARSET: &str = "UTF-8";

/// Maximum bytes to scan for the XML declaration
const DECLARATION_SCAN_LIMIT: usize = 1024;

/// Detect character encoding using the three-level cascade
///
/// Always returns a charset name, normalized to uppercase, defaulting to
/// `"UTF-8"` when neither a byte-order mark nor a declaration is present.
pub fn detect_charset(xml: &[u8]) -> String {
    if let Some(charset) = extract_charset_from_bom(xml) {
        return charset.to_string();
    }

    if let Some(charset) = extract_charset_from_declaration(xml) {
        return normalize_charset(&charset);
    }

    DEFAULT_CHARSET.to_string()
}

/// Identify a byte-order mark at the start of the input
///
/// # Examples
///
/// ```rust
/// use interview_converter::charset::extract_charset_from_bom;
///
/// assert_eq!(extract_charset_from_bom(b"\xFF\xFE<\x00"), Some("UTF-16LE"));
/// assert_eq!(extract_charset_from_bom(b"<root/>"), None);
/// ```
pub fn extract_charset_from_bom(xml: &[u8]) -> Option<&'static str> {
    let (encoding, _) = encoding_rs::Encoding::for_bom(xml)?;
    Some(if encoding == encoding_rs::UTF_8 {
        "UTF-8"
    } else if encoding == encoding_rs::UTF_16LE {
        "UTF-16LE"
    } else {
        "UTF-16BE"
    })
}

/// Extract the `encoding` pseudo-attribute from an XML declaration
///
/// Only the first 1024 bytes are scanned; the declaration must be the first
/// thing in a well-formed document anyway.
///
/// # Examples
///
/// ```rust
/// use interview_converter::charset::extract_charset_from_declaration;
///
/// let xml = b"<?xml version='1.0' encoding='ISO-8859-1'?><a/>";
/// assert_eq!(extract_charset_from_declaration(xml), Some("ISO-8859-1".to_string()));
///
/// assert_eq!(extract_charset_from_declaration(b"<?xml version=\"1.0\"?><a/>"), None);
/// ```
pub fn extract_charset_from_declaration(xml: &[u8]) -> Option<String> {
    let scan_limit = std::cmp::min(xml.len(), DECLARATION_SCAN_LIMIT);

    // Lossy conversion is fine, the declaration itself is ASCII
    let prefix = String::from_utf8_lossy(&xml[..scan_limit]);

    static DECLARATION_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = DECLARATION_REGEX.get_or_init(|| {
        Regex::new(r#"^\s*<\?xml[^>]*?\sencoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#).ok()
    });
    let regex = regex.as_ref()?;

    regex
        .captures(&prefix)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Normalize charset name to uppercase
///
/// ```rust
/// use interview_converter::charset::normalize_charset;
///
/// assert_eq!(normalize_charset("utf-8"), "UTF-8");
/// assert_eq!(normalize_charset("windows-1252"), "WINDOWS-1252");
/// ```
pub fn normalize_charset(charset: &str) -> String {
    charset.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bom_utf8() {
        assert_eq!(extract_charset_from_bom(b"\xEF\xBB\xBF<a/>"), Some("UTF-8"));
    }

    #[test]
    fn test_bom_utf16_le_and_be() {
        assert_eq!(extract_charset_from_bom(b"\xFF\xFE<\x00"), Some("UTF-16LE"));
        assert_eq!(extract_charset_from_bom(b"\xFE\xFF\x00<"), Some("UTF-16BE"));
    }

    #[test]
    fn test_no_bom() {
        assert_eq!(extract_charset_from_bom(b"<a/>"), None);
        assert_eq!(extract_charset_from_bom(b""), None);
    }

    #[test]
    fn test_declaration_double_quotes() {
        let xml = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><TEMPLATE/>";
        assert_eq!(
            extract_charset_from_declaration(xml),
            Some("UTF-8".to_string())
        );
    }

    #[test]
    fn test_declaration_single_quotes_and_whitespace() {
        let xml = b"  <?xml version='1.0'   encoding = 'windows-1252' ?><a/>";
        assert_eq!(
            extract_charset_from_declaration(xml),
            Some("windows-1252".to_string())
        );
    }

    #[test]
    fn test_declaration_must_lead_document() {
        // An encoding attribute on some later element is not a declaration
        let xml = b"<root><x encoding=\"latin1\"/></root>";
        assert_eq!(extract_charset_from_declaration(xml), None);
    }

    #[test]
    fn test_declaration_beyond_scan_limit() {
        let mut xml = vec![b' '; DECLARATION_SCAN_LIMIT + 10];
        xml.extend_from_slice(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        assert_eq!(extract_charset_from_declaration(&xml), None);
    }

    #[test]
    fn test_detect_bom_beats_declaration() {
        let xml = b"\xEF\xBB\xBF<?xml version=\"1.0\" encoding=\"windows-1252\"?><a/>";
        assert_eq!(detect_charset(xml), "UTF-8");
    }

    #[test]
    fn test_detect_default() {
        assert_eq!(detect_charset(b"<a>text</a>"), "UTF-8");
    }

    #[test]
    fn test_detect_normalizes_declaration() {
        let xml = b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?><a/>";
        assert_eq!(detect_charset(xml), "ISO-8859-1");
    }

    proptest! {
        #[test]
        fn prop_declared_charset_is_detected_uppercased(
            charset in prop::sample::select(vec!["utf-8", "iso-8859-1", "windows-1252", "shift_jis", "us-ascii"]),
            single_quotes in any::<bool>(),
        ) {
            let q = if single_quotes { '\'' } else { '"' };
            let xml = format!("<?xml version={q}1.0{q} encoding={q}{charset}{q}?><root/>");
            prop_assert_eq!(detect_charset(xml.as_bytes()), charset.to_uppercase());
        }
    }
}
