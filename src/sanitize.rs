//! Identifier sanitizing
//!
//! Source identifiers are free text ("Client name TE", "1st Child DOB DA").
//! The target runtime wants `[a-z_][a-z0-9_]*`. Every builder funnels names
//! through [`sanitize`], so the same source name always lands on the same
//! target identifier. Collisions are not resolved here: two source names that
//! sanitize alike simply share an identifier, and whichever map owns them
//! keeps the last one inserted.

/// Trailing type markers the component-library format appends to names
const TYPE_SUFFIXES: &[&str] = &["_TE", "_TF", "_NU", "_MC", "_DA", "_CO"];

/// Map a raw source name onto a target identifier
///
/// Steps, in order: trim, collapse space/newline runs to `_`, drop anything
/// outside `[A-Za-z0-9_]`, drop leading digits, drop one trailing type
/// marker, lowercase.
///
/// ```rust
/// use interview_converter::sanitize::sanitize;
///
/// assert_eq!(sanitize("  Client name TE "), "client_name");
/// assert_eq!(sanitize("eligible_TF"), "eligible");
/// assert_eq!(sanitize("2nd child's age"), "nd_childs_age");
/// ```
pub fn sanitize(raw: &str) -> String {
    let mut joined = String::with_capacity(raw.len());
    let mut in_gap = false;
    for ch in raw.trim().chars() {
        if ch == ' ' || ch == '\n' {
            if !in_gap {
                joined.push('_');
            }
            in_gap = true;
        } else {
            in_gap = false;
            if ch.is_ascii_alphanumeric() || ch == '_' {
                joined.push(ch);
            }
        }
    }

    let name = joined.trim_start_matches(|c: char| c.is_ascii_digit());
    let name = TYPE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(name);
    name.to_lowercase()
}

/// [`sanitize`] lifted over an optional name; absence stays absence
pub fn sanitize_opt(raw: Option<&str>) -> Option<String> {
    raw.map(sanitize)
}
