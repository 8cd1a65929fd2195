//! Mini-language substitution
//!
//! Component-library free text embeds chevron directives: `«Client name TE»`
//! interpolates a variable, `«IF Married TF»...«END IF»` guards a region and
//! `«Total CO»` calls a computation. This module rewrites the subset that maps
//! cleanly onto the target templating syntax:
//!
//! | Directive body     | Output                         |
//! |--------------------|--------------------------------|
//! | `IF cond`          | `\n% if cond:\n`               |
//! | `ELSE IF cond`     | `\n% elif cond:\n`             |
//! | `ELSE`             | `\n% else\n`                   |
//! | `END IF`           | `\n% endif\n`                  |
//! | computation name   | `${ name() }`                  |
//! | variable name      | `${ name }`                    |
//! | `Name:FORMAT`      | as `Name`, format dropped      |
//! | anything else      | sanitized literal + diagnostic |
//!
//! Lookups go through a [`SymbolTable`] that the builder fills completely
//! before any text is rewritten, so directives may name components declared
//! later in the file.
//!
//! Wizard page text uses a different macro form, `%%[Var Name]%%`, handled by
//! [`rewrite_macros`].

use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::markup::convert_display_codes;
use crate::sanitize::sanitize;

/// Names resolvable from directives, keyed by sanitized identifier
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    variables: HashSet<String>,
    computations: HashSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, raw_name: &str) {
        self.variables.insert(sanitize(raw_name));
    }

    pub fn add_computation(&mut self, raw_name: &str) {
        self.computations.insert(sanitize(raw_name));
    }

    pub fn is_variable(&self, raw_name: &str) -> bool {
        self.variables.contains(&sanitize(raw_name))
    }

    pub fn is_computation(&self, raw_name: &str) -> bool {
        self.computations.contains(&sanitize(raw_name))
    }

    /// Resolve a reference to its target expression, if it names anything
    ///
    /// Computations win over variables that sanitize to the same identifier.
    fn resolve(&self, reference: &str) -> Option<String> {
        let name = strip_format(reference);
        let id = sanitize(name);
        if self.computations.contains(&id) {
            Some(format!("{}()", id))
        } else if self.variables.contains(&id) {
            Some(id)
        } else {
            None
        }
    }
}

/// `Name:FORMAT` → `Name`
fn strip_format(reference: &str) -> &str {
    match reference.split_once(':') {
        Some((name, _)) => name.trim(),
        None => reference.trim(),
    }
}

fn directive_regex() -> Option<&'static Regex> {
    static DIRECTIVE: OnceLock<Option<Regex>> = OnceLock::new();
    DIRECTIVE
        .get_or_init(|| Regex::new(r"«([^«»]*)»").ok())
        .as_ref()
}

fn macro_regex() -> Option<&'static Regex> {
    static MACRO: OnceLock<Option<Regex>> = OnceLock::new();
    MACRO
        .get_or_init(|| Regex::new(r"%%\[([^\]]*)\]%%").ok())
        .as_ref()
}

/// Rewrite display codes and directives in component-library text
///
/// Unresolved references are rendered as their sanitized body and pushed to
/// `diagnostics`; substitution itself never fails.
///
/// ```rust
/// use interview_converter::diagnostics::Diagnostics;
/// use interview_converter::script::{SymbolTable, substitute};
///
/// let mut symbols = SymbolTable::new();
/// symbols.add_variable("eligible_TF");
/// let mut diagnostics = Diagnostics::new();
///
/// let text = substitute("«IF eligible_TF»yes«END IF»", &symbols, &mut diagnostics);
/// assert_eq!(text, "\n% if eligible:\nyes\n% endif\n");
/// assert!(diagnostics.is_empty());
/// ```
pub fn substitute(text: &str, symbols: &SymbolTable, diagnostics: &mut Diagnostics) -> String {
    let text = convert_display_codes(text);
    let Some(regex) = directive_regex() else {
        return text;
    };

    regex
        .replace_all(&text, |caps: &Captures| {
            rewrite_directive(caps[1].trim(), symbols, diagnostics)
        })
        .into_owned()
}

fn rewrite_directive(body: &str, symbols: &SymbolTable, diagnostics: &mut Diagnostics) -> String {
    if let Some(condition) = body.strip_prefix("ELSE IF ") {
        return format!("\n% elif {}:\n", condition_ref(condition, symbols));
    }
    if let Some(condition) = body.strip_prefix("IF ") {
        return format!("\n% if {}:\n", condition_ref(condition, symbols));
    }
    match body {
        "ELSE" => return "\n% else\n".to_string(),
        "END IF" => return "\n% endif\n".to_string(),
        _ => {}
    }

    if let Some(expr) = symbols.resolve(body) {
        return format!("${{ {} }}", expr);
    }

    diagnostics.push(Diagnostic::UnresolvedReference {
        directive: body.to_string(),
    });
    sanitize(body)
}

/// A condition is a computation call when it names one, else a bare reference
fn condition_ref(condition: &str, symbols: &SymbolTable) -> String {
    let condition = condition.trim();
    if symbols.is_computation(condition) {
        format!("{}()", sanitize(condition))
    } else {
        sanitize(condition)
    }
}

/// Rewrite wizard `%%[Var Name]%%` macros as interpolations
///
/// ```rust
/// use interview_converter::script::rewrite_macros;
///
/// assert_eq!(rewrite_macros("Hi %%[Client First Name TE]%%!"), "Hi ${ client_first_name }!");
/// ```
pub fn rewrite_macros(text: &str) -> String {
    match macro_regex() {
        Some(regex) if text.contains("%%") => regex
            .replace_all(text, |caps: &Captures| {
                format!("${{ {} }}", sanitize(&caps[1]))
            })
            .into_owned(),
        _ => text.to_string(),
    }
}
