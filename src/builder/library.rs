//! Component-library builder
//!
//! A component library is a directory of `.cmp` files. Exactly one of them is
//! the master: its root is a namespaced `componentLibrary` element, possibly
//! with a `pointedToFile` attribute redirecting to the real definition file
//! next to it.
//!
//! The master holds `preferences` (name → text) and `components`: variables
//! (`text`, `number`, `trueFalse`, `multipleChoice`), `computation` scripts,
//! captioned `dialogElement`s and `dialog`s listing the items they show.
//!
//! Building runs in two phases. The first pass collects every component and
//! fills the symbol table; the second rewrites all free text through
//! [`crate::script::substitute`], so directives can name components declared
//! further down the file. Dialogs are assembled into screens only when the
//! documents are produced.

use markup5ever_rcdom::{Handle, RcDom};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::InterviewSource;
use crate::choices::deduplicate;
use crate::converter::ConversionOptions;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{ConversionError, Result};
use crate::model::{
    Choice, ChoiceSet, ChoiceSource, ComputationBlock, Datatype, Screen, ScreenField, Variable,
    VariableKind,
};
use crate::parser::{
    attr, child_elements, document_element, has_child_elements, local_name, namespace_uri,
    parse_xml, text_content,
};
use crate::sanitize::sanitize;
use crate::script::{SymbolTable, substitute};

/// Namespace of every component-library element
pub const LIBRARY_NAMESPACE: &str = "http://www.hotdocs.com/schemas/component_library/2009";

/// Local name of the master file's root element
const ROOT_TAG: &str = "componentLibrary";

/// Preference naming the script that drives the interview order
const MAIN_ORDER_PREFERENCE: &str = "CUSTOM_INTERVIEW";

/// Local name of a library element, `None` for anything outside the namespace
fn library_tag(node: &Handle) -> Option<&str> {
    if namespace_uri(node)? == LIBRARY_NAMESPACE {
        local_name(node)
    } else {
        None
    }
}

fn first_library_child(node: &Handle, tag: &str) -> Option<Handle> {
    child_elements(node)
        .into_iter()
        .find(|child| library_tag(child) == Some(tag))
}

/// A captioned, non-input dialog item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogElement {
    pub name: String,
    pub caption: String,
}

/// Reference from a dialog to one of its items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogItem {
    pub name: String,
    pub on_previous_line: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub name: String,
    pub title: Option<String>,
    pub contents: Vec<DialogItem>,
}

/// Variable kinds a prompt-less declaration can have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedKind {
    Text,
    Number,
    TrueFalse,
    MultipleChoice,
}

/// A component library built into the intermediate model
#[derive(Debug, Default)]
pub struct LibraryInterview {
    master_file: Option<PathBuf>,
    preferences: BTreeMap<String, String>,
    variables: Vec<Variable>,
    variable_index: HashMap<String, usize>,
    /// Variables declared without a prompt, assumed set by script
    scripted: Vec<(String, ScriptedKind)>,
    computations: Vec<ComputationBlock>,
    dialog_elements: HashMap<String, DialogElement>,
    dialogs: Vec<Dialog>,
    choice_sets: Vec<ChoiceSet>,
    include_computations: bool,
    include_boolean_defaults: bool,
    diagnostics: Diagnostics,
}

impl LibraryInterview {
    /// Locate the master file in `dir` and build it
    ///
    /// A directory without a master file yields an interview with no screens
    /// and a [`Diagnostic::MissingMasterFile`].
    ///
    /// # Errors
    ///
    /// Only when the directory itself cannot be listed.
    pub fn from_dir(dir: &Path, options: &ConversionOptions) -> Result<Self> {
        let mut interview = Self {
            include_computations: options.include_computations,
            include_boolean_defaults: options.include_boolean_defaults,
            ..Default::default()
        };

        let master = interview.find_master(dir, &options.library_extension)?;
        let Some((path, dom)) = master else {
            interview.diagnostics.push(Diagnostic::MissingMasterFile {
                directory: dir.to_path_buf(),
            });
            return Ok(interview);
        };

        tracing::debug!(master = %path.display(), "building component library");
        interview.master_file = Some(path);
        if let Some(root) = document_element(&dom) {
            interview.collect(&root);
        }
        interview.rewrite_text();
        if options.dedupe_choices {
            let rewritten = deduplicate(&mut interview.variables, &mut interview.choice_sets);
            tracing::debug!(rewritten, sets = interview.choice_sets.len(), "deduplicated choices");
        }

        Ok(interview)
    }

    /// Trial-parse candidates in name order until one has the master root
    fn find_master(&mut self, dir: &Path, extension: &str) -> Result<Option<(PathBuf, RcDom)>> {
        let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
            })
            .collect();
        candidates.sort();

        for candidate in candidates {
            let Some(dom) = self.load(&candidate) else {
                continue;
            };
            let Some(root) = document_element(&dom) else {
                continue;
            };
            if library_tag(&root) != Some(ROOT_TAG) {
                continue;
            }

            return Ok(match attr(&root, "pointedToFile") {
                Some(target) if !target.trim().is_empty() => {
                    let target = dir.join(target.trim());
                    self.load(&target).map(|dom| (target, dom))
                }
                _ => Some((candidate, dom)),
            });
        }

        Ok(None)
    }

    /// Read and parse a file, reporting failures instead of returning them
    ///
    /// The whole tree is returned: dropping an `RcDom` detaches every node
    /// below its document, so handles must not outlive it.
    fn load(&mut self, path: &Path) -> Option<RcDom> {
        let loaded = std::fs::read(path)
            .map_err(ConversionError::from)
            .and_then(|bytes| parse_xml(&bytes));
        match loaded {
            Ok(dom) => Some(dom),
            Err(e) => {
                self.diagnostics.push(Diagnostic::UnreadableCandidate {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn collect(&mut self, root: &Handle) {
        for section in child_elements(root) {
            match library_tag(&section) {
                Some("preferences") => self.parse_preferences(&section),
                Some("components") => {
                    for component in child_elements(&section) {
                        self.parse_component(&component);
                    }
                }
                _ => {}
            }
        }
    }

    fn parse_preferences(&mut self, preferences: &Handle) {
        for preference in child_elements(preferences) {
            if let Some(name) = attr(&preference, "name") {
                self.preferences.insert(name, text_content(&preference));
            }
        }
    }

    fn parse_component(&mut self, component: &Handle) {
        let Some(tag) = library_tag(component) else {
            return;
        };
        let kind = match tag {
            "text" => ScriptedKind::Text,
            "number" => ScriptedKind::Number,
            "trueFalse" => ScriptedKind::TrueFalse,
            "multipleChoice" => ScriptedKind::MultipleChoice,
            "computation" => return self.parse_computation(component),
            "dialogElement" => return self.parse_dialog_element(component),
            "dialog" => return self.parse_dialog(component),
            // text/number formats, templates and the like carry nothing we emit
            other => {
                tracing::debug!(tag = %other, "skipping component");
                return;
            }
        };

        let Some(name) = self.required_name(component, tag) else {
            return;
        };
        if !has_child_elements(component) {
            tracing::debug!(variable = %name, "no prompt, assuming it is set by script");
            self.scripted.push((name, kind));
            return;
        }

        let prompt = first_library_child(component, "prompt").map(|p| text_content(&p));
        let help = first_library_child(component, "resource").map(|r| resource_text(&r));
        let kind = match kind {
            ScriptedKind::Text => VariableKind::Text {
                multi_line: first_library_child(component, "multiLine").is_some(),
            },
            ScriptedKind::Number => VariableKind::Number {
                decimal_places: self.decimal_places(component),
                currency_symbol: attr(component, "currencySymbol"),
                default_format: first_library_child(component, "defFormat")
                    .map(|f| text_content(&f)),
            },
            ScriptedKind::TrueFalse => VariableKind::TrueFalse {
                yes_no_on_same_line: attr(component, "yesNoOnSameLine")
                    .is_some_and(|v| v.eq_ignore_ascii_case("true")),
            },
            ScriptedKind::MultipleChoice => self.parse_choice_kind(component),
        };

        self.insert_variable(Variable {
            da_name: sanitize(&name),
            name,
            prompt,
            help,
            kind,
        });
    }

    fn required_name(&mut self, component: &Handle, tag: &str) -> Option<String> {
        let name = attr(component, "name");
        if name.is_none() {
            self.diagnostics.push(Diagnostic::MissingAttribute {
                context: tag.to_string(),
                attribute: "name".to_string(),
            });
        }
        name
    }

    fn decimal_places(&mut self, component: &Handle) -> u32 {
        let Some(raw) = attr(component, "decimalPlaces") else {
            return 0;
        };
        match raw.trim().parse::<u32>() {
            Ok(places) => places,
            Err(_) => {
                self.diagnostics.push(Diagnostic::InvalidAttribute {
                    context: "number".to_string(),
                    attribute: "decimalPlaces".to_string(),
                    value: raw,
                });
                0
            }
        }
    }

    fn parse_choice_kind(&mut self, component: &Handle) -> VariableKind {
        let mut datatype = Datatype::Radio;
        let mut options = Vec::new();

        for child in child_elements(component) {
            match library_tag(&child) {
                Some("options") => {
                    for option in child_elements(&child) {
                        let Some(value) = self.required_name(&option, "option") else {
                            continue;
                        };
                        let display = first_library_child(&option, "prompt")
                            .map(|p| text_content(&p).trim().to_string())
                            .filter(|d| !d.is_empty())
                            .unwrap_or_else(|| value.clone());
                        options.push(Choice::new(display, value));
                    }
                }
                Some("singleSelection") => {
                    datatype = match attr(&child, "style").as_deref() {
                        Some("dropDownList") => Datatype::Dropdown,
                        _ => Datatype::Radio,
                    };
                }
                Some("multipleSelection") => datatype = Datatype::Checkboxes,
                _ => {}
            }
        }

        let options = if options.is_empty() {
            ChoiceSource::None
        } else {
            ChoiceSource::List(options)
        };
        VariableKind::MultipleChoice { datatype, options }
    }

    fn insert_variable(&mut self, variable: Variable) {
        match self.variable_index.get(&variable.name) {
            Some(&idx) => self.variables[idx] = variable,
            None => {
                self.variable_index
                    .insert(variable.name.clone(), self.variables.len());
                self.variables.push(variable);
            }
        }
    }

    fn parse_computation(&mut self, component: &Handle) {
        let Some(name) = self.required_name(component, "computation") else {
            return;
        };
        let script = first_library_child(component, "script")
            .map(|s| text_content(&s))
            .unwrap_or_default();
        let block = ComputationBlock {
            da_name: sanitize(&name),
            name,
            result_type: attr(component, "resultType"),
            script,
        };
        match self.computations.iter_mut().find(|c| c.name == block.name) {
            Some(existing) => *existing = block,
            None => self.computations.push(block),
        }
    }

    fn parse_dialog_element(&mut self, component: &Handle) {
        let Some(name) = self.required_name(component, "dialogElement") else {
            return;
        };
        let caption = first_library_child(component, "caption")
            .map(|c| text_content(&c))
            .unwrap_or_default();
        self.dialog_elements
            .insert(name.clone(), DialogElement { name, caption });
    }

    fn parse_dialog(&mut self, component: &Handle) {
        let Some(name) = self.required_name(component, "dialog") else {
            return;
        };
        let title = first_library_child(component, "title").map(|t| text_content(&t));
        let contents = first_library_child(component, "contents")
            .map(|contents| {
                child_elements(&contents)
                    .iter()
                    .filter_map(|item| {
                        Some(DialogItem {
                            name: attr(item, "name")?,
                            on_previous_line: attr(item, "onPreviousLine")
                                .is_some_and(|v| v.eq_ignore_ascii_case("true")),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let dialog = Dialog {
            name,
            title,
            contents,
        };
        match self.dialogs.iter_mut().find(|d| d.name == dialog.name) {
            Some(existing) => *existing = dialog,
            None => self.dialogs.push(dialog),
        }
    }

    /// Second phase: resolve directives now that every name is known
    fn rewrite_text(&mut self) {
        let mut symbols = SymbolTable::new();
        for variable in &self.variables {
            symbols.add_variable(&variable.name);
        }
        for computation in &self.computations {
            symbols.add_computation(&computation.name);
        }

        let diagnostics = &mut self.diagnostics;
        let mut rewrite = |text: &str| substitute(text, &symbols, diagnostics).trim().to_string();

        for variable in &mut self.variables {
            variable.prompt = variable.prompt.as_deref().map(&mut rewrite);
            variable.help = variable.help.as_deref().map(&mut rewrite);
        }
        for element in self.dialog_elements.values_mut() {
            element.caption = rewrite(&element.caption);
        }
        for dialog in &mut self.dialogs {
            dialog.title = dialog.title.as_deref().map(&mut rewrite);
        }
    }

    pub fn master_file(&self) -> Option<&Path> {
        self.master_file.as_deref()
    }

    pub fn preferences(&self) -> &BTreeMap<String, String> {
        &self.preferences
    }

    /// Script named by the `CUSTOM_INTERVIEW` preference
    pub fn main_order_script(&self) -> Option<&str> {
        self.preferences
            .get(MAIN_ORDER_PREFERENCE)
            .map(String::as_str)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Look a variable up by its source name
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variable_index.get(name).map(|&idx| &self.variables[idx])
    }

    pub fn scripted_variables(&self) -> &[(String, ScriptedKind)] {
        &self.scripted
    }

    pub fn computations(&self) -> &[ComputationBlock] {
        &self.computations
    }

    pub fn dialogs(&self) -> &[Dialog] {
        &self.dialogs
    }

    pub fn dialog_element(&self, name: &str) -> Option<&DialogElement> {
        self.dialog_elements.get(name)
    }

    pub fn choice_sets(&self) -> &[ChoiceSet] {
        &self.choice_sets
    }

    /// Assemble a dialog into a screen
    ///
    /// Captions before the first variable form the subquestion; later ones
    /// become notes between the fields.
    pub fn dialog_screen(&self, dialog: &Dialog) -> Screen {
        let mut screen = Screen::new(dialog.name.clone());
        screen.question = dialog.title.clone().unwrap_or_else(|| dialog.name.clone());

        let mut subquestion = String::new();
        let mut seen_variable = false;
        for item in &dialog.contents {
            if let Some(element) = self.dialog_elements.get(&item.name) {
                let caption = element.caption.trim();
                if caption.is_empty() {
                    continue;
                }
                if seen_variable {
                    screen.fields.push(ScreenField::Note(caption.to_string()));
                } else {
                    subquestion.push_str(caption);
                    subquestion.push_str("\n\n");
                }
            } else if let Some(variable) = self.variable(&item.name) {
                seen_variable = true;
                screen.fields.push(ScreenField::Input(variable.to_field()));
            } else {
                tracing::debug!(dialog = %dialog.name, item = %item.name, "dialog item not found");
            }
        }
        screen.subquestion = subquestion.trim_end().to_string();

        if screen.fields.is_empty() {
            screen.continue_button = Some(sanitize(&dialog.name));
        }
        screen
    }
}

/// Help text lives in the resource's first child when it has one
fn resource_text(resource: &Handle) -> String {
    match child_elements(resource).first() {
        Some(first) => text_content(first),
        None => text_content(resource),
    }
}

impl InterviewSource for LibraryInterview {
    fn to_documents(&self) -> Vec<Value> {
        let mut documents = vec![json!({ "metadata": Map::new() })];
        documents.extend(self.choice_sets.iter().map(ChoiceSet::to_value));
        documents.extend(
            self.dialogs
                .iter()
                .map(|dialog| self.dialog_screen(dialog).to_value()),
        );
        if self.include_computations {
            documents.extend(self.computations.iter().map(ComputationBlock::to_value));
        }
        if self.include_boolean_defaults {
            documents.extend(
                self.scripted
                    .iter()
                    .filter(|(_, kind)| *kind == ScriptedKind::TrueFalse)
                    .map(|(name, _)| json!({ "code": format!("{} = False", sanitize(name)) })),
            );
        }
        documents
    }

    fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.as_slice()
    }
}
