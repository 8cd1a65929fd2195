//! Page-graph wizard builder
//!
//! A guide file is one XML document with three top-level groups:
//!
//! ```xml
//! <TEMPLATE>
//!   <INFO><TITLE>...</TITLE><AUTHORS>...</AUTHORS>...</INFO>
//!   <STEPS><STEP NUMBER="0"><TEXT>Intro</TEXT></STEP>...</STEPS>
//!   <PAGES>
//!     <PAGE NAME="1-Intro" STEP="0">
//!       <TEXT><P>Welcome</P></TEXT>
//!       <FIELDS><FIELD TYPE="text"><NAME>Client name TE</NAME></FIELD></FIELDS>
//!       <BUTTONS><BUTTON NEXT="2-Income"><LABEL>Continue</LABEL></BUTTON></BUTTONS>
//!     </PAGE>
//!   </PAGES>
//! </TEMPLATE>
//! ```
//!
//! Tag case varies between tool versions, so tags and attribute names are
//! matched case-insensitively. Each page becomes one [`Screen`]; buttons give
//! the successor edges, except the `fail` sentinel, which records an exit URL.

use markup5ever_rcdom::{Handle, RcDom};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use super::InterviewSource;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Result;
use crate::markup::{convert_block, convert_inline};
use crate::model::{
    Choice, ChoiceSource, Datatype, Field, InputStyle, InterviewDocument, Screen, ScreenField,
    Section,
};
use crate::parser::{
    attr_ignore_case, child_elements, document_element, lowercase_name, parse_xml, text_content,
};
use crate::sanitize::sanitize;
use crate::script::rewrite_macros;

/// Button target that leaves the interview instead of naming a page
const EXIT_SENTINEL: &str = "fail";

/// Field type tag → (datatype, input style)
const FIELD_TYPES: &[(&str, Datatype, Option<InputStyle>)] = &[
    ("text", Datatype::Text, None),
    ("textlong", Datatype::Text, Some(InputStyle::Area)),
    ("textpick", Datatype::Dropdown, None),
    ("number", Datatype::Number, None),
    ("numberdollar", Datatype::Currency, None),
    ("numberssn", Datatype::Text, None),
    ("numberphone", Datatype::Text, None),
    ("numberzip", Datatype::Text, None),
    ("numberpick", Datatype::Dropdown, None),
    ("datemdy", Datatype::Date, None),
    ("gender", Datatype::Radio, None),
    ("radio", Datatype::Radio, None),
    ("checkbox", Datatype::YesNo, None),
    ("checkboxnota", Datatype::YesNo, None),
];

/// Page children that are understood but not carried into the output
const IGNORED_PAGE_CHILDREN: &[&str] = &["learn", "helpimage", "codebefore", "codeafter"];

fn lookup_field_type(type_tag: &str) -> Option<(Datatype, Option<InputStyle>)> {
    FIELD_TYPES
        .iter()
        .find(|(tag, _, _)| tag.eq_ignore_ascii_case(type_tag))
        .map(|&(_, datatype, style)| (datatype, style))
}

/// A wizard guide built into the intermediate model
#[derive(Debug, Default)]
pub struct WizardInterview {
    document: InterviewDocument,
    first_page: Option<String>,
    /// (screen id, step number) pairs resolved once all steps are known
    page_steps: Vec<(String, u32)>,
    diagnostics: Diagnostics,
}

impl WizardInterview {
    /// Read and build a guide file
    ///
    /// # Errors
    ///
    /// I/O failures and undecodable input; everything past parsing degrades
    /// into diagnostics instead.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let dom = parse_xml(bytes)?;
        Ok(Self::from_dom(&dom))
    }

    pub fn from_dom(dom: &RcDom) -> Self {
        let mut interview = Self::default();
        if let Some(root) = document_element(dom) {
            interview.build(&root);
        }
        interview
    }

    pub fn document(&self) -> &InterviewDocument {
        &self.document
    }

    pub fn screen(&self, id: &str) -> Option<&Screen> {
        self.document.screen(id)
    }

    /// Identifier of the page the interview starts on
    pub fn first_page(&self) -> Option<&str> {
        self.first_page.as_deref()
    }

    fn build(&mut self, root: &Handle) {
        for group in child_elements(root) {
            match lowercase_name(&group).as_deref() {
                Some("info") => self.parse_info(&group),
                Some("steps") => self.parse_steps(&group),
                Some("pages") => {
                    for page in child_elements(&group) {
                        self.parse_page(&page);
                    }
                }
                other => tracing::debug!(tag = ?other, "skipping top-level wizard element"),
            }
        }
        self.resolve_sections();
    }

    fn parse_info(&mut self, info: &Handle) {
        for child in child_elements(info) {
            let tag = lowercase_name(&child).unwrap_or_default();
            let key = match tag.as_str() {
                "authors" => {
                    let authors = child_elements(&child)
                        .iter()
                        .map(|author| Value::Object(parse_author(author)))
                        .collect();
                    self.document
                        .metadata
                        .insert("authors".to_string(), Value::Array(authors));
                    continue;
                }
                "firstpage" => {
                    let page = text_content(&child);
                    if !page.trim().is_empty() {
                        self.first_page = Some(sanitize(&page));
                    }
                    continue;
                }
                "description" => "description",
                "title" => "title",
                "notes" => "changelog",
                "emailcontact" => "contact email",
                _ => {
                    tracing::debug!(tag = %tag, "skipping info element");
                    continue;
                }
            };

            let text = text_content(&child);
            let text = text.trim();
            if !text.is_empty() {
                self.document
                    .metadata
                    .insert(key.to_string(), Value::String(text.to_string()));
            }
        }
    }

    fn parse_steps(&mut self, steps: &Handle) {
        let mut by_number: BTreeMap<u32, String> = BTreeMap::new();
        for step in child_elements(steps) {
            let Some(raw_number) = attr_ignore_case(&step, "number") else {
                self.diagnostics.push(Diagnostic::MissingAttribute {
                    context: "step".to_string(),
                    attribute: "NUMBER".to_string(),
                });
                continue;
            };
            let Ok(number) = raw_number.trim().parse::<u32>() else {
                self.diagnostics.push(Diagnostic::InvalidAttribute {
                    context: "step".to_string(),
                    attribute: "NUMBER".to_string(),
                    value: raw_number,
                });
                continue;
            };

            // the display name sits in the first child when there is one
            let name = match child_elements(&step).first() {
                Some(first) => text_content(first),
                None => text_content(&step),
            };
            by_number.insert(number, name.trim().to_string());
        }

        self.document.sections = by_number
            .into_iter()
            .map(|(number, name)| Section {
                number,
                id: sanitize(&name),
                name,
            })
            .collect();
    }

    fn parse_page(&mut self, page: &Handle) {
        let Some(name) = attr_ignore_case(page, "name") else {
            self.diagnostics.push(Diagnostic::MissingAttribute {
                context: "page".to_string(),
                attribute: "NAME".to_string(),
            });
            return;
        };

        let mut screen = Screen::new(sanitize(&name));
        let mut first_button_label: Option<String> = None;

        if let Some(step) = attr_ignore_case(page, "step") {
            match step.trim().parse::<u32>() {
                Ok(number) => self.page_steps.push((screen.id.clone(), number)),
                Err(_) => self.diagnostics.push(Diagnostic::InvalidAttribute {
                    context: "page".to_string(),
                    attribute: "STEP".to_string(),
                    value: step,
                }),
            }
        }

        for child in child_elements(page) {
            let tag = lowercase_name(&child).unwrap_or_default();
            match tag.as_str() {
                "text" => {
                    let text = rewrite_macros(&convert_block(&child));
                    let text = text.trim();
                    match text.split_once('\n') {
                        Some((question, rest)) => {
                            screen.question = question.trim().to_string();
                            screen.subquestion = rest.trim().to_string();
                        }
                        None => screen.question = text.to_string(),
                    }
                }
                "help" => {
                    let help = rewrite_macros(&convert_block(&child));
                    screen.help = Some(help.trim().to_string());
                }
                "buttons" => {
                    first_button_label = self.parse_buttons(&child, &mut screen);
                }
                "fields" => {
                    for field in child_elements(&child) {
                        let field = self.parse_field(&field);
                        screen.fields.push(ScreenField::Input(field));
                    }
                }
                _ if IGNORED_PAGE_CHILDREN.contains(&tag.as_str()) => {}
                _ => tracing::debug!(page = %name, tag = %tag, "skipping page element"),
            }
        }

        if screen.fields.is_empty() {
            screen.continue_button = Some(screen.id.clone());
            screen.continue_label = first_button_label;
        }

        if self.first_page.is_none() {
            self.first_page = Some(screen.id.clone());
        }
        self.document.insert_screen(screen);
    }

    /// Record successor edges and the exit URL; returns the first button's label
    fn parse_buttons(&mut self, buttons: &Handle, screen: &mut Screen) -> Option<String> {
        let mut first_label = None;

        for (idx, button) in child_elements(buttons).iter().enumerate() {
            match attr_ignore_case(button, "next") {
                Some(next) if next.eq_ignore_ascii_case(EXIT_SENTINEL) => {
                    screen.exit_url = attr_ignore_case(button, "url");
                }
                Some(next) if !next.trim().is_empty() => {
                    screen.successors.insert(sanitize(&next));
                }
                _ => {}
            }

            for child in child_elements(button) {
                let tag = lowercase_name(&child).unwrap_or_default();
                match tag.as_str() {
                    "label" => {
                        let label = convert_inline(&child);
                        let label = label.trim();
                        if idx == 0 && !label.is_empty() {
                            first_label = Some(rewrite_macros(label));
                        }
                    }
                    "name" | "value" => {}
                    _ => self.diagnostics.push(Diagnostic::UnknownElement {
                        context: "button".to_string(),
                        tag,
                    }),
                }
            }
        }

        first_label
    }

    fn parse_field(&mut self, element: &Handle) -> Field {
        let mut field = Field {
            type_tag: attr_ignore_case(element, "type"),
            min: attr_ignore_case(element, "min"),
            max: attr_ignore_case(element, "max"),
            ..Default::default()
        };

        for child in child_elements(element) {
            let tag = lowercase_name(&child).unwrap_or_default();
            match tag.as_str() {
                "name" => {
                    let name = text_content(&child);
                    if !name.trim().is_empty() {
                        field.name = Some(sanitize(&name));
                    }
                }
                "label" => {
                    let label = rewrite_macros(&convert_inline(&child));
                    let label = label.trim();
                    if !label.is_empty() {
                        field.label = Some(label.to_string());
                    }
                }
                "value" => field.default = Some(text_content(&child).trim().to_string()),
                "invalidprompt" => {
                    field.invalid_prompt = Some(convert_inline(&child).trim().to_string());
                }
                "listdata" => field.choices = parse_list_data(&child),
                "listsrc" => {}
                _ => self.diagnostics.push(Diagnostic::UnknownElement {
                    context: "field".to_string(),
                    tag,
                }),
            }
        }

        let field_name = field.name.clone().unwrap_or_default();
        match field.type_tag.as_deref() {
            Some(type_tag) => match lookup_field_type(type_tag) {
                Some((datatype, style)) => {
                    field.datatype = Some(datatype);
                    field.input_style = style;
                }
                None => self.diagnostics.push(Diagnostic::UnknownFieldType {
                    field: field_name,
                    type_tag: type_tag.to_string(),
                }),
            },
            None => self.diagnostics.push(Diagnostic::MissingAttribute {
                context: "field".to_string(),
                attribute: "TYPE".to_string(),
            }),
        }

        field
    }

    fn resolve_sections(&mut self) {
        let steps = std::mem::take(&mut self.page_steps);
        for (screen_id, number) in steps {
            let section = self
                .document
                .sections
                .iter()
                .find(|section| section.number == number)
                .map(|section| section.id.clone());
            if section.is_none() {
                tracing::debug!(screen = %screen_id, step = number, "page names an unknown step");
            }
            if let Some(screen) = self.document.screen_mut(&screen_id) {
                screen.section = section;
            }
        }
    }
}

fn parse_author(author: &Handle) -> Map<String, Value> {
    let mut map = Map::new();
    for attribute in child_elements(author) {
        let key = lowercase_name(&attribute).unwrap_or_default();
        let text = text_content(&attribute);
        map.insert(key, Value::String(text.trim().to_string()));
    }
    map
}

/// Options from every `option` descendant of a list-data element
fn parse_list_data(list_data: &Handle) -> ChoiceSource {
    let mut choices = Vec::new();
    collect_options(list_data, &mut choices);
    if choices.is_empty() {
        ChoiceSource::None
    } else {
        ChoiceSource::List(choices)
    }
}

fn collect_options(node: &Handle, choices: &mut Vec<Choice>) {
    for child in child_elements(node) {
        if lowercase_name(&child).as_deref() == Some("option") {
            let display = text_content(&child).trim().to_string();
            let value = attr_ignore_case(&child, "value").unwrap_or_else(|| display.clone());
            let display = if display.is_empty() {
                value.clone()
            } else {
                display
            };
            choices.push(Choice::new(display, value));
        } else {
            collect_options(&child, choices);
        }
    }
}

impl InterviewSource for WizardInterview {
    fn to_documents(&self) -> Vec<Value> {
        let mut documents = vec![
            self.document.metadata_value(),
            self.document.sections_value(),
        ];
        documents.extend(self.document.screens().iter().map(Screen::to_value));
        documents
    }

    fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.as_slice()
    }
}
