//! Intermediate interview model
//!
//! Both builders produce these types; everything downstream (deduplication,
//! document rendering, emission) works on them without knowing which source
//! format they came from.
//!
//! Rendering methods (`to_value`) produce `serde_json::Value` maps whose key
//! insertion order is the emitted key order.

use serde_json::{Map, Value, json};
use std::collections::{BTreeSet, HashMap};

/// Target datatype classification of an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    Text,
    Number,
    Currency,
    Integer,
    Date,
    YesNo,
    YesNoRadio,
    Radio,
    Dropdown,
    Checkboxes,
}

impl Datatype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::Text => "text",
            Datatype::Number => "number",
            Datatype::Currency => "currency",
            Datatype::Integer => "integer",
            Datatype::Date => "date",
            Datatype::YesNo => "yesno",
            Datatype::YesNoRadio => "yesnoradio",
            Datatype::Radio => "radio",
            Datatype::Dropdown => "dropdown",
            Datatype::Checkboxes => "checkboxes",
        }
    }
}

/// Input widget hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStyle {
    /// Multi-line text area
    Area,
}

impl InputStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputStyle::Area => "area",
        }
    }
}

/// One selectable option; ordering is (display, value)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Choice {
    pub display: String,
    pub value: String,
}

impl Choice {
    pub fn new(display: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            value: value.into(),
        }
    }

    /// Bare value when the label adds nothing, else a `display: value` map
    pub fn to_value(&self) -> Value {
        if self.display == self.value {
            Value::String(self.value.clone())
        } else {
            let mut map = Map::new();
            map.insert(self.display.clone(), Value::String(self.value.clone()));
            Value::Object(map)
        }
    }
}

/// Where an input's options come from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChoiceSource {
    #[default]
    None,
    /// Options listed on the input itself
    List(Vec<Choice>),
    /// Reference to a shared choice set by name
    Shared(String),
}

impl ChoiceSource {
    pub fn list(&self) -> Option<&[Choice]> {
        match self {
            ChoiceSource::List(choices) => Some(choices),
            _ => None,
        }
    }
}

/// One answerable input on a screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Field {
    /// Sanitized variable name
    pub name: Option<String>,
    /// Type tag as written in the source
    pub type_tag: Option<String>,
    pub label: Option<String>,
    pub datatype: Option<Datatype>,
    pub input_style: Option<InputStyle>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub choices: ChoiceSource,
    pub help: Option<String>,
    pub default: Option<String>,
    pub invalid_prompt: Option<String>,
}

impl Field {
    /// Displayed label: the explicit one, else derived from the name
    pub fn resolved_label(&self) -> String {
        match self.label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => label_from_name(self.name.as_deref().unwrap_or_default()),
        }
    }

    /// Render the target field descriptor
    ///
    /// ```rust
    /// use interview_converter::model::{Datatype, Field};
    ///
    /// let field = Field {
    ///     name: Some("client_name".to_string()),
    ///     datatype: Some(Datatype::Text),
    ///     ..Default::default()
    /// };
    /// let value = field.to_value();
    /// assert_eq!(value["label"], "Client name");
    /// assert_eq!(value["field"], "client_name");
    /// assert_eq!(value["datatype"], "text");
    /// ```
    pub fn to_value(&self) -> Value {
        let label = self.resolved_label();
        let mut map = Map::new();
        let label_above = label.contains('\n');
        map.insert("label".to_string(), Value::String(label));
        if let Some(ref name) = self.name {
            map.insert("field".to_string(), Value::String(name.clone()));
        }
        if let Some(datatype) = self.datatype {
            map.insert("datatype".to_string(), json!(datatype.as_str()));
        }
        if let Some(style) = self.input_style {
            map.insert("input type".to_string(), json!(style.as_str()));
        }
        if label_above {
            map.insert("label above field".to_string(), Value::Bool(true));
        }
        if let Some(ref min) = self.min {
            map.insert("min".to_string(), bound_value(min));
        }
        if let Some(ref max) = self.max {
            map.insert("max".to_string(), bound_value(max));
        }
        match self.choices {
            ChoiceSource::List(ref choices) => {
                let list = choices.iter().map(Choice::to_value).collect();
                map.insert("choices".to_string(), Value::Array(list));
            }
            ChoiceSource::Shared(ref name) => {
                map.insert("code".to_string(), Value::String(name.clone()));
            }
            ChoiceSource::None => {}
        }
        if let Some(ref help) = self.help
            && !help.trim().is_empty()
        {
            map.insert("help".to_string(), Value::String(help.clone()));
        }
        if let Some(ref default) = self.default {
            map.insert("default".to_string(), Value::String(default.clone()));
        }
        Value::Object(map)
    }
}

/// Numeric bounds stay numeric when they parse as numbers
fn bound_value(raw: &str) -> Value {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return json!(n);
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => json!(n),
        _ => Value::String(raw.to_string()),
    }
}

/// `client_full_name` → `Client full name`
pub fn label_from_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let spaced = spaced.trim();
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Entry in a screen's field list
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenField {
    Input(Field),
    /// Inline explanatory text between inputs
    Note(String),
}

impl ScreenField {
    pub fn to_value(&self) -> Value {
        match self {
            ScreenField::Input(field) => field.to_value(),
            ScreenField::Note(text) => json!({ "note": text }),
        }
    }

    pub fn as_input(&self) -> Option<&Field> {
        match self {
            ScreenField::Input(field) => Some(field),
            ScreenField::Note(_) => None,
        }
    }
}

/// One page or dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Screen {
    pub id: String,
    pub question: String,
    pub subquestion: String,
    pub fields: Vec<ScreenField>,
    /// Identifier of the synthesized continue button, set when there are no inputs
    pub continue_button: Option<String>,
    pub continue_label: Option<String>,
    /// Identifiers of the screens this one can lead to
    pub successors: BTreeSet<String>,
    pub exit_url: Option<String>,
    /// Identifier of the section the screen belongs to
    pub section: Option<String>,
    pub help: Option<String>,
}

impl Screen {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter_map(ScreenField::as_input)
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        map.insert(
            "question".to_string(),
            Value::String(self.question.clone()),
        );
        if !self.subquestion.is_empty() {
            map.insert(
                "subquestion".to_string(),
                Value::String(self.subquestion.clone()),
            );
        }
        if let Some(ref section) = self.section {
            map.insert("section".to_string(), Value::String(section.clone()));
        }
        if !self.fields.is_empty() {
            let fields = self.fields.iter().map(ScreenField::to_value).collect();
            map.insert("fields".to_string(), Value::Array(fields));
        } else if let Some(ref button) = self.continue_button {
            map.insert(
                "continue button field".to_string(),
                Value::String(button.clone()),
            );
        }
        if let Some(ref label) = self.continue_label {
            map.insert(
                "continue button label".to_string(),
                Value::String(label.clone()),
            );
        }
        if let Some(ref help) = self.help
            && !help.trim().is_empty()
        {
            map.insert("help".to_string(), Value::String(help.clone()));
        }
        Value::Object(map)
    }
}

/// Ordered step of the interview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub number: u32,
    pub name: String,
    pub id: String,
}

/// Root aggregate of one conversion run
#[derive(Debug, Clone, Default)]
pub struct InterviewDocument {
    pub metadata: Map<String, Value>,
    pub sections: Vec<Section>,
    screens: Vec<Screen>,
    index: HashMap<String, usize>,
}

impl InterviewDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a screen; a repeated identifier replaces the earlier screen in place
    pub fn insert_screen(&mut self, screen: Screen) {
        match self.index.get(&screen.id) {
            Some(&idx) => self.screens[idx] = screen,
            None => {
                self.index.insert(screen.id.clone(), self.screens.len());
                self.screens.push(screen);
            }
        }
    }

    pub fn screen(&self, id: &str) -> Option<&Screen> {
        self.index.get(id).map(|&idx| &self.screens[idx])
    }

    pub fn screen_mut(&mut self, id: &str) -> Option<&mut Screen> {
        match self.index.get(id) {
            Some(&idx) => self.screens.get_mut(idx),
            None => None,
        }
    }

    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    /// Successor identifiers that name no screen in this document
    pub fn dangling_successors(&self) -> Vec<(&str, &str)> {
        self.screens
            .iter()
            .flat_map(|screen| {
                screen
                    .successors
                    .iter()
                    .filter(|next| !self.index.contains_key(next.as_str()))
                    .map(move |next| (screen.id.as_str(), next.as_str()))
            })
            .collect()
    }

    pub fn metadata_value(&self) -> Value {
        json!({ "metadata": Value::Object(self.metadata.clone()) })
    }

    /// `sections:` document, one `display name: identifier` entry per step
    pub fn sections_value(&self) -> Value {
        let list = self
            .sections
            .iter()
            .map(|section| {
                let mut entry = Map::new();
                entry.insert(section.name.clone(), Value::String(section.id.clone()));
                Value::Object(entry)
            })
            .collect();
        json!({ "sections": Value::Array(list) })
    }
}

/// Datatype-specific attributes of a component-library variable
#[derive(Debug, Clone, PartialEq)]
pub enum VariableKind {
    Text {
        multi_line: bool,
    },
    Number {
        decimal_places: u32,
        currency_symbol: Option<String>,
        default_format: Option<String>,
    },
    TrueFalse {
        yes_no_on_same_line: bool,
    },
    MultipleChoice {
        datatype: Datatype,
        options: ChoiceSource,
    },
}

/// A named data item of the component-library format
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Name as written in the source
    pub name: String,
    pub da_name: String,
    pub prompt: Option<String>,
    pub help: Option<String>,
    pub kind: VariableKind,
}

impl Variable {
    pub fn datatype(&self) -> Datatype {
        match self.kind {
            VariableKind::Text { .. } => Datatype::Text,
            VariableKind::Number {
                decimal_places,
                ref currency_symbol,
                ..
            } => {
                if currency_symbol.is_some() {
                    Datatype::Currency
                } else if decimal_places > 0 {
                    Datatype::Number
                } else {
                    Datatype::Integer
                }
            }
            VariableKind::TrueFalse { .. } => Datatype::YesNoRadio,
            VariableKind::MultipleChoice { datatype, .. } => datatype,
        }
    }

    pub fn options(&self) -> Option<&ChoiceSource> {
        match self.kind {
            VariableKind::MultipleChoice { ref options, .. } => Some(options),
            _ => None,
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut ChoiceSource> {
        match self.kind {
            VariableKind::MultipleChoice {
                ref mut options, ..
            } => Some(options),
            _ => None,
        }
    }

    /// The on-screen field this variable renders as
    pub fn to_field(&self) -> Field {
        let input_style = match self.kind {
            VariableKind::Text { multi_line: true } => Some(InputStyle::Area),
            _ => None,
        };
        Field {
            name: Some(self.da_name.clone()),
            label: self.prompt.clone(),
            datatype: Some(self.datatype()),
            input_style,
            choices: self.options().cloned().unwrap_or_default(),
            help: self.help.clone(),
            ..Default::default()
        }
    }
}

/// Script retained for manual porting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputationBlock {
    pub name: String,
    pub da_name: String,
    pub result_type: Option<String>,
    pub script: String,
}

impl ComputationBlock {
    /// Function stub with the original script commented out in its body
    pub fn code_stub(&self) -> String {
        let mut code = format!("def {}():\n", self.da_name);
        if let Some(ref result_type) = self.result_type {
            code.push_str(&format!("  # result type: {}\n", result_type));
        }
        for line in self.script.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                code.push_str("  #\n");
            } else {
                code.push_str("  # ");
                code.push_str(line);
                code.push('\n');
            }
        }
        code.push_str("  return None");
        code
    }

    pub fn to_value(&self) -> Value {
        json!({
            "id": self.da_name,
            "code": self.code_stub(),
        })
    }
}

/// Options shared by several choice variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSet {
    pub name: String,
    pub choices: Vec<Choice>,
}

impl ChoiceSet {
    pub fn to_value(&self) -> Value {
        let data = self.choices.iter().map(Choice::to_value).collect();
        json!({
            "variable name": self.name,
            "data": Value::Array(data),
        })
    }
}
