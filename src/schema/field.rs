//! Field descriptors - the building blocks of every survey step

use serde::Serialize;

use crate::schema::remote::RemoteSearchConfig;

/// One `{label, value}` entry of a choice vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Build an option list from `(label, value)` pairs
pub fn options(pairs: &[(&str, &str)]) -> Vec<ChoiceOption> {
    pairs
        .iter()
        .map(|(label, value)| ChoiceOption::new(*label, *value))
        .collect()
}

/// A validation constraint attached to a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub required: bool,
    pub message: String,
}

impl Rule {
    /// A presence rule failing with `message`
    pub fn required(message: impl Into<String>) -> Self {
        Self {
            required: true,
            message: message.into(),
        }
    }
}

/// How a single-choice field is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    Radio,
    Dropdown,
}

/// Extra settings of a text input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextInputProps {
    /// Only numbers are accepted
    pub numeric: bool,
    /// Unit shown after the input (e.g. 个, 人)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl TextInputProps {
    pub fn numeric(suffix: impl Into<String>) -> Self {
        Self {
            numeric: true,
            suffix: Some(suffix.into()),
        }
    }
}

/// One ordinal column of a rating matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixColumn {
    pub label: String,
    pub value: u8,
}

/// Rows and columns of a rating matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixLayout {
    pub row_title: String,
    pub columns: Vec<MatrixColumn>,
    pub rows: Vec<ChoiceOption>,
}

impl MatrixLayout {
    /// Look up the label of a column value
    pub fn column_label(&self, value: u8) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.label.as_str())
    }

    /// Look up the label of a row value
    pub fn row_label(&self, value: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.value == value)
            .map(|r| r.label.as_str())
    }
}

/// Field kind together with the properties only that kind uses
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldKind {
    TextInput(TextInputProps),
    SingleChoice {
        presentation: Presentation,
        options: Vec<ChoiceOption>,
    },
    MultiChoice {
        options: Vec<ChoiceOption>,
    },
    FreeText,
    CheckboxGroup {
        options: Vec<ChoiceOption>,
    },
    RatingMatrix(MatrixLayout),
    RemoteSearchableChoice(RemoteSearchConfig),
}

impl FieldKind {
    /// Short kind name, as used in listings
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::TextInput(_) => "text-input",
            FieldKind::SingleChoice { .. } => "single-choice",
            FieldKind::MultiChoice { .. } => "multi-choice",
            FieldKind::FreeText => "free-text",
            FieldKind::CheckboxGroup { .. } => "checkbox-group",
            FieldKind::RatingMatrix(_) => "rating-matrix",
            FieldKind::RemoteSearchableChoice(_) => "remote-searchable-choice",
        }
    }

    pub fn text() -> Self {
        FieldKind::TextInput(TextInputProps::default())
    }

    pub fn radio(options: Vec<ChoiceOption>) -> Self {
        FieldKind::SingleChoice {
            presentation: Presentation::Radio,
            options,
        }
    }

    pub fn dropdown(options: Vec<ChoiceOption>) -> Self {
        FieldKind::SingleChoice {
            presentation: Presentation::Dropdown,
            options,
        }
    }
}

/// One form input: key, label, kind and rules
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            placeholder: None,
            span: None,
            rules: Vec::new(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_span(mut self, span: u8) -> Self {
        self.span = Some(span);
        self
    }

    /// Append a presence rule
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.rules.push(Rule::required(message));
        self
    }

    /// Whether any rule demands a value
    pub fn is_required(&self) -> bool {
        self.rules.iter().any(|r| r.required)
    }

    /// Options of choice-like kinds
    pub fn options(&self) -> Option<&[ChoiceOption]> {
        match &self.kind {
            FieldKind::SingleChoice { options, .. }
            | FieldKind::MultiChoice { options }
            | FieldKind::CheckboxGroup { options } => Some(options),
            _ => None,
        }
    }

    /// Whether answers to this field are lists of option values
    pub fn is_multi_valued(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::MultiChoice { .. } | FieldKind::CheckboxGroup { .. }
        )
    }

    /// Label of an option value, for choice-like kinds
    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.options()?
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}
