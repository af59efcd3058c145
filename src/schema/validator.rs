//! Answer validation with detailed error reporting
//!
//! [`validate`] decides whether one value satisfies a field's rules.
//! [`DocumentValidator`] checks a whole answer document (YAML or JSON) and
//! reports every problem as a diagnostic pointing into the source.

use jsonschema::{validator_for, ValidationError as JsonSchemaError};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::core::role::Role;
use crate::core::submission::Submission;
use crate::schema::field::FieldDescriptor;
use crate::schema::json_schema::submission_schema;
use crate::schema::registry::FormRegistry;

/// Outcome of checking one value against one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}

/// Whether a value counts as "no answer"
///
/// Absent, null, blank strings, empty lists and empty objects (an untouched
/// rating matrix) are all unanswered.
pub fn is_unanswered(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::String(s)) => s.trim().is_empty(),
        Some(JsonValue::Array(items)) => items.is_empty(),
        Some(JsonValue::Object(map)) => map.is_empty(),
        Some(JsonValue::Bool(_)) | Some(JsonValue::Number(_)) => false,
    }
}

/// Check a candidate value against a field's rules
///
/// Rules run in declared order and the first failure wins.
pub fn validate(field: &FieldDescriptor, value: Option<&JsonValue>) -> ValidationResult {
    for rule in &field.rules {
        if rule.required && is_unanswered(value) {
            return ValidationResult::failure(rule.message.clone());
        }
    }
    ValidationResult::success()
}

/// Answer document validation error with source location information
#[derive(Debug, Error, Diagnostic)]
#[error("Answer validation failed: {summary}")]
#[diagnostic(code(tuoyu::answers::validation_error))]
pub struct DocumentError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<AnswerViolation>,
}

/// A single problem in an answer document
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct AnswerViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl AnswerViolation {
    pub fn new(message: String, hint: String, span: SourceSpan, help: Option<String>) -> Self {
        Self {
            span,
            message,
            hint,
            help,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl DocumentError {
    pub fn new(filename: &str, source: &str, violations: Vec<AnswerViolation>) -> Self {
        let count = violations.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    /// Get the number of violations
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[AnswerViolation] {
        &self.violations
    }
}

/// A non-fatal finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerWarning {
    pub key: String,
    pub message: String,
}

/// Summary of a document that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub role: Role,
    pub fields_checked: usize,
    pub warnings: Vec<AnswerWarning>,
}

/// Failure to validate a file at all
#[derive(Debug, Error, Diagnostic)]
pub enum ValidateFileError {
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(tuoyu::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] DocumentError),
}

/// Validates whole answer documents against the registry
pub struct DocumentValidator<'a> {
    registry: &'a FormRegistry,
}

impl<'a> DocumentValidator<'a> {
    pub fn new(registry: &'a FormRegistry) -> Self {
        Self { registry }
    }

    /// Parse YAML or JSON content into an answer map
    pub fn parse(content: &str, filename: &str) -> Result<Map<String, JsonValue>, DocumentError> {
        let yaml_value: serde_yml::Value = match serde_yml::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                let span = find_error_span(content, e.location());
                let violation = AnswerViolation::new(
                    format!("YAML parse error: {}", e),
                    "invalid YAML".to_string(),
                    span,
                    Some("Check YAML syntax - proper indentation, colons, quotes".to_string()),
                );
                return Err(DocumentError::new(filename, content, vec![violation]));
            }
        };

        let json_value: JsonValue = match serde_json::to_value(&yaml_value) {
            Ok(v) => v,
            Err(e) => {
                let violation = AnswerViolation::new(
                    format!("Failed to convert YAML to JSON: {}", e),
                    "conversion error".to_string(),
                    (0, content.len()).into(),
                    None,
                );
                return Err(DocumentError::new(filename, content, vec![violation]));
            }
        };

        match Submission::from_document(json_value) {
            Some(submission) => Ok(submission.answers),
            None => {
                let violation = AnswerViolation::new(
                    "Answer document must be a mapping of field keys to answers".to_string(),
                    "not a mapping".to_string(),
                    first_line_span(content),
                    Some("Write one `key: answer` entry per question".to_string()),
                );
                Err(DocumentError::new(filename, content, vec![violation]))
            }
        }
    }

    /// Validate answer content, collecting every violation
    pub fn validate(&self, content: &str, filename: &str) -> Result<DocumentReport, DocumentError> {
        let answers = Self::parse(content, filename)?;
        let (report, violations) = self.check(&answers, content);

        if violations.is_empty() {
            Ok(report)
        } else {
            Err(DocumentError::new(filename, content, violations))
        }
    }

    /// Validate a file directly
    pub fn validate_file(&self, path: &Path) -> Result<DocumentReport, ValidateFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ValidateFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let filename = path.file_name().unwrap_or_default().to_string_lossy();
        Ok(self.validate(&content, &filename)?)
    }

    fn check(
        &self,
        answers: &Map<String, JsonValue>,
        content: &str,
    ) -> (DocumentReport, Vec<AnswerViolation>) {
        let role = crate::core::submission::role_of(answers);
        let form = self.registry.form_for(role);
        tracing::debug!(role = %role, steps = form.len(), "validating answers");

        let mut seen = HashSet::new();
        let fields: Vec<&FieldDescriptor> = form
            .iter()
            .flat_map(|(_, fields)| fields)
            .filter(|f| seen.insert(f.key.as_str()))
            .collect();

        let mut violations = Vec::new();
        let mut failed_keys = HashSet::new();

        // Rules first, so each key reports its configured message
        for field in &fields {
            let result = validate(field, answers.get(&field.key));
            if let Some(message) = result.message {
                failed_keys.insert(field.key.clone());
                violations.push(AnswerViolation::new(
                    format!("{} ({})", message, field.key),
                    "missing answer".to_string(),
                    find_key_span(content, &field.key).unwrap_or_else(|| first_line_span(content)),
                    Some(format!("Add an answer for '{}' ({})", field.key, field.label)),
                ));
            }
        }

        // Structural check of whatever was answered
        let present: Map<String, JsonValue> = answers
            .iter()
            .filter(|(_, v)| !is_unanswered(Some(v)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let instance = JsonValue::Object(present);
        let schema = submission_schema(&form, false);
        match validator_for(&schema) {
            Ok(compiled) => {
                for error in compiled.iter_errors(&instance) {
                    let path = error.instance_path.to_string();
                    let top_key = path.split('/').find(|s| !s.is_empty()).unwrap_or("");
                    if failed_keys.contains(top_key) {
                        continue;
                    }
                    violations.push(error_to_violation(content, &error));
                }
            }
            Err(e) => {
                tracing::error!("answer schema failed to compile: {}", e);
                violations.push(AnswerViolation::new(
                    format!("Internal schema error: {}", e),
                    "schema error".to_string(),
                    first_line_span(content),
                    None,
                ));
            }
        }

        let warnings = answers
            .keys()
            .filter(|key| !seen.contains(key.as_str()))
            .map(|key| AnswerWarning {
                key: key.clone(),
                message: format!(
                    "'{}' is not a question for role '{}'",
                    key,
                    role.label()
                ),
            })
            .collect();

        let report = DocumentReport {
            role,
            fields_checked: fields.len(),
            warnings,
        };
        (report, violations)
    }
}

/// Convert a JSON Schema validation error to our violation format
fn error_to_violation(content: &str, error: &JsonSchemaError) -> AnswerViolation {
    let path = error.instance_path.to_string();
    let message = format_schema_error(error);
    let hint = format_error_hint(error);
    let help = generate_help_message(error);

    let span = find_path_span(content, &path);

    AnswerViolation::new(message, hint, span, help)
}

/// Format a JSON Schema error into a user-friendly message
fn format_schema_error(error: &JsonSchemaError) -> String {
    let path = if error.instance_path.as_str().is_empty() {
        "document root".to_string()
    } else {
        format!("'{}'", error.instance_path)
    };

    match &error.kind {
        jsonschema::error::ValidationErrorKind::Type { kind } => {
            format!("Wrong type at {}: expected {:?}", path, kind)
        }
        jsonschema::error::ValidationErrorKind::Enum { options } => {
            let opts = format_enum_options(options);
            format!("Invalid answer at {}: must be one of: {}", path, opts)
        }
        jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("Unknown row(s) at {}: {}", path, unexpected.join(", "))
        }
        _ => {
            format!("Invalid answer at {}: {}", path, error)
        }
    }
}

/// Format enum options as a string
fn format_enum_options(options: &JsonValue) -> String {
    if let Some(arr) = options.as_array() {
        arr.iter()
            .map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        options.to_string()
    }
}

/// Generate a short hint for the error label
fn format_error_hint(error: &JsonSchemaError) -> String {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Type { .. } => "wrong type".to_string(),
        jsonschema::error::ValidationErrorKind::Enum { .. } => "not an option".to_string(),
        jsonschema::error::ValidationErrorKind::AdditionalProperties { .. } => {
            "unknown row".to_string()
        }
        _ => "invalid answer".to_string(),
    }
}

/// Generate a help message with suggestions for fixing the error
fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Enum { options } => {
            Some(format!("Valid values: {}", format_enum_options(options)))
        }
        jsonschema::error::ValidationErrorKind::Type { kind } => {
            Some(format!("Expected value of type: {:?}", kind))
        }
        jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
            if unexpected.len() == 1 {
                Some(format!("Remove the '{}' row or check spelling", unexpected[0]))
            } else {
                Some("Remove unknown rows or check spelling".to_string())
            }
        }
        _ => None,
    }
}

fn first_line_span(content: &str) -> SourceSpan {
    let len = content.find('\n').unwrap_or(content.len()).max(1);
    (0, len).into()
}

/// Find the span (byte offset, length) for an error location
fn find_error_span(content: &str, location: Option<serde_yml::Location>) -> SourceSpan {
    if let Some(loc) = location {
        let line = loc.line().saturating_sub(1);
        let column = loc.column().saturating_sub(1);

        let mut offset = 0;
        for (i, line_content) in content.lines().enumerate() {
            if i == line {
                offset += column;
                break;
            }
            offset += line_content.len() + 1;
        }

        let offset = offset.min(content.len());
        let rest_of_content = content.get(offset..).unwrap_or("");
        let len = rest_of_content
            .find('\n')
            .unwrap_or(rest_of_content.len())
            .max(1);

        (offset, len).into()
    } else {
        first_line_span(content)
    }
}

/// Find the span for a JSON pointer path in the document
fn find_path_span(content: &str, json_path: &str) -> SourceSpan {
    let parts: Vec<&str> = json_path.split('/').filter(|s| !s.is_empty()).collect();

    let Some(search_key) = parts.last() else {
        return first_line_span(content);
    };

    // Array indices point at the list; highlight its key instead
    if search_key.parse::<usize>().is_ok() && parts.len() >= 2 {
        let parent_key = parts[parts.len() - 2];
        if let Some(span) = find_key_span(content, parent_key) {
            return span;
        }
    }

    find_key_span(content, search_key).unwrap_or_else(|| first_line_span(content))
}

/// Find the span of a key in YAML or JSON content
fn find_key_span(content: &str, key: &str) -> Option<SourceSpan> {
    let patterns = [
        format!("{}:", key),
        format!("\"{}\":", key),
        format!("'{}':", key),
        format!("\"{}\" :", key),
    ];

    let mut offset = 0;
    for line in content.lines() {
        let trimmed = line.trim_start().trim_start_matches(['{', ',', ' ']);
        if patterns.iter().any(|p| trimmed.starts_with(p.as_str())) {
            let key_start = offset + (line.len() - trimmed.len());
            return Some((key_start, trimmed.len().max(1)).into());
        }
        offset += line.len() + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::{options, FieldKind};
    use serde_json::json;

    fn required_text() -> FieldDescriptor {
        FieldDescriptor::new("major", "专业", FieldKind::text()).required("请输入专业")
    }

    fn required_multi() -> FieldDescriptor {
        FieldDescriptor::new(
            "modes",
            "模式",
            FieldKind::MultiChoice {
                options: options(&[("全日托", "full"), ("半日托", "half")]),
            },
        )
        .required("请选择模式")
    }

    #[test]
    fn test_required_text_rejects_blank() {
        let field = required_text();
        for blank in ["", "   ", "\t\n"] {
            let result = validate(&field, Some(&json!(blank)));
            assert!(!result.ok);
            assert_eq!(result.message.as_deref(), Some("请输入专业"));
        }
        assert_eq!(validate(&field, None), ValidationResult::failure("请输入专业"));
        assert!(!validate(&field, Some(&JsonValue::Null)).ok);
        assert_eq!(validate(&field, Some(&json!("ok"))), ValidationResult::success());
    }

    #[test]
    fn test_required_multi_choice() {
        let field = required_multi();
        assert!(!validate(&field, Some(&json!([]))).ok);
        assert!(validate(&field, Some(&json!(["full"]))).ok);
    }

    #[test]
    fn test_no_rules_always_pass() {
        let field = FieldDescriptor::new("note", "备注", FieldKind::FreeText);
        assert!(validate(&field, None).ok);
        assert!(validate(&field, Some(&json!(""))).ok);
    }

    #[test]
    fn test_first_failure_wins() {
        let field = required_text().required("second message");
        assert_eq!(
            validate(&field, Some(&json!(""))).message.as_deref(),
            Some("请输入专业")
        );
    }

    #[test]
    fn test_numbers_count_as_answers() {
        assert!(!is_unanswered(Some(&json!(0))));
        assert!(!is_unanswered(Some(&json!(false))));
        assert!(is_unanswered(Some(&json!({}))));
        assert!(!is_unanswered(Some(&json!({"item1": 3}))));
    }

    const COMPLETE_CAREGIVER: &str = r#"
orgName: 阳光托育中心
location: 北京市-北京市-东城区
orgNature: public
orgType: 独立托育机构
isPovertyFree: "yes"
serviceMode:
  - 全日托
totalSlots: 80
totalChildren: "65"
totalStaff: 20
gender: female
education: undergraduate
educationMajor: 学前教育
currentPosition: caregiver
interval: never
reason:
  - personal
isFromTeacherToTeacher: "no"
reasonFromTeacherToTeacher: 无
responsibilities: 日常保育
careSkills: hygiene
"#;

    #[test]
    fn test_complete_document_passes() {
        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);
        let report = validator
            .validate(COMPLETE_CAREGIVER, "answers.yaml")
            .expect("complete document should pass");
        assert_eq!(report.role, Role::Caregiver);
        assert_eq!(report.fields_checked, 20);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_answers_use_rule_messages() {
        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);
        let yaml = COMPLETE_CAREGIVER.replace("educationMajor: 学前教育\n", "educationMajor: \"  \"\n");
        let err = validator.validate(&yaml, "answers.yaml").unwrap_err();
        assert_eq!(err.violation_count(), 1);
        assert!(err.violations()[0].message().contains("请输入最高学历所学专业"));
    }

    #[test]
    fn test_invalid_option_fails() {
        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);
        let yaml = COMPLETE_CAREGIVER.replace("careSkills: hygiene", "careSkills: cooking");
        let err = validator.validate(&yaml, "answers.yaml").unwrap_err();
        assert_eq!(err.violation_count(), 1);
        assert!(err.violations()[0].message().contains("careSkills"));
    }

    #[test]
    fn test_blank_choice_reports_once() {
        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);
        let yaml = COMPLETE_CAREGIVER.replace("gender: female", "gender: \"\"");
        let err = validator.validate(&yaml, "answers.yaml").unwrap_err();
        assert_eq!(err.violation_count(), 1);
        assert!(err.violations()[0].message().contains("请选择性别"));
    }

    #[test]
    fn test_blank_optional_choice_passes() {
        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);
        let yaml = format!("{}salaryRange: \"\"\n", COMPLETE_CAREGIVER);
        assert!(validator.validate(&yaml, "answers.yaml").is_ok());

        let teacher = COMPLETE_CAREGIVER
            .replace("currentPosition: caregiver", "currentPosition: main_teacher")
            .replace("careSkills: hygiene", "trainingNeeds: \"  \"\ncompetency_matrix: {}");
        assert!(validator.validate(&teacher, "answers.yaml").is_ok());
    }

    #[test]
    fn test_foreign_keys_are_warnings() {
        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);
        let yaml = format!("{}coreTasks:\n  - annual_plan\n", COMPLETE_CAREGIVER);
        let report = validator.validate(&yaml, "answers.yaml").unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].key, "coreTasks");
    }

    #[test]
    fn test_director_needs_step5() {
        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);
        let yaml = COMPLETE_CAREGIVER
            .replace("currentPosition: caregiver", "currentPosition: director")
            .replace("careSkills: hygiene", "coreTasks: [annual_plan]");
        let report = validator.validate(&yaml, "answers.yaml").unwrap();
        assert_eq!(report.role, Role::Director);
        // totalStaff is shared with step 5 and already answered
        assert_eq!(report.fields_checked, 22);
    }

    #[test]
    fn test_matrix_values_checked() {
        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);
        let yaml = COMPLETE_CAREGIVER
            .replace("currentPosition: caregiver", "currentPosition: main_teacher")
            .replace(
                "careSkills: hygiene",
                "trainingNeeds: curriculum\ncompetency_matrix:\n  item1: 5\n  item2: 9\n",
            );
        let err = validator.validate(&yaml, "answers.yaml").unwrap_err();
        assert_eq!(err.violation_count(), 1);
        assert!(err.violations()[0].message().contains("item2"));
    }

    #[test]
    fn test_parse_error() {
        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);
        let err = validator
            .validate("gender: [unclosed", "answers.yaml")
            .unwrap_err();
        assert!(err.violations()[0].message().contains("YAML parse error"));
    }

    #[test]
    fn test_non_mapping_document() {
        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);
        let err = validator.validate("- a\n- b\n", "answers.yaml").unwrap_err();
        assert_eq!(err.violation_count(), 1);
    }

    #[test]
    fn test_json_document() {
        let registry = FormRegistry::new();
        let validator = DocumentValidator::new(&registry);
        let json = r#"{"currentPosition": "doctor", "gender": "robot"}"#;
        let err = validator.validate(json, "answers.json").unwrap_err();
        assert!(err
            .violations()
            .iter()
            .any(|v| v.message().contains("'/gender'")));
    }

    #[test]
    fn test_find_key_span() {
        let content = "gender: male\neducation: undergraduate\n";
        let span = find_key_span(content, "education").unwrap();
        assert_eq!(span.offset(), 13);

        let json = "{\n  \"gender\": \"male\"\n}";
        assert_eq!(find_key_span(json, "gender").unwrap().offset(), 4);
        assert!(find_key_span(content, "missing").is_none());
    }
}
