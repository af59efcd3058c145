//! Interactive terminal wizard that walks a respondent through the survey
//!
//! Steps 1-3 are asked first; the role answered in step 3 then decides the
//! step 4 questions and whether step 5 follows.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use miette::{IntoDiagnostic, Result};
use serde_json::{Map, Number, Value};

use crate::core::role::Role;
use crate::core::submission::{Submission, ROLE_KEY};
use crate::schema::field::{ChoiceOption, FieldDescriptor, FieldKind, MatrixLayout};
use crate::schema::registry::{FormRegistry, FormStep};
use crate::schema::validator::validate;

const SKIP_LABEL: &str = "（跳过）";

/// A survey wizard prompting on the terminal
pub struct SurveyWizard<'a> {
    registry: &'a FormRegistry,
    theme: ColorfulTheme,
}

impl<'a> SurveyWizard<'a> {
    pub fn new(registry: &'a FormRegistry) -> Self {
        Self {
            registry,
            theme: ColorfulTheme::default(),
        }
    }

    /// Run the whole survey
    ///
    /// A `preset_role` answers `currentPosition` up front instead of asking.
    pub fn run(&self, preset_role: Option<Role>) -> Result<Submission> {
        let mut submission = preset_submission(preset_role);

        for step in [FormStep::Organization, FormStep::Personal, FormStep::Employment] {
            self.run_step(step, Role::Unrecognized, &mut submission)?;
        }

        let role = submission.role();
        tracing::debug!(role = %role, "role-specific questions selected");

        for step in self.registry.steps_for(role) {
            if matches!(step, FormStep::RoleSpecific | FormStep::Director) {
                self.run_step(step, role, &mut submission)?;
            }
        }

        println!();
        println!("{} Survey complete!", style("✓").green());

        Ok(submission)
    }

    fn run_step(&self, step: FormStep, role: Role, submission: &mut Submission) -> Result<()> {
        println!();
        println!("{} {}", style("◆").cyan(), style(step.title()).bold());
        println!("{}", style("─".repeat(50)).dim());

        for field in self.registry.step_fields(step, role).iter() {
            // Shared keys (totalStaff) and preset answers are asked once
            if submission.get(&field.key).is_some() {
                continue;
            }
            if let Some(value) = self.prompt_field(field)? {
                submission.set(field.key.clone(), value);
            }
        }
        Ok(())
    }

    /// Prompt the user for a field value
    fn prompt_field(&self, field: &FieldDescriptor) -> Result<Option<Value>> {
        let prompt = format_prompt(field);

        match &field.kind {
            FieldKind::TextInput(_) | FieldKind::FreeText | FieldKind::RemoteSearchableChoice(_) => {
                let input: String = Input::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .allow_empty(true)
                    .validate_with(|text: &String| check_text(field, text))
                    .interact_text()
                    .into_diagnostic()?;
                Ok(parse_text_answer(field, &input))
            }

            FieldKind::SingleChoice { options, .. } => self.prompt_single(field, &prompt, options),

            FieldKind::MultiChoice { options } | FieldKind::CheckboxGroup { options } => {
                self.prompt_multi(field, &prompt, options)
            }

            FieldKind::RatingMatrix(layout) => self.prompt_matrix(field, &prompt, layout),
        }
    }

    fn prompt_single(
        &self,
        field: &FieldDescriptor,
        prompt: &str,
        options: &[ChoiceOption],
    ) -> Result<Option<Value>> {
        let mut items: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        if !field.is_required() {
            items.push(SKIP_LABEL);
        }

        let selection = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(&items)
            .default(0)
            .interact()
            .into_diagnostic()?;

        Ok(options
            .get(selection)
            .map(|o| Value::String(o.value.clone())))
    }

    fn prompt_multi(
        &self,
        field: &FieldDescriptor,
        prompt: &str,
        options: &[ChoiceOption],
    ) -> Result<Option<Value>> {
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();

        loop {
            let picked = MultiSelect::with_theme(&self.theme)
                .with_prompt(format!("{} {}", prompt, style("(空格选择，回车确认)").dim()))
                .items(&labels)
                .interact()
                .into_diagnostic()?;

            let value = Value::Array(
                picked
                    .iter()
                    .filter_map(|i| options.get(*i))
                    .map(|o| Value::String(o.value.clone()))
                    .collect(),
            );

            let result = validate(field, Some(&value));
            if let Some(message) = result.message {
                println!("{} {}", style("✗").red(), message);
                continue;
            }
            return Ok(if picked.is_empty() { None } else { Some(value) });
        }
    }

    fn prompt_matrix(
        &self,
        field: &FieldDescriptor,
        prompt: &str,
        layout: &MatrixLayout,
    ) -> Result<Option<Value>> {
        println!("{} ({})", prompt, style(&layout.row_title).dim());

        let mut columns: Vec<&str> = layout.columns.iter().map(|c| c.label.as_str()).collect();
        let skippable = !field.is_required();
        if skippable {
            columns.push(SKIP_LABEL);
        }

        loop {
            let mut cells = Map::new();
            for row in &layout.rows {
                let selection = Select::with_theme(&self.theme)
                    .with_prompt(format!("  {}", row.label))
                    .items(&columns)
                    .default(0)
                    .interact()
                    .into_diagnostic()?;
                if let Some(column) = layout.columns.get(selection) {
                    cells.insert(row.value.clone(), Value::Number(Number::from(column.value)));
                }
            }

            let value = Value::Object(cells);
            let result = validate(field, Some(&value));
            if let Some(message) = result.message {
                println!("{} {}", style("✗").red(), message);
                continue;
            }
            return Ok(if value.as_object().is_some_and(Map::is_empty) {
                None
            } else {
                Some(value)
            });
        }
    }
}

/// Start a submission with the preset role answered, if it is a known one
///
/// An unrecognized role is left unanswered so step 3 still asks for it.
fn preset_submission(preset_role: Option<Role>) -> Submission {
    let mut submission = Submission::new();
    if let Some(role) = preset_role.filter(|r| *r != Role::Unrecognized) {
        submission.set(ROLE_KEY, Value::String(role.as_str().to_string()));
    }
    submission
}

/// Validate typed text for a field, as the input prompt does
fn check_text(field: &FieldDescriptor, text: &str) -> std::result::Result<(), String> {
    let value = Value::String(text.to_string());
    if let Some(message) = validate(field, Some(&value)).message {
        return Err(message);
    }
    if let FieldKind::TextInput(props) = &field.kind {
        let trimmed = text.trim();
        if props.numeric && !trimmed.is_empty() && trimmed.parse::<f64>().is_err() {
            return Err("请输入数字".to_string());
        }
    }
    Ok(())
}

/// Turn typed text into an answer; blank input is no answer
fn parse_text_answer(field: &FieldDescriptor, text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let FieldKind::TextInput(props) = &field.kind {
        if props.numeric {
            if let Ok(n) = trimmed.parse::<u64>() {
                return Some(Value::Number(n.into()));
            }
            if let Some(n) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
                return Some(Value::Number(n));
            }
        }
    }
    Some(Value::String(trimmed.to_string()))
}

/// Format the prompt for a field
fn format_prompt(field: &FieldDescriptor) -> String {
    let mut prompt = field.label.clone();

    if let FieldKind::TextInput(props) = &field.kind {
        if let Some(suffix) = &props.suffix {
            prompt.push_str(&format!("（{}）", suffix));
        }
    }

    if let Some(placeholder) = &field.placeholder {
        prompt = format!("{} {}", prompt, style(placeholder).dim());
    }

    if field.is_required() {
        format!("{} {}", prompt, style("*").red())
    } else {
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::TextInputProps;
    use serde_json::json;

    fn numeric_field() -> FieldDescriptor {
        FieldDescriptor::new(
            "totalSlots",
            "机构托位总数",
            FieldKind::TextInput(TextInputProps::numeric("个")),
        )
        .required("请输入机构托位总数")
    }

    #[test]
    fn test_check_text() {
        let field = numeric_field();
        assert_eq!(check_text(&field, " "), Err("请输入机构托位总数".to_string()));
        assert_eq!(check_text(&field, "abc"), Err("请输入数字".to_string()));
        assert_eq!(check_text(&field, "80"), Ok(()));

        let optional = FieldDescriptor::new("note", "备注", FieldKind::FreeText);
        assert_eq!(check_text(&optional, ""), Ok(()));
    }

    #[test]
    fn test_parse_text_answer() {
        let field = numeric_field();
        assert_eq!(parse_text_answer(&field, " 80 "), Some(json!(80)));
        assert_eq!(parse_text_answer(&field, "2.5"), Some(json!(2.5)));
        assert_eq!(parse_text_answer(&field, ""), None);

        let text = FieldDescriptor::new("major", "专业", FieldKind::text());
        assert_eq!(parse_text_answer(&text, " 学前教育 "), Some(json!("学前教育")));
    }

    #[test]
    fn test_format_prompt() {
        console::set_colors_enabled(false);
        assert_eq!(format_prompt(&numeric_field()), "机构托位总数（个） *");

        let optional = FieldDescriptor::new("note", "备注", FieldKind::FreeText);
        assert_eq!(format_prompt(&optional), "备注");
    }

    #[test]
    fn test_preset_submission() {
        let preset = preset_submission(Some(Role::Doctor));
        assert_eq!(preset.get(ROLE_KEY), Some(&json!("doctor")));
        assert_eq!(preset.role(), Role::Doctor);

        let unknown = preset_submission(Some(Role::Unrecognized));
        assert!(unknown.get(ROLE_KEY).is_none());
        assert!(preset_submission(None).get(ROLE_KEY).is_none());
    }

    #[test]
    fn test_wizard_creation() {
        let registry = FormRegistry::new();
        let wizard = SurveyWizard::new(&registry);
        assert_eq!(wizard.registry.steps_for(Role::Director).len(), 5);
    }
}
