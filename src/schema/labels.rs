//! Translate stored option values back into the labels respondents saw

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::submission::role_of;
use crate::schema::field::{FieldDescriptor, FieldKind, MatrixLayout};
use crate::schema::registry::{FormRegistry, FormStep};

/// One answer with its question label and display value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledAnswer {
    pub step: Option<u8>,
    pub key: String,
    pub question: String,
    pub value: Value,
}

impl LabeledAnswer {
    /// Single-line rendering of the labeled value
    pub fn display(&self) -> String {
        display_value(&self.value)
    }
}

/// Maps option values to labels using the registry
pub struct AnswerLabeler<'a> {
    registry: &'a FormRegistry,
}

impl<'a> AnswerLabeler<'a> {
    pub fn new(registry: &'a FormRegistry) -> Self {
        Self { registry }
    }

    /// Same answer map with every known option value replaced by its label
    ///
    /// Keys without a matching question, free text and unknown values pass
    /// through unchanged.
    pub fn label_answers(&self, answers: &Map<String, Value>) -> Map<String, Value> {
        let role = role_of(answers);
        answers
            .iter()
            .map(|(key, value)| {
                let labeled = match self.registry.find_field(key, role) {
                    Some(field) => label_value(&field, value),
                    None => value.clone(),
                };
                (key.clone(), labeled)
            })
            .collect()
    }

    /// Answers in question order, each with its step and question label
    ///
    /// Answers to questions outside the respondent's form follow at the end.
    pub fn entries(&self, answers: &Map<String, Value>) -> Vec<LabeledAnswer> {
        let role = role_of(answers);
        let mut entries = Vec::new();
        let mut used = std::collections::HashSet::new();

        for (step, fields) in self.registry.form_for(role) {
            for field in fields {
                if !used.insert(field.key.clone()) {
                    continue;
                }
                if let Some(value) = answers.get(&field.key) {
                    entries.push(LabeledAnswer {
                        step: Some(step.number()),
                        key: field.key.clone(),
                        question: field.label.clone(),
                        value: label_value(&field, value),
                    });
                }
            }
        }

        for (key, value) in answers {
            if !used.contains(key) {
                entries.push(LabeledAnswer {
                    step: None,
                    key: key.clone(),
                    question: key.clone(),
                    value: value.clone(),
                });
            }
        }

        entries
    }

    /// Labeled answers grouped by step, with unanswered questions as `None`
    pub fn sections(
        &self,
        answers: &Map<String, Value>,
    ) -> Vec<(FormStep, Vec<(FieldDescriptor, Option<Value>)>)> {
        let role = role_of(answers);
        self.registry
            .form_for(role)
            .into_iter()
            .map(|(step, fields)| {
                let items = fields
                    .into_iter()
                    .map(|field| {
                        let value = answers
                            .get(&field.key)
                            .filter(|v| !v.is_null())
                            .map(|v| label_value(&field, v));
                        (field, value)
                    })
                    .collect();
                (step, items)
            })
            .collect()
    }
}

fn value_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn label_option(field: &FieldDescriptor, value: &Value) -> Value {
    value_key(value)
        .and_then(|key| field.option_label(&key).map(|l| Value::String(l.to_string())))
        .unwrap_or_else(|| value.clone())
}

fn label_matrix(layout: &MatrixLayout, value: &Value) -> Value {
    let Value::Object(cells) = value else {
        return value.clone();
    };

    cells
        .iter()
        .map(|(row, column)| {
            let row_label = layout.row_label(row).unwrap_or(row).to_string();
            let column_value = match column {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            let column_label = column_value
                .and_then(|v| u8::try_from(v).ok())
                .and_then(|v| layout.column_label(v))
                .map(|l| Value::String(l.to_string()))
                .unwrap_or_else(|| column.clone());
            (row_label, column_label)
        })
        .collect::<Map<String, Value>>()
        .into()
}

/// Label a single answer for `field`
pub fn label_value(field: &FieldDescriptor, value: &Value) -> Value {
    match (&field.kind, value) {
        (FieldKind::RatingMatrix(layout), _) => label_matrix(layout, value),
        (_, Value::Array(items)) if field.options().is_some() => {
            Value::Array(items.iter().map(|v| label_option(field, v)).collect())
        }
        (_, _) if field.options().is_some() => label_option(field, value),
        _ => value.clone(),
    }
}

/// Single-line rendering of a (labeled) answer
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("、"),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}：{}", k, display_value(v)))
            .collect::<Vec<_>>()
            .join("；"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answers(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_single_and_multi_choice() {
        let registry = FormRegistry::new();
        let labeler = AnswerLabeler::new(&registry);
        let labeled = labeler.label_answers(&answers(json!({
            "orgNature": "public",
            "reason": ["personal", "other", "mystery"],
            "educationMajor": "学前教育"
        })));

        assert_eq!(labeled["orgNature"], "公办");
        assert_eq!(labeled["reason"], json!(["个人原因", "其他", "mystery"]));
        assert_eq!(labeled["educationMajor"], "学前教育");
    }

    #[test]
    fn test_matrix_labels() {
        let registry = FormRegistry::new();
        let labeler = AnswerLabeler::new(&registry);
        let labeled = labeler.label_answers(&answers(json!({
            "currentPosition": "main_teacher",
            "competency_matrix": {"item1": 5, "item3": "1", "item99": 2}
        })));

        assert_eq!(labeled["currentPosition"], "主班教师");
        assert_eq!(
            labeled["competency_matrix"],
            json!({
                "热爱本职，以德立身": "非常重要",
                "尊重婴幼儿个体差异、平等对待每一位幼儿的理念": "非常不重要",
                "item99": "不重要"
            })
        );
    }

    #[test]
    fn test_role_specific_keys_need_role() {
        let registry = FormRegistry::new();
        let labeler = AnswerLabeler::new(&registry);
        let labeled = labeler.label_answers(&answers(json!({
            "currentPosition": "doctor",
            "careSkills": "hygiene"
        })));
        assert_eq!(labeled["careSkills"], "hygiene");
    }

    #[test]
    fn test_entries_follow_question_order() {
        let registry = FormRegistry::new();
        let labeler = AnswerLabeler::new(&registry);
        let entries = labeler.entries(&answers(json!({
            "extra": "x",
            "gender": "female",
            "orgNature": "private"
        })));

        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["orgNature", "gender", "extra"]);
        assert_eq!(entries[0].step, Some(1));
        assert_eq!(entries[0].question, "机构举办主体");
        assert_eq!(entries[1].display(), "女");
        assert_eq!(entries[2].step, None);
    }

    #[test]
    fn test_sections_mark_unanswered() {
        let registry = FormRegistry::new();
        let labeler = AnswerLabeler::new(&registry);
        let sections = labeler.sections(&answers(json!({"gender": "male", "education": null})));

        assert_eq!(sections.len(), 4);
        let (step, items) = &sections[1];
        assert_eq!(*step, FormStep::Personal);
        assert_eq!(items[0].1, Some(json!("男")));
        assert_eq!(items[1].1, None);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!(["a", "b"])), "a、b");
        assert_eq!(display_value(&json!({"r": "c"})), "r：c");
        assert_eq!(display_value(&json!(12)), "12");
        assert_eq!(display_value(&Value::Null), "");
    }
}
