//! JSON Schema export of survey steps
//!
//! Describes the shape of answers: which keys exist, their JSON types and the
//! values choice-like fields accept. Required rules are listed for external
//! consumers but left out of the schema used for structural checks, where
//! the evaluator reports them with their configured messages.

use serde_json::{json, Map, Value};

use crate::schema::field::{FieldDescriptor, FieldKind};
use crate::schema::registry::FormStep;

const DRAFT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Schema for one field's answer
pub fn field_schema(field: &FieldDescriptor) -> Value {
    let mut schema = match &field.kind {
        FieldKind::TextInput(props) if props.numeric => json!({ "type": ["string", "number"] }),
        FieldKind::TextInput(_) | FieldKind::FreeText | FieldKind::RemoteSearchableChoice(_) => {
            json!({ "type": "string" })
        }
        FieldKind::SingleChoice { options, .. } => {
            json!({ "enum": options.iter().map(|o| o.value.as_str()).collect::<Vec<_>>() })
        }
        FieldKind::MultiChoice { options } | FieldKind::CheckboxGroup { options } => json!({
            "type": "array",
            "items": { "enum": options.iter().map(|o| o.value.as_str()).collect::<Vec<_>>() },
            "uniqueItems": true
        }),
        FieldKind::RatingMatrix(layout) => {
            let columns: Vec<u8> = layout.columns.iter().map(|c| c.value).collect();
            let rows: Map<String, Value> = layout
                .rows
                .iter()
                .map(|row| {
                    (
                        row.value.clone(),
                        json!({ "title": row.label, "enum": columns }),
                    )
                })
                .collect();
            json!({
                "type": "object",
                "properties": rows,
                "additionalProperties": false
            })
        }
    };

    if let Value::Object(map) = &mut schema {
        map.insert("title".to_string(), Value::String(field.label.clone()));
    }
    schema
}

fn object_schema<'a>(
    title: &str,
    fields: impl IntoIterator<Item = &'a FieldDescriptor>,
    include_required: bool,
) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in fields {
        // Keys repeated across steps hold one answer; the first step defines it.
        if properties.contains_key(&field.key) {
            continue;
        }
        properties.insert(field.key.clone(), field_schema(field));
        if field.is_required() {
            required.push(Value::String(field.key.clone()));
        }
    }

    let mut schema = json!({
        "$schema": DRAFT,
        "title": title,
        "type": "object",
        "properties": properties
    });
    if include_required && !required.is_empty() {
        schema["required"] = Value::Array(required);
    }
    schema
}

/// Schema of a single step
pub fn step_schema(step: FormStep, fields: &[FieldDescriptor]) -> Value {
    object_schema(step.title(), fields, true)
}

/// Schema of a whole submission across the given steps
pub fn submission_schema(form: &[(FormStep, Vec<FieldDescriptor>)], include_required: bool) -> Value {
    object_schema(
        "托育从业者调研",
        form.iter().flat_map(|(_, fields)| fields),
        include_required,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Role;
    use crate::schema::registry::{FixedStep, FormRegistry};

    #[test]
    fn test_single_choice_is_enum() {
        let registry = FormRegistry::new();
        let gender = &registry.fixed_step_fields(FixedStep::Personal)[0];
        let schema = field_schema(gender);
        assert_eq!(schema["enum"], json!(["male", "female"]));
        assert_eq!(schema["title"], "性别");
    }

    #[test]
    fn test_numeric_input_accepts_numbers() {
        let registry = FormRegistry::new();
        let slots = registry
            .fixed_step_fields(FixedStep::Organization)
            .iter()
            .find(|f| f.key == "totalSlots")
            .unwrap();
        assert_eq!(field_schema(slots)["type"], json!(["string", "number"]));
    }

    #[test]
    fn test_matrix_schema() {
        let registry = FormRegistry::new();
        let fields = registry.step4_fields(Role::MainTeacher);
        let schema = field_schema(&fields[2]);
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"].as_object().unwrap().len(), 14);
        assert_eq!(schema["properties"]["item1"]["enum"], json!([1, 2, 3, 4, 5]));
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn test_step_schema_lists_required() {
        let registry = FormRegistry::new();
        let schema = step_schema(
            FormStep::Director,
            registry.fixed_step_fields(FixedStep::Director),
        );
        assert_eq!(schema["title"], "第五部分：园长/负责人专属");
        assert_eq!(schema["required"], json!(["totalStaff"]));
        assert_eq!(schema["properties"]["futureTalentNeeds"]["type"], "array");
    }

    #[test]
    fn test_submission_schema_merges_shared_keys() {
        let registry = FormRegistry::new();
        let form = registry.form_for(Role::Director);
        let schema = submission_schema(&form, false);
        assert!(schema.get("required").is_none());
        // totalStaff appears in steps 1 and 5; step 1's numeric input wins
        assert_eq!(
            schema["properties"]["totalStaff"]["type"],
            json!(["string", "number"])
        );
        assert!(schema["properties"].get("coreTasks").is_some());
    }

    #[test]
    fn test_schemas_compile() {
        let registry = FormRegistry::new();
        for role in Role::selectable() {
            let schema = submission_schema(&registry.form_for(*role), true);
            assert!(jsonschema::validator_for(&schema).is_ok());
        }
    }
}
