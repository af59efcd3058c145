//! Remote institution search
//!
//! A remote-searchable-choice field resolves its options by querying a
//! backend with the text the respondent types. The transport belongs to the
//! caller; this module describes the request and turns response records into
//! options and display strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::field::ChoiceOption;

/// Default institution search endpoint
pub const DEFAULT_SEARCH_ENDPOINT: &str = "/api-tuoyu/bapfopm/pub/search/action/queryInfo";

/// Which response fields become an option's label and value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultMapping {
    pub label_field: String,
    pub value_field: String,
}

/// How a remote-searchable-choice field looks up candidates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteSearchConfig {
    pub endpoint: String,
    pub query_param: String,
    pub result_mapping: ResultMapping,
}

impl RemoteSearchConfig {
    /// Institution search: label and value are both the institution name
    pub fn institutions() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            query_param: "key".to_string(),
            result_mapping: ResultMapping {
                label_field: "institution_name".to_string(),
                value_field: "institution_name".to_string(),
            },
        }
    }

    /// Same config pointed at a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Describe the lookup for a typed search text
    pub fn request(&self, text: &str) -> SearchRequest {
        SearchRequest {
            method: "GET",
            endpoint: self.endpoint.clone(),
            query: vec![(self.query_param.clone(), text.to_string())],
        }
    }

    /// Map one raw response record to an option
    ///
    /// Records missing either mapped field, or carrying a non-string there,
    /// produce no option.
    pub fn to_option(&self, record: &Value) -> Option<ChoiceOption> {
        let label = record.get(&self.result_mapping.label_field)?.as_str()?;
        let value = record.get(&self.result_mapping.value_field)?.as_str()?;
        Some(ChoiceOption::new(label, value))
    }
}

/// A described search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub method: &'static str,
    pub endpoint: String,
    pub query: Vec<(String, String)>,
}

/// One institution record returned by the search backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchRecord {
    pub institution_name: Option<String>,
    pub institution_type: Option<String>,
    pub institution_other_name: Option<String>,
    pub zoning_name: Option<String>,
    pub address: Option<String>,
    pub finished_time: Option<String>,
}

impl SearchRecord {
    /// Pick the known fields out of a raw record, ignoring non-string values
    pub fn from_value(raw: &Value) -> Self {
        let text = |name: &str| raw.get(name).and_then(Value::as_str).map(String::from);
        Self {
            institution_name: text("institution_name"),
            institution_type: text("institution_type"),
            institution_other_name: text("institution_other_name"),
            zoning_name: text("zoning_name"),
            address: text("address"),
            finished_time: text("finished_time"),
        }
    }
}

/// Render a search record as a multi-line dropdown label
///
/// Emits `类型`, `曾用名`, `区域`, `地址`, `建成时间` lines in that order for
/// every present, non-empty field. The alternate name is dropped when it
/// repeats the institution name.
pub fn format_search_record(record: &SearchRecord) -> String {
    let present = |field: &Option<String>| -> Option<String> {
        field.as_deref().filter(|v| !v.is_empty()).map(String::from)
    };

    let other_name = present(&record.institution_other_name)
        .filter(|other| record.institution_name.as_deref() != Some(other.as_str()));

    let lines = [
        ("类型", present(&record.institution_type)),
        ("曾用名", other_name),
        ("区域", present(&record.zoning_name)),
        ("地址", present(&record.address)),
        ("建成时间", present(&record.finished_time)),
    ];

    lines
        .into_iter()
        .filter_map(|(prefix, value)| value.map(|v| format!("{}：{}", prefix, v)))
        .collect::<Vec<_>>()
        .join("\n")
}
