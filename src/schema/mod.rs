//! Survey form definitions, validation, labeling and reports

pub mod catalog;
pub mod field;
pub mod json_schema;
pub mod labels;
pub mod registry;
pub mod remote;
pub mod report;
pub mod validator;
pub mod wizard;

pub use field::{ChoiceOption, FieldDescriptor, FieldKind, MatrixLayout, Rule};
pub use labels::{AnswerLabeler, LabeledAnswer};
pub use registry::{
    get_fixed_step_fields, get_step4_fields, FixedStep, FormRegistry, FormStep, StepParseError,
};
pub use remote::{format_search_record, RemoteSearchConfig, SearchRecord};
pub use report::{ReportError, ReportRenderer};
pub use validator::{validate, DocumentError, DocumentValidator, ValidationResult};
pub use wizard::SurveyWizard;
