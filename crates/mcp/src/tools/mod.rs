pub mod agencies;
pub mod awards;
pub mod search;
mod registry;
mod validate;

pub use registry::{
    json_schema_array, json_schema_integer, json_schema_object, json_schema_string, ParamSpec,
    ParamType, ToolDescriptor, ToolKind, ToolRegistry, MAX_FISCAL_YEAR, MIN_FISCAL_YEAR,
};
pub use validate::{
    validate, FieldIssue, IssueKind, ToolArguments, ValidatedArguments, ValidationError,
};
