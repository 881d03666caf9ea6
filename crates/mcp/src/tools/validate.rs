// Argument validation against tool descriptors

use crate::tools::registry::{ParamType, ToolDescriptor, MAX_FISCAL_YEAR, MIN_FISCAL_YEAR};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;

/// Arguments supplied with a single invocation, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    /// Accepts a JSON object. `null` (arguments omitted) counts as empty.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Ok(Self(map)),
            other => Err(ValidationError::from(FieldIssue::invalid(
                "arguments",
                format!("expected an object, got {}", type_name(&other)),
            ))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Missing,
    Invalid,
    Unexpected,
}

/// One problem with one argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub issue: IssueKind,
    pub detail: String,
}

impl FieldIssue {
    pub fn missing(field: &str) -> Self {
        Self {
            field: field.to_string(),
            issue: IssueKind::Missing,
            detail: "required parameter is missing".to_string(),
        }
    }

    pub fn invalid(field: &str, detail: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            issue: IssueKind::Invalid,
            detail: detail.into(),
        }
    }

    pub fn unexpected(field: &str) -> Self {
        Self {
            field: field.to_string(),
            issue: IssueKind::Unexpected,
            detail: "unknown parameter".to_string(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.detail)
    }
}

/// Every problem found in an arguments object, not just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.issues.iter().map(|i| i.field.as_str())
    }
}

impl From<FieldIssue> for ValidationError {
    fn from(issue: FieldIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid arguments: ")?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Arguments that passed validation: values normalized, defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedArguments(Map<String, Value>);

impl ValidatedArguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Deserialize into a tool's typed argument struct.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ValidationError> {
        serde_json::from_value(Value::Object(self.0))
            .map_err(|e| FieldIssue::invalid("arguments", e.to_string()).into())
    }
}

/// Check `args` against the parameters `descriptor` declares.
pub fn validate(
    descriptor: &ToolDescriptor,
    args: &ToolArguments,
) -> Result<ValidatedArguments, ValidationError> {
    let mut issues = Vec::new();
    let mut normalized = Map::new();

    for param in &descriptor.params {
        match args.get(param.name) {
            None | Some(Value::Null) => {
                if param.required {
                    issues.push(FieldIssue::missing(param.name));
                } else if let Some(default) = &param.default {
                    normalized.insert(param.name.to_string(), default.clone());
                }
            }
            Some(value) => match normalize(param.ty, value) {
                Ok(value) => {
                    normalized.insert(param.name.to_string(), value);
                }
                Err(detail) => issues.push(FieldIssue::invalid(param.name, detail)),
            },
        }
    }

    for name in args.0.keys() {
        if descriptor.param(name).is_none() {
            issues.push(FieldIssue::unexpected(name));
        }
    }

    if issues.is_empty() {
        Ok(ValidatedArguments(normalized))
    } else {
        Err(ValidationError { issues })
    }
}

fn normalize(ty: ParamType, value: &Value) -> Result<Value, String> {
    match ty {
        ParamType::Identifier => match value {
            Value::Number(_) => match integer(value) {
                Some(id) if id >= 1 => Ok(json!(id)),
                _ => Err("must be a positive integer or a non-empty string".to_string()),
            },
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Err("must not be empty".to_string());
                }
                match s.parse::<i64>() {
                    Ok(id) if id >= 1 => Ok(json!(id)),
                    Ok(_) => Err("must be a positive integer or a non-empty string".to_string()),
                    Err(_) => Ok(json!(s)),
                }
            }
            other => Err(format!(
                "expected an integer or string, got {}",
                type_name(other)
            )),
        },
        ParamType::FiscalYear => {
            let year = integer_like(value)?;
            if (MIN_FISCAL_YEAR..=MAX_FISCAL_YEAR).contains(&year) {
                Ok(json!(year))
            } else {
                Err(format!(
                    "{year} is not a plausible fiscal year ({MIN_FISCAL_YEAR}-{MAX_FISCAL_YEAR})"
                ))
            }
        }
        ParamType::NonEmptyString => match value {
            Value::String(s) if !s.trim().is_empty() => Ok(json!(s.trim())),
            Value::String(_) => Err("must not be empty".to_string()),
            other => Err(format!("expected a string, got {}", type_name(other))),
        },
        ParamType::KeywordList => {
            let items = value
                .as_array()
                .ok_or_else(|| format!("expected an array of strings, got {}", type_name(value)))?;
            if items.is_empty() {
                return Err("at least one keyword is required".to_string());
            }

            let mut keywords = Vec::with_capacity(items.len());
            let mut bad = Vec::new();
            for (i, item) in items.iter().enumerate() {
                match item.as_str().map(str::trim) {
                    Some(keyword) if !keyword.is_empty() => keywords.push(keyword),
                    _ => bad.push(i.to_string()),
                }
            }

            if bad.is_empty() {
                Ok(json!(keywords))
            } else {
                Err(format!(
                    "elements at positions {} must be non-empty strings",
                    bad.join(", ")
                ))
            }
        }
        ParamType::Integer { min, max } => {
            let n = integer_like(value)?;
            if (min..=max).contains(&n) {
                Ok(json!(n))
            } else {
                Err(format!("{n} is out of range ({min}-{max})"))
            }
        }
    }
}

/// Whole numbers only; `2023.0` passes, `2023.5` does not.
fn integer(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Integers, or strings holding one.
fn integer_like(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(_) => integer(value).ok_or_else(|| "expected a whole number".to_string()),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("expected an integer, got {s:?}")),
        other => Err(format!("expected an integer, got {}", type_name(other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
