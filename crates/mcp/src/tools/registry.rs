// Tool catalog: descriptors, parameter contracts and lookup

use crate::protocol::ToolSchema;
use crate::tools::{agencies, awards, search};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// The fixed set of tools this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    GetAgencies,
    GetSpendingAwardsByAgencyId,
    GetAwardInfoByAwardId,
    SearchByKeywords,
}

impl ToolKind {
    /// Registration order. `GetAgencies` comes first because the agency-scoped
    /// tools need the ids it returns.
    pub const ALL: [ToolKind; 4] = [
        ToolKind::GetAgencies,
        ToolKind::GetSpendingAwardsByAgencyId,
        ToolKind::GetAwardInfoByAwardId,
        ToolKind::SearchByKeywords,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::GetAgencies => "GetAgencies",
            ToolKind::GetSpendingAwardsByAgencyId => "GetSpendingAwardsByAgencyId",
            ToolKind::GetAwardInfoByAwardId => "GetAwardInfoByAwardId",
            ToolKind::SearchByKeywords => "SearchByKeywords",
        }
    }

    pub fn descriptor(self) -> ToolDescriptor {
        match self {
            ToolKind::GetAgencies => agencies::get_agencies_descriptor(),
            ToolKind::GetSpendingAwardsByAgencyId => awards::spending_by_agency_descriptor(),
            ToolKind::GetAwardInfoByAwardId => awards::award_info_descriptor(),
            ToolKind::SearchByKeywords => search::search_by_keywords_descriptor(),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic type of a tool parameter. Validation and the advertised JSON
/// schema are both derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Positive integer or non-empty string.
    Identifier,
    /// Four-digit federal fiscal year.
    FiscalYear,
    /// String with at least one non-whitespace character.
    NonEmptyString,
    /// Array of one or more non-empty strings.
    KeywordList,
    /// Bounded integer.
    Integer { min: i64, max: i64 },
}

pub const MIN_FISCAL_YEAR: i64 = 2000;
pub const MAX_FISCAL_YEAR: i64 = 2100;

impl ParamType {
    fn json_schema(&self, description: &str) -> Value {
        match self {
            ParamType::Identifier => serde_json::json!({
                "oneOf": [
                    {"type": "integer", "minimum": 1},
                    {"type": "string", "minLength": 1}
                ],
                "description": description
            }),
            ParamType::FiscalYear => serde_json::json!({
                "type": "integer",
                "minimum": MIN_FISCAL_YEAR,
                "maximum": MAX_FISCAL_YEAR,
                "description": description
            }),
            ParamType::NonEmptyString => {
                let mut schema = json_schema_string(description);
                schema["minLength"] = serde_json::json!(1);
                schema
            }
            ParamType::KeywordList => {
                let mut schema = json_schema_array(
                    serde_json::json!({"type": "string", "minLength": 1}),
                    description,
                );
                schema["minItems"] = serde_json::json!(1);
                schema
            }
            ParamType::Integer { min, max } => {
                let mut schema = json_schema_integer(description);
                schema["minimum"] = (*min).into();
                schema["maximum"] = (*max).into();
                schema
            }
        }
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub required: bool,
    pub default: Option<Value>,
    pub description: &'static str,
}

impl ParamSpec {
    pub fn required(name: &'static str, ty: ParamType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            required: true,
            default: None,
            description,
        }
    }

    pub fn optional(
        name: &'static str,
        ty: ParamType,
        default: Value,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            ty,
            required: false,
            default: Some(default),
            description,
        }
    }
}

/// Immutable description of a callable tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub kind: ToolKind,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn required_params(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.params.iter().filter(|p| p.required).map(|p| p.name)
    }

    /// JSON schema for the tool's arguments object.
    pub fn input_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        for param in &self.params {
            let mut schema = param.ty.json_schema(param.description);
            if let Some(default) = &param.default {
                schema["default"] = default.clone();
            }
            properties.insert(param.name.to_string(), schema);
        }

        let mut schema = json_schema_object(
            Value::Object(properties),
            self.required_params().collect(),
        );
        schema["additionalProperties"] = false.into();
        schema
    }

    /// Get the tool schema for MCP
    pub fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Registry of the tools available to callers. Built once at startup and
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registry holding the full USAspending catalog.
    pub fn usaspending() -> Self {
        let mut registry = Self::new();
        for kind in ToolKind::ALL {
            registry.register(kind.descriptor());
        }
        registry
    }

    /// Register a tool, replacing any previous descriptor with the same name.
    pub fn register(&mut self, descriptor: ToolDescriptor) {
        match self.index.get(descriptor.name()) {
            Some(&slot) => self.tools[slot] = descriptor,
            None => {
                self.index.insert(descriptor.name(), self.tools.len());
                self.tools.push(descriptor);
            }
        }
    }

    /// Get a tool by name
    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    /// Iterate descriptors in registration order. Each call starts over.
    pub fn list(&self) -> impl Iterator<Item = &ToolDescriptor> + '_ {
        self.tools.iter()
    }

    /// List all tool schemas
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.list().map(ToolDescriptor::schema).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: Value, required: Vec<&str>) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_integer(description: &str) -> Value {
    serde_json::json!({
        "type": "integer",
        "description": description
    })
}

pub fn json_schema_array(items: Value, description: &str) -> Value {
    serde_json::json!({
        "type": "array",
        "items": items,
        "description": description
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn required(registry: &ToolRegistry, name: &str) -> BTreeSet<&'static str> {
        registry.lookup(name).unwrap().required_params().collect()
    }

    #[test]
    fn test_catalog_required_params() {
        let registry = ToolRegistry::usaspending();

        assert!(required(&registry, "GetAgencies").is_empty());
        assert_eq!(
            required(&registry, "GetSpendingAwardsByAgencyId"),
            BTreeSet::from(["agency_id", "fiscal_year"])
        );
        assert_eq!(
            required(&registry, "GetAwardInfoByAwardId"),
            BTreeSet::from(["award_id"])
        );
        assert_eq!(
            required(&registry, "SearchByKeywords"),
            BTreeSet::from(["keywords", "fiscal_year"])
        );
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = ToolRegistry::usaspending();

        assert!(registry.lookup("UnknownTool").is_none());
        assert!(registry.lookup("getagencies").is_none());
    }

    #[test]
    fn test_list_is_ordered_and_restartable() {
        let registry = ToolRegistry::usaspending();

        let first: Vec<_> = registry.list().map(|d| d.name()).collect();
        let second: Vec<_> = registry.list().map(|d| d.name()).collect();

        assert_eq!(
            first,
            vec![
                "GetAgencies",
                "GetSpendingAwardsByAgencyId",
                "GetAwardInfoByAwardId",
                "SearchByKeywords"
            ]
        );
        assert_eq!(first, second);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ToolRegistry::usaspending();
        let mut descriptor = ToolKind::GetAgencies.descriptor();
        descriptor.description = "replaced";

        registry.register(descriptor);

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.lookup("GetAgencies").unwrap().description, "replaced");
    }

    #[test]
    fn test_input_schema() {
        let registry = ToolRegistry::usaspending();
        let schema = registry.lookup("SearchByKeywords").unwrap().input_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["properties"]["keywords"]["type"], "array");
        assert_eq!(schema["properties"]["keywords"]["minItems"], 1);
        assert_eq!(schema["properties"]["fiscal_year"]["minimum"], MIN_FISCAL_YEAR);
        assert_eq!(schema["properties"]["limit"]["default"], 20);
        assert_eq!(schema["required"], serde_json::json!(["keywords", "fiscal_year"]));
    }

    #[test]
    fn test_every_tool_has_description() {
        for schema in ToolRegistry::usaspending().list_schemas() {
            assert!(!schema.description.is_empty(), "{} has no description", schema.name);
        }
    }
}
