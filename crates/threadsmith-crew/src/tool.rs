// Tool abstractions for agent capabilities
//
// A Tool is a callable capability granted to an agent at construction.
// Tool failures are hard errors: they fail the run rather than being
// reported back to the model for another attempt.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::Result;

/// JSON-schema-shaped parameter declaration, rendered into the system
/// prompt so the model knows how to call the tool.
///
/// Properties are kept ordered so the rendered schema is stable across
/// runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameters {
    /// Schema type, always "object".
    #[serde(rename = "type")]
    pub param_type: String,
    /// Declared properties, by name.
    pub properties: BTreeMap<String, PropertySpec>,
    /// Names of the properties a call must supply.
    pub required: Vec<String>,
}

/// One declared tool parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySpec {
    /// Value type ("string", "number", ...).
    #[serde(rename = "type")]
    pub property_type: String,
    /// What the parameter means, shown to the model.
    pub description: String,
}

impl ToolParameters {
    /// Creates an empty parameter schema.
    #[must_use]
    pub fn new() -> Self {
        Self { param_type: "object".to_string(), properties: BTreeMap::new(), required: Vec::new() }
    }

    /// Declares a parameter every call must supply.
    #[must_use]
    pub fn required(mut self, name: &str, property_type: &str, description: &str) -> Self {
        self.required.push(name.to_string());
        self.properties.insert(
            name.to_string(),
            PropertySpec {
                property_type: property_type.to_string(),
                description: description.to_string(),
            },
        );
        self
    }

    /// Declares a parameter calls may omit.
    #[must_use]
    pub fn optional(mut self, name: &str, property_type: &str, description: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            PropertySpec {
                property_type: property_type.to_string(),
                description: description.to_string(),
            },
        );
        self
    }
}

impl Default for ToolParameters {
    fn default() -> Self {
        Self::new()
    }
}

/// The argument object a tool call carried, as raw JSON.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    raw: Value,
}

impl ToolArguments {
    /// Wraps the argument value of one tool call.
    #[must_use]
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// Reads a string argument by key.
    #[must_use]
    pub fn string(&self, key: &str) -> Option<String> {
        self.raw.get(key)?.as_str().map(str::to_string)
    }

    /// Reads an integer argument by key.
    #[must_use]
    pub fn integer(&self, key: &str) -> Option<i64> {
        self.raw.get(key)?.as_i64()
    }

    /// The untouched argument JSON.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// What a tool invocation produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Rendered output handed back to the model.
    pub output: String,
    /// Invocation metadata (result counts and the like).
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ToolResult {
    /// Creates a result from rendered output.
    pub fn new(output: impl Into<String>) -> Self {
        Self { output: output.into(), metadata: HashMap::new() }
    }

    /// Attaches one metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Executes tool invocations.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Runs the tool against the given arguments.
    async fn execute(&self, args: &ToolArguments) -> Result<ToolResult>;
}

/// A callable capability an agent can be granted.
#[derive(Clone)]
pub struct Tool {
    /// Name the model calls the tool by.
    pub name: String,
    /// What the tool does, shown to the model.
    pub description: String,
    /// Declared parameters.
    pub parameters: ToolParameters,
    /// The implementation behind the declaration.
    pub handler: Arc<dyn ToolHandler>,
}

impl Tool {
    /// Creates a tool from its declaration and handler.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ToolParameters,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self { name: name.into(), description: description.into(), parameters, handler }
    }

    /// Invokes the tool.
    pub async fn execute(&self, args: &ToolArguments) -> Result<ToolResult> {
        self.handler.execute(args).await
    }
}

// Handlers carry no useful Debug of their own.
impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_parameters_track_required_names() {
        let params = ToolParameters::new()
            .required("query", "string", "The search query")
            .optional("limit", "number", "Result count");

        assert_eq!(params.properties.len(), 2);
        assert_eq!(params.required, vec!["query".to_string()]);
        assert_eq!(params.properties["limit"].property_type, "number");
    }

    #[test]
    fn test_tool_parameters_serialize_ordered() {
        let params = ToolParameters::new()
            .required("query", "string", "The search query")
            .optional("limit", "number", "Result count");

        // BTreeMap keeps the schema stable: limit sorts before query.
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.find("limit").unwrap() < json.find("query").unwrap());
        assert!(json.contains("\"type\":\"object\""));
    }

    #[test]
    fn test_tool_arguments_accessors() {
        let args = ToolArguments::new(serde_json::json!({
            "query": "dev burnout memes",
            "limit": 5
        }));

        assert_eq!(args.string("query"), Some("dev burnout memes".to_string()));
        assert_eq!(args.integer("limit"), Some(5));
        assert_eq!(args.string("missing"), None);
        assert!(args.raw().is_object());
    }

    #[test]
    fn test_tool_result_metadata() {
        let result = ToolResult::new("3 results").with_metadata("results", "3");

        assert_eq!(result.output, "3 results");
        assert_eq!(result.metadata.get("results"), Some(&"3".to_string()));
    }
}
