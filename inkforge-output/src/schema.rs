//! Response schema hints.
//!
//! The Generative Language API accepts a `responseSchema` describing the
//! JSON shape the model must produce (type names are upper-case in the
//! wire format: `OBJECT`, `STRING`, `ARRAY`, ...). Call sites build these
//! with [`SchemaBuilder`] rather than hand-writing JSON.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

/// A finished response schema, ready to embed in a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResponseSchema(JsonValue);

impl ResponseSchema {
    /// Wrap a raw schema value.
    ///
    /// Prefer [`SchemaBuilder`]; this exists for the rare shape the
    /// builder does not cover.
    #[must_use]
    pub fn from_value(value: JsonValue) -> Self {
        Self(value)
    }

    /// The schema as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> &JsonValue {
        &self.0
    }

    /// A schema describing an array of the given element schema.
    #[must_use]
    pub fn array_of(element: ResponseSchema) -> Self {
        Self(json!({
            "type": "ARRAY",
            "items": element.0,
        }))
    }
}

/// Fluent builder for object response schemas.
///
/// Property order is preserved, since the upstream model tends to fill
/// fields in schema order.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    properties: IndexMap<String, JsonValue>,
    required: Vec<String>,
    description: Option<String>,
}

impl SchemaBuilder {
    /// Start building an object schema.
    #[must_use]
    pub fn object() -> Self {
        Self::default()
    }

    /// Set the object description.
    #[must_use]
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Add a string property.
    #[must_use]
    pub fn string(mut self, name: &str, desc: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            json!({ "type": "STRING", "description": desc }),
        );
        self
    }

    /// Add an integer property.
    #[must_use]
    pub fn integer(mut self, name: &str, desc: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            json!({ "type": "INTEGER", "description": desc }),
        );
        self
    }

    /// Add a number property.
    #[must_use]
    pub fn number(mut self, name: &str, desc: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            json!({ "type": "NUMBER", "description": desc }),
        );
        self
    }

    /// Add a boolean property.
    #[must_use]
    pub fn boolean(mut self, name: &str, desc: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            json!({ "type": "BOOLEAN", "description": desc }),
        );
        self
    }

    /// Add a string property constrained to a fixed set of values.
    #[must_use]
    pub fn enum_values(mut self, name: &str, desc: &str, values: &[&str]) -> Self {
        self.properties.insert(
            name.to_string(),
            json!({ "type": "STRING", "description": desc, "enum": values }),
        );
        self
    }

    /// Add an array-of-strings property.
    #[must_use]
    pub fn array_of_strings(mut self, name: &str, desc: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            json!({
                "type": "ARRAY",
                "description": desc,
                "items": { "type": "STRING" },
            }),
        );
        self
    }

    /// Add an array property with arbitrary element schema.
    #[must_use]
    pub fn array_of(mut self, name: &str, desc: &str, element: ResponseSchema) -> Self {
        self.properties.insert(
            name.to_string(),
            json!({
                "type": "ARRAY",
                "description": desc,
                "items": element.to_value(),
            }),
        );
        self
    }

    /// Add a nested object property.
    #[must_use]
    pub fn nested(mut self, name: &str, schema: ResponseSchema) -> Self {
        self.properties
            .insert(name.to_string(), schema.to_value().clone());
        self
    }

    /// Mark properties as required.
    #[must_use]
    pub fn require<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// Finish the schema.
    #[must_use]
    pub fn build(self) -> ResponseSchema {
        let mut schema = serde_json::Map::new();
        schema.insert("type".into(), json!("OBJECT"));
        if let Some(desc) = self.description {
            schema.insert("description".into(), json!(desc));
        }
        schema.insert(
            "properties".into(),
            JsonValue::Object(self.properties.into_iter().collect()),
        );
        if !self.required.is_empty() {
            schema.insert("required".into(), json!(self.required));
        }
        ResponseSchema(JsonValue::Object(schema))
    }
}
