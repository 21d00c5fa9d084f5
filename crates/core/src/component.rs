//! Reusable components: property definitions, instance data validation, and
//! nesting rules.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum number of properties a component may declare.
pub const MAX_PROPERTIES: usize = 64;

/// Declared type of a component property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    /// A URL string, or an object carrying a string `src`.
    Image,
    RichText,
    /// One of the property's `options`.
    Select,
    /// Any JSON value.
    Json,
}

impl PropertyType {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Number => "number",
            PropertyType::Boolean => "boolean",
            PropertyType::Image => "image",
            PropertyType::RichText => "rich_text",
            PropertyType::Select => "select",
            PropertyType::Json => "json",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(PropertyType::String),
            "number" => Ok(PropertyType::Number),
            "boolean" => Ok(PropertyType::Boolean),
            "image" => Ok(PropertyType::Image),
            "rich_text" => Ok(PropertyType::RichText),
            "select" => Ok(PropertyType::Select),
            "json" => Ok(PropertyType::Json),
            other => Err(CoreError::Validation(format!(
                "Invalid property type '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for PropertyType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A property declaration, as submitted when defining a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    pub property_type: PropertyType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl PropertyDef {
    /// Whether `value` satisfies this property's declared type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self.property_type {
            PropertyType::String | PropertyType::RichText => value.is_string(),
            PropertyType::Number => value.is_number(),
            PropertyType::Boolean => value.is_boolean(),
            PropertyType::Image => {
                value.is_string() || value.get("src").is_some_and(Value::is_string)
            }
            PropertyType::Select => match (value.as_str(), &self.options) {
                (Some(v), Some(options)) => options.iter().any(|o| o == v),
                _ => false,
            },
            PropertyType::Json => true,
        }
    }
}

/// Validate a component's machine name: lowercase, digits, `-` and `_`.
pub fn validate_component_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() || name.len() > 100 {
        return Err(CoreError::Validation(
            "Component name must be between 1 and 100 characters".into(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(
            "Component name may contain only lowercase letters, digits, '-' and '_'".into(),
        ));
    }
    Ok(())
}

/// Validate a full property list.
pub fn validate_property_defs(defs: &[PropertyDef]) -> Result<(), CoreError> {
    if defs.len() > MAX_PROPERTIES {
        return Err(CoreError::Validation(format!(
            "A component may declare at most {MAX_PROPERTIES} properties"
        )));
    }

    let mut seen = HashSet::with_capacity(defs.len());
    for def in defs {
        if def.name.is_empty()
            || !def
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(CoreError::Validation(format!(
                "Property name '{}' must be a non-empty identifier",
                def.name
            )));
        }
        if !seen.insert(def.name.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate property '{}'",
                def.name
            )));
        }
        match (&def.property_type, &def.options) {
            (PropertyType::Select, None) => {
                return Err(CoreError::Validation(format!(
                    "Select property '{}' must declare options",
                    def.name
                )));
            }
            (PropertyType::Select, Some(options)) if options.is_empty() => {
                return Err(CoreError::Validation(format!(
                    "Select property '{}' must declare options",
                    def.name
                )));
            }
            (PropertyType::Select, Some(_)) => {}
            (_, Some(_)) => {
                return Err(CoreError::Validation(format!(
                    "Only select properties may declare options ('{}')",
                    def.name
                )));
            }
            (_, None) => {}
        }
        if let Some(default) = &def.default_value {
            if !def.accepts(default) {
                return Err(CoreError::Validation(format!(
                    "Default value of '{}' does not match type {}",
                    def.name, def.property_type
                )));
            }
        }
    }
    Ok(())
}

/// Validate instance data against a component's properties and return the
/// data with defaults filled in for absent optional properties.
pub fn validate_instance_data(
    defs: &[PropertyDef],
    data: &Value,
) -> Result<Map<String, Value>, CoreError> {
    let empty = Map::new();
    let object = match data {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            return Err(CoreError::Validation(
                "Component instance data must be a JSON object".into(),
            ))
        }
    };

    if let Some(unknown) = object.keys().find(|k| !defs.iter().any(|d| &d.name == *k)) {
        return Err(CoreError::Validation(format!(
            "Unknown property '{unknown}'"
        )));
    }

    let mut resolved = Map::with_capacity(defs.len());
    for def in defs {
        match object.get(&def.name) {
            Some(Value::Null) | None => {
                if def.required && def.default_value.is_none() {
                    return Err(CoreError::Validation(format!(
                        "Missing required property '{}'",
                        def.name
                    )));
                }
                if let Some(default) = &def.default_value {
                    resolved.insert(def.name.clone(), default.clone());
                }
            }
            Some(value) => {
                if !def.accepts(value) {
                    return Err(CoreError::Validation(format!(
                        "Property '{}' expects a {} value",
                        def.name, def.property_type
                    )));
                }
                resolved.insert(def.name.clone(), value.clone());
            }
        }
    }
    Ok(resolved)
}

/// Placement facts about a would-be parent instance.
#[derive(Debug, Clone, Copy)]
pub struct ParentPlacement {
    pub id: DbId,
    pub page_id: DbId,
    pub parent_id: Option<DbId>,
}

/// Check that an instance on `page_id` may be nested under `parent`.
///
/// The parent must live on the same page and must itself be a root
/// instance: nesting is one level deep.
pub fn validate_nesting(
    page_id: DbId,
    instance_id: Option<DbId>,
    parent: &ParentPlacement,
) -> Result<(), CoreError> {
    if instance_id == Some(parent.id) {
        return Err(CoreError::Validation(
            "A component instance cannot be its own parent".into(),
        ));
    }
    if parent.page_id != page_id {
        return Err(CoreError::Validation(
            "Parent instance belongs to a different page".into(),
        ));
    }
    if parent.parent_id.is_some() {
        return Err(CoreError::Validation(
            "Component instances may only be nested one level deep".into(),
        ));
    }
    Ok(())
}
