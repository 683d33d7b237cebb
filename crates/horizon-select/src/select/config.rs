//! Configuration for a selectable collection.

use serde::{Deserialize, Serialize};

use super::allowed::AllowedChildren;

/// Default marker attribute.
pub const DEFAULT_ATTRIBUTE_FOR_SELECTED: &str = "selected";

/// Errors loading a [`SelectConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON document could not be read.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// The TOML document could not be read.
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// An `allowed_children` pattern does not compile.
    #[error("invalid allowed_children pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Options for a [`SelectController`](super::SelectController).
///
/// Every field has a default, so configuration files only need to name
/// what they change. Field names are also accepted in camelCase.
///
/// # Example
///
/// ```
/// use horizon_select::select::{AllowedChildren, SelectConfig};
///
/// let config = SelectConfig::from_toml_str(r#"
///     allowed_children = ["x-option"]
///     multi = true
/// "#).unwrap();
///
/// assert!(config.multi);
/// assert_eq!(config.allowed_children, AllowedChildren::tags(["x-option"]));
/// assert_eq!(config.attribute_for_selected, "selected");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectConfig {
    /// Which children become items.
    #[serde(alias = "allowedChildren")]
    pub allowed_children: AllowedChildren,
    /// Allow several items to be selected at once.
    pub multi: bool,
    /// Attribute whose presence marks an item as selected.
    #[serde(alias = "attributeForSelected")]
    pub attribute_for_selected: String,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            allowed_children: AllowedChildren::default(),
            multi: false,
            attribute_for_selected: DEFAULT_ATTRIBUTE_FOR_SELECTED.to_string(),
        }
    }
}

impl SelectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allowed_children(mut self, allowed_children: AllowedChildren) -> Self {
        self.allowed_children = allowed_children;
        self
    }

    pub fn with_multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn with_attribute_for_selected(mut self, attribute: impl Into<String>) -> Self {
        self.attribute_for_selected = attribute.into();
        self
    }

    /// Read a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration from TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
