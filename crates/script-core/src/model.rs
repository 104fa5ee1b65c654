use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema and encoding details describing a compiled script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptMetadata {
    pub schema_major_version: String,
    pub schema_minor_version: String,
    pub uses_binary_encoding: bool,
}

impl ScriptMetadata {
    pub fn new(
        schema_major_version: impl ToString,
        schema_minor_version: impl ToString,
        uses_binary_encoding: bool,
    ) -> Self {
        Self {
            schema_major_version: schema_major_version.to_string(),
            schema_minor_version: schema_minor_version.to_string(),
            uses_binary_encoding,
        }
    }
}

/// Configuration UI document shipped alongside a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigUi {
    pub filename: String,
    pub content: String,
}

impl ConfigUi {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Read a configuration UI document from disk, keeping the path as its filename.
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Ok(Self::new(path.display().to_string(), content))
    }
}

/// Definition of the settings a script exposes to merchants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub schema: Vec<ConfigurationField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationField {
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for ConfigurationDefinition {
    fn default() -> Self {
        Self {
            kind: "single".into(),
            schema: vec![ConfigurationField {
                key: "stylePrefix".into(),
                name: "Style prefix".into(),
                kind: "single_line_text_field".into(),
            }],
        }
    }
}

impl ConfigurationDefinition {
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Everything needed to push one compiled script.
#[derive(Debug, Clone)]
pub struct PushRequest {
    /// Identifier of a previously registered script, if this is a re-push.
    pub uuid: Option<String>,
    pub extension_point_type: String,
    pub script_name: String,
    pub script_content: Vec<u8>,
    pub api_key: Option<String>,
    /// Replace an existing script with the same identity.
    pub force: bool,
    pub metadata: ScriptMetadata,
    pub config_ui: Option<ConfigUi>,
    pub configuration_definition: ConfigurationDefinition,
}

impl PushRequest {
    pub fn new(
        extension_point_type: impl Into<String>,
        script_name: impl Into<String>,
        script_content: impl Into<Vec<u8>>,
        metadata: ScriptMetadata,
    ) -> Self {
        Self {
            uuid: None,
            extension_point_type: extension_point_type.into(),
            script_name: script_name.into(),
            script_content: script_content.into(),
            api_key: None,
            force: false,
            metadata,
            config_ui: None,
            configuration_definition: ConfigurationDefinition::default(),
        }
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_config_ui(mut self, config_ui: ConfigUi) -> Self {
        self.config_ui = Some(config_ui);
        self
    }

    pub fn with_configuration_definition(mut self, definition: ConfigurationDefinition) -> Self {
        self.configuration_definition = definition;
        self
    }
}

/// Script record as stored by the script service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredScript {
    pub uuid: String,
    #[serde(default)]
    pub extension_point_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub app_key: Option<String>,
    #[serde(default)]
    pub config_schema: Option<Value>,
}

/// Application-level validation failure reported alongside a mutation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub message: String,
    /// Input path the error refers to, as reported by the server.
    #[serde(default)]
    pub field: Option<Value>,
    #[serde(default)]
    pub tag: Option<String>,
}

impl UserError {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag.as_deref() == Some(tag)
    }

    /// Typed view of a raw user error; `None` when the entry is not an object of the expected shape.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}
