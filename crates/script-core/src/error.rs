use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by the script service adapter.
#[derive(Debug, Error)]
pub enum ScriptServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status} body: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("invalid GraphQL endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("failed to (de)serialize payload: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("api key cannot be sent as an HTTP header value")]
    InvalidApiKey,
    #[error("no GraphQL document named '{0}'")]
    UnknownQuery(String),
    #[error("script service returned an empty response")]
    EmptyResponse,
    #[error("access to the script service was forbidden")]
    Forbidden,
    #[error("not authorized to act on this shop")]
    ShopAuthentication,
    #[error("the app is not installed on this shop")]
    AppNotInstalled,
    #[error("GraphQL returned errors: {0:?}")]
    Graphql(Vec<Value>),
    #[error("script {} already exists; push again with force to replace it", display_uuid(.uuid))]
    ScriptRepush { uuid: Option<String> },
    #[error("configuration UI {} has a syntax error", display_filename(.filename))]
    ConfigUiSyntax { filename: Option<String> },
    #[error("configuration UI {} is missing keys: {message}", display_filename(.filename))]
    ConfigUiMissingKeys {
        filename: Option<String>,
        message: String,
    },
    #[error("configuration UI {} has an invalid input mode: {message}", display_filename(.filename))]
    ConfigUiInvalidInputMode {
        filename: Option<String>,
        message: String,
    },
    #[error("configuration UI {} has fields missing keys: {message}", display_filename(.filename))]
    ConfigUiFieldsMissingKeys {
        filename: Option<String>,
        message: String,
    },
    #[error("configuration UI {} has fields of an invalid type: {message}", display_filename(.filename))]
    ConfigUiFieldsInvalidType {
        filename: Option<String>,
        message: String,
    },
    #[error("script metadata was rejected (encoding mode or schema version)")]
    MetadataValidation,
    #[error("script upload failed with status {status}")]
    ScriptUpload { status: StatusCode },
}

pub type ScriptServiceResult<T> = Result<T, ScriptServiceError>;

fn display_uuid(uuid: &Option<String>) -> &str {
    uuid.as_deref().unwrap_or("<new>")
}

fn display_filename(filename: &Option<String>) -> &str {
    filename.as_deref().unwrap_or("<unknown>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_ui_syntax_message_names_file_without_assuming_format() {
        let err = ScriptServiceError::ConfigUiSyntax {
            filename: Some("config-ui.yml".into()),
        };
        assert_eq!(
            err.to_string(),
            "configuration UI config-ui.yml has a syntax error"
        );

        let err = ScriptServiceError::ConfigUiSyntax { filename: None };
        assert_eq!(err.to_string(), "configuration UI <unknown> has a syntax error");
    }
}
