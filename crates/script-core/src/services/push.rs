use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ScriptServiceError, ScriptServiceResult};
use crate::graphql::queries::APP_SCRIPT_SET;
use crate::model::{ConfigUi, PushRequest, RegisteredScript, UserError};

use super::ScriptService;

const SCRIPT_JSON_VERSION: &str = "1";

/// Outcome selected for a rejected registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Repush,
    ConfigUiSyntax,
    ConfigUiMissingKeys,
    ConfigUiInvalidInputMode,
    ConfigUiFieldsMissingKeys,
    ConfigUiFieldsInvalidType,
    Metadata,
}

/// Evaluated top to bottom; the first rule with a matching tag anywhere in the list wins.
const REJECTION_RULES: &[(&[&str], Rejection)] = &[
    (&["already_exists_error"], Rejection::Repush),
    (&["config_ui_syntax_error"], Rejection::ConfigUiSyntax),
    (&["config_ui_missing_keys_error"], Rejection::ConfigUiMissingKeys),
    (
        &["config_ui_invalid_input_mode_error"],
        Rejection::ConfigUiInvalidInputMode,
    ),
    (
        &["config_ui_fields_missing_keys_error"],
        Rejection::ConfigUiFieldsMissingKeys,
    ),
    (
        &["config_ui_fields_invalid_type_error"],
        Rejection::ConfigUiFieldsInvalidType,
    ),
    (
        &["not_use_msgpack_error", "schema_version_argument_error"],
        Rejection::Metadata,
    ),
];

impl ScriptService {
    /// Upload and register a script, returning its identifier.
    pub async fn push(&self, request: &PushRequest) -> ScriptServiceResult<String> {
        Ok(self.register(request).await?.uuid)
    }

    /// Upload and register a script, returning the full record stored by the service.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(
            uuid = request.uuid.as_deref(),
            extension_point = %request.extension_point_type,
            force = request.force,
        )
    )]
    pub async fn register(&self, request: &PushRequest) -> ScriptServiceResult<RegisteredScript> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct AppScriptSetEnvelope {
            app_script_set: AppScriptSetPayload,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct AppScriptSetPayload {
            app_script: Option<RegisteredScript>,
            #[serde(default)]
            user_errors: Vec<Value>,
        }

        let api_key = request.api_key.as_deref();
        let upload_url = self
            .uploader
            .call(api_key, &request.script_content)
            .await?;

        let variables = registration_variables(request, &upload_url)?;
        let data: AppScriptSetEnvelope = self
            .executor
            .query(APP_SCRIPT_SET, api_key, variables)
            .await?;
        let payload = data.app_script_set;

        if !payload.user_errors.is_empty() {
            tracing::warn!(
                count = payload.user_errors.len(),
                "script registration returned user errors"
            );
            return Err(classify_user_errors(
                &payload.user_errors,
                request.uuid.as_deref(),
                request.config_ui.as_ref(),
            ));
        }

        let script = payload.app_script.ok_or(ScriptServiceError::EmptyResponse)?;
        tracing::debug!(uuid = %script.uuid, "script registered");
        Ok(script)
    }
}

fn registration_variables(request: &PushRequest, upload_url: &str) -> ScriptServiceResult<Value> {
    Ok(json!({
        "uuid": request.uuid,
        "extensionPointName": request.extension_point_type.to_uppercase(),
        "title": request.script_name,
        "force": request.force,
        "schemaMajorVersion": request.metadata.schema_major_version,
        "schemaMinorVersion": request.metadata.schema_minor_version,
        "scriptJsonVersion": SCRIPT_JSON_VERSION,
        "configurationUi": true,
        "configurationDefinition": request.configuration_definition.to_json_string()?,
        "moduleUploadUrl": upload_url,
    }))
}

fn classify_user_errors(
    user_errors: &[Value],
    uuid: Option<&str>,
    config_ui: Option<&ConfigUi>,
) -> ScriptServiceError {
    let filename = config_ui.map(|config_ui| config_ui.filename.clone());
    let typed: Vec<UserError> = user_errors.iter().filter_map(UserError::from_value).collect();

    for (tags, rejection) in REJECTION_RULES {
        let Some(error) = typed
            .iter()
            .find(|error| tags.iter().any(|tag| error.has_tag(tag)))
        else {
            continue;
        };
        let message = error.message.clone();
        return match rejection {
            Rejection::Repush => ScriptServiceError::ScriptRepush {
                uuid: uuid.map(str::to_owned),
            },
            Rejection::ConfigUiSyntax => ScriptServiceError::ConfigUiSyntax { filename },
            Rejection::ConfigUiMissingKeys => {
                ScriptServiceError::ConfigUiMissingKeys { filename, message }
            }
            Rejection::ConfigUiInvalidInputMode => {
                ScriptServiceError::ConfigUiInvalidInputMode { filename, message }
            }
            Rejection::ConfigUiFieldsMissingKeys => {
                ScriptServiceError::ConfigUiFieldsMissingKeys { filename, message }
            }
            Rejection::ConfigUiFieldsInvalidType => {
                ScriptServiceError::ConfigUiFieldsInvalidType { filename, message }
            }
            Rejection::Metadata => ScriptServiceError::MetadataValidation,
        };
    }

    ScriptServiceError::Graphql(user_errors.to_vec())
}
