use serde::Deserialize;
use serde_json::json;

use crate::error::ScriptServiceResult;
use crate::graphql::queries::GET_APP_SCRIPTS;
use crate::model::RegisteredScript;

use super::ScriptService;

impl ScriptService {
    /// Scripts previously registered for `api_key` on the given extension point.
    #[tracing::instrument(level = "debug", skip(self, api_key))]
    pub async fn get_app_scripts(
        &self,
        api_key: &str,
        extension_point_type: &str,
    ) -> ScriptServiceResult<Vec<RegisteredScript>> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct AppScriptsEnvelope {
            #[serde(default)]
            app_scripts: Option<Vec<RegisteredScript>>,
        }

        let variables = json!({
            "appKey": api_key,
            "extensionPointName": extension_point_type.to_uppercase(),
        });
        let data: AppScriptsEnvelope = self
            .executor
            .query(GET_APP_SCRIPTS, Some(api_key), variables)
            .await?;
        Ok(data.app_scripts.unwrap_or_default())
    }
}
