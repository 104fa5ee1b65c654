use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ScriptServiceError, ScriptServiceResult};
use crate::graphql::queries::MODULE_UPLOAD_URL_GENERATE;

use super::RequestExecutor;

const WASM_CONTENT_TYPE: &str = "application/wasm";

/// Obtains a single-use upload URL and PUTs the compiled script to it.
#[derive(Clone)]
pub struct UploadScript {
    executor: RequestExecutor,
}

impl UploadScript {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    /// Upload `content` and return the URL it was stored at.
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = content.len()))]
    pub async fn call(&self, api_key: Option<&str>, content: &[u8]) -> ScriptServiceResult<String> {
        let url = self.generate_upload_url(api_key).await?;
        self.upload(&url, content).await?;
        Ok(url)
    }

    async fn generate_upload_url(&self, api_key: Option<&str>) -> ScriptServiceResult<String> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct UploadUrlEnvelope {
            module_upload_url_generate: UploadUrlPayload,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct UploadUrlPayload {
            url: Option<String>,
            #[serde(default)]
            user_errors: Vec<Value>,
        }

        let data: UploadUrlEnvelope = self
            .executor
            .query(MODULE_UPLOAD_URL_GENERATE, api_key, json!({}))
            .await?;
        let payload = data.module_upload_url_generate;

        if !payload.user_errors.is_empty() {
            tracing::warn!(
                count = payload.user_errors.len(),
                "upload URL generation returned user errors"
            );
            return Err(ScriptServiceError::Graphql(payload.user_errors));
        }

        payload.url.ok_or(ScriptServiceError::EmptyResponse)
    }

    async fn upload(&self, url: &str, content: &[u8]) -> ScriptServiceResult<()> {
        let response = self
            .executor
            .http()
            .put(url)
            .header(CONTENT_TYPE, WASM_CONTENT_TYPE)
            .body(content.to_vec())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(%status, "script upload rejected");
            return Err(ScriptServiceError::ScriptUpload { status });
        }
        tracing::debug!("script uploaded");
        Ok(())
    }
}
