use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use crate::error::{ScriptServiceError, ScriptServiceResult};

const USER_AGENT: &str = "script-core/0.1.0";

/// Header carrying the JSON token map expected by the script service.
pub const AUTHENTICATED_TOKENS_HEADER: &str = "x-authenticated-tokens";

/// Build the `{"APP_KEY": ...}` token header used on the direct service path.
pub fn authenticated_tokens_header(api_key: &str) -> ScriptServiceResult<HeaderMap> {
    let tokens = json!({ "APP_KEY": api_key }).to_string();
    let value = HeaderValue::from_str(&tokens).map_err(|_| ScriptServiceError::InvalidApiKey)?;
    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(AUTHENTICATED_TOKENS_HEADER), value);
    Ok(headers)
}

/// Minimal GraphQL-over-HTTP client bound to a single endpoint.
#[derive(Debug, Clone)]
pub struct GraphqlHttpClient {
    http: Client,
    endpoint: Url,
    auth_header: Option<String>,
}

impl GraphqlHttpClient {
    /// Shared HTTP client used for GraphQL calls and script uploads.
    pub fn build_http() -> ScriptServiceResult<Client> {
        Ok(Client::builder().user_agent(USER_AGENT).build()?)
    }

    pub fn new(http: Client, endpoint: Url) -> Self {
        Self {
            http,
            endpoint,
            auth_header: None,
        }
    }

    /// Build a client for `endpoint` parsed from a string (useful for testing).
    pub fn with_endpoint(endpoint: &str) -> ScriptServiceResult<Self> {
        let endpoint = Url::parse(endpoint)?;
        Ok(Self::new(Self::build_http()?, endpoint))
    }

    pub fn with_bearer_token(mut self, token: Option<&str>) -> Self {
        self.auth_header = token.map(|token| format!("Bearer {token}"));
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// POST a GraphQL document; `None` means the server sent back nothing usable.
    pub async fn post(
        &self,
        query: &str,
        variables: &Value,
        headers: HeaderMap,
    ) -> ScriptServiceResult<Option<Value>> {
        #[derive(Serialize)]
        struct RequestBody<'a> {
            query: &'a str,
            variables: &'a Value,
        }

        let mut request = self
            .http
            .post(self.endpoint.clone())
            .headers(headers)
            .json(&RequestBody { query, variables });
        if let Some(auth_header) = &self.auth_header {
            request = request.header(AUTHORIZATION, auth_header);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ScriptServiceError::HttpStatus { status, body: text });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Null => Ok(None),
            payload => Ok(Some(payload)),
        }
    }
}
