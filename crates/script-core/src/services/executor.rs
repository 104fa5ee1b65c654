use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ScriptServiceConfig;
use crate::error::{ScriptServiceError, ScriptServiceResult};
use crate::graphql::queries::SCRIPT_SERVICE_PROXY;
use crate::graphql::{
    authenticated_tokens_header, BuiltinQueries, GraphqlHttpClient, QueryProvider,
};

/// Runs named script service operations, either directly or through the GraphQL proxy.
#[derive(Clone)]
pub struct RequestExecutor {
    direct: GraphqlHttpClient,
    proxy: GraphqlHttpClient,
    queries: Arc<dyn QueryProvider>,
    bypass_proxy: bool,
}

impl RequestExecutor {
    /// Build an executor using the documents compiled into the crate.
    pub fn from_config(config: &ScriptServiceConfig) -> ScriptServiceResult<Self> {
        Self::with_queries(config, Arc::new(BuiltinQueries))
    }

    pub fn with_queries(
        config: &ScriptServiceConfig,
        queries: Arc<dyn QueryProvider>,
    ) -> ScriptServiceResult<Self> {
        let http = GraphqlHttpClient::build_http()?;
        let direct = GraphqlHttpClient::new(http.clone(), config.service_endpoint.clone());
        let proxy = GraphqlHttpClient::new(http, config.proxy_endpoint.clone())
            .with_bearer_token(config.proxy_token.as_deref());
        Ok(Self {
            direct,
            proxy,
            queries,
            bypass_proxy: config.bypass_proxy,
        })
    }

    /// HTTP client shared with the upload step.
    pub fn http(&self) -> &Client {
        self.direct.http()
    }

    /// Execute `operation` and return the validated response object.
    #[tracing::instrument(level = "debug", skip(self, api_key, variables))]
    pub async fn execute(
        &self,
        operation: &str,
        api_key: Option<&str>,
        variables: Value,
    ) -> ScriptServiceResult<Value> {
        if self.bypass_proxy {
            tracing::debug!(endpoint = %self.direct.endpoint(), "calling script service directly");
            self.execute_direct(operation, api_key, &variables).await
        } else {
            tracing::debug!(endpoint = %self.proxy.endpoint(), "calling script service through proxy");
            self.execute_proxied(operation, api_key, &variables).await
        }
    }

    /// Execute `operation` and deserialize its `data` member into `T`.
    pub async fn query<T>(
        &self,
        operation: &str,
        api_key: Option<&str>,
        variables: Value,
    ) -> ScriptServiceResult<T>
    where
        T: DeserializeOwned,
    {
        #[derive(Deserialize)]
        struct Envelope<T> {
            data: Option<T>,
        }

        let response = self.execute(operation, api_key, variables).await?;
        let envelope: Envelope<T> = serde_json::from_value(response)?;
        envelope.data.ok_or(ScriptServiceError::EmptyResponse)
    }

    async fn execute_direct(
        &self,
        operation: &str,
        api_key: Option<&str>,
        variables: &Value,
    ) -> ScriptServiceResult<Value> {
        let query = self.queries.load_query(operation)?;
        let headers = match api_key {
            Some(api_key) => authenticated_tokens_header(api_key)?,
            None => HeaderMap::new(),
        };
        let response = self.direct.post(&query, variables, headers).await?;
        ensure_no_errors(response)
    }

    async fn execute_proxied(
        &self,
        operation: &str,
        api_key: Option<&str>,
        variables: &Value,
    ) -> ScriptServiceResult<Value> {
        let query = self.queries.load_query(operation)?;
        let proxy_query = self.queries.load_query(SCRIPT_SERVICE_PROXY)?;
        let proxy_variables = json!({
            "api_key": api_key,
            "query": query,
            "variables": serde_json::to_string(variables)?,
        });

        let envelope = self
            .proxy
            .post(&proxy_query, &proxy_variables, HeaderMap::new())
            .await?;
        let envelope = ensure_no_errors(envelope)?;

        let inner = match envelope.pointer("/data/scriptServiceProxy") {
            Some(Value::String(raw)) => Some(serde_json::from_str::<Value>(raw)?),
            _ => None,
        };
        ensure_no_errors(inner)
    }
}

fn error_for_code(code: &str) -> Option<ScriptServiceError> {
    match code {
        "forbidden" => Some(ScriptServiceError::Forbidden),
        "forbidden_on_shop" => Some(ScriptServiceError::ShopAuthentication),
        "app_not_installed_on_shop" => Some(ScriptServiceError::AppNotInstalled),
        _ => None,
    }
}

/// Reject absent responses and responses carrying a top-level `errors` list.
pub(crate) fn ensure_no_errors(response: Option<Value>) -> ScriptServiceResult<Value> {
    let response = match response {
        None | Some(Value::Null) => return Err(ScriptServiceError::EmptyResponse),
        Some(response) => response,
    };

    match response.get("errors") {
        None | Some(Value::Null) => Ok(response),
        Some(errors) => {
            let errors = match errors {
                Value::Array(errors) => errors.clone(),
                other => vec![other.clone()],
            };
            tracing::warn!(count = errors.len(), "script service reported GraphQL errors");
            Err(classify_errors(errors))
        }
    }
}

fn classify_errors(errors: Vec<Value>) -> ScriptServiceError {
    let recognized = errors.iter().find_map(|error| {
        error
            .pointer("/extensions/code")
            .and_then(Value::as_str)
            .and_then(error_for_code)
    });
    recognized.unwrap_or(ScriptServiceError::Graphql(errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::queries::GET_APP_SCRIPTS;
    use crate::graphql::AUTHENTICATED_TOKENS_HEADER;
    use httpmock::prelude::*;

    fn executor(server: &MockServer, bypass_proxy: bool) -> RequestExecutor {
        let config = ScriptServiceConfig::with_endpoint(
            &format!("{}{}", server.base_url(), "/graphql"),
            bypass_proxy,
        )
        .unwrap();
        RequestExecutor::from_config(&config).unwrap()
    }

    fn error_with_code(code: &str) -> Value {
        json!({ "message": "denied", "extensions": { "code": code } })
    }

    #[tokio::test]
    async fn direct_call_sends_app_key_tokens() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .header(AUTHENTICATED_TOKENS_HEADER, r#"{"APP_KEY":"key-1"}"#)
                .body_contains("appScripts");
            then.status(200)
                .json_body_obj(&json!({ "data": { "appScripts": [] } }));
        });

        let response = executor(&server, true)
            .execute(GET_APP_SCRIPTS, Some("key-1"), json!({}))
            .await
            .unwrap();
        mock.assert();
        assert_eq!(response["data"]["appScripts"], json!([]));
    }

    #[tokio::test]
    async fn empty_response_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).body("null");
        });

        let err = executor(&server, true)
            .execute(GET_APP_SCRIPTS, None, json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptServiceError::EmptyResponse));
    }

    #[tokio::test]
    async fn recognized_error_codes_map_to_typed_errors() {
        let cases: [(&str, fn(&ScriptServiceError) -> bool); 4] = [
            ("forbidden", |e| matches!(e, ScriptServiceError::Forbidden)),
            ("forbidden_on_shop", |e| {
                matches!(e, ScriptServiceError::ShopAuthentication)
            }),
            ("app_not_installed_on_shop", |e| {
                matches!(e, ScriptServiceError::AppNotInstalled)
            }),
            ("internal_error", |e| {
                matches!(e, ScriptServiceError::Graphql(errors) if errors.len() == 1)
            }),
        ];

        for (code, expected) in cases {
            let server = MockServer::start();
            server.mock(|when, then| {
                when.method(POST).path("/graphql");
                then.status(200)
                    .json_body_obj(&json!({ "errors": [error_with_code(code)] }));
            });

            let err = executor(&server, true)
                .execute(GET_APP_SCRIPTS, None, json!({}))
                .await
                .unwrap_err();
            assert!(expected(&err), "code {code} produced {err:?}");
        }
    }

    #[test]
    fn first_recognized_code_in_list_order_wins() {
        let err = ensure_no_errors(Some(json!({
            "errors": [
                { "message": "no code" },
                error_with_code("something_else"),
                error_with_code("app_not_installed_on_shop"),
                error_with_code("forbidden"),
            ]
        })))
        .unwrap_err();
        assert!(matches!(err, ScriptServiceError::AppNotInstalled));
    }

    #[test]
    fn unrecognized_errors_keep_raw_list() {
        let errors = vec![json!({ "message": "boom" }), error_with_code("other")];
        let err = ensure_no_errors(Some(json!({ "errors": errors.clone() }))).unwrap_err();
        match err {
            ScriptServiceError::Graphql(raw) => assert_eq!(raw, errors),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn proxy_unwraps_inner_payload() {
        let server = MockServer::start();
        let inner = json!({ "data": { "appScripts": [{ "uuid": "uuid-1" }] } }).to_string();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains("scriptServiceProxy")
                .body_contains("appScripts")
                .body_contains(r#"\"appKey\":\"key-1\""#);
            then.status(200)
                .json_body_obj(&json!({ "data": { "scriptServiceProxy": inner } }));
        });

        let response = executor(&server, false)
            .execute(GET_APP_SCRIPTS, Some("key-1"), json!({ "appKey": "key-1" }))
            .await
            .unwrap();
        mock.assert();
        assert_eq!(response["data"]["appScripts"][0]["uuid"], "uuid-1");
    }

    #[tokio::test]
    async fn proxy_envelope_errors_are_classified() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200)
                .json_body_obj(&json!({ "errors": [error_with_code("forbidden")] }));
        });

        let err = executor(&server, false)
            .execute(GET_APP_SCRIPTS, None, json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptServiceError::Forbidden));
    }

    #[tokio::test]
    async fn proxy_inner_errors_are_classified() {
        let server = MockServer::start();
        let inner = json!({ "errors": [error_with_code("forbidden_on_shop")] }).to_string();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200)
                .json_body_obj(&json!({ "data": { "scriptServiceProxy": inner } }));
        });

        let err = executor(&server, false)
            .execute(GET_APP_SCRIPTS, None, json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptServiceError::ShopAuthentication));
    }

    #[tokio::test]
    async fn proxy_without_inner_payload_is_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200)
                .json_body_obj(&json!({ "data": { "scriptServiceProxy": null } }));
        });

        let err = executor(&server, false)
            .execute(GET_APP_SCRIPTS, None, json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptServiceError::EmptyResponse));
    }
}
