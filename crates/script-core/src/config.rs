use thiserror::Error;
use url::Url;

use crate::env::Environment;

pub const DEFAULT_SERVICE_ENDPOINT: &str = "https://script-service.shopifycloud.com/graphql";
pub const DEFAULT_PROXY_ENDPOINT: &str = "https://partners.shopify.com/api/cli/graphql";

pub const SERVICE_URL_VAR: &str = "SCRIPT_SERVICE_URL";
pub const PROXY_URL_VAR: &str = "SCRIPT_SERVICE_PROXY_URL";
pub const BYPASS_PROXY_VAR: &str = "SCRIPT_SERVICE_BYPASS_PROXY";
pub const PROXY_TOKEN_VAR: &str = "SCRIPT_SERVICE_PROXY_TOKEN";

/// Connection settings for the script service and the proxy in front of it.
#[derive(Debug, Clone)]
pub struct ScriptServiceConfig {
    /// Endpoint used when talking to the script service directly.
    pub service_endpoint: Url,
    /// Endpoint of the GraphQL proxy wrapping script service operations.
    pub proxy_endpoint: Url,
    /// Skip the proxy and call the service endpoint directly.
    pub bypass_proxy: bool,
    /// Bearer token sent to the proxy endpoint.
    pub proxy_token: Option<String>,
}

impl ScriptServiceConfig {
    /// Build the configuration from environment variables, falling back to defaults.
    pub fn from_env(env: &dyn Environment) -> Result<Self, ConfigError> {
        let service_endpoint = endpoint(env, SERVICE_URL_VAR, DEFAULT_SERVICE_ENDPOINT)?;
        let proxy_endpoint = endpoint(env, PROXY_URL_VAR, DEFAULT_PROXY_ENDPOINT)?;
        let proxy_token = env
            .var(PROXY_TOKEN_VAR)
            .filter(|token| !token.trim().is_empty());

        Ok(Self {
            service_endpoint,
            proxy_endpoint,
            bypass_proxy: env.flag(BYPASS_PROXY_VAR),
            proxy_token,
        })
    }

    /// Point both transports at the same base endpoint (useful for testing).
    pub fn with_endpoint(endpoint: &str, bypass_proxy: bool) -> Result<Self, ConfigError> {
        let url = Url::parse(endpoint).map_err(|source| ConfigError::InvalidEndpoint {
            var: "endpoint",
            source,
        })?;
        Ok(Self {
            service_endpoint: url.clone(),
            proxy_endpoint: url,
            bypass_proxy,
            proxy_token: None,
        })
    }
}

fn endpoint(env: &dyn Environment, var: &'static str, default: &str) -> Result<Url, ConfigError> {
    let raw = env.var(var).unwrap_or_else(|| default.to_owned());
    Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidEndpoint { var, source })
}

/// Errors raised while assembling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid endpoint in {var}: {source}")]
    InvalidEndpoint {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
}
