mod executor;
mod lookup;
mod push;
mod upload;

pub use executor::RequestExecutor;
pub use upload::UploadScript;

use crate::config::ScriptServiceConfig;
use crate::env::Environment;
use crate::error::ScriptServiceResult;

/// Higher-level operations against the script service.
#[derive(Clone)]
pub struct ScriptService {
    executor: RequestExecutor,
    uploader: UploadScript,
}

impl ScriptService {
    pub fn new(executor: RequestExecutor) -> Self {
        let uploader = UploadScript::new(executor.clone());
        Self { executor, uploader }
    }

    pub fn from_config(config: &ScriptServiceConfig) -> ScriptServiceResult<Self> {
        Ok(Self::new(RequestExecutor::from_config(config)?))
    }

    /// Build a service from `SCRIPT_SERVICE_*` environment variables.
    pub fn from_env(env: &dyn Environment) -> ScriptServiceResult<Self> {
        let config = ScriptServiceConfig::from_env(env)?;
        Self::from_config(&config)
    }

    pub fn uploader(&self) -> &UploadScript {
        &self.uploader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BYPASS_PROXY_VAR;
    use crate::env::MapEnvironment;
    use crate::error::ScriptServiceError;

    #[test]
    fn from_env_surfaces_config_errors() {
        let env = MapEnvironment::new()
            .with(BYPASS_PROXY_VAR, "1")
            .with("SCRIPT_SERVICE_URL", "::not-a-url::");
        let err = ScriptService::from_env(&env).err().unwrap();
        assert!(matches!(err, ScriptServiceError::Config(_)));
    }
}
