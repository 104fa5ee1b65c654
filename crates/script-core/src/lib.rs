//! Client adapter for pushing compiled scripts to the script service and listing registered ones.
//!
//! Requests go either straight to the service or through a GraphQL proxy that wraps the
//! real operation as a JSON string, depending on [`config::ScriptServiceConfig::bypass_proxy`].

pub mod config;
pub mod env;
pub mod error;
pub mod graphql;
pub mod model;
pub mod services;

pub use config::{ConfigError, ScriptServiceConfig};
pub use env::{Environment, MapEnvironment, SystemEnvironment};
pub use error::{ScriptServiceError, ScriptServiceResult};
pub use model::{
    ConfigUi, ConfigurationDefinition, ConfigurationField, PushRequest, RegisteredScript,
    ScriptMetadata, UserError,
};
pub use services::{RequestExecutor, ScriptService, UploadScript};
