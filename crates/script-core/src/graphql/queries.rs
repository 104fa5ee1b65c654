//! GraphQL documents used by the script service adapter, looked up by name.

use std::borrow::Cow;

use crate::error::{ScriptServiceError, ScriptServiceResult};

pub const SCRIPT_SERVICE_PROXY: &str = "script_service_proxy";
pub const MODULE_UPLOAD_URL_GENERATE: &str = "module_upload_url_generate";
pub const APP_SCRIPT_SET: &str = "app_script_set";
pub const GET_APP_SCRIPTS: &str = "get_app_scripts";

/// Source of GraphQL document text keyed by operation name.
pub trait QueryProvider: Send + Sync {
    fn load_query(&self, name: &str) -> ScriptServiceResult<Cow<'_, str>>;
}

/// Documents compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinQueries;

impl QueryProvider for BuiltinQueries {
    fn load_query(&self, name: &str) -> ScriptServiceResult<Cow<'_, str>> {
        let document = match name {
            SCRIPT_SERVICE_PROXY => PROXY_QUERY,
            MODULE_UPLOAD_URL_GENERATE => UPLOAD_URL_QUERY,
            APP_SCRIPT_SET => APP_SCRIPT_SET_QUERY,
            GET_APP_SCRIPTS => GET_APP_SCRIPTS_QUERY,
            other => return Err(ScriptServiceError::UnknownQuery(other.to_owned())),
        };
        Ok(Cow::Borrowed(document))
    }
}

const PROXY_QUERY: &str = r#"
    query ProxyRequest($api_key: String, $query: String!, $variables: String) {
        scriptServiceProxy(apiKey: $api_key, query: $query, variables: $variables)
    }
"#;

const UPLOAD_URL_QUERY: &str = r#"
    mutation ModuleUploadUrlGenerate {
        moduleUploadUrlGenerate {
            url
            userErrors { field message tag }
        }
    }
"#;

const APP_SCRIPT_SET_QUERY: &str = r#"
    mutation AppScriptSet(
        $uuid: String
        $extensionPointName: ExtensionPointName!
        $title: String
        $force: Boolean
        $schemaMajorVersion: String
        $schemaMinorVersion: String
        $scriptJsonVersion: String!
        $configurationUi: Boolean!
        $configurationDefinition: String!
        $moduleUploadUrl: String!
    ) {
        appScriptSet(
            uuidToUpdate: $uuid
            extensionPointName: $extensionPointName
            title: $title
            force: $force
            schemaMajorVersion: $schemaMajorVersion
            schemaMinorVersion: $schemaMinorVersion
            scriptJsonVersion: $scriptJsonVersion
            configurationUi: $configurationUi
            configurationDefinition: $configurationDefinition
            moduleUploadUrl: $moduleUploadUrl
        ) {
            userErrors { field message tag }
            appScript { uuid appKey configSchema extensionPointName title }
        }
    }
"#;

const GET_APP_SCRIPTS_QUERY: &str = r#"
    query GetAppScripts($appKey: String!, $extensionPointName: ExtensionPointName!) {
        appScripts(appKey: $appKey, extensionPointName: $extensionPointName) {
            uuid
            appKey
            configSchema
            extensionPointName
            title
        }
    }
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_known_documents() {
        let queries = BuiltinQueries;
        for name in [
            SCRIPT_SERVICE_PROXY,
            MODULE_UPLOAD_URL_GENERATE,
            APP_SCRIPT_SET,
            GET_APP_SCRIPTS,
        ] {
            assert!(!queries.load_query(name).unwrap().trim().is_empty());
        }
        assert!(queries
            .load_query(APP_SCRIPT_SET)
            .unwrap()
            .contains("appScriptSet"));
    }

    #[test]
    fn unknown_document_fails() {
        let err = BuiltinQueries.load_query("nope").unwrap_err();
        assert!(matches!(err, ScriptServiceError::UnknownQuery(name) if name == "nope"));
    }
}
