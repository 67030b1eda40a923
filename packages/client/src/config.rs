//! Environment-driven configuration for the platform client.

use crate::error::{PlatformError, PlatformResult};
use std::env;

const DEFAULT_LOGIN_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Connection settings for the downstream platform.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub project: String,
    pub pipeline_external_id: String,
    pub dataset_external_id: Option<String>,
    pub token_url: Option<String>,
}

impl PlatformConfig {
    /// Read the configuration from environment variables.
    pub fn from_env() -> PlatformResult<Self> {
        Ok(Self {
            tenant_id: required("TENANT_ID")?,
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            base_url: required("BASE_URL")?,
            project: required("PROJECT")?,
            pipeline_external_id: required("PIPELINE_EXTERNAL_ID")?,
            dataset_external_id: env::var("DATASET_EXTERNAL_ID").ok(),
            token_url: env::var("TOKEN_URL").ok(),
        })
    }

    /// The OAuth token endpoint, derived from the tenant unless overridden.
    pub fn token_endpoint(&self) -> String {
        self.token_url.clone().unwrap_or_else(|| {
            format!(
                "{}/{}/oauth2/v2.0/token",
                DEFAULT_LOGIN_AUTHORITY, self.tenant_id
            )
        })
    }

    /// The scope requested for client-credentials tokens.
    pub fn token_scope(&self) -> String {
        format!("{}/.default", self.base_url.trim_end_matches('/'))
    }

    /// Root of the project-scoped API routes.
    pub fn api_root(&self) -> String {
        format!(
            "{}/api/v1/projects/{}",
            self.base_url.trim_end_matches('/'),
            self.project
        )
    }
}

fn required(name: &str) -> PlatformResult<String> {
    env::var(name).map_err(|_| PlatformError::Config(format!("{} not set", name)))
}
