//! Static credentials sourced from configuration at startup.

use syncbridge_core::CredentialsProvider;
use syncbridge_domain::{Credentials, ExternalSystem, Result, SyncBridgeConfig};

/// Serves the per-system credentials loaded with the application config.
#[derive(Debug, Clone)]
pub struct StaticCredentialsProvider {
    erp: Credentials,
    crm: Credentials,
}

impl StaticCredentialsProvider {
    #[must_use]
    pub fn new(erp: Credentials, crm: Credentials) -> Self {
        Self { erp, crm }
    }

    #[must_use]
    pub fn from_config(config: &SyncBridgeConfig) -> Self {
        Self::new(config.erp.credentials.clone(), config.crm.credentials.clone())
    }
}

impl CredentialsProvider for StaticCredentialsProvider {
    fn credentials(&self, system: ExternalSystem) -> Result<Credentials> {
        Ok(match system {
            ExternalSystem::Erp => self.erp.clone(),
            ExternalSystem::Crm => self.crm.clone(),
        })
    }
}
