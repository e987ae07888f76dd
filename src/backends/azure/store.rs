//! Azure Key Vault store implementation.

use crate::{ExportConfig, ExportError, Result, SecretRecord, SecretStore};
use async_trait::async_trait;
use azure_core::Url;
use azure_identity::ClientSecretCredential;
use azure_security_keyvault::SecretClient;
use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;

/// Microsoft Entra authority for the public cloud.
const AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Azure Key Vault store.
///
/// Integrates with Azure Key Vault using the official Microsoft SDK.
pub struct AzureKeyVaultStore {
    client: SecretClient,
    vault_url: String,
}

impl AzureKeyVaultStore {
    /// Builds the service principal credential and a secret client bound to
    /// the configured vault.
    ///
    /// No request is sent here; an invalid tenant or secret surfaces on the
    /// first listing or fetch.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Credential`] if the authority URL or the vault
    /// URL is rejected by the SDK.
    pub fn connect(config: &ExportConfig) -> Result<Self> {
        let vault_url = config.vault_url();

        let authority_host =
            Url::parse(AUTHORITY_HOST).map_err(|e| ExportError::Credential(e.to_string()))?;

        let credential = Arc::new(ClientSecretCredential::new(
            azure_core::new_http_client(),
            authority_host,
            config.tenant_id.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        ));

        let client = SecretClient::new(&vault_url, credential)
            .map_err(|e| ExportError::Credential(e.to_string()))?;

        tracing::debug!(vault_url = %vault_url, tenant_id = %config.tenant_id, "created Key Vault secret client");

        Ok(Self { client, vault_url })
    }

    /// Returns the vault endpoint this store talks to.
    pub fn vault_url(&self) -> &str {
        &self.vault_url
    }
}

/// Extracts the secret name from a secret identifier URL.
///
/// Identifiers look like `https://<vault>/secrets/<name>[/<version>]`.
fn secret_name_from_id(id: &str) -> Option<&str> {
    let mut segments = id.split('/').skip_while(|segment| *segment != "secrets");
    segments.next()?;
    segments.next().filter(|name| !name.is_empty())
}

#[async_trait]
impl SecretStore for AzureKeyVaultStore {
    fn name(&self) -> &str {
        "azurekeyvault"
    }

    fn list_secret_names(&self) -> BoxStream<'_, Result<String>> {
        tracing::debug!(vault_url = %self.vault_url, "listing secrets");

        self.client
            .list_secrets()
            .into_stream()
            .map_err(|e| ExportError::Enumerate(e.to_string()))
            .map_ok(|page| {
                let names: Vec<String> = page
                    .value
                    .iter()
                    .filter_map(|secret| secret_name_from_id(&secret.id))
                    .map(str::to_string)
                    .collect();
                tracing::trace!(count = names.len(), "received secret listing page");
                stream::iter(names.into_iter().map(Ok::<_, ExportError>))
            })
            .try_flatten()
            .boxed()
    }

    async fn get_secret(&self, name: &str) -> Result<SecretRecord> {
        tracing::debug!(secret = %name, "fetching secret");

        let secret = self
            .client
            .get(name)
            .await
            .map_err(|e| ExportError::fetch(name, e))?;

        Ok(SecretRecord::new(name, secret.value))
    }
}
