//! Secret store trait definition.
//!
//! This module defines the [`SecretStore`] trait that every vault integration
//! satisfies. An export run needs exactly two things from a store: the names
//! of everything it holds, and the current value of one secret by name.

use crate::{Result, SecretRecord};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;

/// A remote store of named secrets.
///
/// Implementations must be `Send + Sync` so a store can be shared with the
/// async runtime.
///
/// # Implementations
///
/// - **SDK-based**: Azure Key Vault (`azure` feature)
/// - **Testing**: in-memory mock with fault injection (`mock` feature)
///
/// # Example
///
/// ```
/// # #[cfg(not(feature = "mock"))]
/// # fn main() {}
/// # #[cfg(feature = "mock")]
/// #[tokio::main]
/// async fn main() -> keyvault_export::Result<()> {
///     use futures::TryStreamExt;
///     use keyvault_export::backends::mock::MockStore;
///     use keyvault_export::SecretStore;
///
///     let store = MockStore::new().with_secret("api-key", "sk-123");
///
///     let names: Vec<String> = store.list_secret_names().try_collect().await?;
///     assert_eq!(names, vec!["api-key"]);
///
///     let secret = store.get_secret("api-key").await?;
///     assert_eq!(secret.value, "sk-123");
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the store name (e.g. "azurekeyvault", "mock").
    fn name(&self) -> &str;

    /// Lists the names of every secret visible to the credential.
    ///
    /// The stream is lazy and yields names in the store's listing order.
    /// Pages are requested as the stream is polled; there is no count limit.
    ///
    /// # Errors
    ///
    /// Items are [`ExportError::Enumerate`](crate::ExportError::Enumerate)
    /// when a page cannot be fetched.
    fn list_secret_names(&self) -> BoxStream<'_, Result<String>>;

    /// Fetches the latest version of a secret.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Fetch`](crate::ExportError::Fetch) if the
    /// secret does not exist, access is denied, or the request fails.
    async fn get_secret(&self, name: &str) -> Result<SecretRecord>;
}

#[async_trait]
impl<T: SecretStore + ?Sized> SecretStore for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn list_secret_names(&self) -> BoxStream<'_, Result<String>> {
        (**self).list_secret_names()
    }

    async fn get_secret(&self, name: &str) -> Result<SecretRecord> {
        (**self).get_secret(name).await
    }
}
