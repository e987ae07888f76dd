//! Azure Key Vault store.
//!
//! This store reads secrets with the Azure SDK for Rust. It authenticates as a
//! service principal with the client id, client secret and tenant id from the
//! run configuration, against the public cloud authority.
//!
//! # Configuration
//!
//! - `tenant_id`, `client_id`, `client_secret`: service principal credentials
//! - `keyvault_name`: short vault name, resolved to `https://<name>.vault.azure.net`
//!
//! # Example
//!
//! ```no_run
//! use keyvault_export::backends::azure::AzureKeyVaultStore;
//! use keyvault_export::ExportConfig;
//!
//! let config = ExportConfig::new("tenant", "app-id", "secret", "myvault", "/tmp/env");
//! let store = AzureKeyVaultStore::connect(&config)?;
//! # Ok::<(), keyvault_export::ExportError>(())
//! ```

mod store;

pub use store::AzureKeyVaultStore;
