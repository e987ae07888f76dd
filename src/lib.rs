//! keyvault-export - republish Azure Key Vault secrets to a CI pipeline.
//!
//! A single pipeline step authenticates as a service principal, reads one or
//! more secrets from a Key Vault and hands each value to later steps twice:
//! as a step output named after the secret, and as an environment variable
//! line `UR73FAC_<NAME>=<value>` appended to the runner's env file.
//!
//! # Features
//!
//! - **Wildcard or explicit selection**: `*` exports every secret in the
//!   vault, otherwise a comma separated list is exported in order
//! - **Store abstraction**: the vault sits behind the [`SecretStore`] trait
//! - **Typed faults**: every failure is an [`ExportError`] with an [`ErrorKind`]
//! - **Feature Flags**: the Azure SDK and the mock store are optional
//!
//! # Quick Start
//!
//! ```
//! # #[cfg(not(feature = "mock"))]
//! # fn main() {}
//! # #[cfg(feature = "mock")]
//! #[tokio::main]
//! async fn main() {
//!     use keyvault_export::backends::mock::MockStore;
//!     use keyvault_export::{run, CapturedCommands, Inputs, Runner};
//!
//!     let inputs = Inputs {
//!         client_id: Some("app-id".into()),
//!         client_secret: Some("secret".into()),
//!         tenant_id: Some("tenant".into()),
//!         keyvault_name: Some("myvault".into()),
//!         secret_names: Some("*".into()),
//!         ..Default::default()
//!     };
//!     let commands = CapturedCommands::new();
//!     let mut runner = Runner::for_inputs(&inputs, commands.clone());
//!
//!     // An empty vault exports nothing and still succeeds.
//!     let outcome = run(inputs, &mut runner, |_config| async { Ok(MockStore::new()) }).await;
//!
//!     assert!(outcome.is_success());
//!     assert!(commands.contents().contains("No secrets found to process"));
//! }
//! ```
//!
//! The binary does the same with `backends::azure::AzureKeyVaultStore` in
//! place of the mock store (`azure` feature).
//!
//! # Feature Flags
//!
//! | Feature | Default | Notes |
//! |---------|---------|-------|
//! | `azure` | yes | Azure Key Vault store, required by the binary |
//! | `mock` | yes | In-memory store with fault injection |

pub mod backends;
pub mod config;
pub mod error;
pub mod exporter;
pub mod names;
pub mod runner;
pub mod secret;
pub mod store;

pub use config::{ExportConfig, Inputs};
pub use error::{ErrorKind, ExportError, Result};
pub use exporter::{run, ExportReport, ExportedSecret, RunOutcome, SecretExporter};
pub use names::SecretSelection;
pub use runner::{CapturedCommands, Runner};
pub use secret::SecretRecord;
pub use store::SecretStore;
