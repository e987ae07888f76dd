//! Azure Key Vault integration tests.
//!
//! These tests need a real vault and a service principal that may list and
//! read its secrets. Provide them through the same variables the step uses:
//!
//!   INPUT_CLIENT_ID, INPUT_CLIENT_SECRET, INPUT_TENANT_ID, INPUT_KEYVAULT_NAME
//!
//! and name one existing secret in AZURE_TEST_SECRET_NAME. Run with:
//!   cargo test --test integration_azure -- --ignored

#![cfg(feature = "azure")]

use futures::TryStreamExt;
use keyvault_export::backends::azure::AzureKeyVaultStore;
use keyvault_export::names::env_var_name;
use keyvault_export::{run, CapturedCommands, ErrorKind, Inputs, RunOutcome, Runner, SecretStore};
use tempfile::TempDir;

fn live_inputs(dir: &TempDir, secret_names: &str) -> Inputs {
    let mut inputs = Inputs::from_env();
    inputs.secret_names = Some(secret_names.to_string());
    inputs.env_file = Some(dir.path().join("env"));
    inputs.output_file = Some(dir.path().join("output"));
    inputs
}

fn test_secret_name() -> String {
    std::env::var("AZURE_TEST_SECRET_NAME").expect("AZURE_TEST_SECRET_NAME must be set")
}

#[tokio::test]
#[ignore] // Run only when a vault is available
async fn test_azure_list_contains_test_secret() {
    let dir = TempDir::new().unwrap();
    let config = live_inputs(&dir, "*").validate().expect("live inputs");
    let store = AzureKeyVaultStore::connect(&config).expect("connect");

    let names: Vec<String> = store.list_secret_names().try_collect().await.expect("list");
    assert!(names.contains(&test_secret_name()));
}

#[tokio::test]
#[ignore] // Run only when a vault is available
async fn test_azure_export_single_secret() {
    let dir = TempDir::new().unwrap();
    let name = test_secret_name();
    let inputs = live_inputs(&dir, &name);

    let commands = CapturedCommands::new();
    let mut runner = Runner::for_inputs(&inputs, commands.clone());
    let outcome = run(inputs, &mut runner, |config| async move {
        AzureKeyVaultStore::connect(&config)
    })
    .await;

    assert!(outcome.is_success(), "run failed: {}", commands.contents());
    let env = std::fs::read_to_string(dir.path().join("env")).unwrap();
    assert!(env.starts_with(&format!("{}=", env_var_name(&name))));
}

#[tokio::test]
#[ignore] // Run only when a vault is available
async fn test_azure_missing_secret_fails() {
    let dir = TempDir::new().unwrap();
    let inputs = live_inputs(&dir, "keyvault-export-does-not-exist");

    let mut runner = Runner::for_inputs(&inputs, CapturedCommands::new());
    let outcome = run(inputs, &mut runner, |config| async move {
        AzureKeyVaultStore::connect(&config)
    })
    .await;

    assert!(matches!(outcome, RunOutcome::Failed(ErrorKind::Fetch)));
    assert!(!dir.path().join("env").exists());
}
