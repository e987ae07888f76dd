//! Secret export workflow.
//!
//! An export run resolves the selected secret names, then fetches and
//! publishes each one in order. The first fault stops the run; anything
//! already published stays published.

use crate::names::env_var_name;
use crate::{ErrorKind, ExportConfig, Inputs, Result, Runner, SecretSelection, SecretStore};
use futures::TryStreamExt;
use std::collections::HashMap;
use std::future::Future;

/// One secret that was published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedSecret {
    /// Secret name, also the output name
    pub name: String,
    /// Environment variable the value was exported as
    pub env_name: String,
}

/// Summary of a finished export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Published secrets, in publish order
    pub exported: Vec<ExportedSecret>,
}

impl ExportReport {
    /// Returns true when nothing was published.
    pub fn is_empty(&self) -> bool {
        self.exported.is_empty()
    }

    /// Environment variable names that were written more than once.
    ///
    /// Distinct secret names can sanitize to the same variable; the line
    /// written last is the one later steps see.
    pub fn collisions(&self) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order = Vec::new();
        for secret in &self.exported {
            let count = counts.entry(secret.env_name.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                order.push(secret.env_name.clone());
            }
        }
        order
    }
}

/// Exports secrets from a store through a runner.
pub struct SecretExporter<S> {
    store: S,
}

impl<S: SecretStore> SecretExporter<S> {
    /// Creates an exporter over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves a selection into an ordered list of secret names.
    ///
    /// Wildcard mode walks the store's full listing; an explicit list is
    /// returned as is.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Enumerate`](crate::ExportError::Enumerate) if
    /// the listing fails.
    pub async fn resolve_names(&self, selection: &SecretSelection) -> Result<Vec<String>> {
        match selection {
            SecretSelection::All => self.store.list_secret_names().try_collect().await,
            SecretSelection::Named(names) => Ok(names.clone()),
        }
    }

    /// Resolves `selection` and publishes every secret through `runner`.
    ///
    /// For each name, in order: fetch the current value, mask it, set the
    /// step output under the exact name, append `UR73FAC_<NAME>=<value>` to
    /// the env file and log the export. An empty selection logs a warning
    /// and succeeds.
    ///
    /// # Errors
    ///
    /// Returns the first listing, fetch or sink error. Secrets published
    /// before the error are not rolled back.
    pub async fn export(
        &self,
        selection: &SecretSelection,
        runner: &mut Runner,
    ) -> Result<ExportReport> {
        if selection.is_all() {
            runner.info("Reading ALL secrets from Key Vault")?;
        }

        let names = self.resolve_names(selection).await?;
        tracing::debug!(store = self.store.name(), count = names.len(), "resolved secret names");

        if names.is_empty() {
            runner.warning("No secrets found to process")?;
            return Ok(ExportReport::default());
        }

        let mut report = ExportReport::default();
        for name in names {
            let secret = self.store.get_secret(&name).await?;
            let env_name = env_var_name(&name);

            runner.add_mask(&secret.value)?;
            runner.set_output(&name, &secret.value).await?;
            runner.export_env_line(&env_name, &secret.value).await?;
            runner.info(&format!("Secret \"{name}\" exported as {env_name}"))?;

            report.exported.push(ExportedSecret { name, env_name });
        }

        for env_name in report.collisions() {
            tracing::debug!(env_name = %env_name, "environment variable written more than once");
        }

        Ok(report)
    }
}

/// Result of a complete run.
#[derive(Debug)]
pub enum RunOutcome {
    /// The run finished; the report may be empty.
    Succeeded(ExportReport),
    /// The run stopped at a fault, already reported to the runner.
    Failed(ErrorKind),
}

impl RunOutcome {
    /// Returns true for [`RunOutcome::Succeeded`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Runs a complete export with a single error boundary.
///
/// Inputs are validated before `connect` is called, so a missing input never
/// reaches the network. Any fault is reported through
/// [`Runner::set_failed`] with the fault's message and returned as
/// [`RunOutcome::Failed`].
pub async fn run<S, C, Fut>(inputs: Inputs, runner: &mut Runner, connect: C) -> RunOutcome
where
    S: SecretStore,
    C: FnOnce(ExportConfig) -> Fut,
    Fut: Future<Output = Result<S>>,
{
    match connect_and_export(inputs, runner, connect).await {
        Ok(report) => RunOutcome::Succeeded(report),
        Err(e) => {
            tracing::debug!(error = %e, kind = ?e.kind(), "export failed");
            runner.set_failed(&e.to_string());
            RunOutcome::Failed(e.kind())
        }
    }
}

async fn connect_and_export<S, C, Fut>(
    inputs: Inputs,
    runner: &mut Runner,
    connect: C,
) -> Result<ExportReport>
where
    S: SecretStore,
    C: FnOnce(ExportConfig) -> Fut,
    Fut: Future<Output = Result<S>>,
{
    let config = inputs.validate()?;
    let selection = config.selection.clone();

    let store = connect(config).await?;
    SecretExporter::new(store).export(&selection, runner).await
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::backends::mock::MockStore;
    use crate::{CapturedCommands, ExportError};
    use tempfile::TempDir;

    fn exporter(store: MockStore) -> SecretExporter<MockStore> {
        SecretExporter::new(store)
    }

    fn runner(dir: &TempDir) -> (Runner, CapturedCommands) {
        let commands = CapturedCommands::new();
        let runner = Runner::from_parts(
            dir.path().join("env"),
            Some(dir.path().join("output")),
            commands.clone(),
        );
        (runner, commands)
    }

    #[tokio::test]
    async fn test_resolve_explicit_skips_store() {
        let exporter = exporter(MockStore::new().with_secret("a", "1"));
        let names = exporter
            .resolve_names(&SecretSelection::parse("b, a"))
            .await
            .unwrap();

        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(exporter.store().list_calls(), 0);
    }

    #[tokio::test]
    async fn test_resolve_wildcard_uses_listing_order() {
        let store = MockStore::new()
            .with_secret("zeta", "1")
            .with_secret("alpha", "2")
            .with_secret("mid", "3")
            .with_page_size(1);
        let exporter = exporter(store);

        let names = exporter.resolve_names(&SecretSelection::All).await.unwrap();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn test_export_logs_wildcard_and_each_secret() {
        let dir = TempDir::new().unwrap();
        let (mut runner, commands) = runner(&dir);
        let exporter = exporter(MockStore::new().with_secret("db-host", "10.0.0.5"));

        let report = exporter.export(&SecretSelection::All, &mut runner).await.unwrap();

        assert_eq!(
            report.exported,
            vec![ExportedSecret {
                name: "db-host".into(),
                env_name: "UR73FAC_DB_HOST".into(),
            }]
        );
        let log = commands.contents();
        assert!(log.starts_with("Reading ALL secrets from Key Vault\n"));
        assert!(log.contains("::add-mask::10.0.0.5\n"));
        assert!(log.contains("Secret \"db-host\" exported as UR73FAC_DB_HOST\n"));
    }

    #[tokio::test]
    async fn test_enumerate_error_aborts_before_fetch() {
        let dir = TempDir::new().unwrap();
        let (mut runner, _) = runner(&dir);
        let exporter = exporter(MockStore::new().with_secret("a", "1").with_list_error("Forbidden"));

        let err = exporter.export(&SecretSelection::All, &mut runner).await.unwrap_err();

        assert!(matches!(err, ExportError::Enumerate(_)));
        assert_eq!(exporter.store().fetch_calls(), 0);
        assert!(!dir.path().join("env").exists());
    }

    #[test]
    fn test_collisions() {
        let report = ExportReport {
            exported: vec![
                ExportedSecret { name: "My.Key".into(), env_name: "UR73FAC_MY_KEY".into() },
                ExportedSecret { name: "other".into(), env_name: "UR73FAC_OTHER".into() },
                ExportedSecret { name: "MY_KEY".into(), env_name: "UR73FAC_MY_KEY".into() },
                ExportedSecret { name: "my-key".into(), env_name: "UR73FAC_MY_KEY".into() },
            ],
        };

        assert_eq!(report.collisions(), vec!["UR73FAC_MY_KEY"]);
        assert!(ExportReport::default().collisions().is_empty());
    }
}
