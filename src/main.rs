use clap::Parser;
use keyvault_export::backends::azure::AzureKeyVaultStore;
use keyvault_export::{run, Inputs, RunOutcome, Runner};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Read Azure Key Vault secrets and republish them as step outputs and
/// environment variables.
///
/// Every option falls back to the variable the runner sets for the step.
#[derive(Debug, Parser)]
#[command(name = "keyvault-export", version, about)]
struct Cli {
    /// Service principal application id
    #[arg(long, env = "INPUT_CLIENT_ID")]
    client_id: Option<String>,

    /// Service principal secret
    #[arg(long, env = "INPUT_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Directory (tenant) id
    #[arg(long, env = "INPUT_TENANT_ID")]
    tenant_id: Option<String>,

    /// Short Key Vault name
    #[arg(long, env = "INPUT_KEYVAULT_NAME")]
    keyvault_name: Option<String>,

    /// `*` for every secret, or a comma separated list of names
    #[arg(long, env = "INPUT_SECRET_NAMES")]
    secret_names: Option<String>,

    /// File that propagates environment variables to later steps
    #[arg(long, env = "GITHUB_ENV")]
    env_file: Option<PathBuf>,

    /// File that collects step outputs
    #[arg(long, env = "GITHUB_OUTPUT")]
    output_file: Option<PathBuf>,
}

impl From<Cli> for Inputs {
    fn from(cli: Cli) -> Self {
        Self {
            client_id: cli.client_id,
            client_secret: cli.client_secret,
            tenant_id: cli.tenant_id,
            keyvault_name: cli.keyvault_name,
            secret_names: cli.secret_names,
            env_file: cli.env_file,
            output_file: cli.output_file,
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(false);

    tracing_subscriber::registry().with(env_filter).with(layer).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let inputs = Inputs::from(Cli::parse());
    tracing::debug!(?inputs, "starting export");

    let mut runner = Runner::for_inputs(&inputs, io::stdout());
    let outcome = run(inputs, &mut runner, |config| async move {
        AzureKeyVaultStore::connect(&config)
    })
    .await;

    match outcome {
        RunOutcome::Succeeded(report) => {
            tracing::info!(exported = report.exported.len(), "export finished");
            ExitCode::SUCCESS
        }
        RunOutcome::Failed(kind) => {
            tracing::info!(?kind, "export failed");
            ExitCode::FAILURE
        }
    }
}
