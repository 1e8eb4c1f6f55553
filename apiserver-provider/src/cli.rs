///
/// This module implements the CLI interface for apiserver-provider: command parsing,
/// provider configuration and user-visible output.
///
/// All reconciliation logic (models, resource operations, apply driver) lives in the
/// [`apiserver-provider-core`] crate. This module is strictly CLI glue.
///
/// ## Features
/// - Entry struct [`Cli`] defines all subcommands (see [`Commands`]).
/// - Async entrypoint ([`run`]) for programmatic invocation and integration testing.
/// - Per-entity diagnostics are printed to stderr; any error diagnostic makes the command fail
///   after the state file has been written.
///
/// [`apiserver-provider-core`]: ../../apiserver-provider-core/
use crate::client::HttpPeopleClient;
use crate::load_config::{env_only_config, load_config, CliConfig};
use anyhow::{Context, Result};
use apiserver_provider_core::apply::{apply, destroy, import, refresh, ApplyReport};
use apiserver_provider_core::model::PersonDataSourceModel;
use apiserver_provider_core::provider::{
    ConfiguredProvider, Provider, ProviderMetadata, ProviderSchemas,
};
use apiserver_provider_core::state::State;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_STATE_FILE: &str = "apiserver.tfstate.json";

/// CLI for apiserver-provider: manage api-server people declaratively.
#[derive(Parser)]
#[clap(
    name = "apiserver-provider",
    version,
    about = "Reconcile declared api-server people against the remote service"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create, update, replace or delete people so the service matches the config file
    Apply {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Path to the JSON state file
        #[clap(long, default_value = DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
    /// Re-read every tracked person from the service into the state file
    Refresh {
        #[clap(long)]
        config: PathBuf,
        #[clap(long, default_value = DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
    /// Delete every tracked person
    Destroy {
        #[clap(long)]
        config: PathBuf,
        #[clap(long, default_value = DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
    /// Start tracking an existing person under ADDRESS
    Import {
        #[clap(long)]
        config: PathBuf,
        #[clap(long, default_value = DEFAULT_STATE_FILE)]
        state: PathBuf,
        /// Resource address to track the person under
        address: String,
        /// Identifier of the existing person
        id: String,
    },
    /// Look up a single person by id and print it as JSON
    Lookup {
        /// Optional YAML config file; APISERVER_ENDPOINT is used otherwise
        #[clap(long)]
        config: Option<PathBuf>,
        #[clap(long)]
        id: String,
    },
    /// Print provider, resource and data source schemas as JSON
    Schema,
}

#[derive(Serialize)]
struct SchemaOutput {
    metadata: ProviderMetadata,
    schemas: ProviderSchemas,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");
    let provider = Provider::new(env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Schema => {
            let output = SchemaOutput {
                metadata: provider.metadata(),
                schemas: provider.schemas(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Commands::Lookup { config, id } => {
            let config = match config {
                Some(path) => load_config(path)?,
                None => env_only_config(),
            };
            let configured = configure(&provider, &config)?;
            let data = configured
                .person_data_source()
                .read(PersonDataSourceModel::lookup(id))
                .await
                .map_err(|d| {
                    tracing::error!(command = "lookup", error = %d, "Lookup failed");
                    anyhow::Error::new(d)
                })?;
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        Commands::Apply { config, state } => {
            let config = load_config(config)?;
            let configured = configure(&provider, &config)?;
            let mut known = load_state(&state)?;
            tracing::info!(command = "apply", "Starting apply");
            let report = apply(&configured, &config.desired_state(), &mut known).await;
            save_state(&known, &state)?;
            finish(&provider, "apply", &report)
        }
        Commands::Refresh { config, state } => {
            let config = load_config(config)?;
            let configured = configure(&provider, &config)?;
            let mut known = load_state(&state)?;
            let report = refresh(&configured, &mut known).await;
            save_state(&known, &state)?;
            finish(&provider, "refresh", &report)
        }
        Commands::Destroy { config, state } => {
            let config = load_config(config)?;
            let configured = configure(&provider, &config)?;
            let mut known = load_state(&state)?;
            let report = destroy(&configured, &mut known).await;
            save_state(&known, &state)?;
            finish(&provider, "destroy", &report)
        }
        Commands::Import {
            config,
            state,
            address,
            id,
        } => {
            let config = load_config(config)?;
            let configured = configure(&provider, &config)?;
            let mut known = load_state(&state)?;
            let imported = import(&configured, &mut known, &address, &id)
                .await
                .map_err(|d| {
                    tracing::error!(command = "import", %address, error = %d, "Import failed");
                    anyhow::Error::new(d)
                })?;
            save_state(&known, &state)?;
            println!("{}", serde_json::to_string_pretty(&imported)?);
            Ok(())
        }
    }
}

fn configure(
    provider: &Provider,
    config: &CliConfig,
) -> Result<ConfiguredProvider<HttpPeopleClient>> {
    provider
        .configure(&config.provider, HttpPeopleClient::new)
        .map_err(|d| {
            eprintln!("Error: {}\n\n{}", d.summary(), d.detail());
            anyhow::Error::new(d)
        })
}

fn load_state(path: &Path) -> Result<State> {
    State::load(path).with_context(|| format!("Failed to load state from {path:?}"))
}

fn save_state(state: &State, path: &Path) -> Result<()> {
    state
        .save(path)
        .with_context(|| format!("Failed to save state to {path:?}"))
}

fn finish(provider: &Provider, command: &str, report: &ApplyReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    if report.diagnostics.is_empty() {
        tracing::info!(command, "Command complete");
        return Ok(());
    }

    for entry in report.diagnostics.iter() {
        eprintln!(
            "Error: {}\n\n  with {}\n{}\n",
            entry.diagnostic.summary(),
            qualified_address(provider, &entry.address),
            entry.diagnostic.detail()
        );
    }

    if report.has_errors() {
        tracing::error!(
            command,
            failures = report.diagnostics.len(),
            "Command finished with errors"
        );
        anyhow::bail!(
            "{command} finished with {} failed operation(s)",
            report.diagnostics.len()
        );
    }
    tracing::info!(command, "Command complete");
    Ok(())
}

/// Report addresses carry a `data.` prefix for data sources.
fn qualified_address(provider: &Provider, address: &str) -> String {
    let person = provider.person_type_name();
    match address.strip_prefix("data.") {
        Some(name) => format!("data.{person}.{name}"),
        None => format!("{person}.{address}"),
    }
}
