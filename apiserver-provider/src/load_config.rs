/// `load_config` module: Loads the YAML provider configuration and maps it onto the
/// strongly-typed desired state of `apiserver-provider-core`.
///
/// # Responsibilities
/// - Parse the user-supplied YAML file (`provider`, `resources`, `data` sections)
/// - Inject `APISERVER_ENDPOINT` from the environment, overriding `provider.endpoint`
/// - Surface every load failure as an `anyhow::Error` with the offending path
///
/// Endpoint validation is not done here: a missing endpoint is reported by
/// `Provider::configure` as a configuration diagnostic.
use anyhow::Result;
use apiserver_provider_core::apply::DesiredState;
use apiserver_provider_core::model::{PersonDataSourceModel, PersonResourceModel};
use apiserver_provider_core::provider::ProviderConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const ENDPOINT_ENV: &str = "APISERVER_ENDPOINT";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub resources: BTreeMap<String, PersonBlock>,
    #[serde(default)]
    pub data: BTreeMap<String, LookupBlock>,
}

/// Desired attributes of one `apiserver_person` resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonBlock {
    pub name: String,
    pub age: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// One `apiserver_person` data source.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupBlock {
    pub id: IdValue,
}

/// Ids may be written as YAML integers or strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Int(i64),
    Str(String),
}

impl IdValue {
    pub fn as_string(&self) -> String {
        match self {
            IdValue::Int(i) => i.to_string(),
            IdValue::Str(s) => s.clone(),
        }
    }
}

impl CliConfig {
    pub fn desired_state(&self) -> DesiredState {
        DesiredState {
            resources: self
                .resources
                .iter()
                .map(|(address, block)| {
                    (
                        address.clone(),
                        PersonResourceModel::planned(
                            block.name.clone(),
                            block.age,
                            block.description.clone(),
                        ),
                    )
                })
                .collect(),
            data: self
                .data
                .iter()
                .map(|(address, lookup)| {
                    (
                        address.clone(),
                        PersonDataSourceModel::lookup(lookup.id.as_string()),
                    )
                })
                .collect(),
        }
    }
}

/// Loads the YAML config at `path` and applies environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let mut config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    apply_env_overrides(&mut config);

    info!(
        resources = config.resources.len(),
        data_sources = config.data.len(),
        endpoint_set = config.provider.endpoint.is_some(),
        "Config loaded successfully"
    );
    Ok(config)
}

/// Provider settings from the environment only, for commands that take no config file.
pub fn env_only_config() -> CliConfig {
    let mut config = CliConfig::default();
    apply_env_overrides(&mut config);
    config
}

fn apply_env_overrides(config: &mut CliConfig) {
    if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
        if !endpoint.trim().is_empty() {
            info!(env = ENDPOINT_ENV, "Endpoint taken from environment");
            config.provider.endpoint = Some(endpoint);
        }
    }
}
