//! Provider shell: validates provider configuration and hands a typed, configured client to
//! the resource and data source.
//!
//! The client is an explicit `Arc<C>` dependency. Nothing is stored globally and nothing is
//! downcast at runtime: a [`ConfiguredProvider<C>`] can only be built around a `C` that
//! implements [`PeopleClient`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::contract::PeopleClient;
use crate::data_source::PersonDataSource;
use crate::diagnostics::Diagnostic;
use crate::resource::{PersonResource, TYPE_SUFFIX};
use crate::schema::{
    person_data_source_schema, person_resource_schema, provider_schema, Schema,
};

pub const PROVIDER_TYPE_NAME: &str = "apiserver";

/// Provider block of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderMetadata {
    pub type_name: &'static str,
    pub version: String,
    pub resources: Vec<String>,
    pub data_sources: Vec<String>,
}

/// All schemas the provider declares, keyed the way a host would address them.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSchemas {
    pub provider: Schema,
    pub resources: Vec<(String, Schema)>,
    pub data_sources: Vec<(String, Schema)>,
}

/// `version` is the crate version on release builds, "dev" locally and "test" under test.
#[derive(Debug, Clone)]
pub struct Provider {
    version: String,
}

impl Provider {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn person_type_name(&self) -> String {
        format!("{PROVIDER_TYPE_NAME}{TYPE_SUFFIX}")
    }

    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE_NAME,
            version: self.version.clone(),
            resources: vec![self.person_type_name()],
            data_sources: vec![self.person_type_name()],
        }
    }

    pub fn schemas(&self) -> ProviderSchemas {
        ProviderSchemas {
            provider: provider_schema(),
            resources: vec![(self.person_type_name(), person_resource_schema())],
            data_sources: vec![(self.person_type_name(), person_data_source_schema())],
        }
    }

    /// Validate `config` and build the client with `connect`.
    ///
    /// A missing or blank endpoint, or a `connect` failure, is a configuration diagnostic:
    /// no entity operation may run afterwards.
    pub fn configure<C, F, E>(
        &self,
        config: &ProviderConfig,
        connect: F,
    ) -> Result<ConfiguredProvider<C>, Diagnostic>
    where
        C: PeopleClient,
        F: FnOnce(&str) -> Result<C, E>,
        E: fmt::Display,
    {
        let endpoint = match config.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => endpoint,
            _ => {
                error!("Provider endpoint is missing");
                return Err(Diagnostic::configuration(
                    "Missing api-server endpoint",
                    "The provider cannot create the api-server client because the endpoint is \
                     not set. Set `provider.endpoint` in the configuration or APISERVER_ENDPOINT \
                     in the environment.",
                ));
            }
        };

        let client = connect(endpoint).map_err(|e| {
            error!(error = %e, endpoint, "Unable to create api-server client");
            Diagnostic::configuration("Unable to create api-server client", e.to_string())
        })?;

        info!(endpoint, version = %self.version, "Configured api-server provider");
        Ok(ConfiguredProvider {
            client: Arc::new(client),
        })
    }
}

/// A provider with a live client, shared read-only by every operation.
pub struct ConfiguredProvider<C> {
    client: Arc<C>,
}

impl<C> ConfiguredProvider<C>
where
    C: PeopleClient,
{
    pub fn from_client(client: Arc<C>) -> Self {
        Self { client }
    }

    pub fn person_resource(&self) -> PersonResource<C> {
        PersonResource::new(Arc::clone(&self.client))
    }

    pub fn person_data_source(&self) -> PersonDataSource<C> {
        PersonDataSource::new(Arc::clone(&self.client))
    }
}
