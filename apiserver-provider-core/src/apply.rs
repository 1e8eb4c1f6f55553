//! Orchestration: walks desired state against persisted state and drives the reconciler.
//!
//! This module is the host side of the provider. For every desired resource address it
//! decides between create, refresh, in-place update and replacement; addresses that are only
//! present in state are deleted. Data-source lookups run after all resources.
//!
//! # Responsibilities
//! - Serial, one entity at a time; the client is shared read-only.
//! - A diagnostic for one entity never stops the run: it is recorded in the
//!   [`ApplyReport`] and the next entity is processed.
//! - State is only mutated for operations that succeeded. Persisting it is the caller's job.
//!
//! # Navigation
//! - Main entrypoint: [`apply`]
//! - Also: [`refresh`], [`destroy`], [`import`]

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::contract::PeopleClient;
use crate::diagnostics::{Diagnostic, Diagnostics, Operation};
use crate::model::{PersonDataSourceModel, PersonResourceModel};
use crate::provider::ConfiguredProvider;
use crate::state::State;

/// Everything the configuration asks for.
#[derive(Debug, Clone, Default)]
pub struct DesiredState {
    pub resources: BTreeMap<String, PersonResourceModel>,
    pub data: BTreeMap<String, PersonDataSourceModel>,
}

/// Outcome of one run, by address.
#[derive(Debug, Default, Serialize)]
pub struct ApplyReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub replaced: Vec<String>,
    pub deleted: Vec<String>,
    pub refreshed: Vec<String>,
    pub unchanged: Vec<String>,
    pub data: BTreeMap<String, PersonDataSourceModel>,
    #[serde(skip)]
    pub diagnostics: Diagnostics,
}

impl ApplyReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_error()
    }

    fn fail(&mut self, address: &str, diagnostic: Diagnostic) {
        error!(address, error = %diagnostic, "[APPLY][ERROR] Operation failed");
        self.diagnostics.push(address, diagnostic);
    }
}

/// Converge `state` towards `desired`.
pub async fn apply<C>(
    provider: &ConfiguredProvider<C>,
    desired: &DesiredState,
    state: &mut State,
) -> ApplyReport
where
    C: PeopleClient,
{
    let resource = provider.person_resource();
    let mut report = ApplyReport::default();
    info!(
        desired = desired.resources.len(),
        known = state.resources.len(),
        "[APPLY] Starting"
    );

    for (address, wanted) in &desired.resources {
        let prior = state.get(address).cloned();
        let operation = if prior.is_some() {
            Operation::Update
        } else {
            Operation::Create
        };
        if let Err(d) = wanted.validate(operation) {
            report.fail(address, d);
            continue;
        }

        let Some(prior) = prior else {
            info!(address, "[APPLY] Creating");
            match resource.create(wanted.clone()).await {
                Ok(created) => {
                    state.insert(address.clone(), created);
                    report.created.push(address.clone());
                }
                Err(d) => report.fail(address, d),
            }
            continue;
        };

        let current = match resource.read(prior).await {
            Ok(current) => {
                state.insert(address.clone(), current.clone());
                current
            }
            Err(d) => {
                report.fail(address, d);
                continue;
            }
        };

        if resource.requires_replace(&current, wanted) {
            info!(address, from = %current.name, to = %wanted.name, "[APPLY] Replacing");
            if let Err(d) = resource.delete(&current).await {
                report.fail(address, d);
                continue;
            }
            state.remove(address);
            match resource.create(wanted.clone()).await {
                Ok(created) => {
                    state.insert(address.clone(), created);
                    report.replaced.push(address.clone());
                }
                Err(d) => report.fail(address, d),
            }
            continue;
        }

        if current.age != wanted.age || current.description != wanted.description {
            info!(address, "[APPLY] Updating in place");
            let planned = PersonResourceModel {
                id: current.id.clone(),
                last_updated: current.last_updated.clone(),
                ..wanted.clone()
            };
            match resource.update(planned).await {
                Ok(updated) => {
                    state.insert(address.clone(), updated);
                    report.updated.push(address.clone());
                }
                Err(d) => report.fail(address, d),
            }
            continue;
        }

        debug!(address, "[APPLY] Up to date");
        report.unchanged.push(address.clone());
    }

    for address in state.addresses() {
        if desired.resources.contains_key(&address) {
            continue;
        }
        delete_one(provider, state, &address, &mut report).await;
    }

    read_data_sources(provider, desired, &mut report).await;

    info!(
        created = report.created.len(),
        updated = report.updated.len(),
        replaced = report.replaced.len(),
        deleted = report.deleted.len(),
        unchanged = report.unchanged.len(),
        diagnostics = report.diagnostics.len(),
        "[APPLY] Finished"
    );
    report
}

/// Re-read every known resource from the server.
pub async fn refresh<C>(provider: &ConfiguredProvider<C>, state: &mut State) -> ApplyReport
where
    C: PeopleClient,
{
    let resource = provider.person_resource();
    let mut report = ApplyReport::default();

    for address in state.addresses() {
        let Some(prior) = state.get(&address).cloned() else {
            continue;
        };
        match resource.read(prior).await {
            Ok(current) => {
                state.insert(address.clone(), current);
                report.refreshed.push(address);
            }
            Err(d) => report.fail(&address, d),
        }
    }
    report
}

/// Delete every known resource.
pub async fn destroy<C>(provider: &ConfiguredProvider<C>, state: &mut State) -> ApplyReport
where
    C: PeopleClient,
{
    let mut report = ApplyReport::default();
    for address in state.addresses() {
        delete_one(provider, state, &address, &mut report).await;
    }
    report
}

/// Adopt the person with `id` under `address`.
pub async fn import<C>(
    provider: &ConfiguredProvider<C>,
    state: &mut State,
    address: &str,
    id: &str,
) -> Result<PersonResourceModel, Diagnostic>
where
    C: PeopleClient,
{
    if state.get(address).is_some() {
        return Err(Diagnostic::AlreadyManaged {
            address: address.to_string(),
        });
    }
    let imported = provider.person_resource().import_state(id).await?;
    state.insert(address, imported.clone());
    info!(address, id, "[IMPORT] Imported resource");
    Ok(imported)
}

async fn delete_one<C>(
    provider: &ConfiguredProvider<C>,
    state: &mut State,
    address: &str,
    report: &mut ApplyReport,
) where
    C: PeopleClient,
{
    let Some(current) = state.get(address).cloned() else {
        return;
    };
    info!(address, "[APPLY] Deleting");
    match provider.person_resource().delete(&current).await {
        Ok(()) => {
            state.remove(address);
            report.deleted.push(address.to_string());
        }
        Err(d) => report.fail(address, d),
    }
}

async fn read_data_sources<C>(
    provider: &ConfiguredProvider<C>,
    desired: &DesiredState,
    report: &mut ApplyReport,
) where
    C: PeopleClient,
{
    let source = provider.person_data_source();
    for (address, lookup) in &desired.data {
        match source.read(lookup.clone()).await {
            Ok(data) => {
                report.data.insert(address.clone(), data);
            }
            Err(d) => report.fail(&format!("data.{address}"), d),
        }
    }
}
