#![doc = "apiserver-provider-core: reconciliation logic for the api-server Person provider."]

//! This crate holds the transport-agnostic part of the provider: the client contract,
//! the resource and data-source models, the reconciler, schemas and the apply driver.
//! The HTTP client and CLI live in the `apiserver-provider` crate.
//!
//! # Usage
//! Build a [`provider::ConfiguredProvider`] around any [`contract::PeopleClient`], then run
//! [`apply::apply`] (or call the resource operations directly).

pub mod apply;
pub mod contract;
pub mod data_source;
pub mod diagnostics;
pub mod model;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod state;
