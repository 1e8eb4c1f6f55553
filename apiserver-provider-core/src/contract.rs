//! # contract: interface to the remote people store
//!
//! This module defines the single trait ([`PeopleClient`]) the reconciler talks to,
//! plus the plain value object ([`Person`]) that crosses the boundary.
//!
//! ## Interface & Extensibility
//! - Implement [`PeopleClient`] to back the provider with a new transport (HTTP, in-memory, ...).
//! - All methods are async and return boxed errors; the reconciler only ever renders them as text.
//! - No ordering or idempotency guarantee is assumed: each call either fully succeeds and
//!   returns authoritative data, or fails.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so consumers get a `MockPeopleClient` when the
//!   `test-export-mocks` feature is enabled (the default).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Error type returned across the client seam.
pub type ClientError = Box<dyn std::error::Error + Send + Sync>;

/// A person record as stored by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Server-assigned identifier. Ignored by the server on create.
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub age: i64,
    #[serde(default)]
    pub description: String,
}

/// CRUD access to the remote `Person` resource, keyed by integer id.
///
/// The trait is implemented by real clients and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PeopleClient: Send + Sync {
    /// Create a person; the returned record carries the server-assigned id.
    async fn create(&self, person: Person) -> Result<Person, ClientError>;

    /// Fetch a single person by id.
    async fn get(&self, id: i64) -> Result<Person, ClientError>;

    /// Replace the mutable fields of person `id`, returning the stored record.
    async fn update(&self, id: i64, person: Person) -> Result<Person, ClientError>;

    /// Delete person `id`.
    async fn delete(&self, id: i64) -> Result<(), ClientError>;
}
