//! The `person` resource: translates lifecycle events into client calls and produces the
//! next known state, or a [`Diagnostic`].
//!
//! Each operation is independent. There is no pending/applied status: which operation runs
//! is decided entirely by the caller (see [`crate::apply`]).

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::contract::PeopleClient;
use crate::diagnostics::{Diagnostic, Operation};
use crate::model::{now_rfc3339, PersonResourceModel};
use crate::schema::{person_resource_schema, Schema};

pub const TYPE_SUFFIX: &str = "_person";

pub struct PersonResource<C> {
    client: Arc<C>,
    schema: Schema,
}

impl<C> PersonResource<C>
where
    C: PeopleClient,
{
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            schema: person_resource_schema(),
        }
    }

    /// Create the planned person. The server assigns the id.
    pub async fn create(
        &self,
        planned: PersonResourceModel,
    ) -> Result<PersonResourceModel, Diagnostic> {
        planned.validate(Operation::Create)?;

        let person = self
            .client
            .create(planned.to_person())
            .await
            .map_err(|e| {
                error!(error = %e, name = %planned.name, "Unable to create person");
                Diagnostic::remote(Operation::Create, e)
            })?;

        let mut data = planned;
        data.apply_person(&person);
        data.id = Some(person.id.to_string());
        data.last_updated = Some(now_rfc3339());

        info!(?person, ?data, "created a resource");
        Ok(data)
    }

    /// Refresh known state from the server.
    ///
    /// A person that no longer exists is reported like any other remote failure; the caller
    /// keeps the prior state.
    pub async fn read(
        &self,
        current: PersonResourceModel,
    ) -> Result<PersonResourceModel, Diagnostic> {
        let id = current.numeric_id(Operation::Read)?;
        let person = self.client.get(id).await.map_err(|e| {
            error!(error = %e, id, "Unable to read person");
            Diagnostic::remote(Operation::Read, e)
        })?;

        let mut data = current;
        data.apply_person(&person);
        data.backfill_last_updated();

        info!(?person, ?data, "read a resource");
        Ok(data)
    }

    /// Apply new attribute values in place. `last_updated` is only backfilled, never
    /// refreshed.
    pub async fn update(
        &self,
        planned: PersonResourceModel,
    ) -> Result<PersonResourceModel, Diagnostic> {
        let id = planned.numeric_id(Operation::Update)?;
        let person = self
            .client
            .update(id, planned.to_person())
            .await
            .map_err(|e| {
                error!(error = %e, id, "Unable to update person");
                Diagnostic::remote(Operation::Update, e)
            })?;

        let mut data = planned;
        data.apply_person(&person);
        data.backfill_last_updated();

        info!(?person, ?data, "updated a resource");
        Ok(data)
    }

    /// Delete the person. On success the caller drops it from state.
    pub async fn delete(&self, current: &PersonResourceModel) -> Result<(), Diagnostic> {
        let id = current.numeric_id(Operation::Delete)?;
        self.client.delete(id).await.map_err(|e| {
            error!(error = %e, id, "Unable to delete person");
            Diagnostic::remote(Operation::Delete, e)
        })?;

        info!(id, "deleted a resource");
        Ok(())
    }

    /// Adopt an existing person by id and populate the rest via [`Self::read`].
    pub async fn import_state(&self, id: &str) -> Result<PersonResourceModel, Diagnostic> {
        debug!(id, "importing a resource");
        self.read(PersonResourceModel::with_id(id))
            .await
            .map_err(|d| match d {
                Diagnostic::InvalidIdentifier { id, detail, .. } => Diagnostic::InvalidIdentifier {
                    operation: Operation::Import,
                    id,
                    detail,
                },
                Diagnostic::RemoteCall { detail, .. } => Diagnostic::RemoteCall {
                    operation: Operation::Import,
                    detail,
                },
                other => other,
            })
    }

    /// Whether moving from `prior` to `desired` has to go through delete and create.
    pub fn requires_replace(
        &self,
        prior: &PersonResourceModel,
        desired: &PersonResourceModel,
    ) -> bool {
        self.schema
            .replacement_attributes()
            .any(|attribute| match attribute {
                "name" => prior.name != desired.name,
                "age" => prior.age != desired.age,
                "description" => prior.description != desired.description,
                _ => false,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{MockPeopleClient, Person};
    use mockall::predicate::eq;

    fn stored(id: i64, name: &str, age: i64, description: &str) -> Person {
        Person {
            id,
            name: name.to_string(),
            age,
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_server_id_and_timestamp() {
        let mut client = MockPeopleClient::new();
        client
            .expect_create()
            .withf(|p: &Person| p.name == "MyName" && p.age == 42 && p.description == "one")
            .times(1)
            .returning(|p| Ok(Person { id: 7, ..p }));

        let resource = PersonResource::new(Arc::new(client));
        let data = resource
            .create(PersonResourceModel::planned("MyName", 42, Some("one".into())))
            .await
            .expect("create succeeds");

        assert_eq!(data.id.as_deref(), Some("7"));
        assert!(data.last_updated.is_some());
        assert_eq!(data.description, "one");
    }

    #[tokio::test]
    async fn create_keeps_server_echo_over_submitted_values() {
        let mut client = MockPeopleClient::new();
        client
            .expect_create()
            .returning(|_| Ok(stored(1, "Normalised", 43, "server")));

        let resource = PersonResource::new(Arc::new(client));
        let data = resource
            .create(PersonResourceModel::planned("raw", 42, None))
            .await
            .unwrap();

        assert_eq!(data.name, "Normalised");
        assert_eq!(data.age, 43);
        assert_eq!(data.description, "server");
    }

    #[tokio::test]
    async fn create_rejects_empty_name_without_calling_client() {
        let mut client = MockPeopleClient::new();
        client.expect_create().never();

        let resource = PersonResource::new(Arc::new(client));
        let err = resource
            .create(PersonResourceModel::planned("", 42, None))
            .await
            .unwrap_err();
        assert!(matches!(err, Diagnostic::InvalidAttribute { .. }));
    }

    #[tokio::test]
    async fn create_failure_is_a_create_diagnostic() {
        let mut client = MockPeopleClient::new();
        client
            .expect_create()
            .returning(|_| Err("connection refused".into()));

        let resource = PersonResource::new(Arc::new(client));
        let err = resource
            .create(PersonResourceModel::planned("MyName", 42, None))
            .await
            .unwrap_err();
        assert_eq!(err, Diagnostic::remote(Operation::Create, "connection refused"));
    }

    #[tokio::test]
    async fn read_keeps_existing_timestamp() {
        let mut client = MockPeopleClient::new();
        client
            .expect_get()
            .with(eq(3))
            .returning(|id| Ok(stored(id, "MyName", 42, "two")));

        let resource = PersonResource::new(Arc::new(client));
        let mut current = PersonResourceModel::with_id("3");
        current.last_updated = Some("2024-05-01T10:00:00Z".into());

        let data = resource.read(current).await.unwrap();
        assert_eq!(data.last_updated.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(data.description, "two");
    }

    #[tokio::test]
    async fn read_backfills_missing_timestamp() {
        let mut client = MockPeopleClient::new();
        client
            .expect_get()
            .returning(|id| Ok(stored(id, "MyName", 42, "")));

        let resource = PersonResource::new(Arc::new(client));
        let data = resource.read(PersonResourceModel::with_id("3")).await.unwrap();
        assert!(!data.last_updated.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn invalid_identifier_never_reaches_the_client() {
        let mut client = MockPeopleClient::new();
        client.expect_get().never();
        client.expect_update().never();
        client.expect_delete().never();
        let resource = PersonResource::new(Arc::new(client));

        let mut bad = PersonResourceModel::planned("MyName", 42, None);
        bad.id = Some("abc".into());

        let read = resource.read(bad.clone()).await.unwrap_err();
        let update = resource.update(bad.clone()).await.unwrap_err();
        let delete = resource.delete(&bad).await.unwrap_err();

        for (err, op) in [
            (read, Operation::Read),
            (update, Operation::Update),
            (delete, Operation::Delete),
        ] {
            assert!(
                matches!(err, Diagnostic::InvalidIdentifier { operation, .. } if operation == op),
                "expected invalid identifier for {op}"
            );
        }
    }

    #[tokio::test]
    async fn update_failure_leaves_no_mutation() {
        let mut client = MockPeopleClient::new();
        client
            .expect_update()
            .returning(|_, _| Err("boom".into()));

        let resource = PersonResource::new(Arc::new(client));
        let mut planned = PersonResourceModel::planned("MyName", 50, None);
        planned.id = Some("1".into());

        let err = resource.update(planned).await.unwrap_err();
        assert_eq!(err.operation(), Operation::Update);
    }

    #[tokio::test]
    async fn update_does_not_refresh_existing_timestamp() {
        let mut client = MockPeopleClient::new();
        client
            .expect_update()
            .with(eq(1), mockall::predicate::always())
            .returning(|id, p| Ok(Person { id, ..p }));

        let resource = PersonResource::new(Arc::new(client));
        let mut planned = PersonResourceModel::planned("MyName", 50, Some("new".into()));
        planned.id = Some("1".into());
        planned.last_updated = Some("2024-05-01T10:00:00Z".into());

        let data = resource.update(planned).await.unwrap();
        assert_eq!(data.age, 50);
        assert_eq!(data.last_updated.as_deref(), Some("2024-05-01T10:00:00Z"));
    }

    #[tokio::test]
    async fn delete_failure_is_a_delete_diagnostic() {
        let mut client = MockPeopleClient::new();
        client
            .expect_delete()
            .with(eq(0))
            .returning(|_| Err("person 0 not found".into()));

        let resource = PersonResource::new(Arc::new(client));
        let err = resource
            .delete(&PersonResourceModel::with_id("0"))
            .await
            .unwrap_err();
        assert_eq!(err.summary(), "Error deleting person");
    }

    #[tokio::test]
    async fn import_reads_by_id() {
        let mut client = MockPeopleClient::new();
        client
            .expect_get()
            .with(eq(0))
            .returning(|id| Ok(stored(id, "personXXX", 49, "")));

        let resource = PersonResource::new(Arc::new(client));
        let data = resource.import_state("0").await.unwrap();
        assert_eq!(data.id.as_deref(), Some("0"));
        assert_eq!(data.name, "personXXX");
        assert_eq!(data.age, 49);
        assert!(data.last_updated.is_some());
    }

    #[tokio::test]
    async fn import_attributes_failures_to_import() {
        let client = MockPeopleClient::new();
        let resource = PersonResource::new(Arc::new(client));
        let err = resource.import_state("zero").await.unwrap_err();
        assert_eq!(err.operation(), Operation::Import);
    }

    #[test]
    fn renaming_requires_replacement() {
        let resource = PersonResource::new(Arc::new(MockPeopleClient::new()));
        let prior = PersonResourceModel::planned("MyName", 42, None);

        let renamed = PersonResourceModel::planned("Other", 42, None);
        let aged = PersonResourceModel::planned("MyName", 43, Some("x".into()));

        assert!(resource.requires_replace(&prior, &renamed));
        assert!(!resource.requires_replace(&prior, &aged));
    }
}
