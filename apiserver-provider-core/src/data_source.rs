//! The `person` data source: a read-only lookup keyed by a required id.

use std::sync::Arc;

use tracing::{error, info};

use crate::contract::PeopleClient;
use crate::diagnostics::{Diagnostic, Operation};
use crate::model::{parse_id, PersonDataSourceModel};

pub struct PersonDataSource<C> {
    client: Arc<C>,
}

impl<C> PersonDataSource<C>
where
    C: PeopleClient,
{
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    pub async fn read(
        &self,
        config: PersonDataSourceModel,
    ) -> Result<PersonDataSourceModel, Diagnostic> {
        let id = parse_id(&config.id, Operation::Lookup)?;
        let person = self.client.get(id).await.map_err(|e| {
            error!(error = %e, id, "Unable to look up person");
            Diagnostic::remote(Operation::Lookup, e)
        })?;

        let data = PersonDataSourceModel {
            id: config.id,
            name: person.name,
            age: person.age,
            description: person.description,
        };
        info!(?data, "read a data source");
        Ok(data)
    }
}
