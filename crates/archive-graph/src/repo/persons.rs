//! Historical persons in the archive partition.

use archive_core::error::Result;
use archive_core::{Link, Partition, Person, PersonName};

use super::{counted_delete, decode_all, decode_at, first, node_at, with_name};
use crate::backend::{GraphBackend, Statement};
use crate::mutator::ExpectedDeletion;
use crate::provider::{ConnectionProvider, ResourceStore};
use crate::record::RecordShape;
use crate::relationships::RelationshipMatch;
use crate::translate;

/// Any level of the location hierarchy.
const LOCATION_FILTER: &str = "(l:COUNTRY OR l:STATE OR l:CITY)";

pub struct Persons<B> {
    store: ResourceStore<B>,
}

impl<B: GraphBackend> Persons<B> {
    pub fn new(provider: &ConnectionProvider<B>) -> Self {
        Self {
            store: provider.store(Partition::Archive),
        }
    }

    /// Persons are not unique by name; every call creates a new node.
    pub async fn create_person(&self, name: &PersonName) -> Result<Person> {
        let creation = Statement::new(
            "CREATE (p:PERSON {id: apoc.create.uuid(), firstName: $firstName, \
             lastName: $lastName, secondName: $secondName}) RETURN p",
        );
        let creation = with_name(creation, name).returns(["p"]);

        let created = self.store.create(None, &creation, &shape()).await?;
        decode_at(&created.record, 0)
    }

    pub async fn get_person(&self, id: &str) -> Result<Person> {
        let records = self.store.get(&by_id(id), &shape()).await?;
        decode_at(&first(records)?, 0)
    }

    pub async fn get_persons(&self) -> Result<Vec<Person>> {
        let found = self
            .store
            .find(&Statement::new("MATCH (p:PERSON) RETURN p").returns(["p"]))
            .await?;
        decode_all(&found, &shape())
    }

    pub async fn update_person(&self, id: &str, name: &PersonName) -> Result<Person> {
        let update = Statement::new(
            "MATCH (p:PERSON {id: $id}) SET p.firstName = $firstName, \
             p.lastName = $lastName, p.secondName = $secondName RETURN p",
        )
        .param("id", id);
        let update = with_name(update, name).returns(["p"]);

        let updated = self.store.update(&by_id(id), None, &update, &shape()).await?;
        decode_at(&updated.record, 0)
    }

    /// Fails with `HasRelationships` while the person is still placed
    /// anywhere.
    pub async fn delete_person(&self, id: &str) -> Result<()> {
        let deletion = counted_delete("MATCH (p:PERSON {id: $id})", "p").param("id", id);
        self.store
            .delete(&by_id(id), &deletion, ExpectedDeletion::nodes(1))
            .await
    }

    /// Record that a person lived in a location.
    pub async fn place_person(&self, person_id: &str, location_id: &str) -> Result<Link> {
        let start = by_id(person_id);
        let end = Statement::new(format!(
            "MATCH (l {{id: $id}}) WHERE {LOCATION_FILTER} RETURN l"
        ))
        .param("id", location_id)
        .returns(["l"]);
        let existing = Statement::new(format!(
            "MATCH (p:PERSON {{id: $personId}})-[r:LIVED_IN]->(l {{id: $locationId}}) \
             WHERE {LOCATION_FILTER} RETURN r"
        ))
        .param("personId", person_id)
        .param("locationId", location_id)
        .returns(["r"]);
        let creation = Statement::new(format!(
            "MATCH (p:PERSON {{id: $personId}}), (l {{id: $locationId}}) \
             WHERE {LOCATION_FILTER} CREATE (p)-[r:LIVED_IN]->(l) RETURN p, r, l"
        ))
        .param("personId", person_id)
        .param("locationId", location_id)
        .returns(["p", "r", "l"]);

        let matches = RelationshipMatch {
            start: &start,
            end: &end,
            existing: &existing,
        };
        let record = self
            .store
            .add_relationship(matches, &creation, &RecordShape::columns(["p", "r", "l"]))
            .await?;

        let relationship = record
            .relationship(1)
            .ok_or_else(|| translate::unprepared("entity 1 is not a relationship"))?;
        Ok(Link::new(node_at(&record, 0)?, relationship, node_at(&record, 2)?))
    }
}

fn shape() -> RecordShape {
    RecordShape::single("p")
}

fn by_id(id: &str) -> Statement {
    Statement::new("MATCH (p:PERSON {id: $id}) RETURN p")
        .param("id", id)
        .returns(["p"])
}
