//! The `COUNTRY > STATE > CITY` hierarchy in the archive partition.
//!
//! Names are unique among siblings: countries among all countries, states
//! within their country, cities within their state. A state and a city may
//! share a name, as may two states in different countries.

use archive_core::error::Result;
use archive_core::{Link, Location, LocationKind, NodeRecord, Partition, Record};

use super::{counted_delete, node_at};
use crate::backend::{GraphBackend, Params, Statement};
use crate::mutator::ExpectedDeletion;
use crate::provider::{ConnectionProvider, ResourceStore};
use crate::record::RecordShape;
use crate::translate;

pub struct Locations<B> {
    store: ResourceStore<B>,
}

impl<B: GraphBackend> Locations<B> {
    pub fn new(provider: &ConnectionProvider<B>) -> Self {
        Self {
            store: provider.store(Partition::Archive),
        }
    }

    pub async fn create_country(&self, name: &str) -> Result<Location> {
        let matching = lookup(LocationKind::Country, None, Some(name), None);
        let creation =
            Statement::new("CREATE (l:COUNTRY {id: apoc.create.uuid(), name: $name}) RETURN l")
                .param("name", name)
                .returns(["l"]);

        let created = self
            .store
            .create(Some(&matching), &creation, &shape())
            .await?;
        location(&created.record)
    }

    pub async fn add_state(&self, country_id: &str, name: &str) -> Result<Location> {
        self.add_child(LocationKind::State, country_id, name).await
    }

    pub async fn add_city(&self, state_id: &str, name: &str) -> Result<Location> {
        self.add_child(LocationKind::City, state_id, name).await
    }

    async fn add_child(&self, kind: LocationKind, parent_id: &str, name: &str) -> Result<Location> {
        let parent_kind = kind
            .parent()
            .ok_or_else(|| translate::unprepared("a country has no parent"))?;
        let (parent_label, label) = (parent_kind.label(), kind.label());

        let parent = lookup(parent_kind, Some(parent_id), None, None);
        let duplicate = Statement::new(format!(
            "MATCH (:{parent_label} {{id: $parentId}})-[:CONTAINS]->(l:{label} {{name: $name}}) RETURN l"
        ))
        .param("parentId", parent_id)
        .param("name", name)
        .returns(["l"]);
        let attach = Statement::new(format!(
            "MATCH (p:{parent_label} {{id: $parentId}}) \
             CREATE (p)-[:CONTAINS]->(l:{label} {{id: apoc.create.uuid(), name: $name}}) RETURN l"
        ))
        .param("parentId", parent_id)
        .param("name", name)
        .returns(["l"]);

        let attached = self
            .store
            .add_child_to_parent(&parent, &duplicate, &attach, &shape())
            .await?;
        let record = attached
            .record
            .first()
            .ok_or_else(|| translate::unprepared("attach returned no records"))?;
        location(record)
    }

    /// Rename a location, rejecting a name one of its siblings already
    /// uses. Renaming a location to its current name succeeds.
    pub async fn rename(&self, kind: LocationKind, id: &str, new_name: &str) -> Result<Location> {
        let label = kind.label();
        let matching = lookup(kind, Some(id), None, None);
        let update = Statement::new(format!(
            "MATCH (l:{label} {{id: $id}}) SET l.name = $name RETURN l"
        ))
        .param("id", id)
        .param("name", new_name)
        .returns(["l"]);

        let updated = self
            .store
            .update(
                &matching,
                Some(lookup_params(None, Some(new_name), Some(id))),
                &update,
                &shape(),
            )
            .await?;
        location(&updated.record)
    }

    /// Plain delete: a location that still contains anything, or that
    /// anyone lived in, is rejected with `HasRelationships`.
    pub async fn delete_location(&self, kind: LocationKind, id: &str) -> Result<()> {
        let label = kind.label();
        let deletion =
            counted_delete(&format!("MATCH (l:{label} {{id: $id}})"), "l").param("id", id);
        self.store
            .delete(&lookup(kind, Some(id), None, None), &deletion, ExpectedDeletion::nodes(1))
            .await
    }

    /// Links from the country down to the city, one per hierarchy step.
    pub async fn location_path(&self, city_id: &str) -> Result<Vec<Link>> {
        let traversal = Statement::new(
            "MATCH path = (:COUNTRY)-[:CONTAINS*]->(:CITY {id: $id}) RETURN path",
        )
        .param("id", city_id)
        .returns(["path"]);
        self.store.get_path(&traversal, "path").await
    }
}

fn shape() -> RecordShape {
    RecordShape::single("l")
}

/// Match a location of `kind` by id, by name, or as a sibling of another
/// location (`$siblingOf`, which never matches itself). A `None` filter
/// matches anything, so the same statement serves as the conflict re-match
/// with different parameters.
fn lookup(
    kind: LocationKind,
    id: Option<&str>,
    name: Option<&str>,
    sibling_of: Option<&str>,
) -> Statement {
    let label = kind.label();
    let siblings = match kind.parent() {
        Some(parent) => format!(
            "l.id <> $siblingOf AND EXISTS {{ MATCH (p:{parent})-[:CONTAINS]->(l), \
             (p)-[:CONTAINS]->(:{label} {{id: $siblingOf}}) }}",
            parent = parent.label()
        ),
        None => "l.id <> $siblingOf".to_string(),
    };
    Statement::new(format!(
        "MATCH (l:{label}) WHERE ($id IS NULL OR l.id = $id) \
         AND ($name IS NULL OR l.name = $name) \
         AND ($siblingOf IS NULL OR ({siblings})) RETURN l"
    ))
    .with_params(lookup_params(id, name, sibling_of))
    .returns(["l"])
}

fn lookup_params(id: Option<&str>, name: Option<&str>, sibling_of: Option<&str>) -> Params {
    let mut params = Params::new();
    params.insert("id".into(), id.into());
    params.insert("name".into(), name.into());
    params.insert("siblingOf".into(), sibling_of.into());
    params
}

fn location(record: &Record) -> Result<Location> {
    from_node(node_at(record, 0)?)
}

fn from_node(node: &NodeRecord) -> Result<Location> {
    let kind = LocationKind::from_labels(&node.labels)
        .ok_or_else(|| translate::unprepared("node is not a location"))?;
    let text = |key: &str| {
        node.properties
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| translate::unprepared(format!("location has no {key}")))
    };
    Ok(Location {
        kind,
        id: text("id")?,
        name: text("name")?,
    })
}
