//! Graph values as the resource-access layer hands them out.
//!
//! Everything here is an owned snapshot: nothing refers back into driver
//! state, and nothing is mutated after it is returned.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};

/// Property mapping of a node or relationship.
pub type Properties = serde_json::Map<String, serde_json::Value>;

// ── Nodes & Relationships ────────────────────────────────────────

/// A labeled node with its properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub labels: Vec<String>,
    pub properties: Properties,
}

impl NodeRecord {
    pub fn new<L: Into<String>>(labels: impl IntoIterator<Item = L>, properties: Properties) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            properties,
        }
    }

    /// Server-generated identifier of an addressable resource.
    pub fn id(&self) -> Option<&str> {
        self.properties.get("id").and_then(|v| v.as_str())
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Deserialize the property mapping into a domain type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.properties.clone()))
    }
}

/// A typed relationship. Endpoints are not carried; they are looked up by
/// matching queries when needed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    #[serde(rename = "type")]
    pub rel_type: String,
    pub properties: Properties,
}

impl RelationshipRecord {
    pub fn new(rel_type: impl Into<String>, properties: Properties) -> Self {
        Self {
            rel_type: rel_type.into(),
            properties,
        }
    }
}

/// A traversed path as a walk: `nodes[i]` and `nodes[i + 1]` are joined by
/// `relationships[i]`, in traversal order. A node the walk revisits appears
/// once per visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPath {
    pub nodes: Vec<NodeRecord>,
    pub relationships: Vec<RelationshipRecord>,
}

impl GraphPath {
    /// Whether every relationship sits between two nodes of the walk.
    pub fn is_walk(&self) -> bool {
        self.nodes.len() == self.relationships.len() + 1
    }

    /// Iterate `(start, relationship, end)` segments.
    pub fn segments(&self) -> impl Iterator<Item = (&NodeRecord, &RelationshipRecord, &NodeRecord)> {
        self.relationships
            .iter()
            .enumerate()
            .filter_map(|(i, rel)| Some((self.nodes.get(i)?, rel, self.nodes.get(i + 1)?)))
    }
}

/// One value of a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphValue {
    Node(NodeRecord),
    Relationship(RelationshipRecord),
    Path(GraphPath),
    Scalar(serde_json::Value),
}

/// One raw result row: ordered `(column, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    columns: Vec<(String, GraphValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: GraphValue) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: GraphValue) {
        self.columns.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&GraphValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ── Prepared Records ─────────────────────────────────────────────

/// A node or relationship exposed to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Node(NodeRecord),
    Relationship(RelationshipRecord),
}

/// The exposed columns of one result row, in shape order.
///
/// Serializes as the lone entity when the shape has one column, and as a
/// list otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    entities: Vec<Entity>,
}

impl Record {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The node at `index` in shape order, if that entity is a node.
    pub fn node(&self, index: usize) -> Option<&NodeRecord> {
        match self.entities.get(index)? {
            Entity::Node(node) => Some(node),
            Entity::Relationship(_) => None,
        }
    }

    pub fn relationship(&self, index: usize) -> Option<&RelationshipRecord> {
        match self.entities.get(index)? {
            Entity::Relationship(rel) => Some(rel),
            Entity::Node(_) => None,
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.entities.as_slice() {
            [only] => only.serialize(serializer),
            all => all.serialize(serializer),
        }
    }
}

/// Counts reported by the database for one mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationSummary {
    pub nodes_created: u64,
    pub nodes_deleted: u64,
    pub relationships_created: u64,
    pub relationships_deleted: u64,
}

/// A record together with the summary of the mutation that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mutated<T> {
    pub record: T,
    pub summary: MutationSummary,
}

// ── Links ────────────────────────────────────────────────────────

/// One flattened path segment. Compared by value, never by identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub start: NodeRecord,
    pub end: NodeRecord,
    pub relationship: RelationshipRecord,
}

impl Link {
    pub fn new(start: &NodeRecord, relationship: &RelationshipRecord, end: &NodeRecord) -> Self {
        Self {
            start: start.clone(),
            end: end.clone(),
            relationship: relationship.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn props(value: serde_json::Value) -> Properties {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn link_equality_is_structural_and_key_order_independent() {
        let a = NodeRecord::new(["PERSON"], props(json!({"id": "1", "lastName": "Stein"})));
        let mut reordered = Properties::new();
        reordered.insert("lastName".into(), json!("Stein"));
        reordered.insert("id".into(), json!("1"));
        let a_again = NodeRecord::new(["PERSON"], reordered);
        let b = NodeRecord::new(["CITY"], props(json!({"id": "2", "tags": ["x", "y"]})));
        let rel = RelationshipRecord::new("LIVED_IN", props(json!({"years": [1903, 1938]})));

        assert_eq!(Link::new(&a, &rel, &b), Link::new(&a_again, &rel, &b));

        let other_years = RelationshipRecord::new("LIVED_IN", props(json!({"years": [1903]})));
        assert_ne!(Link::new(&a, &rel, &b), Link::new(&a, &other_years, &b));
    }

    #[test]
    fn path_segments_follow_traversal_order() {
        let n = |id: &str| NodeRecord::new(["N"], props(json!({ "id": id })));
        let path = GraphPath {
            nodes: vec![n("a"), n("b"), n("c")],
            relationships: vec![
                RelationshipRecord::new("R1", Properties::new()),
                RelationshipRecord::new("R2", Properties::new()),
            ],
        };

        let segs: Vec<_> = path
            .segments()
            .map(|(s, r, e)| (s.id().unwrap(), r.rel_type.as_str(), e.id().unwrap()))
            .collect();
        assert_eq!(segs, vec![("a", "R1", "b"), ("b", "R2", "c")]);
        assert!(path.is_walk());
    }

    #[test]
    fn deduplicated_node_list_is_not_a_walk() {
        let n = |id: &str| NodeRecord::new(["N"], props(json!({ "id": id })));
        let r = |t: &str| RelationshipRecord::new(t, Properties::new());
        // a-[R1]->b-[R2]->a-[R3]->c with each node listed once
        let path = GraphPath {
            nodes: vec![n("a"), n("b"), n("c")],
            relationships: vec![r("R1"), r("R2"), r("R3")],
        };
        assert!(!path.is_walk());
    }

    #[test]
    fn record_serializes_single_entity_unwrapped() {
        let node = NodeRecord::new(["PERSON"], props(json!({"id": "1"})));
        let single = Record::new(vec![Entity::Node(node.clone())]);
        assert_eq!(
            serde_json::to_value(&single).unwrap(),
            json!({"labels": ["PERSON"], "properties": {"id": "1"}})
        );

        let rel = RelationshipRecord::new("KNEW", Properties::new());
        let pair = Record::new(vec![Entity::Node(node), Entity::Relationship(rel)]);
        let value = serde_json::to_value(&pair).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(value[1]["type"], "KNEW");
    }

    #[test]
    fn summary_uses_camel_case() {
        let summary = MutationSummary {
            nodes_created: 1,
            ..Default::default()
        };
        let value = serde_json::to_value(summary).unwrap();
        assert_eq!(value["nodesCreated"], 1);
        assert_eq!(value["relationshipsDeleted"], 0);
    }

    #[test]
    fn raw_record_lookup_by_column() {
        let record = RawRecord::new()
            .with("count", GraphValue::Scalar(json!(3)))
            .with("p", GraphValue::Node(NodeRecord::default()));
        assert_eq!(record.len(), 2);
        assert!(matches!(record.get("p"), Some(GraphValue::Node(_))));
        assert!(record.get("q").is_none());
    }
}
