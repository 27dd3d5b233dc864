//! Path traversal flattened into deduplicated links.

use archive_core::error::{code, Result};
use archive_core::{ArchiveError, GraphPath, GraphValue, Link, RawRecord};

use crate::backend::{GraphBackend, Statement};
use crate::provider::ResourceStore;
use crate::translate;

impl<B: GraphBackend> ResourceStore<B> {
    /// Run a traversal returning paths in `column` and flatten every path
    /// into links, keeping the first occurrence of each distinct link.
    pub async fn get_path(&self, traversal: &Statement, column: &str) -> Result<Vec<Link>> {
        let found = self.find(traversal).await?;
        if found.is_empty() {
            return Err(ArchiveError::not_found(code::PATH_NOT_FOUND));
        }

        let paths = found
            .iter()
            .map(|raw| path_in(raw, column))
            .collect::<Result<Vec<_>>>()?;
        let links = collect_links(paths);

        tracing::debug!(database = %self.database(), paths = found.len(), links = links.len(), "Collected path links");
        Ok(links)
    }
}

fn path_in<'a>(raw: &'a RawRecord, column: &str) -> Result<&'a GraphPath> {
    match raw.get(column) {
        Some(GraphValue::Path(path)) if path.is_walk() => Ok(path),
        Some(GraphValue::Path(path)) => Err(translate::unprepared(format!(
            "path in {column} has {} nodes for {} relationships",
            path.nodes.len(),
            path.relationships.len()
        ))),
        _ => Err(translate::unprepared(format!("column {column} is not a path"))),
    }
}

/// Flatten paths into links in discovery order, skipping any link
/// structurally equal to one already collected.
pub fn collect_links<'a>(paths: impl IntoIterator<Item = &'a GraphPath>) -> Vec<Link> {
    let mut links: Vec<Link> = Vec::new();
    for path in paths {
        for (start, rel, end) in path.segments() {
            let link = Link::new(start, rel, end);
            if !links.contains(&link) {
                links.push(link);
            }
        }
    }
    links
}
