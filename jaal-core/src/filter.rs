// Search, node/edge filtering and related-entity expansion

use crate::error::Result;
use crate::model::{Edge, GraphData, Node, Record};
use crate::query::Query;
use indexmap::IndexSet;
use petgraph::Direction;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Id substrings that mark a node as an organisation, workflow or table.
pub const ORG_MARKER: &str = "org";
pub const WF_MARKER: &str = "wf";
pub const TABLE_MARKER: &str = "table";

/// Settings of the four related-entity checkboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedOptions {
    pub add_related_entities: bool,
    pub include_org: bool,
    pub include_wf: bool,
    pub include_tables: bool,
}

impl Default for RelatedOptions {
    fn default() -> Self {
        Self {
            add_related_entities: true,
            include_org: true,
            include_wf: true,
            include_tables: true,
        }
    }
}

impl RelatedOptions {
    /// Whether a related candidate is dropped by the category exclusions.
    pub fn excludes(&self, id: &str) -> bool {
        (!self.include_org && id.contains(ORG_MARKER))
            || (!self.include_wf && id.contains(WF_MARKER))
            || (!self.include_tables && id.contains(TABLE_MARKER))
    }
}

/// Marks every node whose label does not contain `text` (case-insensitive)
/// as hidden. An empty search shows everything.
pub fn search_graph(mut graph: GraphData, text: &str) -> GraphData {
    let needle = text.to_lowercase();
    for node in &mut graph.nodes {
        node.hidden = !node.label.to_lowercase().contains(&needle);
    }
    graph
}

/// Ids of the records matching `query_text`; a blank query matches all.
pub fn matching_ids<'a, R: Record>(records: &'a [R], query_text: &str) -> Result<Vec<&'a str>> {
    if query_text.trim().is_empty() {
        return Ok(records.iter().map(|r| r.id()).collect());
    }
    Query::parse(query_text)?.select(records)
}

fn graph_index<'a>(
    graph: &mut StableDiGraph<&'a str, ()>,
    index: &mut HashMap<&'a str, NodeIndex>,
    id: &'a str,
) -> NodeIndex {
    *index.entry(id).or_insert_with(|| graph.add_node(id))
}

/// Depth-first walk from the seeds over edges in either direction.
///
/// Every step into a neighbour removes the edge it travelled along from the
/// working graph, so the walk ends even on cyclic graphs. Neighbours excluded
/// by `options` are neither visited nor have their edge consumed. Returns the
/// visited ids in visit order (seeds included, duplicates possible).
pub fn related_nodes<'a>(seeds: &[&str], edges: &'a [Edge], options: &RelatedOptions) -> Vec<&'a str> {
    let mut graph: StableDiGraph<&'a str, ()> = StableDiGraph::new();
    let mut index: HashMap<&'a str, NodeIndex> = HashMap::new();
    for edge in edges {
        let from = graph_index(&mut graph, &mut index, &edge.from);
        let to = graph_index(&mut graph, &mut index, &edge.to);
        graph.add_edge(from, to, ());
    }

    let mut visited = Vec::new();
    let mut stack: Vec<NodeIndex> = seeds
        .iter()
        .rev()
        .filter_map(|id| index.get(id).copied())
        .collect();

    while let Some(current) = stack.pop() {
        visited.push(graph[current]);

        let incident: Vec<(EdgeIndex, NodeIndex)> = graph
            .edges_directed(current, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .chain(
                graph
                    .edges_directed(current, Direction::Incoming)
                    .map(|e| (e.id(), e.source())),
            )
            .collect();

        let mut next = Vec::new();
        for (edge, neighbour) in incident {
            if options.excludes(graph[neighbour]) {
                continue;
            }
            // a self-loop shows up in both directions; only the first removal counts
            if graph.remove_edge(edge).is_some() {
                next.push(neighbour);
            }
        }
        stack.extend(next.into_iter().rev());
    }

    visited
}

/// Filters the nodes of `full` by `query_text`, optionally adding related
/// entities. The edges are left untouched.
pub fn filter_nodes(full: &GraphData, query_text: &str, options: &RelatedOptions) -> Result<GraphData> {
    let seeds = matching_ids(&full.nodes, query_text)?;
    let mut ids: IndexSet<&str> = seeds.iter().copied().collect();

    if options.add_related_entities {
        ids.extend(related_nodes(&seeds, &full.edges, options));
    }
    debug!(
        "Node filter matched {} seeds, {} nodes after expansion",
        seeds.len(),
        ids.len()
    );

    let by_id: HashMap<&str, &Node> = full.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let nodes = ids
        .into_iter()
        .filter_map(|id| by_id.get(id).map(|n| (*n).clone()))
        .collect();

    Ok(GraphData {
        nodes,
        edges: full.edges.clone(),
    })
}

/// Keeps the nodes of `current` and replaces its edges with the edges of
/// `full` matching `query_text`.
pub fn filter_edges(full: &GraphData, current: &GraphData, query_text: &str) -> Result<GraphData> {
    let matched: IndexSet<&str> = matching_ids(&full.edges, query_text)?.into_iter().collect();
    debug!("Edge filter matched {} edges", matched.len());

    let edges = full
        .edges
        .iter()
        .filter(|e| matched.contains(e.id.as_str()))
        .cloned()
        .collect();

    Ok(GraphData {
        nodes: current.nodes.clone(),
        edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_loop_terminates() {
        let edges = vec![Edge::new("0", "a", "a")];
        let visited = related_nodes(&["a"], &edges, &RelatedOptions::default());
        assert_eq!(visited, vec!["a", "a"]);
    }

    #[test]
    fn test_seed_without_edges_is_not_visited() {
        let edges = vec![Edge::new("0", "a", "b")];
        let visited = related_nodes(&["z"], &edges, &RelatedOptions::default());
        assert!(visited.is_empty());
    }
}
