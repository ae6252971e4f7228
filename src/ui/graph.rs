//! Directed relation graph between states: which state hands off to which,
//! and how often, across the visible records.

use std::collections::{BTreeMap, HashSet};

use crate::profile::ProfiledMessage;
use crate::view::{Compose, GraphBody, GraphEdge, NodeBody, ViewNode};

pub const RELATION_GRAPH_VIEW_ID: &str = "relation-graph-view";

/// Nodes are distinct state names in first-seen order; an edge counts how
/// many times one state is immediately followed by another inside a single
/// record's path.
#[derive(Debug)]
pub struct RelationGraphView {
    id: String,
    nodes: Vec<String>,
    edges: Vec<GraphEdge>,
}

impl RelationGraphView {
    pub fn new(id: impl Into<String>, visible: &[&ProfiledMessage]) -> Self {
        let mut nodes = Vec::new();
        let mut seen = HashSet::new();
        let mut transitions: BTreeMap<(String, String), u64> = BTreeMap::new();

        for record in visible {
            for visit in &record.states {
                if seen.insert(visit.name.clone()) {
                    nodes.push(visit.name.clone());
                }
            }
            for pair in record.states.windows(2) {
                *transitions
                    .entry((pair[0].name.clone(), pair[1].name.clone()))
                    .or_default() += 1;
            }
        }

        let edges = transitions
            .into_iter()
            .map(|((from, to), count)| GraphEdge { from, to, count })
            .collect();

        Self {
            id: id.into(),
            nodes,
            edges,
        }
    }
}

impl Compose for RelationGraphView {
    fn compose(&self) -> ViewNode {
        ViewNode::new(
            self.id.clone(),
            NodeBody::RelationGraph(GraphBody {
                nodes: self.nodes.clone(),
                edges: self.edges.clone(),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::profile::parse_profiles;

    #[test]
    fn edges_count_adjacent_visits_across_records() {
        let profiles = parse_profiles(
            r#"[
                {
                    "message": { "tags": [] },
                    "states": [ { "name": "A" }, { "name": "B" }, { "name": "C" } ]
                },
                {
                    "message": { "tags": [] },
                    "states": [ { "name": "A" }, { "name": "B" } ]
                }
            ]"#,
        )
        .expect("fixture should parse");
        let visible: Vec<_> = profiles.iter().collect();

        let node = RelationGraphView::new(RELATION_GRAPH_VIEW_ID, &visible).compose();

        assert_eq!(node.id(), RELATION_GRAPH_VIEW_ID);
        let NodeBody::RelationGraph(body) = node.body() else {
            panic!("graph view should compose a graph body");
        };
        assert_eq!(body.nodes, vec!["A", "B", "C"]);

        let edges: Vec<_> = body
            .edges
            .iter()
            .map(|edge| (edge.from.as_str(), edge.to.as_str(), edge.count))
            .collect();
        assert_eq!(edges, vec![("A", "B", 2), ("B", "C", 1)]);
    }

    #[test]
    fn single_visit_records_yield_nodes_but_no_edges() {
        let profiles = parse_profiles(
            r#"[ { "message": { "tags": [] }, "states": [ { "name": "Solo" } ] } ]"#,
        )
        .expect("fixture should parse");
        let visible: Vec<_> = profiles.iter().collect();

        let node = RelationGraphView::new(RELATION_GRAPH_VIEW_ID, &visible).compose();

        let NodeBody::RelationGraph(body) = node.body() else {
            panic!("graph view should compose a graph body");
        };
        assert_eq!(body.nodes, vec!["Solo"]);
        assert!(body.edges.is_empty());
    }
}
