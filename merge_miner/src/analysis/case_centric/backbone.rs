//! Backbone of a Directly-Follows Graph
//!
//! The backbone is the longest simple path of activities along directly-follows relations,
//! a compact summary of the "main" process flow.

use petgraph::{graph::NodeIndex, Direction};

use crate::core::process_models::case_centric::dfg::{Activity, DirectlyFollowsGraph};

/// Number of path extensions [`dfg_backbone`] may try before giving up
pub const DEFAULT_BACKBONE_SEARCH_LIMIT: usize = 100_000;

///
/// Longest simple path of activities in `dfg`
///
/// Paths follow the directly-follows relations and never visit an activity twice.
/// Start activities and successors are explored in lexicographic order, and the first
/// path of maximal length found wins, so the result is deterministic.
///
/// Finding the longest simple path is exponential in the worst case, so the search is
/// capped at [`DEFAULT_BACKBONE_SEARCH_LIMIT`] path extensions. Returns `None` if the
/// cap is reached before the search space is exhausted. See [`dfg_backbone_with_limit`].
///
pub fn dfg_backbone(dfg: &DirectlyFollowsGraph) -> Option<Vec<Activity>> {
    dfg_backbone_with_limit(dfg, DEFAULT_BACKBONE_SEARCH_LIMIT)
}

///
/// Longest simple path of activities in `dfg`, trying at most `max_steps` path extensions
///
/// The search stops early once a path visits every activity. Returns `None` if more than
/// `max_steps` extensions would be needed to prove the result is the longest path.
///
pub fn dfg_backbone_with_limit(
    dfg: &DirectlyFollowsGraph,
    max_steps: usize,
) -> Option<Vec<Activity>> {
    let (graph, nodes) = dfg.to_petgraph();

    let mut successors: Vec<Vec<NodeIndex>> = vec![Vec::new(); graph.node_count()];
    for node in graph.node_indices() {
        let mut next: Vec<NodeIndex> = graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        next.sort_by_key(|n| graph[*n]);
        next.dedup();
        successors[node.index()] = next;
    }

    let mut starts: Vec<(&str, NodeIndex)> = nodes.into_iter().collect();
    starts.sort_unstable();

    let mut search = PathSearch {
        successors,
        on_path: vec![false; graph.node_count()],
        path: Vec::new(),
        longest: Vec::new(),
        steps_left: max_steps,
    };
    for (_, start) in starts {
        if search.is_complete() {
            break;
        }
        search.extend(start)?;
    }

    Some(
        search
            .longest
            .into_iter()
            .map(|n| graph[n].to_string())
            .collect(),
    )
}

struct PathSearch {
    successors: Vec<Vec<NodeIndex>>,
    on_path: Vec<bool>,
    path: Vec<NodeIndex>,
    longest: Vec<NodeIndex>,
    steps_left: usize,
}

impl PathSearch {
    /// The longest path visits every node, nothing can beat it
    fn is_complete(&self) -> bool {
        self.longest.len() == self.successors.len()
    }

    /// Depth-first extension of the current path by `node`
    ///
    /// Returns `None` once the step budget is used up.
    fn extend(&mut self, node: NodeIndex) -> Option<()> {
        self.steps_left = self.steps_left.checked_sub(1)?;
        self.on_path[node.index()] = true;
        self.path.push(node);
        if self.path.len() > self.longest.len() {
            self.longest.clone_from(&self.path);
        }
        let mut i = 0;
        while i < self.successors[node.index()].len() && !self.is_complete() {
            let next = self.successors[node.index()][i];
            if !self.on_path[next.index()] {
                self.extend(next)?;
            }
            i += 1;
        }
        self.path.pop();
        self.on_path[node.index()] = false;
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn dfg(list: &[(&str, &str)]) -> DirectlyFollowsGraph {
        DirectlyFollowsGraph::from_edge_frequencies(
            list.iter()
                .map(|&(a, b)| ((a.to_string(), b.to_string()), 1))
                .collect(),
        )
    }

    /// Every activity directly follows every other one
    fn complete_dfg(activities: &[String]) -> DirectlyFollowsGraph {
        DirectlyFollowsGraph::from_edge_frequencies(
            activities
                .iter()
                .flat_map(|a| {
                    activities
                        .iter()
                        .filter(move |b| *b != a)
                        .map(move |b| ((a.clone(), b.clone()), 1))
                })
                .collect(),
        )
    }

    fn labels(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i:02}")).collect()
    }

    #[test]
    fn longest_simple_path() {
        let graph = dfg(&[
            ("a", "b"),
            ("b", "c"),
            ("c", "b"),
            ("b", "e"),
            ("c", "d"),
            ("d", "e"),
            ("x", "a"),
        ]);
        assert_eq!(
            dfg_backbone(&graph),
            Some(vec![
                "x".to_string(),
                "a".into(),
                "b".into(),
                "c".into(),
                "d".into(),
                "e".into()
            ])
        );
    }

    #[test]
    fn ties_resolve_lexicographically() {
        let graph = dfg(&[("a", "c"), ("a", "b"), ("b", "d"), ("c", "d")]);
        assert_eq!(
            dfg_backbone(&graph),
            Some(vec!["a".to_string(), "b".into(), "d".into()])
        );

        let cycle = dfg(&[("b", "a"), ("a", "b")]);
        assert_eq!(dfg_backbone(&cycle), Some(vec!["a".to_string(), "b".into()]));
    }

    #[test]
    fn empty_graph() {
        assert_eq!(dfg_backbone(&DirectlyFollowsGraph::new()), Some(Vec::new()));
        let mut single = DirectlyFollowsGraph::new();
        single.add_activity("a".into(), 1);
        assert_eq!(dfg_backbone(&single), Some(vec!["a".to_string()]));
    }

    #[test]
    fn complete_graph_stops_at_first_full_path() {
        let activities = labels("a", 60);
        let graph = complete_dfg(&activities);
        assert_eq!(graph.directly_follows_relations.len(), 60 * 59);

        let now = Instant::now();
        let backbone = dfg_backbone(&graph);
        assert!(now.elapsed() < Duration::from_secs(5));
        assert_eq!(backbone, Some(activities));
    }

    #[test]
    fn dense_graph_without_full_path_hits_limit() {
        // Sinks are reachable from every core activity but lead nowhere, so no path
        // visits all activities and the search cannot stop early.
        let core = labels("a", 12);
        let mut graph = complete_dfg(&core);
        for sink in labels("z", 3) {
            for a in &core {
                graph.add_df_relation(a.clone(), sink.clone(), 1);
            }
            graph.add_activity(sink, 1);
        }

        let now = Instant::now();
        assert_eq!(dfg_backbone(&graph), None);
        assert!(now.elapsed() < Duration::from_secs(5));

        assert_eq!(dfg_backbone_with_limit(&graph, 0), None);
    }

    #[test]
    fn limit_large_enough_for_small_graphs() {
        let graph = dfg(&[("a", "b"), ("b", "c"), ("a", "c")]);
        // a, a-b, a-b-c: the full path is found after three extensions
        assert_eq!(
            dfg_backbone_with_limit(&graph, 3),
            Some(vec!["a".to_string(), "b".into(), "c".into()])
        );
        assert_eq!(dfg_backbone_with_limit(&graph, 2), None);
    }
}
