//! Greedy, budgeted selection of directly-follows relations

use std::collections::HashSet;

use tracing::debug;

use super::clusters::ActivityClusters;
use crate::core::process_models::case_centric::dfg::{Activity, Edge};

///
/// Greedy edge selector bounded by the number of distinct activities
///
/// The selector remembers which activities were introduced and how they are connected.
/// One selector is used for all partitions of a discovery call, so the budget of each
/// [`EdgeSelector::select`] call only pays for activities that are new to the graph.
///
#[derive(Debug, Clone, Default)]
pub struct EdgeSelector {
    introduced: HashSet<Activity>,
    clusters: ActivityClusters,
}

impl EdgeSelector {
    /// Create a selector with no introduced activities
    pub fn new() -> Self {
        Self::default()
    }

    /// Activities introduced by the edges selected so far
    pub fn introduced(&self) -> &HashSet<Activity> {
        &self.introduced
    }

    /// Clusters of the edges selected so far
    pub fn clusters(&self) -> &ActivityClusters {
        &self.clusters
    }

    /// Consume the selector, keeping the cluster state
    pub fn into_clusters(self) -> ActivityClusters {
        self.clusters
    }

    /// Number of activities of `(a, b)` that are not yet introduced
    fn cost(&self, (a, b): &Edge) -> usize {
        let new_a = !self.introduced.contains(a);
        let new_b = a != b && !self.introduced.contains(b);
        usize::from(new_a) + usize::from(new_b)
    }

    fn take(&mut self, (edge, weight): &(Edge, u64), selected: &mut Vec<(Edge, u64)>) {
        let (a, b) = edge;
        self.introduced.insert(a.clone());
        self.introduced.insert(b.clone());
        self.clusters.add_edge(a, b);
        selected.push((edge.clone(), *weight));
    }

    /// Take unpicked edges in order while they fit into `limit` newly introduced activities
    fn fill(
        &mut self,
        edges: &[(Edge, u64)],
        picked: &mut [bool],
        selected: &mut Vec<(Edge, u64)>,
        initial: usize,
        limit: usize,
    ) {
        for (i, candidate) in edges.iter().enumerate() {
            let used = self.introduced.len() - initial;
            if used >= limit {
                break;
            }
            if picked[i] || self.cost(&candidate.0) > limit - used {
                continue;
            }
            picked[i] = true;
            self.take(candidate, selected);
        }
    }

    ///
    /// Select edges from `edges` introducing at most `budget` new activities
    ///
    /// `edges` must be sorted by descending weight (see
    /// [`sort_edges_by_weight`](super::frequency::sort_edges_by_weight)).
    ///
    ///  1. Free phase: take edges in order while they fit into `budget − |K|` new
    ///     activities, where `K` are the must-keep activities not yet introduced.
    ///  2. Must-keep phase: take edges joining a pending must-keep activity to an already
    ///     introduced one; each taken edge satisfies its must-keep endpoint.
    ///  3. Top-up phase: take remaining edges in order while they fit into `budget`.
    ///
    /// An edge that does not fit is skipped and the scan continues, so the bound is strict.
    /// Edges between introduced activities cost nothing. Must-keep activities that never
    /// touch an introduced activity are dropped silently.
    ///
    /// Returns the selected edges in selection order.
    ///
    pub fn select(
        &mut self,
        edges: &[(Edge, u64)],
        budget: usize,
        must_keep: &[Activity],
    ) -> Vec<(Edge, u64)> {
        let initial = self.introduced.len();
        let mut picked = vec![false; edges.len()];
        let mut selected = Vec::new();

        let mut pending: HashSet<&str> = must_keep
            .iter()
            .map(String::as_str)
            .filter(|k| !self.introduced.contains(*k))
            .collect();

        self.fill(
            edges,
            &mut picked,
            &mut selected,
            initial,
            budget.saturating_sub(pending.len()),
        );
        let after_free = selected.len();

        pending.retain(|k| !self.introduced.contains(*k));
        for (i, candidate) in edges.iter().enumerate() {
            if pending.is_empty() || self.introduced.len() - initial >= budget {
                break;
            }
            let (a, b) = &candidate.0;
            let attaches = (pending.contains(a.as_str()) && self.introduced.contains(b))
                || (pending.contains(b.as_str()) && self.introduced.contains(a));
            if picked[i] || !attaches {
                continue;
            }
            picked[i] = true;
            pending.remove(a.as_str());
            pending.remove(b.as_str());
            self.take(candidate, &mut selected);
        }
        let after_must_keep = selected.len();

        self.fill(edges, &mut picked, &mut selected, initial, budget);

        debug!(
            candidates = edges.len(),
            budget,
            free = after_free,
            must_keep = after_must_keep - after_free,
            top_up = selected.len() - after_must_keep,
            unreachable_must_keep = pending.len(),
            "Selected edges"
        );
        selected
    }
}
