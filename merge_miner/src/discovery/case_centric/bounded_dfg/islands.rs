//! Repairing disconnected selections (islands)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{clusters::ActivityClusters, frequency::sort_edges_by_weight};
use crate::core::process_models::case_centric::dfg::EdgeFrequencies;

/// How disconnected parts of a selected graph are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum IslandStrategy {
    /// Keep all islands
    Keep,
    /// Keep only the largest island
    LargestOnly,
    /// Reconnect islands using the best candidate edges, keep what stays disconnected
    Reconnect,
    /// Reconnect islands, then keep only the largest remaining island
    #[default]
    ReconnectThenLargest,
}

///
/// Keep only the edges of the largest island
///
/// Islands are recomputed from `dfg`. Every edge touching an activity of a smaller island
/// is dropped. Ties between equally large islands are broken as in
/// [`ActivityClusters::clusters`].
///
pub fn filter_by_largest_island<W: Copy>(dfg: &EdgeFrequencies<W>) -> EdgeFrequencies<W> {
    let clusters = ActivityClusters::from_edges(dfg.keys());
    let Some(largest) = clusters.clusters().into_iter().next() else {
        return EdgeFrequencies::new();
    };
    dfg.iter()
        .filter(|((a, b), _)| largest.contains(a) && largest.contains(b))
        .map(|(edge, &w)| (edge.clone(), w))
        .collect()
}

///
/// Edges that connect the islands in `clusters`
///
/// Candidates are visited by descending weight. A candidate is accepted when both
/// endpoints are tracked by `clusters` and lie in different islands; the islands are then
/// merged. The search stops once a single island remains. No island is ever created, so
/// at most `cluster_count − 1` edges are returned.
///
pub fn edges_to_merge_islands<W: Ord + Copy>(
    clusters: &mut ActivityClusters,
    candidates: &EdgeFrequencies<W>,
) -> EdgeFrequencies<W> {
    let mut edges_to_merge = EdgeFrequencies::new();
    if clusters.cluster_count() <= 1 {
        return edges_to_merge;
    }
    for ((a, b), weight) in sort_edges_by_weight(candidates) {
        if clusters.union(&a, &b) {
            edges_to_merge.insert((a, b), weight);
            if clusters.cluster_count() == 1 {
                break;
            }
        }
    }
    edges_to_merge
}

///
/// Apply an [`IslandStrategy`] to a selected edge set
///
/// `clusters` must describe the islands of `selected`; `candidates` are the edges that
/// may be used to reconnect them (usually every observed edge).
///
pub fn resolve_islands(
    mut selected: EdgeFrequencies<u64>,
    mut clusters: ActivityClusters,
    candidates: &EdgeFrequencies<u64>,
    strategy: IslandStrategy,
) -> EdgeFrequencies<u64> {
    let islands = clusters.cluster_count();
    if matches!(
        strategy,
        IslandStrategy::Reconnect | IslandStrategy::ReconnectThenLargest
    ) {
        let unselected: EdgeFrequencies<u64> = candidates
            .iter()
            .filter(|(edge, _)| !selected.contains_key(*edge))
            .map(|(edge, &w)| (edge.clone(), w))
            .collect();
        for (edge, weight) in edges_to_merge_islands(&mut clusters, &unselected) {
            *selected.entry(edge).or_default() += weight;
        }
    }
    if clusters.cluster_count() > 1
        && matches!(
            strategy,
            IslandStrategy::LargestOnly | IslandStrategy::ReconnectThenLargest
        )
    {
        selected = filter_by_largest_island(&selected);
    }
    debug!(
        ?strategy,
        islands_before = islands,
        islands_after = remaining_islands(&selected),
        "Resolved islands"
    );
    selected
}

fn remaining_islands(dfg: &EdgeFrequencies<u64>) -> usize {
    ActivityClusters::from_edges(dfg.keys()).cluster_count()
}
