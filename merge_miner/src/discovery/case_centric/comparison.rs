//! Comparison of several event logs in one Directly-Follows Graph
//!
//! Every log is partitioned like in [bounded discovery](super::bounded_dfg) and the number
//! of cases containing each directly-follows relation is normalized to a percentage of the
//! log's cases. An edge is *present* in a log if its percentage reaches the similarity
//! threshold times the edge's highest percentage over all logs. Edges present in at least
//! `participation_threshold` logs are accepted; edges present in exactly one log less are
//! kept as tolerance edges for reconnecting islands.

use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
};

use itertools::Itertools;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::bounded_dfg::{
    clusters::ActivityClusters,
    frequency::count_edge_presence,
    islands::edges_to_merge_islands,
    merge::{join_edge_frequencies, merge_partitioned_dfgs},
    partition::{partition_log_edges, PartitionTriple},
    validate_trim_percentage, DiscoveryError,
};
use crate::core::{
    process_models::case_centric::dfg::{Activity, DirectlyFollowsGraph, EdgeFrequencies},
    EventLog,
};

/// Parameters of [`discover_comparison_dfg`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Fraction of an edge's highest normalized frequency a log must reach for the edge to
    /// count as present in that log, in `(0, 1]`
    pub similarity_threshold: f64,
    /// Minimal number of logs an edge must be present in
    pub participation_threshold: u64,
    /// Fraction of each case (at either side) treated as its start and end segment
    pub trim_percentage: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            participation_threshold: 2,
            trim_percentage: 0.25,
        }
    }
}

impl ComparisonConfig {
    /// Validate the parameters
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(DiscoveryError::InvalidThreshold(self.similarity_threshold));
        }
        validate_trim_percentage(self.trim_percentage)
    }
}

///
/// Percentage of cases containing each edge, per partition
///
/// A log without cases yields empty maps.
///
pub fn normalized_partition_frequencies(
    log: &EventLog,
    trim_percentage: f64,
) -> PartitionTriple<EdgeFrequencies<f64>> {
    let case_count = log.num_cases();
    if case_count == 0 {
        warn!("Event log without cases is ignored in the comparison");
        return PartitionTriple::default();
    }
    let presence = count_edge_presence(&partition_log_edges(log, trim_percentage));
    presence.map(|counts| {
        counts
            .into_iter()
            .map(|(edge, count)| (edge, count as f64 / case_count as f64 * 100.0))
            .collect()
    })
}

///
/// Number of maps in which each key is present
///
/// A key is present in a map if its value is at least `threshold` times the highest value
/// of that key over all maps. Keys missing in a map are not present in it.
///
pub fn aggregate_by_threshold<K: Eq + Hash + Clone>(
    frequency_list: &[HashMap<K, f64>],
    threshold: f64,
) -> HashMap<K, u64> {
    let mut frequencies: HashMap<&K, Vec<f64>> = HashMap::new();
    for map in frequency_list {
        for (key, &value) in map {
            frequencies.entry(key).or_default().push(value);
        }
    }
    frequencies
        .into_iter()
        .map(|(key, values)| {
            let max = values
                .iter()
                .copied()
                .map(OrderedFloat)
                .max()
                .unwrap_or_default()
                .into_inner();
            let present = values.iter().filter(|&&v| v >= max * threshold).count() as u64;
            (key.clone(), present)
        })
        .collect()
}

///
/// Split aggregated counts into accepted and tolerance entries
///
/// Entries are visited by descending count (ties by ascending key). An entry is accepted
/// if its count is at least `filter_count` and a tolerance entry if it is exactly
/// `filter_count − 1`; the scan stops at the first count below that. With
/// `filter_count = 0` every entry is accepted and there are no tolerance entries.
///
pub fn get_filtered_edges<K: Ord + Hash + Clone>(
    counts: &HashMap<K, u64>,
    filter_count: u64,
) -> (HashMap<K, u64>, HashMap<K, u64>) {
    let mut accepted = HashMap::new();
    let mut tolerance = HashMap::new();
    let sorted = counts
        .iter()
        .sorted_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
    for (key, &count) in sorted {
        if count >= filter_count {
            accepted.insert(key.clone(), count);
        } else if filter_count > 0 && count == filter_count - 1 {
            tolerance.insert(key.clone(), count);
        } else {
            break;
        }
    }
    (accepted, tolerance)
}

///
/// Edges of the comparison graph of `logs`
///
/// Accepted edges of the three partitions are joined; islands among them are reconnected
/// with the joined tolerance edges. Weights are the number of logs an edge is present in,
/// summed over the partitions.
///
pub fn comparison_edges(
    logs: &[EventLog],
    config: &ComparisonConfig,
) -> Result<EdgeFrequencies<u64>, DiscoveryError> {
    config.validate()?;

    let normalized: Vec<PartitionTriple<EdgeFrequencies<f64>>> = logs
        .par_iter()
        .map(|log| normalized_partition_frequencies(log, config.trim_percentage))
        .collect();
    let (start, middle, end): (Vec<_>, Vec<_>, Vec<_>) = normalized
        .into_iter()
        .map(|p| (p.start, p.middle, p.end))
        .multiunzip();

    let aggregated = PartitionTriple::new(start, middle, end)
        .map(|per_log| aggregate_by_threshold(&per_log, config.similarity_threshold));
    let filtered = aggregated
        .map(|counts| get_filtered_edges(&counts, config.participation_threshold));

    let accepted = merge_partitioned_dfgs(
        &filtered.start.0,
        &filtered.middle.0,
        &filtered.end.0,
    );
    let tolerance = merge_partitioned_dfgs(
        &filtered.start.1,
        &filtered.middle.1,
        &filtered.end.1,
    );

    let mut clusters = ActivityClusters::from_edges(accepted.keys());
    let islands = clusters.cluster_count();
    let new_edges = edges_to_merge_islands(&mut clusters, &tolerance);
    debug!(
        accepted = accepted.len(),
        tolerance = tolerance.len(),
        islands,
        reconnecting = new_edges.len(),
        "Filtered comparison edges"
    );
    Ok(join_edge_frequencies([&accepted, &new_edges]))
}

///
/// Start and end activities of the comparison graph
///
/// Uses the same presence aggregation as the edges, over the number of cases starting
/// (ending) with each activity in every log; activities present in at least
/// `participation_threshold` logs are returned.
///
pub fn comparison_start_end_activities(
    logs: &[EventLog],
    config: &ComparisonConfig,
) -> Result<(HashSet<Activity>, HashSet<Activity>), DiscoveryError> {
    config.validate()?;

    let (starts, ends): (Vec<HashMap<Activity, f64>>, Vec<HashMap<Activity, f64>>) = logs
        .par_iter()
        .map(|log| {
            let (start, end) = log.start_end_activity_counts();
            let to_f64 = |counts: HashMap<Activity, u64>| {
                counts
                    .into_iter()
                    .map(|(activity, count)| (activity, count as f64))
                    .collect::<HashMap<_, _>>()
            };
            (to_f64(start), to_f64(end))
        })
        .unzip();

    let select = |per_log: &[HashMap<Activity, f64>]| -> HashSet<Activity> {
        let aggregated = aggregate_by_threshold(per_log, config.similarity_threshold);
        get_filtered_edges(&aggregated, config.participation_threshold)
            .0
            .into_keys()
            .collect()
    };
    Ok((select(&starts), select(&ends)))
}

///
/// Compare several event logs in one [`DirectlyFollowsGraph`]
///
/// Relations are those of [`comparison_edges`], weighted by the number of logs they are
/// present in. The count of each activity is the sum of the weights of its incident
/// relations. Start and end activities are those of [`comparison_start_end_activities`]
/// that occur in the graph.
///
pub fn discover_comparison_dfg(
    logs: &[EventLog],
    config: &ComparisonConfig,
) -> Result<DirectlyFollowsGraph, DiscoveryError> {
    let edges = comparison_edges(logs, config)?;
    let (start, end) = comparison_start_end_activities(logs, config)?;

    let mut dfg = DirectlyFollowsGraph::from_edge_frequencies(edges);
    for activity in start {
        if dfg.contains_activity(&activity) {
            dfg.add_start_activity(activity);
        }
    }
    for activity in end {
        if dfg.contains_activity(&activity) {
            dfg.add_end_activity(activity);
        }
    }

    info!(
        logs = logs.len(),
        activities = dfg.activities.len(),
        relations = dfg.directly_follows_relations.len(),
        "Discovered comparison DFG"
    );
    Ok(dfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            event_data::case_centric::event_log_csv::{import_event_log_csv_path, CSVImportOptions},
            process_models::case_centric::dfg::Edge,
        },
        event_log,
        utils::test_utils::get_test_data_path,
    };

    fn e(a: &str, b: &str) -> Edge {
        (a.to_string(), b.to_string())
    }

    fn counts(list: &[(&str, &str, u64)]) -> HashMap<Edge, u64> {
        list.iter().map(|&(a, b, w)| (e(a, b), w)).collect()
    }

    #[test]
    fn normalization_by_case_count() {
        let log = event_log!(["a", "b", "a", "b"], ["a", "b"], ["c"], ["a", "c"]);
        let normalized = normalized_partition_frequencies(&log, 0.25);
        // <a,b,a,b>: start [a,b], middle [b,a], end [a,b]; <a,b>: middle [a,b]
        assert_eq!(normalized.start[&e("a", "b")], 25.0);
        assert_eq!(normalized.middle[&e("a", "b")], 25.0);
        assert_eq!(normalized.middle[&e("a", "c")], 25.0);
        assert_eq!(normalized.end[&e("a", "b")], 25.0);

        let empty = normalized_partition_frequencies(&EventLog::new(), 0.25);
        assert!(empty.start.is_empty() && empty.middle.is_empty() && empty.end.is_empty());
    }

    #[test]
    fn presence_is_relative_to_peak() {
        let logs: Vec<HashMap<Edge, f64>> = vec![
            [(e("a", "b"), 100.0), (e("b", "c"), 10.0)].into_iter().collect(),
            [(e("a", "b"), 70.0), (e("b", "c"), 50.0)].into_iter().collect(),
            [(e("a", "b"), 69.0)].into_iter().collect(),
        ];
        let aggregated = aggregate_by_threshold(&logs, 0.7);
        assert_eq!(aggregated[&e("a", "b")], 2);
        assert_eq!(aggregated[&e("b", "c")], 1);
    }

    #[test]
    fn filtered_and_tolerance_edges() {
        let aggregated = counts(&[
            ("a", "b", 3),
            ("b", "c", 2),
            ("c", "d", 1),
            ("d", "e", 0),
            ("x", "y", 2),
        ]);
        let (accepted, tolerance) = get_filtered_edges(&aggregated, 2);
        assert_eq!(accepted, counts(&[("a", "b", 3), ("b", "c", 2), ("x", "y", 2)]));
        assert_eq!(tolerance, counts(&[("c", "d", 1)]));

        let (accepted, tolerance) = get_filtered_edges(&aggregated, 0);
        assert_eq!(accepted, aggregated);
        assert!(tolerance.is_empty());
    }

    #[test]
    fn raising_filter_count_never_accepts_more() {
        let aggregated = counts(&[
            ("a", "b", 5),
            ("b", "c", 4),
            ("c", "d", 4),
            ("d", "e", 2),
            ("e", "f", 1),
        ]);
        let mut previous = usize::MAX;
        for filter_count in 0..8 {
            let accepted = get_filtered_edges(&aggregated, filter_count).0.len();
            assert!(accepted <= previous);
            previous = accepted;
        }
    }

    #[test]
    fn comparison_reconnects_with_tolerance_edges() {
        // <a,b,d,e> yields start (a,b), middle (b,d), end (d,e)
        let logs = vec![
            event_log!(["a", "b", "d", "e"], ["a", "b", "d", "e"]),
            event_log!(["a", "b", "d", "e"], ["a", "b", "d", "e"]),
            event_log!(["a", "b", "c", "d", "e"], ["a", "b", "c", "d", "e"]),
        ];
        let config = ComparisonConfig {
            participation_threshold: 3,
            ..Default::default()
        };
        let edges = comparison_edges(&logs, &config).unwrap();
        assert_eq!(
            edges,
            counts(&[("a", "b", 3), ("d", "e", 3), ("b", "d", 2)])
        );

        let dfg = discover_comparison_dfg(&logs, &config).unwrap();
        assert!(!dfg.contains_activity("c"));
        assert!(dfg.is_connected());
        assert_eq!(dfg.activities["b"], 5);
        assert_eq!(
            dfg.start_activities,
            ["a".to_string()].into_iter().collect::<HashSet<_>>()
        );
        assert_eq!(
            dfg.end_activities,
            ["e".to_string()].into_iter().collect::<HashSet<_>>()
        );
    }

    #[test]
    fn zero_case_log_contributes_nothing() {
        let logs = vec![
            event_log!(["a", "b", "c"], ["a", "b", "c"]),
            EventLog::new(),
        ];
        let config = ComparisonConfig {
            participation_threshold: 1,
            ..Default::default()
        };
        let dfg = discover_comparison_dfg(&logs, &config).unwrap();
        assert!(dfg.contains_df_relation(("a", "b")));
        assert!(dfg.activities.values().all(|&c| c > 0));
    }

    #[test]
    fn invalid_threshold() {
        let config = ComparisonConfig {
            similarity_threshold: 1.5,
            ..Default::default()
        };
        assert_eq!(
            discover_comparison_dfg(&[], &config),
            Err(DiscoveryError::InvalidThreshold(1.5))
        );
        let config = ComparisonConfig {
            trim_percentage: 0.75,
            ..Default::default()
        };
        assert_eq!(
            comparison_edges(&[], &config),
            Err(DiscoveryError::InvalidTrimPercentage(0.75))
        );
    }

    #[test]
    fn compare_unit_logs() {
        let logs: Vec<EventLog> = ["unit_a", "unit_b", "unit_c"]
            .into_iter()
            .map(|unit| {
                let path = get_test_data_path().join("csv").join(format!("{unit}.csv"));
                import_event_log_csv_path(path, &CSVImportOptions::default()).unwrap()
            })
            .collect();
        let dfg = discover_comparison_dfg(&logs, &ComparisonConfig::default()).unwrap();

        assert_eq!(dfg.directly_follows_relations[&e("Distribution", "Triage")], 3);
        assert_eq!(dfg.directly_follows_relations[&e("Analysis", "Decision")], 2);
        assert!(dfg.contains_df_relation(("Decision", "Appeal")));
        assert!(!dfg.contains_activity("Review"));
        assert!(dfg.is_connected());
        assert_eq!(
            dfg.start_activities,
            ["Distribution".to_string()].into_iter().collect::<HashSet<_>>()
        );
        assert_eq!(
            dfg.end_activities,
            ["Archive".to_string()].into_iter().collect::<HashSet<_>>()
        );
    }
}
