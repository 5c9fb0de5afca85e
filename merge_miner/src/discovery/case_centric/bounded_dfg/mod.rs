//! Bounded Directly-Follows Graph Discovery
//!
//! Discovers a [`DirectlyFollowsGraph`] of bounded size from an [`EventLog`]:
//!
//! 1. every case is split into start, middle and end segments ([`partition`]),
//! 2. the directly-follows relations of each partition are counted ([`frequency`]),
//! 3. the most frequent relations are selected per partition under a budget of distinct
//!    activities, forcing in must-keep activities when possible ([`selection`]),
//! 4. the three selections are merged ([`merge`]) and disconnected islands are repaired
//!    ([`islands`]).
//!
//! ```rust
//! use merge_miner::discovery::case_centric::bounded_dfg::{discover_bounded_dfg, DiscoveryConfig};
//! use merge_miner::event_log;
//!
//! let log = event_log!(
//!     ["register", "check", "decide", "notify"],
//!     ["register", "decide", "check", "decide", "notify"],
//! );
//! let config = DiscoveryConfig {
//!     max_edges: 3,
//!     ..Default::default()
//! };
//! let dfg = discover_bounded_dfg(&log, &config).unwrap();
//! assert!(dfg.activities.len() <= 3);
//! ```
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::{
    process_models::case_centric::dfg::{Activity, DirectlyFollowsGraph, EdgeFrequencies},
    EventLog,
};

pub mod clusters;
pub mod frequency;
pub mod islands;
pub mod merge;
pub mod partition;
pub mod selection;

use clusters::ActivityClusters;
use frequency::{count_edges, sort_edges_by_weight};
use islands::{resolve_islands, IslandStrategy};
use merge::merge_partitioned_dfgs;
use partition::partition_log_edges;
use selection::EdgeSelector;

/// Errors for invalid discovery or comparison parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiscoveryError {
    /// The trim percentage must be in `(0, 0.5]`
    #[error("trim percentage must be in (0, 0.5], got {0}")]
    InvalidTrimPercentage(f64),
    /// The similarity threshold must be in `(0, 1]`
    #[error("similarity threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),
    /// The activity budget must allow at least one activity
    #[error("the activity budget (max_edges) must be at least 1")]
    ZeroActivityBudget,
}

/// Check that a trim percentage lies in `(0, 0.5]`
pub(crate) fn validate_trim_percentage(trim_percentage: f64) -> Result<(), DiscoveryError> {
    if trim_percentage > 0.0 && trim_percentage <= 0.5 {
        Ok(())
    } else {
        Err(DiscoveryError::InvalidTrimPercentage(trim_percentage))
    }
}

/// Parameters of [`discover_bounded_dfg`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Maximal number of distinct activities in the result
    pub max_edges: usize,
    /// Activities to include whenever they are connected to the selected graph
    pub must_keep: Vec<Activity>,
    /// Fraction of each case (at either side) treated as its start and end segment
    pub trim_percentage: f64,
    /// Handling of disconnected islands after selection
    pub islands: IslandStrategy,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_edges: 100,
            must_keep: Vec::new(),
            trim_percentage: 0.1,
            islands: IslandStrategy::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Validate the parameters
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if self.max_edges == 0 {
            return Err(DiscoveryError::ZeroActivityBudget);
        }
        validate_trim_percentage(self.trim_percentage)
    }

    ///
    /// Split [`DiscoveryConfig::max_edges`] into the budgets of the start, middle and end
    /// selection
    ///
    /// Start and end each get `round(max_edges · trim_percentage)` (at most half of the
    /// budget), the middle gets the rest.
    ///
    pub fn partition_budgets(&self) -> (usize, usize, usize) {
        let side = ((self.max_edges as f64 * self.trim_percentage).round() as usize)
            .min(self.max_edges / 2);
        (side, self.max_edges - 2 * side, side)
    }
}

///
/// Select the edges of a bounded directly-follows graph
///
/// Returns the selected edges with their total occurrence count. See the
/// [module documentation](self) for the steps involved.
///
pub fn discover_bounded_edges(
    log: &EventLog,
    config: &DiscoveryConfig,
) -> Result<EdgeFrequencies<u64>, DiscoveryError> {
    config.validate()?;

    let partitions = partition_log_edges(log, config.trim_percentage);
    let counts = count_edges(&partitions);
    let all_edges = merge_partitioned_dfgs(&counts.start, &counts.middle, &counts.end);
    debug!(
        cases = partitions.len(),
        start = counts.start.len(),
        middle = counts.middle.len(),
        end = counts.end.len(),
        "Counted partitioned edges"
    );

    let (start_budget, middle_budget, end_budget) = config.partition_budgets();
    let mut selector = EdgeSelector::new();
    let start = selector.select(
        &sort_edges_by_weight(&counts.start),
        start_budget,
        &config.must_keep,
    );
    let end = selector.select(
        &sort_edges_by_weight(&counts.end),
        end_budget,
        &config.must_keep,
    );
    let middle = selector.select(
        &sort_edges_by_weight(&counts.middle),
        middle_budget,
        &config.must_keep,
    );

    let [start, middle, end]: [EdgeFrequencies<u64>; 3] =
        [start, middle, end].map(|edges| edges.into_iter().collect());
    let selected = merge_partitioned_dfgs(&start, &middle, &end);
    let clusters: ActivityClusters = selector.into_clusters();
    Ok(resolve_islands(selected, clusters, &all_edges, config.islands))
}

///
/// Discover a bounded [`DirectlyFollowsGraph`] from an [`EventLog`]
///
/// The relations are those of [`discover_bounded_edges`]. Activities carry their number of
/// occurrences in the log; start and end activities are those of the log that are part of
/// the selected graph.
///
pub fn discover_bounded_dfg(
    log: &EventLog,
    config: &DiscoveryConfig,
) -> Result<DirectlyFollowsGraph, DiscoveryError> {
    let edges = discover_bounded_edges(log, config)?;

    let mut dfg = DirectlyFollowsGraph::new();
    dfg.directly_follows_relations = edges;
    let included: Vec<Activity> = dfg.edge_activities().into_iter().map(String::from).collect();

    let activity_counts = log.activity_counts();
    let (start, end) = log.start_end_activities();
    for activity in included {
        let count = activity_counts.get(&activity).copied().unwrap_or_default();
        if start.contains(&activity) {
            dfg.add_start_activity(activity.clone());
        }
        if end.contains(&activity) {
            dfg.add_end_activity(activity.clone());
        }
        dfg.add_activity(activity, count);
    }

    info!(
        cases = log.num_cases(),
        activities = dfg.activities.len(),
        relations = dfg.directly_follows_relations.len(),
        max_edges = config.max_edges,
        "Discovered bounded DFG"
    );
    Ok(dfg)
}
