//! Splitting cases into start, middle and end segments
//!
//! The first and last `⌈len·p⌉` activities of a case form its start and end segments, the
//! remainder its middle segment. The activity at each segment boundary is shared by both
//! neighbouring segments, so every boundary relation (the "bridge") is visible in the
//! side partition as well as in the middle partition.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{process_models::case_centric::dfg::Edge, EventLog};

/// Start, middle and end part of something derived from a case or log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionTriple<T> {
    /// Beginning of the case(s)
    pub start: T,
    /// Everything between start and end
    pub middle: T,
    /// End of the case(s)
    pub end: T,
}

impl<T> PartitionTriple<T> {
    /// Create a new [`PartitionTriple`]
    pub fn new(start: T, middle: T, end: T) -> Self {
        Self { start, middle, end }
    }

    /// Apply `f` to each of the three parts
    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> PartitionTriple<U> {
        PartitionTriple {
            start: f(self.start),
            middle: f(self.middle),
            end: f(self.end),
        }
    }
}

///
/// Split an activity sequence into start, middle and end segments
///
/// `side = ⌈len·p⌉`; position `i` goes to start if `i < side`, to end if
/// `i ≥ len − side`, and to middle otherwise. Afterwards:
///  - if start is longer than end, its last activity moves to the front of middle;
///  - if middle is empty, it becomes the bridge `[last of start, first of end]`;
///  - otherwise the first middle activity is appended to start and the last middle
///    activity is prepended to end.
///
/// For a non-empty input the three segments hold `len + 2` activities in total.
/// An empty input yields three empty segments.
///
pub fn partition_trace<'a>(
    activities: &[&'a str],
    trim_percentage: f64,
) -> PartitionTriple<Vec<&'a str>> {
    let len = activities.len();
    let side = (len as f64 * trim_percentage).ceil() as usize;

    let mut start = Vec::with_capacity(side + 1);
    let mut middle = Vec::with_capacity(len.saturating_sub(2 * side) + 2);
    let mut end = Vec::with_capacity(side + 1);
    for (i, &activity) in activities.iter().enumerate() {
        if i < side {
            start.push(activity);
        } else if i + side >= len {
            end.push(activity);
        } else {
            middle.push(activity);
        }
    }

    if start.len() > end.len() {
        if let Some(last) = start.pop() {
            middle.insert(0, last);
        }
    }

    match (middle.first(), middle.last()) {
        (Some(&first), Some(&last)) => {
            start.push(first);
            end.insert(0, last);
        }
        _ => {
            if let (Some(&last_start), Some(&first_end)) = (start.last(), end.first()) {
                middle = vec![last_start, first_end];
            }
        }
    }

    PartitionTriple { start, middle, end }
}

/// Directly-follows relations of an activity sequence (sliding window of size two)
pub fn trace_edges(activities: &[&str]) -> Vec<Edge> {
    activities
        .windows(2)
        .map(|w| (w[0].to_string(), w[1].to_string()))
        .collect()
}

/// Partition a single activity sequence and derive the edges of every segment
pub fn partition_trace_edges(
    activities: &[&str],
    trim_percentage: f64,
) -> PartitionTriple<Vec<Edge>> {
    partition_trace(activities, trim_percentage).map(|segment| trace_edges(&segment))
}

///
/// Partition every case of an [`EventLog`]
///
/// Returns one [`PartitionTriple`] of edge lists per case, in case order. Cases are
/// processed in parallel.
///
pub fn partition_log_edges(
    log: &EventLog,
    trim_percentage: f64,
) -> Vec<PartitionTriple<Vec<Edge>>> {
    log.cases
        .par_iter()
        .map(|case| partition_trace_edges(&case.activities(), trim_percentage))
        .collect()
}
