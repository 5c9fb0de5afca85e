//! Discover [`DirectlyFollowsGraph`]s from Data

use rayon::prelude::*;

use crate::core::{process_models::case_centric::dfg::DirectlyFollowsGraph, EventLog};

/// Discover the full (unfiltered) [`DirectlyFollowsGraph`] of an [`EventLog`]
///
/// Every pair of consecutive activities in a case is a directly-follows relation, weighted
/// by its number of occurrences. Activities are annotated with their number of
/// occurrences; the first (last) activity of every non-empty case is a start (end)
/// activity.
pub fn discover_dfg(event_log: &EventLog) -> DirectlyFollowsGraph {
    event_log
        .cases
        .par_iter()
        .fold(DirectlyFollowsGraph::new, |mut result, case| {
            let activities = case.activities();
            let mut last_activity: Option<&str> = None;
            for &curr in &activities {
                result.add_activity(curr.to_string(), 1);

                if let Some(last) = last_activity.take() {
                    result.add_df_relation(last.to_string(), curr.to_string(), 1)
                } else {
                    result.add_start_activity(curr.to_string());
                }

                last_activity = Some(curr);
            }
            if let Some(last) = last_activity {
                result.add_end_activity(last.to_string());
            }
            result
        })
        .reduce(DirectlyFollowsGraph::new, merge_dfgs)
}

fn merge_dfgs(mut a: DirectlyFollowsGraph, b: DirectlyFollowsGraph) -> DirectlyFollowsGraph {
    for (activity, count) in b.activities {
        a.add_activity(activity, count);
    }
    for ((from, to), count) in b.directly_follows_relations {
        a.add_df_relation(from, to, count);
    }
    a.start_activities.extend(b.start_activities);
    a.end_activities.extend(b.end_activities);
    a
}
