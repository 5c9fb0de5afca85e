//! Counting directly-follows relations per partition

use std::collections::HashSet;

use itertools::Itertools;
use rayon::prelude::*;

use super::partition::PartitionTriple;
use crate::core::process_models::case_centric::dfg::{Edge, EdgeFrequencies};

fn add_counts<'a, I: IntoIterator<Item = &'a Edge>>(counts: &mut EdgeFrequencies<u64>, edges: I) {
    for edge in edges {
        match counts.get_mut(edge) {
            Some(c) => *c += 1,
            None => {
                counts.insert(edge.clone(), 1);
            }
        }
    }
}

fn sum_counts(
    mut a: PartitionTriple<EdgeFrequencies<u64>>,
    b: PartitionTriple<EdgeFrequencies<u64>>,
) -> PartitionTriple<EdgeFrequencies<u64>> {
    for (target, source) in [
        (&mut a.start, b.start),
        (&mut a.middle, b.middle),
        (&mut a.end, b.end),
    ] {
        for (edge, count) in source {
            *target.entry(edge).or_default() += count;
        }
    }
    a
}

///
/// Number of occurrences of every edge, per partition
///
/// `partitions` holds one [`PartitionTriple`] of edge lists per case (see
/// [`partition_log_edges`](super::partition::partition_log_edges)).
///
pub fn count_edges(
    partitions: &[PartitionTriple<Vec<Edge>>],
) -> PartitionTriple<EdgeFrequencies<u64>> {
    partitions
        .par_iter()
        .fold(PartitionTriple::default, |mut acc, case| {
            add_counts(&mut acc.start, &case.start);
            add_counts(&mut acc.middle, &case.middle);
            add_counts(&mut acc.end, &case.end);
            acc
        })
        .reduce(PartitionTriple::default, sum_counts)
}

///
/// Number of cases containing every edge, per partition
///
/// Like [`count_edges`], but an edge occurring several times in the same partition of a
/// case is counted once.
///
pub fn count_edge_presence(
    partitions: &[PartitionTriple<Vec<Edge>>],
) -> PartitionTriple<EdgeFrequencies<u64>> {
    partitions
        .par_iter()
        .fold(PartitionTriple::default, |mut acc, case| {
            add_counts(&mut acc.start, case.start.iter().collect::<HashSet<_>>());
            add_counts(&mut acc.middle, case.middle.iter().collect::<HashSet<_>>());
            add_counts(&mut acc.end, case.end.iter().collect::<HashSet<_>>());
            acc
        })
        .reduce(PartitionTriple::default, sum_counts)
}

///
/// Edges ordered by descending weight
///
/// Ties are broken by ascending source, then ascending target activity, so the order is
/// fully deterministic.
///
pub fn sort_edges_by_weight<W: Ord + Copy>(edges: &EdgeFrequencies<W>) -> Vec<(Edge, W)> {
    edges
        .iter()
        .sorted_by(|(ea, wa), (eb, wb)| wb.cmp(wa).then_with(|| ea.cmp(eb)))
        .map(|(edge, &w)| (edge.clone(), w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::case_centric::bounded_dfg::partition::partition_log_edges;
    use crate::event_log;

    fn e(a: &str, b: &str) -> Edge {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn counts_follow_partition_example() {
        let log = event_log!(["A", "B", "C"], ["A", "C"], ["A", "B", "C", "D"]);
        let counts = count_edges(&partition_log_edges(&log, 0.34));
        assert_eq!(counts.start.get(&e("A", "B")), Some(&2));
        assert_eq!(counts.middle.get(&e("A", "C")), Some(&1));
        assert_eq!(counts.middle.get(&e("B", "C")), Some(&1));
        assert_eq!(counts.end.get(&e("B", "C")), Some(&1));
        assert_eq!(counts.end.get(&e("C", "D")), Some(&1));
        assert_eq!(counts.start.get(&e("A", "C")), None);
    }

    #[test]
    fn presence_counts_each_case_once() {
        let log = event_log!(
            ["s", "a", "b", "a", "b", "a", "b", "a", "b", "e"],
            ["s", "a", "b", "e"]
        );
        let parts = partition_log_edges(&log, 0.1);
        let counts = count_edges(&parts);
        let presence = count_edge_presence(&parts);
        assert_eq!(counts.middle[&e("a", "b")], 4 + 1);
        assert_eq!(presence.middle[&e("a", "b")], 2);
        assert!(presence
            .middle
            .iter()
            .all(|(edge, &p)| p <= counts.middle[edge] && p <= 2));
    }

    #[test]
    fn sorting_is_deterministic() {
        let edges: EdgeFrequencies<u64> = [
            (e("b", "a"), 3),
            (e("a", "z"), 3),
            (e("a", "c"), 3),
            (e("x", "y"), 9),
            (e("c", "c"), 1),
        ]
        .into_iter()
        .collect();
        let sorted: Vec<_> = sort_edges_by_weight(&edges)
            .into_iter()
            .map(|(edge, _)| edge)
            .collect();
        assert_eq!(
            sorted,
            vec![e("x", "y"), e("a", "c"), e("a", "z"), e("b", "a"), e("c", "c")]
        );
    }
}
