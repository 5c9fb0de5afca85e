//! Union of partitioned edge sets

use std::ops::AddAssign;

use crate::core::process_models::case_centric::dfg::EdgeFrequencies;

/// Union any number of edge sets, summing the weights of shared edges
pub fn join_edge_frequencies<'a, W, I>(dfgs: I) -> EdgeFrequencies<W>
where
    W: Copy + Default + AddAssign + 'a,
    I: IntoIterator<Item = &'a EdgeFrequencies<W>>,
{
    let mut joined = EdgeFrequencies::new();
    for dfg in dfgs {
        for (edge, &weight) in dfg {
            *joined.entry(edge.clone()).or_default() += weight;
        }
    }
    joined
}

/// Union the start, middle and end edge sets of a discovery call into one graph
pub fn merge_partitioned_dfgs<W: Copy + Default + AddAssign>(
    start: &EdgeFrequencies<W>,
    middle: &EdgeFrequencies<W>,
    end: &EdgeFrequencies<W>,
) -> EdgeFrequencies<W> {
    join_edge_frequencies([middle, start, end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dfg(list: &[(&str, &str, u64)]) -> EdgeFrequencies<u64> {
        list.iter()
            .map(|&(a, b, w)| ((a.to_string(), b.to_string()), w))
            .collect()
    }

    #[test]
    fn shared_edges_are_summed() {
        let merged = merge_partitioned_dfgs(
            &dfg(&[("a", "b", 2)]),
            &dfg(&[("a", "b", 1), ("b", "c", 4)]),
            &dfg(&[("c", "d", 3)]),
        );
        assert_eq!(merged, dfg(&[("a", "b", 3), ("b", "c", 4), ("c", "d", 3)]));
    }

    #[test]
    fn merge_is_associative() {
        let a = dfg(&[("a", "b", 2), ("x", "y", 1)]);
        let b = dfg(&[("a", "b", 5), ("b", "c", 1)]);
        let c = dfg(&[("b", "c", 7), ("c", "a", 3)]);
        let empty = EdgeFrequencies::new();
        let nested = merge_partitioned_dfgs(&merge_partitioned_dfgs(&a, &b, &empty), &c, &empty);
        assert_eq!(nested, merge_partitioned_dfgs(&a, &b, &c));
        assert_eq!(nested, join_edge_frequencies([&a, &b, &c]));
    }

    #[test]
    fn normalized_weights() {
        let a: EdgeFrequencies<f64> = [(("a".into(), "b".into()), 12.5)].into_iter().collect();
        let joined = join_edge_frequencies([&a, &a]);
        assert_eq!(joined[&("a".to_string(), "b".to_string())], 25.0);
    }
}
