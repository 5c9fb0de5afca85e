//! Incremental connectivity of selected activities

use std::collections::{BTreeSet, HashMap};

use crate::core::process_models::case_centric::dfg::{Activity, Edge};

///
/// Clusters (islands) of activities connected by selected edges
///
/// Disjoint-set forest keyed by activity (union by size). Clusters only ever merge; an
/// activity belongs to exactly one cluster once it has been tracked.
///
#[derive(Debug, Clone, Default)]
pub struct ActivityClusters {
    index: HashMap<Activity, usize>,
    activities: Vec<Activity>,
    parent: Vec<usize>,
    size: Vec<usize>,
    count: usize,
}

impl ActivityClusters {
    /// Create an empty [`ActivityClusters`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clusters of the undirected graph spanned by `edges`
    pub fn from_edges<'a, I: IntoIterator<Item = &'a Edge>>(edges: I) -> Self {
        let mut clusters = Self::new();
        for (a, b) in edges {
            clusters.add_edge(a, b);
        }
        clusters
    }

    fn track(&mut self, activity: &str) -> usize {
        if let Some(&i) = self.index.get(activity) {
            return i;
        }
        let i = self.activities.len();
        self.index.insert(activity.to_string(), i);
        self.activities.push(activity.to_string());
        self.parent.push(i);
        self.size.push(1);
        self.count += 1;
        i
    }

    fn root(&self, mut i: usize) -> usize {
        while self.parent[i] != i {
            i = self.parent[i];
        }
        i
    }

    fn union_roots(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.root(a), self.root(b));
        if ra == rb {
            return false;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        self.count -= 1;
        true
    }

    ///
    /// Record the selection of edge `(a, b)`
    ///
    /// Creates the cluster `{a, b}` if neither is tracked, attaches the untracked endpoint
    /// to the cluster of the other one, or merges the two clusters.
    ///
    pub fn add_edge(&mut self, a: &str, b: &str) {
        let ia = self.track(a);
        let ib = self.track(b);
        self.union_roots(ia, ib);
    }

    ///
    /// Merge the clusters of two tracked activities
    ///
    /// Returns `true` if two different clusters were merged. Untracked activities are never
    /// added; the call returns `false` for them.
    ///
    pub fn union(&mut self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&ia), Some(&ib)) => self.union_roots(ia, ib),
            _ => false,
        }
    }

    /// Representative of the cluster containing `activity` (if tracked)
    pub fn find(&self, activity: &str) -> Option<&str> {
        self.index
            .get(activity)
            .map(|&i| self.activities[self.root(i)].as_str())
    }

    /// Returns `true` if both activities are tracked and in the same cluster
    pub fn same_cluster(&self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&ia), Some(&ib)) => self.root(ia) == self.root(ib),
            _ => false,
        }
    }

    /// Returns `true` if `activity` belongs to some cluster
    pub fn contains(&self, activity: &str) -> bool {
        self.index.contains_key(activity)
    }

    /// Number of clusters
    pub fn cluster_count(&self) -> usize {
        self.count
    }

    /// Number of tracked activities
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// Returns `true` if no activity is tracked
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    ///
    /// All clusters, largest first
    ///
    /// Clusters of equal size are ordered by their smallest activity, so the first
    /// cluster is a deterministic choice of "the largest island".
    ///
    pub fn clusters(&self) -> Vec<BTreeSet<Activity>> {
        let mut by_root: HashMap<usize, BTreeSet<Activity>> = HashMap::new();
        for (i, activity) in self.activities.iter().enumerate() {
            by_root
                .entry(self.root(i))
                .or_default()
                .insert(activity.clone());
        }
        let mut clusters: Vec<BTreeSet<Activity>> = by_root.into_values().collect();
        clusters.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.first().cmp(&b.first())));
        clusters
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn set(items: &[&str]) -> BTreeSet<Activity> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn add_edge_cases() {
        let mut c = ActivityClusters::new();
        c.add_edge("a", "b");
        c.add_edge("c", "d");
        assert_eq!(c.cluster_count(), 2);
        c.add_edge("b", "e");
        assert!(c.same_cluster("a", "e"));
        c.add_edge("e", "c");
        assert_eq!(c.cluster_count(), 1);
        assert_eq!(c.clusters(), vec![set(&["a", "b", "c", "d", "e"])]);
        c.add_edge("f", "f");
        assert_eq!(c.cluster_count(), 2);
        assert_eq!(c.find("f"), Some("f"));
        assert_eq!(c.find("zz"), None);
    }

    #[test]
    fn union_only_joins_tracked_activities() {
        let mut c = ActivityClusters::from_edges(&[
            ("a".to_string(), "b".to_string()),
            ("c".to_string(), "d".to_string()),
        ]);
        assert!(!c.union("a", "x"));
        assert!(!c.contains("x"));
        assert!(c.union("b", "c"));
        assert!(!c.union("a", "d"));
        assert_eq!(c.cluster_count(), 1);
    }

    #[test]
    fn clusters_remain_a_partition() {
        let edges = [
            ("a", "b"),
            ("c", "d"),
            ("e", "e"),
            ("b", "c"),
            ("x", "y"),
            ("d", "a"),
            ("y", "e"),
        ];
        let mut c = ActivityClusters::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for (a, b) in edges {
            c.add_edge(a, b);
            seen.insert(a);
            seen.insert(b);
            let clusters = c.clusters();
            assert_eq!(clusters.len(), c.cluster_count());
            let total: usize = clusters.iter().map(BTreeSet::len).sum();
            assert_eq!(total, seen.len());
            let union: HashSet<&str> = clusters.iter().flatten().map(String::as_str).collect();
            assert_eq!(union, seen);
        }
        assert_eq!(c.cluster_count(), 2);
    }

    #[test]
    fn largest_cluster_tie_break() {
        let mut c = ActivityClusters::new();
        c.add_edge("m", "n");
        c.add_edge("b", "z");
        c.add_edge("q", "q");
        let clusters = c.clusters();
        assert_eq!(clusters[0], set(&["b", "z"]));
        assert_eq!(clusters[1], set(&["m", "n"]));
        assert_eq!(clusters[2], set(&["q"]));
    }
}
