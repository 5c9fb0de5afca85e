use std::collections::{HashMap, HashSet};

use petgraph::{algo::connected_components, graph::NodeIndex, Graph};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

pub use crate::core::event_data::case_centric::Activity;

/// Directly-follows relation `(source, target)`: `target` immediately follows `source`
pub type Edge = (Activity, Activity);

/// Weight of each [`Edge`]
///
/// `W = u64` for occurrence or case counts, `W = f64` for normalized percentages.
/// Absent edges have an implicit weight of zero.
pub type EdgeFrequencies<W> = HashMap<Edge, W>;

/// A directly-follows graph of [`Activity`]s.
/// Graph containing a set of activities, a set of directly-follows relations, a set of start
/// activities, and a set of end activities.
/// Both, the number of occurrences of activities and of directly follows relations are annotated
/// with their frequency.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DirectlyFollowsGraph {
    /// Activities
    pub activities: HashMap<Activity, u64>,
    /// Directly-follows relations
    #[serde_as(as = "Vec<(_, _)>")]
    #[schemars(with = "Vec<(Edge, u64)>")]
    pub directly_follows_relations: EdgeFrequencies<u64>,
    /// Start activities
    pub start_activities: HashSet<Activity>,
    /// End activities
    pub end_activities: HashSet<Activity>,
}

impl DirectlyFollowsGraph {
    /// Create new [`DirectlyFollowsGraph`] with no activities and directly-follows relations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a [`DirectlyFollowsGraph`] from weighted edges only
    ///
    /// The count of every activity is the sum of the weights of its incident edges (a
    /// self-loop counts twice). No start or end activities are set.
    pub fn from_edge_frequencies(edges: EdgeFrequencies<u64>) -> Self {
        let mut result = Self::new();
        for ((from, to), &weight) in &edges {
            result.add_activity(from.clone(), weight);
            result.add_activity(to.clone(), weight);
        }
        result.directly_follows_relations = edges;
        result
    }

    /// Add an activity with a frequency.
    ///
    /// If the activity already exists, the frequency count is added to the existing activity.
    pub fn add_activity(&mut self, activity: Activity, frequency: u64) {
        *self.activities.entry(activity).or_default() += frequency;
    }

    /// Adds an activity to the set of start activities.
    pub fn add_start_activity(&mut self, activity: Activity) {
        self.start_activities.insert(activity);
    }

    /// Adds an activity to the set of end activities.
    pub fn add_end_activity(&mut self, activity: Activity) {
        self.end_activities.insert(activity);
    }

    /// Checks if an activity is already contained in the directly-follows graph.
    pub fn contains_activity<S: AsRef<str>>(&self, activity: S) -> bool {
        self.activities.contains_key(activity.as_ref())
    }

    /// Add a directly-follows relation with a frequency.
    ///
    /// If the directly-follows relation already exists, the frequency count is added to the
    /// existing directly-follows relation.
    pub fn add_df_relation(&mut self, from: Activity, to: Activity, frequency: u64) {
        *self
            .directly_follows_relations
            .entry((from, to))
            .or_default() += frequency;
    }

    /// Checks if a directly-follows relation is already contained in the directly-follows graph.
    pub fn contains_df_relation<S: AsRef<str>>(&self, (a, b): (S, S)) -> bool {
        self.directly_follows_relations
            .contains_key(&(a.as_ref().to_string(), b.as_ref().to_string()))
    }

    /// Activities that occur in at least one directly-follows relation
    pub fn edge_activities(&self) -> HashSet<&str> {
        self.directly_follows_relations
            .keys()
            .flat_map(|(a, b)| [a.as_str(), b.as_str()])
            .collect()
    }

    ///
    /// Convert to a [`petgraph`] graph
    ///
    /// Nodes are the activities (weighted by their label), edges the directly-follows
    /// relations (weighted by their frequency). Also returns the node index of every
    /// activity. Nodes are inserted in lexicographic order, so the conversion is
    /// deterministic.
    ///
    pub fn to_petgraph(&self) -> (Graph<&str, u64>, HashMap<&str, NodeIndex>) {
        let mut labels: Vec<&str> = self
            .activities
            .keys()
            .map(String::as_str)
            .chain(self.edge_activities())
            .collect();
        labels.sort_unstable();
        labels.dedup();

        let mut graph = Graph::with_capacity(labels.len(), self.directly_follows_relations.len());
        let nodes: HashMap<&str, NodeIndex> = labels
            .into_iter()
            .map(|label| (label, graph.add_node(label)))
            .collect();
        for ((from, to), &weight) in &self.directly_follows_relations {
            graph.add_edge(nodes[from.as_str()], nodes[to.as_str()], weight);
        }
        (graph, nodes)
    }

    /// Returns `true` if all activities form a single weakly connected component
    ///
    /// The empty graph counts as connected.
    pub fn is_connected(&self) -> bool {
        let (graph, _) = self.to_petgraph();
        graph.node_count() == 0 || connected_components(&graph) == 1
    }
}

#[cfg(test)]
mod tests {
    pub const SAMPLE_JSON_DFG: &str = r#"
{
    "activities": {
        "Sleep": 13,
        "Cook": 3,
        "Work": 11,
        "Have fun": 9
    },
    "directly_follows_relations": [
        [
            ["Work","Sleep"],
            4
        ],
        [
            ["Have fun","Sleep"],
            9
        ],
        [
            ["Work","Have fun"],
            6
        ],
        [
            ["Cook","Have fun"],
            3
        ]
    ],
    "start_activities": [
        "Work",
        "Cook"
    ],
    "end_activities": [
        "Work",
        "Sleep"
    ]
}"#;

    use super::*;

    fn sample_graph() -> DirectlyFollowsGraph {
        let mut graph = DirectlyFollowsGraph::new();
        graph.add_activity("Work".into(), 11);
        graph.add_start_activity("Work".into());
        graph.add_end_activity("Work".into());

        graph.add_activity("Cook".into(), 3);
        graph.add_start_activity("Cook".into());

        graph.add_activity("Have fun".into(), 9);
        graph.add_df_relation("Work".into(), "Have fun".into(), 6);
        graph.add_df_relation("Cook".into(), "Have fun".into(), 3);

        graph.add_activity("Sleep".into(), 13);
        graph.add_df_relation("Work".into(), "Sleep".into(), 4);
        graph.add_df_relation("Have fun".into(), "Sleep".into(), 9);
        graph.add_end_activity("Sleep".into());
        graph
    }

    #[test]
    fn directly_follows_graph() {
        let graph = sample_graph();

        let mut test_hashmap = HashMap::new();
        test_hashmap.insert("Work".into(), 11);
        test_hashmap.insert("Cook".into(), 3);
        test_hashmap.insert("Have fun".into(), 9);
        test_hashmap.insert("Sleep".into(), 13);
        assert_eq!(graph.activities, test_hashmap);
        assert_eq!(graph.directly_follows_relations[&("Work".into(), "Sleep".into())], 4);
        assert!(graph.contains_df_relation(("Cook", "Have fun")));
        assert!(!graph.contains_df_relation(("Have fun", "Cook")));
    }

    #[test]
    fn deserialize_dfg_test() {
        let dfg = serde_json::from_str::<DirectlyFollowsGraph>(SAMPLE_JSON_DFG).unwrap();
        assert!(dfg.activities.len() == 4);
        assert!(dfg.directly_follows_relations.len() == 4);
        assert!(dfg.start_activities.len() == 2);
        assert!(dfg.end_activities.len() == 2);
        assert_eq!(dfg, sample_graph());
    }

    #[test]
    fn json_round_trip() {
        let graph = sample_graph();
        let json = serde_json::to_string(&graph).unwrap();
        assert_eq!(
            serde_json::from_str::<DirectlyFollowsGraph>(&json).unwrap(),
            graph
        );
    }

    #[test]
    fn edge_frequencies_sum_incident_weights() {
        let edges: EdgeFrequencies<u64> = [
            (("a".to_string(), "b".to_string()), 2),
            (("b".to_string(), "b".to_string()), 1),
            (("b".to_string(), "c".to_string()), 5),
        ]
        .into_iter()
        .collect();
        let dfg = DirectlyFollowsGraph::from_edge_frequencies(edges);
        assert_eq!(dfg.activities["a"], 2);
        assert_eq!(dfg.activities["b"], 2 + 1 + 1 + 5);
        assert_eq!(dfg.activities["c"], 5);
        assert!(dfg.start_activities.is_empty());
    }

    #[test]
    fn petgraph_conversion_and_connectivity() {
        let mut graph = sample_graph();
        let (pg, nodes) = graph.to_petgraph();
        assert_eq!(pg.node_count(), 4);
        assert_eq!(pg.edge_count(), 4);
        assert_eq!(pg[nodes["Cook"]], "Cook");
        assert!(graph.is_connected());

        graph.add_df_relation("x".into(), "y".into(), 1);
        assert!(!graph.is_connected());
        assert!(DirectlyFollowsGraph::new().is_connected());
    }
}
