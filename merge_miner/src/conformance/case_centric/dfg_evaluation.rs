//! Quality Evaluation of Discovered Directly-Follows Graphs
//!
//! A [`DirectlyFollowsGraph`] is evaluated by converting it into an accepting Petri net
//! ([`DfgToPetriNet`]) and replaying an event log on it ([`ConformanceChecker`]). Both steps
//! are provided by the caller; [`evaluate_dfg`] chains them into [`ConformanceStats`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::core::{process_models::case_centric::dfg::DirectlyFollowsGraph, EventLog};

/// Conversion of a [`DirectlyFollowsGraph`] (with its start and end activities) into a model
pub trait DfgToPetriNet {
    /// Accepting Petri net, i.e., net with initial and final marking
    type Model;
    /// Conversion error
    type Error;
    /// Convert `dfg` into an accepting Petri net
    fn to_petri_net(&self, dfg: &DirectlyFollowsGraph) -> Result<Self::Model, Self::Error>;
}

/// Fitness values of replaying an [`EventLog`] on a model
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReplayFitness {
    /// Percentage (0–100) of cases that fit the model perfectly
    pub percentage_of_fitting_traces: f64,
    /// Fitness of the log as a whole
    pub log_fitness: f64,
    /// Mean fitness of the individual cases
    pub average_trace_fitness: f64,
}

/// Replay-based conformance checking of an [`EventLog`] against a model
pub trait ConformanceChecker<Model> {
    /// Conformance checking error
    type Error;
    /// Fitness of `log` on `model`
    fn fitness(&self, log: &EventLog, model: &Model) -> Result<ReplayFitness, Self::Error>;
    /// Precision of `model` with respect to `log`
    fn precision(&self, log: &EventLog, model: &Model) -> Result<f64, Self::Error>;
    /// Generalization of `model` with respect to `log`
    fn generalization(&self, log: &EventLog, model: &Model) -> Result<f64, Self::Error>;
}

/// Quality scores of a discovered model on an [`EventLog`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConformanceStats {
    /// Percentage (0–100) of cases that fit the model perfectly
    pub percentage_of_fitting_traces: f64,
    /// Fitness of the log as a whole
    pub log_fitness: f64,
    /// Mean fitness of the individual cases
    pub average_trace_fitness: f64,
    /// Precision
    pub precision: f64,
    /// Generalization
    pub generalization: f64,
    /// Harmonic mean of precision and average trace fitness
    pub f1_score: f64,
}

impl ConformanceStats {
    /// Combine fitness, precision and generalization, deriving the F1 score
    pub fn new(fitness: ReplayFitness, precision: f64, generalization: f64) -> Self {
        Self {
            percentage_of_fitting_traces: fitness.percentage_of_fitting_traces,
            log_fitness: fitness.log_fitness,
            average_trace_fitness: fitness.average_trace_fitness,
            precision,
            generalization,
            f1_score: f1_score(precision, fitness.average_trace_fitness),
        }
    }
}

/// `2·p·f / (p + f)`, or `0` if both are `0`
pub fn f1_score(precision: f64, fitness: f64) -> f64 {
    let sum = precision + fitness;
    if sum == 0.0 {
        0.0
    } else {
        2.0 * precision * fitness / sum
    }
}

/// Failure of one of the two evaluation steps
#[derive(Debug, Error)]
pub enum EvaluationError<C, K> {
    /// The DFG could not be converted to a Petri net
    #[error("could not convert DFG to Petri net: {0}")]
    Conversion(C),
    /// Conformance checking failed
    #[error("conformance checking failed: {0}")]
    Conformance(K),
}

/// Convert `dfg` with `converter` and check it against `log` with `checker`
pub fn evaluate_dfg<P, C>(
    log: &EventLog,
    dfg: &DirectlyFollowsGraph,
    converter: &P,
    checker: &C,
) -> Result<ConformanceStats, EvaluationError<P::Error, C::Error>>
where
    P: DfgToPetriNet,
    C: ConformanceChecker<P::Model>,
{
    let model = converter
        .to_petri_net(dfg)
        .map_err(EvaluationError::Conversion)?;
    let fitness = checker
        .fitness(log, &model)
        .map_err(EvaluationError::Conformance)?;
    let precision = checker
        .precision(log, &model)
        .map_err(EvaluationError::Conformance)?;
    let generalization = checker
        .generalization(log, &model)
        .map_err(EvaluationError::Conformance)?;
    let stats = ConformanceStats::new(fitness, precision, generalization);
    info!(
        fitting = stats.percentage_of_fitting_traces,
        precision = stats.precision,
        f1 = stats.f1_score,
        "Evaluated DFG"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{discovery::case_centric::dfg::discover_dfg, event_log};

    /// Stands in for a Petri net: the relations allowed by the DFG
    struct RelationModel;

    impl DfgToPetriNet for RelationModel {
        type Model = HashSet<(String, String)>;
        type Error = String;

        fn to_petri_net(&self, dfg: &DirectlyFollowsGraph) -> Result<Self::Model, Self::Error> {
            if dfg.start_activities.is_empty() {
                return Err("no start activity".to_string());
            }
            Ok(dfg.directly_follows_relations.keys().cloned().collect())
        }
    }

    /// Fits a case if all of its relations are part of the model
    struct RelationChecker;

    impl ConformanceChecker<HashSet<(String, String)>> for RelationChecker {
        type Error = String;

        fn fitness(
            &self,
            log: &EventLog,
            model: &HashSet<(String, String)>,
        ) -> Result<ReplayFitness, Self::Error> {
            let fitting = log
                .cases
                .iter()
                .filter(|case| {
                    case.activities()
                        .windows(2)
                        .all(|w| model.contains(&(w[0].to_string(), w[1].to_string())))
                })
                .count();
            let ratio = fitting as f64 / log.num_cases() as f64;
            Ok(ReplayFitness {
                percentage_of_fitting_traces: ratio * 100.0,
                log_fitness: ratio,
                average_trace_fitness: ratio,
            })
        }

        fn precision(&self, _: &EventLog, _: &HashSet<(String, String)>) -> Result<f64, String> {
            Ok(0.5)
        }

        fn generalization(
            &self,
            _: &EventLog,
            _: &HashSet<(String, String)>,
        ) -> Result<f64, String> {
            Ok(0.9)
        }
    }

    #[test]
    fn f1() {
        assert_eq!(f1_score(0.0, 0.0), 0.0);
        assert_eq!(f1_score(1.0, 1.0), 1.0);
        assert!((f1_score(0.5, 1.0) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn evaluate_full_dfg() {
        let log = event_log!(["a", "b", "c"], ["a", "c"]);
        let dfg = discover_dfg(&log);
        let stats = evaluate_dfg(&log, &dfg, &RelationModel, &RelationChecker).unwrap();
        assert_eq!(stats.percentage_of_fitting_traces, 100.0);
        assert_eq!(stats.generalization, 0.9);
        assert!((stats.f1_score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn conversion_error_is_reported() {
        let log = event_log!(["a"]);
        let result = evaluate_dfg(
            &log,
            &DirectlyFollowsGraph::new(),
            &RelationModel,
            &RelationChecker,
        );
        assert!(matches!(result, Err(EvaluationError::Conversion(_))));
        assert_eq!(
            result.unwrap_err().to_string(),
            "could not convert DFG to Petri net: no start activity"
        );
    }
}
