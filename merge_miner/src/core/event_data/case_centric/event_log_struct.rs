use chrono::{DateTime, FixedOffset, TimeDelta};
use itertools::Itertools;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[cfg(feature = "dataframes")]
use polars::error::PolarsError;
#[cfg(feature = "dataframes")]
use polars::frame::DataFrame;

#[cfg(feature = "dataframes")]
use crate::core::event_data::case_centric::dataframe::convert_event_log_to_dataframe;

/// Activity label of an event
///
/// Activities are opaque identifiers: two events belong to the same activity iff their
/// labels are equal.
pub type Activity = String;

///
/// A single event of a [`Case`]: an activity and the moment it was recorded
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Event {
    /// Activity label
    pub activity: Activity,
    /// (Completion) timestamp
    pub timestamp: DateTime<FixedOffset>,
}

impl Event {
    /// Create a new [`Event`]
    pub fn new<S: Into<Activity>>(activity: S, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            activity: activity.into(),
            timestamp,
        }
    }
}

///
/// A case (trace): the events sharing one case identifier
///
/// Events are expected in ascending timestamp order. Constructors of this crate sort them
/// (stable, so events with equal timestamps keep their insertion order); if events are
/// pushed manually, [`Case::sort_events`] restores the order.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Case {
    /// Case identifier
    pub id: String,
    /// Events of this case
    pub events: Vec<Event>,
}

impl Case {
    /// Create a new [`Case`] from events, sorting them by timestamp
    pub fn new<S: Into<String>>(id: S, events: Vec<Event>) -> Self {
        let mut case = Self {
            id: id.into(),
            events,
        };
        case.sort_events();
        case
    }

    /// Stable sort of the events by ascending timestamp
    pub fn sort_events(&mut self) {
        self.events.sort_by_key(|e| e.timestamp);
    }

    /// Number of events in this case
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the case has no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Activity labels of this case in timestamp order
    ///
    /// Falls back to a stable sort of the labels if the events were not ordered.
    pub fn activities(&self) -> Vec<&str> {
        let ordered = self
            .events
            .iter()
            .tuple_windows()
            .all(|(a, b)| a.timestamp <= b.timestamp);
        if ordered {
            self.events.iter().map(|e| e.activity.as_str()).collect()
        } else {
            self.events
                .iter()
                .sorted_by_key(|e| e.timestamp)
                .map(|e| e.activity.as_str())
                .collect()
        }
    }

    /// First activity of the case (if any)
    pub fn start_activity(&self) -> Option<&str> {
        self.activities().first().copied()
    }

    /// Last activity of the case (if any)
    pub fn end_activity(&self) -> Option<&str> {
        self.activities().last().copied()
    }
}

///
/// Canonical event log: a collection of [`Case`]s
///
/// This is the normalized table (case id, activity, timestamp) that discovery works on.
/// See [`EventLog::from_rows`] for building it from flat event rows.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EventLog {
    /// Cases of the event log
    pub cases: Vec<Case>,
}

impl EventLog {
    /// Create a new, empty [`EventLog`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an [`EventLog`] from already grouped [`Case`]s
    pub fn from_cases(cases: Vec<Case>) -> Self {
        Self { cases }
    }

    ///
    /// Build an [`EventLog`] from flat `(case id, activity, timestamp)` rows
    ///
    /// Rows are grouped by case id; cases are ordered by their id and events of each case
    /// by timestamp (stable).
    ///
    pub fn from_rows<I, C, A>(rows: I) -> Self
    where
        I: IntoIterator<Item = (C, A, DateTime<FixedOffset>)>,
        C: Into<String>,
        A: Into<Activity>,
    {
        let mut grouped: HashMap<String, Vec<Event>> = HashMap::new();
        for (case_id, activity, timestamp) in rows {
            grouped
                .entry(case_id.into())
                .or_default()
                .push(Event::new(activity, timestamp));
        }
        let cases = grouped
            .into_iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(id, events)| Case::new(id, events))
            .collect();
        Self { cases }
    }

    ///
    /// Build an [`EventLog`] from plain activity sequences
    ///
    /// Case ids are the sequence indices; the first event of every case is placed at the
    /// unix epoch, each following event one hour later.
    ///
    /// ```rust
    /// use merge_miner::core::EventLog;
    ///
    /// let log = EventLog::from_activity_sequences([vec!["a", "b"], vec!["a", "c", "b"]]);
    /// assert_eq!(log.num_cases(), 2);
    /// assert_eq!(log.num_events(), 5);
    /// ```
    pub fn from_activity_sequences<I, T, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = S>,
        S: Into<Activity>,
    {
        let epoch = DateTime::UNIX_EPOCH.fixed_offset();
        let cases = sequences
            .into_iter()
            .enumerate()
            .map(|(idx, seq)| {
                let events = seq
                    .into_iter()
                    .enumerate()
                    .map(|(i, act)| Event::new(act, epoch + TimeDelta::hours(i as i64)))
                    .collect();
                Case::new(idx.to_string(), events)
            })
            .collect();
        Self { cases }
    }

    /// Number of cases
    pub fn num_cases(&self) -> usize {
        self.cases.len()
    }

    /// Total number of events over all cases
    pub fn num_events(&self) -> usize {
        self.cases.iter().map(Case::len).sum()
    }

    /// Returns `true` if the log has no cases
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Number of occurrences of each activity in the log
    pub fn activity_counts(&self) -> HashMap<Activity, u64> {
        let mut counts: HashMap<Activity, u64> = HashMap::new();
        self.cases
            .iter()
            .flat_map(|c| c.events.iter())
            .for_each(|e| *counts.entry(e.activity.clone()).or_default() += 1);
        counts
    }

    ///
    /// Number of cases starting (resp. ending) with each activity
    ///
    /// Empty cases are ignored.
    pub fn start_end_activity_counts(&self) -> (HashMap<Activity, u64>, HashMap<Activity, u64>) {
        let mut start: HashMap<Activity, u64> = HashMap::new();
        let mut end: HashMap<Activity, u64> = HashMap::new();
        for case in &self.cases {
            let acts = case.activities();
            if let (Some(first), Some(last)) = (acts.first(), acts.last()) {
                *start.entry(first.to_string()).or_default() += 1;
                *end.entry(last.to_string()).or_default() += 1;
            }
        }
        (start, end)
    }

    /// Sets of activities that start (resp. end) at least one case
    pub fn start_end_activities(&self) -> (HashSet<Activity>, HashSet<Activity>) {
        let (start, end) = self.start_end_activity_counts();
        (start.into_keys().collect(), end.into_keys().collect())
    }

    #[cfg(feature = "dataframes")]
    /// Convert to a polars [`DataFrame`] with the canonical column names
    ///
    /// Only available with the `dataframes` feature.
    pub fn to_dataframe(&self) -> Result<DataFrame, PolarsError> {
        convert_event_log_to_dataframe(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(hours: i64) -> DateTime<FixedOffset> {
        DateTime::UNIX_EPOCH.fixed_offset() + TimeDelta::hours(hours)
    }

    #[test]
    fn rows_are_grouped_and_sorted() {
        let log = EventLog::from_rows(vec![
            ("2", "x", ts(0)),
            ("1", "b", ts(5)),
            ("1", "a", ts(1)),
            ("2", "y", ts(1)),
            ("1", "c", ts(5)),
        ]);
        assert_eq!(log.num_cases(), 2);
        assert_eq!(log.cases[0].id, "1");
        assert_eq!(log.cases[0].activities(), vec!["a", "b", "c"]);
        assert_eq!(log.cases[1].activities(), vec!["x", "y"]);
    }

    #[test]
    fn unordered_case_is_read_in_timestamp_order() {
        let case = Case {
            id: "c".into(),
            events: vec![Event::new("late", ts(3)), Event::new("early", ts(1))],
        };
        assert_eq!(case.activities(), vec!["early", "late"]);
        assert_eq!(case.start_activity(), Some("early"));
        assert_eq!(case.end_activity(), Some("late"));
    }

    #[test]
    fn start_end_counts() {
        let log = EventLog::from_activity_sequences([
            vec!["a", "b", "c"],
            vec!["a", "c"],
            vec!["b"],
            vec![],
        ]);
        let (start, end) = log.start_end_activity_counts();
        assert_eq!(start.get("a"), Some(&2));
        assert_eq!(start.get("b"), Some(&1));
        assert_eq!(end.get("c"), Some(&2));
        assert_eq!(end.get("b"), Some(&1));
        assert_eq!(log.activity_counts().get("c"), Some(&2));
    }

    #[test]
    fn json_round_trip() {
        let log = EventLog::from_activity_sequences([vec!["a", "b"]]);
        let json = serde_json::to_string(&log).unwrap();
        let back: EventLog = serde_json::from_str(&json).unwrap();
        assert_eq!(log, back);
    }
}
