/// Create an [`EventLog`] from activity sequences.
///
/// Each bracketed list becomes one case, identified by its index in the invocation.
/// The first event of every case is placed at the unix epoch and each following event
/// one hour later (see [`EventLog::from_activity_sequences`]).
///
/// # Examples
///
/// ```rust
/// use merge_miner::event_log;
///
/// // Create an event log with cases <a,b,c,d> and <a,c,b,d>
/// let log = event_log!(
///     ["a", "b", "c", "d"],
///     ["a", "c", "b", "d"],
/// );
/// assert_eq!(log.num_cases(), 2);
/// assert_eq!(log.cases[1].id, "1");
/// ```
///
/// [`EventLog`]: crate::core::EventLog
/// [`EventLog::from_activity_sequences`]: crate::core::EventLog::from_activity_sequences
#[macro_export]
macro_rules! event_log {
    ($([$($activity:expr),* $(,)?]),* $(,)?) => {{
        let sequences: ::std::vec::Vec<::std::vec::Vec<::std::string::String>> = vec![
            $(
                vec![$(::std::string::String::from($activity)),*]
            ),*
        ];
        $crate::core::EventLog::from_activity_sequences(sequences)
    }};
}
