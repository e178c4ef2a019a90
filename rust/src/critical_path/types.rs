//! Types for critical path analysis.

use crate::graph::ActivityGraph;
use crate::interner::ActivityIdx;

/// Relative tolerance for treating two times as equal (slack zero, tight edges).
pub const TIME_EPSILON: f64 = 1e-9;

/// Absolute tolerance for a schedule whose makespan is `makespan`.
///
/// Rounding in `latest_finish - duration` grows with the magnitude of the
/// times, so the tolerance scales with the makespan and never drops below
/// `TIME_EPSILON`.
#[inline]
pub fn time_tolerance(makespan: f64) -> f64 {
    TIME_EPSILON * makespan.abs().max(1.0)
}

/// Per-activity timing information.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActivityTiming {
    /// Earliest possible start time (from forward pass).
    pub earliest_start: f64,
    /// Earliest possible finish time (from forward pass).
    pub earliest_finish: f64,
    /// Latest allowable start time (from backward pass).
    pub latest_start: f64,
    /// Latest allowable finish time (from backward pass).
    pub latest_finish: f64,
    /// Slack = latest_start - earliest_start.
    pub slack: f64,
}

impl ActivityTiming {
    /// Slack within rounding of the backward pass is stored as exactly zero,
    /// so this holds for critical activities at any time scale.
    pub fn is_critical(&self) -> bool {
        self.slack.abs() < TIME_EPSILON
    }

    pub fn duration(&self) -> f64 {
        self.earliest_finish - self.earliest_start
    }
}

/// Full schedule of one scenario: a timing per activity of the graph.
#[derive(Clone, Debug)]
pub struct Schedule<'g> {
    graph: &'g ActivityGraph,
    timings: Vec<ActivityTiming>,
}

impl<'g> Schedule<'g> {
    pub(crate) fn new(graph: &'g ActivityGraph, timings: Vec<ActivityTiming>) -> Self {
        Self { graph, timings }
    }

    pub fn graph(&self) -> &'g ActivityGraph {
        self.graph
    }

    /// Timing of the activity with the given ID.
    pub fn get(&self, id: &str) -> Option<&ActivityTiming> {
        self.graph
            .index_of(id)
            .and_then(|idx| self.timings.get(idx as usize))
    }

    #[inline]
    pub fn timing(&self, idx: ActivityIdx) -> Option<&ActivityTiming> {
        self.timings.get(idx as usize)
    }

    /// Timings indexed by activity index.
    pub fn timings(&self) -> &[ActivityTiming] {
        &self.timings
    }

    /// `(id, timing)` pairs in topological order.
    pub fn iter(&self) -> impl Iterator<Item = (&'g str, &ActivityTiming)> + '_ {
        let graph = self.graph;
        graph
            .topological_indices()
            .iter()
            .filter_map(move |&idx| graph.id_of(idx).map(|id| (id, &self.timings[idx as usize])))
    }

    pub fn len(&self) -> usize {
        self.timings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timings.is_empty()
    }
}

/// Makespan and critical paths of one scenario.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CriticalPathResult {
    /// Project duration: maximum earliest finish over all activities.
    pub makespan: f64,
    /// Zero-slack activities, in topological order.
    pub critical_activities: Vec<String>,
    /// Every chain of critical activities from a source to an activity
    /// finishing at the makespan.
    pub paths: Vec<Vec<String>>,
    /// Activities starting at time zero, ascending by ID.
    pub starting_activities: Vec<String>,
    /// Activities finishing at the makespan, ascending by ID.
    pub finishing_activities: Vec<String>,
    /// Sum of all durations.
    pub total_work: f64,
    /// Sum of all earliest finish times.
    pub total_finish: f64,
}

impl CriticalPathResult {
    /// The first critical path, if any.
    pub fn primary_path(&self) -> Option<&[String]> {
        self.paths.first().map(Vec::as_slice)
    }

    pub fn is_critical(&self, id: &str) -> bool {
        self.critical_activities.iter().any(|c| c == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_timing_critical() {
        let timing = ActivityTiming {
            earliest_start: 0.0,
            earliest_finish: 5.0,
            latest_start: 0.0,
            latest_finish: 5.0,
            slack: 0.0,
        };
        assert!(timing.is_critical());
        assert_eq!(timing.duration(), 5.0);

        let timing_with_slack = ActivityTiming {
            earliest_start: 0.0,
            earliest_finish: 5.0,
            latest_start: 2.0,
            latest_finish: 7.0,
            slack: 2.0,
        };
        assert!(!timing_with_slack.is_critical());
    }

    #[test]
    fn test_time_tolerance_scales_with_makespan() {
        assert_eq!(time_tolerance(0.0), TIME_EPSILON);
        assert_eq!(time_tolerance(0.5), TIME_EPSILON);
        assert!((time_tolerance(1e8) - 0.1).abs() < 1e-12);
        assert!((time_tolerance(-1e8) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_primary_path() {
        let mut result = CriticalPathResult::default();
        assert!(result.primary_path().is_none());

        result.paths = vec![vec!["a".into(), "b".into()], vec!["c".into()]];
        result.critical_activities = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(result.primary_path(), Some(&["a".to_string(), "b".to_string()][..]));
        assert!(result.is_critical("c"));
        assert!(!result.is_critical("d"));
    }
}
