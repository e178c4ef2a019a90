//! Backward pass, slack, and critical path enumeration.

use crate::interner::ActivityIdx;
use crate::scenario::DurationScenario;
use crate::solver::{EarliestSchedule, SolverError};
use crate::{log_debug, log_passes};

use super::types::{time_tolerance, ActivityTiming, CriticalPathResult, Schedule};

/// Annotates an earliest-time schedule with latest times and slack, and
/// extracts the critical paths.
///
/// Stateless between calls; one extractor may serve many scenarios concurrently.
#[derive(Clone, Debug, Default)]
pub struct CriticalPathExtractor {
    verbosity: u8,
}

impl CriticalPathExtractor {
    pub fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }

    /// Run the backward pass over `earliest` and collect the critical paths.
    ///
    /// # Returns
    /// * `Err(SolverError::Unexpected)` if `earliest` does not cover exactly
    ///   the activities of the scenario's graph
    pub fn extract<'g>(
        &self,
        scenario: &DurationScenario<'g>,
        earliest: EarliestSchedule,
    ) -> Result<(Schedule<'g>, CriticalPathResult), SolverError> {
        let graph = scenario.graph();
        let n = graph.len();

        if earliest.earliest_start.len() != n || earliest.earliest_finish.len() != n {
            return Err(SolverError::Unexpected(format!(
                "schedule covers {} activities, graph has {}",
                earliest.len(),
                n
            )));
        }

        let makespan = earliest
            .earliest_finish
            .iter()
            .copied()
            .fold(0.0_f64, f64::max);
        let tolerance = time_tolerance(makespan);

        let mut timings: Vec<ActivityTiming> = earliest
            .earliest_start
            .iter()
            .zip(&earliest.earliest_finish)
            .map(|(&earliest_start, &earliest_finish)| ActivityTiming {
                earliest_start,
                earliest_finish,
                latest_start: 0.0,  // Will be filled in backward pass
                latest_finish: 0.0, // Will be filled in backward pass
                slack: 0.0,         // Will be computed after backward pass
            })
            .collect();

        // Backward pass: compute latest start/finish times (reverse topological order)
        for &idx in graph.topological_indices().iter().rev() {
            // Find minimum latest_start of all activities that depend on this one
            let latest_finish = graph
                .successors(idx)
                .iter()
                .map(|&succ| timings[succ as usize].latest_start)
                .fold(makespan, f64::min);

            let timing = &mut timings[idx as usize];
            timing.latest_finish = latest_finish;
            timing.latest_start = latest_finish - scenario.duration(idx);
            timing.slack = timing.latest_start - timing.earliest_start;
            if timing.slack.abs() < tolerance {
                // Rounding noise from `latest_finish - duration`
                timing.slack = 0.0;
                timing.latest_start = timing.earliest_start;
                timing.latest_finish = timing.earliest_finish;
            }

            log_passes!(
                self.verbosity,
                "[{}] backward {}: latest_start={} latest_finish={} slack={}",
                scenario.name(),
                graph.id_of(idx).unwrap_or("?"),
                timing.latest_start,
                timing.latest_finish,
                timing.slack
            );
        }

        let name_of = |idx: ActivityIdx| graph.id_of(idx).unwrap_or_default().to_string();

        let critical_activities: Vec<String> = graph
            .topological_indices()
            .iter()
            .filter(|&&idx| timings[idx as usize].is_critical())
            .map(|&idx| name_of(idx))
            .collect();

        let paths: Vec<Vec<String>> = enumerate_critical_paths(scenario, &timings, makespan, self.verbosity)
            .into_iter()
            .map(|path| path.into_iter().map(name_of).collect())
            .collect();

        log_debug!(
            self.verbosity,
            "[{}] {} critical activities, {} critical paths",
            scenario.name(),
            critical_activities.len(),
            paths.len()
        );

        let starting_activities: Vec<String> = (0..n as ActivityIdx)
            .filter(|&idx| timings[idx as usize].earliest_start.abs() < tolerance)
            .map(name_of)
            .collect();

        let finishing_activities: Vec<String> = (0..n as ActivityIdx)
            .filter(|&idx| (timings[idx as usize].earliest_finish - makespan).abs() < tolerance)
            .map(name_of)
            .collect();

        let result = CriticalPathResult {
            makespan,
            critical_activities,
            paths,
            starting_activities,
            finishing_activities,
            total_work: scenario.total_work(),
            total_finish: earliest.earliest_finish.iter().sum(),
        };

        Ok((Schedule::new(graph, timings), result))
    }
}

/// Depth-first enumeration of critical chains.
///
/// A chain starts at a critical activity without predecessors and only follows
/// edges into critical successors that start exactly when their predecessor
/// finishes. Sources and successors are visited in ascending index order, so the
/// output is sorted by first divergence.
fn enumerate_critical_paths(
    scenario: &DurationScenario<'_>,
    timings: &[ActivityTiming],
    makespan: f64,
    verbosity: u8,
) -> Vec<Vec<ActivityIdx>> {
    let graph = scenario.graph();
    let tolerance = time_tolerance(makespan);
    let name_of = |idx: ActivityIdx| graph.id_of(idx).unwrap_or("?");
    let mut paths = Vec::new();

    let tight_successors = |idx: ActivityIdx| -> Vec<ActivityIdx> {
        let finish = timings[idx as usize].earliest_finish;
        graph
            .successors(idx)
            .iter()
            .copied()
            .filter(|&succ| {
                let timing = &timings[succ as usize];
                timing.is_critical() && (timing.earliest_start - finish).abs() < tolerance
            })
            .collect()
    };

    for source in graph.sources() {
        if !timings[source as usize].is_critical() {
            log_debug!(
                verbosity,
                "[{}] paths: skip source {} (slack={})",
                scenario.name(),
                name_of(source),
                timings[source as usize].slack
            );
            continue;
        }

        // Explicit stack of (activity, next successor to try)
        let mut path: Vec<ActivityIdx> = vec![source];
        let mut stack: Vec<(Vec<ActivityIdx>, usize)> = vec![(tight_successors(source), 0)];

        while let Some((successors, cursor)) = stack.last_mut() {
            if successors.is_empty() && *cursor == 0 {
                // Dead end: emit if it reaches the makespan
                *cursor = 1;
                let Some(&last) = path.last() else {
                    break;
                };
                if (timings[last as usize].earliest_finish - makespan).abs() < tolerance {
                    log_debug!(
                        verbosity,
                        "[{}] paths: emit {}",
                        scenario.name(),
                        path.iter().map(|&idx| name_of(idx)).collect::<Vec<_>>().join(" -> ")
                    );
                    paths.push(path.clone());
                } else {
                    log_debug!(
                        verbosity,
                        "[{}] paths: drop chain ending at {} (finish={})",
                        scenario.name(),
                        name_of(last),
                        timings[last as usize].earliest_finish
                    );
                }
                continue;
            }

            if let Some(&next) = successors.get(*cursor) {
                *cursor += 1;
                path.push(next);
                stack.push((tight_successors(next), 0));
            } else {
                stack.pop();
                path.pop();
            }
        }
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ActivityGraph;
    use crate::models::Activity;
    use crate::solver::{ForwardPass, ScheduleStrategy};

    fn make_activity(id: &str, preds: &[&str]) -> Activity {
        Activity::new(id, preds.iter().copied())
    }

    fn analyze<'g>(
        graph: &'g ActivityGraph,
        durations: &[(&str, f64)],
    ) -> (Schedule<'g>, CriticalPathResult) {
        let scenario = DurationScenario::bind(graph, "test", durations.iter().copied()).unwrap();
        let earliest = ForwardPass::default().solve(&scenario).unwrap();
        CriticalPathExtractor::default()
            .extract(&scenario, earliest)
            .unwrap()
    }

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_activity_critical_path() {
        let graph = ActivityGraph::build(&[make_activity("a", &[])]).unwrap();
        let (schedule, result) = analyze(&graph, &[("a", 5.0)]);

        assert_eq!(result.makespan, 5.0);
        assert_eq!(result.total_work, 5.0);
        assert_eq!(result.paths, vec![strings(&["a"])]);
        assert!(schedule.get("a").unwrap().is_critical());
    }

    #[test]
    fn test_chain_critical_path() {
        // a -> b -> c (all on critical path)
        let graph = ActivityGraph::build(&[
            make_activity("a", &[]),
            make_activity("b", &["a"]),
            make_activity("c", &["b"]),
        ])
        .unwrap();
        let (_, result) = analyze(&graph, &[("a", 2.0), ("b", 3.0), ("c", 4.0)]);

        assert_eq!(result.makespan, 9.0); // 2 + 3 + 4
        assert_eq!(result.critical_activities, strings(&["a", "b", "c"]));
        assert_eq!(result.paths, vec![strings(&["a", "b", "c"])]);
    }

    #[test]
    fn test_parallel_paths_with_slack() {
        // a (2) -> target (1)
        // b (5) -> target (1)
        let graph = ActivityGraph::build(&[
            make_activity("a", &[]),
            make_activity("b", &[]),
            make_activity("target", &["a", "b"]),
        ])
        .unwrap();
        let (schedule, result) = analyze(&graph, &[("a", 2.0), ("b", 5.0), ("target", 1.0)]);

        assert_eq!(result.makespan, 6.0);
        assert_eq!(result.total_work, 8.0);
        assert_eq!(result.paths, vec![strings(&["b", "target"])]);

        let a_timing = schedule.get("a").unwrap();
        assert!((a_timing.slack - 3.0).abs() < 1e-9);
        assert_eq!(a_timing.latest_start, 3.0);
        assert_eq!(a_timing.latest_finish, 5.0);
    }

    #[test]
    fn test_diamond_dependency() {
        // a -> b -> d
        // a -> c -> d
        // Path via c is longer (critical)
        let graph = ActivityGraph::build(&[
            make_activity("a", &[]),
            make_activity("b", &["a"]),
            make_activity("c", &["a"]),
            make_activity("d", &["b", "c"]),
        ])
        .unwrap();
        let (schedule, result) =
            analyze(&graph, &[("a", 2.0), ("b", 3.0), ("c", 5.0), ("d", 1.0)]);

        assert_eq!(result.makespan, 8.0);
        assert_eq!(result.paths, vec![strings(&["a", "c", "d"])]);
        assert!((schedule.get("b").unwrap().slack - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_multiple_critical_paths_reported() {
        // Both branches of the diamond have equal length
        let graph = ActivityGraph::build(&[
            make_activity("a", &[]),
            make_activity("b", &["a"]),
            make_activity("c", &["a"]),
            make_activity("d", &["b", "c"]),
            make_activity("x", &[]),
        ])
        .unwrap();
        let (_, result) = analyze(
            &graph,
            &[("a", 1.0), ("b", 4.0), ("c", 4.0), ("d", 2.0), ("x", 7.0)],
        );

        assert_eq!(result.makespan, 7.0);
        assert_eq!(
            result.paths,
            vec![
                strings(&["a", "b", "d"]),
                strings(&["a", "c", "d"]),
                strings(&["x"]),
            ]
        );
        assert_eq!(result.finishing_activities, strings(&["d", "x"]));
        assert_eq!(result.starting_activities, strings(&["a", "x"]));
    }

    #[test]
    fn test_loose_edge_between_critical_activities_not_followed() {
        // a is critical through b; the a -> c edge has a gap, and c is
        // critical through its own long predecessor.
        let graph = ActivityGraph::build(&[
            make_activity("a", &[]),
            make_activity("b", &["a"]),
            make_activity("long", &[]),
            make_activity("c", &["a", "long"]),
        ])
        .unwrap();
        let (_, result) = analyze(
            &graph,
            &[("a", 1.0), ("b", 9.0), ("long", 6.0), ("c", 4.0)],
        );

        assert_eq!(result.makespan, 10.0);
        assert_eq!(
            result.paths,
            vec![strings(&["a", "b"]), strings(&["long", "c"])]
        );
    }

    #[test]
    fn test_zero_duration_sink_extends_path() {
        let graph = ActivityGraph::build(&[
            make_activity("work", &[]),
            make_activity("done", &["work"]),
        ])
        .unwrap();
        let (_, result) = analyze(&graph, &[("work", 3.0), ("done", 0.0)]);

        assert_eq!(result.paths, vec![strings(&["work", "done"])]);
        assert_eq!(result.finishing_activities, strings(&["done", "work"]));
    }

    #[test]
    fn test_empty_graph() {
        let graph = ActivityGraph::build(&[]).unwrap();
        let (schedule, result) = analyze(&graph, &[]);

        assert!(schedule.is_empty());
        assert_eq!(result.makespan, 0.0);
        assert!(result.paths.is_empty());
    }

    #[test]
    fn test_mismatched_schedule_rejected() {
        let graph = ActivityGraph::build(&[make_activity("a", &[])]).unwrap();
        let scenario = DurationScenario::bind(&graph, "s", [("a", 1.0)]).unwrap();
        let result = CriticalPathExtractor::default().extract(&scenario, EarliestSchedule::default());
        assert!(matches!(result, Err(SolverError::Unexpected(_))));
    }

    #[test]
    fn test_total_finish_matches_objective() {
        let graph = ActivityGraph::build(&[
            make_activity("a", &[]),
            make_activity("b", &["a"]),
        ])
        .unwrap();
        let (_, result) = analyze(&graph, &[("a", 2.0), ("b", 3.0)]);
        // finish(a) + finish(b) = 2 + 5
        assert_eq!(result.total_finish, 7.0);
    }

    #[test]
    fn test_large_makespan_keeps_critical_path() {
        // latest_start of b rounds to just below its earliest start at this scale
        let graph = ActivityGraph::build(&[
            make_activity("a", &[]),
            make_activity("b", &["a"]),
        ])
        .unwrap();
        let (schedule, result) = analyze(&graph, &[("a", 0.1), ("b", 1e8)]);

        assert_eq!(result.critical_activities, strings(&["a", "b"]));
        assert_eq!(result.paths, vec![strings(&["a", "b"])]);
        assert_eq!(result.finishing_activities, strings(&["b"]));
        for (_, timing) in schedule.iter() {
            assert_eq!(timing.slack, 0.0);
            assert_eq!(timing.latest_start, timing.earliest_start);
        }
    }

    #[test]
    fn test_large_non_integer_durations_with_slack() {
        // a -> c and b -> c, durations in the hundreds of millions
        let graph = ActivityGraph::build(&[
            make_activity("a", &[]),
            make_activity("b", &[]),
            make_activity("c", &["a", "b"]),
        ])
        .unwrap();
        let (schedule, result) = analyze(
            &graph,
            &[("a", 123_456_789.123), ("b", 98_765_432.1), ("c", 0.7)],
        );

        assert_eq!(result.paths, vec![strings(&["a", "c"])]);
        assert_eq!(result.critical_activities, strings(&["a", "c"]));
        assert!(!result.is_critical("b"));

        let b = schedule.get("b").unwrap();
        assert!(b.slack > 0.0);
        assert!((b.slack - (123_456_789.123 - 98_765_432.1)).abs() < 1e-3);
        for (_, timing) in schedule.iter() {
            assert!(timing.slack >= 0.0);
        }
    }

    #[test]
    fn test_debug_verbosity_leaves_result_unchanged() {
        let graph = ActivityGraph::build(&[
            make_activity("a", &[]),
            make_activity("b", &["a"]),
            make_activity("c", &["a"]),
            make_activity("d", &["b", "c"]),
            make_activity("x", &[]),
        ])
        .unwrap();
        let scenario = DurationScenario::bind(
            &graph,
            "debug",
            [("a", 1.0), ("b", 4.0), ("c", 2.0), ("d", 2.0), ("x", 3.0)],
        )
        .unwrap();
        let earliest = ForwardPass::default().solve(&scenario).unwrap();

        let (_, quiet) = CriticalPathExtractor::default()
            .extract(&scenario, earliest.clone())
            .unwrap();
        let (_, loud) = CriticalPathExtractor::new(crate::logging::VERBOSITY_DEBUG)
            .extract(&scenario, earliest)
            .unwrap();

        assert_eq!(loud, quiet);
        assert_eq!(loud.paths, vec![strings(&["a", "b", "d"])]);
    }

    #[test]
    fn test_scaling_durations_scales_makespan_and_slack() {
        let graph = ActivityGraph::build(&crate::sample::proposal_activities()).unwrap();
        let definition = crate::sample::best_case();
        let base = DurationScenario::bind(&graph, "best", definition.durations).unwrap();
        let tripled = base.scaled("tripled", 3.0).unwrap();

        let extractor = CriticalPathExtractor::default();
        let (base_schedule, base_result) = extractor
            .extract(&base, ForwardPass::default().solve(&base).unwrap())
            .unwrap();
        let (scaled_schedule, scaled_result) = extractor
            .extract(&tripled, ForwardPass::default().solve(&tripled).unwrap())
            .unwrap();

        assert_eq!(scaled_result.makespan, 3.0 * base_result.makespan);
        assert_eq!(scaled_result.paths, base_result.paths);
        for (base_timing, scaled_timing) in base_schedule
            .timings()
            .iter()
            .zip(scaled_schedule.timings())
        {
            assert!((scaled_timing.slack - 3.0 * base_timing.slack).abs() < 1e-9);
        }
    }
}
