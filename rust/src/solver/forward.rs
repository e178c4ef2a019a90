//! Forward pass: earliest start/finish by longest path over the topological order.

use crate::log_passes;
use crate::scenario::DurationScenario;

use super::{EarliestSchedule, ScheduleStrategy, SolverError};

/// Direct graph sweep, O(activities + edges).
#[derive(Clone, Debug, Default)]
pub struct ForwardPass {
    verbosity: u8,
}

impl ForwardPass {
    pub fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }
}

impl ScheduleStrategy for ForwardPass {
    fn name(&self) -> &'static str {
        "forward_pass"
    }

    fn solve(&self, scenario: &DurationScenario<'_>) -> Result<EarliestSchedule, SolverError> {
        let graph = scenario.graph();
        let n = graph.len();
        let mut earliest_start = vec![0.0; n];
        let mut earliest_finish = vec![0.0; n];

        for &idx in graph.topological_indices() {
            let i = idx as usize;

            // Earliest start = max of all predecessor finish times
            let mut start = 0.0;
            for &pred in graph.predecessors(idx) {
                let pred_finish = earliest_finish[pred as usize];
                if pred_finish > start {
                    start = pred_finish;
                }
            }

            earliest_start[i] = start;
            earliest_finish[i] = start + scenario.duration(idx);

            log_passes!(
                self.verbosity,
                "[{}] forward {}: start={} finish={}",
                scenario.name(),
                graph.id_of(idx).unwrap_or("?"),
                earliest_start[i],
                earliest_finish[i]
            );
        }

        Ok(EarliestSchedule {
            earliest_start,
            earliest_finish,
        })
    }
}
