//! Linear-program formulation of the earliest-time schedule.
//!
//! minimize    sum(finish_i)
//! subject to  finish_i == start_i + duration_i
//!             start_i  >= finish_j     for every predecessor j of i
//!             start_i  >= 0
//!
//! Solved with the pure-Rust microlp backend of `good_lp`.

use good_lp::solvers::microlp::microlp;
use good_lp::{constraint, variable, Expression, ProblemVariables, Solution, SolverModel, Variable};

use crate::scenario::DurationScenario;
use crate::{log_debug, log_passes};

use super::{EarliestSchedule, ScheduleStrategy, SolverError};

/// Largest precedence violation accepted from the LP backend before the
/// result is rejected as a solver defect.
pub const LP_TOLERANCE: f64 = 1e-6;

/// Generic-optimizer strategy; mainly useful to cross-check [`super::ForwardPass`].
#[derive(Clone, Debug, Default)]
pub struct LinearProgram {
    verbosity: u8,
}

impl LinearProgram {
    pub fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }
}

impl ScheduleStrategy for LinearProgram {
    fn name(&self) -> &'static str {
        "linear_program"
    }

    fn solve(&self, scenario: &DurationScenario<'_>) -> Result<EarliestSchedule, SolverError> {
        let graph = scenario.graph();
        let n = graph.len();
        if n == 0 {
            return Ok(EarliestSchedule::default());
        }

        let mut vars = ProblemVariables::new();
        let starts: Vec<Variable> = (0..n).map(|_| vars.add(variable().min(0.0))).collect();
        let finishes: Vec<Variable> = (0..n).map(|_| vars.add(variable().min(0.0))).collect();

        let objective: Expression = finishes.iter().copied().sum();
        let mut model = vars.minimise(objective).using(microlp);

        for idx in 0..n as u32 {
            let i = idx as usize;
            let duration = scenario.duration(idx);
            model = model.with(constraint!(finishes[i] == starts[i] + duration));
            for &pred in graph.predecessors(idx) {
                model = model.with(constraint!(starts[i] >= finishes[pred as usize]));
            }
        }

        log_debug!(
            self.verbosity,
            "[{}] LP with {} variables, {} duration and {} precedence constraints",
            scenario.name(),
            2 * n,
            n,
            graph.edge_count()
        );

        let solution = model
            .solve()
            .map_err(|e| SolverError::Unexpected(format!("LP resolution failed: {}", e)))?;

        // Snap each start onto its release time (latest predecessor finish) when
        // the backend lands within LP_TOLERANCE of it, so tight edges compare
        // exactly in the critical path pass.
        let mut earliest_start = vec![0.0; n];
        let mut earliest_finish = vec![0.0; n];
        for &idx in graph.topological_indices() {
            let i = idx as usize;
            let release = graph
                .predecessors(idx)
                .iter()
                .map(|&pred| earliest_finish[pred as usize])
                .fold(0.0_f64, f64::max);

            let raw = solution.value(starts[i]);
            if release - raw > LP_TOLERANCE {
                return Err(SolverError::Unexpected(format!(
                    "LP solution starts {} at {} before its predecessors finish at {}",
                    graph.id_of(idx).unwrap_or("?"),
                    raw,
                    release
                )));
            }
            let start = if (raw - release).abs() <= LP_TOLERANCE {
                release
            } else {
                raw
            };
            earliest_start[i] = start;
            earliest_finish[i] = start + scenario.duration(idx);

            log_passes!(
                self.verbosity,
                "[{}] lp {}: start={} finish={}",
                scenario.name(),
                graph.id_of(idx).unwrap_or("?"),
                start,
                earliest_finish[i]
            );
        }

        Ok(EarliestSchedule {
            earliest_start,
            earliest_finish,
        })
    }
}
