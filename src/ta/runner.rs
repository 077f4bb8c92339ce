//! Run entry points and results.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use tracing::info;

use super::config::TaConfig;
use super::engine::{TaEngine, Termination};
use crate::error::SearchError;
use crate::problem::ProblemData;
use crate::stats::ExamMoveStatistics;
use crate::timetable::Timetable;

/// Result of a Threshold Accepting / Simulated Annealing run.
#[derive(Debug, Clone)]
pub struct TaResult {
    /// The final timetable.
    pub timetable: Timetable,

    /// Fitness of the final timetable.
    pub fitness: f64,

    /// Whether the final timetable satisfies every hard constraint.
    pub feasible: bool,

    /// Lowest fitness of any feasible timetable visited. Infinite if none
    /// was feasible.
    pub best_fitness: f64,

    /// Total number of iterations, skipped ones included.
    pub iterations: u64,

    /// Number of candidate evaluations.
    pub evaluations: u64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: u64,

    /// Number of accepted moves with negative delta.
    pub improving_moves: u64,

    /// Candidates rejected for violating a hard constraint.
    pub infeasible_moves: u64,

    /// Candidates skipped by Fast TA.
    pub skipped_moves: u64,

    /// Threshold when the run stopped.
    pub final_threshold: f64,

    /// Iterations the schedule predicted for an uncapped run.
    pub estimated_iterations: u64,

    /// Why the run stopped.
    pub termination: Termination,

    /// Wall-clock duration of the search loop.
    pub elapsed: Duration,

    /// Exam move statistics, when enabled.
    pub statistics: Option<ExamMoveStatistics>,
}

/// Executes Threshold Accepting / Simulated Annealing runs.
pub struct TaRunner;

impl TaRunner {
    /// Improves `timetable` according to `config`.
    pub fn run(
        problem: &ProblemData,
        timetable: Timetable,
        config: &TaConfig,
    ) -> Result<TaResult, SearchError> {
        Self::run_with_cancel(problem, timetable, config, None)
    }

    /// Runs with an optional cancellation token.
    pub fn run_with_cancel(
        problem: &ProblemData,
        timetable: Timetable,
        config: &TaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<TaResult, SearchError> {
        TaEngine::new(problem, timetable, config)?.run_with_cancel(cancel)
    }

    /// Runs one independent trial per seed from a copy of `initial`.
    ///
    /// Trials share `problem` and nothing else. With `config.parallel` they
    /// run on the rayon thread pool. Results are in seed order.
    pub fn run_trials(
        problem: &ProblemData,
        initial: &Timetable,
        config: &TaConfig,
        seeds: &[u64],
    ) -> Result<Vec<TaResult>, SearchError> {
        config.validate()?;
        info!(
            event = "trials_start",
            trials = seeds.len(),
            parallel = config.parallel,
        );

        let trial = |&seed: &u64| {
            let cfg = config.clone().with_seed(seed);
            Self::run(problem, initial.clone(), &cfg)
        };
        let results: Vec<TaResult> = if config.parallel {
            seeds.par_iter().map(trial).collect::<Result<_, _>>()?
        } else {
            seeds.iter().map(trial).collect::<Result<_, _>>()?
        };

        if let Some(best) = results
            .iter()
            .map(|r| r.fitness)
            .min_by(|a, b| a.total_cmp(b))
        {
            info!(event = "trials_end", trials = results.len(), best_fitness = best);
        }
        Ok(results)
    }
}
