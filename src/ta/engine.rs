//! The acceptance state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace, warn};

use super::config::{Strategy, TaConfig};
use super::runner::TaResult;
use super::types::{AcceptanceStrategy, Acceptor};
use crate::cooling::{CoolingSchedule, ExponentialCooling};
use crate::error::{ModelError, SearchError};
use crate::eval::{Evaluation, EvaluationCounter, Evaluator, IncrementalEvaluator, ProximityCost};
use crate::kempe::{KempeChain, KempeChainGenerator, MoveGenerator, Pivot};
use crate::problem::ProblemData;
use crate::stats::ExamMoveStatistics;
use crate::timetable::Timetable;

// Cooling levels between two progress events.
const PROGRESS_LEVELS: u64 = 1000;

/// What happened to the candidate of one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Feasible and accepted; the chain was applied.
    Accepted,
    /// Feasible but refused by the acceptance rule.
    Rejected,
    /// Violates a hard constraint; always refused.
    Infeasible,
    /// Pivot predicted settled; not expanded, not evaluated.
    Skipped,
}

/// Record of one iteration.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub outcome: StepOutcome,
    /// Threshold in effect for this iteration.
    pub threshold: f64,
    pub pivot: Pivot,
    /// `None` when the candidate was skipped.
    pub evaluation: Option<Evaluation>,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The threshold reached the final threshold.
    ScheduleExhausted,
    IterationLimit,
    TimeLimit,
    Cancelled,
}

/// Threshold Accepting / Simulated Annealing over Kempe chain moves.
///
/// One iteration proposes a pivot, optionally skips it (Fast TA), expands
/// and evaluates the chain, decides, commits an accepted chain and advances
/// the cooling schedule. The engine owns the timetable and every piece of
/// run-scoped state; the problem is only borrowed.
pub struct TaEngine<
    'p,
    G = KempeChainGenerator,
    E = IncrementalEvaluator,
    A = Acceptor,
    C = ExponentialCooling,
> {
    problem: &'p ProblemData,
    timetable: Timetable,
    generator: G,
    evaluator: E,
    acceptor: A,
    schedule: C,
    rng: StdRng,
    statistics: Option<ExamMoveStatistics>,
    skip_settled: bool,
    counter: EvaluationCounter,
    max_iterations: u64,
    time_limit: Option<Duration>,
    check_interval: u64,
    commits_since_check: u64,
    iterations: u64,
    accepted_moves: u64,
    improving_moves: u64,
    infeasible_moves: u64,
    skipped_moves: u64,
    best_fitness: f64,
}

impl<'p> TaEngine<'p> {
    /// Builds the engine described by `config`.
    ///
    /// The timetable is rescored with the configured horizon. Fails when the
    /// configuration is invalid, the timetable does not belong to `problem`,
    /// or there is no move to make (no exam, or fewer than two periods).
    pub fn new(
        problem: &'p ProblemData,
        mut timetable: Timetable,
        config: &TaConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        check_timetable(problem, &timetable)?;

        let cost = ProximityCost::new(config.horizon);
        timetable.rescore(problem, &cost);
        let schedule = ExponentialCooling::new(config.cooling)?;
        let statistics = config
            .statistics
            .map(|s| ExamMoveStatistics::new(problem, &schedule, s.num_bins))
            .transpose()?;
        let seed = config.seed.unwrap_or_else(rand::random);

        let engine = Self::with_components(
            problem,
            timetable,
            KempeChainGenerator::new(config.max_retries),
            IncrementalEvaluator::new(cost),
            Acceptor::from_strategy(config.strategy, config.sa_scaling),
            schedule,
            seed,
        )?;
        Ok(engine
            .with_statistics(statistics)
            .with_skip_settled(config.strategy == Strategy::FastThresholdAccepting)
            .with_limits(config.max_iterations, config.time_limit())
            .with_consistency_check_interval(config.consistency_check_interval))
    }
}

fn check_timetable(problem: &ProblemData, timetable: &Timetable) -> Result<(), ModelError> {
    if timetable.num_exams() != problem.num_exams() {
        return Err(ModelError::AssignmentLength {
            expected: problem.num_exams(),
            got: timetable.num_exams(),
        });
    }
    match timetable
        .assignment()
        .iter()
        .find(|&&p| p >= problem.num_periods())
    {
        Some(&period) => Err(ModelError::PeriodOutOfRange {
            period,
            num_periods: problem.num_periods(),
        }),
        None => Ok(()),
    }
}

impl<'p, G, E, A, C> TaEngine<'p, G, E, A, C>
where
    G: MoveGenerator,
    E: Evaluator,
    A: AcceptanceStrategy,
    C: CoolingSchedule,
{
    /// Assembles an engine from explicit components and initializes the
    /// schedule.
    ///
    /// The tracked fitness of `timetable` is replaced by the evaluator's
    /// full recomputation.
    pub fn with_components(
        problem: &'p ProblemData,
        mut timetable: Timetable,
        generator: G,
        evaluator: E,
        acceptor: A,
        mut schedule: C,
        seed: u64,
    ) -> Result<Self, SearchError> {
        if problem.num_exams() == 0 {
            return Err(SearchError::DegenerateNeighborhood(
                "problem has no exams".into(),
            ));
        }
        if problem.num_periods() < 2 {
            return Err(SearchError::DegenerateNeighborhood(format!(
                "need at least two periods, got {}",
                problem.num_periods()
            )));
        }
        check_timetable(problem, &timetable)?;
        timetable.set_fitness(evaluator.fitness(problem, timetable.assignment()));
        schedule.init();
        let best_fitness = if timetable.is_feasible() {
            timetable.fitness()
        } else {
            f64::INFINITY
        };
        Ok(Self {
            problem,
            timetable,
            generator,
            evaluator,
            acceptor,
            schedule,
            rng: StdRng::seed_from_u64(seed),
            statistics: None,
            skip_settled: false,
            counter: EvaluationCounter::new(),
            max_iterations: 0,
            time_limit: None,
            check_interval: 10_000,
            commits_since_check: 0,
            iterations: 0,
            accepted_moves: 0,
            improving_moves: 0,
            infeasible_moves: 0,
            skipped_moves: 0,
            best_fitness,
        })
    }

    /// Attaches move statistics, recorded on every commit.
    pub fn with_statistics(mut self, statistics: Option<ExamMoveStatistics>) -> Self {
        self.statistics = statistics;
        self
    }

    /// Skips candidates whose pivot is settled (Fast TA). Has no effect
    /// without statistics.
    pub fn with_skip_settled(mut self, skip: bool) -> Self {
        self.skip_settled = skip;
        self
    }

    /// Iteration cap (0 = none) and wall-clock cap.
    pub fn with_limits(mut self, max_iterations: u64, time_limit: Option<Duration>) -> Self {
        self.max_iterations = max_iterations;
        self.time_limit = time_limit;
        self
    }

    /// Commits between drift checks. 0 disables the periodic check.
    pub fn with_consistency_check_interval(mut self, n: u64) -> Self {
        self.check_interval = n;
        self
    }

    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }

    pub fn statistics(&self) -> Option<&ExamMoveStatistics> {
        self.statistics.as_ref()
    }

    pub fn schedule(&self) -> &C {
        &self.schedule
    }

    pub fn threshold(&self) -> f64 {
        self.schedule.threshold()
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Candidates evaluated so far. Skipped candidates are not counted.
    pub fn evaluations(&self) -> u64 {
        self.counter.total()
    }

    /// `true` once the schedule is exhausted.
    pub fn is_finished(&self) -> bool {
        !self.schedule.is_continue()
    }

    fn strategy_name(&self) -> &'static str {
        if self.skip_settled && self.statistics.is_some() {
            "fast_threshold_accepting"
        } else {
            self.acceptor.name()
        }
    }

    /// Runs one iteration: propose, evaluate, decide, commit, advance.
    pub fn step(&mut self) -> Result<Step, SearchError> {
        let threshold = self.schedule.threshold();
        let pivot = self
            .generator
            .select_pivot(self.problem, &self.timetable, &mut self.rng)?;

        let settled = self.skip_settled
            && self
                .statistics
                .as_ref()
                .is_some_and(|s| s.is_settled(pivot.exam, threshold));

        let (outcome, evaluation) = if settled {
            self.skipped_moves += 1;
            (StepOutcome::Skipped, None)
        } else {
            let mut chain = self.generator.expand(self.problem, &self.timetable, pivot);
            let evaluation = self
                .evaluator
                .evaluate(self.problem, &self.timetable, &mut chain);
            self.counter.increment();

            let outcome = if !evaluation.feasible {
                self.infeasible_moves += 1;
                StepOutcome::Infeasible
            } else if self.acceptor.accept(
                &evaluation,
                self.timetable.fitness(),
                threshold,
                &mut self.rng,
            ) {
                self.commit(&chain, threshold)?;
                StepOutcome::Accepted
            } else {
                StepOutcome::Rejected
            };
            (outcome, Some(evaluation))
        };

        self.iterations += 1;
        self.schedule.update(outcome == StepOutcome::Accepted);

        trace!(
            event = "step",
            step = self.iterations,
            exam = pivot.exam,
            from = pivot.ti,
            to = pivot.tj,
            threshold,
            outcome = ?outcome,
            delta = evaluation.map(|e| e.delta),
        );

        Ok(Step {
            outcome,
            threshold,
            pivot,
            evaluation,
        })
    }

    fn commit(&mut self, chain: &KempeChain, threshold: f64) -> Result<(), SearchError> {
        self.timetable.apply_chain(self.problem, chain)?;
        self.accepted_moves += 1;
        if chain.delta() < 0.0 {
            self.improving_moves += 1;
        }
        if self.timetable.is_feasible() && self.timetable.fitness() < self.best_fitness {
            self.best_fitness = self.timetable.fitness();
        }
        if let Some(stats) = self.statistics.as_mut() {
            stats.record_move(chain.pivot(), threshold);
        }

        self.commits_since_check += 1;
        if self.check_interval > 0 && self.commits_since_check >= self.check_interval {
            self.commits_since_check = 0;
            self.verify()?;
        }
        Ok(())
    }

    /// Recomputes the fitness from scratch and compares it with the tracked
    /// value. Returns the recomputed fitness.
    pub fn verify(&self) -> Result<f64, SearchError> {
        let tracked = self.timetable.fitness();
        let recomputed = self
            .evaluator
            .fitness(self.problem, self.timetable.assignment());
        let tolerance = 1e-6 * recomputed.abs().max(1.0);
        if (tracked - recomputed).abs() > tolerance {
            return Err(SearchError::EvaluationDrift {
                iteration: self.iterations,
                tracked,
                recomputed,
            });
        }
        Ok(recomputed)
    }

    /// Runs until the schedule is exhausted or a cap fires.
    pub fn run(self) -> Result<TaResult, SearchError> {
        self.run_with_cancel(None)
    }

    /// Runs with an optional cancellation token, checked once per iteration.
    pub fn run_with_cancel(
        mut self,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<TaResult, SearchError> {
        let start = Instant::now();
        let estimated_iterations = self.schedule.estimate_total_iterations();
        let strategy = self.strategy_name();

        info!(
            event = "search_start",
            strategy,
            exams = self.problem.num_exams(),
            periods = self.problem.num_periods(),
            estimated_iterations,
            initial_threshold = self.schedule.threshold(),
            fitness = self.timetable.fitness(),
        );

        let termination = loop {
            if !self.schedule.is_continue() {
                break Termination::ScheduleExhausted;
            }
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    warn!(event = "search_cancelled", iterations = self.iterations);
                    break Termination::Cancelled;
                }
            }
            if self.max_iterations > 0 && self.iterations >= self.max_iterations {
                break Termination::IterationLimit;
            }
            if let Some(limit) = self.time_limit {
                if start.elapsed() >= limit {
                    warn!(
                        event = "time_limit_reached",
                        iterations = self.iterations,
                        limit_ms = limit.as_millis() as u64,
                    );
                    break Termination::TimeLimit;
                }
            }

            let level = self.schedule.level();
            self.step()?;
            let new_level = self.schedule.level();
            if new_level != level && new_level % PROGRESS_LEVELS == 0 {
                debug!(
                    event = "progress",
                    iterations = self.iterations,
                    level = new_level,
                    threshold = self.schedule.threshold(),
                    fitness = self.timetable.fitness(),
                    evaluations = self.counter.total(),
                );
            }
        };

        self.verify()?;
        let elapsed = start.elapsed();

        info!(
            event = "search_end",
            strategy,
            termination = ?termination,
            fitness = self.timetable.fitness(),
            best_fitness = self.best_fitness,
            iterations = self.iterations,
            evaluations = self.counter.total(),
            skipped = self.skipped_moves,
            duration_ms = elapsed.as_millis() as u64,
        );

        Ok(TaResult {
            fitness: self.timetable.fitness(),
            feasible: self.timetable.is_feasible(),
            best_fitness: self.best_fitness,
            iterations: self.iterations,
            evaluations: self.counter.total(),
            accepted_moves: self.accepted_moves,
            improving_moves: self.improving_moves,
            infeasible_moves: self.infeasible_moves,
            skipped_moves: self.skipped_moves,
            final_threshold: self.schedule.threshold(),
            estimated_iterations,
            termination,
            elapsed,
            statistics: self.statistics,
            timetable: self.timetable,
        })
    }
}
