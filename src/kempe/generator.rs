//! Random Kempe chain construction.

use std::collections::VecDeque;

use rand::Rng;

use super::chain::KempeChain;
use crate::error::SearchError;
use crate::problem::ProblemData;
use crate::timetable::Timetable;

/// The randomly drawn part of a proposal: pivot exam and the two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pivot {
    pub exam: usize,
    /// Current period of `exam`.
    pub ti: usize,
    /// Target period, always different from `ti`.
    pub tj: usize,
}

/// Produces candidate moves for the acceptance engine.
///
/// Proposal is split in two so the engine can decide on the pivot alone
/// whether a candidate is worth expanding and evaluating.
pub trait MoveGenerator {
    /// Draws the periods and the pivot exam.
    fn select_pivot<R: Rng>(
        &mut self,
        problem: &ProblemData,
        timetable: &Timetable,
        rng: &mut R,
    ) -> Result<Pivot, SearchError>;

    /// Builds the full chain around `pivot`.
    fn expand(&mut self, problem: &ProblemData, timetable: &Timetable, pivot: Pivot) -> KempeChain;

    /// Draws a pivot and expands it.
    fn propose<R: Rng>(
        &mut self,
        problem: &ProblemData,
        timetable: &Timetable,
        rng: &mut R,
    ) -> Result<KempeChain, SearchError> {
        let pivot = self.select_pivot(problem, timetable, rng)?;
        Ok(self.expand(problem, timetable, pivot))
    }
}

/// Kempe chain neighbourhood.
///
/// Pivot selection draws `ti` uniformly, retrying up to `max_retries` times
/// while it lands on an empty period, then falls back to a uniform pick among
/// the non-empty periods. `tj` is uniform over the other periods.
///
/// Expansion walks conflicts alternately: a member in `ti` pulls in its
/// conflicting exams in `tj` and vice versa. Swapping every member between
/// the two periods then cannot create a direct conflict if there was none.
#[derive(Debug, Clone)]
pub struct KempeChainGenerator {
    max_retries: usize,
    // visit marks reused across proposals
    stamp: Vec<u32>,
    generation: u32,
    queue: VecDeque<usize>,
}

impl Default for KempeChainGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES)
    }
}

impl KempeChainGenerator {
    pub const DEFAULT_MAX_RETRIES: usize = 32;

    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries: max_retries.max(1),
            stamp: Vec::new(),
            generation: 0,
            queue: VecDeque::new(),
        }
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    fn next_generation(&mut self, num_exams: usize) {
        if self.stamp.len() != num_exams {
            self.stamp = vec![0; num_exams];
            self.generation = 0;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamp.fill(0);
            self.generation = 1;
        }
    }

    fn pick_period<R: Rng>(&self, timetable: &Timetable, rng: &mut R) -> Option<usize> {
        let n = timetable.num_periods();
        for _ in 0..self.max_retries {
            let period = rng.random_range(0..n);
            if timetable.period_size(period) > 0 {
                return Some(period);
            }
        }
        let occupied = (0..n).filter(|&p| timetable.period_size(p) > 0).count();
        if occupied == 0 {
            return None;
        }
        let k = rng.random_range(0..occupied);
        (0..n).filter(|&p| timetable.period_size(p) > 0).nth(k)
    }
}

impl MoveGenerator for KempeChainGenerator {
    fn select_pivot<R: Rng>(
        &mut self,
        _problem: &ProblemData,
        timetable: &Timetable,
        rng: &mut R,
    ) -> Result<Pivot, SearchError> {
        let n = timetable.num_periods();
        if n < 2 {
            return Err(SearchError::DegenerateNeighborhood(format!(
                "need at least two periods, got {n}"
            )));
        }
        let ti = self.pick_period(timetable, rng).ok_or_else(|| {
            SearchError::DegenerateNeighborhood("every period is empty".to_string())
        })?;

        let mut tj = rng.random_range(0..n - 1);
        if tj >= ti {
            tj += 1;
        }

        let exams = timetable.exams_in(ti);
        let exam = exams[rng.random_range(0..exams.len())];
        Ok(Pivot { exam, ti, tj })
    }

    fn expand(&mut self, problem: &ProblemData, timetable: &Timetable, pivot: Pivot) -> KempeChain {
        self.next_generation(problem.num_exams());
        let generation = self.generation;
        let graph = problem.conflicts();

        let mut members = Vec::new();
        self.queue.clear();
        self.stamp[pivot.exam] = generation;
        self.queue.push_back(pivot.exam);

        while let Some(exam) = self.queue.pop_front() {
            members.push(exam);
            let other_side = if timetable.period_of(exam) == pivot.ti {
                pivot.tj
            } else {
                pivot.ti
            };
            for &(neighbor, _) in graph.neighbors(exam) {
                if self.stamp[neighbor] != generation && timetable.period_of(neighbor) == other_side {
                    self.stamp[neighbor] = generation;
                    self.queue.push_back(neighbor);
                }
            }
        }

        KempeChain::new(pivot.ti, pivot.tj, pivot.exam, members)
    }
}
