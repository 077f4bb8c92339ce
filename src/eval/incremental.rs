//! Incremental evaluation of Kempe chain moves.

use super::proximity::ProximityCost;
use crate::kempe::KempeChain;
use crate::problem::ProblemData;
use crate::timetable::Timetable;

/// Outcome of evaluating one candidate move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Change in normalized fitness if the move is applied. Lower is better.
    pub delta: f64,
    /// `false` if any hard constraint would be violated after the move.
    pub feasible: bool,
}

/// Scores a candidate against the current timetable without applying it.
pub trait Evaluator {
    /// Evaluates `chain`, stores the result in it, and returns it.
    fn evaluate(
        &self,
        problem: &ProblemData,
        timetable: &Timetable,
        chain: &mut KempeChain,
    ) -> Evaluation;

    /// Fitness of `period_of` recomputed from scratch.
    fn fitness(&self, problem: &ProblemData, period_of: &[usize]) -> f64;
}

/// Evaluator that only revisits pairs touching chain members.
///
/// Pairs with both exams inside the chain keep their period distance, so
/// the delta is the sum over chain members of their pairs with non-members:
/// O(chain length × average conflict degree).
#[derive(Debug, Clone, Default)]
pub struct IncrementalEvaluator {
    cost: ProximityCost,
}

impl IncrementalEvaluator {
    pub fn new(cost: ProximityCost) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> &ProximityCost {
        &self.cost
    }

    fn capacity_ok(problem: &ProblemData, timetable: &Timetable, chain: &KempeChain) -> bool {
        let Some(capacity) = problem.period_capacity() else {
            return true;
        };
        let (mut leaving_ti, mut leaving_tj) = (0u64, 0u64);
        for &exam in chain.members() {
            let size = u64::from(problem.exam(exam).size);
            match timetable.period_of(exam) {
                p if p == chain.ti() => leaving_ti += size,
                p if p == chain.tj() => leaving_tj += size,
                _ => return false,
            }
        }
        let load_ti = timetable.seat_load(chain.ti()) - leaving_ti + leaving_tj;
        let load_tj = timetable.seat_load(chain.tj()) - leaving_tj + leaving_ti;
        load_ti <= capacity && load_tj <= capacity
    }
}

impl Evaluator for IncrementalEvaluator {
    fn evaluate(
        &self,
        problem: &ProblemData,
        timetable: &Timetable,
        chain: &mut KempeChain,
    ) -> Evaluation {
        let graph = problem.conflicts();
        let mut raw = 0.0;
        let mut feasible = Self::capacity_ok(problem, timetable, chain);

        for &exam in chain.members() {
            let old = timetable.period_of(exam);
            let new = chain.destination(old);
            if old != chain.ti() && old != chain.tj() {
                // not a swap between the chain's two periods
                feasible = false;
            }
            if !problem.is_available(exam, new) {
                feasible = false;
            }

            for &(other, shared) in graph.neighbors(exam) {
                let other_period = timetable.period_of(other);
                if chain.contains(other) {
                    // Both move: only a pair seeded in the same period can clash.
                    if other_period == old {
                        feasible = false;
                    }
                    continue;
                }
                if other_period == new {
                    feasible = false;
                }
                raw += self.cost.pair_cost(shared, new, other_period)
                    - self.cost.pair_cost(shared, old, other_period);
            }

            if feasible
                && !problem
                    .constraints_of(exam)
                    .all(|c| c.is_satisfied(|e| chain.new_period_of(e, timetable)))
            {
                feasible = false;
            }
        }

        let evaluation = Evaluation {
            delta: raw / problem.cost_normalizer(),
            feasible,
        };
        chain.set_evaluation(evaluation);
        evaluation
    }

    fn fitness(&self, problem: &ProblemData, period_of: &[usize]) -> f64 {
        self.cost.full(problem, period_of)
    }
}

/// Number of candidate evaluations performed during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationCounter {
    total: u64,
}

impl EvaluationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self) {
        self.total += 1;
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::PairConstraint;

    fn chain(ti: usize, tj: usize, pivot: usize, members: Vec<usize>) -> KempeChain {
        KempeChain::new(ti, tj, pivot, members)
    }

    #[test]
    fn test_delta_matches_full_recompute() {
        let problem = ProblemData::builder(4, 6)
            .with_conflict(0, 1, 3)
            .with_conflict(0, 2, 1)
            .with_conflict(2, 3, 2)
            .with_num_students(5)
            .build()
            .unwrap();
        let tt = Timetable::from_assignment(&problem, vec![0, 1, 3, 5]).unwrap();
        let eval = IncrementalEvaluator::default();

        // exam 0 moves 0 -> 4, nothing in period 4 conflicts with it
        let mut c = chain(0, 4, 0, vec![0]);
        let e = eval.evaluate(&problem, &tt, &mut c);
        assert!(e.feasible);

        let mut moved = tt.clone();
        moved.apply_chain(&problem, &c).unwrap();
        let recomputed = eval.cost().full(&problem, moved.assignment());
        assert!((tt.fitness() + e.delta - recomputed).abs() < 1e-9);
        assert_eq!(c.evaluation(), Some(e));
    }

    #[test]
    fn test_unavailable_period_infeasible() {
        let problem = ProblemData::builder(1, 3)
            .with_unavailable(0, 2)
            .build()
            .unwrap();
        let tt = Timetable::from_assignment(&problem, vec![0]).unwrap();
        let mut c = chain(0, 2, 0, vec![0]);
        assert!(!IncrementalEvaluator::default().evaluate(&problem, &tt, &mut c).feasible);
    }

    #[test]
    fn test_capacity_infeasible() {
        let problem = ProblemData::builder(3, 2)
            .with_room(10)
            .with_exam_size(0, 6)
            .with_exam_size(1, 5)
            .with_exam_size(2, 1)
            .build()
            .unwrap();
        let tt = Timetable::from_assignment(&problem, vec![0, 1, 1]).unwrap();
        let eval = IncrementalEvaluator::default();

        let mut too_big = chain(0, 1, 0, vec![0]);
        assert!(!eval.evaluate(&problem, &tt, &mut too_big).feasible);

        let mut fits = chain(1, 0, 2, vec![2]);
        assert!(eval.evaluate(&problem, &tt, &mut fits).feasible);
    }

    #[test]
    fn test_pair_constraint_infeasible() {
        let problem = ProblemData::builder(2, 3)
            .with_constraint(PairConstraint::After { first: 1, second: 0 })
            .build()
            .unwrap();
        let tt = Timetable::from_assignment(&problem, vec![0, 2]).unwrap();
        let eval = IncrementalEvaluator::default();

        let mut before = chain(2, 0, 1, vec![1]);
        assert!(!eval.evaluate(&problem, &tt, &mut before).feasible);
        let mut later = chain(2, 1, 1, vec![1]);
        assert!(eval.evaluate(&problem, &tt, &mut later).feasible);
    }

    #[test]
    fn test_seeded_clash_moving_together_infeasible() {
        let problem = ProblemData::builder(2, 2)
            .with_conflict(0, 1, 1)
            .build()
            .unwrap();
        let tt = Timetable::from_assignment(&problem, vec![0, 0]).unwrap();
        let mut both = chain(0, 1, 0, vec![0, 1]);
        assert!(!IncrementalEvaluator::default().evaluate(&problem, &tt, &mut both).feasible);
    }

    #[test]
    fn test_member_outside_both_periods_infeasible() {
        let problem = ProblemData::builder(3, 3)
            .with_room(20)
            .with_exam_size(0, 4)
            .with_exam_size(1, 9)
            .with_exam_size(2, 2)
            .build()
            .unwrap();
        // exam 1 sits in period 2, which is neither end of the swap
        let tt = Timetable::from_assignment(&problem, vec![0, 2, 1]).unwrap();
        let mut stray = chain(0, 1, 0, vec![0, 1]);
        let e = IncrementalEvaluator::default().evaluate(&problem, &tt, &mut stray);
        assert!(!e.feasible);
        assert_eq!(stray.evaluation(), Some(e));
    }

    #[test]
    fn test_counter() {
        let mut c = EvaluationCounter::new();
        assert_eq!(c.total(), 0);
        for _ in 0..5 {
            c.increment();
        }
        assert_eq!(c.total(), 5);
    }
}
