//! Mutable timetable state.

use crate::error::ModelError;
use crate::eval::ProximityCost;
use crate::kempe::KempeChain;
use crate::problem::ProblemData;

/// Hard-constraint violation counts of a timetable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Violations {
    /// Conflicting exam pairs sharing a period.
    pub conflicts: usize,
    /// Exams placed in a period declared unavailable for them.
    pub unavailable: usize,
    /// Periods whose seat load exceeds the room capacity.
    pub capacity: usize,
    /// Violated pair constraints.
    pub pair_constraints: usize,
}

impl Violations {
    pub fn total(&self) -> usize {
        self.conflicts + self.unavailable + self.capacity + self.pair_constraints
    }
}

/// Exam → period assignment with its derived views.
///
/// Keeps the exam → period map, the period → exams sets and per-period seat
/// loads in agreement, together with the tracked fitness and a feasibility
/// flag. Fitness is updated incrementally by [`apply_chain`](Self::apply_chain).
#[derive(Debug, Clone, PartialEq)]
pub struct Timetable {
    period_of: Vec<usize>,
    periods: Vec<Vec<usize>>,
    // position of each exam inside its period's list
    slot: Vec<usize>,
    seat_load: Vec<u64>,
    fitness: f64,
    feasible: bool,
}

impl Timetable {
    /// Builds a timetable from one period per exam, scored with the default
    /// [`ProximityCost`].
    ///
    /// The assignment may violate hard constraints; check
    /// [`is_feasible`](Self::is_feasible).
    pub fn from_assignment(problem: &ProblemData, assignment: Vec<usize>) -> Result<Self, ModelError> {
        Self::with_cost(problem, &ProximityCost::default(), assignment)
    }

    /// Like [`from_assignment`](Self::from_assignment) with an explicit cost.
    pub fn with_cost(
        problem: &ProblemData,
        cost: &ProximityCost,
        assignment: Vec<usize>,
    ) -> Result<Self, ModelError> {
        if assignment.len() != problem.num_exams() {
            return Err(ModelError::AssignmentLength {
                expected: problem.num_exams(),
                got: assignment.len(),
            });
        }
        let num_periods = problem.num_periods();
        let mut periods = vec![Vec::new(); num_periods];
        let mut slot = vec![0; assignment.len()];
        let mut seat_load = vec![0u64; num_periods];
        for (exam, &period) in assignment.iter().enumerate() {
            if period >= num_periods {
                return Err(ModelError::PeriodOutOfRange {
                    period,
                    num_periods,
                });
            }
            slot[exam] = periods[period].len();
            periods[period].push(exam);
            seat_load[period] += u64::from(problem.exam(exam).size);
        }

        let mut timetable = Self {
            period_of: assignment,
            periods,
            slot,
            seat_load,
            fitness: 0.0,
            feasible: false,
        };
        timetable.rescore(problem, cost);
        Ok(timetable)
    }

    /// Recomputes fitness and feasibility from scratch.
    pub fn rescore(&mut self, problem: &ProblemData, cost: &ProximityCost) {
        self.fitness = cost.full(problem, &self.period_of);
        self.feasible = self.violations(problem).total() == 0;
    }

    pub fn num_exams(&self) -> usize {
        self.period_of.len()
    }

    pub fn num_periods(&self) -> usize {
        self.periods.len()
    }

    pub fn period_of(&self, exam: usize) -> usize {
        self.period_of[exam]
    }

    /// The exam → period map.
    pub fn assignment(&self) -> &[usize] {
        &self.period_of
    }

    /// Exams currently in `period`, in no particular order.
    pub fn exams_in(&self, period: usize) -> &[usize] {
        &self.periods[period]
    }

    pub fn period_size(&self, period: usize) -> usize {
        self.periods[period].len()
    }

    /// Seats used in `period`.
    pub fn seat_load(&self, period: usize) -> u64 {
        self.seat_load[period]
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// `true` when no hard constraint is violated.
    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    /// Swaps every chain member between `ti` and `tj` and adds the chain's
    /// evaluated delta to the fitness.
    ///
    /// Fails with [`ModelError::UnevaluatedChain`] if the chain carries no
    /// evaluation. Feasibility is recounted unless both the timetable and
    /// the chain are known to be feasible.
    pub fn apply_chain(
        &mut self,
        problem: &ProblemData,
        chain: &KempeChain,
    ) -> Result<(), ModelError> {
        let Some(evaluation) = chain.evaluation() else {
            return Err(ModelError::UnevaluatedChain {
                pivot: chain.pivot(),
            });
        };
        // Detach everything first so no member is seen in a half-moved state.
        let moves: Vec<(usize, usize)> = chain
            .members()
            .iter()
            .map(|&exam| (exam, chain.destination(self.period_of[exam])))
            .collect();
        for &(exam, _) in &moves {
            self.detach(problem, exam);
        }
        for &(exam, to) in &moves {
            self.attach(problem, exam, to);
        }
        self.fitness += evaluation.delta;
        if !self.feasible || !evaluation.feasible {
            self.feasible = self.violations(problem).total() == 0;
        }
        Ok(())
    }

    /// Replaces the tracked fitness, keeping feasibility as is.
    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    fn detach(&mut self, problem: &ProblemData, exam: usize) {
        let period = self.period_of[exam];
        let pos = self.slot[exam];
        let list = &mut self.periods[period];
        list.swap_remove(pos);
        if let Some(&moved) = list.get(pos) {
            self.slot[moved] = pos;
        }
        self.seat_load[period] -= u64::from(problem.exam(exam).size);
    }

    fn attach(&mut self, problem: &ProblemData, exam: usize, period: usize) {
        self.period_of[exam] = period;
        self.slot[exam] = self.periods[period].len();
        self.periods[period].push(exam);
        self.seat_load[period] += u64::from(problem.exam(exam).size);
    }

    /// Counts hard-constraint violations from scratch.
    pub fn violations(&self, problem: &ProblemData) -> Violations {
        let conflicts = problem
            .conflicts()
            .edges()
            .filter(|&(a, b, _)| self.period_of[a] == self.period_of[b])
            .count();
        let unavailable = self
            .period_of
            .iter()
            .enumerate()
            .filter(|&(exam, &period)| !problem.is_available(exam, period))
            .count();
        let capacity = problem.period_capacity().map_or(0, |cap| {
            self.seat_load.iter().filter(|&&load| load > cap).count()
        });
        let pair_constraints = problem
            .pair_constraints()
            .iter()
            .filter(|c| !c.is_satisfied(|e| self.period_of[e]))
            .count();
        Violations {
            conflicts,
            unavailable,
            capacity,
            pair_constraints,
        }
    }

    /// Checks that the exam → period map, period lists and seat loads agree.
    pub fn is_consistent(&self, problem: &ProblemData) -> bool {
        let listed: usize = self.periods.iter().map(Vec::len).sum();
        if listed != self.period_of.len() {
            return false;
        }
        let lists_ok = self.periods.iter().enumerate().all(|(period, exams)| {
            exams
                .iter()
                .enumerate()
                .all(|(pos, &exam)| self.period_of[exam] == period && self.slot[exam] == pos)
        });
        let loads_ok = self.periods.iter().enumerate().all(|(period, exams)| {
            let load: u64 = exams.iter().map(|&e| u64::from(problem.exam(e).size)).sum();
            load == self.seat_load[period]
        });
        lists_ok && loads_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{Evaluator, IncrementalEvaluator};
    use crate::problem::PairConstraint;

    fn problem() -> ProblemData {
        ProblemData::builder(4, 4)
            .with_conflict(0, 1, 2)
            .with_conflict(1, 2, 1)
            .with_room(10)
            .with_exam_size(0, 3)
            .with_exam_size(1, 4)
            .with_exam_size(2, 5)
            .with_exam_size(3, 6)
            .build()
            .unwrap()
    }

    #[test]
    fn test_from_assignment_views() {
        let p = problem();
        let tt = Timetable::from_assignment(&p, vec![0, 1, 2, 0]).unwrap();
        assert_eq!(tt.period_of(3), 0);
        assert_eq!(tt.period_size(0), 2);
        assert_eq!(tt.seat_load(0), 9);
        assert!(tt.is_feasible());
        assert!(tt.is_consistent(&p));
        // 0-1 distance 1 -> 2*16, 1-2 distance 1 -> 1*16
        assert!((tt.fitness() - 48.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_assignments() {
        let p = problem();
        assert_eq!(
            Timetable::from_assignment(&p, vec![0, 1]).unwrap_err(),
            ModelError::AssignmentLength {
                expected: 4,
                got: 2
            }
        );
        assert!(matches!(
            Timetable::from_assignment(&p, vec![0, 1, 2, 9]),
            Err(ModelError::PeriodOutOfRange { period: 9, .. })
        ));
    }

    #[test]
    fn test_violations_counted() {
        let p = ProblemData::builder(3, 2)
            .with_conflict(0, 1, 1)
            .with_room(5)
            .with_exam_size(2, 9)
            .with_unavailable(2, 1)
            .with_constraint(PairConstraint::Exclusion { first: 0, second: 2 })
            .build()
            .unwrap();
        let tt = Timetable::from_assignment(&p, vec![1, 1, 1]).unwrap();
        let v = tt.violations(&p);
        assert_eq!(v.conflicts, 1);
        assert_eq!(v.unavailable, 1);
        assert_eq!(v.capacity, 1);
        assert_eq!(v.pair_constraints, 1);
        assert_eq!(v.total(), 4);
        assert!(!tt.is_feasible());
    }

    #[test]
    fn test_apply_chain_keeps_views_in_sync() {
        let p = problem();
        let mut tt = Timetable::from_assignment(&p, vec![0, 1, 0, 3]).unwrap();
        let mut chain = KempeChain::new(0, 1, 0, vec![0, 1, 2]);
        let eval = IncrementalEvaluator::default();
        let e = eval.evaluate(&p, &tt, &mut chain);
        assert!(e.feasible);

        tt.apply_chain(&p, &chain).unwrap();
        assert_eq!(tt.assignment(), &[1, 0, 1, 3]);
        assert!(tt.is_consistent(&p));
        assert_eq!(tt.seat_load(1), 8);
        let full = ProximityCost::default().full(&p, tt.assignment());
        assert!((tt.fitness() - full).abs() < 1e-9);
    }

    #[test]
    fn test_apply_chain_repairs_seeded_conflict() {
        let p = ProblemData::builder(2, 2)
            .with_conflict(0, 1, 1)
            .build()
            .unwrap();
        let mut tt = Timetable::from_assignment(&p, vec![0, 0]).unwrap();
        assert!(!tt.is_feasible());
        let mut chain = KempeChain::new(0, 1, 1, vec![1]);
        IncrementalEvaluator::default().evaluate(&p, &tt, &mut chain);
        tt.apply_chain(&p, &chain).unwrap();
        assert!(tt.is_feasible());
        assert_eq!(tt.exams_in(1), &[1]);
    }

    #[test]
    fn test_apply_infeasible_chain_clears_feasibility() {
        let p = ProblemData::builder(2, 3)
            .with_conflict(0, 1, 1)
            .with_unavailable(0, 2)
            .build()
            .unwrap();
        let mut tt = Timetable::from_assignment(&p, vec![0, 1]).unwrap();
        assert!(tt.is_feasible());
        let mut chain = KempeChain::new(0, 2, 0, vec![0]);
        let e = IncrementalEvaluator::default().evaluate(&p, &tt, &mut chain);
        assert!(!e.feasible);

        tt.apply_chain(&p, &chain).unwrap();
        assert_eq!(tt.period_of(0), 2);
        assert_eq!(tt.violations(&p).unavailable, 1);
        assert!(!tt.is_feasible());
        let full = ProximityCost::default().full(&p, tt.assignment());
        assert!((tt.fitness() - full).abs() < 1e-9);
    }

    #[test]
    fn test_apply_unevaluated_chain_rejected() {
        let p = problem();
        let mut tt = Timetable::from_assignment(&p, vec![0, 1, 0, 3]).unwrap();
        let before = tt.clone();
        let chain = KempeChain::new(0, 1, 0, vec![0, 1, 2]);
        assert_eq!(
            tt.apply_chain(&p, &chain),
            Err(ModelError::UnevaluatedChain { pivot: 0 })
        );
        assert_eq!(tt, before);
    }
}
