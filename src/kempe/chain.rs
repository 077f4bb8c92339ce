//! The Kempe chain candidate move.

use crate::eval::Evaluation;
use crate::timetable::Timetable;

/// One proposed move: every member swaps between periods `ti` and `tj`.
///
/// Members are kept sorted so membership tests are a binary search.
#[derive(Debug, Clone, PartialEq)]
pub struct KempeChain {
    ti: usize,
    tj: usize,
    pivot: usize,
    members: Vec<usize>,
    evaluation: Option<Evaluation>,
}

impl KempeChain {
    /// Creates an unevaluated chain. `members` should contain `pivot`.
    pub fn new(ti: usize, tj: usize, pivot: usize, mut members: Vec<usize>) -> Self {
        members.sort_unstable();
        members.dedup();
        Self {
            ti,
            tj,
            pivot,
            members,
            evaluation: None,
        }
    }

    /// Period the pivot is taken from.
    pub fn ti(&self) -> usize {
        self.ti
    }

    /// Period the pivot is sent to.
    pub fn tj(&self) -> usize {
        self.tj
    }

    pub fn pivot(&self) -> usize {
        self.pivot
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, exam: usize) -> bool {
        self.members.binary_search(&exam).is_ok()
    }

    /// The other end of the swap for a member currently in `period`.
    #[inline]
    pub fn destination(&self, period: usize) -> usize {
        if period == self.ti {
            self.tj
        } else {
            self.ti
        }
    }

    /// Period of `exam` once this chain is applied to `timetable`.
    pub fn new_period_of(&self, exam: usize, timetable: &Timetable) -> usize {
        let current = timetable.period_of(exam);
        if self.contains(exam) {
            self.destination(current)
        } else {
            current
        }
    }

    pub fn evaluation(&self) -> Option<Evaluation> {
        self.evaluation
    }

    /// `false` until evaluated as feasible.
    pub fn is_feasible(&self) -> bool {
        self.evaluation.is_some_and(|e| e.feasible)
    }

    /// Fitness delta, `0.0` before evaluation.
    pub fn delta(&self) -> f64 {
        self.evaluation.map_or(0.0, |e| e.delta)
    }

    pub(crate) fn set_evaluation(&mut self, evaluation: Evaluation) {
        self.evaluation = Some(evaluation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_sorted_and_deduped() {
        let c = KempeChain::new(0, 3, 5, vec![5, 2, 9, 2]);
        assert_eq!(c.members(), &[2, 5, 9]);
        assert!(c.contains(9));
        assert!(!c.contains(3));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn test_destination_alternates() {
        let c = KempeChain::new(1, 4, 0, vec![0]);
        assert_eq!(c.destination(1), 4);
        assert_eq!(c.destination(4), 1);
    }

    #[test]
    fn test_unevaluated_is_not_feasible() {
        let mut c = KempeChain::new(0, 1, 0, vec![0]);
        assert!(!c.is_feasible());
        assert_eq!(c.delta(), 0.0);
        c.set_evaluation(Evaluation {
            delta: -2.5,
            feasible: true,
        });
        assert!(c.is_feasible());
        assert_eq!(c.delta(), -2.5);
    }
}
