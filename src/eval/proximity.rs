//! Proximity cost: the soft objective.

use crate::problem::ProblemData;

/// Proximity penalty between conflicting exams, decaying with period distance.
///
/// `weight(d) = 2^(horizon - 1 - d)` for `1 <= d < horizon` and `0` otherwise.
/// The default horizon of 6 gives the classic weights 16, 8, 4, 2, 1.
/// Distance 0 is a hard conflict and carries no soft weight.
///
/// The timetable fitness is the sum of `shared_students * weight(distance)`
/// over all conflicting pairs, divided by
/// [`ProblemData::cost_normalizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityCost {
    weights: Vec<f64>,
}

impl Default for ProximityCost {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HORIZON)
    }
}

impl ProximityCost {
    /// Saturation horizon used by the Toronto benchmark cost.
    pub const DEFAULT_HORIZON: usize = 6;

    /// Builds the weight table. A horizon below 2 disables the soft cost.
    pub fn new(horizon: usize) -> Self {
        let weights = (0..horizon.max(1))
            .map(|d| {
                if d == 0 {
                    0.0
                } else {
                    2f64.powi((horizon - 1 - d) as i32)
                }
            })
            .collect();
        Self { weights }
    }

    /// Distance at which the weight reaches zero.
    pub fn horizon(&self) -> usize {
        self.weights.len()
    }

    pub fn weight(&self, distance: usize) -> f64 {
        self.weights.get(distance).copied().unwrap_or(0.0)
    }

    /// Unnormalized cost of one pair placed in periods `pa` and `pb`.
    #[inline]
    pub fn pair_cost(&self, shared: u32, pa: usize, pb: usize) -> f64 {
        f64::from(shared) * self.weight(pa.abs_diff(pb))
    }

    /// Recomputes the normalized fitness of `period_of` from scratch.
    pub fn full(&self, problem: &ProblemData, period_of: &[usize]) -> f64 {
        let raw: f64 = problem
            .conflicts()
            .edges()
            .map(|(a, b, w)| self.pair_cost(w, period_of[a], period_of[b]))
            .sum();
        raw / problem.cost_normalizer()
    }
}
