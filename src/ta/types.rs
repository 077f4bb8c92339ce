//! Acceptance rules.

use rand::Rng;

use super::config::{SaScaling, Strategy};
use crate::eval::Evaluation;

/// Decides whether an evaluated candidate replaces the current timetable.
///
/// Minimization: negative deltas improve. Implementations must reject
/// infeasible candidates.
pub trait AcceptanceStrategy {
    fn name(&self) -> &'static str;

    fn accept<R: Rng>(
        &self,
        evaluation: &Evaluation,
        current_fitness: f64,
        threshold: f64,
        rng: &mut R,
    ) -> bool;
}

/// Accepts any feasible move that worsens fitness by at most the threshold.
///
/// Reference: Dueck & Scheuer (1990), "Threshold accepting"
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdAccepting;

impl AcceptanceStrategy for ThresholdAccepting {
    fn name(&self) -> &'static str {
        "threshold_accepting"
    }

    fn accept<R: Rng>(
        &self,
        evaluation: &Evaluation,
        _current_fitness: f64,
        threshold: f64,
        _rng: &mut R,
    ) -> bool {
        evaluation.feasible && evaluation.delta <= threshold
    }
}

/// Metropolis criterion with the threshold as temperature.
///
/// Improving moves are always accepted. A worsening move is accepted with
/// probability `exp(-delta / scale)`, where `scale` depends on
/// [`SaScaling`]. When the scale is not positive only zero-delta moves pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedAnnealing {
    pub scaling: SaScaling,
}

impl SimulatedAnnealing {
    pub fn new(scaling: SaScaling) -> Self {
        Self { scaling }
    }

    fn scale(&self, current_fitness: f64, temperature: f64) -> f64 {
        match self.scaling {
            SaScaling::Relative => current_fitness * temperature,
            SaScaling::Plain => temperature,
        }
    }
}

impl AcceptanceStrategy for SimulatedAnnealing {
    fn name(&self) -> &'static str {
        "simulated_annealing"
    }

    fn accept<R: Rng>(
        &self,
        evaluation: &Evaluation,
        current_fitness: f64,
        threshold: f64,
        rng: &mut R,
    ) -> bool {
        if !evaluation.feasible {
            return false;
        }
        if evaluation.delta < 0.0 {
            return true;
        }
        let scale = self.scale(current_fitness, threshold);
        if scale > 0.0 && scale.is_finite() {
            let probability = (-evaluation.delta / scale).exp();
            rng.random_range(0.0..1.0) < probability
        } else {
            evaluation.delta == 0.0
        }
    }
}

/// Acceptance rule selected at configuration time.
#[derive(Debug, Clone, Copy)]
pub enum Acceptor {
    Threshold(ThresholdAccepting),
    Annealing(SimulatedAnnealing),
}

impl Acceptor {
    /// Rule for `strategy`. Fast TA accepts exactly like TA.
    pub fn from_strategy(strategy: Strategy, scaling: SaScaling) -> Self {
        match strategy {
            Strategy::ThresholdAccepting | Strategy::FastThresholdAccepting => {
                Acceptor::Threshold(ThresholdAccepting)
            }
            Strategy::SimulatedAnnealing => Acceptor::Annealing(SimulatedAnnealing::new(scaling)),
        }
    }
}

impl AcceptanceStrategy for Acceptor {
    fn name(&self) -> &'static str {
        match self {
            Acceptor::Threshold(a) => a.name(),
            Acceptor::Annealing(a) => a.name(),
        }
    }

    fn accept<R: Rng>(
        &self,
        evaluation: &Evaluation,
        current_fitness: f64,
        threshold: f64,
        rng: &mut R,
    ) -> bool {
        match self {
            Acceptor::Threshold(a) => a.accept(evaluation, current_fitness, threshold, rng),
            Acceptor::Annealing(a) => a.accept(evaluation, current_fitness, threshold, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn eval(delta: f64, feasible: bool) -> Evaluation {
        Evaluation { delta, feasible }
    }

    #[test]
    fn test_threshold_accepting() {
        let mut rng = StdRng::seed_from_u64(0);
        let ta = ThresholdAccepting;
        assert!(ta.accept(&eval(-5.0, true), 10.0, 0.1, &mut rng));
        assert!(ta.accept(&eval(0.1, true), 10.0, 0.1, &mut rng));
        assert!(!ta.accept(&eval(0.11, true), 10.0, 0.1, &mut rng));
        assert!(!ta.accept(&eval(-5.0, false), 10.0, 0.1, &mut rng));
    }

    #[test]
    fn test_sa_improving_and_infeasible() {
        let mut rng = StdRng::seed_from_u64(0);
        let sa = SimulatedAnnealing::default();
        assert!(sa.accept(&eval(-0.5, true), 10.0, 1e-9, &mut rng));
        assert!(!sa.accept(&eval(-0.5, false), 10.0, 1e3, &mut rng));
    }

    #[test]
    fn test_sa_relative_scaling_rate() {
        // exp(-1 / (10 * 0.1)) = exp(-1) ~ 0.368
        let mut rng = StdRng::seed_from_u64(11);
        let sa = SimulatedAnnealing::new(SaScaling::Relative);
        let n = 20_000;
        let accepted = (0..n)
            .filter(|_| sa.accept(&eval(1.0, true), 10.0, 0.1, &mut rng))
            .count();
        let rate = accepted as f64 / n as f64;
        assert!((rate - (-1.0f64).exp()).abs() < 0.02, "rate = {rate}");
    }

    #[test]
    fn test_sa_plain_scaling_rate() {
        // exp(-1 / 2) ~ 0.607, independent of the current fitness
        let mut rng = StdRng::seed_from_u64(5);
        let sa = SimulatedAnnealing::new(SaScaling::Plain);
        let n = 20_000;
        let accepted = (0..n)
            .filter(|_| sa.accept(&eval(1.0, true), 1000.0, 2.0, &mut rng))
            .count();
        let rate = accepted as f64 / n as f64;
        assert!((rate - (-0.5f64).exp()).abs() < 0.02, "rate = {rate}");
    }

    #[test]
    fn test_sa_zero_scale() {
        let mut rng = StdRng::seed_from_u64(1);
        let sa = SimulatedAnnealing::new(SaScaling::Relative);
        assert!(sa.accept(&eval(0.0, true), 0.0, 0.5, &mut rng));
        assert!(!sa.accept(&eval(1e-9, true), 0.0, 0.5, &mut rng));
    }

    #[test]
    fn test_acceptor_from_strategy() {
        let a = Acceptor::from_strategy(Strategy::FastThresholdAccepting, SaScaling::Plain);
        assert_eq!(a.name(), "threshold_accepting");
        let a = Acceptor::from_strategy(Strategy::SimulatedAnnealing, SaScaling::Plain);
        assert!(matches!(
            a,
            Acceptor::Annealing(SimulatedAnnealing {
                scaling: SaScaling::Plain
            })
        ));
    }
}
