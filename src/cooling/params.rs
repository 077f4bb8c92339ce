//! Cooling parameters and decay-rate calibration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The cooling quadruple `(initial_threshold, alpha, span, final_threshold)`.
///
/// The threshold at level `l` is `initial_threshold * exp(-alpha * l)`; each
/// level lasts `span` iterations and the run ends at the first level whose
/// threshold is no longer above `final_threshold`.
///
/// # Examples
///
/// ```
/// use kempe_ta::cooling::CoolingParams;
///
/// let params = CoolingParams::new(100.0, 0.0001, 5, 1e-5);
/// assert!(params.validate().is_ok());
/// assert_eq!(params.estimate_total_iterations(), 805_905);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoolingParams {
    /// Threshold of the first level.
    pub initial_threshold: f64,

    /// Decay rate per level. Must be positive.
    pub alpha: f64,

    /// Iterations spent at each level.
    pub span: u64,

    /// The run stops once the threshold drops to or below this value.
    pub final_threshold: f64,
}

impl Default for CoolingParams {
    fn default() -> Self {
        Self {
            initial_threshold: 0.1,
            alpha: 0.0001,
            span: 5,
            final_threshold: 2e-5,
        }
    }
}

impl CoolingParams {
    pub fn new(initial_threshold: f64, alpha: f64, span: u64, final_threshold: f64) -> Self {
        Self {
            initial_threshold,
            alpha,
            span,
            final_threshold,
        }
    }

    /// Validates the parameters.
    ///
    /// Rejects non-positive or non-finite thresholds, `final >= initial`,
    /// non-positive or non-finite `alpha` (a schedule that never decreases)
    /// and a zero `span`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_threshold.is_finite() || self.initial_threshold <= 0.0 {
            return Err(ConfigError::Cooling(format!(
                "initial_threshold must be positive and finite, got {}",
                self.initial_threshold
            )));
        }
        if !self.final_threshold.is_finite() || self.final_threshold <= 0.0 {
            return Err(ConfigError::Cooling(format!(
                "final_threshold must be positive and finite, got {}",
                self.final_threshold
            )));
        }
        if self.final_threshold >= self.initial_threshold {
            return Err(ConfigError::Cooling(format!(
                "final_threshold ({}) must be less than initial_threshold ({})",
                self.final_threshold, self.initial_threshold
            )));
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(ConfigError::Cooling(format!(
                "alpha must be positive and finite, got {}",
                self.alpha
            )));
        }
        if self.span == 0 {
            return Err(ConfigError::Cooling("span must be at least 1".into()));
        }
        Ok(())
    }

    /// Threshold at cooling level `level`.
    pub fn threshold_at_level(&self, level: u64) -> f64 {
        self.initial_threshold * (-self.alpha * level as f64).exp()
    }

    /// Number of levels whose threshold is above `final_threshold`.
    ///
    /// Uses the closed form, then corrects it against
    /// [`threshold_at_level`](Self::threshold_at_level) so the count agrees
    /// exactly with what a run observes.
    pub fn levels(&self) -> u64 {
        let ratio = (self.initial_threshold / self.final_threshold).ln();
        if !(ratio.is_finite() && ratio > 0.0 && self.alpha > 0.0) {
            return 0;
        }
        let exact = ratio / self.alpha;
        if !exact.is_finite() || exact >= 1e18 {
            return u64::MAX;
        }
        let mut n = exact.ceil() as u64;
        while n > 0 && self.threshold_at_level(n - 1) <= self.final_threshold {
            n -= 1;
        }
        while n < u64::MAX && self.threshold_at_level(n) > self.final_threshold {
            n += 1;
        }
        n
    }

    /// Iterations an uncapped run performs: `span * levels()`.
    pub fn estimate_total_iterations(&self) -> u64 {
        self.span.saturating_mul(self.levels())
    }
}

/// Finds the decay rate whose run length reaches `target_iterations`.
///
/// Bisects on `alpha` for the largest rate with
/// `estimate_total_iterations() >= target_iterations`. The result therefore
/// lands within one `span` above the target.
///
/// # Examples
///
/// ```
/// use kempe_ta::cooling::{calibrate_alpha, CoolingParams};
///
/// let alpha = calibrate_alpha(0.1, 2e-5, 5, 1_000_000).unwrap();
/// let estimate = CoolingParams::new(0.1, alpha, 5, 2e-5).estimate_total_iterations();
/// assert!(estimate >= 1_000_000 && estimate < 1_000_005);
/// ```
pub fn calibrate_alpha(
    initial_threshold: f64,
    final_threshold: f64,
    span: u64,
    target_iterations: u64,
) -> Result<f64, ConfigError> {
    let probe = CoolingParams::new(initial_threshold, 1.0, span, final_threshold);
    probe.validate()?;
    if target_iterations == 0 {
        return Err(ConfigError::Cooling(
            "target_iterations must be positive".into(),
        ));
    }

    let estimate = |alpha: f64| CoolingParams { alpha, ..probe }.estimate_total_iterations();
    let ratio = (initial_threshold / final_threshold).ln();

    // Slightly above ln(initial / final): a single level.
    let mut hi = ratio * (1.0 + 1e-9);
    if estimate(hi) >= target_iterations {
        return Ok(hi);
    }
    let mut lo = ratio * span as f64 / target_iterations as f64;
    let mut halvings = 0;
    while estimate(lo) < target_iterations {
        hi = lo;
        lo /= 2.0;
        halvings += 1;
        if halvings > 64 || lo <= 0.0 {
            return Err(ConfigError::Cooling(format!(
                "cannot reach {target_iterations} iterations"
            )));
        }
    }

    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if estimate(mid) >= target_iterations {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        let p = CoolingParams::default();
        assert!(p.validate().is_ok());
        assert!((p.initial_threshold - 0.1).abs() < 1e-15);
        assert_eq!(p.span, 5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            CoolingParams::new(0.0, 0.1, 5, 1e-5),
            CoolingParams::new(f64::INFINITY, 0.1, 5, 1e-5),
            CoolingParams::new(1.0, 0.1, 5, 0.0),
            CoolingParams::new(1.0, 0.1, 5, 2.0),
            CoolingParams::new(1.0, 0.1, 5, 1.0),
            CoolingParams::new(1.0, 0.0, 5, 1e-5),
            CoolingParams::new(1.0, -0.5, 5, 1e-5),
            CoolingParams::new(1.0, f64::NAN, 5, 1e-5),
            CoolingParams::new(1.0, 0.1, 0, 1e-5),
        ];
        for p in bad {
            assert!(
                matches!(p.validate(), Err(ConfigError::Cooling(_))),
                "{p:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_estimate_scenario() {
        // ln(1e7) / 1e-4 = 161180.96 -> 161181 levels of 5 iterations
        let p = CoolingParams::new(100.0, 0.0001, 5, 1e-5);
        assert_eq!(p.levels(), 161_181);
        assert_eq!(p.estimate_total_iterations(), 805_905);
    }

    #[test]
    fn test_levels_boundary() {
        let p = CoolingParams::new(1.0, 0.5, 3, 0.1);
        let n = p.levels();
        assert!(n > 0);
        assert!(p.threshold_at_level(n - 1) > p.final_threshold);
        assert!(p.threshold_at_level(n) <= p.final_threshold);
        assert_eq!(p.estimate_total_iterations(), 3 * n);
    }

    #[test]
    fn test_calibrate_alpha_hits_target() {
        for &(span, target) in &[(5u64, 10_000u64), (1, 777), (6, 13_815_517)] {
            let alpha = calibrate_alpha(0.1, 1e-6, span, target).unwrap();
            let est = CoolingParams::new(0.1, alpha, span, 1e-6).estimate_total_iterations();
            assert!(est >= target, "span {span}: {est} < {target}");
            assert!(est < target + span, "span {span}: {est} too far from {target}");
        }
    }

    #[test]
    fn test_calibrate_alpha_small_target() {
        // Fewer iterations than one level: a single level is the best we can do.
        let alpha = calibrate_alpha(1.0, 0.01, 10, 3).unwrap();
        let est = CoolingParams::new(1.0, alpha, 10, 0.01).estimate_total_iterations();
        assert_eq!(est, 10);
    }

    #[test]
    fn test_calibrate_alpha_invalid() {
        assert!(calibrate_alpha(1.0, 2.0, 5, 100).is_err());
        assert!(calibrate_alpha(1.0, 0.1, 5, 0).is_err());
        assert!(calibrate_alpha(1.0, 0.1, 0, 100).is_err());
    }
}
