//! Threshold bins partitioning a run into equal iteration slices.

use crate::cooling::CoolingSchedule;
use crate::error::ConfigError;

/// `num_bins + 1` threshold boundaries, from high to low.
///
/// Boundary 0 is the initial threshold and boundary `i` is the threshold at
/// cumulative iteration `i * floor(N / num_bins)`, where `N` is the
/// schedule's estimated run length. The last boundary is the threshold at
/// `N`, so the last bin absorbs the remainder.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdBins {
    boundaries: Vec<f64>,
    iterations_per_bin: u64,
}

impl ThresholdBins {
    /// Derives the boundaries from `schedule`.
    ///
    /// Fails when `num_bins` is zero or exceeds the estimated run length.
    pub fn new<C: CoolingSchedule + ?Sized>(
        schedule: &C,
        num_bins: usize,
    ) -> Result<Self, ConfigError> {
        if num_bins == 0 {
            return Err(ConfigError::Invalid("num_bins must be at least 1".into()));
        }
        let total = schedule.estimate_total_iterations();
        let per_bin = total / num_bins as u64;
        if per_bin == 0 {
            return Err(ConfigError::Invalid(format!(
                "num_bins ({num_bins}) exceeds the estimated run length ({total})"
            )));
        }

        let mut boundaries = Vec::with_capacity(num_bins + 1);
        boundaries.push(schedule.initial_threshold());
        for i in 1..num_bins {
            boundaries.push(schedule.threshold_at(i as u64 * per_bin));
        }
        boundaries.push(schedule.threshold_at(total));

        Ok(Self {
            boundaries,
            iterations_per_bin: per_bin,
        })
    }

    pub fn num_bins(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// `floor(N / num_bins)`.
    pub fn iterations_per_bin(&self) -> u64 {
        self.iterations_per_bin
    }

    /// Bin holding `threshold`: the first `i` with
    /// `threshold > boundaries[i + 1]`, clamped to the last bin.
    ///
    /// Never decreases as the threshold decreases.
    pub fn bin_of(&self, threshold: f64) -> usize {
        let last = self.num_bins() - 1;
        self.boundaries[1..]
            .iter()
            .position(|&lower| threshold > lower)
            .map_or(last, |i| i.min(last))
    }
}
