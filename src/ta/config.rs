//! Search configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cooling::CoolingParams;
use crate::error::ConfigError;
use crate::eval::ProximityCost;
use crate::kempe::KempeChainGenerator;

/// Acceptance strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Accept feasible moves with `delta <= threshold`.
    #[default]
    ThresholdAccepting,

    /// Metropolis acceptance with the threshold used as temperature.
    SimulatedAnnealing,

    /// Threshold Accepting that skips chains pivoted on settled exams.
    /// Requires [`TaConfig::statistics`].
    FastThresholdAccepting,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::ThresholdAccepting => "threshold_accepting",
            Strategy::SimulatedAnnealing => "simulated_annealing",
            Strategy::FastThresholdAccepting => "fast_threshold_accepting",
        }
    }
}

/// Scale of the Simulated Annealing exponent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaScaling {
    /// `exp(-delta / (current_fitness * temperature))`: the temperature acts
    /// as a fraction of the current fitness.
    #[default]
    Relative,

    /// `exp(-delta / temperature)`.
    Plain,
}

/// Exam move statistics collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Number of threshold bins the run is split into.
    pub num_bins: usize,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self { num_bins: 10 }
    }
}

/// Configuration of a Threshold Accepting / Simulated Annealing run.
///
/// # Examples
///
/// ```
/// use kempe_ta::cooling::CoolingParams;
/// use kempe_ta::ta::{Strategy, TaConfig};
///
/// let config = TaConfig::default()
///     .with_cooling(CoolingParams::new(0.01, 5e-6, 5, 1e-6))
///     .with_strategy(Strategy::FastThresholdAccepting)
///     .with_statistics(20)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
///
/// let from_toml = TaConfig::from_toml_str(r#"
///     strategy = "simulated_annealing"
///     seed = 7
///
///     [cooling]
///     initial_threshold = 0.5
///     alpha = 0.001
/// "#).unwrap();
/// assert_eq!(from_toml.cooling.span, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaConfig {
    /// Cooling quadruple.
    pub cooling: CoolingParams,

    /// Acceptance rule.
    pub strategy: Strategy,

    /// Exponent scaling used by [`Strategy::SimulatedAnnealing`].
    pub sa_scaling: SaScaling,

    /// Collect exam move statistics. `None` disables collection.
    pub statistics: Option<StatisticsConfig>,

    /// Proximity horizon: periods farther apart than this carry no cost.
    pub horizon: usize,

    /// Random period draws before falling back to a scan for a non-empty
    /// period.
    pub max_retries: usize,

    /// Maximum total iterations. 0 = no limit.
    pub max_iterations: u64,

    /// Wall-clock limit in milliseconds.
    pub time_limit_ms: Option<u64>,

    /// Commits between full fitness recomputations. 0 disables the periodic
    /// check; the final check always runs.
    pub consistency_check_interval: u64,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,

    /// Run independent trials on the rayon thread pool.
    pub parallel: bool,
}

impl Default for TaConfig {
    fn default() -> Self {
        Self {
            cooling: CoolingParams::default(),
            strategy: Strategy::default(),
            sa_scaling: SaScaling::default(),
            statistics: None,
            horizon: ProximityCost::DEFAULT_HORIZON,
            max_retries: KempeChainGenerator::DEFAULT_MAX_RETRIES,
            max_iterations: 0,
            time_limit_ms: None,
            consistency_check_interval: 10_000,
            seed: None,
            parallel: true,
        }
    }
}

impl TaConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn with_cooling(mut self, cooling: CoolingParams) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_sa_scaling(mut self, scaling: SaScaling) -> Self {
        self.sa_scaling = scaling;
        self
    }

    /// Enables statistics with `num_bins` threshold bins.
    pub fn with_statistics(mut self, num_bins: usize) -> Self {
        self.statistics = Some(StatisticsConfig { num_bins });
        self
    }

    pub fn without_statistics(mut self) -> Self {
        self.statistics = None;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_max_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    pub fn with_max_iterations(mut self, n: u64) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = Some(limit.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn with_consistency_check_interval(mut self, n: u64) -> Self {
        self.consistency_check_interval = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Wall-clock limit, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cooling.validate()?;
        if !(2..=63).contains(&self.horizon) {
            return Err(ConfigError::Invalid(format!(
                "horizon must be in 2..=63, got {}",
                self.horizon
            )));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid("max_retries must be at least 1".into()));
        }
        if let Some(stats) = self.statistics {
            if stats.num_bins == 0 {
                return Err(ConfigError::Invalid("num_bins must be at least 1".into()));
            }
            let estimate = self.cooling.estimate_total_iterations();
            if stats.num_bins as u64 > estimate {
                return Err(ConfigError::Invalid(format!(
                    "num_bins ({}) exceeds the estimated run length ({estimate})",
                    stats.num_bins
                )));
            }
        }
        if self.strategy == Strategy::FastThresholdAccepting && self.statistics.is_none() {
            return Err(ConfigError::Invalid(
                "fast_threshold_accepting requires statistics".into(),
            ));
        }
        Ok(())
    }
}
