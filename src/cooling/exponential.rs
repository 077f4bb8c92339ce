//! Stepwise exponential cooling.

use super::params::CoolingParams;
use super::CoolingSchedule;
use crate::error::ConfigError;

/// Exponential decay held constant for `span` iterations per level.
///
/// The threshold is recomputed from the level on every decay instead of
/// being multiplied in place, so [`threshold_at`](CoolingSchedule::threshold_at)
/// and the running threshold never disagree.
#[derive(Debug, Clone)]
pub struct ExponentialCooling {
    params: CoolingParams,
    levels: u64,
    level: u64,
    at_level: u64,
    iteration: u64,
    threshold: f64,
}

impl ExponentialCooling {
    /// Validates `params` and builds an initialized schedule.
    pub fn new(params: CoolingParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            params,
            levels: params.levels(),
            level: 0,
            at_level: 0,
            iteration: 0,
            threshold: params.initial_threshold,
        })
    }

    pub fn params(&self) -> &CoolingParams {
        &self.params
    }

    /// Iterations performed since the last [`init`](CoolingSchedule::init).
    pub fn iteration(&self) -> u64 {
        self.iteration
    }
}

impl CoolingSchedule for ExponentialCooling {
    fn init(&mut self) {
        self.level = 0;
        self.at_level = 0;
        self.iteration = 0;
        self.threshold = self.params.initial_threshold;
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn threshold_at(&self, iteration: u64) -> f64 {
        self.params.threshold_at_level(iteration / self.params.span)
    }

    fn update(&mut self, _move_applied: bool) -> f64 {
        self.iteration += 1;
        self.at_level += 1;
        if self.at_level >= self.params.span {
            self.at_level = 0;
            self.level += 1;
            self.threshold = self.params.threshold_at_level(self.level);
        }
        self.threshold
    }

    fn is_continue(&self) -> bool {
        self.threshold > self.params.final_threshold
    }

    fn level(&self) -> u64 {
        self.level
    }

    fn estimate_total_iterations(&self) -> u64 {
        self.params.span.saturating_mul(self.levels)
    }

    fn initial_threshold(&self) -> f64 {
        self.params.initial_threshold
    }

    fn final_threshold(&self) -> f64 {
        self.params.final_threshold
    }
}
