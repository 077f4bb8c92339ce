//! Cooling schedules for threshold and temperature control.
//!
//! The same schedule drives Threshold Accepting (as a threshold) and
//! Simulated Annealing (as a temperature).

mod exponential;
mod params;

pub use exponential::ExponentialCooling;
pub use params::{calibrate_alpha, CoolingParams};

/// A non-increasing control parameter advanced once per iteration.
pub trait CoolingSchedule {
    /// Resets to the initial threshold and clears the counters.
    fn init(&mut self);

    /// Current threshold.
    fn threshold(&self) -> f64;

    /// Threshold in effect at cumulative iteration `iteration` after
    /// [`init`](Self::init). Pure; does not touch the counters.
    fn threshold_at(&self, iteration: u64) -> f64;

    /// Advances one iteration and returns the threshold now in effect.
    fn update(&mut self, move_applied: bool) -> f64;

    /// `false` once the schedule is exhausted.
    fn is_continue(&self) -> bool;

    /// Current cooling level, starting at 0.
    fn level(&self) -> u64;

    /// Iterations from [`init`](Self::init) until `is_continue` turns false.
    fn estimate_total_iterations(&self) -> u64;

    fn initial_threshold(&self) -> f64;

    fn final_threshold(&self) -> f64;
}
