//! Exam move statistics for Fast Threshold Accepting.
//!
//! The run is split into bins of equal iteration count. Accepted moves are
//! counted per exam and per bin; an exam without accepted moves in the
//! previous bin is assumed settled, and Fast TA skips evaluating chains
//! pivoted on it.

mod bins;
mod record;

pub use bins::ThresholdBins;
pub use record::{ExamMoveRecord, ExamMoveStatistics};
