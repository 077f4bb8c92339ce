//! Per-exam accepted move counters.

use std::fmt;

use super::bins::ThresholdBins;
use crate::cooling::CoolingSchedule;
use crate::error::ConfigError;
use crate::problem::ProblemData;

/// Accepted moves of one exam, per threshold bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamMoveRecord {
    exam: usize,
    color_degree: usize,
    counts: Vec<u64>,
}

impl ExamMoveRecord {
    fn new(exam: usize, color_degree: usize, num_bins: usize) -> Self {
        Self {
            exam,
            color_degree,
            counts: vec![0; num_bins],
        }
    }

    pub fn exam(&self) -> usize {
        self.exam
    }

    /// Number of exams in conflict with this one.
    pub fn color_degree(&self) -> usize {
        self.color_degree
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn count(&self, bin: usize) -> u64 {
        self.counts[bin]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    fn record(&mut self, bin: usize) {
        self.counts[bin] += 1;
    }
}

/// Move statistics for every exam of a run.
///
/// Counts how often each exam was the pivot of an accepted move while the
/// threshold was inside each bin. An exam that saw no accepted move in the
/// previous bin is predicted settled: see [`is_settled`](Self::is_settled).
///
/// # Examples
///
/// ```
/// use kempe_ta::cooling::{CoolingParams, ExponentialCooling};
/// use kempe_ta::problem::ProblemData;
/// use kempe_ta::stats::ExamMoveStatistics;
///
/// let problem = ProblemData::builder(3, 4).with_conflict(0, 1, 2).build().unwrap();
/// let schedule = ExponentialCooling::new(CoolingParams::new(1.0, 0.01, 5, 1e-3)).unwrap();
/// let mut stats = ExamMoveStatistics::new(&problem, &schedule, 4).unwrap();
///
/// let bin = stats.record_move(1, 1.0);
/// assert_eq!(bin, 0);
/// assert_eq!(stats.record(1).total(), 1);
/// assert_eq!(stats.table()[0].color_degree(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ExamMoveStatistics {
    bins: ThresholdBins,
    records: Vec<ExamMoveRecord>,
    total_moves: u64,
}

impl ExamMoveStatistics {
    pub fn new<C: CoolingSchedule + ?Sized>(
        problem: &ProblemData,
        schedule: &C,
        num_bins: usize,
    ) -> Result<Self, ConfigError> {
        let bins = ThresholdBins::new(schedule, num_bins)?;
        let records = (0..problem.num_exams())
            .map(|exam| ExamMoveRecord::new(exam, problem.conflicts().degree(exam), num_bins))
            .collect();
        Ok(Self {
            bins,
            records,
            total_moves: 0,
        })
    }

    pub fn bins(&self) -> &ThresholdBins {
        &self.bins
    }

    /// Records an accepted move of `exam` at `threshold`; returns its bin.
    pub fn record_move(&mut self, exam: usize, threshold: f64) -> usize {
        let bin = self.bins.bin_of(threshold);
        self.records[exam].record(bin);
        self.total_moves += 1;
        bin
    }

    /// `true` when `exam` is predicted not to benefit from evaluation.
    ///
    /// With `b = bin_of(threshold)`: settled iff `b >= 2` and the exam had no
    /// accepted move in bin `b - 1`. The first two bins never skip.
    pub fn is_settled(&self, exam: usize, threshold: f64) -> bool {
        let bin = self.bins.bin_of(threshold);
        bin >= 2 && self.records[exam].count(bin - 1) == 0
    }

    pub fn record(&self, exam: usize) -> &ExamMoveRecord {
        &self.records[exam]
    }

    /// Records in exam order.
    pub fn records(&self) -> &[ExamMoveRecord] {
        &self.records
    }

    pub fn total_moves(&self) -> u64 {
        self.total_moves
    }

    /// Records sorted by descending color degree, ties by exam id.
    pub fn table(&self) -> Vec<&ExamMoveRecord> {
        let mut rows: Vec<&ExamMoveRecord> = self.records.iter().collect();
        rows.sort_by(|a, b| {
            b.color_degree
                .cmp(&a.color_degree)
                .then(a.exam.cmp(&b.exam))
        });
        rows
    }
}

impl fmt::Display for ExamMoveStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "# exam degree")?;
        for bin in 0..self.bins.num_bins() {
            write!(f, " bin{bin}")?;
        }
        writeln!(f)?;
        for row in self.table() {
            write!(f, "{} {}", row.exam, row.color_degree)?;
            for count in &row.counts {
                write!(f, " {count}")?;
            }
            writeln!(f)?;
        }
        write!(f, "# boundaries")?;
        for b in self.bins.boundaries() {
            write!(f, " {b:e}")?;
        }
        writeln!(f)
    }
}
