//! Local search core for examination timetabling.
//!
//! Exams are assigned to periods so that no two exams sharing a student sit
//! in the same period, while a proximity cost penalizes conflicting exams
//! scheduled close together. Starting from a feasible timetable supplied by
//! the caller, the search improves it with:
//!
//! - **Kempe chain moves** ([`kempe`]): swaps a connected set of exams
//!   between two periods, which keeps the timetable conflict-free.
//! - **Incremental evaluation** ([`eval`]): scores a chain by revisiting only
//!   the conflicts that touch it.
//! - **Cooling schedules** ([`cooling`]): a stepwise exponential threshold
//!   with an exact run-length estimate.
//! - **Threshold Accepting and Simulated Annealing** ([`ta`]), including
//!   Fast TA, which uses **exam move statistics** ([`stats`]) to skip
//!   evaluating chains around exams that stopped moving.
//!
//! # Example
//!
//! ```
//! use kempe_ta::cooling::CoolingParams;
//! use kempe_ta::problem::ProblemData;
//! use kempe_ta::ta::{Strategy, TaConfig, TaRunner};
//! use kempe_ta::timetable::Timetable;
//!
//! let problem = ProblemData::builder(4, 6)
//!     .with_enrolments(vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![0, 3]])
//!     .build()
//!     .unwrap();
//! let initial = Timetable::from_assignment(&problem, vec![0, 1, 2, 3]).unwrap();
//!
//! let config = TaConfig::default()
//!     .with_cooling(CoolingParams::new(0.5, 0.05, 5, 1e-3))
//!     .with_strategy(Strategy::FastThresholdAccepting)
//!     .with_statistics(5)
//!     .with_seed(42);
//! let result = TaRunner::run(&problem, initial, &config).unwrap();
//! assert!(result.feasible);
//! // 0-1, 1-2 and 2-3 sit one period apart, 0-3 three: (16 * 3 + 4) / 4
//! assert!(result.best_fitness <= 13.0);
//! ```

pub mod cooling;
pub mod error;
pub mod eval;
pub mod kempe;
pub mod problem;
pub mod report;
pub mod stats;
pub mod ta;
pub mod timetable;
