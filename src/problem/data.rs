//! Static problem instance and its builder.

use super::conflict::ConflictGraph;
use crate::error::ModelError;

/// An exam to be placed in exactly one period.
#[derive(Debug, Clone, PartialEq)]
pub struct Exam {
    /// Index of the exam, `0..num_exams`.
    pub id: usize,
    /// Number of enrolled students; also the seat demand.
    pub size: u32,
}

/// An examination room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Room {
    /// Number of seats.
    pub capacity: u32,
}

/// Period-related hard constraint between two exams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairConstraint {
    /// `first` must be scheduled strictly after `second`.
    After { first: usize, second: usize },
    /// `first` and `second` must not share a period.
    Exclusion { first: usize, second: usize },
}

impl PairConstraint {
    /// Both exams involved, in declaration order.
    pub fn exams(&self) -> (usize, usize) {
        match *self {
            PairConstraint::After { first, second } | PairConstraint::Exclusion { first, second } => {
                (first, second)
            }
        }
    }

    /// Checks the constraint against a period lookup.
    pub fn is_satisfied<F: Fn(usize) -> usize>(&self, period_of: F) -> bool {
        match *self {
            PairConstraint::After { first, second } => period_of(first) > period_of(second),
            PairConstraint::Exclusion { first, second } => period_of(first) != period_of(second),
        }
    }
}

/// Read-only facts about one timetabling instance.
///
/// Built once through [`ProblemBuilder`] and shared by reference between
/// any number of runs.
#[derive(Debug, Clone)]
pub struct ProblemData {
    exams: Vec<Exam>,
    num_periods: usize,
    rooms: Vec<Room>,
    period_capacity: Option<u64>,
    conflicts: ConflictGraph,
    constraints: Vec<PairConstraint>,
    constraints_of: Vec<Vec<usize>>,
    // num_exams * num_periods, row per exam
    unavailable: Vec<bool>,
    num_students: usize,
}

impl ProblemData {
    /// Starts building an instance with `num_exams` exams and `num_periods` periods.
    pub fn builder(num_exams: usize, num_periods: usize) -> ProblemBuilder {
        ProblemBuilder::new(num_exams, num_periods)
    }

    pub fn num_exams(&self) -> usize {
        self.exams.len()
    }

    pub fn num_periods(&self) -> usize {
        self.num_periods
    }

    pub fn num_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn num_students(&self) -> usize {
        self.num_students
    }

    pub fn exams(&self) -> &[Exam] {
        &self.exams
    }

    pub fn exam(&self, exam: usize) -> &Exam {
        &self.exams[exam]
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn conflicts(&self) -> &ConflictGraph {
        &self.conflicts
    }

    pub fn pair_constraints(&self) -> &[PairConstraint] {
        &self.constraints
    }

    /// Pair constraints that mention `exam`.
    pub fn constraints_of(&self, exam: usize) -> impl Iterator<Item = &PairConstraint> + '_ {
        self.constraints_of[exam].iter().map(|&i| &self.constraints[i])
    }

    /// Total seats available in any period, `None` when unlimited.
    pub fn period_capacity(&self) -> Option<u64> {
        self.period_capacity
    }

    /// Returns `true` unless `period` was declared unavailable for `exam`.
    pub fn is_available(&self, exam: usize, period: usize) -> bool {
        !self.unavailable[exam * self.num_periods + period]
    }

    /// Divisor applied to the raw proximity sum (students per instance, at least 1).
    pub fn cost_normalizer(&self) -> f64 {
        self.num_students.max(1) as f64
    }
}

/// Builder for [`ProblemData`].
///
/// # Examples
///
/// ```
/// use kempe_ta::problem::{PairConstraint, ProblemData};
///
/// let problem = ProblemData::builder(3, 4)
///     .with_enrolments(vec![vec![0, 1], vec![1, 2], vec![0, 1]])
///     .with_room(100)
///     .with_unavailable(2, 0)
///     .with_constraint(PairConstraint::After { first: 2, second: 0 })
///     .build()
///     .unwrap();
///
/// assert_eq!(problem.conflicts().weight(0, 1), 2);
/// assert_eq!(problem.exam(1).size, 3);
/// assert_eq!(problem.num_students(), 3);
/// assert!(!problem.is_available(2, 0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProblemBuilder {
    num_exams: usize,
    num_periods: usize,
    sizes: Vec<(usize, u32)>,
    rooms: Vec<Room>,
    edges: Vec<(usize, usize, u32)>,
    enrolments: Vec<Vec<usize>>,
    unavailable: Vec<(usize, usize)>,
    constraints: Vec<PairConstraint>,
    num_students: Option<usize>,
}

impl ProblemBuilder {
    pub fn new(num_exams: usize, num_periods: usize) -> Self {
        Self {
            num_exams,
            num_periods,
            ..Self::default()
        }
    }

    /// Sets the seat demand of an exam, overriding any enrolment count.
    pub fn with_exam_size(mut self, exam: usize, size: u32) -> Self {
        self.sizes.push((exam, size));
        self
    }

    /// Adds a room; period capacity is the sum of all room capacities.
    pub fn with_room(mut self, capacity: u32) -> Self {
        self.rooms.push(Room { capacity });
        self
    }

    /// Adds `shared` students between exams `a` and `b`.
    pub fn with_conflict(mut self, a: usize, b: usize, shared: u32) -> Self {
        self.edges.push((a, b, shared));
        self
    }

    /// Adds one exam list per student. Conflicts and exam sizes are derived
    /// from them, and the student count defaults to the number of lists.
    pub fn with_enrolments(mut self, students: Vec<Vec<usize>>) -> Self {
        self.enrolments.extend(students);
        self
    }

    /// Forbids `period` for `exam`.
    pub fn with_unavailable(mut self, exam: usize, period: usize) -> Self {
        self.unavailable.push((exam, period));
        self
    }

    pub fn with_constraint(mut self, constraint: PairConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Overrides the student count used to normalize the proximity cost.
    pub fn with_num_students(mut self, n: usize) -> Self {
        self.num_students = Some(n);
        self
    }

    /// Validates indices and freezes the instance.
    pub fn build(self) -> Result<ProblemData, ModelError> {
        let n = self.num_exams;
        let p = self.num_periods;
        if p == 0 {
            return Err(ModelError::NoPeriods);
        }
        let check_exam = |exam: usize| {
            if exam < n {
                Ok(())
            } else {
                Err(ModelError::ExamOutOfRange { exam, num_exams: n })
            }
        };
        let check_period = |period: usize| {
            if period < p {
                Ok(())
            } else {
                Err(ModelError::PeriodOutOfRange {
                    period,
                    num_periods: p,
                })
            }
        };

        let mut graph_edges = self.edges;
        let enrolled = ConflictGraph::from_enrolments(n, &self.enrolments)?;
        graph_edges.extend(enrolled.edges());
        let conflicts = ConflictGraph::from_edges(n, graph_edges)?;

        let mut exams: Vec<Exam> = (0..n).map(|id| Exam { id, size: 0 }).collect();
        for student in &self.enrolments {
            let mut seen: Vec<usize> = student.clone();
            seen.sort_unstable();
            seen.dedup();
            for exam in seen {
                check_exam(exam)?;
                exams[exam].size += 1;
            }
        }
        for (exam, size) in self.sizes {
            check_exam(exam)?;
            exams[exam].size = size;
        }

        let mut unavailable = vec![false; n * p];
        for (exam, period) in self.unavailable {
            check_exam(exam)?;
            check_period(period)?;
            unavailable[exam * p + period] = true;
        }

        let mut constraints_of = vec![Vec::new(); n];
        for (i, c) in self.constraints.iter().enumerate() {
            let (a, b) = c.exams();
            check_exam(a)?;
            check_exam(b)?;
            constraints_of[a].push(i);
            if b != a {
                constraints_of[b].push(i);
            }
        }

        let period_capacity = if self.rooms.is_empty() {
            None
        } else {
            Some(self.rooms.iter().map(|r| u64::from(r.capacity)).sum())
        };

        Ok(ProblemData {
            exams,
            num_periods: p,
            rooms: self.rooms,
            period_capacity,
            conflicts,
            constraints: self.constraints,
            constraints_of,
            unavailable,
            num_students: self.num_students.unwrap_or(self.enrolments.len()),
        })
    }
}
