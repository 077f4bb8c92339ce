//! Exam conflict graph.

use crate::error::ModelError;

/// Symmetric exam × exam relation holding the number of shared students.
///
/// Stored as one adjacency list per exam, sorted by neighbour index, so
/// that [`weight`](ConflictGraph::weight) is a binary search and chain
/// construction iterates only real conflicts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictGraph {
    adjacency: Vec<Vec<(usize, u32)>>,
    num_edges: usize,
}

impl ConflictGraph {
    /// Creates a graph with `num_exams` vertices and no conflicts.
    pub fn new(num_exams: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); num_exams],
            num_edges: 0,
        }
    }

    /// Builds a graph from `(a, b, shared_students)` triples.
    ///
    /// Parallel edges accumulate their weights; self-loops and zero weights
    /// are ignored.
    pub fn from_edges<I>(num_exams: usize, edges: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (usize, usize, u32)>,
    {
        let mut graph = Self::new(num_exams);
        for (a, b, w) in edges {
            graph.push(a, b, w)?;
        }
        graph.normalize();
        Ok(graph)
    }

    /// Builds a graph from student enrolments: one list of exams per student.
    ///
    /// Every pair of distinct exams taken by the same student adds one to
    /// their shared-student count. Duplicate exams in a list count once.
    pub fn from_enrolments(num_exams: usize, students: &[Vec<usize>]) -> Result<Self, ModelError> {
        let mut graph = Self::new(num_exams);
        let mut exams = Vec::new();
        for student in students {
            exams.clear();
            exams.extend_from_slice(student);
            exams.sort_unstable();
            exams.dedup();
            for (i, &a) in exams.iter().enumerate() {
                for &b in &exams[i + 1..] {
                    graph.push(a, b, 1)?;
                }
            }
        }
        graph.normalize();
        Ok(graph)
    }

    fn push(&mut self, a: usize, b: usize, w: u32) -> Result<(), ModelError> {
        let num_exams = self.adjacency.len();
        for exam in [a, b] {
            if exam >= num_exams {
                return Err(ModelError::ExamOutOfRange { exam, num_exams });
            }
        }
        if a == b || w == 0 {
            return Ok(());
        }
        self.adjacency[a].push((b, w));
        self.adjacency[b].push((a, w));
        Ok(())
    }

    /// Sorts every adjacency list and merges parallel edges.
    fn normalize(&mut self) {
        let mut edges = 0;
        for list in &mut self.adjacency {
            list.sort_unstable_by_key(|&(n, _)| n);
            let mut merged: Vec<(usize, u32)> = Vec::with_capacity(list.len());
            for &(n, w) in list.iter() {
                match merged.last_mut() {
                    Some(last) if last.0 == n => last.1 = last.1.saturating_add(w),
                    _ => merged.push((n, w)),
                }
            }
            edges += merged.len();
            *list = merged;
        }
        self.num_edges = edges / 2;
    }

    /// Number of vertices (exams).
    pub fn num_exams(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of conflicting exam pairs.
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Shared-student count between `a` and `b` (0 when they do not conflict).
    pub fn weight(&self, a: usize, b: usize) -> u32 {
        let list = &self.adjacency[a];
        match list.binary_search_by_key(&b, |&(n, _)| n) {
            Ok(i) => list[i].1,
            Err(_) => 0,
        }
    }

    /// Returns `true` if `a` and `b` share at least one student.
    pub fn conflicts(&self, a: usize, b: usize) -> bool {
        self.weight(a, b) > 0
    }

    /// Conflicting exams of `exam` with their shared-student counts.
    pub fn neighbors(&self, exam: usize) -> &[(usize, u32)] {
        &self.adjacency[exam]
    }

    /// Number of exams conflicting with `exam` (its color degree).
    pub fn degree(&self, exam: usize) -> usize {
        self.adjacency[exam].len()
    }

    /// Iterates every conflicting pair once as `(a, b, weight)` with `a < b`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(a, list)| {
            list.iter()
                .filter(move |&&(b, _)| a < b)
                .map(move |&(b, w)| (a, b, w))
        })
    }
}
