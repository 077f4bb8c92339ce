//! Plain-text timetable format.
//!
//! ```text
//! # timetable exams=3 periods=4
//! 0 2
//! 1 0
//! 2 3
//! ```
//!
//! Blank lines and lines starting with `#` are ignored when parsing; every
//! other line is `<exam> <period>`.

use std::fmt;

use super::state::Timetable;
use crate::error::ModelError;
use crate::eval::ProximityCost;
use crate::problem::ProblemData;

impl fmt::Display for Timetable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# timetable exams={} periods={}",
            self.num_exams(),
            self.num_periods()
        )?;
        for (exam, period) in self.assignment().iter().enumerate() {
            writeln!(f, "{exam} {period}")?;
        }
        Ok(())
    }
}

impl Timetable {
    /// Parses the plain-text format and scores the result with the default cost.
    ///
    /// # Examples
    ///
    /// ```
    /// use kempe_ta::problem::ProblemData;
    /// use kempe_ta::timetable::Timetable;
    ///
    /// let problem = ProblemData::builder(2, 3).with_conflict(0, 1, 1).build().unwrap();
    /// let tt = Timetable::parse(&problem, "0 0\n1 2\n").unwrap();
    /// assert_eq!(tt.assignment(), &[0, 2]);
    ///
    /// let again = Timetable::parse(&problem, &tt.to_string()).unwrap();
    /// assert_eq!(again, tt);
    /// ```
    pub fn parse(problem: &ProblemData, text: &str) -> Result<Self, ModelError> {
        Self::parse_with_cost(problem, &ProximityCost::default(), text)
    }

    /// Parses the plain-text format and scores the result with `cost`.
    pub fn parse_with_cost(
        problem: &ProblemData,
        cost: &ProximityCost,
        text: &str,
    ) -> Result<Self, ModelError> {
        let num_exams = problem.num_exams();
        let mut slots: Vec<Option<usize>> = vec![None; num_exams];

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = idx + 1;
            let parse_err = |reason: String| ModelError::Parse {
                line: line_no,
                reason,
            };

            let mut fields = line.split_whitespace();
            let (Some(exam), Some(period), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(parse_err(format!("expected `<exam> <period>`, got `{line}`")));
            };
            let exam: usize = exam
                .parse()
                .map_err(|e| parse_err(format!("bad exam `{exam}`: {e}")))?;
            let period: usize = period
                .parse()
                .map_err(|e| parse_err(format!("bad period `{period}`: {e}")))?;

            let slot = slots
                .get_mut(exam)
                .ok_or(ModelError::ExamOutOfRange { exam, num_exams })?;
            if slot.replace(period).is_some() {
                return Err(ModelError::DuplicateExam { exam });
            }
        }

        let assignment = slots
            .into_iter()
            .enumerate()
            .map(|(exam, p)| p.ok_or(ModelError::MissingExam { exam }))
            .collect::<Result<Vec<_>, _>>()?;
        Self::with_cost(problem, cost, assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> ProblemData {
        ProblemData::builder(3, 4)
            .with_conflict(0, 1, 2)
            .with_conflict(1, 2, 3)
            .with_num_students(4)
            .build()
            .unwrap()
    }

    #[test]
    fn test_display_format() {
        let p = problem();
        let tt = Timetable::from_assignment(&p, vec![2, 0, 3]).unwrap();
        assert_eq!(
            tt.to_string(),
            "# timetable exams=3 periods=4\n0 2\n1 0\n2 3\n"
        );
    }

    #[test]
    fn test_round_trip_preserves_mapping_and_fitness() {
        let p = problem();
        let tt = Timetable::from_assignment(&p, vec![3, 1, 0]).unwrap();
        let parsed = Timetable::parse(&p, &tt.to_string()).unwrap();
        assert_eq!(parsed.assignment(), tt.assignment());
        assert_eq!(parsed.fitness(), tt.fitness());
    }

    #[test]
    fn test_parse_order_and_comments_irrelevant() {
        let p = problem();
        let tt = Timetable::parse(&p, "# header\n\n2 1\n  0 3 \n1 2\n").unwrap();
        assert_eq!(tt.assignment(), &[3, 2, 1]);
    }

    #[test]
    fn test_parse_errors() {
        let p = problem();
        assert!(matches!(
            Timetable::parse(&p, "0 1\nbanana 2\n"),
            Err(ModelError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            Timetable::parse(&p, "0 1 7\n"),
            Err(ModelError::Parse { line: 1, .. })
        ));
        assert_eq!(
            Timetable::parse(&p, "0 1\n0 2\n").unwrap_err(),
            ModelError::DuplicateExam { exam: 0 }
        );
        assert_eq!(
            Timetable::parse(&p, "0 1\n2 2\n").unwrap_err(),
            ModelError::MissingExam { exam: 1 }
        );
        assert_eq!(
            Timetable::parse(&p, "5 1\n").unwrap_err(),
            ModelError::ExamOutOfRange {
                exam: 5,
                num_exams: 3
            }
        );
        assert!(matches!(
            Timetable::parse(&p, "0 1\n1 1\n2 8\n"),
            Err(ModelError::PeriodOutOfRange { period: 8, .. })
        ));
    }
}
