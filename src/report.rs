//! Plain-text run report.

use std::fmt;

use crate::ta::{TaConfig, TaResult};

/// Run parameters, outcome, final timetable and move statistics.
///
/// # Examples
///
/// ```
/// use kempe_ta::cooling::CoolingParams;
/// use kempe_ta::problem::ProblemData;
/// use kempe_ta::report::RunReport;
/// use kempe_ta::ta::{TaConfig, TaRunner};
/// use kempe_ta::timetable::Timetable;
///
/// let problem = ProblemData::builder(3, 4)
///     .with_conflict(0, 1, 1)
///     .with_conflict(1, 2, 1)
///     .build()
///     .unwrap();
/// let tt = Timetable::from_assignment(&problem, vec![0, 1, 2]).unwrap();
/// let config = TaConfig::default()
///     .with_cooling(CoolingParams::new(1.0, 0.5, 2, 0.01))
///     .with_seed(1);
/// let result = TaRunner::run(&problem, tt, &config).unwrap();
///
/// let text = RunReport::new(&config, &result).to_string();
/// assert!(text.contains("# timetable exams=3 periods=4"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RunReport<'a> {
    config: &'a TaConfig,
    result: &'a TaResult,
}

impl<'a> RunReport<'a> {
    pub fn new(config: &'a TaConfig, result: &'a TaResult) -> Self {
        Self { config, result }
    }
}

impl fmt::Display for RunReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.config;
        let r = self.result;
        writeln!(f, "# run")?;
        writeln!(f, "strategy {}", c.strategy.name())?;
        writeln!(
            f,
            "cooling {} {} {} {}",
            c.cooling.initial_threshold, c.cooling.alpha, c.cooling.span, c.cooling.final_threshold
        )?;
        if let Some(seed) = c.seed {
            writeln!(f, "seed {seed}")?;
        }
        writeln!(f, "termination {:?}", r.termination)?;
        writeln!(f, "fitness {}", r.fitness)?;
        writeln!(f, "best_fitness {}", r.best_fitness)?;
        writeln!(f, "feasible {}", r.feasible)?;
        writeln!(
            f,
            "iterations {} estimated {}",
            r.iterations, r.estimated_iterations
        )?;
        writeln!(f, "evaluations {}", r.evaluations)?;
        writeln!(
            f,
            "moves accepted {} improving {} infeasible {} skipped {}",
            r.accepted_moves, r.improving_moves, r.infeasible_moves, r.skipped_moves
        )?;
        writeln!(f, "final_threshold {:e}", r.final_threshold)?;
        writeln!(f, "elapsed_ms {}", r.elapsed.as_millis())?;
        write!(f, "{}", r.timetable)?;
        if let Some(stats) = &r.statistics {
            write!(f, "{stats}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooling::CoolingParams;
    use crate::problem::ProblemData;
    use crate::ta::{Strategy, TaRunner};
    use crate::timetable::Timetable;

    #[test]
    fn test_report_sections() {
        let problem = ProblemData::builder(4, 5)
            .with_conflict(0, 1, 1)
            .with_conflict(2, 3, 2)
            .build()
            .unwrap();
        let tt = Timetable::from_assignment(&problem, vec![0, 1, 2, 3]).unwrap();
        let config = TaConfig::default()
            .with_cooling(CoolingParams::new(1.0, 0.2, 3, 0.01))
            .with_strategy(Strategy::FastThresholdAccepting)
            .with_statistics(3)
            .with_seed(5);
        let result = TaRunner::run(&problem, tt, &config).unwrap();
        let text = RunReport::new(&config, &result).to_string();

        assert!(text.starts_with("# run\nstrategy fast_threshold_accepting\n"));
        assert!(text.contains("seed 5\n"));
        assert!(text.contains(&format!("evaluations {}\n", result.evaluations)));
        assert!(text.contains("# timetable exams=4 periods=5\n"));
        assert!(text.contains("# exam degree bin0 bin1 bin2\n"));
        assert!(text.contains("# boundaries"));

        // the timetable section parses back
        let body: String = text
            .lines()
            .skip_while(|l| !l.starts_with("# timetable"))
            .take(5)
            .map(|l| format!("{l}\n"))
            .collect();
        let parsed = Timetable::parse(&problem, &body).unwrap();
        assert_eq!(parsed.assignment(), result.timetable.assignment());
    }
}
