use kempe_ta::cooling::CoolingParams;
use kempe_ta::eval::ProximityCost;
use kempe_ta::problem::ProblemData;
use kempe_ta::ta::{StepOutcome, TaConfig, TaEngine};
use kempe_ta::timetable::Timetable;
use proptest::prelude::*;

/// Random conflict graph plus a greedy colouring with spare periods.
fn instance_strategy() -> impl Strategy<Value = (ProblemData, Vec<usize>)> {
    (4usize..30)
        .prop_flat_map(|n| {
            (
                Just(n),
                prop::collection::vec((0..n, 0..n, 1u32..4), 0..n * 3),
                0usize..4,
            )
        })
        .prop_map(|(n, edges, spare)| {
            let mut builder = ProblemData::builder(n, n + 2).with_num_students(n * 2);
            for &(a, b, w) in &edges {
                builder = builder.with_conflict(a, b, w);
            }
            let wide = builder.build().unwrap();

            let mut period_of = vec![usize::MAX; n];
            for exam in 0..n {
                let mut used = vec![false; n + 2];
                for &(other, _) in wide.conflicts().neighbors(exam) {
                    if period_of[other] != usize::MAX {
                        used[period_of[other]] = true;
                    }
                }
                period_of[exam] = used.iter().position(|&u| !u).unwrap();
            }

            let num_periods = (period_of.iter().max().unwrap() + 1 + spare).max(2);
            let mut builder = ProblemData::builder(n, num_periods).with_num_students(n * 2);
            for &(a, b, w) in &edges {
                builder = builder.with_conflict(a, b, w);
            }
            (builder.build().unwrap(), period_of)
        })
}

fn short_config(seed: u64) -> TaConfig {
    TaConfig::default()
        .with_cooling(CoolingParams::new(0.5, 0.08, 3, 1e-3))
        .with_consistency_check_interval(1)
        .with_seed(seed)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_commits_stay_conflict_free_and_exact(
        (problem, period_of) in instance_strategy(),
        seed in any::<u64>(),
    ) {
        let tt = Timetable::from_assignment(&problem, period_of).unwrap();
        prop_assert!(tt.is_feasible());
        let cost = ProximityCost::default();
        let mut engine = TaEngine::new(&problem, tt, &short_config(seed)).unwrap();

        while !engine.is_finished() {
            let step = engine.step().unwrap();
            if step.outcome == StepOutcome::Accepted {
                let tt = engine.timetable();
                for (a, b, _) in problem.conflicts().edges() {
                    prop_assert_ne!(tt.period_of(a), tt.period_of(b));
                }
                let full = cost.full(&problem, tt.assignment());
                prop_assert!((tt.fitness() - full).abs() <= 1e-9 * full.abs().max(1.0));
                prop_assert!(tt.is_consistent(&problem));
            }
        }
    }

    #[test]
    fn prop_ta_accepts_only_within_threshold(
        (problem, period_of) in instance_strategy(),
        seed in any::<u64>(),
    ) {
        let tt = Timetable::from_assignment(&problem, period_of).unwrap();
        let mut engine = TaEngine::new(&problem, tt, &short_config(seed)).unwrap();
        let estimate = engine.schedule().params().estimate_total_iterations();

        while !engine.is_finished() {
            let step = engine.step().unwrap();
            match (step.outcome, step.evaluation) {
                (StepOutcome::Accepted, Some(e)) => {
                    prop_assert!(e.feasible);
                    prop_assert!(e.delta <= step.threshold);
                }
                (StepOutcome::Infeasible, Some(e)) => prop_assert!(!e.feasible),
                (StepOutcome::Rejected, Some(e)) => prop_assert!(e.delta > step.threshold),
                (outcome, e) => prop_assert!(false, "unexpected {:?} / {:?}", outcome, e),
            }
        }
        prop_assert_eq!(engine.iterations(), estimate);
        prop_assert_eq!(engine.evaluations(), estimate);
    }

    #[test]
    fn prop_fast_ta_counts_add_up(
        (problem, period_of) in instance_strategy(),
        seed in any::<u64>(),
    ) {
        let tt = Timetable::from_assignment(&problem, period_of).unwrap();
        let config = short_config(seed)
            .with_strategy(kempe_ta::ta::Strategy::FastThresholdAccepting)
            .with_statistics(4);
        let result = TaEngine::new(&problem, tt, &config).unwrap().run().unwrap();

        prop_assert_eq!(result.iterations, result.estimated_iterations);
        prop_assert_eq!(result.evaluations + result.skipped_moves, result.iterations);
        let stats = result.statistics.as_ref().unwrap();
        prop_assert_eq!(stats.total_moves(), result.accepted_moves);
        prop_assert!(result.feasible);
    }

    #[test]
    fn prop_timetable_text_round_trip(
        (problem, period_of) in instance_strategy(),
    ) {
        let tt = Timetable::from_assignment(&problem, period_of).unwrap();
        let parsed = Timetable::parse(&problem, &tt.to_string()).unwrap();
        prop_assert_eq!(parsed.assignment(), tt.assignment());
        prop_assert_eq!(parsed.fitness().to_bits(), tt.fitness().to_bits());
    }
}
