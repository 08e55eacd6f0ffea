mod common;

use proptest::prelude::*;
use classpath::algorithm::{build_chains, flatten_chains, generate_plan};
use classpath::models::{Chain, Constraints, Season, Term};
use common::{assert_plan_invariants, CatalogBuilder, MAJOR, UNIVERSITY};

#[derive(Debug, Clone)]
struct GenCourse {
    units: f64,
    prereqs: Vec<usize>,
    seasons: Vec<Season>,
}

fn seasons() -> impl Strategy<Value = Vec<Season>> {
    proptest::sample::subsequence(Season::ROTATION.to_vec(), 0..=4)
}

fn courses(acyclic: bool) -> impl Strategy<Value = Vec<GenCourse>> {
    (1usize..9).prop_flat_map(move |n| {
        prop::collection::vec(
            (
                prop::sample::select(vec![3.0, 4.0, 4.5, 5.0, 6.0]),
                prop::collection::vec(0..n, 0..3),
                seasons(),
            ),
            n,
        )
        .prop_map(move |raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, (units, prereqs, seasons))| GenCourse {
                    units,
                    prereqs: prereqs.into_iter().filter(|&p| !acyclic || p < i).collect(),
                    seasons,
                })
                .collect()
        })
    })
}

fn constraints() -> impl Strategy<Value = Constraints> {
    let start: Term = "Fall 2024".parse().unwrap();
    let horizon: Vec<Term> = classpath::models::generate_term_sequence(start, 6);
    (
        prop::sample::select(vec![10.0, 12.0, 15.0, 18.0]),
        prop::sample::select(vec![0.0, 12.0]),
        1usize..7,
        prop::sample::subsequence(horizon, 0..3),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(move |(max, min, max_terms, avoid, finish_fastest, avoid_stat)| {
            let mut c = Constraints {
                start_term: start,
                max_units_per_term: max,
                min_units_per_term: min,
                max_terms,
                finish_fastest,
                ..Default::default()
            };
            c.avoid_terms.extend(avoid);
            if avoid_stat {
                c.avoid_courses.insert("STAT 10".to_string());
            }
            c
        })
}

fn code(i: usize) -> String {
    format!("C{}", i)
}

fn catalog(courses: &[GenCourse], stat_seasons: (Vec<Season>, Vec<Season>)) -> classpath::repository::InMemoryRepository {
    let mut builder = CatalogBuilder::new();
    for (i, c) in courses.iter().enumerate() {
        let prereqs: Vec<String> = c.prereqs.iter().map(|&p| code(p)).collect();
        let prereqs: Vec<&str> = prereqs.iter().map(String::as_str).collect();
        builder = builder.course(&code(i), c.units, &prereqs, &c.seasons);
    }
    builder
        .alternatives("t_stat", &[("STAT 10", 5.0, stat_seasons.0), ("STAT 10H", 5.0, stat_seasons.1)])
        .build()
}

fn assert_paths_acyclic(chain: &Chain, path: &mut Vec<String>) {
    assert!(!path.contains(&chain.course.code), "{} repeats on {:?}", chain.course.code, path);
    path.push(chain.course.code.clone());
    for child in &chain.prerequisites {
        assert!(child.level < chain.level, "levels must decrease towards the leaves");
        assert_paths_acyclic(child, path);
    }
    path.pop();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_plans_respect_constraints(
        courses in courses(true),
        stat in (seasons(), seasons()),
        c in constraints(),
    ) {
        let repo = catalog(&courses, stat);
        let forest = build_chains(UNIVERSITY, MAJOR, &repo).unwrap();
        let plan = generate_plan(&forest, &c);

        assert_plan_invariants(&plan, &c);

        let scheduled = plan.scheduled_codes();
        let has = |code: &str| scheduled.iter().any(|s| s == code);
        prop_assert!(!(has("STAT 10") && has("STAT 10H")), "both alternatives scheduled");

        // Every course is scheduled, reported, or replaced by a scheduled alternative.
        for node in flatten_chains(&forest.chains) {
            let reported = plan.unscheduled.iter().any(|u| u.code == node.code);
            let replaced = node.alternatives.iter().any(|a| has(a));
            prop_assert!(has(&node.code) || reported || replaced, "{} vanished", node.code);
        }
    }

    #[test]
    fn prop_chains_are_acyclic_even_with_cyclic_data(
        courses in courses(false),
        c in constraints(),
    ) {
        let repo = catalog(&courses, (vec![], vec![]));
        let forest = build_chains(UNIVERSITY, MAJOR, &repo).unwrap();

        for chain in &forest.chains {
            assert_paths_acyclic(chain, &mut Vec::new());
            prop_assert!(chain.depth() <= courses.len() + 2);
        }
        let flat = flatten_chains(&forest.chains);
        let mut codes: Vec<&str> = flat.iter().map(|n| n.code.as_str()).collect();
        let total = codes.len();
        codes.sort();
        codes.dedup();
        prop_assert_eq!(codes.len(), total);
        prop_assert_eq!(total, courses.len() + 2);

        let plan = generate_plan(&forest, &c);
        assert_plan_invariants(&plan, &c);
    }
}
