use std::sync::Arc;

use minim_core::{
    characteristics, BalancingRule, Characteristics, TrialConfiguration, TrialDefinition,
    VariableDefinition,
};
use minim_engine::RandomizationEngine;
use minim_report::{config_digest, registry_digest, BalanceTable};

fn trial() -> Arc<TrialConfiguration> {
    let definition = TrialDefinition {
        variables: vec![
            VariableDefinition::new("sex", ["male", "female"]),
            VariableDefinition::new("age", ["<=50", ">50"]),
        ],
        arms: vec!["control".into(), "active".into()],
        minimisation_weight: 1.0,
        seed_from_first_subject_id: true,
        balancing: BalancingRule::MarginalImbalance,
    };
    Arc::new(TrialConfiguration::new(definition).unwrap())
}

fn subjects() -> Vec<Characteristics> {
    (0..60)
        .map(|i| {
            characteristics([
                ("sex", if i % 5 < 3 { "male" } else { "female" }),
                ("age", if i % 2 == 0 { "<=50" } else { ">50" }),
            ])
        })
        .collect()
}

fn randomised_engine(first_id: &str) -> RandomizationEngine {
    let mut engine = RandomizationEngine::new(trial());
    engine.randomise_subject(first_id, &subjects()[0]).unwrap();
    for (i, subject) in subjects().iter().enumerate().skip(1) {
        engine.randomise_subject(i, subject).unwrap();
    }
    engine
}

#[test]
fn table_rows_sum_to_arm_totals() {
    let engine = randomised_engine("first");
    let table = BalanceTable::from_registry(engine.config(), engine.registry());

    assert_eq!(table.arms(), ["control", "active"]);
    assert_eq!(table.arm_totals().iter().sum::<usize>(), 60);
    for balance in table.variables() {
        let mut per_arm = vec![0; 2];
        for row in &balance.rows {
            for (arm, count) in row.counts.iter().enumerate() {
                per_arm[arm] += count;
            }
        }
        assert_eq!(per_arm, table.arm_totals());
    }

    let manual = engine
        .registry()
        .iter()
        .filter(|r| r.characteristic("sex") == Some("female") && r.arm() == "active")
        .count();
    assert_eq!(table.count("sex", "female", "active"), Some(manual));
    assert_eq!(table.count("sex", "female", "placebo"), None);
    assert_eq!(table.variable("age").unwrap().rows[1].total(), 30);
}

#[test]
fn single_factor_minimisation_reports_spread_of_at_most_one() {
    let definition = TrialDefinition {
        variables: vec![VariableDefinition::new("site", ["north", "south", "east"])],
        minimisation_weight: 1.0,
        ..TrialDefinition::default()
    };
    let mut engine = RandomizationEngine::seeded(TrialConfiguration::new(definition).unwrap(), 4);
    for id in 0..300u64 {
        let site = ["north", "south", "east"][(id * id % 7 % 3) as usize];
        engine
            .randomise_subject(id, &characteristics([("site", site)]))
            .unwrap();
    }
    let table = BalanceTable::from_registry(engine.config(), engine.registry());
    assert!(table.max_imbalance() <= 1, "{table}");
    assert_eq!(table.variables()[0].rows.len(), 3);
}

#[test]
fn display_renders_header_and_indented_values() {
    let engine = randomised_engine("first");
    let rendered = BalanceTable::from_registry(engine.config(), engine.registry()).to_string();
    let lines: Vec<&str> = rendered.lines().collect();
    assert!(lines[0].starts_with("arm"));
    assert!(lines[0].contains("control") && lines[0].contains("active"));
    assert!(lines[1].starts_with("n "));
    assert_eq!(lines[2], "sex");
    assert!(lines[3].starts_with("  male"));
    assert_eq!(lines.len(), 2 + 3 + 3);
}

#[test]
fn reading_the_registry_is_idempotent() {
    let engine = randomised_engine("first");
    let a = BalanceTable::from_registry(engine.config(), engine.registry());
    let b = BalanceTable::from_registry(engine.config(), engine.registry());
    assert_eq!(a, b);
    assert_eq!(
        registry_digest(engine.registry()).unwrap(),
        registry_digest(engine.registry()).unwrap()
    );
}

#[test]
fn digests_track_first_subject_seed() {
    let a = randomised_engine("first");
    let b = randomised_engine("first");
    assert_eq!(
        registry_digest(a.registry()).unwrap(),
        registry_digest(b.registry()).unwrap()
    );
    assert_eq!(config_digest(a.config()).unwrap(), config_digest(b.config()).unwrap());

    let json = BalanceTable::from_registry(a.config(), a.registry())
        .to_json()
        .unwrap();
    assert!(json.contains("\"arm_totals\""));
}
