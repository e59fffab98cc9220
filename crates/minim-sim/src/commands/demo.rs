use std::error::Error;

use clap::Args;
use minim_core::{derive_substream_seed, TrialConfiguration};
use minim_engine::RandomizationEngine;
use minim_report::BalanceTable;
use tracing::info;

use super::RuleArg;
use crate::population::{trial_definition, Population, WORKED_EXAMPLE};

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Number of synthetic subjects to randomise.
    #[arg(long, default_value_t = 160)]
    pub subjects: u64,
    /// Master seed for the synthetic population.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Balancing rule applied to minimised allocations.
    #[arg(long, value_enum, default_value_t = RuleArg::MarginalImbalance)]
    pub rule: RuleArg,
}

pub fn run(args: &DemoArgs) -> Result<(), Box<dyn Error>> {
    let (summary, table) = simulate(args)?;
    println!("{summary}");
    println!();
    print!("{table}");
    Ok(())
}

fn simulate(args: &DemoArgs) -> Result<(String, BalanceTable), Box<dyn Error>> {
    let config = TrialConfiguration::new(trial_definition(WORKED_EXAMPLE, args.rule.into()))?;
    let mut population = Population::new(WORKED_EXAMPLE, args.seed)?;
    let mut engine = RandomizationEngine::seeded(config, derive_substream_seed(args.seed, 1));
    info!(
        subjects = args.subjects,
        seed = args.seed,
        rule = engine.strategy_name(),
        "running worked example"
    );

    for id in 0..args.subjects {
        let subject = population.next_subject();
        engine.randomise_subject(id, &subject)?;
    }

    let table = BalanceTable::from_registry(engine.config(), engine.registry());
    Ok((engine.to_string(), table))
}
