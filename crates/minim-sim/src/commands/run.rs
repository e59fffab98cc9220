use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use minim_core::{Characteristics, SubjectId, TrialConfiguration};
use minim_engine::{Allocation, RandomizationEngine};
use minim_report::{config_digest, registry_digest, BalanceTable};
use serde::Serialize;
use tracing::info;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML trial definition.
    #[arg(long)]
    pub config: PathBuf,
    /// CSV file with an `id` column and one column per minimisation variable.
    #[arg(long)]
    pub subjects: PathBuf,
    /// Output directory for allocation artefacts.
    #[arg(long)]
    pub out: PathBuf,
    /// Seed for the random source. Defaults to OS entropy.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct RunManifest {
    config_digest: String,
    registry_digest: String,
    balancing: &'static str,
    subjects: usize,
    arms: Vec<String>,
    arm_totals: Vec<usize>,
    seed: Option<u64>,
    seeded_from_first_subject: bool,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = TrialConfiguration::from_yaml_str(&fs::read_to_string(&args.config)?)?;
    let subjects = read_subjects(&args.subjects)?;
    let mut engine = match args.seed {
        Some(seed) => RandomizationEngine::seeded(config, seed),
        None => RandomizationEngine::new(config),
    };

    let mut allocations: Vec<Allocation> = Vec::with_capacity(subjects.len());
    for (id, characteristics) in subjects {
        allocations.push(engine.allocate(id, &characteristics)?);
    }
    info!(subjects = allocations.len(), "randomised subject file");

    let table = BalanceTable::from_registry(engine.config(), engine.registry());
    let manifest = RunManifest {
        config_digest: config_digest(engine.config())?,
        registry_digest: registry_digest(engine.registry())?,
        balancing: engine.config().balancing().label(),
        subjects: engine.subject_count(),
        arms: engine.config().arms().to_vec(),
        arm_totals: table.arm_totals().to_vec(),
        seed: args.seed,
        seeded_from_first_subject: engine.config().seed_from_first_subject_id(),
    };

    write_json(args.out.join("allocations.json"), &allocations)?;
    write_json(args.out.join("balance.json"), &table)?;
    write_json(args.out.join("manifest.json"), &manifest)?;
    Ok(())
}

fn read_subjects(path: &Path) -> Result<Vec<(SubjectId, Characteristics)>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let id_column = headers
        .iter()
        .position(|header| header == "id")
        .ok_or_else(|| format!("{} has no `id` column", path.display()))?;

    let mut subjects = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut id = None;
        let mut characteristics = Characteristics::new();
        for (column, (header, field)) in headers.iter().zip(record.iter()).enumerate() {
            if column == id_column {
                id = Some(parse_subject_id(field));
            } else {
                characteristics.insert(header.to_string(), field.to_string());
            }
        }
        let id = id.ok_or_else(|| format!("row {} is missing an id", subjects.len() + 1))?;
        subjects.push((id, characteristics));
    }
    Ok(subjects)
}

/// Canonical decimal ids (digits only, no leading zero) become numeric
/// identifiers; anything else, including `0042`, stays textual so that no
/// two distinct CSV ids map to the same subject.
fn parse_subject_id(raw: &str) -> SubjectId {
    let raw = raw.trim();
    let canonical = raw == "0" || !raw.starts_with('0');
    if canonical && !raw.is_empty() && raw.bytes().all(|byte| byte.is_ascii_digit()) {
        if let Ok(numeric) = raw.parse::<u64>() {
            return SubjectId::Numeric(numeric);
        }
    }
    SubjectId::from(raw)
}

fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
