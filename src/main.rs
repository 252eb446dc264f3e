// src/main.rs
use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use geodedupe_lib::{
    config::{settings::Settings, ConfigOverrides, DedupConfig},
    ingest::RawElement,
    pipeline::resolve_categories,
    utils::progress_bars::progress_config::ProgressConfig,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON object mapping each category to its raw elements
    #[arg(long)]
    input: PathBuf,

    /// Where to write the resolved entities (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// YAML settings with the metric frame and per-category overrides
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Only resolve these categories
    #[arg(long)]
    category: Vec<String>,

    /// Collapse whole proximity clusters without the name split
    #[arg(long)]
    no_semantic: bool,
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    match dotenv::dotenv() {
        Ok(path) => info!("Loaded environment variables from {}", path.display()),
        Err(_) => info!("No .env file found, using environment variables from system"),
    }

    let args = Args::parse();
    let start_time = Instant::now();

    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let overrides = ConfigOverrides::from_env().merge(ConfigOverrides {
        semantic_clustering: args.no_semantic.then_some(false),
        ..Default::default()
    });
    let base = DedupConfig::default();

    let inputs = read_inputs(&args)?;
    let total_elements: usize = inputs.iter().map(|(_, elements)| elements.len()).sum();
    info!(
        "Loaded {} elements in {} categories from {}",
        total_elements,
        inputs.len(),
        args.input.display()
    );

    let progress = ProgressConfig::from_env();
    let report = resolve_categories(&inputs, &settings, &base, &overrides, &progress);

    for (category, stats) in &report.stats {
        info!(
            "  {}: {} raw → {} entities ({} merged)",
            category, stats.input_records, stats.resolved_entities, stats.merged_records
        );
    }
    for failure in &report.failed {
        warn!("  {}: failed - {}", failure.category, failure.error);
    }

    let json = serde_json::to_string_pretty(&report.entities)
        .context("Failed to serialize resolved entities")?;
    match &args.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Wrote {} entities to {}", report.entities.len(), path.display());
        }
        None => println!("{}", json),
    }

    info!(
        "Run {} completed in {:.2?}: {} raw elements → {} entities",
        report.run_id,
        start_time.elapsed(),
        report.total_input_records(),
        report.entities.len()
    );

    if !report.failed.is_empty() && report.failed.len() == inputs.len() {
        bail!("Every category failed to resolve");
    }
    Ok(())
}

fn read_inputs(args: &Args) -> Result<Vec<(String, Vec<RawElement>)>> {
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input {}", args.input.display()))?;
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)
        .with_context(|| format!("Input {} is not a JSON object", args.input.display()))?;

    let mut inputs = Vec::with_capacity(object.len());
    for (category, value) in object {
        if !args.category.is_empty() && !args.category.contains(&category) {
            continue;
        }
        let elements: Vec<RawElement> = serde_json::from_value(value)
            .with_context(|| format!("Invalid elements for category '{}'", category))?;
        inputs.push((category, elements));
    }
    for wanted in &args.category {
        if !inputs.iter().any(|(category, _)| category == wanted) {
            warn!("Category '{}' not present in input", wanted);
        }
    }
    Ok(inputs)
}
