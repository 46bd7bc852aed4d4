mod cli;
mod config;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use knxlights_core::{load_knxproj, HeuristicCharacteristics, KnxProjectAnalyzer};

use config::CliConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();
    let config = CliConfig::from_args(&args);
    if !config.has_knxproj_extension() {
        log::warn!("{} does not look like a .knxproj export", config.knxproj_path.display());
    }

    let project = load_knxproj(&config.knxproj_path, config.password.as_deref())
        .with_context(|| format!("Failed to load {}", config.knxproj_path.display()))?;
    let characteristics = HeuristicCharacteristics::new(config.naming_convention());
    let mut analyzer =
        KnxProjectAnalyzer::new(project, characteristics).with_config(config.analyzer_config());
    analyzer.analyze().context("Failed to analyze project")?;
    log::info!(
        "Analysis finished with {} data-quality warnings",
        analyzer.warnings()
    );

    let report = report::Report::new(analyzer.project(), analyzer.fixtures());
    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }
    Ok(())
}
