use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use log::info;

use phenotag_core::FeatureKind;
use phenotag_engine::config::CriteriaConfig;
use phenotag_engine::engine::{CriteriaEngine, RunMode, RunReport};
use phenotag_engine::linkage::{HttpLinkage, LinkageService, NoLinkage};
use phenotag_store::{HttpBackend, MemoryBackend, StoreBackend};

pub fn run_tag(matches: &ArgMatches) -> Result<()> {
    // get arguments from CLI
    let feature = matches
        .get_one::<String>("feature")
        .expect("A feature kind is required.");
    let kind: FeatureKind = feature.parse().map_err(|err: String| anyhow!(err))?;

    let config = match matches.get_one::<String>("config") {
        Some(path) => CriteriaConfig::from_path(Path::new(path))?,
        None => CriteriaConfig::default_config()?,
    };

    if matches.get_flag("show") {
        for name in config.available_criteria(kind) {
            println!("{name}");
        }
        return Ok(());
    }

    let requested: Vec<String> = matches
        .get_one::<String>("criteria")
        .map(|names| {
            names
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let report = if matches.get_flag("test") {
        let mut backend = MemoryBackend::new();
        if let Some(path) = matches.get_one::<String>("fixtures") {
            let fixtures = fs::read_to_string(path)
                .with_context(|| format!("could not read fixture file {path}"))?;
            backend.seed_json(&fixtures)?;
        }
        run(&backend, &NoLinkage, &config, kind, &requested, RunMode::Sample)?
    } else {
        let backend = HttpBackend::new(&config.store.url);
        if config.linkage.url.is_empty() {
            run(&backend, &NoLinkage, &config, kind, &requested, RunMode::Full)?
        } else {
            let linkage = HttpLinkage::new(&config.linkage.url);
            run(&backend, &linkage, &config, kind, &requested, RunMode::Full)?
        }
    };

    for section in &report.sections {
        info!(
            "{}: {} records, {} skipped, {} features, {} batches",
            section.section,
            section.records,
            section.skipped,
            section.features,
            section.flush.batches
        );
        println!(
            "{}\t{} features tagged\t{} records written",
            section.section, section.features, section.flush.docs
        );
    }
    Ok(())
}

fn run(
    backend: &dyn StoreBackend,
    linkage: &dyn LinkageService,
    config: &CriteriaConfig,
    kind: FeatureKind,
    requested: &[String],
    mode: RunMode,
) -> Result<RunReport> {
    let engine = CriteriaEngine::new(backend, linkage, config);
    Ok(engine.run(kind, requested, mode)?)
}
