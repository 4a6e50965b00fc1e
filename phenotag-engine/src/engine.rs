//! The orchestrator: scan, evaluate, aggregate, flush.

use log::{debug, info};

use phenotag_core::{FeatureKind, ResultContainer};
use phenotag_store::{BatchWriter, FlushStats, Scan, SchemaProperties, StoreBackend, Xref};

use crate::config::CriteriaConfig;
use crate::errors::EngineError;
use crate::linkage::LinkageService;
use crate::registry::{CriteriaRule, RuleContext, RuleOutcome, RuleRegistry};

/// Tagged features beyond which a sample run stops scanning.
pub const SAMPLE_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Scan every record of every source dataset.
    Full,
    /// Stop each rule once more than [`SAMPLE_LIMIT`] features hold tags;
    /// used for smoke-testing a configuration.
    Sample,
}

/// What one rule's run did.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionReport {
    pub section: String,
    /// Records scanned and handed to the rule.
    pub records: usize,
    /// Records the rule rejected by precondition.
    pub skipped: usize,
    /// Features holding at least one tag at flush time.
    pub features: usize,
    pub flush: FlushStats,
}

/// The per-rule reports of one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub feature: FeatureKind,
    pub sections: Vec<SectionReport>,
}

///
/// Drives one feature kind's rules end to end: for each selected rule,
/// scan its source dataset(s), evaluate every record into a fresh
/// [`ResultContainer`], then ensure the destination schema and flush.
///
/// Rules run independently; a failure in one rule stops the run but the
/// batches already flushed by earlier rules stay written.
///
pub struct CriteriaEngine<'a> {
    backend: &'a dyn StoreBackend,
    linkage: &'a dyn LinkageService,
    config: &'a CriteriaConfig,
}

impl<'a> CriteriaEngine<'a> {
    pub fn new(
        backend: &'a dyn StoreBackend,
        linkage: &'a dyn LinkageService,
        config: &'a CriteriaConfig,
    ) -> Self {
        CriteriaEngine {
            backend,
            linkage,
            config,
        }
    }

    /// Run the requested rules for one feature kind. An empty `requested`
    /// selection runs every registered rule; unknown names fail before
    /// anything is scanned.
    pub fn run(
        &self,
        kind: FeatureKind,
        requested: &[String],
        mode: RunMode,
    ) -> Result<RunReport, EngineError> {
        let registry = RuleRegistry::for_feature(kind);
        let rules = registry.resolve(kind, requested)?;

        let mut report = RunReport {
            feature: kind,
            sections: Vec::with_capacity(rules.len()),
        };
        for rule in rules {
            let section = self
                .run_section(kind, rule, mode)
                .map_err(|err| err.in_section(rule.name()))?;
            report.sections.push(section);
        }
        Ok(report)
    }

    fn run_section(
        &self,
        kind: FeatureKind,
        rule: &dyn CriteriaRule,
        mode: RunMode,
    ) -> Result<SectionReport, EngineError> {
        let name = rule.name();
        let section = self
            .config
            .section(name)
            .ok_or_else(|| EngineError::UnknownCriteria {
                feature: kind.to_string(),
                name: name.to_string(),
            })?;
        if section.feature != kind.as_str() {
            return Err(EngineError::FeatureMismatch {
                section: name.to_string(),
                declared: section.feature.clone(),
                requested: kind.to_string(),
            });
        }

        let xref = Xref::new(self.backend, self.config.xref_collections());
        let ctx = RuleContext {
            xref: &xref,
            linkage: self.linkage,
            diseases: &self.config.diseases,
            section,
            section_name: name,
            rsq_threshold: self.config.linkage.rsq_threshold,
        };

        let query = rule.source_query(section)?;
        let mut container = ResultContainer::new();
        let mut records = 0usize;
        let mut skipped = 0usize;

        'sources: for dataset in section.source_refs() {
            info!("{name}: scanning {dataset}");
            let mut scan = Scan::new(self.backend, &dataset, query.clone());
            while let Some(page) = scan.next_page()? {
                debug!("{name}: page of {} from {dataset}", page.len());
                for doc in &page {
                    records += 1;
                    if rule.evaluate(doc, &ctx, &mut container)? == RuleOutcome::Skipped {
                        skipped += 1;
                    }
                    if mode == RunMode::Sample && container.len() > SAMPLE_LIMIT {
                        break 'sources;
                    }
                }
            }
        }

        let destination = self.config.destination(kind, name);
        let schema = SchemaProperties::for_criteria(&self.config.diseases, &section.desc);
        self.backend.ensure_schema(&destination, name, &schema)?;

        let features = container.len();
        let writer = BatchWriter::new(self.backend, destination, name);
        let flush = writer.flush(&container, &self.config.diseases)?;

        info!(
            "{name}: {records} records scanned, {skipped} skipped, {features} features tagged"
        );
        Ok(SectionReport {
            section: name.to_string(),
            records,
            skipped,
            features,
            flush,
        })
    }
}
