//! The rule abstraction and the per-feature registry.

use phenotag_core::{DiseaseRegistry, FeatureKind, ResultContainer};
use phenotag_store::{Document, Query, Xref};

use crate::config::RuleSection;
use crate::errors::EngineError;
use crate::linkage::LinkageService;
use crate::rules;

/// What a rule decided about one scanned record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The record contributed at least a candidate tag (possibly deduped
    /// away inside the container).
    Tagged,
    /// The record was rejected by a precondition and contributed nothing.
    Skipped,
}

/// Everything a rule may consult while evaluating one record.
pub struct RuleContext<'a> {
    pub xref: &'a Xref<'a>,
    pub linkage: &'a dyn LinkageService,
    pub diseases: &'a DiseaseRegistry,
    pub section: &'a RuleSection,
    pub section_name: &'a str,
    pub rsq_threshold: f64,
}

///
/// One criteria rule: a source query selecting candidate records and a
/// per-record predicate that merges evidence into the shared container.
///
/// Rules only ever add to the container, so records may be replayed in
/// any order with the same result.
///
pub trait CriteriaRule: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// The scan query for this rule's source dataset. The default scans
    /// everything, projected to the section's `source_fields`.
    fn source_query(&self, section: &RuleSection) -> Result<Query, EngineError> {
        Ok(Query::MatchAll {
            sources: section.source_fields.clone(),
        })
    }

    fn evaluate(
        &self,
        doc: &Document,
        ctx: &RuleContext,
        out: &mut ResultContainer,
    ) -> Result<RuleOutcome, EngineError>;
}

///
/// The rules known for one feature kind.
///
pub struct RuleRegistry {
    rules: Vec<Box<dyn CriteriaRule>>,
}

impl RuleRegistry {
    pub fn for_feature(kind: FeatureKind) -> Self {
        let rules: Vec<Box<dyn CriteriaRule>> = match kind {
            FeatureKind::Gene => vec![
                Box::new(rules::gene::GeneInMhc),
                Box::new(rules::gene::GeneInRegion),
                Box::new(rules::gene::CandGeneInStudy),
                Box::new(rules::gene::CandGeneInRegion),
            ],
            FeatureKind::Marker => vec![
                Box::new(rules::marker::MarkerInMhc),
                Box::new(rules::marker::IsAnIndexSnp),
                Box::new(rules::marker::RsqWithIndexSnp),
                Box::new(rules::marker::MarkerIsGwasSignificant),
            ],
            FeatureKind::Region => vec![
                Box::new(rules::region::RegionInMhc),
                Box::new(rules::region::RegionForDisease),
            ],
            FeatureKind::Study => vec![Box::new(rules::study::StudyForDisease)],
        };
        RuleRegistry { rules }
    }

    /// Registered rule names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn CriteriaRule> {
        self.rules
            .iter()
            .find(|rule| rule.name() == name)
            .map(Box::as_ref)
    }

    /// Resolve a requested rule selection against this registry. An empty
    /// request selects every registered rule; any unknown name fails the
    /// whole request before anything runs.
    pub fn resolve(
        &self,
        kind: FeatureKind,
        requested: &[String],
    ) -> Result<Vec<&dyn CriteriaRule>, EngineError> {
        if requested.is_empty() {
            return Ok(self.rules.iter().map(Box::as_ref).collect());
        }
        requested
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| EngineError::UnknownCriteria {
                    feature: kind.to_string(),
                    name: name.clone(),
                })
            })
            .collect()
    }
}
