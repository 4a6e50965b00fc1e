//! Region-feature rules.

use phenotag_core::{Evidence, ResultContainer};
use phenotag_store::{Document, Query};

use crate::config::RuleSection;
use crate::errors::EngineError;
use crate::registry::{CriteriaRule, RuleContext, RuleOutcome};
use crate::rules::{curation_rejects, mhc_span};

///
/// Tags every region whose interval lies in the MHC locus with every
/// enabled disease. Region coordinates live in a nested sub-record, so
/// the scan uses the nested overlap query.
///
#[derive(Debug)]
pub struct RegionInMhc;

impl CriteriaRule for RegionInMhc {
    fn name(&self) -> &'static str {
        "region_in_mhc"
    }

    fn source_query(&self, section: &RuleSection) -> Result<Query, EngineError> {
        let mhc = mhc_span();
        Ok(Query::NestedOverlap {
            path: section
                .nested_path
                .clone()
                .unwrap_or_else(|| "build_info".to_string()),
            build: mhc.build,
            seqid: mhc.seqid,
            start: mhc.start,
            end: mhc.end,
            disease: None,
            sources: section.source_fields.clone(),
        })
    }

    fn evaluate(
        &self,
        doc: &Document,
        ctx: &RuleContext,
        out: &mut ResultContainer,
    ) -> Result<RuleOutcome, EngineError> {
        for disease in ctx.diseases.all() {
            out.merge(&doc.id, disease, Evidence::new(disease, disease));
        }
        Ok(RuleOutcome::Tagged)
    }
}

///
/// Tags a region with the diseases of its curated loci. A locus whose
/// hits are not all cleanly curated contributes nothing.
///
#[derive(Debug)]
pub struct RegionForDisease;

impl CriteriaRule for RegionForDisease {
    fn name(&self) -> &'static str {
        "region_for_disease"
    }

    fn evaluate(
        &self,
        doc: &Document,
        ctx: &RuleContext,
        out: &mut ResultContainer,
    ) -> Result<RuleOutcome, EngineError> {
        let loci = doc.str_list("disease_loci");
        if loci.is_empty() {
            return Ok(RuleOutcome::Skipped);
        }

        let region_id = doc.str_field("region_id").unwrap_or(&doc.id);
        let region_name = doc.str_field("region_name").unwrap_or(region_id);

        let mut outcome = RuleOutcome::Skipped;
        for locus_id in &loci {
            let Some(locus) = ctx.xref.disease_locus(locus_id)? else {
                continue;
            };
            let hit_ids = locus.str_list("hits");
            let hits = ctx.xref.region_hits_by_id(&hit_ids)?;
            if hits.values().any(curation_rejects) {
                continue;
            }

            let diseases: Vec<String> = hits
                .values()
                .filter_map(|hit| hit.str_field("disease"))
                .map(str::to_uppercase)
                .filter(|code| ctx.diseases.tier(code).is_some())
                .collect();
            if diseases.is_empty() {
                continue;
            }

            out.populate(
                region_id,
                region_name,
                None,
                &[region_id.to_string()],
                &diseases,
            );
            outcome = RuleOutcome::Tagged;
        }
        Ok(outcome)
    }
}
