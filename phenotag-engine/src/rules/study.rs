//! Study-feature rules.

use phenotag_core::ResultContainer;
use phenotag_store::Document;

use crate::errors::EngineError;
use crate::registry::{CriteriaRule, RuleContext, RuleOutcome};

///
/// Tags a study with each enabled disease it reports; the disease itself
/// is the evidence. Curation status is not consulted: a study under
/// review still counts for the diseases it names.
///
#[derive(Debug)]
pub struct StudyForDisease;

impl CriteriaRule for StudyForDisease {
    fn name(&self) -> &'static str {
        "study_for_disease"
    }

    fn evaluate(
        &self,
        doc: &Document,
        ctx: &RuleContext,
        out: &mut ResultContainer,
    ) -> Result<RuleOutcome, EngineError> {
        let study_id = doc.str_field("study_id").unwrap_or(&doc.id).to_string();
        let diseases: Vec<String> = doc
            .str_list("diseases")
            .iter()
            .map(|code| code.to_uppercase())
            .filter(|code| ctx.diseases.tier(code).is_some())
            .collect();
        if diseases.is_empty() {
            return Ok(RuleOutcome::Skipped);
        }

        for disease in &diseases {
            out.populate(
                disease,
                disease,
                None,
                std::slice::from_ref(&study_id),
                std::slice::from_ref(disease),
            );
        }
        Ok(RuleOutcome::Tagged)
    }
}
