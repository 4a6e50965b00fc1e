//! Marker-feature rules.

use phenotag_core::{Evidence, ResultContainer};
use phenotag_store::{Clause, Document, Query};

use crate::errors::EngineError;
use crate::registry::{CriteriaRule, RuleContext, RuleOutcome};
use crate::rules::{curation_rejects, first_author, mhc_span, range_query};

use crate::config::RuleSection;

/// Genome-wide significance cutoff; strictly below tags, at or above does
/// not.
const GWAS_P_THRESHOLD: f64 = 5e-8;

/// Index SNPs come from region hits below this curation tier.
const INDEX_SNP_TIER: i64 = 3;

///
/// Tags every marker lying in the MHC locus with every enabled disease.
///
#[derive(Debug)]
pub struct MarkerInMhc;

impl CriteriaRule for MarkerInMhc {
    fn name(&self) -> &'static str {
        "marker_in_mhc"
    }

    fn source_query(&self, section: &RuleSection) -> Result<Query, EngineError> {
        range_query(self.name(), section, &mhc_span())
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
/// Tags the index SNP of each low-tier region hit with the hit's disease;
/// the evidence is the hit's disease locus.
///
#[derive(Debug)]
pub struct IsAnIndexSnp;

impl CriteriaRule for IsAnIndexSnp {
    fn name(&self) -> &'static str {
        "is_an_index_snp"
    }

    fn source_query(&self, section: &RuleSection) -> Result<Query, EngineError> {
        Ok(Query::Filtered {
            must: vec![Clause::RangeLt {
                field: "tier".to_string(),
                value: INDEX_SNP_TIER,
            }],
            sources: section.source_fields.clone(),
        })
    }

    fn evaluate(
        &self,
        doc: &Document,
        ctx: &RuleContext,
        out: &mut ResultContainer,
    ) -> Result<RuleOutcome, EngineError> {
        if curation_rejects(doc) {
            return Ok(RuleOutcome::Skipped);
        }
        let (Some(marker), Some(disease), Some(locus_id)) = (
            doc.str_field("marker"),
            doc.str_field("disease").map(str::to_uppercase),
            doc.str_field("disease_locus"),
        ) else {
            return Ok(RuleOutcome::Skipped);
        };
        if ctx.diseases.tier(&disease).is_none() {
            return Ok(RuleOutcome::Skipped);
        }

        // the locus join can miss on stale curation data; logged, not fatal
        let Some(locus) = ctx.xref.disease_locus(locus_id)? else {
            return Ok(RuleOutcome::Skipped);
        };
        let Some(region_id) = locus.str_field("region_id") else {
            return Ok(RuleOutcome::Skipped);
        };
        let region_name = locus.str_field("region_name").unwrap_or(region_id);

        out.merge(marker, &disease, Evidence::new(region_id, region_name));
        Ok(RuleOutcome::Tagged)
    }
}

///
/// Tags every marker in high linkage disequilibrium with a region hit's
/// index SNP; the evidence records the index SNP and the r² link back to
/// the study.
///
#[derive(Debug)]
pub struct RsqWithIndexSnp;

impl CriteriaRule for RsqWithIndexSnp {
    fn name(&self) -> &'static str {
        "rsq_with_index_snp"
    }

    fn evaluate(
        &self,
        doc: &Document,
        ctx: &RuleContext,
        out: &mut ResultContainer,
    ) -> Result<RuleOutcome, EngineError> {
        if curation_rejects(doc) {
            return Ok(RuleOutcome::Skipped);
        }
        let (Some(marker), Some(disease), Some(study_id)) = (
            doc.str_field("marker"),
            doc.str_field("disease").map(str::to_uppercase),
            doc.str_field("dil_study_id"),
        ) else {
            return Ok(RuleOutcome::Skipped);
        };
        if ctx.diseases.tier(&disease).is_none() {
            return Ok(RuleOutcome::Skipped);
        }

        let studies = ctx.xref.studies_by_id(&[study_id.to_string()])?;
        let author = studies
            .get(study_id)
            .and_then(first_author)
            .unwrap_or_else(|| study_id.to_string());

        let correlated = ctx
            .linkage
            .correlated(marker, study_id, ctx.rsq_threshold)?;
        if correlated.is_empty() {
            return Ok(RuleOutcome::Skipped);
        }
        for cm in correlated {
            out.merge(
                &cm.marker,
                &disease,
                Evidence::linked(marker, marker, study_id, &author, "rsq", cm.rsq),
            );
        }
        Ok(RuleOutcome::Tagged)
    }
}

///
/// Tags a region hit's index SNP when the hit's best p-value reaches
/// genome-wide significance; the evidence links back to the study and
/// carries the p-value.
///
#[derive(Debug)]
pub struct MarkerIsGwasSignificant;

impl MarkerIsGwasSignificant {
    /// The p-value a hit is judged on: combined when present, then
    /// discovery, then replication.
    fn best_p_value(doc: &Document) -> Option<f64> {
        let pvals = Document::new(&doc.id, doc.sub("p_values")?.clone());
        ["combined", "discovery", "replication"]
            .iter()
            .find_map(|stage| pvals.f64_field(stage))
    }
}

impl CriteriaRule for MarkerIsGwasSignificant {
    fn name(&self) -> &'static str {
        "marker_is_gwas_significant"
    }

    fn evaluate(
        &self,
        doc: &Document,
        ctx: &RuleContext,
        out: &mut ResultContainer,
    ) -> Result<RuleOutcome, EngineError> {
        if curation_rejects(doc) {
            return Ok(RuleOutcome::Skipped);
        }
        let (Some(marker), Some(disease), Some(study_id)) = (
            doc.str_field("marker"),
            doc.str_field("disease").map(str::to_uppercase),
            doc.str_field("dil_study_id"),
        ) else {
            return Ok(RuleOutcome::Skipped);
        };
        if ctx.diseases.tier(&disease).is_none() {
            return Ok(RuleOutcome::Skipped);
        }

        let Some(p_value) = Self::best_p_value(doc) else {
            return Ok(RuleOutcome::Skipped);
        };
        if p_value >= GWAS_P_THRESHOLD {
            return Ok(RuleOutcome::Skipped);
        }

        let studies = ctx.xref.studies_by_id(&[study_id.to_string()])?;
        let author = studies
            .get(study_id)
            .and_then(first_author)
            .unwrap_or_else(|| study_id.to_string());

        out.merge(
            marker,
            &disease,
            Evidence::linked(study_id, &author, study_id, &author, "pval", p_value),
        );
        Ok(RuleOutcome::Tagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use phenotag_core::DiseaseRegistry;
    use phenotag_store::{DatasetRef, MemoryBackend, Xref};

    use crate::config::CriteriaConfig;
    use crate::linkage::testing::FixedLinkage;
    use crate::linkage::{LinkageService, NoLinkage};

    #[fixture]
    fn config() -> CriteriaConfig {
        CriteriaConfig::default_config().unwrap()
    }

    fn backend() -> MemoryBackend {
        let mut backend = MemoryBackend::new();
        backend.seed(
            &DatasetRef::with_type("regions", "disease_locus"),
            vec![Document::new(
                "SLE_X002",
                json!({"region_id": "Xq28_003", "region_name": "Xq28", "hits": ["hit_1"]}),
            )],
        );
        backend.seed(
            &DatasetRef::with_type("studies", "study"),
            vec![Document::new(
                "GDXHsS00021",
                json!({"study_id": "GDXHsS00021", "authors": [{"name": "Jostins", "initials": "L"}]}),
            )],
        );
        backend
    }

    fn run_rule(
        rule: &dyn CriteriaRule,
        section_name: &str,
        config: &CriteriaConfig,
        backend: &MemoryBackend,
        linkage: &dyn LinkageService,
        doc: &Document,
        out: &mut ResultContainer,
    ) -> RuleOutcome {
        let xref = Xref::new(backend, config.xref_collections());
        let diseases = DiseaseRegistry::default();
        let ctx = RuleContext {
            xref: &xref,
            linkage,
            diseases: &diseases,
            section: config.section(section_name).unwrap(),
            section_name,
            rsq_threshold: 0.8,
        };
        rule.evaluate(doc, &ctx, out).unwrap()
    }

    #[rstest]
    fn test_marker_in_mhc_source_query(config: CriteriaConfig) {
        let section = config.section("marker_in_mhc").unwrap();
        let query = MarkerInMhc.source_query(section).unwrap();
        match query {
            Query::RangeOverlap { seqid_field, start_field, end_field, .. } => {
                assert_eq!(seqid_field, "seqid");
                assert_eq!(start_field, "start");
                assert_eq!(end_field, "end");
            }
            other => panic!("expected a range query, got {other:?}"),
        }
    }

    #[rstest]
    fn test_is_an_index_snp(config: CriteriaConfig) {
        let backend = backend();
        let hit = Document::new(
            "hit_1",
            json!({
                "marker": "rs2269368",
                "disease": "SLE",
                "status": "N",
                "tier": 1,
                "disease_locus": "SLE_X002"
            }),
        );
        let mut out = ResultContainer::new();

        let outcome = run_rule(&IsAnIndexSnp, "is_an_index_snp", &config, &backend, &NoLinkage, &hit, &mut out);
        assert_eq!(outcome, RuleOutcome::Tagged);
        assert_eq!(
            out.get("rs2269368").unwrap()["SLE"],
            vec![Evidence::new("Xq28_003", "Xq28")]
        );
    }

    #[rstest]
    fn test_is_an_index_snp_locus_miss_skips(config: CriteriaConfig) {
        let backend = backend();
        let hit = Document::new(
            "hit_9",
            json!({
                "marker": "rs999",
                "disease": "SLE",
                "status": "N",
                "tier": 1,
                "disease_locus": "SLE_GONE"
            }),
        );
        let mut out = ResultContainer::new();

        let outcome = run_rule(&IsAnIndexSnp, "is_an_index_snp", &config, &backend, &NoLinkage, &hit, &mut out);
        assert_eq!(outcome, RuleOutcome::Skipped);
        assert!(out.is_empty());
    }

    #[rstest]
    fn test_is_an_index_snp_query_filters_tier(config: CriteriaConfig) {
        let section = config.section("is_an_index_snp").unwrap();
        let query = IsAnIndexSnp.source_query(section).unwrap();
        match query {
            Query::Filtered { must, .. } => {
                assert_eq!(must, vec![Clause::RangeLt { field: "tier".to_string(), value: 3 }]);
            }
            other => panic!("expected a filtered query, got {other:?}"),
        }
    }

    #[rstest]
    fn test_rsq_with_index_snp(config: CriteriaConfig) {
        let backend = backend();
        let linkage = FixedLinkage::default().with(
            "rs2476601",
            "GDXHsS00021",
            &[("rs6679677", 0.97), ("rs1217414", 0.55)],
        );
        let hit = Document::new(
            "hit_2",
            json!({
                "marker": "rs2476601",
                "disease": "CRO",
                "status": "N",
                "disease_locus": "CRO_1002",
                "dil_study_id": "GDXHsS00021"
            }),
        );
        let mut out = ResultContainer::new();

        let outcome = run_rule(&RsqWithIndexSnp, "rsq_with_index_snp", &config, &backend, &linkage, &hit, &mut out);
        assert_eq!(outcome, RuleOutcome::Tagged);

        // only the marker above the cutoff is tagged
        let tags = out.get("rs6679677").unwrap();
        let evidence = &tags["CRO"][0];
        assert_eq!(evidence.fid, "rs2476601");
        let notes = evidence.fnotes.as_ref().unwrap();
        assert_eq!(notes["linkid"], json!("GDXHsS00021"));
        assert_eq!(notes["linkname"], json!("Jostins L"));
        assert_eq!(notes["linkdata"], json!("rsq"));
        assert_eq!(notes["linkvalue"], json!(0.97));
        assert!(out.get("rs1217414").is_none());
    }

    #[rstest]
    fn test_rsq_with_no_correlated_markers_skips(config: CriteriaConfig) {
        let backend = backend();
        let hit = Document::new(
            "hit_2",
            json!({
                "marker": "rs2476601",
                "disease": "CRO",
                "status": "N",
                "disease_locus": "CRO_1002",
                "dil_study_id": "GDXHsS00021"
            }),
        );
        let mut out = ResultContainer::new();

        let outcome = run_rule(&RsqWithIndexSnp, "rsq_with_index_snp", &config, &backend, &NoLinkage, &hit, &mut out);
        assert_eq!(outcome, RuleOutcome::Skipped);
        assert!(out.is_empty());
    }

    #[rstest]
    #[case("0.00000000000000203", true)] // 2.03e-15, significant
    #[case("0.00203", false)]
    #[case("0.00000005", false)] // exactly the threshold
    fn test_gwas_significance_threshold(
        config: CriteriaConfig,
        #[case] p_value: &str,
        #[case] tagged: bool,
    ) {
        let backend = backend();
        let hit = Document::new(
            "hit_3",
            json!({
                "marker": "rs6679677",
                "disease": "T1D",
                "status": "N",
                "disease_locus": "T1D_1001",
                "dil_study_id": "GDXHsS00021",
                "p_values": {"combined": p_value}
            }),
        );
        let mut out = ResultContainer::new();

        let outcome = run_rule(
            &MarkerIsGwasSignificant,
            "marker_is_gwas_significant",
            &config,
            &backend,
            &NoLinkage,
            &hit,
            &mut out,
        );
        if tagged {
            assert_eq!(outcome, RuleOutcome::Tagged);
            let evidence = &out.get("rs6679677").unwrap()["T1D"][0];
            assert_eq!(evidence.fid, "GDXHsS00021");
            assert_eq!(evidence.fname, "Jostins L");
            let notes = evidence.fnotes.as_ref().unwrap();
            assert_eq!(notes["linkdata"], json!("pval"));
            assert_eq!(notes["linkvalue"], json!(2.03e-15));
        } else {
            assert_eq!(outcome, RuleOutcome::Skipped);
            assert!(out.is_empty());
        }
    }

    #[rstest]
    fn test_gwas_p_value_priority() {
        let doc = Document::new(
            "hit_4",
            json!({"p_values": {"discovery": "1e-9", "replication": "0.5", "combined": "1e-3"}}),
        );
        assert_eq!(MarkerIsGwasSignificant::best_p_value(&doc), Some(1e-3));

        let doc = Document::new(
            "hit_5",
            json!({"p_values": {"discovery": "1e-9", "replication": "0.5"}}),
        );
        assert_eq!(MarkerIsGwasSignificant::best_p_value(&doc), Some(1e-9));

        let doc = Document::new("hit_6", json!({"p_values": {}}));
        assert_eq!(MarkerIsGwasSignificant::best_p_value(&doc), None);

        let doc = Document::new("hit_7", json!({}));
        assert_eq!(MarkerIsGwasSignificant::best_p_value(&doc), None);
    }
}
