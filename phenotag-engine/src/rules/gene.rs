//! Gene-feature rules.

use phenotag_core::{Evidence, GenomicSpan, ResultContainer};
use phenotag_store::{Document, Query};

use crate::config::{self, RuleSection};
use crate::errors::EngineError;
use crate::registry::{CriteriaRule, RuleContext, RuleOutcome};
use crate::rules::{curation_rejects, first_author, mhc_span, range_query};

///
/// Tags every gene lying in the MHC locus with every enabled disease.
///
/// The membership test happens in the scan query; each scanned record is
/// by construction inside the locus.
///
#[derive(Debug)]
pub struct GeneInMhc;

impl CriteriaRule for GeneInMhc {
    fn name(&self) -> &'static str {
        "gene_in_mhc"
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
/// Tags every gene overlapping a curated disease region with the region's
/// diseases, the region itself being the evidence.
///
#[derive(Debug)]
pub struct GeneInRegion;

impl CriteriaRule for GeneInRegion {
    fn name(&self) -> &'static str {
        "gene_in_region"
    }

    fn evaluate(
        &self,
        doc: &Document,
        ctx: &RuleContext,
        out: &mut ResultContainer,
    ) -> Result<RuleOutcome, EngineError> {
        let path = ctx.section.nested_path.as_deref().unwrap_or("build_info");
        let Some(span) = doc.nested_span(path) else {
            return Ok(RuleOutcome::Skipped);
        };

        let diseases: Vec<String> = doc
            .sub("tags")
            .map(|tags| Document::new(&doc.id, tags.clone()).str_list("disease"))
            .unwrap_or_default()
            .iter()
            .map(|code| code.to_uppercase())
            .filter(|code| ctx.diseases.tier(code).is_some())
            .collect();
        if diseases.is_empty() {
            return Ok(RuleOutcome::Skipped);
        }

        let pad = ctx.section.region_pad.unwrap_or(0);
        let mapping = config::geometry(ctx.section_name, ctx.section)?;
        let genes: Vec<String> = ctx
            .xref
            .overlapping_genes(&span.padded(pad), &mapping)?
            .into_iter()
            .map(|gene| gene.id)
            .collect();
        if genes.is_empty() {
            return Ok(RuleOutcome::Skipped);
        }

        let region_name = doc.str_field("region_name").unwrap_or(&doc.id);
        out.populate(&doc.id, region_name, None, &genes, &diseases);
        Ok(RuleOutcome::Tagged)
    }
}

///
/// Tags each candidate gene named by a curated study with the study's
/// diseases; evidence is the study id and its first author.
///
#[derive(Debug)]
pub struct CandGeneInStudy;

impl CriteriaRule for CandGeneInStudy {
    fn name(&self) -> &'static str {
        "cand_gene_in_study"
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

        let genes = doc.str_list("genes");
        let diseases: Vec<String> = doc
            .str_list("diseases")
            .iter()
            .map(|code| code.to_uppercase())
            .filter(|code| ctx.diseases.tier(code).is_some())
            .collect();
        if genes.is_empty() || diseases.is_empty() {
            return Ok(RuleOutcome::Skipped);
        }

        let study_id = doc.str_field("study_id").unwrap_or(&doc.id).to_string();
        let author = first_author(doc).unwrap_or_else(|| study_id.clone());
        out.populate(&study_id, &author, None, &genes, &diseases);
        Ok(RuleOutcome::Tagged)
    }
}

///
/// Tags a study hit's candidate genes with the diseases of every curated
/// region the gene's own span overlaps.
///
#[derive(Debug)]
pub struct CandGeneInRegion;

impl CriteriaRule for CandGeneInRegion {
    fn name(&self) -> &'static str {
        "cand_gene_in_region"
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

        let candidates = doc.str_list("genes");
        if candidates.is_empty() {
            return Ok(RuleOutcome::Skipped);
        }

        let mapping = config::geometry(ctx.section_name, ctx.section)?;
        let build = ctx.section.build.as_deref().unwrap_or("38");
        let coord_fields = [
            mapping.seqid_field.as_str(),
            mapping.start_field.as_str(),
            mapping.end_field.as_str(),
        ];
        let gene_docs = ctx.xref.genes_by_id(&candidates, &coord_fields)?;

        let mut outcome = RuleOutcome::Skipped;
        for (gene_id, gene) in &gene_docs {
            let span = match (
                gene.string_or_number(&mapping.seqid_field),
                gene.u32_field(&mapping.start_field),
                gene.u32_field(&mapping.end_field),
            ) {
                (Some(seqid), Some(start), Some(end)) => {
                    GenomicSpan::new(build, &seqid, start, end)
                }
                _ => continue,
            };

            for hit in ctx.xref.overlapping_regions(&span, None)? {
                if curation_rejects(&hit) {
                    continue;
                }
                let Some(disease) = hit.str_field("disease").map(str::to_uppercase) else {
                    continue;
                };
                if ctx.diseases.tier(&disease).is_none() {
                    continue;
                }
                let Some(region_id) = hit.str_field("region_id") else {
                    continue;
                };
                let region_name = hit.str_field("region_name").unwrap_or(region_id);
                out.merge(gene_id, &disease, Evidence::new(region_id, region_name));
                outcome = RuleOutcome::Tagged;
            }
        }
        Ok(outcome)
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
    use crate::linkage::NoLinkage;

    #[fixture]
    fn config() -> CriteriaConfig {
        CriteriaConfig::default_config().unwrap()
    }

    fn backend() -> MemoryBackend {
        let mut backend = MemoryBackend::new();
        backend.seed(
            &DatasetRef::with_type("genes_hg38", "gene"),
            vec![
                Document::new(
                    "ENSG00000110800",
                    json!({"chromosome": "1", "start": 206767602, "stop": 206772494}),
                ),
                Document::new(
                    "ENSG00000134242",
                    json!({"chromosome": "1", "start": 113813811, "stop": 113871753}),
                ),
            ],
        );
        backend.seed(
            &DatasetRef::with_type("regions", "hits"),
            vec![Document::new(
                "hit_1",
                json!({
                    "disease": "T1D",
                    "status": "N",
                    "region_id": "1p36.12_008",
                    "region_name": "1p36.12",
                    "build_info": {"build": 38, "seqid": "1", "start": 206700000, "end": 206800000}
                }),
            )],
        );
        backend
    }

    fn run_rule(
        rule: &dyn CriteriaRule,
        section_name: &str,
        config: &CriteriaConfig,
        backend: &MemoryBackend,
        doc: &Document,
        out: &mut ResultContainer,
    ) -> RuleOutcome {
        let xref = Xref::new(backend, config.xref_collections());
        let diseases = DiseaseRegistry::default();
        let ctx = RuleContext {
            xref: &xref,
            linkage: &NoLinkage,
            diseases: &diseases,
            section: config.section(section_name).unwrap(),
            section_name,
            rsq_threshold: 0.8,
        };
        rule.evaluate(doc, &ctx, out).unwrap()
    }

    #[rstest]
    fn test_gene_in_mhc_tags_all_diseases(config: CriteriaConfig) {
        let backend = backend();
        let doc = Document::new("ENSG00000229281", json!({}));
        let mut out = ResultContainer::new();

        let outcome = run_rule(&GeneInMhc, "gene_in_mhc", &config, &backend, &doc, &mut out);
        assert_eq!(outcome, RuleOutcome::Tagged);

        let tags = out.get("ENSG00000229281").unwrap();
        assert_eq!(tags.len(), 20);
        assert_eq!(tags["T1D"], vec![Evidence::new("T1D", "T1D")]);
    }

    #[rstest]
    fn test_gene_in_mhc_source_query_is_range(config: CriteriaConfig) {
        let section = config.section("gene_in_mhc").unwrap();
        let query = GeneInMhc.source_query(section).unwrap();
        match query {
            Query::RangeOverlap { seqid, start, end, seqid_field, .. } => {
                assert_eq!(seqid, "6");
                assert_eq!(start, 25_000_000);
                assert_eq!(end, 35_000_000);
                assert_eq!(seqid_field, "chromosome");
            }
            other => panic!("expected a range query, got {other:?}"),
        }
    }

    #[rstest]
    fn test_gene_in_region_populates_overlapping_genes(config: CriteriaConfig) {
        let backend = backend();
        let region = Document::new(
            "1p36.12_008",
            json!({
                "region_name": "1p36.12",
                "tags": {"disease": ["t1d", "ms"]},
                "build_info": {"build": 38, "seqid": "1", "start": 206700000, "end": 206800000}
            }),
        );
        let mut out = ResultContainer::new();

        let outcome = run_rule(&GeneInRegion, "gene_in_region", &config, &backend, &region, &mut out);
        assert_eq!(outcome, RuleOutcome::Tagged);

        let tags = out.get("ENSG00000110800").unwrap();
        assert_eq!(
            tags["T1D"],
            vec![Evidence::new("1p36.12_008", "1p36.12")]
        );
        assert!(tags.contains_key("MS"));
        // the other gene is on a different part of chr1
        assert!(out.get("ENSG00000134242").is_none());
    }

    #[rstest]
    fn test_gene_in_region_skips_without_span(config: CriteriaConfig) {
        let backend = backend();
        let region = Document::new("broken", json!({"tags": {"disease": ["t1d"]}}));
        let mut out = ResultContainer::new();

        let outcome = run_rule(&GeneInRegion, "gene_in_region", &config, &backend, &region, &mut out);
        assert_eq!(outcome, RuleOutcome::Skipped);
        assert!(out.is_empty());
    }

    #[rstest]
    fn test_cand_gene_in_study(config: CriteriaConfig) {
        let backend = backend();
        let study = Document::new(
            "GDXHsS00004",
            json!({
                "study_id": "GDXHsS00004",
                "status": "N",
                "genes": ["ENSG00000110800"],
                "diseases": ["T1D"],
                "authors": [{"name": "Barrett", "initials": "JC"}]
            }),
        );
        let mut out = ResultContainer::new();

        let outcome = run_rule(&CandGeneInStudy, "cand_gene_in_study", &config, &backend, &study, &mut out);
        assert_eq!(outcome, RuleOutcome::Tagged);
        assert_eq!(
            out.get("ENSG00000110800").unwrap()["T1D"],
            vec![Evidence::new("GDXHsS00004", "Barrett JC")]
        );
    }

    #[rstest]
    #[case(json!({"status": "W", "genes": ["ENSG1"], "diseases": ["T1D"]}))] // curation status
    #[case(json!({"status": "N", "genes": [], "diseases": ["T1D"]}))] // no candidates
    #[case(json!({"status": "N", "genes": ["ENSG1"], "diseases": ["XYZ"]}))] // no enabled disease
    fn test_cand_gene_in_study_skips(config: CriteriaConfig, #[case] source: serde_json::Value) {
        let backend = backend();
        let study = Document::new("GDXHsS00009", source);
        let mut out = ResultContainer::new();

        let outcome = run_rule(&CandGeneInStudy, "cand_gene_in_study", &config, &backend, &study, &mut out);
        assert_eq!(outcome, RuleOutcome::Skipped);
        assert!(out.is_empty());
    }

    #[rstest]
    fn test_cand_gene_in_region(config: CriteriaConfig) {
        let backend = backend();
        let hit = Document::new(
            "hit_2",
            json!({
                "disease": "CRO",
                "status": "N",
                "genes": ["ENSG00000110800"]
            }),
        );
        let mut out = ResultContainer::new();

        let outcome = run_rule(&CandGeneInRegion, "cand_gene_in_region", &config, &backend, &hit, &mut out);
        assert_eq!(outcome, RuleOutcome::Tagged);

        // the candidate's own span overlaps hit_1's region, whose disease
        // is T1D
        let tags = out.get("ENSG00000110800").unwrap();
        assert_eq!(tags["T1D"], vec![Evidence::new("1p36.12_008", "1p36.12")]);
    }

    #[rstest]
    fn test_cand_gene_in_region_skips_unknown_gene(config: CriteriaConfig) {
        let backend = backend();
        let hit = Document::new(
            "hit_3",
            json!({"disease": "CRO", "status": "N", "genes": ["ENSG_NOPE"]}),
        );
        let mut out = ResultContainer::new();

        let outcome = run_rule(&CandGeneInRegion, "cand_gene_in_region", &config, &backend, &hit, &mut out);
        assert_eq!(outcome, RuleOutcome::Skipped);
        assert!(out.is_empty());
    }
}
