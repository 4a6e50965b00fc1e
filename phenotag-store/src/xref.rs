use std::collections::BTreeMap;

use log::error;

use phenotag_core::GenomicSpan;

use crate::backend::{DatasetRef, StoreBackend};
use crate::document::Document;
use crate::errors::StoreError;
use crate::query::Query;

/// Where a collection keeps its interval coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub seqid_field: String,
    pub start_field: String,
    pub end_field: String,
}

impl FieldMapping {
    pub fn new(seqid_field: &str, start_field: &str, end_field: &str) -> Self {
        FieldMapping {
            seqid_field: seqid_field.to_string(),
            start_field: start_field.to_string(),
            end_field: end_field.to_string(),
        }
    }
}

/// The named reference collections the rules join against.
#[derive(Debug, Clone, PartialEq)]
pub struct XrefCollections {
    pub genes: DatasetRef,
    pub region_hits: DatasetRef,
    pub disease_loci: DatasetRef,
    pub studies: DatasetRef,
}

///
/// Stateless read-only resolver for secondary lookups: identifier fetches
/// and interval-overlap joins against the reference collections.
///
/// A lookup returning nothing is not an error; ids that do not resolve are
/// simply absent from the result. Only a transport/query failure
/// propagates, and it propagates fatally.
///
pub struct Xref<'a> {
    backend: &'a dyn StoreBackend,
    collections: XrefCollections,
}

impl<'a> Xref<'a> {
    pub fn new(backend: &'a dyn StoreBackend, collections: XrefCollections) -> Self {
        Xref {
            backend,
            collections,
        }
    }

    /// Batched identifier lookup; missing ids are absent from the map.
    pub fn by_id(
        &self,
        collection: &DatasetRef,
        ids: &[String],
        sources: &[&str],
    ) -> Result<BTreeMap<String, Document>, StoreError> {
        if ids.is_empty() {
            return Ok(BTreeMap::new());
        }
        let query = Query::Ids {
            ids: ids.to_vec(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        };
        let docs = self.backend.search(collection, &query, ids.len())?;
        Ok(docs.into_iter().map(|doc| (doc.id.clone(), doc)).collect())
    }

    /// Gene documents for a set of gene ids.
    pub fn genes_by_id(
        &self,
        ids: &[String],
        sources: &[&str],
    ) -> Result<BTreeMap<String, Document>, StoreError> {
        self.by_id(&self.collections.genes, ids, sources)
    }

    /// Study documents for a set of study ids.
    pub fn studies_by_id(&self, ids: &[String]) -> Result<BTreeMap<String, Document>, StoreError> {
        self.by_id(&self.collections.studies, ids, &[])
    }

    /// Region study-hit documents for a set of hit ids.
    pub fn region_hits_by_id(
        &self,
        ids: &[String],
    ) -> Result<BTreeMap<String, Document>, StoreError> {
        self.by_id(&self.collections.region_hits, ids, &[])
    }

    /// Genes whose flat coordinates overlap `span`.
    pub fn overlapping_genes(
        &self,
        span: &GenomicSpan,
        mapping: &FieldMapping,
    ) -> Result<Vec<Document>, StoreError> {
        let query = Query::RangeOverlap {
            seqid: span.seqid.clone(),
            start: span.start,
            end: span.end,
            seqid_field: mapping.seqid_field.clone(),
            start_field: mapping.start_field.clone(),
            end_field: mapping.end_field.clone(),
            sources: vec![],
        };
        self.backend.search(&self.collections.genes, &query, 0)
    }

    /// Region study hits whose nested `build_info` interval overlaps
    /// `span`, optionally restricted to one disease code.
    pub fn overlapping_regions(
        &self,
        span: &GenomicSpan,
        disease: Option<&str>,
    ) -> Result<Vec<Document>, StoreError> {
        let query = Query::NestedOverlap {
            path: "build_info".to_string(),
            build: span.build.clone(),
            seqid: span.seqid.clone(),
            start: span.start,
            end: span.end,
            disease: disease.map(str::to_string),
            sources: vec![],
        };
        self.backend.search(&self.collections.region_hits, &query, 0)
    }

    /// Resolve one disease-locus document. A miss where exactly one
    /// document was expected is logged and skipped, not fatal.
    pub fn disease_locus(&self, locus_id: &str) -> Result<Option<Document>, StoreError> {
        let query = Query::Ids {
            ids: vec![locus_id.to_string()],
            sources: vec![],
        };
        let mut docs = self
            .backend
            .search(&self.collections.disease_loci, &query, 1)?;
        match docs.len() {
            1 => Ok(Some(docs.remove(0))),
            _ => {
                error!("disease_locus doc not found for id {locus_id}");
                Ok(None)
            }
        }
    }
}
