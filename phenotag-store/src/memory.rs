//! In-process backend for tests and bounded sample runs.
//!
//! Evaluates the [`Query`] shapes directly against seeded documents and
//! records every ensured schema and bulk write so suites can assert on
//! them. Projection (`sources`) is not applied; seeded documents come back
//! whole.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::Value;

use phenotag_core::overlap::ranges_intersect;

use crate::backend::{DatasetRef, Page, StoreBackend};
use crate::document::Document;
use crate::errors::StoreError;
use crate::query::{Clause, Query};
use crate::schema::SchemaProperties;

/// One recorded bulk write.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkCall {
    pub destination: String,
    pub rule: String,
    pub docs: usize,
    pub body: String,
}

#[derive(Default)]
pub struct MemoryBackend {
    datasets: BTreeMap<String, Vec<Document>>,
    schemas: Mutex<BTreeMap<String, SchemaProperties>>,
    written: Mutex<Vec<BulkCall>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    pub fn seed(&mut self, dataset: &DatasetRef, docs: Vec<Document>) {
        self.datasets
            .entry(dataset.to_string())
            .or_default()
            .extend(docs);
    }

    /// Seed several datasets from a JSON object mapping `index` or
    /// `index/type` keys to arrays of `{id, source}` documents.
    pub fn seed_json(&mut self, fixtures: &str) -> Result<(), StoreError> {
        let parsed: BTreeMap<String, Vec<Document>> = serde_json::from_str(fixtures)?;
        for (key, docs) in parsed {
            self.seed(&DatasetRef::parse(&key), docs);
        }
        Ok(())
    }

    pub fn bulk_calls(&self) -> Vec<BulkCall> {
        self.written.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn schema_for(&self, destination: &DatasetRef, rule: &str) -> Option<SchemaProperties> {
        self.schemas
            .lock()
            .ok()
            .and_then(|s| s.get(&format!("{destination}/{rule}")).cloned())
    }

    fn docs_for(&self, dataset: &DatasetRef) -> Vec<&Document> {
        // a typed ref also matches documents seeded under the bare index
        let full = dataset.to_string();
        let mut out = Vec::new();
        for (key, docs) in &self.datasets {
            if key == &full || key == &dataset.index {
                out.extend(docs.iter());
            }
        }
        out
    }

    fn matches(doc: &Document, query: &Query) -> bool {
        match query {
            Query::MatchAll { .. } => true,

            Query::Ids { ids, .. } => ids.iter().any(|id| id == &doc.id),

            Query::Filtered { must, .. } => must.iter().all(|clause| match clause {
                Clause::Term { field, value } => doc
                    .string_or_number(field)
                    .is_some_and(|v| v.eq_ignore_ascii_case(value)),
                Clause::RangeLt { field, value } => {
                    doc.i64_field(field).is_some_and(|v| v < *value)
                }
            }),

            Query::RangeOverlap {
                seqid,
                start,
                end,
                seqid_field,
                start_field,
                end_field,
                ..
            } => {
                let doc_seqid = doc.string_or_number(seqid_field);
                let doc_start = doc.u32_field(start_field);
                let doc_end = doc.u32_field(end_field);
                match (doc_seqid, doc_start, doc_end) {
                    (Some(sq), Some(s), Some(e)) => {
                        sq == *seqid && ranges_intersect(s, e, *start, *end)
                    }
                    _ => false,
                }
            }

            Query::NestedOverlap {
                path,
                build,
                seqid,
                start,
                end,
                disease,
                ..
            } => {
                if let Some(code) = disease {
                    let matches_disease = doc
                        .str_field("disease")
                        .is_some_and(|d| d.eq_ignore_ascii_case(code));
                    if !matches_disease {
                        return false;
                    }
                }
                Self::nested_values(doc, path).any(|nested| {
                    let sub = Document::new(&doc.id, nested.clone());
                    sub.string_or_number("build").as_deref() == Some(build.as_str())
                        && sub.string_or_number("seqid").as_deref() == Some(seqid.as_str())
                        && match (sub.u32_field("start"), sub.u32_field("end")) {
                            (Some(s), Some(e)) => ranges_intersect(s, e, *start, *end),
                            _ => false,
                        }
                })
            }
        }
    }

    fn nested_values<'d>(doc: &'d Document, path: &str) -> impl Iterator<Item = &'d Value> {
        match doc.field(path) {
            Some(Value::Array(items)) => items.iter().collect::<Vec<_>>().into_iter(),
            Some(value @ Value::Object(_)) => vec![value].into_iter(),
            _ => vec![].into_iter(),
        }
    }
}

impl StoreBackend for MemoryBackend {
    fn search(
        &self,
        dataset: &DatasetRef,
        query: &Query,
        size: usize,
    ) -> Result<Vec<Document>, StoreError> {
        let mut hits: Vec<Document> = self
            .docs_for(dataset)
            .into_iter()
            .filter(|doc| Self::matches(doc, query))
            .cloned()
            .collect();
        if size > 0 {
            hits.truncate(size);
        }
        Ok(hits)
    }

    fn scroll(
        &self,
        dataset: &DatasetRef,
        query: &Query,
        page_size: usize,
        token: Option<&str>,
    ) -> Result<Page, StoreError> {
        let offset: usize = match token {
            Some(t) => t
                .parse()
                .map_err(|_| StoreError::MalformedResponse(format!("bad scroll token: {t}")))?,
            None => 0,
        };
        let hits: Vec<Document> = self
            .docs_for(dataset)
            .into_iter()
            .filter(|doc| Self::matches(doc, query))
            .cloned()
            .collect();

        let docs: Vec<Document> = hits.iter().skip(offset).take(page_size).cloned().collect();
        let next = offset + docs.len();
        let token = if next < hits.len() {
            Some(next.to_string())
        } else {
            None
        };
        Ok(Page { docs, token })
    }

    fn ensure_schema(
        &self,
        destination: &DatasetRef,
        rule: &str,
        schema: &SchemaProperties,
    ) -> Result<(), StoreError> {
        if let Ok(mut schemas) = self.schemas.lock() {
            schemas.insert(format!("{destination}/{rule}"), schema.clone());
        }
        Ok(())
    }

    fn bulk_write(
        &self,
        destination: &DatasetRef,
        rule: &str,
        body: &str,
        docs: usize,
    ) -> Result<(), StoreError> {
        if let Ok(mut written) = self.written.lock() {
            written.push(BulkCall {
                destination: destination.to_string(),
                rule: rule.to_string(),
                docs,
                body: body.to_string(),
            });
        }
        Ok(())
    }
}
