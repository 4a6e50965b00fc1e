use log::{debug, info};
use serde_json::{Map, Value, json};

use phenotag_core::{DiseaseRegistry, ResultContainer};

use crate::backend::{DatasetRef, StoreBackend};
use crate::errors::StoreError;

/// Documents per batched write.
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// What one flush did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushStats {
    pub docs: usize,
    pub batches: usize,
    pub skipped: usize,
}

///
/// Flushes a [`ResultContainer`] to a destination as size-bounded batches
/// of upsert actions.
///
/// Each container entry becomes one scored record: `qid`, the tiered
/// `score`, the `disease_tags` list, and the evidence lists keyed by
/// disease code. Batches already written stay written if a later batch
/// fails; there is no rollback across batches.
///
pub struct BatchWriter<'a> {
    backend: &'a dyn StoreBackend,
    destination: DatasetRef,
    rule: String,
    batch_size: usize,
}

impl<'a> BatchWriter<'a> {
    pub fn new(backend: &'a dyn StoreBackend, destination: DatasetRef, rule: &str) -> Self {
        BatchWriter {
            backend,
            destination,
            rule: rule.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn flush(
        &self,
        container: &ResultContainer,
        diseases: &DiseaseRegistry,
    ) -> Result<FlushStats, StoreError> {
        let mut stats = FlushStats::default();
        let mut body = String::new();
        let mut in_batch = 0usize;

        for (feature_id, tags) in container.iter() {
            if feature_id.is_empty() {
                stats.skipped += 1;
                continue;
            }

            let directive = json!({
                "index": {
                    "_index": self.destination.index,
                    "_type": self.rule,
                    "_id": feature_id
                }
            });
            let record = Self::scored_record(feature_id, tags, diseases)?;
            body.push_str(&directive.to_string());
            body.push('\n');
            body.push_str(&record.to_string());
            body.push('\n');

            in_batch += 1;
            stats.docs += 1;
            if in_batch == self.batch_size {
                debug!("flushing batch of {in_batch} to {}/{}", self.destination, self.rule);
                self.backend
                    .bulk_write(&self.destination, &self.rule, &body, in_batch)?;
                stats.batches += 1;
                body.clear();
                in_batch = 0;
            }
        }

        if in_batch > 0 {
            self.backend
                .bulk_write(&self.destination, &self.rule, &body, in_batch)?;
            stats.batches += 1;
        }

        info!(
            "{}/{}: wrote {} records in {} batches",
            self.destination, self.rule, stats.docs, stats.batches
        );
        Ok(stats)
    }

    fn scored_record(
        feature_id: &str,
        tags: &phenotag_core::DiseaseTagMap,
        diseases: &DiseaseRegistry,
    ) -> Result<Value, StoreError> {
        let disease_tags: Vec<&str> = tags.keys().map(String::as_str).collect();
        let score = diseases.score(disease_tags.iter().copied());

        let mut record = Map::new();
        for (disease, evidence) in tags {
            record.insert(disease.clone(), serde_json::to_value(evidence)?);
        }
        record.insert("qid".to_string(), json!(feature_id));
        record.insert("disease_tags".to_string(), json!(disease_tags));
        record.insert("score".to_string(), json!(score));
        Ok(Value::Object(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use phenotag_core::Evidence;

    use crate::memory::MemoryBackend;

    fn container_with(n: usize) -> ResultContainer {
        let mut container = ResultContainer::new();
        for i in 0..n {
            container.merge(
                &format!("ENSG{i:05}"),
                "T1D",
                Evidence::new("GDXHsS00004", "Barrett"),
            );
        }
        container
    }

    #[test]
    fn test_flush_batching_boundary() {
        let backend = MemoryBackend::new();
        let destination = DatasetRef::new("criteria_gene");
        let writer =
            BatchWriter::new(&backend, destination, "cand_gene_in_study").with_batch_size(50);

        // batch_size + 1 eligible features: exactly two calls, sizes 50 and 1
        let stats = writer
            .flush(&container_with(51), &DiseaseRegistry::default())
            .unwrap();
        assert_eq!(stats.docs, 51);
        assert_eq!(stats.batches, 2);

        let calls = backend.bulk_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].docs, 50);
        assert_eq!(calls[1].docs, 1);
    }

    #[test]
    fn test_scored_record_shape() {
        let backend = MemoryBackend::new();
        let destination = DatasetRef::new("criteria_gene");
        let writer = BatchWriter::new(&backend, destination, "gene_in_region");

        let mut container = ResultContainer::new();
        container.merge("ENSG00000250616", "IBD", Evidence::new("16p11.2_007", "16p11.2"));
        container.merge("ENSG00000250616", "MS", Evidence::new("16p11.2_007", "16p11.2"));
        writer.flush(&container, &DiseaseRegistry::default()).unwrap();

        let calls = backend.bulk_calls();
        assert_eq!(calls.len(), 1);
        let mut lines = calls[0].body.lines();
        let directive: Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert_eq!(directive["index"]["_id"], json!("ENSG00000250616"));
        assert_eq!(directive["index"]["_type"], json!("gene_in_region"));

        let record: Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert_eq!(record["qid"], json!("ENSG00000250616"));
        assert_eq!(record["disease_tags"], json!(["IBD", "MS"]));
        assert_eq!(record["score"], json!(15)); // IBD other + MS core
        assert_eq!(record["MS"][0]["fname"], json!("16p11.2"));
    }

    #[test]
    fn test_empty_container_writes_nothing() {
        let backend = MemoryBackend::new();
        let writer = BatchWriter::new(&backend, DatasetRef::new("criteria_gene"), "gene_in_mhc");
        let stats = writer
            .flush(&ResultContainer::new(), &DiseaseRegistry::default())
            .unwrap();
        assert_eq!(stats, FlushStats::default());
        assert!(backend.bulk_calls().is_empty());
    }
}
