use std::collections::BTreeMap;

use log::warn;

use crate::consts::RESERVED_KEYS;
use crate::models::evidence::{Evidence, EvidenceNotes};

/// Disease code -> accumulated evidence, in discovery order.
pub type DiseaseTagMap = BTreeMap<String, Vec<Evidence>>;

///
/// The per-run accumulator: feature id -> disease tags.
///
/// One container is created at the start of an engine run, threaded by
/// `&mut` through every rule evaluation, read once at flush time and then
/// discarded. Merging is idempotent (an equal Evidence under the same
/// disease is a no-op) and commutative, so the final container does not
/// depend on the order records were visited in.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultContainer {
    entries: BTreeMap<String, DiseaseTagMap>,
}

impl ResultContainer {
    pub fn new() -> Self {
        ResultContainer::default()
    }

    /// Number of features holding at least one tag.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, feature_id: &str) -> Option<&DiseaseTagMap> {
        self.entries.get(feature_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DiseaseTagMap)> {
        self.entries.iter()
    }

    /// Append `evidence` under `container[feature_id][disease]` unless an
    /// equal Evidence (by fid+fname) is already present.
    ///
    /// Empty feature ids and the reserved record keys are refused.
    pub fn merge(&mut self, feature_id: &str, disease: &str, evidence: Evidence) {
        if feature_id.is_empty() {
            return;
        }
        if RESERVED_KEYS.contains(&disease) {
            warn!("refusing reserved key '{disease}' as a disease code for {feature_id}");
            return;
        }

        let list = self
            .entries
            .entry(feature_id.to_string())
            .or_default()
            .entry(disease.to_string())
            .or_default();
        if !list.contains(&evidence) {
            list.push(evidence);
        }
    }

    /// Batch form used by most rules: one [`merge`](Self::merge) per
    /// (feature, disease) pair in the Cartesian product.
    pub fn populate(
        &mut self,
        fid: &str,
        fname: &str,
        fnotes: Option<EvidenceNotes>,
        features: &[String],
        diseases: &[String],
    ) {
        for feature in features {
            for disease in diseases {
                let evidence = match &fnotes {
                    Some(notes) => Evidence::with_notes(fid, fname, notes.clone()),
                    None => Evidence::new(fid, fname),
                };
                self.merge(feature, disease, evidence);
            }
        }
    }
}
