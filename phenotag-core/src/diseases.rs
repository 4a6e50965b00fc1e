//! Disease tiers and the tiered score.
//!
//! The set of enabled disease codes is supplied by configuration and is
//! immutable for the duration of a run. Core diseases weigh 10, other
//! diseases 5, unknown codes 0.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Classification of a disease code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiseaseTier {
    Core,
    Other,
}

impl DiseaseTier {
    pub fn weight(self) -> u32 {
        match self {
            DiseaseTier::Core => 10,
            DiseaseTier::Other => 5,
        }
    }
}

///
/// The enabled disease codes, split by tier.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRegistry {
    pub core: Vec<String>,
    pub other: Vec<String>,
}

impl Default for DiseaseRegistry {
    fn default() -> Self {
        let to_vec = |codes: &[&str]| codes.iter().map(|c| c.to_string()).collect();
        DiseaseRegistry {
            core: to_vec(&[
                "AS", "ATD", "CEL", "CRO", "JIA", "MS", "PBC", "PSO", "RA", "SLE", "T1D", "UC",
            ]),
            other: to_vec(&["AA", "IGE", "IBD", "NAR", "PSC", "SJO", "SSC", "VIT"]),
        }
    }
}

impl DiseaseRegistry {
    pub fn tier(&self, code: &str) -> Option<DiseaseTier> {
        if self.core.iter().any(|c| c == code) {
            Some(DiseaseTier::Core)
        } else if self.other.iter().any(|c| c == code) {
            Some(DiseaseTier::Other)
        } else {
            None
        }
    }

    /// All enabled codes, core tier first.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.core.iter().chain(self.other.iter()).map(String::as_str)
    }

    /// Tiered score of a disease-tag set: the sum of tier weights over the
    /// distinct codes. Order and repetition do not matter.
    pub fn score<'a>(&self, codes: impl IntoIterator<Item = &'a str>) -> u32 {
        let distinct: BTreeSet<&str> = codes.into_iter().collect();
        distinct
            .iter()
            .map(|code| self.tier(code).map_or(0, DiseaseTier::weight))
            .sum()
    }
}
