//! Run configuration: the store endpoint, disease tiers, destination
//! datasets, reference collections and the per-rule criteria sections.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use phenotag_core::{DiseaseRegistry, FeatureKind};
use phenotag_store::{DatasetRef, FieldMapping, XrefCollections};

use crate::errors::EngineError;

/// Configuration shipped with the crate; a full working setup against a
/// local cluster.
pub const DEFAULT_CONFIG: &str = include_str!("default_criteria.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Destinations {
    pub gene: String,
    pub marker: String,
    pub region: String,
    pub study: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Collections {
    pub gene: DatasetRef,
    pub region_hits: DatasetRef,
    pub disease_locus: DatasetRef,
    pub study: DatasetRef,
}

fn default_rsq_threshold() -> f64 {
    0.8
}

/// Endpoint and cutoff for the marker-correlation service.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkageSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_rsq_threshold")]
    pub rsq_threshold: f64,
}

impl Default for LinkageSettings {
    fn default() -> Self {
        LinkageSettings {
            url: String::new(),
            rsq_threshold: default_rsq_threshold(),
        }
    }
}

///
/// One `[criteria.<name>]` section: the rule's feature kind, the dataset
/// it scans and the knobs the rule reads at evaluation time.
///
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSection {
    pub feature: String,
    pub source: DatasetRef,
    #[serde(default)]
    pub source_fields: Vec<String>,
    #[serde(default)]
    pub seqid_field: Option<String>,
    #[serde(default)]
    pub start_field: Option<String>,
    #[serde(default)]
    pub end_field: Option<String>,
    #[serde(default)]
    pub nested_path: Option<String>,
    #[serde(default)]
    pub build: Option<String>,
    #[serde(default)]
    pub region_pad: Option<u32>,
    #[serde(default)]
    pub desc: String,
}

impl RuleSection {
    /// The dataset(s) this section scans. A comma-separated index value
    /// fans out into one reference per index, all sharing the doc type.
    pub fn source_refs(&self) -> Vec<DatasetRef> {
        self.source
            .index
            .split(',')
            .map(str::trim)
            .filter(|idx| !idx.is_empty())
            .map(|idx| DatasetRef {
                index: idx.to_string(),
                doc_type: self.source.doc_type.clone(),
            })
            .collect()
    }

    /// Declared feature kind of this section.
    pub fn feature_kind(&self) -> Result<FeatureKind, EngineError> {
        self.feature
            .parse()
            .map_err(|_| EngineError::UnsupportedFeature(self.feature.clone()))
    }
}

///
/// The full run configuration, parsed from TOML.
///
#[derive(Debug, Clone, Deserialize)]
pub struct CriteriaConfig {
    pub store: StoreSettings,
    #[serde(default)]
    pub diseases: DiseaseRegistry,
    pub destinations: Destinations,
    pub collections: Collections,
    #[serde(default)]
    pub linkage: LinkageSettings,
    pub criteria: BTreeMap<String, RuleSection>,
}

impl CriteriaConfig {
    pub fn from_str(raw: &str) -> Result<Self, EngineError> {
        let config: CriteriaConfig = toml::from_str(raw)?;
        for (name, section) in &config.criteria {
            section
                .feature_kind()
                .map_err(|err| err.in_section(name))?;
        }
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let raw = fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&raw)
    }

    pub fn default_config() -> Result<Self, EngineError> {
        Self::from_str(DEFAULT_CONFIG)
    }

    /// Section names declared for one feature kind, in stable name order.
    pub fn available_criteria(&self, kind: FeatureKind) -> Vec<&str> {
        self.criteria
            .iter()
            .filter(|(_, section)| section.feature == kind.as_str())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn section(&self, name: &str) -> Option<&RuleSection> {
        self.criteria.get(name)
    }

    /// The destination dataset for one feature kind. Each rule writes its
    /// records under its own doc type within the kind's index.
    pub fn destination(&self, kind: FeatureKind, rule: &str) -> DatasetRef {
        let index = match kind {
            FeatureKind::Gene => &self.destinations.gene,
            FeatureKind::Marker => &self.destinations.marker,
            FeatureKind::Region => &self.destinations.region,
            FeatureKind::Study => &self.destinations.study,
        };
        DatasetRef::with_type(index, rule)
    }

    /// The reference collections the rules join against.
    pub fn xref_collections(&self) -> XrefCollections {
        XrefCollections {
            genes: self.collections.gene.clone(),
            region_hits: self.collections.region_hits.clone(),
            disease_loci: self.collections.disease_locus.clone(),
            studies: self.collections.study.clone(),
        }
    }
}

/// The coordinate field names an interval rule needs from its section.
pub fn geometry(name: &str, section: &RuleSection) -> Result<FieldMapping, EngineError> {
    let require = |key: &str, value: &Option<String>| {
        value.clone().ok_or_else(|| EngineError::MissingConfigKey {
            section: name.to_string(),
            key: key.to_string(),
        })
    };
    Ok(FieldMapping {
        seqid_field: require("seqid_field", &section.seqid_field)?,
        start_field: require("start_field", &section.start_field)?,
        end_field: require("end_field", &section.end_field)?,
    })
}
