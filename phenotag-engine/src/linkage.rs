//! Marker-correlation lookups.
//!
//! Correlation rules ask an external service which markers are in high
//! linkage disequilibrium with an index SNP within one study's cohort.

use log::debug;
use serde::Deserialize;

use crate::errors::EngineError;

/// One marker correlated with the queried index SNP.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CorrelatedMarker {
    pub marker: String,
    pub rsq: f64,
}

///
/// Source of marker-correlation answers.
///
/// An index SNP with no correlated markers above the cutoff is an empty
/// answer, not an error.
///
pub trait LinkageService {
    fn correlated(
        &self,
        index_marker: &str,
        study_id: &str,
        rsq_min: f64,
    ) -> Result<Vec<CorrelatedMarker>, EngineError>;
}

/// Linkage over HTTP against a correlation endpoint.
pub struct HttpLinkage {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpLinkage {
    pub fn new(base_url: &str) -> Self {
        HttpLinkage {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl LinkageService for HttpLinkage {
    fn correlated(
        &self,
        index_marker: &str,
        study_id: &str,
        rsq_min: f64,
    ) -> Result<Vec<CorrelatedMarker>, EngineError> {
        let url = format!("{}/rsq", self.base_url);
        debug!("GET {url} marker={index_marker} study={study_id} rsq>={rsq_min}");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("marker", index_marker),
                ("study", study_id),
                ("rsq", &rsq_min.to_string()),
            ])
            .send()
            .map_err(|err| EngineError::Linkage(err.to_string()))?;
        if !response.status().is_success() {
            return Err(EngineError::Linkage(format!(
                "correlation lookup for {index_marker}/{study_id} returned {}",
                response.status()
            )));
        }
        let markers: Vec<CorrelatedMarker> = response
            .json()
            .map_err(|err| EngineError::Linkage(err.to_string()))?;
        Ok(markers
            .into_iter()
            .filter(|m| m.rsq >= rsq_min)
            .collect())
    }
}

/// No correlation service configured; every lookup is empty.
pub struct NoLinkage;

impl LinkageService for NoLinkage {
    fn correlated(
        &self,
        _index_marker: &str,
        _study_id: &str,
        _rsq_min: f64,
    ) -> Result<Vec<CorrelatedMarker>, EngineError> {
        Ok(Vec::new())
    }
}
