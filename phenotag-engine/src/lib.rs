//! The criteria engine: pluggable evidence rules over a document store.
//!
//! A run picks one feature kind (gene, marker, region or study) and a set
//! of criteria rules, scans each rule's source dataset page by page,
//! evaluates every record into a shared [`ResultContainer`], and flushes
//! the accumulated tags as scored records in bounded batches.
//!
//! ```no_run
//! use phenotag_core::FeatureKind;
//! use phenotag_engine::config::CriteriaConfig;
//! use phenotag_engine::engine::{CriteriaEngine, RunMode};
//! use phenotag_engine::linkage::NoLinkage;
//! use phenotag_store::HttpBackend;
//!
//! # fn main() -> Result<(), phenotag_engine::EngineError> {
//! let config = CriteriaConfig::default_config()?;
//! let backend = HttpBackend::new(&config.store.url);
//! let engine = CriteriaEngine::new(&backend, &NoLinkage, &config);
//! let report = engine.run(FeatureKind::Gene, &[], RunMode::Full)?;
//! for section in &report.sections {
//!     println!("{}: {} features tagged", section.section, section.features);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`ResultContainer`]: phenotag_core::ResultContainer

pub mod config;
pub mod engine;
pub mod errors;
pub mod linkage;
pub mod registry;
pub mod rules;

// re-exports
pub use config::{CriteriaConfig, RuleSection};
pub use engine::{CriteriaEngine, RunMode, RunReport, SectionReport};
pub use errors::EngineError;
pub use linkage::{CorrelatedMarker, HttpLinkage, LinkageService, NoLinkage};
pub use registry::{CriteriaRule, RuleContext, RuleOutcome, RuleRegistry};
