//! Core data model for disease-tag criteria indexing.
//!
//! This crate holds the pure parts of the [phenotag](https://github.com/d-i-l/phenotag)
//! pipeline: genomic spans and the inclusive overlap test, the evidence
//! accumulation container, and the tiered disease scorer. Nothing in here
//! performs I/O; the store and engine crates build on these types.
//!
//! ## Quick Start
//!
//! ```rust
//! use phenotag_core::{DiseaseRegistry, ResultContainer};
//!
//! let mut container = ResultContainer::new();
//! container.populate(
//!     "GDXHsS00004",
//!     "Barrett",
//!     None,
//!     &["ENSG00000110800".to_string()],
//!     &["T1D".to_string()],
//! );
//!
//! let diseases = DiseaseRegistry::default();
//! let entry = container.get("ENSG00000110800").unwrap();
//! let score = diseases.score(entry.keys().map(String::as_str));
//! assert_eq!(score, 10); // T1D is a core disease
//! ```

/// Disease tier classification and the tiered scorer.
pub mod diseases;

/// The four feature kinds a criteria rule can target.
pub mod feature;

/// Evidence, spans and the result container.
pub mod models;

/// Inclusive genomic interval overlap.
pub mod overlap;

// re-exports
pub use diseases::{DiseaseRegistry, DiseaseTier};
pub use feature::FeatureKind;
pub use models::{DiseaseTagMap, Evidence, EvidenceNotes, GenomicSpan, ResultContainer};
pub use overlap::{overlaps, overlaps_piecewise};

/// Constants used throughout the crate.
pub mod consts {
    /// Record keys attached at flush time; never valid as disease codes.
    pub const RESERVED_KEYS: [&str; 3] = ["score", "disease_tags", "qid"];
}
