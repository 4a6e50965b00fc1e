pub mod container;
pub mod evidence;
pub mod span;

pub use container::{DiseaseTagMap, ResultContainer};
pub use evidence::{Evidence, EvidenceNotes};
pub use span::GenomicSpan;
