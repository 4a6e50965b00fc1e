//! The criteria rules, grouped by the feature kind they tag.

pub mod gene;
pub mod marker;
pub mod region;
pub mod study;

use phenotag_core::GenomicSpan;
use phenotag_store::{Document, Query};

use crate::config::{self, RuleSection};
use crate::errors::EngineError;

/// The MHC locus on build 38; features inside it are tagged for every
/// enabled disease.
pub fn mhc_span() -> GenomicSpan {
    GenomicSpan::new("38", "6", 25_000_000, 35_000_000)
}

/// Curation preconditions shared by the region study-hit rules: a record
/// is rejected when its status is anything but `N` or its disease locus
/// is still to-be-confirmed. A record without the field passes.
pub(crate) fn curation_rejects(doc: &Document) -> bool {
    if doc.str_field("status").is_some_and(|s| s != "N") {
        return true;
    }
    doc.str_field("disease_locus")
        .is_some_and(|locus| locus.eq_ignore_ascii_case("tbc"))
}

/// Flat range-overlap scan query over a section's coordinate fields.
pub(crate) fn range_query(
    name: &str,
    section: &RuleSection,
    span: &GenomicSpan,
) -> Result<Query, EngineError> {
    let mapping = config::geometry(name, section)?;
    Ok(Query::RangeOverlap {
        seqid: span.seqid.clone(),
        start: span.start,
        end: span.end,
        seqid_field: mapping.seqid_field,
        start_field: mapping.start_field,
        end_field: mapping.end_field,
        sources: section.source_fields.clone(),
    })
}

/// First author of a study document, as "name initials".
pub(crate) fn first_author(study: &Document) -> Option<String> {
    let authors = study.field("authors")?.as_array()?;
    let first = authors.first()?;
    let name = first.get("name").and_then(|v| v.as_str())?;
    match first.get("initials").and_then(|v| v.as_str()) {
        Some(initials) if !initials.is_empty() => Some(format!("{name} {initials}")),
        _ => Some(name.to_string()),
    }
}
