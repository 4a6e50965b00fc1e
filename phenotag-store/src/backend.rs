use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::errors::StoreError;
use crate::query::Query;
use crate::schema::SchemaProperties;

///
/// A named dataset in the store: an index plus an optional record type.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetRef {
    pub index: String,
    #[serde(default)]
    pub doc_type: Option<String>,
}

impl DatasetRef {
    pub fn new(index: &str) -> Self {
        DatasetRef {
            index: index.to_string(),
            doc_type: None,
        }
    }

    pub fn with_type(index: &str, doc_type: &str) -> Self {
        DatasetRef {
            index: index.to_string(),
            doc_type: Some(doc_type.to_string()),
        }
    }

    /// Parse an `index` or `index/type` reference.
    pub fn parse(s: &str) -> Self {
        match s.split_once('/') {
            Some((index, doc_type)) => DatasetRef::with_type(index, doc_type),
            None => DatasetRef::new(s),
        }
    }
}

impl Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.doc_type {
            Some(doc_type) => write!(f, "{}/{}", self.index, doc_type),
            None => write!(f, "{}", self.index),
        }
    }
}

/// One page of scan results plus the continuation token for the next.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub docs: Vec<Document>,
    pub token: Option<String>,
}

///
/// The abstract store surface the criteria engine runs against.
///
/// A transport or query failure is fatal to the caller; a zero-result
/// lookup is not an error. No implementation retries.
///
pub trait StoreBackend {
    /// One-shot search returning at most `size` documents; `size` 0 asks
    /// for everything the backend will hand over in one response.
    fn search(
        &self,
        dataset: &DatasetRef,
        query: &Query,
        size: usize,
    ) -> Result<Vec<Document>, StoreError>;

    /// Continuation-based pagination: pass `None` to open a scan, then the
    /// token from the previous [`Page`] until it comes back `None`.
    fn scroll(
        &self,
        dataset: &DatasetRef,
        query: &Query,
        page_size: usize,
        token: Option<&str>,
    ) -> Result<Page, StoreError>;

    /// Idempotently create the destination schema for one rule.
    fn ensure_schema(
        &self,
        destination: &DatasetRef,
        rule: &str,
        schema: &SchemaProperties,
    ) -> Result<(), StoreError>;

    /// Write one batch: `body` is a newline-delimited sequence of
    /// (write-directive, document) pairs covering `docs` documents.
    fn bulk_write(
        &self,
        destination: &DatasetRef,
        rule: &str,
        body: &str,
        docs: usize,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_dataset_ref_parse() {
        assert_eq!(DatasetRef::parse("genes_hg38"), DatasetRef::new("genes_hg38"));
        assert_eq!(
            DatasetRef::parse("regions/hits"),
            DatasetRef::with_type("regions", "hits")
        );
        assert_eq!(DatasetRef::parse("regions/hits").to_string(), "regions/hits");
    }
}
