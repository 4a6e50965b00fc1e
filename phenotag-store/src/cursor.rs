use crate::backend::{DatasetRef, StoreBackend};
use crate::document::Document;
use crate::errors::StoreError;
use crate::query::Query;

/// Default documents per scan page.
pub const DEFAULT_PAGE_SIZE: usize = 500;

///
/// Continuation-based paginated scan over one source dataset.
///
/// Requests one page at a time from the backend, carrying the continuation
/// token between requests. The scan ends when the backend returns an empty
/// page or stops handing back a token.
///
/// ```no_run
/// # use phenotag_store::{DatasetRef, MemoryBackend, Query, Scan};
/// let backend = MemoryBackend::new();
/// let dataset = DatasetRef::with_type("studies", "study");
/// let mut scan = Scan::new(&backend, &dataset, Query::match_all());
/// while let Some(docs) = scan.next_page().unwrap() {
///     for doc in docs {
///         // dispatch the record
///     }
/// }
/// ```
pub struct Scan<'a> {
    backend: &'a dyn StoreBackend,
    dataset: &'a DatasetRef,
    query: Query,
    page_size: usize,
    token: Option<String>,
    started: bool,
    done: bool,
}

impl<'a> Scan<'a> {
    pub fn new(backend: &'a dyn StoreBackend, dataset: &'a DatasetRef, query: Query) -> Self {
        Scan {
            backend,
            dataset,
            query,
            page_size: DEFAULT_PAGE_SIZE,
            token: None,
            started: false,
            done: false,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetch the next page; `Ok(None)` once the scan is exhausted.
    pub fn next_page(&mut self) -> Result<Option<Vec<Document>>, StoreError> {
        if self.done {
            return Ok(None);
        }
        if self.started && self.token.is_none() {
            self.done = true;
            return Ok(None);
        }

        let page = self.backend.scroll(
            self.dataset,
            &self.query,
            self.page_size,
            self.token.as_deref(),
        )?;
        self.started = true;
        self.token = page.token;

        if page.docs.is_empty() {
            self.done = true;
            return Ok(None);
        }
        Ok(Some(page.docs))
    }
}

impl Iterator for Scan<'_> {
    type Item = Result<Vec<Document>, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_page().transpose()
    }
}
