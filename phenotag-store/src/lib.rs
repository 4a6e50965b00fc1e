//! Document-store surface for the phenotag pipeline.
//!
//! The criteria engine never talks to a concrete store; it issues the
//! abstract requests defined here — three query shapes, a paginated scan,
//! batched cross-reference lookups and bounded bulk writes — against the
//! [`StoreBackend`] trait. Two backends are provided: [`HttpBackend`] for a
//! real search cluster and [`MemoryBackend`], an in-process backend the
//! test suites and the CLI's bounded sample mode run against.

pub mod backend;
pub mod cursor;
pub mod document;
pub mod errors;
pub mod http;
pub mod memory;
pub mod query;
pub mod schema;
pub mod writer;
pub mod xref;

// re-exports
pub use backend::{DatasetRef, Page, StoreBackend};
pub use cursor::Scan;
pub use document::Document;
pub use errors::StoreError;
pub use http::HttpBackend;
pub use memory::{BulkCall, MemoryBackend};
pub use query::{Clause, Query};
pub use schema::SchemaProperties;
pub use writer::{BatchWriter, FlushStats};
pub use xref::{FieldMapping, Xref, XrefCollections};
