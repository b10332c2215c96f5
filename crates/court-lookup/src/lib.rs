//! Court case status lookup: live retrieval from court websites, placeholder
//! fallback, and an append-only query log.

pub mod adapter;
pub mod extract;
pub mod fallback;
pub mod http_client;
pub mod lookup;
pub mod source;
pub mod store;
pub mod types;

pub use adapter::{CourtScraper, RetrievalAdapter, ScraperConfig};
pub use extract::{CaseExtractor, FieldLabels, LabelTableExtractor};
pub use fallback::{placeholder_payload, resolve, Resolved};
pub use lookup::{LookupOutcome, LookupService};
pub use source::{CourtSource, Endpoints, SourceKind};
pub use store::{RecordStore, SqliteRecordStore};
pub use types::*;
