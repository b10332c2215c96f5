//! Lookup orchestrator: retrieve, resolve, persist, respond.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use crate::adapter::RetrievalAdapter;
use crate::fallback;
use crate::source::CourtSource;
use crate::store::RecordStore;
use crate::types::{
    CasePayload, CaseQuery, LookupError, LookupResult, PayloadOrigin, QueryRecord, RecordId,
};

/// What a lookup hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOutcome {
    pub payload: CasePayload,
    pub origin: PayloadOrigin,
    /// `None` when the query could not be persisted.
    pub record_id: Option<RecordId>,
}

/// Composes the retrieval adapter, fallback policy, and record store.
#[derive(Clone)]
pub struct LookupService {
    adapter: Arc<dyn RetrievalAdapter>,
    store: Arc<dyn RecordStore>,
    source: CourtSource,
}

impl LookupService {
    /// A service querying the high court.
    pub fn new(adapter: Arc<dyn RetrievalAdapter>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            adapter,
            store,
            source: CourtSource::HighCourt,
        }
    }

    /// Query a different source by default.
    pub fn with_source(mut self, source: CourtSource) -> Self {
        self.source = source;
        self
    }

    pub fn source(&self) -> &CourtSource {
        &self.source
    }

    /// Run one lookup. Never fails: retrieval problems resolve to placeholder
    /// data and a store failure only leaves `record_id` empty.
    pub async fn lookup(&self, query: &CaseQuery) -> LookupOutcome {
        let started = Instant::now();
        info!(
            "lookup {}/{}/{} via {}",
            query.case_type, query.case_number, query.filing_year, self.source
        );

        let outcome = self.adapter.fetch(query, &self.source).await;
        let resolved = fallback::resolve(outcome);

        let store = Arc::clone(&self.store);
        let (q, payload) = (query.clone(), resolved.payload.clone());
        let appended = tokio::task::spawn_blocking(move || store.append(&q, &payload)).await;
        let record_id = match appended {
            Ok(Ok(id)) => Some(id),
            Ok(Err(e)) => {
                error!("failed to record query: {e}");
                None
            }
            Err(e) => {
                error!("record task failed: {e}");
                None
            }
        };

        info!(
            "lookup finished in {}ms (origin={:?}, record={:?})",
            started.elapsed().as_millis(),
            resolved.origin,
            record_id
        );

        LookupOutcome {
            payload: resolved.payload,
            origin: resolved.origin,
            record_id,
        }
    }

    /// The most recent lookups, newest first.
    pub async fn history(&self, limit: usize) -> LookupResult<Vec<QueryRecord>> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.recent(limit))
            .await
            .map_err(|e| LookupError::StoreUnavailable(format!("history task failed: {e}")))?
    }
}
