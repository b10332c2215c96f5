//! Retrieval adapter: fetch a court's search result page and extract a payload.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use scraper::Html;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::extract::{detect_captcha, CaseExtractor, LabelTableExtractor};
use crate::http_client::{HttpClient, DEFAULT_USER_AGENT};
use crate::source::{CourtSource, Endpoints, SourceKind};
use crate::types::{CasePayload, CaseQuery, LookupError, LookupResult};

/// Anything that can produce a payload for a query from a given source.
#[async_trait]
pub trait RetrievalAdapter: Send + Sync {
    /// Retrieve case details.
    ///
    /// Partial extraction is `Ok`. Transport failures and CAPTCHA pages are errors.
    async fn fetch(&self, query: &CaseQuery, source: &CourtSource) -> LookupResult<CasePayload>;
}

/// Settings for the live scraper.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Randomized wait before each request, in milliseconds.
    pub delay_ms: RangeInclusive<u64>,
    pub user_agent: String,
    pub endpoints: Endpoints,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            delay_ms: 1000..=3000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

/// Live adapter for the supported court websites.
pub struct CourtScraper {
    http: HttpClient,
    config: ScraperConfig,
    extractors: HashMap<SourceKind, Arc<dyn CaseExtractor>>,
}

impl CourtScraper {
    /// Build a scraper with the label-table strategy for every source kind.
    pub fn new(config: ScraperConfig) -> LookupResult<Self> {
        let http = HttpClient::new(config.timeout, &config.user_agent)?;
        Ok(Self::with_client(http, config))
    }

    /// Build a scraper around an existing HTTP client.
    pub fn with_client(http: HttpClient, config: ScraperConfig) -> Self {
        let label_table: Arc<dyn CaseExtractor> = Arc::new(LabelTableExtractor::default());
        let extractors = HashMap::from([
            (SourceKind::HighCourt, Arc::clone(&label_table)),
            (SourceKind::DistrictCourt, label_table),
        ]);
        Self {
            http,
            config,
            extractors,
        }
    }

    /// Replace the extraction strategy for one source kind.
    pub fn with_extractor(mut self, kind: SourceKind, extractor: Arc<dyn CaseExtractor>) -> Self {
        self.extractors.insert(kind, extractor);
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Resolve a source by name, then fetch.
    ///
    /// Unknown names fail with `UnsupportedSource` before any request is made.
    pub async fn fetch_by_name(&self, query: &CaseQuery, name: &str) -> LookupResult<CasePayload> {
        let source = name.parse::<CourtSource>().inspect_err(|e| error!("{e}"))?;
        self.fetch(query, &source).await
    }

    async fn politeness_delay(&self) {
        let (lo, hi) = (*self.config.delay_ms.start(), *self.config.delay_ms.end());
        if hi == 0 {
            return;
        }
        let ms = if lo >= hi {
            lo
        } else {
            rand::thread_rng().gen_range(lo..=hi)
        };
        debug!("waiting {ms}ms before request");
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Parse a result page: CAPTCHA check first, then strategy extraction.
    fn parse_page(&self, body: &str, base_url: &Url, source: &CourtSource) -> LookupResult<CasePayload> {
        let document = Html::parse_document(body);

        if detect_captcha(&document) {
            warn!("CAPTCHA detected on {source}; manual intervention may be required");
            return Err(LookupError::CaptchaEncountered(source.to_string()));
        }

        let extractor = self
            .extractors
            .get(&source.kind())
            .ok_or_else(|| LookupError::UnsupportedSource(source.to_string()))?;
        Ok(extractor.extract(&document, base_url))
    }
}

#[async_trait]
impl RetrievalAdapter for CourtScraper {
    async fn fetch(&self, query: &CaseQuery, source: &CourtSource) -> LookupResult<CasePayload> {
        let endpoints = &self.config.endpoints;
        let base_url = endpoints.base_url(source)?;
        let search_url = endpoints.search_url(source)?;

        self.politeness_delay().await;

        info!(
            "querying {source} for {}/{}/{}",
            query.case_type, query.case_number, query.filing_year
        );
        let resp = self
            .http
            .post_form(search_url.as_str(), &query.form_fields())
            .await
            .inspect_err(|e| error!("error scraping {source}: {e}"))?;
        debug!("{source} answered HTTP {} from {}", resp.status, resp.final_url);

        self.parse_page(&resp.body, &base_url, source)
    }
}
