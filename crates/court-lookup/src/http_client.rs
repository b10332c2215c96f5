//! Async HTTP client wrapping reqwest.
//!
//! Sends the browser-like header set court sites expect. One request per
//! call: no retry, no backoff.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};

use crate::types::{LookupError, LookupResult};

/// Default browser user-agent presented to court sites.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/131.0.0.0 Safari/537.36";

/// Response from a form submission.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Original requested URL.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

/// HTTP client shared by all sources of one adapter.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client with the given per-request timeout and user-agent.
    pub fn new(timeout: Duration, user_agent: &str) -> LookupResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| LookupError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POST url-encoded form fields.
    ///
    /// Non-2xx statuses are transport failures; the body is only read on success.
    pub async fn post_form(
        &self,
        url: &str,
        form_fields: &[(String, String)],
    ) -> LookupResult<HttpResponse> {
        let r = self
            .client
            .post(url)
            .timeout(self.timeout)
            .form(form_fields)
            .send()
            .await?;

        let status = r.status();
        if !status.is_success() {
            return Err(LookupError::Transport(format!(
                "{url} answered HTTP {}",
                status.as_u16()
            )));
        }

        let final_url = r.url().to_string();
        let body = r.text().await?;

        Ok(HttpResponse {
            url: url.to_string(),
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new(Duration::from_secs(30), DEFAULT_USER_AGENT).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }
}
