//! Core data types for case queries, payloads, and stored records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the record store on append.
pub type RecordId = i64;

/// One lookup request: which case, and when it was asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseQuery {
    pub case_type: String,
    pub case_number: String,
    pub filing_year: String,
    pub timestamp: DateTime<Utc>,
}

impl CaseQuery {
    /// Validate the three identifying fields and stamp the query with the current time.
    ///
    /// Fields are trimmed. All three must be non-empty and the filing year
    /// must be four ASCII digits.
    pub fn new(case_type: &str, case_number: &str, filing_year: &str) -> LookupResult<Self> {
        let case_type = required("case_type", case_type)?;
        let case_number = required("case_number", case_number)?;
        let filing_year = required("filing_year", filing_year)?;

        if filing_year.len() != 4 || !filing_year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LookupError::InvalidInput(format!(
                "filing_year must be a four-digit year, got '{filing_year}'"
            )));
        }

        Ok(Self {
            case_type,
            case_number,
            filing_year,
            timestamp: Utc::now(),
        })
    }

    /// The form fields sent to a court search endpoint.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("case_type".to_string(), self.case_type.clone()),
            ("case_number".to_string(), self.case_number.clone()),
            ("filing_year".to_string(), self.filing_year.clone()),
            ("submit".to_string(), "Search".to_string()),
        ]
    }
}

fn required(field: &str, value: &str) -> LookupResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LookupError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Petitioner and respondent names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parties {
    pub petitioner: Option<String>,
    pub respondent: Option<String>,
}

impl Parties {
    /// True when neither party was found.
    pub fn is_empty(&self) -> bool {
        self.petitioner.is_none() && self.respondent.is_none()
    }
}

/// A single order or judgment listed for a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseOrder {
    pub date: String,
    pub title: String,
    pub pdf_link: Option<String>,
}

/// Structured result of a case-status lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasePayload {
    pub parties: Parties,
    pub filing_date: Option<String>,
    pub next_hearing: Option<String>,
    pub case_status: String,
    pub orders: Vec<CaseOrder>,
}

/// Status reported when the page carries no status label.
pub const UNKNOWN_STATUS: &str = "Unknown";

impl Default for CasePayload {
    fn default() -> Self {
        Self {
            parties: Parties::default(),
            filing_date: None,
            next_hearing: None,
            case_status: UNKNOWN_STATUS.to_string(),
            orders: Vec::new(),
        }
    }
}

/// Whether a payload came from the court site or from the fallback policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadOrigin {
    Live,
    Placeholder,
}

/// A persisted query together with the payload that was returned for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: RecordId,
    pub query: CaseQuery,
    pub payload: CasePayload,
}

/// Errors that can occur while looking up a case.
#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    #[error("Unsupported court source: {0}")]
    UnsupportedSource(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("CAPTCHA encountered at {0}")]
    CaptchaEncountered(String),

    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for LookupError {
    fn from(e: rusqlite::Error) -> Self {
        LookupError::StoreUnavailable(e.to_string())
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Transport(format!("request timed out: {e}"))
        } else {
            LookupError::Transport(e.to_string())
        }
    }
}

/// Convenience result type.
pub type LookupResult<T> = Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_query_trims_fields() {
        let q = CaseQuery::new("  civil ", "123", " 2024").unwrap();
        assert_eq!(q.case_type, "civil");
        assert_eq!(q.case_number, "123");
        assert_eq!(q.filing_year, "2024");
    }

    #[test]
    fn test_case_query_rejects_missing_fields() {
        let err = CaseQuery::new("civil", "   ", "2024").unwrap_err();
        assert!(matches!(err, LookupError::InvalidInput(ref m) if m.contains("case_number")));
    }

    #[test]
    fn test_case_query_rejects_bad_year() {
        assert!(CaseQuery::new("civil", "123", "24").is_err());
        assert!(CaseQuery::new("civil", "123", "20x4").is_err());
    }

    #[test]
    fn test_form_fields_include_submit() {
        let q = CaseQuery::new("civil", "123", "2024").unwrap();
        let fields = q.form_fields();
        assert_eq!(fields.len(), 4);
        assert!(fields.contains(&("submit".to_string(), "Search".to_string())));
    }

    #[test]
    fn test_default_payload_is_unknown_and_empty() {
        let p = CasePayload::default();
        assert_eq!(p.case_status, "Unknown");
        assert!(p.parties.is_empty());
        assert!(p.orders.is_empty());
    }

    #[test]
    fn test_payload_serializes_absent_fields_as_null() {
        let json = serde_json::to_value(CasePayload::default()).unwrap();
        assert!(json["filing_date"].is_null());
        assert!(json["parties"]["petitioner"].is_null());
        assert_eq!(json["case_status"], "Unknown");
    }

    #[test]
    fn test_origin_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&PayloadOrigin::Placeholder).unwrap(),
            "\"placeholder\""
        );
    }
}
