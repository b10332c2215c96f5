//! Fallback policy: keep a usable live result, otherwise substitute placeholder data.
//!
//! A result is usable when retrieval succeeded and at least one party was
//! found. Nothing else (dates, status, orders) is validated.

use tracing::warn;

use crate::types::{CaseOrder, CasePayload, LookupResult, Parties, PayloadOrigin};

/// The payload chosen for a lookup, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub payload: CasePayload,
    pub origin: PayloadOrigin,
}

/// True when a live result can be returned as-is.
pub fn is_usable(payload: &CasePayload) -> bool {
    !payload.parties.is_empty()
}

/// Pick the payload to return for an adapter outcome.
pub fn resolve(outcome: LookupResult<CasePayload>) -> Resolved {
    match outcome {
        Ok(payload) if is_usable(&payload) => Resolved {
            payload,
            origin: PayloadOrigin::Live,
        },
        Ok(_) => {
            warn!("no parties found in court response, using placeholder data");
            placeholder_resolution()
        }
        Err(e) => {
            warn!("live retrieval failed, using placeholder data: {e}");
            placeholder_resolution()
        }
    }
}

fn placeholder_resolution() -> Resolved {
    Resolved {
        payload: placeholder_payload(),
        origin: PayloadOrigin::Placeholder,
    }
}

/// The fixed payload returned whenever live data is unusable.
pub fn placeholder_payload() -> CasePayload {
    CasePayload {
        parties: Parties {
            petitioner: Some("Sample Petitioner Name".to_string()),
            respondent: Some("Sample Respondent Name".to_string()),
        },
        filing_date: Some("2024-01-15".to_string()),
        next_hearing: Some("2024-08-20".to_string()),
        case_status: "Pending".to_string(),
        orders: vec![CaseOrder {
            date: "2024-07-15".to_string(),
            title: "Latest Order".to_string(),
            pdf_link: Some("/static/sample_order.pdf".to_string()),
        }],
    }
}
