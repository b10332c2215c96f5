//! Terminal rendering for CLI commands.

use std::fmt::Write;

use court_lookup::{CasePayload, PayloadOrigin, QueryRecord};

const ABSENT: &str = "-";

/// Print a JSON value, pretty.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

/// Human-readable case details.
pub fn render_payload(payload: &CasePayload, origin: Option<PayloadOrigin>) -> String {
    let mut out = String::new();
    let field = |v: &Option<String>| v.clone().unwrap_or_else(|| ABSENT.to_string());

    let _ = writeln!(out, "  Petitioner:   {}", field(&payload.parties.petitioner));
    let _ = writeln!(out, "  Respondent:   {}", field(&payload.parties.respondent));
    let _ = writeln!(out, "  Filed:        {}", field(&payload.filing_date));
    let _ = writeln!(out, "  Next hearing: {}", field(&payload.next_hearing));
    let _ = writeln!(out, "  Status:       {}", payload.case_status);

    if payload.orders.is_empty() {
        let _ = writeln!(out, "  Orders:       none");
    } else {
        let _ = writeln!(out, "  Orders:");
        for order in &payload.orders {
            let _ = writeln!(
                out,
                "    {}  {}  {}",
                order.date,
                order.title,
                order.pdf_link.as_deref().unwrap_or(ABSENT)
            );
        }
    }

    if origin == Some(PayloadOrigin::Placeholder) {
        let _ = writeln!(
            out,
            "  (placeholder data: the court site could not be read)"
        );
    }
    out
}

/// One line per stored query, newest first.
pub fn render_history(records: &[QueryRecord]) -> String {
    if records.is_empty() {
        return "  No lookups recorded yet.\n".to_string();
    }

    let mut out = String::new();
    for r in records {
        let _ = writeln!(
            out,
            "  #{:<5} {}  {}/{}/{}  {}",
            r.id,
            r.query.timestamp.format("%Y-%m-%d %H:%M:%S"),
            r.query.case_type,
            r.query.case_number,
            r.query.filing_year,
            r.payload.case_status
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use court_lookup::{placeholder_payload, CaseQuery};

    #[test]
    fn test_render_payload_marks_placeholder() {
        let text = render_payload(&placeholder_payload(), Some(PayloadOrigin::Placeholder));
        assert!(text.contains("Sample Petitioner Name"));
        assert!(text.contains("/static/sample_order.pdf"));
        assert!(text.contains("placeholder data"));

        let text = render_payload(&placeholder_payload(), Some(PayloadOrigin::Live));
        assert!(!text.contains("placeholder data"));
    }

    #[test]
    fn test_render_payload_absent_fields() {
        let text = render_payload(&CasePayload::default(), None);
        assert!(text.contains("Petitioner:   -"));
        assert!(text.contains("Status:       Unknown"));
        assert!(text.contains("Orders:       none"));
    }

    #[test]
    fn test_render_history() {
        assert!(render_history(&[]).contains("No lookups"));

        let record = QueryRecord {
            id: 4,
            query: CaseQuery::new("civil", "123", "2024").unwrap(),
            payload: placeholder_payload(),
        };
        let text = render_history(&[record]);
        assert!(text.contains("#4"));
        assert!(text.contains("civil/123/2024"));
        assert!(text.contains("Pending"));
    }
}
