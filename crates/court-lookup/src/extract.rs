//! Extract case details from court search result pages.
//!
//! Court sites render case details as two-column tables: a label cell
//! ("Petitioner", "Next Hearing Date", ...) followed by its value cell.
//! Extraction matches labels by case-insensitive pattern and reads the
//! adjacent cell. Labels that are not found leave the field absent;
//! partial extraction is not an error.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::types::{CaseOrder, CasePayload, Parties};

/// Turns a parsed result page into a payload.
///
/// One strategy per source, so selectors for a new court can be added
/// without touching the lookup pipeline.
pub trait CaseExtractor: Send + Sync {
    fn extract(&self, document: &Html, base_url: &Url) -> CasePayload;
}

/// Label patterns for each payload field.
#[derive(Debug, Clone)]
pub struct FieldLabels {
    pub petitioner: Regex,
    pub respondent: Regex,
    pub filing_date: Regex,
    pub next_hearing: Regex,
    pub case_status: Regex,
    pub orders_heading: Regex,
}

impl Default for FieldLabels {
    fn default() -> Self {
        Self {
            petitioner: Regex::new(r"(?i)petitioner").expect("valid regex"),
            respondent: Regex::new(r"(?i)respondent").expect("valid regex"),
            filing_date: Regex::new(r"(?i)filing.*date").expect("valid regex"),
            next_hearing: Regex::new(r"(?i)next.*hearing").expect("valid regex"),
            case_status: Regex::new(r"(?i)status").expect("valid regex"),
            orders_heading: Regex::new(r"(?i)orders").expect("valid regex"),
        }
    }
}

/// Label/value table extraction.
#[derive(Debug, Clone, Default)]
pub struct LabelTableExtractor {
    labels: FieldLabels,
}

impl LabelTableExtractor {
    pub fn new(labels: FieldLabels) -> Self {
        Self { labels }
    }
}

impl CaseExtractor for LabelTableExtractor {
    fn extract(&self, document: &Html, base_url: &Url) -> CasePayload {
        let orders_table = find_orders_table(document, &self.labels.orders_heading);
        let cells = label_cells(document, orders_table.as_ref());

        let mut payload = CasePayload {
            parties: Parties {
                petitioner: value_for(&cells, &self.labels.petitioner),
                respondent: value_for(&cells, &self.labels.respondent),
            },
            filing_date: value_for(&cells, &self.labels.filing_date),
            next_hearing: value_for(&cells, &self.labels.next_hearing),
            ..CasePayload::default()
        };

        if let Some(status) = value_for(&cells, &self.labels.case_status) {
            payload.case_status = status;
        }

        if let Some(table) = orders_table {
            payload.orders = extract_orders(table, base_url);
        }

        payload
    }
}

/// True when the page shows a CAPTCHA image.
pub fn detect_captcha(document: &Html) -> bool {
    let sel = Selector::parse("img").expect("valid selector");
    let re = Regex::new(r"(?i)captcha").expect("valid regex");
    document.select(&sel).any(|img| {
        let attrs = img.value();
        attrs.attr("alt").is_some_and(|a| re.is_match(a))
            || attrs.attr("title").is_some_and(|t| re.is_match(t))
    })
}

/// Whitespace-normalized text content of an element.
fn cell_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Table cells outside the orders table, in document order.
///
/// A cell belongs to the innermost table enclosing it, so cells of a layout
/// table that wraps the orders table are kept.
fn label_cells<'a>(document: &'a Html, orders_table: Option<&ElementRef<'a>>) -> Vec<ElementRef<'a>> {
    let sel = Selector::parse("td, th").expect("valid selector");
    document
        .select(&sel)
        .filter(|cell| match orders_table {
            Some(table) => enclosing_table(*cell).map(|t| t.id()) != Some(table.id()),
            None => true,
        })
        .collect()
}

fn enclosing_table(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "table")
}

/// Element children of `el` with the given tag name.
fn child_elements<'a>(el: ElementRef<'a>, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(move |c| c.value().name() == name)
}

/// Rows of this table only, not of tables nested inside it.
fn own_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(child_elements(child, "tr")),
            _ => {}
        }
    }
    rows
}

fn has_nested_table(table: ElementRef<'_>) -> bool {
    table
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|d| d.value().name() == "table")
}

/// Value of the first label cell matching `label` that has an adjacent value cell.
fn value_for(cells: &[ElementRef<'_>], label: &Regex) -> Option<String> {
    cells
        .iter()
        .filter(|cell| label.is_match(&cell_text(**cell)))
        .find_map(|cell| {
            let value = cell
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .next()
                .filter(|sib| matches!(sib.value().name(), "td" | "th"))?;
            let text = cell_text(value);
            (!text.is_empty()).then_some(text)
        })
}

/// The orders table: `table.orders`, or the innermost table whose caption
/// or first row mentions orders.
fn find_orders_table<'a>(document: &'a Html, heading: &Regex) -> Option<ElementRef<'a>> {
    let by_class = Selector::parse("table.orders").expect("valid selector");
    if let Some(table) = document.select(&by_class).next() {
        return Some(table);
    }

    let tables = Selector::parse("table").expect("valid selector");
    document
        .select(&tables)
        .filter(|table| !has_nested_table(*table))
        .find(|table| {
            let caption_hit = child_elements(*table, "caption")
                .next()
                .is_some_and(|c| heading.is_match(&cell_text(c)));
            let header_hit = own_rows(*table)
                .first()
                .is_some_and(|r| heading.is_match(&cell_text(*r)));
            caption_hit || header_hit
        })
}

/// Rows after the header with at least three cells: date, title, document link.
fn extract_orders(table: ElementRef<'_>, base_url: &Url) -> Vec<CaseOrder> {
    let link_sel = Selector::parse("a[href]").expect("valid selector");

    own_rows(table)
        .into_iter()
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<ElementRef<'_>> = child_elements(row, "td").collect();
            if cells.len() < 3 {
                return None;
            }
            let pdf_link = cells[2]
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| base_url.join(href.trim()).ok())
                .map(|u| u.to_string());
            Some(CaseOrder {
                date: cell_text(cells[0]),
                title: cell_text(cells[1]),
                pdf_link,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAILS_PAGE: &str = r#"
        <html><body>
          <table class="case-details">
            <tr><td>Petitioner</td><td>  Ram   Kumar </td></tr>
            <tr><td>Respondent(s)</td><td>State of Delhi</td></tr>
            <tr><td>Date of Filing / Filing Date</td><td>2024-01-10</td></tr>
            <tr><td>Next Hearing Date</td><td>2024-09-01</td></tr>
            <tr><td>Case Status</td><td>Disposed</td></tr>
          </table>
          <table class="orders">
            <tr><th>Date</th><th>Order</th><th>Document</th></tr>
            <tr><td>2024-03-01</td><td>Status report order</td><td><a href="/orders/1.pdf">PDF</a></td></tr>
            <tr><td>2024-04-01</td><td>Final order</td><td>not uploaded</td></tr>
            <tr><td colspan="3">No further orders</td></tr>
          </table>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://delhihighcourt.nic.in/").unwrap()
    }

    fn extract(html: &str) -> CasePayload {
        LabelTableExtractor::default().extract(&Html::parse_document(html), &base())
    }

    #[test]
    fn test_extracts_labelled_fields() {
        let p = extract(DETAILS_PAGE);
        assert_eq!(p.parties.petitioner.as_deref(), Some("Ram Kumar"));
        assert_eq!(p.parties.respondent.as_deref(), Some("State of Delhi"));
        assert_eq!(p.filing_date.as_deref(), Some("2024-01-10"));
        assert_eq!(p.next_hearing.as_deref(), Some("2024-09-01"));
        assert_eq!(p.case_status, "Disposed");
    }

    #[test]
    fn test_extracts_orders_with_absolute_links() {
        let p = extract(DETAILS_PAGE);
        assert_eq!(p.orders.len(), 2);
        assert_eq!(p.orders[0].date, "2024-03-01");
        assert_eq!(p.orders[0].title, "Status report order");
        assert_eq!(
            p.orders[0].pdf_link.as_deref(),
            Some("https://delhihighcourt.nic.in/orders/1.pdf")
        );
        assert_eq!(p.orders[1].pdf_link, None);
    }

    #[test]
    fn test_missing_labels_leave_fields_absent() {
        let p = extract("<html><body><p>No record found</p></body></html>");
        assert_eq!(p, CasePayload::default());
    }

    #[test]
    fn test_label_without_value_cell_is_skipped() {
        let p = extract(
            r#"<table>
                 <tr><td>Petitioner</td></tr>
                 <tr><th>Petitioner Name</th><td>Asha Devi</td></tr>
               </table>"#,
        );
        assert_eq!(p.parties.petitioner.as_deref(), Some("Asha Devi"));
        assert!(p.parties.respondent.is_none());
    }

    #[test]
    fn test_orders_table_found_by_heading() {
        let p = extract(
            r#"<table>
                 <tr><th>Orders</th><th>Title</th><th>Link</th></tr>
                 <tr><td>2024-05-05</td><td>Interim order</td><td><a href="docs/o.pdf">view</a></td></tr>
               </table>"#,
        );
        assert_eq!(p.orders.len(), 1);
        assert_eq!(
            p.orders[0].pdf_link.as_deref(),
            Some("https://delhihighcourt.nic.in/docs/o.pdf")
        );
    }

    #[test]
    fn test_layout_table_wrapping_details_and_orders() {
        let p = extract(
            r#"<html><body>
                 <table width="100%"><tr><td>
                   <table>
                     <tr><td>Petitioner</td><td>Ram Kumar</td></tr>
                     <tr><td>Respondent</td><td>State</td></tr>
                   </table>
                   <h3>Orders</h3>
                   <table>
                     <caption>Orders</caption>
                     <tr><th>Date</th><th>Order</th><th>Document</th></tr>
                     <tr><td>2024-06-01</td><td>Notice issued</td><td><a href="o/6.pdf">PDF</a></td></tr>
                   </table>
                 </td></tr></table>
               </body></html>"#,
        );
        assert_eq!(p.parties.petitioner.as_deref(), Some("Ram Kumar"));
        assert_eq!(p.parties.respondent.as_deref(), Some("State"));
        assert_eq!(p.orders.len(), 1);
        assert_eq!(p.orders[0].title, "Notice issued");
        assert_eq!(
            p.orders[0].pdf_link.as_deref(),
            Some("https://delhihighcourt.nic.in/o/6.pdf")
        );
    }

    #[test]
    fn test_layout_table_is_not_taken_for_orders_table() {
        // The outer row mentions orders but only the inner table lists them.
        let p = extract(
            r#"<table><tr><td>
                 <p>Orders and case details</p>
                 <table>
                   <tr><td>Petitioner</td><td>Asha Devi</td></tr>
                 </table>
               </td></tr></table>"#,
        );
        assert_eq!(p.parties.petitioner.as_deref(), Some("Asha Devi"));
        assert!(p.orders.is_empty());
    }

    #[test]
    fn test_detect_captcha() {
        let doc = Html::parse_document(r#"<form><img src="/c.png" alt="Enter CAPTCHA"></form>"#);
        assert!(detect_captcha(&doc));
        let doc = Html::parse_document(r#"<img src="/c.png" title="captcha image">"#);
        assert!(detect_captcha(&doc));
        let doc = Html::parse_document(r#"<img src="/logo.png" alt="Court logo">"#);
        assert!(!detect_captcha(&doc));
    }
}
