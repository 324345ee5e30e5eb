//! Operation display formatting
//!
//! Formats operations for terminal output in table and detail views.

use crate::models::{Currency, ReconciliationEntry};
use crate::services::operation::{OperationSummary, Page};
use crate::services::reconciliation::RecordDetails;

fn status_label(summary: &OperationSummary) -> &'static str {
    match (summary.usd_complete, summary.pen_complete) {
        (true, true) => "Reconciled",
        (true, false) => "PEN pending",
        (false, true) => "USD pending",
        (false, false) => "Incomplete",
    }
}

/// Format one page of operations as a table
pub fn format_operation_list(page: &Page<OperationSummary>, date_format: &str) -> String {
    if page.items.is_empty() {
        return "No operations found.".to_string();
    }

    let customer_width = page
        .items
        .iter()
        .map(|s| s.customer_name.chars().count())
        .max()
        .unwrap_or(8)
        .clamp(8, 40);

    let mut output = String::new();
    output.push_str(&format!(
        "{:>8}  {:<10}  {:<4}  {:<customer_width$}  {:>12}  {:>12}  {:>12}  {}\n",
        "Number",
        "Date",
        "Type",
        "Customer",
        "Dollars",
        "USD Total",
        "PEN Total",
        "Status",
        customer_width = customer_width,
    ));
    output.push_str(&format!(
        "{:->8}  {:-<10}  {:-<4}  {:-<customer_width$}  {:->12}  {:->12}  {:->12}  {:-<11}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        customer_width = customer_width,
    ));

    for summary in &page.items {
        let op = &summary.operation;
        let customer: String = summary.customer_name.chars().take(customer_width).collect();
        output.push_str(&format!(
            "{:>8}  {:<10}  {:<4}  {:<customer_width$}  {:>12}  {:>12}  {:>12}  {}\n",
            op.number,
            op.date.format(date_format).to_string(),
            op.direction,
            customer,
            op.dollars.to_string(),
            summary.usd_total.to_string(),
            summary.pen_total.to_string(),
            status_label(summary),
            customer_width = customer_width,
        ));
    }

    output.push_str(&format!(
        "\nPage {} of {} ({} operation(s))\n",
        page.page,
        page.total_pages.max(1),
        page.total
    ));

    output
}

/// Format a single operation with its reconciliation entries
pub fn format_operation_details(
    summary: &OperationSummary,
    details: Option<&RecordDetails>,
    date_format: &str,
) -> String {
    let op = &summary.operation;
    let mut output = String::new();

    output.push_str(&format!("Operation {}\n", op.label()));
    output.push_str(&format!("  ID:        {}\n", op.id));
    output.push_str(&format!("  Date:      {}\n", op.date.format(date_format)));
    output.push_str(&format!("  Type:      {}\n", op.direction));
    output.push_str(&format!("  Customer:  {}\n", summary.customer_name));
    output.push_str(&format!(
        "  Dollars:   {}\n",
        op.dollars.format_with_symbol(Currency::Usd.symbol())
    ));
    match op.cash_flow {
        Some(cf) => {
            output.push_str(&format!(
                "  Soles:     {}\n",
                cf.pen_amount.format_with_symbol(Currency::Pen.symbol())
            ));
        }
        None => output.push_str("  Soles:     (no cash-flow record)\n"),
    }
    output.push_str(&format!("  Status:    {}\n", status_label(summary)));

    match details {
        Some(details) => {
            output.push('\n');
            output.push_str(&format_entries(Currency::Usd, &details.usd, date_format));
            output.push('\n');
            output.push_str(&format_entries(Currency::Pen, &details.pen, date_format));
        }
        None => output.push_str("\nNo reconciliation record yet.\n"),
    }

    output
}

/// Format the entries of one currency, in creation order
pub fn format_entries(currency: Currency, entries: &[ReconciliationEntry], date_format: &str) -> String {
    let mut output = format!("{} entries ({}):\n", currency, entries.len());

    if entries.is_empty() {
        output.push_str("  (none)\n");
        return output;
    }

    for entry in entries {
        output.push_str(&format!(
            "  {}  {}  {:>12}  {:<12}  {}\n",
            entry.id.short(),
            entry.date.format(date_format),
            entry.amount.to_string(),
            entry.reference,
            entry.description,
        ));
    }

    let total: crate::models::Money = entries.iter().map(|e| e.amount).sum();
    output.push_str(&format!("  Total: {}\n", total.format_with_symbol(currency.symbol())));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerId, Direction, EntryFields, Money, Operation, RecordId};
    use chrono::NaiveDate;

    fn summary(usd: bool, pen: bool) -> OperationSummary {
        OperationSummary {
            operation: Operation::new(
                13157,
                NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                Direction::Buy,
                Money::from_units(2000),
                CustomerId::new(),
            ),
            customer_name: "Importadora Andina SAC".into(),
            has_record: usd || pen,
            usd_complete: usd,
            pen_complete: pen,
            incomplete: !(usd || pen),
            usd_total: Money::zero(),
            pen_total: Money::zero(),
            usd_entries: usize::from(usd),
            pen_entries: usize::from(pen),
        }
    }

    #[test]
    fn test_empty_list() {
        let page = Page {
            items: Vec::new(),
            total: 0,
            page: 1,
            limit: 10,
            total_pages: 0,
        };
        assert_eq!(format_operation_list(&page, "%Y-%m-%d"), "No operations found.");
    }

    #[test]
    fn test_list_shows_status_and_paging() {
        let page = Page {
            items: vec![summary(true, false)],
            total: 11,
            page: 2,
            limit: 10,
            total_pages: 2,
        };
        let output = format_operation_list(&page, "%d/%m/%Y");
        assert!(output.contains("13157"));
        assert!(output.contains("15/01/2025"));
        assert!(output.contains("PEN pending"));
        assert!(output.contains("Page 2 of 2 (11 operation(s))"));
    }

    #[test]
    fn test_entries_with_total() {
        let entry = ReconciliationEntry::new(
            RecordId::new(),
            Currency::Usd,
            EntryFields {
                date: NaiveDate::from_ymd_opt(2025, 1, 16).unwrap(),
                description: "BCP".into(),
                amount: Money::from_units(2000),
                reference: "OP-991".into(),
                difference: Money::zero(),
            },
        );
        let output = format_entries(Currency::Usd, &[entry], "%Y-%m-%d");
        assert!(output.starts_with("USD entries (1):"));
        assert!(output.contains("OP-991"));
        assert!(output.contains("Total: $2000.00"));
    }

    #[test]
    fn test_details_without_record() {
        let output = format_operation_details(&summary(false, false), None, "%Y-%m-%d");
        assert!(output.contains("Operation #13157"));
        assert!(output.contains("Incomplete"));
        assert!(output.contains("No reconciliation record yet."));
    }
}
