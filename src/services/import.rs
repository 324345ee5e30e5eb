//! CSV operation import
//!
//! Operations are created by the trade-entry process; this service loads
//! them from its CSV extract. Customers are matched by document and created
//! on first sight. Rows whose operation number already exists are skipped.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::audit::EntityType;
use crate::error::{CuadreError, CuadreResult};
use crate::models::{CashFlow, Customer, Direction, Money, Operation};
use crate::storage::Storage;

/// One row of the operations extract
///
/// Columns not listed here are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationRow {
    pub number: u64,
    pub date: String,
    pub direction: String,
    pub dollars: String,
    #[serde(default)]
    pub pen_amount: Option<String>,
    #[serde(default)]
    pub usd_amount: Option<String>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_document: String,
    #[serde(default)]
    pub customer_type: String,
    #[serde(default)]
    pub email: String,
}

/// Result of a completed import
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub duplicates_skipped: usize,
    pub customers_created: usize,
    pub errors: usize,
    /// Error messages by CSV line number
    pub error_messages: BTreeMap<usize, String>,
}

/// Service for CSV import
pub struct ImportService<'a> {
    storage: &'a Storage,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    ["%Y-%m-%d", "%d/%m/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .ok_or_else(|| format!("Could not parse date: '{}'", s))
}

fn parse_money(s: &str, column: &str) -> Result<Money, String> {
    Money::parse(s).map_err(|e| format!("{}: {}", column, e))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Import every row of a CSV with a header line
    pub fn import_csv<R: Read>(&self, reader: R) -> CuadreResult<ImportResult> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut result = ImportResult::default();

        for (idx, row) in csv_reader.deserialize::<OperationRow>().enumerate() {
            // Line 1 is the header
            let line = idx + 2;

            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    result.errors += 1;
                    result
                        .error_messages
                        .insert(line, format!("Error reading CSV record: {}", e));
                    continue;
                }
            };

            if self.storage.operations.get_by_number(row.number)?.is_some() {
                tracing::debug!(number = row.number, "operation already imported");
                result.duplicates_skipped += 1;
                continue;
            }

            match self.import_row(&row, &mut result) {
                Ok(()) => result.imported += 1,
                Err(message) => {
                    result.errors += 1;
                    result.error_messages.insert(line, message);
                }
            }
        }

        self.storage.customers.save()?;
        self.storage.operations.save()?;

        tracing::info!(
            imported = result.imported,
            duplicates = result.duplicates_skipped,
            errors = result.errors,
            "operation import finished"
        );

        Ok(result)
    }

    fn import_row(&self, row: &OperationRow, result: &mut ImportResult) -> Result<(), String> {
        let date = parse_date(&row.date)?;
        let direction = Direction::parse(&row.direction)
            .ok_or_else(|| format!("Invalid direction: '{}'", row.direction))?;
        let dollars = parse_money(&row.dollars, "dollars")?;

        let cash_flow = match non_empty(&row.pen_amount) {
            Some(pen) => {
                let usd = match non_empty(&row.usd_amount) {
                    Some(usd) => parse_money(usd, "usd_amount")?,
                    None => dollars,
                };
                Some(CashFlow::new(parse_money(pen, "pen_amount")?, usd))
            }
            None => None,
        };

        let customer = self
            .customer_for(row, result)
            .map_err(|e: CuadreError| e.to_string())?;

        let mut operation = Operation::new(row.number, date, direction, dollars, customer.id);
        operation.cash_flow = cash_flow;

        self.storage
            .operations
            .upsert(operation.clone())
            .map_err(|e| e.to_string())?;
        self.storage
            .log_create(
                EntityType::Operation,
                operation.id.to_string(),
                Some(operation.label()),
                &operation,
            )
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    fn customer_for(&self, row: &OperationRow, result: &mut ImportResult) -> CuadreResult<Customer> {
        if !row.customer_document.trim().is_empty() {
            if let Some(existing) = self.storage.customers.find_by_document(&row.customer_document)? {
                return Ok(existing);
            }
        }

        let customer = Customer {
            customer_type: row.customer_type.trim().to_string(),
            email: row.email.trim().to_string(),
            ..Customer::new(row.customer_name.trim(), row.customer_document.trim())
        };
        self.storage.customers.upsert(customer.clone())?;
        self.storage.log_create(
            EntityType::Customer,
            customer.id.to_string(),
            Some(customer.display_name()),
            &customer,
        )?;
        result.customers_created += 1;

        Ok(customer)
    }
}
