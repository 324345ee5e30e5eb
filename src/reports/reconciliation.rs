//! Reconciliation report
//!
//! Runs the differential calculator over every operation (or one) and
//! renders the rows for the terminal, as an xlsx workbook or as CSV.

use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use tabled::settings::Style;
use tabled::{Table, Tabled};
use xlsxwriter::{Workbook, Worksheet};

use crate::error::{CuadreError, CuadreResult};
use crate::models::{Currency, Direction, Money, Operation};
use crate::storage::Storage;

use super::differential::{compute_rows, ReportRow};

/// Column headers of the exported spreadsheet, in order
pub const REPORT_HEADERS: [&str; 16] = [
    "Fecha Operación",
    "Número",
    "Cliente/Titular",
    "Tipo",
    "Dólares",
    "Soles",
    "Fecha USD",
    "Descripción USD",
    "Monto USD",
    "Referencia USD",
    "Diferencia USD",
    "Fecha PEN",
    "Descripción PEN",
    "Monto PEN",
    "Referencia PEN",
    "Diferencia PEN",
];

/// Worksheet name of the exported workbook
pub const SHEET_NAME: &str = "Cuadre Operaciones";

/// Which operations go into the export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionFilter {
    All,
    Only(Direction),
}

impl DirectionFilter {
    /// Accepts `todos`/`all` or any direction spelling
    pub fn parse(s: &str) -> CuadreResult<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("todos") || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Direction::parse(trimmed).map(Self::Only).ok_or_else(|| {
            CuadreError::Validation(format!(
                "Invalid direction filter: '{}'. Use todos, buy or sell",
                s
            ))
        })
    }

    fn accepts(&self, direction: Direction) -> bool {
        match self {
            Self::All => true,
            Self::Only(d) => *d == direction,
        }
    }
}

/// Report rows for a set of operations
#[derive(Debug, Clone)]
pub struct ReconciliationReport {
    pub rows: Vec<ReportRow>,
    pub operation_count: usize,
}

impl ReconciliationReport {
    /// Build the report over every operation matching the filter
    ///
    /// Operations are ordered by date, then number, both ascending.
    pub fn generate(storage: &Storage, filter: DirectionFilter) -> CuadreResult<Self> {
        let mut operations: Vec<Operation> = storage
            .operations
            .get_all()?
            .into_iter()
            .filter(|op| filter.accepts(op.direction))
            .collect();
        operations.sort_by(|a, b| a.date.cmp(&b.date).then(a.number.cmp(&b.number)));

        let mut rows = Vec::new();
        for op in &operations {
            rows.extend(rows_for_operation(storage, op)?);
        }

        tracing::debug!(
            operations = operations.len(),
            rows = rows.len(),
            "reconciliation report generated"
        );

        Ok(Self {
            rows,
            operation_count: operations.len(),
        })
    }

    /// Build the report for a single operation
    pub fn for_operation(storage: &Storage, operation: &Operation) -> CuadreResult<Self> {
        Ok(Self {
            rows: rows_for_operation(storage, operation)?,
            operation_count: 1,
        })
    }

    /// Write the spreadsheet as an xlsx workbook
    ///
    /// Amounts and the operation number are numeric cells; dates are text.
    pub fn export_xlsx(&self, path: &Path) -> CuadreResult<()> {
        let file_path = path.to_str().ok_or_else(|| {
            CuadreError::Export(format!("Invalid output path: {}", path.display()))
        })?;

        let workbook = Workbook::new(file_path).map_err(xlsx_error)?;
        {
            let mut sheet = workbook
                .add_worksheet(Some(SHEET_NAME))
                .map_err(xlsx_error)?;

            for (col, header) in REPORT_HEADERS.iter().enumerate() {
                write_text(&mut sheet, 0, col as u16, header)?;
            }

            for (idx, row) in self.rows.iter().enumerate() {
                write_xlsx_row(&mut sheet, (idx + 1) as u32, row)?;
            }
        }

        workbook.close().map_err(xlsx_error)?;
        Ok(())
    }

    /// Write the spreadsheet as CSV with the Spanish headers
    pub fn export_csv<W: Write>(&self, writer: W) -> CuadreResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(REPORT_HEADERS)?;

        for row in &self.rows {
            csv_writer.write_record(&[
                row.operation_date.format("%Y-%m-%d").to_string(),
                row.number.to_string(),
                row.customer.clone(),
                row.direction.to_string(),
                row.expected_usd.to_string(),
                row.expected_pen.to_string(),
                format_date(row.usd.date),
                row.usd.description.clone(),
                row.usd.amount.to_string(),
                row.usd.reference.clone(),
                row.usd.difference.to_string(),
                format_date(row.pen.date),
                row.pen.description.clone(),
                row.pen.amount.to_string(),
                row.pen.reference.clone(),
                row.pen.difference.to_string(),
            ])?;
        }

        csv_writer
            .flush()
            .map_err(|e| CuadreError::Export(e.to_string()))?;
        Ok(())
    }

    /// Compact table for the terminal
    pub fn format_terminal(&self) -> String {
        if self.rows.is_empty() {
            return "No operations to report.".to_string();
        }

        let lines: Vec<TerminalRow> = self.rows.iter().map(TerminalRow::from).collect();
        let mut output = Table::new(lines).with(Style::psql()).to_string();
        output.push('\n');

        let usd_gap: Money = self.rows.iter().map(|r| r.usd.difference).sum();
        let pen_gap: Money = self.rows.iter().map(|r| r.pen.difference).sum();
        output.push_str(&format!(
            "\n{} operation(s), {} row(s). Uncovered: {} / {}\n",
            self.operation_count,
            self.rows.len(),
            usd_gap.format_with_symbol(Currency::Usd.symbol()),
            pen_gap.format_with_symbol(Currency::Pen.symbol()),
        ));
        output
    }
}

fn rows_for_operation(storage: &Storage, op: &Operation) -> CuadreResult<Vec<ReportRow>> {
    let customer = storage
        .customers
        .get(op.customer_id)?
        .map(|c| c.display_name())
        .unwrap_or_default();

    let (usd, pen) = match storage.reconciliations.get_record_by_operation(op.id)? {
        Some(record) => (
            storage
                .reconciliations
                .entries_for(record.id, Currency::Usd)?,
            storage
                .reconciliations
                .entries_for(record.id, Currency::Pen)?,
        ),
        None => (Vec::new(), Vec::new()),
    };

    compute_rows(op, &customer, &usd, &pen)
}

fn write_xlsx_row(sheet: &mut Worksheet, row_idx: u32, row: &ReportRow) -> CuadreResult<()> {
    let date = row.operation_date.format("%Y-%m-%d").to_string();
    write_text(sheet, row_idx, 0, &date)?;
    write_number(sheet, row_idx, 1, row.number as f64)?;
    write_text(sheet, row_idx, 2, &row.customer)?;
    write_text(sheet, row_idx, 3, &row.direction.to_string())?;
    write_number(sheet, row_idx, 4, row.expected_usd.to_f64())?;
    write_number(sheet, row_idx, 5, row.expected_pen.to_f64())?;

    // USD slot in columns 6-10, PEN slot in 11-15
    for (first_col, slot) in [(6, &row.usd), (11, &row.pen)] {
        write_text(sheet, row_idx, first_col, &format_date(slot.date))?;
        write_text(sheet, row_idx, first_col + 1, &slot.description)?;
        write_number(sheet, row_idx, first_col + 2, slot.amount.to_f64())?;
        write_text(sheet, row_idx, first_col + 3, &slot.reference)?;
        write_number(sheet, row_idx, first_col + 4, slot.difference.to_f64())?;
    }

    Ok(())
}

fn write_text(sheet: &mut Worksheet, row: u32, col: u16, value: &str) -> CuadreResult<()> {
    sheet
        .write_string(row, col, value, None)
        .map_err(xlsx_error)
}

fn write_number(sheet: &mut Worksheet, row: u32, col: u16, value: f64) -> CuadreResult<()> {
    sheet
        .write_number(row, col, value, None)
        .map_err(xlsx_error)
}

fn xlsx_error(err: impl Display) -> CuadreError {
    CuadreError::Export(err.to_string())
}

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[derive(Tabled)]
struct TerminalRow {
    #[tabled(rename = "Fecha")]
    date: String,
    #[tabled(rename = "N°")]
    number: u64,
    #[tabled(rename = "Cliente")]
    customer: String,
    #[tabled(rename = "Tipo")]
    direction: Direction,
    #[tabled(rename = "Dólares")]
    expected_usd: Money,
    #[tabled(rename = "Soles")]
    expected_pen: Money,
    #[tabled(rename = "Monto USD")]
    usd_amount: Money,
    #[tabled(rename = "Dif. USD")]
    usd_difference: Money,
    #[tabled(rename = "Monto PEN")]
    pen_amount: Money,
    #[tabled(rename = "Dif. PEN")]
    pen_difference: Money,
}

impl From<&ReportRow> for TerminalRow {
    fn from(row: &ReportRow) -> Self {
        Self {
            date: row.operation_date.format("%Y-%m-%d").to_string(),
            number: row.number,
            customer: row.customer.clone(),
            direction: row.direction,
            expected_usd: row.expected_usd,
            expected_pen: row.expected_pen,
            usd_amount: row.usd.amount,
            usd_difference: row.usd.difference,
            pen_amount: row.pen.amount,
            pen_difference: row.pen.difference,
        }
    }
}
