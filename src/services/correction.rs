//! Batch sign correction
//!
//! Historical entries were recorded with inconsistent signs. For each listed
//! operation this job fills in a missing USD or PEN entry from the cash flow
//! and rewrites existing amounts to the sign convention of the direction:
//!
//! | direction | USD   | PEN   |
//! |-----------|-------|-------|
//! | SELL      | -\|a\| | +\|a\| |
//! | BUY       | +\|a\| | -\|a\| |

use serde::Serialize;

use crate::audit::EntityType;
use crate::error::CuadreResult;
use crate::models::{Currency, Direction, EntryFields, Money, Operation, ReconciliationEntry};
use crate::storage::Storage;

use super::reconciliation::ReconciliationService;

/// Description given to entries created by the job
pub const GENERATED_DESCRIPTION: &str = "GENERADO AUTOMÁTICAMENTE";

/// Outcome of a correction run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorrectionReport {
    /// Operation numbers that were processed
    pub processed: Vec<u64>,
    /// Operation numbers that do not exist
    pub skipped: Vec<u64>,
    pub entries_created: usize,
    pub entries_rewritten: usize,
    /// Existing entries whose sign was already right
    pub entries_unchanged: usize,
}

/// Amount with the sign convention applied
pub fn signed_amount(direction: Direction, currency: Currency, amount: Money) -> Money {
    let negative = match (direction, currency) {
        (Direction::Sell, Currency::Usd) | (Direction::Buy, Currency::Pen) => true,
        (Direction::Sell, Currency::Pen) | (Direction::Buy, Currency::Usd) => false,
    };
    if negative {
        -amount.abs()
    } else {
        amount.abs()
    }
}

/// Service running the sign correction job
pub struct CorrectionService<'a> {
    storage: &'a Storage,
}

impl<'a> CorrectionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Correct the listed operations one after another
    pub fn fix_signs(&self, numbers: &[u64]) -> CuadreResult<CorrectionReport> {
        let mut report = CorrectionReport::default();

        for &number in numbers {
            let Some(operation) = self.storage.operations.get_by_number(number)? else {
                tracing::warn!(number, "operation not found, skipping");
                report.skipped.push(number);
                continue;
            };

            tracing::info!(number, direction = %operation.direction, "correcting operation");
            self.fix_operation(&operation, &mut report)?;
            report.processed.push(number);
        }

        self.storage.reconciliations.save()?;
        Ok(report)
    }

    fn fix_operation(&self, operation: &Operation, report: &mut CorrectionReport) -> CuadreResult<()> {
        let record = ReconciliationService::new(self.storage).ensure_record(operation.id)?;

        for currency in [Currency::Usd, Currency::Pen] {
            let entries = self
                .storage
                .reconciliations
                .entries_for(record.id, currency)?;

            if entries.is_empty() {
                let source = operation
                    .cash_flow
                    .map(|cf| match currency {
                        Currency::Usd => cf.usd_amount,
                        Currency::Pen => cf.pen_amount,
                    })
                    .unwrap_or_default();

                let entry = ReconciliationEntry::new(
                    record.id,
                    currency,
                    EntryFields {
                        date: operation.date,
                        description: GENERATED_DESCRIPTION.to_string(),
                        amount: signed_amount(operation.direction, currency, source),
                        reference: String::new(),
                        difference: Money::zero(),
                    },
                );
                self.storage.reconciliations.insert_entry(entry.clone())?;
                self.storage.log_create(
                    EntityType::for_currency(currency),
                    entry.id.to_string(),
                    Some(operation.label()),
                    &entry,
                )?;
                report.entries_created += 1;
                continue;
            }

            for entry in entries {
                let corrected = signed_amount(operation.direction, currency, entry.amount);
                if corrected == entry.amount {
                    report.entries_unchanged += 1;
                    continue;
                }

                let mut updated = entry.clone();
                updated.set_amount(corrected);
                self.storage.reconciliations.update_entry(updated.clone())?;
                self.storage.log_update(
                    EntityType::for_currency(currency),
                    updated.id.to_string(),
                    Some(operation.label()),
                    &entry,
                    &updated,
                    None,
                )?;
                tracing::debug!(entry = %updated.id, before = %entry.amount, after = %corrected, "amount rewritten");
                report.entries_rewritten += 1;
            }
        }

        Ok(())
    }
}
