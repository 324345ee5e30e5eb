//! Reconciliation differential calculator
//!
//! Lines up an operation's USD and PEN entries slot by slot and computes,
//! per slot, how much of the expected amount is still uncovered. The first
//! slot is measured against the expected amounts; later slots only carry
//! their own entry, negated.
//!
//! When a single entry on one side settles the whole operation while the
//! other side is split across several entries, that side's later slots are
//! blanked so the covering amount is not counted twice.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{CuadreError, CuadreResult};
use crate::models::{Direction, Money, Operation, ReconciliationEntry};

/// Entry columns of one currency in a report row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlotColumns {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub amount: Money,
    pub reference: String,
    pub difference: Money,
}

impl SlotColumns {
    fn from_entry(entry: Option<&ReconciliationEntry>) -> Self {
        match entry {
            Some(e) => Self {
                date: Some(e.date),
                description: e.description.clone(),
                amount: e.amount,
                reference: e.reference.clone(),
                difference: Money::zero(),
            },
            None => Self::default(),
        }
    }
}

/// One exported row: an operation slot with its USD and PEN columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub operation_date: NaiveDate,
    pub number: u64,
    pub customer: String,
    pub direction: Direction,
    /// Expected dollars as printed; zero after the first slot
    pub expected_usd: Money,
    /// Expected soles as printed; zero after the first slot
    pub expected_pen: Money,
    pub usd: SlotColumns,
    pub pen: SlotColumns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coverage {
    /// One PEN entry settles the operation, USD is split
    PenCoversAll,
    /// One USD entry settles the operation, PEN is split
    UsdCoversAll,
    Standard,
}

fn detect_coverage(
    direction: Direction,
    expected_usd: Money,
    expected_pen: Money,
    usd: &[ReconciliationEntry],
    pen: &[ReconciliationEntry],
) -> Coverage {
    if usd.len() > 1 && pen.len() == 1 {
        let covering = pen[0].amount;
        let covers = match direction {
            Direction::Buy => covering <= expected_pen,
            Direction::Sell => covering >= expected_pen,
        };
        if covers {
            return Coverage::PenCoversAll;
        }
    }

    if pen.len() > 1 && usd.len() == 1 {
        let covering = usd[0].amount;
        let covers = match direction {
            Direction::Buy => covering >= expected_usd,
            Direction::Sell => covering <= expected_usd,
        };
        if covers {
            return Coverage::UsdCoversAll;
        }
    }

    Coverage::Standard
}

/// Compute the report rows for one operation
///
/// `usd` and `pen` must be in creation order. There is always at least one
/// row, even when both lists are empty.
pub fn compute_rows(
    operation: &Operation,
    customer: &str,
    usd: &[ReconciliationEntry],
    pen: &[ReconciliationEntry],
) -> CuadreResult<Vec<ReportRow>> {
    let cash_flow = operation
        .cash_flow
        .ok_or_else(|| CuadreError::missing_cash_flow(operation.label()))?;

    let expected_usd = operation.expected_usd();
    let expected_pen = cash_flow.pen_amount;
    let coverage = detect_coverage(operation.direction, expected_usd, expected_pen, usd, pen);

    let slots = usd.len().max(pen.len()).max(1);
    let mut rows = Vec::with_capacity(slots);

    for i in 0..slots {
        let mut usd_cols = SlotColumns::from_entry(usd.get(i));
        let mut pen_cols = SlotColumns::from_entry(pen.get(i));

        if i == 0 {
            usd_cols.difference = expected_usd - usd_cols.amount;
            pen_cols.difference = expected_pen - pen_cols.amount;
        } else {
            match coverage {
                Coverage::PenCoversAll => {
                    usd_cols.difference = -usd_cols.amount;
                    pen_cols.amount = Money::zero();
                    pen_cols.difference = Money::zero();
                }
                Coverage::UsdCoversAll => {
                    usd_cols.amount = Money::zero();
                    usd_cols.difference = Money::zero();
                    pen_cols.difference = -pen_cols.amount;
                }
                Coverage::Standard => {
                    usd_cols.difference = -usd_cols.amount;
                    pen_cols.difference = -pen_cols.amount;
                }
            }
        }

        let (shown_usd, shown_pen) = if i == 0 {
            (operation.expected_usd_display(), expected_pen)
        } else {
            (Money::zero(), Money::zero())
        };

        rows.push(ReportRow {
            operation_date: operation.date,
            number: operation.number,
            customer: customer.to_string(),
            direction: operation.direction,
            expected_usd: shown_usd,
            expected_pen: shown_pen,
            usd: usd_cols,
            pen: pen_cols,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CashFlow, Currency, CustomerId, EntryFields, RecordId};

    fn operation(direction: Direction, dollars: i64, pen: i64) -> Operation {
        Operation::new(
            13157,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            direction,
            Money::from_units(dollars),
            CustomerId::new(),
        )
        .with_cash_flow(CashFlow::new(
            Money::from_units(pen),
            Money::from_units(dollars),
        ))
    }

    fn entries(currency: Currency, amounts: &[i64]) -> Vec<ReconciliationEntry> {
        let record_id = RecordId::new();
        amounts
            .iter()
            .map(|&a| {
                ReconciliationEntry::new(
                    record_id,
                    currency,
                    EntryFields {
                        date: NaiveDate::from_ymd_opt(2025, 1, 16).unwrap(),
                        description: "Transferencia".into(),
                        amount: Money::from_units(a),
                        reference: "REF".into(),
                        difference: Money::zero(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_no_entries_yields_single_row_with_expected_amounts() {
        let op = operation(Direction::Buy, 2000, 7546);
        let rows = compute_rows(&op, "Cliente", &[], &[]).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].usd.amount, Money::zero());
        assert_eq!(rows[0].pen.amount, Money::zero());
        assert_eq!(rows[0].usd.difference, Money::from_units(2000));
        assert_eq!(rows[0].pen.difference, Money::from_units(7546));
        assert!(rows[0].usd.date.is_none());
    }

    #[test]
    fn test_single_entries_leave_small_pen_gap() {
        let op = operation(Direction::Buy, 2000, 7546);
        let usd = entries(Currency::Usd, &[2000]);
        let pen = entries(Currency::Pen, &[7544]);

        let rows = compute_rows(&op, "Cliente", &usd, &pen).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].usd.difference.to_string(), "0.00");
        assert_eq!(rows[0].pen.difference.to_string(), "2.00");
        assert_eq!(rows[0].usd.reference, "REF");
    }

    #[test]
    fn test_single_pen_entry_covering_split_usd() {
        let op = operation(Direction::Buy, 2000, 7546);
        let usd = entries(Currency::Usd, &[1000, 1000]);
        let pen = entries(Currency::Pen, &[7546]);

        let rows = compute_rows(&op, "Cliente", &usd, &pen).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].usd.difference, Money::from_units(1000));
        assert_eq!(rows[0].pen.difference, Money::zero());

        assert_eq!(rows[1].pen.amount, Money::zero());
        assert_eq!(rows[1].pen.difference, Money::zero());
        assert_eq!(rows[1].usd.difference.to_string(), "-1000.00");
        assert_eq!(rows[1].expected_usd, Money::zero());
        assert_eq!(rows[1].expected_pen, Money::zero());
    }

    #[test]
    fn test_pen_entry_above_expected_does_not_cover_purchase() {
        let op = operation(Direction::Buy, 2000, 7546);
        let usd = entries(Currency::Usd, &[1000, 1000]);
        let pen = entries(Currency::Pen, &[8000]);

        let rows = compute_rows(&op, "Cliente", &usd, &pen).unwrap();
        assert_eq!(rows[1].usd.difference, Money::from_units(-1000));
        // No PEN entry in slot 1, so the standard rule yields zero as well
        assert_eq!(rows[1].pen.difference, Money::zero());
    }

    #[test]
    fn test_sale_without_entries() {
        let op = operation(Direction::Sell, 500, 1850);
        let rows = compute_rows(&op, "Cliente", &[], &[]).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].expected_usd, Money::from_units(-500));
        assert_eq!(rows[0].usd.difference.to_string(), "-500.00");
        assert_eq!(rows[0].pen.difference, Money::from_units(1850));
    }

    #[test]
    fn test_single_usd_entry_covering_split_pen_on_sale() {
        let op = operation(Direction::Sell, 500, 1950);
        let usd = entries(Currency::Usd, &[-500]);
        let pen = entries(Currency::Pen, &[1850, 100]);

        let rows = compute_rows(&op, "Cliente", &usd, &pen).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].usd.difference, Money::zero());
        assert_eq!(rows[0].pen.difference, Money::from_units(100));

        assert_eq!(rows[1].usd.amount, Money::zero());
        assert_eq!(rows[1].usd.difference, Money::zero());
        assert_eq!(rows[1].pen.amount, Money::from_units(100));
        assert_eq!(rows[1].pen.difference, Money::from_units(-100));
    }

    #[test]
    fn test_standard_rule_negates_later_slots() {
        let op = operation(Direction::Buy, 3000, 11000);
        let usd = entries(Currency::Usd, &[1000, 1000, 1000]);
        let pen = entries(Currency::Pen, &[5000, 6000]);

        let rows = compute_rows(&op, "Cliente", &usd, &pen).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].usd.difference, Money::from_units(-1000));
        assert_eq!(rows[1].pen.difference, Money::from_units(-6000));
        assert_eq!(rows[2].pen.amount, Money::zero());
        assert_eq!(rows[2].pen.difference, Money::zero());
        assert!(rows[2].pen.date.is_none());
    }

    #[test]
    fn test_purchase_display_keeps_stored_sign() {
        let op = operation(Direction::Buy, -2000, 7546);
        let rows = compute_rows(&op, "Cliente", &[], &[]).unwrap();

        assert_eq!(rows[0].expected_usd, Money::from_units(-2000));
        assert_eq!(rows[0].usd.difference, Money::from_units(2000));
    }

    #[test]
    fn test_missing_cash_flow_is_dependency_error() {
        let mut op = operation(Direction::Buy, 100, 370);
        op.cash_flow = None;

        let err = compute_rows(&op, "Cliente", &[], &[]).unwrap_err();
        assert!(matches!(err, CuadreError::MissingDependency { .. }));
        assert_eq!(err.status_code(), 409);
    }
}
