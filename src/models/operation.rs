//! Operation model
//!
//! One currency-exchange trade with its cash-flow record. Operations come
//! from the trade-entry process and are read-only here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CustomerId, OperationId};
use super::money::Money;

/// Which side of the trade the business took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// The business bought dollars (COMPRA)
    #[serde(alias = "COMPRA")]
    Buy,
    /// The business sold dollars (VENTA)
    #[serde(alias = "VENTA")]
    Sell,
}

impl Direction {
    /// Parse a direction, accepting English and Spanish spellings
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUY" | "COMPRA" => Some(Self::Buy),
            "SELL" | "VENTA" => Some(Self::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => f.pad("BUY"),
            Self::Sell => f.pad("SELL"),
        }
    }
}

/// Expected settlement amounts of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlow {
    /// Local-currency amount the trade should move
    pub pen_amount: Money,

    /// Dollar amount recorded on the cash-flow side
    pub usd_amount: Money,
}

impl CashFlow {
    pub fn new(pen_amount: Money, usd_amount: Money) -> Self {
        Self {
            pen_amount,
            usd_amount,
        }
    }
}

/// A currency-exchange trade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,

    /// Business sequence number shown on every report
    pub number: u64,

    /// Trade date
    pub date: NaiveDate,

    pub direction: Direction,

    /// Expected foreign-currency amount, as entered on the trade
    pub dollars: Money,

    /// Cash-flow record; absent on malformed legacy trades
    #[serde(default)]
    pub cash_flow: Option<CashFlow>,

    pub customer_id: CustomerId,

    pub created_at: DateTime<Utc>,
}

impl Operation {
    pub fn new(
        number: u64,
        date: NaiveDate,
        direction: Direction,
        dollars: Money,
        customer_id: CustomerId,
    ) -> Self {
        Self {
            id: OperationId::new(),
            number,
            date,
            direction,
            dollars,
            cash_flow: None,
            customer_id,
            created_at: Utc::now(),
        }
    }

    /// Attach the cash-flow record
    pub fn with_cash_flow(mut self, cash_flow: CashFlow) -> Self {
        self.cash_flow = Some(cash_flow);
        self
    }

    /// Baseline the first report row is measured against
    ///
    /// A SELL negates the stored amount; a BUY takes its absolute value.
    pub fn expected_usd(&self) -> Money {
        match self.direction {
            Direction::Sell => -self.dollars,
            Direction::Buy => self.dollars.abs(),
        }
    }

    /// Value printed in the report's dollar column on the first row
    pub fn expected_usd_display(&self) -> Money {
        match self.direction {
            Direction::Buy => self.dollars,
            Direction::Sell => -self.dollars,
        }
    }

    /// Label used in listings ("#13157")
    pub fn label(&self) -> String {
        format!("#{}", self.number)
    }
}
