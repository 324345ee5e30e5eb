//! Operation service
//!
//! Lookup and paginated listing of operations with their reconciliation
//! status. Listing never mutates stored entries; totals are computed into
//! `OperationSummary`.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{CuadreError, CuadreResult};
use crate::models::{Currency, Customer, Direction, Money, Operation, OperationId};
use crate::storage::Storage;

/// Service for operation lookup and listing
pub struct OperationService<'a> {
    storage: &'a Storage,
}

/// Filters accepted by [`OperationService::list`]
#[derive(Debug, Clone, Default)]
pub struct OperationFilter {
    /// Case-insensitive substring over the customer's names, documents and email
    pub search: Option<String>,
    /// Substring of the customer type
    pub customer_type: Option<String>,
    pub direction: Option<Direction>,
    /// Month name (Spanish or English) within the current year
    pub month: Option<String>,
}

/// An operation with its derived reconciliation status
#[derive(Debug, Clone, Serialize)]
pub struct OperationSummary {
    pub operation: Operation,
    pub customer_name: String,
    pub has_record: bool,
    /// At least one USD entry exists
    pub usd_complete: bool,
    /// At least one PEN entry exists
    pub pen_complete: bool,
    /// Neither currency has an entry yet
    pub incomplete: bool,
    pub usd_total: Money,
    pub pen_total: Money,
    pub usd_entries: usize,
    pub pen_entries: usize,
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of items matching the filter across all pages
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

const MONTHS: [(&str, &str); 12] = [
    ("enero", "january"),
    ("febrero", "february"),
    ("marzo", "march"),
    ("abril", "april"),
    ("mayo", "may"),
    ("junio", "june"),
    ("julio", "july"),
    ("agosto", "august"),
    ("septiembre", "september"),
    ("octubre", "october"),
    ("noviembre", "november"),
    ("diciembre", "december"),
];

/// First and last day of the named month in `year`
///
/// Returns `None` for names that are not months.
pub fn month_range(name: &str, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let mut wanted = name.trim().to_lowercase();
    if wanted == "setiembre" {
        wanted = "septiembre".to_string();
    }
    let index = MONTHS
        .iter()
        .position(|(es, en)| *es == wanted || *en == wanted)?;
    let month = index as u32 + 1;

    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next.pred_opt()?))
}

impl<'a> OperationService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn get(&self, id: OperationId) -> CuadreResult<Option<Operation>> {
        self.storage.operations.get(id)
    }

    /// Find an operation by sequence number ("13157", "#13157") or id
    pub fn find(&self, identifier: &str) -> CuadreResult<Option<Operation>> {
        let trimmed = identifier.trim().trim_start_matches('#');

        if let Ok(number) = trimmed.parse::<u64>() {
            return self.storage.operations.get_by_number(number);
        }

        if let Ok(id) = trimmed.parse::<OperationId>() {
            return self.storage.operations.get(id);
        }

        Ok(None)
    }

    /// Like [`find`](Self::find) but failing with `NotFound`
    pub fn require(&self, identifier: &str) -> CuadreResult<Operation> {
        self.find(identifier)?
            .ok_or_else(|| CuadreError::operation_not_found(identifier))
    }

    /// Paginated listing, newest first
    ///
    /// `today` anchors the month filter to the current year.
    pub fn list(
        &self,
        filter: &OperationFilter,
        page: usize,
        limit: usize,
        today: NaiveDate,
    ) -> CuadreResult<Page<OperationSummary>> {
        if page == 0 {
            return Err(CuadreError::Validation("page must be at least 1".into()));
        }
        if limit == 0 {
            return Err(CuadreError::Validation("limit must be at least 1".into()));
        }

        let customers = self.storage.customers.get_all_map()?;
        let range = filter
            .month
            .as_deref()
            .and_then(|m| month_range(m, today.year()));

        let matching: Vec<(Operation, Option<&Customer>)> = self
            .storage
            .operations
            .get_all()?
            .into_iter()
            .map(|op| {
                let customer = customers.get(&op.customer_id);
                (op, customer)
            })
            .filter(|(op, customer)| {
                if let Some(direction) = filter.direction {
                    if op.direction != direction {
                        return false;
                    }
                }
                if let Some((start, end)) = range {
                    if op.date < start || op.date > end {
                        return false;
                    }
                }
                let search = filter.search.as_deref().unwrap_or("");
                let kind = filter.customer_type.as_deref().unwrap_or("");
                match customer {
                    Some(c) => c.matches_search(search) && c.matches_type(kind),
                    None => search.trim().is_empty() && kind.trim().is_empty(),
                }
            })
            .collect();

        let total = matching.len();
        let items = matching
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .map(|(op, customer)| self.summarize(op, customer))
            .collect::<CuadreResult<Vec<_>>>()?;

        Ok(Page {
            items,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        })
    }

    /// Reconciliation status of a single operation
    pub fn summary(&self, operation: Operation) -> CuadreResult<OperationSummary> {
        let customer = self.storage.customers.get(operation.customer_id)?;
        self.summarize(operation, customer.as_ref())
    }

    fn summarize(
        &self,
        operation: Operation,
        customer: Option<&Customer>,
    ) -> CuadreResult<OperationSummary> {
        let record = self
            .storage
            .reconciliations
            .get_record_by_operation(operation.id)?;

        let (usd, pen) = match &record {
            Some(r) => (
                self.storage.reconciliations.entries_for(r.id, Currency::Usd)?,
                self.storage.reconciliations.entries_for(r.id, Currency::Pen)?,
            ),
            None => (Vec::new(), Vec::new()),
        };

        let usd_complete = !usd.is_empty();
        let pen_complete = !pen.is_empty();

        Ok(OperationSummary {
            customer_name: customer.map(|c| c.display_name()).unwrap_or_default(),
            has_record: record.is_some(),
            usd_complete,
            pen_complete,
            incomplete: !(usd_complete || pen_complete),
            usd_total: usd.iter().map(|e| e.amount).sum(),
            pen_total: pen.iter().map(|e| e.amount).sum(),
            usd_entries: usd.len(),
            pen_entries: pen.len(),
            operation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CuadrePaths;
    use crate::models::{CashFlow, EntryFields, ReconciliationEntry};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CuadrePaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn add_operation(
        storage: &Storage,
        number: u64,
        date: NaiveDate,
        direction: Direction,
        customer: &Customer,
    ) -> Operation {
        let op = Operation::new(number, date, direction, Money::from_units(100), customer.id)
            .with_cash_flow(CashFlow::new(Money::from_units(370), Money::from_units(100)));
        storage.operations.upsert(op.clone()).unwrap();
        op
    }

    fn seed(storage: &Storage, count: u64) -> Customer {
        let customer = Customer {
            paternal_surname: "Huamán".into(),
            given_names: "Rosa".into(),
            email: "rosa@correo.pe".into(),
            document: "40404040".into(),
            customer_type: "persona".into(),
            ..Customer::new("", "40404040")
        };
        storage.customers.upsert(customer.clone()).unwrap();
        for n in 1..=count {
            let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Duration::days(n as i64);
            add_operation(storage, n, date, Direction::Buy, &customer);
        }
        customer
    }

    #[test]
    fn test_pagination() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage, 25);
        let service = OperationService::new(&storage);

        let page = service
            .list(&OperationFilter::default(), 2, 10, today())
            .unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        // Newest first: page 2 starts at the 11th newest
        assert_eq!(page.items[0].operation.number, 15);

        let last = service
            .list(&OperationFilter::default(), 3, 10, today())
            .unwrap();
        assert_eq!(last.items.len(), 5);
    }

    #[test]
    fn test_invalid_paging_is_validation_error() {
        let (_temp_dir, storage) = create_test_storage();
        let service = OperationService::new(&storage);

        let err = service
            .list(&OperationFilter::default(), 0, 10, today())
            .unwrap_err();
        assert!(err.is_validation());
        assert!(service
            .list(&OperationFilter::default(), 1, 0, today())
            .is_err());
    }

    #[test]
    fn test_search_and_customer_type_filters() {
        let (_temp_dir, storage) = create_test_storage();
        let rosa = seed(&storage, 2);
        let company = Customer {
            customer_type: "empresa".into(),
            ..Customer::new("Minera Norte SAC", "20100100100")
        };
        storage.customers.upsert(company.clone()).unwrap();
        add_operation(
            &storage,
            50,
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            Direction::Sell,
            &company,
        );
        let service = OperationService::new(&storage);

        let by_name = OperationFilter {
            search: Some("HUAMÁN".into()),
            ..Default::default()
        };
        let page = service.list(&by_name, 1, 10, today()).unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|s| s.operation.customer_id == rosa.id));

        let by_email = OperationFilter {
            search: Some("correo.pe".into()),
            ..Default::default()
        };
        assert_eq!(service.list(&by_email, 1, 10, today()).unwrap().total, 2);

        let by_type = OperationFilter {
            customer_type: Some("empr".into()),
            ..Default::default()
        };
        let page = service.list(&by_type, 1, 10, today()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].customer_name, "Minera Norte SAC");

        let sells = OperationFilter {
            direction: Some(Direction::Sell),
            ..Default::default()
        };
        assert_eq!(service.list(&sells, 1, 10, today()).unwrap().total, 1);
    }

    #[test]
    fn test_month_filter_uses_current_year() {
        let (_temp_dir, storage) = create_test_storage();
        let customer = seed(&storage, 0);
        add_operation(
            &storage,
            1,
            NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
            Direction::Buy,
            &customer,
        );
        add_operation(
            &storage,
            2,
            NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(),
            Direction::Buy,
            &customer,
        );
        add_operation(
            &storage,
            3,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            Direction::Buy,
            &customer,
        );
        let service = OperationService::new(&storage);

        let febrero = OperationFilter {
            month: Some("Febrero".into()),
            ..Default::default()
        };
        let page = service.list(&febrero, 1, 10, today()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].operation.number, 1);

        let unknown = OperationFilter {
            month: Some("brumario".into()),
            ..Default::default()
        };
        assert_eq!(service.list(&unknown, 1, 10, today()).unwrap().total, 3);
    }

    #[test]
    fn test_month_range_bounds() {
        let (start, end) = month_range("febrero", 2024).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (_, end) = month_range("December", 2025).unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert!(month_range("", 2025).is_none());
    }

    #[test]
    fn test_summary_totals_do_not_touch_entries() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage, 1);
        let op = storage.operations.get_by_number(1).unwrap().unwrap();
        let (record, _) = storage.reconciliations.upsert_record(op.id).unwrap();
        for amount in [60, 40] {
            storage
                .reconciliations
                .insert_entry(ReconciliationEntry::new(
                    record.id,
                    Currency::Usd,
                    EntryFields {
                        date: op.date,
                        description: String::new(),
                        amount: Money::from_units(amount),
                        reference: String::new(),
                        difference: Money::zero(),
                    },
                ))
                .unwrap();
        }
        let service = OperationService::new(&storage);

        let page = service
            .list(&OperationFilter::default(), 1, 10, today())
            .unwrap();
        let summary = &page.items[0];
        assert_eq!(summary.customer_name, "Huamán Rosa");
        assert!(summary.has_record);
        assert!(summary.usd_complete);
        assert!(!summary.pen_complete);
        assert!(!summary.incomplete);
        assert_eq!(summary.usd_total, Money::from_units(100));

        let stored = storage.reconciliations.entries_for(record.id, Currency::Usd).unwrap();
        assert_eq!(stored[0].amount, Money::from_units(60));
    }

    #[test]
    fn test_find_by_number_or_id() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage, 1);
        let service = OperationService::new(&storage);
        let op = storage.operations.get_by_number(1).unwrap().unwrap();

        assert_eq!(service.find("#1").unwrap().unwrap().id, op.id);
        assert_eq!(service.find(&op.id.to_string()).unwrap().unwrap().id, op.id);
        assert!(service.require("999").unwrap_err().is_not_found());
    }
}
