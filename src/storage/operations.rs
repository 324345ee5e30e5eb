//! Operation repository for JSON storage
//!
//! Manages loading and saving operations to operations.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::CuadreError;
use crate::models::{Operation, OperationId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct OperationData {
    operations: Vec<Operation>,
}

/// Repository for operation persistence with a number index
pub struct OperationRepository {
    path: PathBuf,
    data: RwLock<HashMap<OperationId, Operation>>,
    /// Index: sequence number -> operation_id
    by_number: RwLock<HashMap<u64, OperationId>>,
}

impl OperationRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_number: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), CuadreError> {
        let file_data: OperationData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_number = self
            .by_number
            .write()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_number.clear();

        for op in file_data.operations {
            by_number.insert(op.number, op.id);
            data.insert(op.id, op);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), CuadreError> {
        let data = self
            .data
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut operations: Vec<_> = data.values().cloned().collect();
        operations.sort_by(|a, b| a.date.cmp(&b.date).then(a.number.cmp(&b.number)));

        write_json_atomic(&self.path, &OperationData { operations })
    }

    pub fn get(&self, id: OperationId) -> Result<Option<Operation>, CuadreError> {
        let data = self
            .data
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    pub fn get_by_number(&self, number: u64) -> Result<Option<Operation>, CuadreError> {
        let data = self
            .data
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_number = self
            .by_number
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(by_number.get(&number).and_then(|id| data.get(id).cloned()))
    }

    /// All operations, newest first (date desc, then number desc)
    pub fn get_all(&self) -> Result<Vec<Operation>, CuadreError> {
        let data = self
            .data
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut operations: Vec<_> = data.values().cloned().collect();
        operations.sort_by(|a, b| b.date.cmp(&a.date).then(b.number.cmp(&a.number)));
        Ok(operations)
    }

    /// Operations dated within `[start, end]`, newest first
    pub fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Operation>, CuadreError> {
        let all = self.get_all()?;
        Ok(all
            .into_iter()
            .filter(|op| op.date >= start && op.date <= end)
            .collect())
    }

    pub fn upsert(&self, op: Operation) -> Result<(), CuadreError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_number = self
            .by_number
            .write()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(old) = data.get(&op.id) {
            by_number.remove(&old.number);
        }
        by_number.insert(op.number, op.id);
        data.insert(op.id, op);
        Ok(())
    }

    pub fn count(&self) -> Result<usize, CuadreError> {
        let data = self
            .data
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerId, Direction, Money};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, OperationRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = OperationRepository::new(temp_dir.path().join("operations.json"));
        (temp_dir, repo)
    }

    fn op(number: u64, day: u32) -> Operation {
        Operation::new(
            number,
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            Direction::Buy,
            Money::from_units(100),
            CustomerId::new(),
        )
    }

    #[test]
    fn test_get_by_number() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let operation = op(13206, 5);
        repo.upsert(operation.clone()).unwrap();

        assert_eq!(repo.get_by_number(13206).unwrap().unwrap().id, operation.id);
        assert!(repo.get_by_number(1).unwrap().is_none());
    }

    #[test]
    fn test_get_all_newest_first() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        repo.upsert(op(1, 3)).unwrap();
        repo.upsert(op(2, 20)).unwrap();
        repo.upsert(op(3, 20)).unwrap();

        let numbers: Vec<u64> = repo.get_all().unwrap().iter().map(|o| o.number).collect();
        assert_eq!(numbers, vec![3, 2, 1]);
    }

    #[test]
    fn test_date_range() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        repo.upsert(op(1, 3)).unwrap();
        repo.upsert(op(2, 15)).unwrap();

        let found = repo
            .get_by_date_range(
                NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            )
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].number, 2);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        repo.upsert(op(14775, 9)).unwrap();
        repo.save().unwrap();

        let repo2 = OperationRepository::new(temp_dir.path().join("operations.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.count().unwrap(), 1);
        assert!(repo2.get_by_number(14775).unwrap().is_some());
    }
}
