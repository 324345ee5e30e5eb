//! Customer repository for JSON storage
//!
//! Manages loading and saving customers to customers.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::CuadreError;
use crate::models::{Customer, CustomerId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct CustomerData {
    customers: Vec<Customer>,
}

/// Repository for customer persistence
pub struct CustomerRepository {
    path: PathBuf,
    data: RwLock<HashMap<CustomerId, Customer>>,
    /// Index: normalized document -> customer_id
    by_document: RwLock<HashMap<String, CustomerId>>,
}

fn normalize_document(document: &str) -> String {
    document.trim().to_uppercase()
}

impl CustomerRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_document: RwLock::new(HashMap::new()),
        }
    }

    /// Load customers from disk and rebuild the document index
    pub fn load(&self) -> Result<(), CuadreError> {
        let file_data: CustomerData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_document = self
            .by_document
            .write()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_document.clear();

        for customer in file_data.customers {
            if !customer.document.trim().is_empty() {
                by_document.insert(normalize_document(&customer.document), customer.id);
            }
            data.insert(customer.id, customer);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), CuadreError> {
        let data = self
            .data
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut customers: Vec<_> = data.values().cloned().collect();
        customers.sort_by_key(|c| c.display_name().to_lowercase());

        write_json_atomic(&self.path, &CustomerData { customers })
    }

    pub fn get(&self, id: CustomerId) -> Result<Option<Customer>, CuadreError> {
        let data = self
            .data
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// All customers keyed by id, for joins during listing and export
    pub fn get_all_map(&self) -> Result<HashMap<CustomerId, Customer>, CuadreError> {
        let data = self
            .data
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.clone())
    }

    pub fn find_by_document(&self, document: &str) -> Result<Option<Customer>, CuadreError> {
        let data = self
            .data
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_document = self
            .by_document
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(by_document
            .get(&normalize_document(document))
            .and_then(|id| data.get(id).cloned()))
    }

    pub fn upsert(&self, customer: Customer) -> Result<(), CuadreError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_document = self
            .by_document
            .write()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(old) = data.get(&customer.id) {
            by_document.remove(&normalize_document(&old.document));
        }
        if !customer.document.trim().is_empty() {
            by_document.insert(normalize_document(&customer.document), customer.id);
        }

        data.insert(customer.id, customer);
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
