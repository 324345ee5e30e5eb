//! cuadre - back-office reconciliation of currency-exchange operations
//!
//! Staff register USD and PEN settlement entries against trade operations,
//! review them, and export a reconciliation spreadsheet whose difference
//! columns show what is still uncovered per operation.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Operations, customers, reconciliation entries, scraper keys
//! - `storage`: JSON file storage layer
//! - `services`: Registration, listing, import and correction logic
//! - `reports`: Differential calculation and the exported report
//! - `keys`: Scraper API key rotation
//! - `audit`: Audit logging system
//!
//! # Example
//!
//! ```rust,ignore
//! use cuadre::config::{CuadrePaths, Settings};
//! use cuadre::reports::{DirectionFilter, ReconciliationReport};
//! use cuadre::storage::Storage;
//!
//! let paths = CuadrePaths::new()?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//! let report = ReconciliationReport::generate(&storage, DirectionFilter::All)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod keys;
pub mod logging;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{CuadreError, CuadreResult};
