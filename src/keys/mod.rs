//! Scraper API key rotation
//!
//! Keys are handed out by least usage and rotated away from on repeated
//! failures. Monthly reset and sync read the real remaining credits from the
//! provider through a [`CreditSource`].

pub mod credits;
pub mod registry;

pub use credits::{CreditSource, ScraperApiClient};
pub use registry::{KeyRegistry, KeyStatus, KeyStatusLine};
