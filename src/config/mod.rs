//! Configuration module for cuadre
//!
//! - Data directory resolution
//! - Settings persistence (paging, formats, key rotation policy)

pub mod paths;
pub mod settings;

pub use paths::CuadrePaths;
pub use settings::{KeyPolicy, Settings};
