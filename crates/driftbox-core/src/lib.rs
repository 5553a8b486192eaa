//! # driftbox-core
//!
//! Core crate for Driftbox. Contains configuration schemas, the
//! pagination/sorting/list-query types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Driftbox crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
