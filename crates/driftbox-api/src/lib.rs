//! # driftbox-api
//!
//! HTTP surface of Driftbox: Axum router, handlers, extractors, and the
//! error-to-status mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
