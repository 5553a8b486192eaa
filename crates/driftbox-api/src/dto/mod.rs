//! Request and response payload types.

pub mod request;
pub mod response;
