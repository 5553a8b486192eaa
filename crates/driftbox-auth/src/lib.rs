//! # driftbox-auth
//!
//! Account management and stateless JWT access tokens for Driftbox.

pub mod claims;
pub mod password;
pub mod service;
pub mod token;

pub use claims::Claims;
pub use password::PasswordHasher;
pub use service::{AuthService, Session};
pub use token::{IssuedToken, TokenIssuer};
