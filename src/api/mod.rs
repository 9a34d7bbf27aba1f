//! API gateway: the HTTP client and its error taxonomy.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthResponse};
pub use error::ApiError;
