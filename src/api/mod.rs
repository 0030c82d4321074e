//! Backend API collaborators
//!
//! One boundary module owns the response-envelope convention; everything
//! above it works with decoded records and typed errors.

pub mod client;
pub mod envelope;
pub mod errors;

#[cfg(test)]
pub mod mock;

pub use client::{ApiClient, HttpApiClient};
pub use errors::ApiError;
