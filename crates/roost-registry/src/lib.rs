//! REST client for the Roost module registry.
//!
//! Covers the three endpoints the CLI talks to: module metadata lookup,
//! module publishing, and file piece upload.

pub mod api;
pub mod client;

// Re-export main types
pub use api::{Module, PiecesResponse, PublishRequest, PublishResponse};
pub use client::{RegistryClient, RetryConfig};
