//! Chroma Relay REST API
//!
//! This crate provides the Axum-based HTTP API that relays browser
//! requests to ChromaDB and attaches cross-origin headers to every response.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
