//! Chroma Relay Upstream Client
//!
//! This crate provides the client for communicating with an upstream
//! ChromaDB server over its HTTP API.

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::ChromaApi;
pub use client::{ChromaClient, ChromaClientConfig};
pub use error::ClientError;
pub use types::{Collection, GetRequest, GetResult, Include, Metadata, QueryRequest, QueryResult};
