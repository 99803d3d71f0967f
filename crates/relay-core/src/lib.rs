//! Chroma Relay Core
//!
//! This crate provides the relay logic: the registry of upstream client
//! handles, the result records returned to browsers, and the service
//! implementing each relay operation.

pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod service;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::UpstreamSettings;
pub use error::{CoreError, ErrorKind};
pub use models::{
    CollectionDescriptor, DocumentRecord, HeartbeatStatus, SearchRequest, SearchResult,
};
pub use registry::{ClientFactory, ClientHandle, ConnectionRegistry, HttpClientFactory, UpstreamTarget};
pub use service::{RelayService, UpstreamAddress};
