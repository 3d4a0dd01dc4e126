//! Issue the same logical request over REST, GraphQL or gRPC-Web and get back
//! one uniform result: round-trip latency, payload size and the decoded payload.
//!
//! # Usage
//!
//! ```no_run
//! use apibench_core::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), BenchError> {
//! let dispatcher = Dispatcher::from_config(BenchConfig::from_env()?)?;
//!
//! let result = dispatcher.fetch_service("GraphQL", "text", "small").await?;
//! println!("{}", result.report());
//!
//! let media = dispatcher.fetch_service("gRPC-Web", "media", "image").await?;
//! if let Some(handle) = media.payload.into_media() {
//!     let bytes = handle.release();
//!     println!("{} bytes", bytes.map(|b| b.len()).unwrap_or(0));
//! }
//! # Ok(())
//! # }
//! ```

/// Transport adapters (REST, GraphQL, gRPC-Web).
pub mod adapters;
/// Byte counting, base64 repair and MIME selection.
pub mod codec;
/// Endpoint configuration.
pub mod config;
/// Result envelope and payload types.
pub mod content;
/// Entry point routing requests to adapters.
pub mod dispatcher;
/// Report formatting.
pub mod envelope;
/// Public error type.
pub mod errors;
/// HTTP client seam.
pub mod http;
/// Media handles with explicit release.
pub mod media;
/// Transport, service and request identifiers.
pub mod model;
/// Logging setup for binaries.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;

pub use config::{BenchConfig, GraphQlDialect};
pub use content::{BlogDigest, BlogPost, Payload, ResultEnvelope};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use envelope::format_envelope;
pub use errors::BenchError;
pub use http::{HttpClient, HttpResponse, ReqwestHttpClient};
pub use media::{MediaHandle, MediaStore};
pub use model::{MediaType, RequestSpec, Selector, ServiceKind, TextSize, TransportKind};
