//! Common imports for typical usage.
pub use crate::{
    BenchConfig, BenchError, BlogDigest, Dispatcher, GraphQlDialect, MediaHandle, MediaStore,
    MediaType, Payload, RequestSpec, ResultEnvelope, Selector, ServiceKind, TextSize,
    TransportKind,
};
