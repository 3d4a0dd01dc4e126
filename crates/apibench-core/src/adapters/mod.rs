//! One adapter per transport. Each turns a [`RequestSpec`](crate::model::RequestSpec)
//! into a [`ResultEnvelope`](crate::content::ResultEnvelope) with the same payload
//! shape; the dispatcher picks one by [`TransportKind`](crate::model::TransportKind).

pub mod graphql;
pub mod rest;
pub mod rpc;

use std::time::Instant;

pub use graphql::GraphQlAdapter;
pub use rest::RestAdapter;
pub use rpc::{RpcAdapter, RpcClients};

/// Milliseconds since `start`, with sub-millisecond precision.
pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1_000.0
}
