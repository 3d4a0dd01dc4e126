use crate::model::ServiceKind;

/// Errors returned by the dispatcher and the transport adapters.
///
/// No variant is retried inside the crate; callers decide what to do with a
/// failed outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BenchError {
    /// Transport name is not one of REST, GraphQL or gRPC-Web.
    #[error("unknown API type: {transport}")]
    UnknownTransport { transport: String },
    /// Service name is not one of text, blog or media.
    #[error("unknown service: {service}")]
    UnknownService { service: String },
    /// Text size outside small/medium/large.
    #[error("invalid text size: {size}")]
    InvalidTextSize { size: String },
    /// Media type outside image/audio/video.
    #[error("invalid media type: {media_type}")]
    InvalidMediaType { media_type: String },
    /// Backend answered with a non-success HTTP status.
    #[error("request to {url} failed with status {status}")]
    HttpError { status: u16, url: String },
    /// GraphQL response carried a non-empty `errors` array.
    #[error("GraphQL error: {}", messages.join("; "))]
    GraphQlError { messages: Vec<String> },
    /// gRPC-Web reply ended with a non-zero `grpc-status`.
    #[error("gRPC status {code}: {message}")]
    RpcStatus { code: u32, message: String },
    /// Binary payload could not be decoded.
    #[error("media decode error: {0}")]
    MediaDecode(String),
    /// A reply did not match the service it was routed for.
    #[error("unreachable: no decode path for service {service}")]
    UnreachableServiceKind { service: ServiceKind },
    /// Connection or body read failed.
    #[error("transport error: {0}")]
    Transport(String),
    /// Response body did not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl BenchError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// True for errors raised by input validation, before any request is sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownTransport { .. }
                | Self::UnknownService { .. }
                | Self::InvalidTextSize { .. }
                | Self::InvalidMediaType { .. }
        )
    }

    /// Short stable code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownTransport { .. } => "unknown_transport",
            Self::UnknownService { .. } => "unknown_service",
            Self::InvalidTextSize { .. } => "invalid_text_size",
            Self::InvalidMediaType { .. } => "invalid_media_type",
            Self::HttpError { .. } => "http_error",
            Self::GraphQlError { .. } => "graphql_error",
            Self::RpcStatus { .. } => "rpc_status",
            Self::MediaDecode(_) => "media_decode",
            Self::UnreachableServiceKind { .. } => "unreachable_service_kind",
            Self::Transport(_) => "transport",
            Self::Protocol(_) => "protocol",
            Self::Config(_) => "config",
        }
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(value: serde_json::Error) -> Self {
        BenchError::Protocol(format!("invalid JSON body: {value}"))
    }
}

impl From<prost::DecodeError> for BenchError {
    fn from(value: prost::DecodeError) -> Self {
        BenchError::Protocol(format!("invalid protobuf message: {value}"))
    }
}
