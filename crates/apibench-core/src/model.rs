use std::fmt;
use std::str::FromStr;

use crate::errors::BenchError;

/// Wire protocol used to reach the backend.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TransportKind {
    Rest,
    GraphQl,
    BinaryRpc,
}

impl TransportKind {
    /// Every transport, in the order they are usually compared.
    pub const ALL: [TransportKind; 3] = [Self::Rest, Self::GraphQl, Self::BinaryRpc];

    /// Returns the display name used in reports and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rest => "REST",
            Self::GraphQl => "GraphQL",
            Self::BinaryRpc => "gRPC-Web",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = BenchError;

    /// Accepts the names shown to users plus a few common aliases, ignoring case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "graphql" | "gql" => Ok(Self::GraphQl),
            "grpc-web" | "grpcweb" | "grpc" | "binaryrpc" | "binary-rpc" | "rpc" => {
                Ok(Self::BinaryRpc)
            }
            _ => Err(BenchError::UnknownTransport {
                transport: value.to_string(),
            }),
        }
    }
}

/// Kind of data requested from the backend.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ServiceKind {
    Text,
    Blog,
    Media,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [Self::Text, Self::Blog, Self::Media];

    /// Lower-case name, also used as the REST path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Blog => "blog",
            Self::Media => "media",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = BenchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "blog" => Ok(Self::Blog),
            "media" => Ok(Self::Media),
            _ => Err(BenchError::UnknownService {
                service: value.to_string(),
            }),
        }
    }
}

/// Size of a text payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TextSize {
    Small,
    Medium,
    Large,
}

impl TextSize {
    pub const ALL: [TextSize; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Lower-case name; doubles as the REST segment and GraphQL field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl FromStr for TextSize {
    type Err = BenchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(BenchError::InvalidTextSize {
                size: value.to_string(),
            }),
        }
    }
}

/// Kind of binary media payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MediaType {
    Image,
    Audio,
    Video,
}

impl MediaType {
    pub const ALL: [MediaType; 3] = [Self::Image, Self::Audio, Self::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl FromStr for MediaType {
    type Err = BenchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            _ => Err(BenchError::InvalidMediaType {
                media_type: value.to_string(),
            }),
        }
    }
}

/// Validated view of `(service, size-or-type)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Selector {
    Text(TextSize),
    Media(MediaType),
    Blog,
}

impl Selector {
    pub fn service(&self) -> ServiceKind {
        match self {
            Self::Text(_) => ServiceKind::Text,
            Self::Media(_) => ServiceKind::Media,
            Self::Blog => ServiceKind::Blog,
        }
    }

    /// Every valid selector: three text sizes, three media types, and blog.
    pub fn all() -> Vec<Selector> {
        let mut out: Vec<Selector> = TextSize::ALL.into_iter().map(Self::Text).collect();
        out.extend(MediaType::ALL.into_iter().map(Self::Media));
        out.push(Self::Blog);
        out
    }
}

/// One logical request: transport, service and the raw size/type discriminator.
///
/// The discriminator stays a string until an adapter asks for it so each
/// adapter reports the same validation errors before touching the network.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RequestSpec {
    pub transport: TransportKind,
    pub service: ServiceKind,
    pub size: Option<String>,
}

impl RequestSpec {
    pub fn new(transport: TransportKind, service: ServiceKind, size: Option<&str>) -> Self {
        Self {
            transport,
            service,
            size: size.map(|s| s.trim().to_ascii_lowercase()),
        }
    }

    /// Builds a spec from an already validated selector.
    pub fn from_selector(transport: TransportKind, selector: Selector) -> Self {
        let size = match selector {
            Selector::Text(size) => Some(size.as_str()),
            Selector::Media(media) => Some(media.as_str()),
            Selector::Blog => None,
        };
        Self::new(transport, selector.service(), size)
    }

    /// Validates the size/type against the service's domain.
    pub fn selector(&self) -> Result<Selector, BenchError> {
        let raw = self.size.as_deref().unwrap_or("");
        match self.service {
            ServiceKind::Text => Ok(Selector::Text(raw.parse()?)),
            ServiceKind::Media => Ok(Selector::Media(raw.parse()?)),
            ServiceKind::Blog => Ok(Selector::Blog),
        }
    }
}

impl fmt::Display for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.size {
            Some(size) if self.service != ServiceKind::Blog => {
                write!(f, "{} {} ({})", self.transport, self.service, size)
            }
            _ => write!(f, "{} {}", self.transport, self.service),
        }
    }
}
