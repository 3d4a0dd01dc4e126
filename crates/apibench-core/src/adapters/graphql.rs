//! GraphQL adapter: one `POST {query}` per request.
//!
//! Two server schemas are in the wild. The configured [`GraphQlDialect`] picks
//! the query text; decoding looks at the response shape so either server's
//! answer is understood:
//!
//! - blog posts under `posts` or `blog`
//! - media as a URL-safe base64 string, a byte array, or `{ url }` that needs
//!   a second GET

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info};

use super::elapsed_ms;
use crate::codec::{decode_base64_url, decode_byte_array, mime_for_media, resolve_mime};
use crate::config::GraphQlDialect;
use crate::content::{BlogDigest, BlogPost, Payload, ResultEnvelope};
use crate::errors::BenchError;
use crate::http::HttpClient;
use crate::media::MediaStore;
use crate::model::{MediaType, RequestSpec, Selector, TransportKind};

const POSTS_SELECTION: &str = "posts {
    id
    title
    author { name email }
    sections { heading body }
    media { imageUrl audioUrl videoUrl }
    metadata { tags wordCount }
    publishedAt
  }";

const LEGACY_BLOG_SELECTION: &str = "blog {
    title
    author { name email }
    sections { heading body }
  }";

/// Builds the query document for a selector.
pub fn build_query(selector: Selector, dialect: GraphQlDialect) -> String {
    let selection = match (selector, dialect) {
        (Selector::Text(size), _) => format!("{} {{ content }}", size.as_str()),
        (Selector::Blog, GraphQlDialect::Posts) => POSTS_SELECTION.to_string(),
        (Selector::Blog, GraphQlDialect::Legacy) => LEGACY_BLOG_SELECTION.to_string(),
        (Selector::Media(media), GraphQlDialect::Posts) => media.as_str().to_string(),
        (Selector::Media(media), GraphQlDialect::Legacy) => format!("{} {{ url }}", media.as_str()),
    };
    format!("query {{\n  {selection}\n}}")
}

/// Fails with `GraphQlError` when the body has a non-empty `errors` array.
fn check_errors(body: &Value) -> Result<(), BenchError> {
    let Some(errors) = body.get("errors").and_then(Value::as_array) else {
        return Ok(());
    };
    if errors.is_empty() {
        return Ok(());
    }
    let messages = errors
        .iter()
        .map(|e| {
            e.get("message")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| e.to_string())
        })
        .collect();
    Err(BenchError::GraphQlError { messages })
}

/// Media payload as found in `data.<type>`.
enum MediaField {
    Inline(Vec<u8>),
    Remote(String),
}

fn media_field(data: &Value, media: MediaType) -> Result<MediaField, BenchError> {
    match data.get(media.as_str()) {
        Some(Value::String(encoded)) => Ok(MediaField::Inline(decode_base64_url(encoded)?)),
        Some(Value::Array(items)) => Ok(MediaField::Inline(decode_byte_array(items)?)),
        Some(Value::Object(obj)) => match obj.get("url").and_then(Value::as_str) {
            Some(url) => Ok(MediaField::Remote(url.to_string())),
            None => Err(BenchError::MediaDecode(
                "media object has no `url` field".into(),
            )),
        },
        _ => Err(BenchError::MediaDecode(
            "unexpected media payload format".into(),
        )),
    }
}

/// Fetches text, blog and media through a single GraphQL endpoint.
pub struct GraphQlAdapter {
    http: Arc<dyn HttpClient>,
    endpoint: String,
    dialect: GraphQlDialect,
    media: MediaStore,
}

impl GraphQlAdapter {
    pub fn new(
        http: Arc<dyn HttpClient>,
        endpoint: impl Into<String>,
        dialect: GraphQlDialect,
        media: MediaStore,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            dialect,
            media,
        }
    }

    /// Validates `spec`, POSTs the query and decodes `data` into a payload.
    ///
    /// A `{ url }` media answer adds the follow-up GET to `elapsed_ms`.
    pub async fn fetch(&self, spec: &RequestSpec) -> Result<ResultEnvelope, BenchError> {
        let selector = spec.selector()?;
        let query = build_query(selector, self.dialect);
        let body = serde_json::json!({ "query": query }).to_string();
        debug!(event = "graphql.request_started", domain = "graphql", endpoint = %self.endpoint);

        let start = Instant::now();
        let response = self
            .http
            .post(&self.endpoint, "application/json", &[], Bytes::from(body))
            .await?;
        let mut elapsed_ms = elapsed_ms(start);

        let response = response.ensure_success(&self.endpoint)?;
        let json = response.json()?;
        check_errors(&json)?;
        let data = json
            .get("data")
            .filter(|d| !d.is_null())
            .ok_or_else(|| BenchError::protocol("GraphQL response has no `data`"))?;

        let payload = match selector {
            Selector::Text(size) => {
                let content = data
                    .get(size.as_str())
                    .and_then(|v| v.get("content"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        BenchError::protocol(format!("missing `{}.content`", size.as_str()))
                    })?;
                Payload::Text(content.to_string())
            }
            Selector::Blog => {
                let posts = data
                    .get("posts")
                    .or_else(|| data.get("blog"))
                    .cloned()
                    .ok_or_else(|| BenchError::protocol("missing `posts` or `blog` field"))?;
                let posts: Vec<BlogPost> = serde_json::from_value(posts)?;
                Payload::Blog(BlogDigest::new(posts))
            }
            Selector::Media(media) => match media_field(data, media)? {
                MediaField::Inline(bytes) => {
                    Payload::Media(self.media.wrap_media(bytes, mime_for_media(media)))
                }
                MediaField::Remote(url) => {
                    let url = self.resolve_url(&url)?;
                    let start = Instant::now();
                    let fetched = self.http.get(&url).await?;
                    elapsed_ms += super::elapsed_ms(start);
                    let fetched = fetched.ensure_success(&url)?;
                    let mime = resolve_mime(fetched.content_type(), media);
                    Payload::Media(self.media.wrap_media(fetched.body, mime))
                }
            },
        };

        let envelope = ResultEnvelope::new(TransportKind::GraphQl, elapsed_ms, payload);
        info!(
            event = "graphql.request_completed",
            domain = "graphql",
            service = %spec.service,
            elapsed_ms = envelope.elapsed_ms,
            payload_bytes = envelope.payload_bytes
        );
        Ok(envelope)
    }

    /// Resolves a media URL against the GraphQL endpoint.
    fn resolve_url(&self, url: &str) -> Result<String, BenchError> {
        let base = Url::parse(&self.endpoint)
            .map_err(|e| BenchError::Config(format!("invalid GraphQL endpoint: {e}")))?;
        base.join(url)
            .map(String::from)
            .map_err(|e| BenchError::MediaDecode(format!("invalid media url {url}: {e}")))
    }
}
