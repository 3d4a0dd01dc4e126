//! REST adapter: `GET /{service}/{size}` and `GET /api/blog`.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::elapsed_ms;
use crate::codec::resolve_mime;
use crate::content::{BlogDigest, BlogPost, Payload, ResultEnvelope};
use crate::errors::BenchError;
use crate::http::{HttpClient, HttpResponse};
use crate::media::MediaStore;
use crate::model::{RequestSpec, Selector, TransportKind};

/// Fetches each service with a plain GET against the REST base URL.
pub struct RestAdapter {
    http: Arc<dyn HttpClient>,
    base_url: String,
    media: MediaStore,
}

impl RestAdapter {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>, media: MediaStore) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            media,
        }
    }

    /// Path for a validated selector.
    pub fn route(selector: Selector) -> String {
        match selector {
            Selector::Text(size) => format!("/text/{}", size.as_str()),
            Selector::Media(media) => format!("/media/{}", media.as_str()),
            Selector::Blog => "/api/blog".to_string(),
        }
    }

    /// Validates `spec`, times the GET and decodes the body for its service.
    pub async fn fetch(&self, spec: &RequestSpec) -> Result<ResultEnvelope, BenchError> {
        let selector = spec.selector()?;
        let url = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            Self::route(selector)
        );
        debug!(event = "rest.request_started", domain = "rest", url = %url);

        let start = Instant::now();
        let response = self.http.get(&url).await?;
        let elapsed_ms = elapsed_ms(start);

        let response = response.ensure_success(&url)?;
        let payload = self.decode(selector, response)?;
        let envelope = ResultEnvelope::new(TransportKind::Rest, elapsed_ms, payload);
        info!(
            event = "rest.request_completed",
            domain = "rest",
            service = %spec.service,
            elapsed_ms = envelope.elapsed_ms,
            payload_bytes = envelope.payload_bytes
        );
        Ok(envelope)
    }

    fn decode(&self, selector: Selector, response: HttpResponse) -> Result<Payload, BenchError> {
        match selector {
            Selector::Text(_) => {
                let json = response.json()?;
                let content = json
                    .get("content")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| BenchError::protocol("text response has no `content` string"))?;
                Ok(Payload::Text(content.to_string()))
            }
            Selector::Blog => {
                let posts: Vec<BlogPost> = serde_json::from_slice(&response.body)?;
                Ok(Payload::Blog(BlogDigest::new(posts)))
            }
            Selector::Media(media) => {
                let mime = resolve_mime(response.content_type(), media);
                Ok(Payload::Media(self.media.wrap_media(response.body, mime)))
            }
        }
    }
}
