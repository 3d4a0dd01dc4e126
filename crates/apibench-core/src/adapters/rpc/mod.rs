//! Binary RPC adapter over gRPC-Web.
//!
//! Text and media each expose one remote method per size/type, blog exposes a
//! single `GetAll`; the adapter maps a [`Selector`] onto those nine methods.

mod client;
mod framing;
pub mod proto;

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

pub use client::{BlogClient, GrpcWebChannel, MediaClient, TextClient, UnaryResponse};

use self::proto::{BlogPostsResponse, Empty, MediaResponse, TextResponse};
use super::elapsed_ms;
use crate::codec::resolve_mime;
use crate::content::{BlogDigest, Payload, ResultEnvelope};
use crate::errors::BenchError;
use crate::http::HttpClient;
use crate::media::MediaStore;
use crate::model::{MediaType, RequestSpec, Selector, TextSize, TransportKind};

/// The three service stubs, all bound to one channel.
#[derive(Clone)]
pub struct RpcClients {
    pub text: TextClient,
    pub media: MediaClient,
    pub blog: BlogClient,
}

impl RpcClients {
    pub fn connect(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let channel = GrpcWebChannel::new(http, base_url);
        Self {
            text: TextClient::new(channel.clone()),
            media: MediaClient::new(channel.clone()),
            blog: BlogClient::new(channel),
        }
    }
}

enum RpcReply {
    Text(UnaryResponse<TextResponse>),
    Media(UnaryResponse<MediaResponse>),
    Blog(UnaryResponse<BlogPostsResponse>),
}

/// Fetches each service through its gRPC-Web stub.
pub struct RpcAdapter {
    clients: RpcClients,
    media: MediaStore,
}

impl RpcAdapter {
    pub fn new(clients: RpcClients, media: MediaStore) -> Self {
        Self { clients, media }
    }

    /// Validates `spec`, times the unary call, then decodes the reply.
    pub async fn fetch(&self, spec: &RequestSpec) -> Result<ResultEnvelope, BenchError> {
        let selector = spec.selector()?;

        let start = Instant::now();
        let reply = self.call(selector).await?;
        let elapsed_ms = elapsed_ms(start);

        let payload = self.decode(selector, reply)?;
        let envelope = ResultEnvelope::new(TransportKind::BinaryRpc, elapsed_ms, payload);
        info!(
            event = "rpc.request_completed",
            domain = "rpc",
            service = %spec.service,
            elapsed_ms = envelope.elapsed_ms,
            payload_bytes = envelope.payload_bytes
        );
        Ok(envelope)
    }

    async fn call(&self, selector: Selector) -> Result<RpcReply, BenchError> {
        let req = Empty {};
        let reply = match selector {
            Selector::Text(TextSize::Small) => {
                RpcReply::Text(self.clients.text.get_small(req).await?)
            }
            Selector::Text(TextSize::Medium) => {
                RpcReply::Text(self.clients.text.get_medium(req).await?)
            }
            Selector::Text(TextSize::Large) => {
                RpcReply::Text(self.clients.text.get_large(req).await?)
            }
            Selector::Media(MediaType::Image) => {
                RpcReply::Media(self.clients.media.get_image(req).await?)
            }
            Selector::Media(MediaType::Audio) => {
                RpcReply::Media(self.clients.media.get_audio(req).await?)
            }
            Selector::Media(MediaType::Video) => {
                RpcReply::Media(self.clients.media.get_video(req).await?)
            }
            Selector::Blog => RpcReply::Blog(self.clients.blog.get_all(req).await?),
        };
        Ok(reply)
    }

    fn decode(&self, selector: Selector, reply: RpcReply) -> Result<Payload, BenchError> {
        match (selector, reply) {
            (Selector::Text(_), RpcReply::Text(reply)) => {
                Ok(Payload::Text(reply.into_message()?.content))
            }
            (Selector::Media(media), RpcReply::Media(reply)) => {
                let MediaResponse { data, content_type } = reply.into_message()?;
                let mime = resolve_mime(Some(&content_type), media);
                Ok(Payload::Media(self.media.wrap_media(data, mime)))
            }
            (Selector::Blog, RpcReply::Blog(reply)) => {
                Ok(Payload::Blog(BlogDigest::from(reply.into_message()?)))
            }
            (selector, _) => Err(BenchError::UnreachableServiceKind {
                service: selector.service(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rpc::framing::{encode_frame, encode_trailers};
    use crate::http::HttpResponse;
    use crate::http::testing::FakeHttp;
    use crate::model::ServiceKind;
    use bytes::Bytes;
    use prost::Message as _;

    fn grpc_reply(msg: &impl prost::Message) -> HttpResponse {
        let mut body = encode_frame(&msg.encode_to_vec()).to_vec();
        body.extend_from_slice(&encode_trailers(&[("grpc-status", "0")]));
        HttpResponse::new(200, Bytes::from(body))
            .with_header("content-type", "application/grpc-web+proto")
    }

    fn build(http: Arc<FakeHttp>) -> (RpcAdapter, MediaStore) {
        let store = MediaStore::new();
        let clients = RpcClients::connect(http, "http://rpc:5109/");
        (RpcAdapter::new(clients, store.clone()), store)
    }

    #[tokio::test]
    async fn text_sizes_map_to_distinct_methods() {
        for (size, method) in [
            ("small", "GetSmall"),
            ("medium", "GetMedium"),
            ("large", "GetLarge"),
        ] {
            let http = Arc::new(FakeHttp::new().respond(grpc_reply(&TextResponse {
                content: format!("{size} text"),
            })));
            let (adapter, _) = build(http.clone());
            let env = adapter
                .fetch(&RequestSpec::new(
                    TransportKind::BinaryRpc,
                    ServiceKind::Text,
                    Some(size),
                ))
                .await
                .unwrap();
            assert_eq!(env.payload.as_text(), Some(format!("{size} text").as_str()));
            assert_eq!(env.payload_bytes, format!("{size} text").len() as u64);

            let calls = http.calls();
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].url, format!("http://rpc:5109/text.Text/{method}"));
            assert_eq!(
                calls[0].content_type.as_deref(),
                Some("application/grpc-web+proto")
            );
            assert_eq!(&calls[0].body[..], &[0, 0, 0, 0, 0]);
        }
    }

    #[tokio::test]
    async fn media_reply_is_wrapped_without_base64() {
        let http = Arc::new(FakeHttp::new().respond(grpc_reply(&MediaResponse {
            data: vec![1, 2, 3, 4],
            content_type: "audio/ogg".into(),
        })));
        let (adapter, store) = build(http.clone());
        let env = adapter
            .fetch(&RequestSpec::new(
                TransportKind::BinaryRpc,
                ServiceKind::Media,
                Some("audio"),
            ))
            .await
            .unwrap();
        let handle = env.payload.as_media().unwrap();
        assert_eq!(handle.mime_type(), "audio/ogg");
        assert_eq!(handle.byte_length(), 4);
        assert_eq!(env.payload_bytes, 4);
        assert_eq!(store.live(), 1);
        assert_eq!(http.calls()[0].url, "http://rpc:5109/media.Media/GetAudio");
    }

    #[tokio::test]
    async fn media_without_content_type_uses_fixed_mapping() {
        let http = Arc::new(FakeHttp::new().respond(grpc_reply(&MediaResponse {
            data: vec![7; 10],
            content_type: String::new(),
        })));
        let (adapter, _) = build(http);
        let env = adapter
            .fetch(&RequestSpec::new(
                TransportKind::BinaryRpc,
                ServiceKind::Media,
                Some("video"),
            ))
            .await
            .unwrap();
        assert_eq!(env.payload.as_media().unwrap().mime_type(), "video/mp4");
    }

    #[tokio::test]
    async fn blog_digest_lists_title_then_sections() {
        let response = BlogPostsResponse {
            posts: vec![proto::BlogPost {
                id: 1,
                title: "A".into(),
                author: Some(proto::Author {
                    name: "B".into(),
                    email: "b@example.com".into(),
                }),
                sections: vec![proto::Section {
                    heading: "H".into(),
                    body: "Body".into(),
                }],
                ..Default::default()
            }],
        };
        let http = Arc::new(FakeHttp::new().respond(grpc_reply(&response)));
        let (adapter, _) = build(http.clone());
        let env = adapter
            .fetch(&RequestSpec::new(TransportKind::BinaryRpc, ServiceKind::Blog, None))
            .await
            .unwrap();
        let rendered = env.payload.as_blog().unwrap().render();
        let title = rendered.find("Title: A").unwrap();
        let author = rendered.find("Author: B <b@example.com>").unwrap();
        let heading = rendered.find("### H\nBody").unwrap();
        assert!(title < author && author < heading);
        assert_eq!(env.payload_bytes, rendered.len() as u64);
        assert_eq!(http.calls()[0].url, "http://rpc:5109/blog.Blog/GetAll");
    }

    #[tokio::test]
    async fn invalid_sizes_never_reach_the_network() {
        let http = Arc::new(FakeHttp::new());
        let (adapter, _) = build(http.clone());
        let err = adapter
            .fetch(&RequestSpec::new(
                TransportKind::BinaryRpc,
                ServiceKind::Text,
                Some("huge"),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, BenchError::InvalidTextSize { .. }));
        let err = adapter
            .fetch(&RequestSpec::new(
                TransportKind::BinaryRpc,
                ServiceKind::Media,
                Some("picture"),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, BenchError::InvalidMediaType { .. }));
        assert!(http.calls().is_empty());
    }

    #[test]
    fn mismatched_reply_is_unreachable() {
        let (adapter, _) = build(Arc::new(FakeHttp::new()));
        let reply = RpcReply::Text(UnaryResponse::for_test(HttpResponse::new(200, Bytes::new())));
        let err = adapter
            .decode(Selector::Media(MediaType::Image), reply)
            .unwrap_err();
        assert_eq!(
            err,
            BenchError::UnreachableServiceKind {
                service: ServiceKind::Media
            }
        );
    }
}
