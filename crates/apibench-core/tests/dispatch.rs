//! End-to-end dispatcher tests against a routing fake server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use apibench_core::adapters::rpc::proto;
use apibench_core::codec::measure_utf8_bytes;
use apibench_core::prelude::*;
use apibench_core::{HttpClient, HttpResponse};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bytes::Bytes;
use prost::Message as _;

const REST: &str = "http://rest.test";
const GQL: &str = "http://gql.test/graphql";
const RPC: &str = "http://rpc.test";

const IMAGE: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];
const AUDIO: &[u8] = b"RIFF\x24\x00\x00\x00WAVE";
const VIDEO: &[u8] = &[0, 0, 0, 0x18, b'f', b't', b'y', b'p', b'm', b'p', b'4', b'2'];

/// Answers every route of the three backends with fixed content.
#[derive(Default)]
struct FakeBackends {
    calls: AtomicUsize,
}

fn text_for(size: &str) -> String {
    format!("{size} payload \u{2013} caf\u{e9}")
}

fn media_for(kind: &str) -> &'static [u8] {
    match kind {
        "image" => IMAGE,
        "audio" => AUDIO,
        _ => VIDEO,
    }
}

fn grpc(msg: &impl prost::Message) -> HttpResponse {
    let payload = msg.encode_to_vec();
    let trailer = b"grpc-status:0\r\n";
    let mut body = vec![0u8];
    body.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    body.extend_from_slice(&payload);
    body.push(0x80);
    body.extend_from_slice(&(trailer.len() as u32).to_be_bytes());
    body.extend_from_slice(trailer);
    HttpResponse::new(200, body).with_header("content-type", "application/grpc-web+proto")
}

fn one_post_json() -> serde_json::Value {
    serde_json::json!([{
        "id": 1,
        "title": "A",
        "author": {"name": "B", "email": "b@example.com"},
        "sections": [{"heading": "Intro", "body": "Hello"}]
    }])
}

#[async_trait::async_trait]
impl HttpClient for FakeBackends {
    async fn get(&self, url: &str) -> Result<HttpResponse, BenchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let path = url.strip_prefix(REST).unwrap_or(url);
        let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        Ok(match parts.as_slice() {
            ["text", size] => HttpResponse::new(
                200,
                serde_json::json!({ "content": text_for(size) }).to_string(),
            ),
            ["media", kind] => HttpResponse::new(200, media_for(kind)),
            ["api", "blog"] => HttpResponse::new(200, one_post_json().to_string()),
            _ => HttpResponse::new(404, "not found"),
        })
    }

    async fn post(
        &self,
        url: &str,
        _content_type: &str,
        _headers: &[(&str, &str)],
        body: Bytes,
    ) -> Result<HttpResponse, BenchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url == GQL {
            let req: serde_json::Value = serde_json::from_slice(&body).unwrap();
            let query = req["query"].as_str().unwrap();
            let data = if let Some(size) = ["small", "medium", "large"]
                .into_iter()
                .find(|s| query.contains(&format!("{s} {{")))
            {
                serde_json::json!({ size: { "content": text_for(size) } })
            } else if query.contains("posts") {
                serde_json::json!({ "posts": one_post_json() })
            } else {
                let kind = ["image", "audio", "video"]
                    .into_iter()
                    .find(|k| query.contains(k))
                    .unwrap();
                serde_json::json!({ kind: URL_SAFE_NO_PAD.encode(media_for(kind)) })
            };
            return Ok(HttpResponse::new(
                200,
                serde_json::json!({ "data": data }).to_string(),
            ));
        }

        let method = url.strip_prefix(RPC).unwrap_or(url);
        Ok(match method {
            "/text.Text/GetSmall" => grpc(&proto::TextResponse {
                content: text_for("small"),
            }),
            "/text.Text/GetMedium" => grpc(&proto::TextResponse {
                content: text_for("medium"),
            }),
            "/text.Text/GetLarge" => grpc(&proto::TextResponse {
                content: text_for("large"),
            }),
            "/media.Media/GetImage" => grpc(&proto::MediaResponse {
                data: IMAGE.to_vec(),
                content_type: String::new(),
            }),
            "/media.Media/GetAudio" => grpc(&proto::MediaResponse {
                data: AUDIO.to_vec(),
                content_type: String::new(),
            }),
            "/media.Media/GetVideo" => grpc(&proto::MediaResponse {
                data: VIDEO.to_vec(),
                content_type: String::new(),
            }),
            "/blog.Blog/GetAll" => grpc(&proto::BlogPostsResponse {
                posts: vec![proto::BlogPost {
                    id: 1,
                    title: "A".into(),
                    author: Some(proto::Author {
                        name: "B".into(),
                        email: "b@example.com".into(),
                    }),
                    sections: vec![proto::Section {
                        heading: "Intro".into(),
                        body: "Hello".into(),
                    }],
                    ..Default::default()
                }],
            }),
            _ => HttpResponse::new(404, ""),
        })
    }
}

fn dispatcher() -> (Dispatcher, Arc<FakeBackends>) {
    let backends = Arc::new(FakeBackends::default());
    let dispatcher = Dispatcher::builder()
        .config(
            BenchConfig::default()
                .rest_base_url(REST)
                .graphql_url(GQL)
                .rpc_base_url(RPC),
        )
        .http_client(backends.clone())
        .build()
        .unwrap();
    (dispatcher, backends)
}

#[tokio::test]
async fn text_is_identical_across_transports() {
    let (dispatcher, _) = dispatcher();
    for transport in TransportKind::ALL {
        for size in TextSize::ALL {
            let spec = RequestSpec::from_selector(transport, Selector::Text(size));
            let env = dispatcher.fetch(&spec).await.unwrap();
            let text = env.payload.as_text().expect("text payload");
            assert!(!text.is_empty());
            assert_eq!(text, text_for(size.as_str()));
            assert_eq!(env.payload_bytes, measure_utf8_bytes(text));
            assert_eq!(env.transport, transport);
        }
    }
}

#[tokio::test]
async fn media_mime_and_length_match_across_transports() {
    let (dispatcher, _) = dispatcher();
    let expected = [
        (MediaType::Image, "image/jpeg"),
        (MediaType::Audio, "audio/wav"),
        (MediaType::Video, "video/mp4"),
    ];
    for transport in TransportKind::ALL {
        for (media, mime) in expected {
            let spec = RequestSpec::from_selector(transport, Selector::Media(media));
            let env = dispatcher.fetch(&spec).await.unwrap();
            let handle = env.payload.into_media().expect("media payload");
            assert_eq!(handle.mime_type(), mime, "{transport} {media:?}");
            assert_eq!(handle.byte_length(), media_for(media.as_str()).len() as u64);
            let bytes = handle.release().expect("live handle");
            assert_eq!(&bytes[..], media_for(media.as_str()));
        }
    }
    assert_eq!(dispatcher.media_store().live(), 0);
}

#[tokio::test]
async fn blog_digest_is_transport_independent() {
    let (dispatcher, _) = dispatcher();
    let mut rendered = Vec::new();
    for transport in TransportKind::ALL {
        let env = dispatcher
            .fetch_service(transport.as_str(), "blog", "")
            .await
            .unwrap();
        let digest = env.payload.as_blog().expect("blog payload").render();
        let title = digest.find("Title: A").unwrap();
        let heading = digest.find("### Intro\nHello").unwrap();
        assert!(title < heading);
        rendered.push(digest);
    }
    assert_eq!(rendered[0], rendered[2]);
    assert!(rendered[1].starts_with("Title: A\nAuthor: B <b@example.com>\n"));
}

#[tokio::test]
async fn invalid_inputs_touch_no_backend() {
    let (dispatcher, backends) = dispatcher();
    for transport in ["REST", "GraphQL", "gRPC-Web"] {
        let err = dispatcher
            .fetch_service(transport, "text", "huge")
            .await
            .unwrap_err();
        assert!(matches!(err, BenchError::InvalidTextSize { .. }));
        let err = dispatcher
            .fetch_service(transport, "media", "picture")
            .await
            .unwrap_err();
        assert!(matches!(err, BenchError::InvalidMediaType { .. }));
    }
    let err = dispatcher
        .fetch_service("SOAP", "text", "small")
        .await
        .unwrap_err();
    assert!(matches!(err, BenchError::UnknownTransport { .. }));
    assert_eq!(backends.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn reports_share_one_template() {
    let (dispatcher, _) = dispatcher();
    let env = dispatcher
        .fetch_service("gRPC-Web", "text", "small")
        .await
        .unwrap();
    let report = env.report();
    let lines: Vec<&str> = report.lines().collect();
    assert!(lines[0].starts_with("Response Time: ") && lines[0].ends_with(" ms"));
    assert_eq!(lines[1], format!("Payload Size: {} bytes", env.payload_bytes));
    assert_eq!(lines[2], "");
    assert_eq!(lines[3], "Payload:");
}

#[tokio::test]
async fn parallel_fan_out_returns_every_result() {
    let (dispatcher, backends) = dispatcher();
    let results = dispatcher
        .fetch_service_parallel("GraphQL", "media", "audio", 5)
        .await
        .unwrap();
    assert_eq!(results.len(), 5);
    assert_eq!(dispatcher.media_store().live(), 5);
    assert_eq!(backends.calls.load(Ordering::SeqCst), 5);
    drop(results);
    assert_eq!(dispatcher.media_store().live(), 0);
}
