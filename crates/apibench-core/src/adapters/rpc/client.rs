//! gRPC-Web channel and the three service stubs.

use std::marker::PhantomData;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use prost::Message;
use tracing::debug;

use super::framing::{Frame, FrameDecoder, encode_frame};
use super::proto::{BlogPostsResponse, Empty, MediaResponse, TextResponse};
use crate::errors::BenchError;
use crate::http::{HttpClient, HttpResponse};

const GRPC_WEB_PROTO: &str = "application/grpc-web+proto";
const GRPC_WEB_TEXT: &str = "application/grpc-web-text";

/// Shared, stateless gRPC-Web endpoint.
#[derive(Clone)]
pub struct GrpcWebChannel {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl GrpcWebChannel {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Sends one request message and returns the raw, undecoded reply.
    pub async fn unary<Req, Resp>(
        &self,
        path: &'static str,
        request: &Req,
    ) -> Result<UnaryResponse<Resp>, BenchError>
    where
        Req: Message,
        Resp: Message + Default,
    {
        let url = self.url(path);
        let body = encode_frame(&request.encode_to_vec());
        debug!(event = "rpc.call_started", domain = "rpc", method = path);
        let response = self
            .http
            .post(
                &url,
                GRPC_WEB_PROTO,
                &[("x-grpc-web", "1"), ("accept", GRPC_WEB_PROTO)],
                body,
            )
            .await?;
        Ok(UnaryResponse {
            url,
            response,
            _message: PhantomData,
        })
    }
}

/// Reply of a unary call, decoded on demand so callers can time the network
/// part separately.
pub struct UnaryResponse<T> {
    url: String,
    response: HttpResponse,
    _message: PhantomData<T>,
}

impl<T: Message + Default> UnaryResponse<T> {
    /// Checks HTTP and gRPC status, unframes the body and decodes the message.
    pub fn into_message(self) -> Result<T, BenchError> {
        let response = self.response.ensure_success(&self.url)?;
        check_status(
            response.header("grpc-status"),
            response.header("grpc-message"),
        )?;

        let body = if response
            .content_type()
            .is_some_and(|ct| ct.starts_with(GRPC_WEB_TEXT))
        {
            decode_grpc_web_text(&response.body)?
        } else {
            response.body
        };

        let mut decoder = FrameDecoder::default();
        let frames = decoder.push_chunk(&body)?;
        decoder.finish()?;

        let mut message: Option<Bytes> = None;
        for frame in frames {
            match frame {
                Frame::Data(data) => {
                    if message.replace(data).is_some() {
                        return Err(BenchError::protocol(
                            "unary reply carried more than one message",
                        ));
                    }
                }
                Frame::Trailers(pairs) => {
                    let lookup = |key: &str| {
                        pairs
                            .iter()
                            .find(|(k, _)| k == key)
                            .map(|(_, v)| v.as_str())
                    };
                    check_status(lookup("grpc-status"), lookup("grpc-message"))?;
                }
            }
        }
        match message {
            Some(data) => Ok(T::decode(data)?),
            None => Ok(T::default()),
        }
    }
}

#[cfg(test)]
impl<T> UnaryResponse<T> {
    pub(crate) fn for_test(response: HttpResponse) -> Self {
        Self {
            url: "http://rpc.test/method".into(),
            response,
            _message: PhantomData,
        }
    }
}

/// Decodes a `grpc-web-text` body. Servers may base64-encode each write on
/// its own, so padded segments are decoded one at a time.
fn decode_grpc_web_text(body: &[u8]) -> Result<Bytes, BenchError> {
    let text: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let mut out = Vec::with_capacity(text.len() / 4 * 3);
    let mut rest = text.as_slice();
    while !rest.is_empty() {
        let end = match rest.iter().position(|&b| b == b'=') {
            Some(pad) => {
                pad + rest[pad..]
                    .iter()
                    .take_while(|&&b| b == b'=')
                    .count()
            }
            None => rest.len(),
        };
        let (segment, tail) = rest.split_at(end);
        STANDARD
            .decode_vec(segment, &mut out)
            .map_err(|e| BenchError::protocol(format!("invalid grpc-web-text body: {e}")))?;
        rest = tail;
    }
    Ok(Bytes::from(out))
}

fn check_status(status: Option<&str>, message: Option<&str>) -> Result<(), BenchError> {
    let Some(raw) = status else {
        return Ok(());
    };
    let code: u32 = raw
        .trim()
        .parse()
        .map_err(|_| BenchError::protocol(format!("invalid grpc-status: {raw}")))?;
    if code == 0 {
        return Ok(());
    }
    Err(BenchError::RpcStatus {
        code,
        message: message.unwrap_or_default().to_string(),
    })
}

/// Client for the `text.Text` service.
#[derive(Clone)]
pub struct TextClient {
    channel: GrpcWebChannel,
}

impl TextClient {
    pub fn new(channel: GrpcWebChannel) -> Self {
        Self { channel }
    }

    pub async fn get_small(&self, req: Empty) -> Result<UnaryResponse<TextResponse>, BenchError> {
        self.channel.unary("/text.Text/GetSmall", &req).await
    }

    pub async fn get_medium(&self, req: Empty) -> Result<UnaryResponse<TextResponse>, BenchError> {
        self.channel.unary("/text.Text/GetMedium", &req).await
    }

    pub async fn get_large(&self, req: Empty) -> Result<UnaryResponse<TextResponse>, BenchError> {
        self.channel.unary("/text.Text/GetLarge", &req).await
    }
}

/// Client for the `media.Media` service.
#[derive(Clone)]
pub struct MediaClient {
    channel: GrpcWebChannel,
}

impl MediaClient {
    pub fn new(channel: GrpcWebChannel) -> Self {
        Self { channel }
    }

    pub async fn get_image(&self, req: Empty) -> Result<UnaryResponse<MediaResponse>, BenchError> {
        self.channel.unary("/media.Media/GetImage", &req).await
    }

    pub async fn get_audio(&self, req: Empty) -> Result<UnaryResponse<MediaResponse>, BenchError> {
        self.channel.unary("/media.Media/GetAudio", &req).await
    }

    pub async fn get_video(&self, req: Empty) -> Result<UnaryResponse<MediaResponse>, BenchError> {
        self.channel.unary("/media.Media/GetVideo", &req).await
    }
}

/// Client for the `blog.Blog` service.
#[derive(Clone)]
pub struct BlogClient {
    channel: GrpcWebChannel,
}

impl BlogClient {
    pub fn new(channel: GrpcWebChannel) -> Self {
        Self { channel }
    }

    pub async fn get_all(
        &self,
        req: Empty,
    ) -> Result<UnaryResponse<BlogPostsResponse>, BenchError> {
        self.channel.unary("/blog.Blog/GetAll", &req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rpc::framing::encode_trailers;

    fn reply<T>(response: HttpResponse) -> UnaryResponse<T> {
        UnaryResponse::for_test(response)
    }

    fn framed(msg: &impl Message, status: &str) -> Bytes {
        let mut body = encode_frame(&msg.encode_to_vec()).to_vec();
        body.extend_from_slice(&encode_trailers(&[("grpc-status", status)]));
        Bytes::from(body)
    }

    #[test]
    fn decodes_data_frame_followed_by_ok_trailer() {
        let msg = TextResponse {
            content: "hi".into(),
        };
        let out = reply::<TextResponse>(HttpResponse::new(200, framed(&msg, "0")))
            .into_message()
            .unwrap();
        assert_eq!(out.content, "hi");
    }

    #[test]
    fn non_zero_trailer_status_fails() {
        let msg = TextResponse::default();
        let err = reply::<TextResponse>(HttpResponse::new(200, framed(&msg, "14")))
            .into_message()
            .unwrap_err();
        assert!(matches!(err, BenchError::RpcStatus { code: 14, .. }));
    }

    #[test]
    fn trailers_only_header_status_fails() {
        let response = HttpResponse::new(200, Bytes::new())
            .with_header("grpc-status", "12")
            .with_header("grpc-message", "unimplemented");
        let err = reply::<TextResponse>(response).into_message().unwrap_err();
        assert_eq!(
            err,
            BenchError::RpcStatus {
                code: 12,
                message: "unimplemented".into()
            }
        );
    }

    #[test]
    fn grpc_web_text_bodies_are_base64_decoded() {
        let msg = TextResponse {
            content: "text mode".into(),
        };
        let encoded = STANDARD.encode(framed(&msg, "0"));
        let response = HttpResponse::new(200, encoded)
            .with_header("content-type", "application/grpc-web-text+proto");
        let out = reply::<TextResponse>(response).into_message().unwrap();
        assert_eq!(out.content, "text mode");
    }

    #[test]
    fn grpc_web_text_frames_encoded_separately_are_decoded() {
        let msg = TextResponse {
            content: "hi!".into(),
        };
        let mut encoded = STANDARD.encode(encode_frame(&msg.encode_to_vec()));
        encoded.push_str(&STANDARD.encode(encode_trailers(&[("grpc-status", "0")])));
        assert!(encoded.trim_end_matches('=').contains('='));
        let response = HttpResponse::new(200, encoded)
            .with_header("content-type", "application/grpc-web-text");
        let out = reply::<TextResponse>(response).into_message().unwrap();
        assert_eq!(out.content, "hi!");
    }

    #[test]
    fn malformed_grpc_web_text_is_a_protocol_error() {
        let err = decode_grpc_web_text(b"@@@@").unwrap_err();
        assert!(matches!(err, BenchError::Protocol(_)));
    }

    #[test]
    fn missing_data_frame_yields_default_message() {
        let body = encode_trailers(&[("grpc-status", "0")]);
        let out = reply::<TextResponse>(HttpResponse::new(200, body))
            .into_message()
            .unwrap();
        assert_eq!(out.content, "");
    }

    #[test]
    fn http_failure_comes_first() {
        let err = reply::<TextResponse>(HttpResponse::new(503, Bytes::new()))
            .into_message()
            .unwrap_err();
        assert!(matches!(err, BenchError::HttpError { status: 503, .. }));
    }
}
