//! gRPC-Web length-prefixed framing.
//!
//! Each frame is one flag byte, a big-endian `u32` length and the payload.
//! Flag `0x00` carries a protobuf message, flag bit `0x80` marks the trailer
//! frame whose payload is an HTTP/1-style header block.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::errors::BenchError;

const HEADER_LEN: usize = 5;
const TRAILER_FLAG: u8 = 0x80;
const COMPRESSED_FLAG: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Frame {
    Data(Bytes),
    Trailers(Vec<(String, String)>),
}

/// Wraps one encoded message in a data frame.
pub(crate) fn encode_frame(message: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + message.len());
    buf.put_u8(0);
    buf.put_u32(message.len() as u32);
    buf.put_slice(message);
    buf.freeze()
}

#[cfg(test)]
pub(crate) fn encode_trailers(pairs: &[(&str, &str)]) -> Bytes {
    let block: String = pairs
        .iter()
        .map(|(k, v)| format!("{k}:{v}\r\n"))
        .collect();
    let mut buf = BytesMut::with_capacity(HEADER_LEN + block.len());
    buf.put_u8(TRAILER_FLAG);
    buf.put_u32(block.len() as u32);
    buf.put_slice(block.as_bytes());
    buf.freeze()
}

#[derive(Default)]
pub(crate) struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    /// Appends `chunk` and returns every frame it completes.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, BenchError> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while self.buf.len() >= HEADER_LEN {
            let flag = self.buf[0];
            let len = u32::from_be_bytes([self.buf[1], self.buf[2], self.buf[3], self.buf[4]])
                as usize;
            if self.buf.len() < HEADER_LEN + len {
                break;
            }
            self.buf.advance(HEADER_LEN);
            let payload = self.buf.split_to(len).freeze();
            if flag & COMPRESSED_FLAG != 0 {
                return Err(BenchError::protocol(
                    "compressed gRPC-Web frames are not supported",
                ));
            }
            if flag & TRAILER_FLAG != 0 {
                frames.push(Frame::Trailers(parse_trailers(&payload)));
            } else {
                frames.push(Frame::Data(payload));
            }
        }
        Ok(frames)
    }

    /// Fails if a partial frame is still buffered.
    pub fn finish(self) -> Result<(), BenchError> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(BenchError::protocol(format!(
                "truncated gRPC-Web frame ({} trailing bytes)",
                self.buf.len()
            )))
        }
    }
}

fn parse_trailers(payload: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(payload);
    text.split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            Some((key.trim().to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}
