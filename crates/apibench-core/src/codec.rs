//! Byte counting and payload decoding shared by all adapters.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::errors::BenchError;
use crate::model::MediaType;

/// Exact UTF-8 encoded length of `text`.
pub fn measure_utf8_bytes(text: &str) -> u64 {
    text.len() as u64
}

/// Rewrites URL-safe base64 into the standard alphabet and restores padding.
pub fn repair_base64_url(encoded: &str) -> String {
    let mut out: String = encoded
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    match out.len() % 4 {
        2 => out.push_str("=="),
        3 => out.push('='),
        _ => {}
    }
    out
}

/// Repairs and decodes a URL-safe base64 string.
pub fn decode_base64_url(encoded: &str) -> Result<Vec<u8>, BenchError> {
    STANDARD
        .decode(repair_base64_url(encoded))
        .map_err(|e| BenchError::MediaDecode(format!("invalid base64 payload: {e}")))
}

/// Converts a JSON array of numbers into bytes; every item must fit in `u8`.
pub fn decode_byte_array(items: &[serde_json::Value]) -> Result<Vec<u8>, BenchError> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| {
                    BenchError::MediaDecode(format!("byte array item {idx} is not a byte: {item}"))
                })
        })
        .collect()
}

/// Fixed MIME type used when the server does not send one.
pub fn mime_for_media(media: MediaType) -> &'static str {
    match media {
        MediaType::Image => "image/jpeg",
        MediaType::Audio => "audio/wav",
        MediaType::Video => "video/mp4",
    }
}

/// Picks the server's content type when usable, otherwise the fixed mapping.
///
/// Parameters such as `; charset=` are kept as sent.
pub fn resolve_mime(server: Option<&str>, media: MediaType) -> String {
    match server.map(str::trim).filter(|ct| !ct.is_empty()) {
        Some(ct) if ct != "application/octet-stream" => ct.to_string(),
        _ => mime_for_media(media).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    #[test]
    fn utf8_bytes_count_multibyte_chars() {
        assert_eq!(measure_utf8_bytes(""), 0);
        assert_eq!(measure_utf8_bytes("hi"), 2);
        assert_eq!(measure_utf8_bytes("é"), 2);
        assert_eq!(measure_utf8_bytes("日本"), 6);
    }

    #[test]
    fn repair_restores_alphabet_and_padding() {
        assert_eq!(repair_base64_url("-_8"), "+/8=");
        assert_eq!(repair_base64_url("YQ"), "YQ==");
        assert_eq!(repair_base64_url("YWJj"), "YWJj");
    }

    #[test]
    fn url_safe_round_trip_for_all_padding_remainders() {
        for len in 0..=10usize {
            let bytes: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_mul(67) ^ 0xfb).collect();
            let encoded = URL_SAFE_NO_PAD.encode(&bytes);
            assert_eq!(decode_base64_url(&encoded).unwrap(), bytes, "len {len}");
        }
    }

    #[test]
    fn invalid_base64_is_a_media_decode_error() {
        assert!(matches!(
            decode_base64_url("abcde"),
            Err(BenchError::MediaDecode(_))
        ));
        assert!(matches!(
            decode_base64_url("ab$d"),
            Err(BenchError::MediaDecode(_))
        ));
    }

    #[test]
    fn byte_arrays_reject_out_of_range_items() {
        let ok = serde_json::json!([0, 127, 255]);
        assert_eq!(
            decode_byte_array(ok.as_array().unwrap()).unwrap(),
            vec![0, 127, 255]
        );
        let bad = serde_json::json!([1, 256]);
        assert!(decode_byte_array(bad.as_array().unwrap()).is_err());
    }

    #[test]
    fn mime_falls_back_to_fixed_mapping() {
        assert_eq!(resolve_mime(None, MediaType::Image), "image/jpeg");
        assert_eq!(resolve_mime(Some(""), MediaType::Audio), "audio/wav");
        assert_eq!(
            resolve_mime(Some("application/octet-stream"), MediaType::Video),
            "video/mp4"
        );
        assert_eq!(resolve_mime(Some("image/png"), MediaType::Image), "image/png");
    }
}
