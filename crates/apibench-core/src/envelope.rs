use crate::content::ResultEnvelope;

/// Renders the report shared by every transport:
///
/// ```text
/// Response Time: 12.34 ms
/// Payload Size: 2 bytes
///
/// <body>
/// ```
pub fn format_envelope(elapsed_ms: f64, byte_size: u64, body: &str) -> String {
    format!("Response Time: {elapsed_ms:.2} ms\nPayload Size: {byte_size} bytes\n\n{body}")
}

impl ResultEnvelope {
    /// Human-readable report for this result.
    pub fn report(&self) -> String {
        format_envelope(self.elapsed_ms, self.payload_bytes, &self.payload.body())
    }
}
