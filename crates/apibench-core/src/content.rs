use serde::{Deserialize, Deserializer, Serialize};

use crate::codec::measure_utf8_bytes;
use crate::media::MediaHandle;
use crate::model::{ServiceKind, TransportKind};

/// Separator placed between rendered blog posts.
pub const POST_SEPARATOR: &str = "\n\n---\n\n";

/// Author of a blog post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
}

/// One heading/body block of a post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    #[serde(deserialize_with = "null_as_default")]
    pub heading: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
}

/// Links to media attached to a post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostMedia {
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
}

/// Tags and word count of a post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostMetadata {
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub word_count: u64,
}

/// A blog post as served by any of the three transports.
///
/// Every field is optional on the wire; missing or `null` sub-objects decode
/// to their empty value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: Author,
    #[serde(deserialize_with = "null_as_default")]
    pub sections: Vec<Section>,
    pub media: Option<PostMedia>,
    pub metadata: Option<PostMetadata>,
    pub published_at: Option<String>,
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl BlogPost {
    /// Renders one post: header lines, a blank line, then `### heading` blocks.
    pub fn render(&self) -> String {
        let mut out = format!(
            "Title: {}\nAuthor: {} <{}>\n",
            self.title, self.author.name, self.author.email
        );
        if let Some(published) = self.published_at.as_deref().filter(|p| !p.is_empty()) {
            out.push_str(&format!("Published: {published}\n"));
        }
        if let Some(metadata) = &self.metadata {
            out.push_str(&format!(
                "Tags: {}\nWord Count: {}\n",
                metadata.tags.join(", "),
                metadata.word_count
            ));
        }
        out.push('\n');
        let sections = self
            .sections
            .iter()
            .map(|s| format!("### {}\n{}", s.heading, s.body))
            .collect::<Vec<_>>()
            .join("\n\n");
        out.push_str(&sections);
        out
    }
}

/// Ordered list of posts; order is the server's and is never changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogDigest {
    pub posts: Vec<BlogPost>,
}

impl BlogDigest {
    /// Wraps posts in server order.
    pub fn new(posts: Vec<BlogPost>) -> Self {
        Self { posts }
    }

    /// Renders every post joined with [`POST_SEPARATOR`].
    pub fn render(&self) -> String {
        self.posts
            .iter()
            .map(BlogPost::render)
            .collect::<Vec<_>>()
            .join(POST_SEPARATOR)
    }
}

/// Decoded payload; its shape depends only on the service, never the transport.
#[derive(Debug)]
pub enum Payload {
    Text(String),
    Blog(BlogDigest),
    Media(MediaHandle),
}

impl Payload {
    /// Service this payload belongs to.
    pub fn service(&self) -> ServiceKind {
        match self {
            Payload::Text(_) => ServiceKind::Text,
            Payload::Blog(_) => ServiceKind::Blog,
            Payload::Media(_) => ServiceKind::Media,
        }
    }

    /// Byte size reported for this payload.
    pub fn byte_size(&self) -> u64 {
        match self {
            Payload::Text(text) => measure_utf8_bytes(text),
            Payload::Blog(digest) => measure_utf8_bytes(&digest.render()),
            Payload::Media(handle) => handle.byte_length(),
        }
    }

    /// Body printed below the envelope header.
    pub fn body(&self) -> String {
        match self {
            Payload::Text(text) => format!("Payload:\n{text}"),
            Payload::Blog(digest) => digest.render(),
            Payload::Media(handle) => format!("Media URL: {}", handle.reference()),
        }
    }

    /// Text content, if this is a text payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Blog digest, if this is a blog payload.
    pub fn as_blog(&self) -> Option<&BlogDigest> {
        match self {
            Payload::Blog(digest) => Some(digest),
            _ => None,
        }
    }

    /// Media handle, if this is a media payload.
    pub fn as_media(&self) -> Option<&MediaHandle> {
        match self {
            Payload::Media(handle) => Some(handle),
            _ => None,
        }
    }

    /// Takes the media handle out, if this is a media payload.
    pub fn into_media(self) -> Option<MediaHandle> {
        match self {
            Payload::Media(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Result of one adapter call.
#[derive(Debug)]
pub struct ResultEnvelope {
    /// Transport that served the call.
    pub transport: TransportKind,
    /// Network round trip only, in milliseconds.
    pub elapsed_ms: f64,
    /// UTF-8 length of the rendered text, or the media byte length.
    pub payload_bytes: u64,
    pub payload: Payload,
}

impl ResultEnvelope {
    /// Builds an envelope; the byte size is derived from the payload.
    pub fn new(transport: TransportKind, elapsed_ms: f64, payload: Payload) -> Self {
        Self {
            transport,
            elapsed_ms,
            payload_bytes: payload.byte_size(),
            payload,
        }
    }
}
