//! Protobuf messages for the `text`, `media` and `blog` services.

use crate::content;

/// `google.protobuf.Empty`.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TextResponse {
    #[prost(string, tag = "1")]
    pub content: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MediaResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "2")]
    pub content_type: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Author {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub email: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Section {
    #[prost(string, tag = "1")]
    pub heading: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub body: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PostMedia {
    #[prost(string, tag = "1")]
    pub image_url: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub audio_url: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub video_url: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PostMetadata {
    #[prost(string, repeated, tag = "1")]
    pub tags: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(int32, tag = "2")]
    pub word_count: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlogPost {
    #[prost(int32, tag = "1")]
    pub id: i32,
    #[prost(string, tag = "2")]
    pub title: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "3")]
    pub author: ::core::option::Option<Author>,
    #[prost(message, repeated, tag = "4")]
    pub sections: ::prost::alloc::vec::Vec<Section>,
    #[prost(message, optional, tag = "5")]
    pub media: ::core::option::Option<PostMedia>,
    #[prost(message, optional, tag = "6")]
    pub metadata: ::core::option::Option<PostMetadata>,
    #[prost(string, tag = "7")]
    pub published_at: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlogPostsResponse {
    #[prost(message, repeated, tag = "1")]
    pub posts: ::prost::alloc::vec::Vec<BlogPost>,
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl From<BlogPost> for content::BlogPost {
    fn from(post: BlogPost) -> Self {
        let author = post.author.unwrap_or_default();
        content::BlogPost {
            id: Some(post.id.to_string()),
            title: post.title,
            author: content::Author {
                name: author.name,
                email: author.email,
            },
            sections: post
                .sections
                .into_iter()
                .map(|s| content::Section {
                    heading: s.heading,
                    body: s.body,
                })
                .collect(),
            media: post.media.map(|m| content::PostMedia {
                image_url: non_empty(m.image_url),
                audio_url: non_empty(m.audio_url),
                video_url: non_empty(m.video_url),
            }),
            metadata: post.metadata.map(|m| content::PostMetadata {
                tags: m.tags,
                word_count: u64::try_from(m.word_count).unwrap_or(0),
            }),
            published_at: non_empty(post.published_at),
        }
    }
}

impl From<BlogPostsResponse> for content::BlogDigest {
    fn from(response: BlogPostsResponse) -> Self {
        content::BlogDigest::new(response.posts.into_iter().map(Into::into).collect())
    }
}
