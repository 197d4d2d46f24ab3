use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exhibit author as rendered to clients: username only, never the email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
}

/// A failure write-up. `display_item` is an opaque blob telling the
/// presentation layer how to render the piece; the server currently fills
/// in `{"type": "painting", "color": ...}` but clients must not assume
/// that shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exhibit {
    pub post_id: Uuid,
    pub title: String,
    pub content: String,
    pub display_item: serde_json::Value,
    pub is_public: bool,
    pub author: Author,
    pub created_at: DateTime<Utc>,
}

/// Submission body. The owner is never part of it -- the server resolves
/// ownership from the verified identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}
