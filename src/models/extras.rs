use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag is a labelled marker that can be attached to IP addresses and EntNets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default = "default_tag_color")]
    pub color: String,
}

fn default_tag_color() -> String {
    "9e9e9e".to_string()
}

/// EntNet is a named enterprise network record with tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntNet {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntNetRequest {
    pub name: String,
    /// Tag slugs
    #[serde(default)]
    pub tags: Vec<String>,
}
