//! API request and response type definitions.

use serde::{Deserialize, Deserializer, Serialize};

/// Login request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub document: Option<&'a str>,
    pub locale: &'a str,
    pub can_receive_email: bool,
}

/// Login response carrying both session tokens.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token_v1: Option<String>,
    pub token: Option<String>,
}

/// A profile the account follows.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowedProfile {
    pub profile_name: String,
}

/// One page of a profile's posts feed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsPage {
    #[serde(default)]
    pub mosaic_items: Vec<MosaicItem>,
}

/// A post in the feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MosaicItem {
    pub post_date: Option<String>,
    #[serde(default)]
    pub files: Vec<PostFile>,
}

/// A file attached to a post.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFile {
    #[serde(deserialize_with = "string_or_number")]
    pub media_id: String,
    #[serde(rename = "type")]
    pub file_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_locked: bool,
}

/// Video token request body.
#[derive(Debug, Serialize)]
pub struct VideoTokenRequest<'a> {
    pub exp: u64,
    pub file_id: &'a str,
}

/// Video token response.
#[derive(Debug, Deserialize)]
pub struct VideoTokenResponse {
    pub content: Option<String>,
}

/// Accept IDs sent either as JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
