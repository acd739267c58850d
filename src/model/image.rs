use effect_framework::DecodeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Deserialize)]
struct ImageListResponse {
    message: Vec<String>,
}

/// Decodes `{ "message": ["<url>", ..] }`.
pub fn decode_image_list(json: &Value) -> Result<Vec<Image>, DecodeError> {
    let response = ImageListResponse::deserialize(json)?;
    Ok(response
        .message
        .into_iter()
        .map(|url| Image { url })
        .collect())
}
