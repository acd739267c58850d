use effect_framework::DecodeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A breed and its sub-breeds, in API order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breed {
    pub name: String,
    #[serde(rename = "subBreeds")]
    pub sub_breeds: Vec<String>,
}

impl Breed {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_breeds: Vec::new(),
        }
    }

    pub fn with_sub_breeds<I, S>(mut self, sub_breeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_breeds = sub_breeds.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Deserialize)]
struct BreedListResponse {
    message: serde_json::Map<String, Value>,
}

/// Decodes `{ "message": { "<breed>": ["<sub-breed>", ..] } }`, keeping the map's order.
pub fn decode_breed_list(json: &Value) -> Result<Vec<Breed>, DecodeError> {
    let response = BreedListResponse::deserialize(json)?;
    response
        .message
        .into_iter()
        .map(|(name, subs)| {
            let sub_breeds = Vec::<String>::deserialize(&subs)
                .map_err(|e| DecodeError::new(format!("message.{name}: {e}")))?;
            Ok(Breed { name, sub_breeds })
        })
        .collect()
}
