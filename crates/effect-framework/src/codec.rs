//! Encode/decode between domain values and JSON documents.

use crate::error::{DecodeError, EncodeError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

/// Paired JSON representation of `A`.
///
/// For any `a`, `decode(encode(a)?)` must yield a value equivalent to `a`.
pub trait Codec<A>: Send + Sync {
    fn encode(&self, value: &A) -> Result<Value, EncodeError>;
    fn decode(&self, json: &Value) -> Result<A, DecodeError>;
}

/// Codec backed by the type's own serde implementation.
pub struct JsonCodec<A>(PhantomData<fn() -> A>);

impl<A> JsonCodec<A> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<A> Default for JsonCodec<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for JsonCodec<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for JsonCodec<A> {}

impl<A> Codec<A> for JsonCodec<A>
where
    A: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &A) -> Result<Value, EncodeError> {
        Ok(serde_json::to_value(value)?)
    }

    fn decode(&self, json: &Value) -> Result<A, DecodeError> {
        Ok(A::deserialize(json)?)
    }
}

/// Applies `codec` to an already-parsed document.
pub fn decode_with_codec<A, C>(codec: &C, json: &Value) -> Result<A, DecodeError>
where
    C: Codec<A> + ?Sized,
{
    codec.decode(json)
}
