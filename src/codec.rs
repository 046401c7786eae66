//! Session payload codecs
//!
//! A codec turns a session payload into the text stored under its key and back.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SessionError;

/// Encode/decode pair for session payloads of type `T`
pub trait SessionCodec<T>: Send + Sync + 'static {
    /// Encode a payload into its stored text form
    fn encode(&self, value: &T) -> Result<String, SessionError>;

    /// Decode a payload from stored text
    fn decode(&self, text: &str) -> Result<T, SessionError>;
}

/// JSON codec backed by serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T> SessionCodec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> Result<String, SessionError> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, text: &str) -> Result<T, SessionError> {
        Ok(serde_json::from_str(text)?)
    }
}
