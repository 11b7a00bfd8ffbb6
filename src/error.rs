//! Error types for the marquee
//!
//! None of these are fatal to the host page. The controller logs them and
//! degrades: no animation, or an animation starting from position zero.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum MarqueeError {
    /// The key-value store could not be read or written
    #[error("storage unavailable: {0}")]
    Storage(String),

    /// A persisted value could not be encoded or decoded
    #[error("invalid persisted state: {0}")]
    Serialization(String),

    /// An element the component expects inside its host is missing
    #[error("missing element: {0}")]
    MissingStructure(&'static str),

    /// A browser API call threw
    #[error("browser call failed: {0}")]
    Js(String),
}

impl From<serde_json::Error> for MarqueeError {
    fn from(err: serde_json::Error) -> Self {
        MarqueeError::Serialization(err.to_string())
    }
}

impl From<wasm_bindgen::JsValue> for MarqueeError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        MarqueeError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

pub type Result<T> = std::result::Result<T, MarqueeError>;
