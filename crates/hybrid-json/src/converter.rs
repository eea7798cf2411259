//! [`Converter`]: the `encode`/`decode` pair a host registers for scripts.
//!
//! The converter holds only options. Registering it under a module name,
//! and turning a [`Reply`] into host return values, is up to the host.

use crate::json::{
    DecodeError, DecoderOptions, EncodeError, EncoderOptions, JsonDecoder, JsonEncoder,
};
use crate::value::Value;

/// What `encode` produces when the caller supplied no value at all.
pub const EMPTY_ARGUMENT_JSON: &str = "{}";

/// Host-facing result: a value, or no value plus an error message.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub value: Option<T>,
    pub error: Option<String>,
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Reply<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Reply {
                value: Some(value),
                error: None,
            },
            Err(e) => Reply {
                value: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Converter {
    pub encoder: EncoderOptions,
    pub decoder: DecoderOptions,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(encoder: EncoderOptions, decoder: DecoderOptions) -> Self {
        Self { encoder, decoder }
    }

    /// Encodes `value` to JSON text.
    ///
    /// `None` means the caller passed no argument and renders as `{}`; an
    /// explicit [`Value::Null`] renders as `null`.
    pub fn encode(&self, value: Option<&Value>) -> Result<String, EncodeError> {
        let Some(value) = value else {
            return Ok(EMPTY_ARGUMENT_JSON.to_owned());
        };
        match JsonEncoder::with_options(self.encoder).encode(value) {
            Ok(text) => {
                tracing::trace!(kind = value.type_name(), len = text.len(), "encoded value");
                Ok(text)
            }
            Err(e) => {
                tracing::debug!(kind = value.type_name(), error = %e, "encode rejected");
                Err(e)
            }
        }
    }

    /// Decodes JSON text. `"null"` yields `Ok(Value::Null)`.
    pub fn decode(&self, text: &str) -> Result<Value, DecodeError> {
        match JsonDecoder::with_options(self.decoder).decode_str(text) {
            Ok(value) => {
                tracing::trace!(kind = value.type_name(), len = text.len(), "decoded value");
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(position = e.position(), error = %e, "decode rejected");
                Err(e)
            }
        }
    }

    pub fn encode_reply(&self, value: Option<&Value>) -> Reply<String> {
        self.encode(value).into()
    }

    pub fn decode_reply(&self, text: &str) -> Reply<Value> {
        self.decode(text).into()
    }
}
