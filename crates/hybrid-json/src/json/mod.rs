//! JSON encoder/decoder for [`Value`](crate::Value).

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod util;

pub use decoder::{DecoderOptions, JsonDecoder};
pub use encoder::{EncoderOptions, JsonEncoder};
pub use error::{DecodeError, EncodeError};

/// Default nesting limit for both directions.
pub const DEFAULT_MAX_DEPTH: usize = 512;
