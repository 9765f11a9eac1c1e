//! Content transforms applied between the remote and local representations.
//!
//! - [`script_codec`] - base64 wire form ⇄ line-array file form
//! - [`env`] - environment parameterization of serialized entities

pub mod env;
pub mod script_codec;

pub use env::EnvironmentMap;
pub use script_codec::{decode_text, decode_to_lines, encode_lines, encode_text};
