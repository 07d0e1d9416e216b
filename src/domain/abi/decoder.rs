//! Decode result model
//!
//! Output types for call decoding, independent of the decoding
//! implementation (alloy-dyn-abi). A miss is data, not an error: the only
//! error the decode path produces is [`CalldataError`] for input that does
//! not parse as bytes at all.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A decoded function argument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedArg {
    /// Parameter name (or "arg{n}" if unnamed)
    pub name: String,
    /// Canonical Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
    /// Decoded value rendered exactly: decimal for integers (arbitrary
    /// precision, never through floating point), 0x-hex for bytes and
    /// addresses, the full string for strings
    pub value: String,
}

/// Result of decoding a function call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedCall {
    /// Function name
    pub function_name: String,
    /// Full function signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Decoded arguments, in declaration order
    pub arguments: Vec<DecodedArg>,
}

/// Outcome of a single decode attempt.
///
/// `NoMatch` covers every expected miss: empty input, input shorter than the
/// 4-byte selector, a selector nobody registered, and argument bytes no
/// registered candidate can decode. An ABI-less contract is a common case,
/// so none of these are errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecodeOutcome {
    Decoded(DecodedCall),
    NoMatch,
}

impl DecodeOutcome {
    pub fn is_no_match(&self) -> bool {
        matches!(self, DecodeOutcome::NoMatch)
    }

    pub fn as_decoded(&self) -> Option<&DecodedCall> {
        match self {
            DecodeOutcome::Decoded(call) => Some(call),
            DecodeOutcome::NoMatch => None,
        }
    }
}

/// Client-input error: the call input is not a valid byte-string encoding.
///
/// Reported distinctly from [`DecodeOutcome::NoMatch`]; a caller that sends
/// odd-length or non-hex input gets this back instead of a miss.
#[derive(Debug, Error)]
pub enum CalldataError {
    #[error("call input is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
