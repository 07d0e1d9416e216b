//! ABI domain models and contracts
//!
//! This module defines the registry and result types for call decoding,
//! independent of the underlying implementation (alloy-dyn-abi).

mod decoder;
mod registry;

pub use decoder::{CalldataError, DecodeOutcome, DecodedArg, DecodedCall};
pub use registry::{
    compute_selector, AbiFunction, AbiRegistry, ParamSpec, SelectorIndex, SharedRegistry,
};
