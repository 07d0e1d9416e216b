//! Batch decode coordination
//!
//! Decodes an ordered batch of call inputs against one registry. The batch
//! policy is explicit: the default mode always returns one outcome per input;
//! a compatibility mode gates the whole batch on the first input instead.

use serde::{Deserialize, Serialize};

use crate::domain::abi::{CalldataError, DecodeOutcome, DecodedCall};

use super::decoder::CallDecoder;

/// How a batch treats an unresolvable first input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// One outcome per input, always. Misses and bad items are carried as
    /// data in their slot.
    #[default]
    PerInput,
    /// If the first input resolves to no registered ABI, short-circuit and
    /// report a batch-level `NoAbi` instead of per-item results.
    GateOnFirst,
}

/// Outcome for one input of a batch.
///
/// Malformed hex is a client-input problem scoped to its slot; it never
/// aborts the rest of the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Decoded(DecodedCall),
    NoMatch,
    InvalidInput { error: String },
}

impl ItemOutcome {
    pub fn is_no_match(&self) -> bool {
        matches!(self, ItemOutcome::NoMatch)
    }
}

impl From<Result<DecodeOutcome, CalldataError>> for ItemOutcome {
    fn from(result: Result<DecodeOutcome, CalldataError>) -> Self {
        match result {
            Ok(DecodeOutcome::Decoded(call)) => ItemOutcome::Decoded(call),
            Ok(DecodeOutcome::NoMatch) => ItemOutcome::NoMatch,
            Err(err) => ItemOutcome::InvalidInput {
                error: err.to_string(),
            },
        }
    }
}

/// Result of a batch decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// One outcome per input, same order and cardinality
    Items { results: Vec<ItemOutcome> },
    /// Short-circuit under [`BatchPolicy::GateOnFirst`]: no ABI resolved the
    /// first input, nothing else was attempted
    NoAbi,
}

/// Runs batches of decodes through one [`CallDecoder`].
#[derive(Debug, Clone)]
pub struct DecodeCoordinator {
    decoder: CallDecoder,
    policy: BatchPolicy,
}

impl DecodeCoordinator {
    /// Create a coordinator with the default per-input policy
    pub fn new(decoder: CallDecoder) -> Self {
        Self::with_policy(decoder, BatchPolicy::default())
    }

    pub fn with_policy(decoder: CallDecoder, policy: BatchPolicy) -> Self {
        Self { decoder, policy }
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    /// Decode a batch of hex-encoded call inputs.
    ///
    /// Under `PerInput` the output has exactly one [`ItemOutcome`] per input,
    /// in input order. Under `GateOnFirst` a first input that no ABI resolves
    /// yields [`BatchOutcome::NoAbi`] without touching the rest; a malformed
    /// first input does not trigger the gate, it is a per-item error.
    pub fn decode_batch<I, S>(&self, inputs: I) -> BatchOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inputs = inputs.into_iter();
        let mut results = Vec::new();

        if let Some(first) = inputs.next() {
            let outcome: ItemOutcome = self.decoder.decode_hex(first.as_ref()).into();
            if self.policy == BatchPolicy::GateOnFirst && outcome.is_no_match() {
                return BatchOutcome::NoAbi;
            }
            results.push(outcome);
        }

        for input in inputs {
            results.push(self.decoder.decode_hex(input.as_ref()).into());
        }

        BatchOutcome::Items { results }
    }
}
