//! ABI registry - indexes function entries by 4-byte selector

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use alloy_json_abi::Function;
use alloy_primitives::keccak256;
use serde::{Deserialize, Serialize};

/// A function parameter specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    /// Canonical Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
}

/// One indexed function entry from an ABI document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiFunction {
    /// 4-byte function selector
    pub selector: [u8; 4],
    /// Function name
    pub name: String,
    /// Full canonical signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Input parameters, in declaration order
    pub inputs: Vec<ParamSpec>,
    /// Declared mutability ("view", "payable", ...); kept for completeness,
    /// never consulted during decoding
    pub state_mutability: String,
}

impl AbiFunction {
    /// Get selector as hex string
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }
}

/// Compute the 4-byte function selector from a canonical signature
pub fn compute_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Selector-keyed index of function entries.
///
/// Selectors are not unique across unrelated ABIs, so each selector maps to a
/// bucket of entries in insertion order. The decoder tries candidates in that
/// order, which makes collision resolution deterministic: the first-registered
/// entry wins.
#[derive(Debug, Default, Clone)]
pub struct SelectorIndex {
    buckets: HashMap<[u8; 4], Vec<AbiFunction>>,
}

impl SelectorIndex {
    /// Append a function entry to its selector's bucket.
    ///
    /// Returns the selector the entry was filed under. Duplicates are
    /// appended, never deduplicated; first-match-wins keeps decode outcomes
    /// stable regardless.
    pub fn index(&mut self, function: AbiFunction) -> [u8; 4] {
        let selector = function.selector;
        self.buckets.entry(selector).or_default().push(function);
        selector
    }

    /// Look up all entries registered for a selector, in registration order.
    /// A selector nobody registered yields an empty slice, not an error.
    pub fn lookup(&self, selector: [u8; 4]) -> &[AbiFunction] {
        self.buckets.get(&selector).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct selectors
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Get all selectors
    pub fn selectors(&self) -> impl Iterator<Item = &[u8; 4]> {
        self.buckets.keys()
    }
}

/// Registry of ABI function entries.
///
/// Append-only for the lifetime of the process: entries are never removed or
/// mutated after registration, and nothing is persisted. After a restart the
/// registry starts empty and is rebuilt by re-registration.
#[derive(Debug, Default, Clone)]
pub struct AbiRegistry {
    index: SelectorIndex,
    /// Total entries indexed (duplicates included)
    indexed_entries: usize,
}

impl AbiRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every well-formed function entry from a raw ABI JSON document.
    ///
    /// The document is an array of entry descriptions. Entries are filtered,
    /// not validated: anything that is not a `"type": "function"` object with
    /// a name and an input list (constructors, fallbacks, events, junk) is
    /// skipped silently, and one bad entry never fails the rest. A document
    /// with zero usable entries leaves the registry unchanged.
    ///
    /// Returns the number of entries indexed from this document.
    pub fn add_abi(&mut self, document: &serde_json::Value) -> usize {
        let Some(entries) = document.as_array() else {
            return 0;
        };

        let mut added = 0;
        for entry in entries {
            if entry.get("type").and_then(|t| t.as_str()) != Some("function") {
                continue;
            }
            let Ok(function) = serde_json::from_value::<Function>(entry.clone()) else {
                continue;
            };
            if function.name.is_empty() {
                continue;
            }
            self.add_function(abi_function_from(&function));
            added += 1;
        }
        added
    }

    /// Register a single already-parsed function entry
    pub fn add_function(&mut self, function: AbiFunction) {
        self.index.index(function);
        self.indexed_entries += 1;
    }

    /// All entries registered for a selector, in registration order
    pub fn candidates_for(&self, selector: [u8; 4]) -> &[AbiFunction] {
        self.index.lookup(selector)
    }

    /// Look up candidates by selector hex string (e.g., "0xa9059cbb")
    pub fn candidates_for_hex(&self, selector_hex: &str) -> &[AbiFunction] {
        let normalized = selector_hex
            .strip_prefix("0x")
            .or_else(|| selector_hex.strip_prefix("0X"))
            .unwrap_or(selector_hex);

        if normalized.len() != 8 {
            return &[];
        }
        let Ok(bytes) = hex::decode(normalized) else {
            return &[];
        };
        let Ok(selector) = <[u8; 4]>::try_from(bytes.as_slice()) else {
            return &[];
        };
        self.candidates_for(selector)
    }

    /// Number of distinct selectors
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Total entries indexed, duplicates included
    pub fn indexed_entries(&self) -> usize {
        self.indexed_entries
    }

    /// Get all selectors
    pub fn selectors(&self) -> impl Iterator<Item = &[u8; 4]> {
        self.index.selectors()
    }
}

fn abi_function_from(function: &Function) -> AbiFunction {
    let signature = function.signature();
    let selector = compute_selector(&signature);
    let inputs = function
        .inputs
        .iter()
        .map(|input| ParamSpec {
            name: input.name.clone(),
            kind: input.selector_type().into_owned(),
        })
        .collect();

    AbiFunction {
        selector,
        name: function.name.clone(),
        signature,
        inputs,
        state_mutability: format!("{:?}", function.state_mutability).to_lowercase(),
    }
}

/// Handle to one registry shared across registrations and decodes.
///
/// Registration takes the write lock and readers take the read lock, so a
/// lookup observes either the pre- or post-registration state, never a torn
/// bucket. Lookups never suspend and never touch I/O.
#[derive(Debug, Default, Clone)]
pub struct SharedRegistry {
    inner: Arc<RwLock<AbiRegistry>>,
}

impl SharedRegistry {
    /// Create a handle around a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an ABI document; returns the number of entries indexed
    pub fn add_abi(&self, document: &serde_json::Value) -> usize {
        self.write().add_abi(document)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, AbiRegistry> {
        self.inner.read().expect("registry lock poisoned")
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, AbiRegistry> {
        self.inner.write().expect("registry lock poisoned")
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
