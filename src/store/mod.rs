mod abi_cache;

pub use abi_cache::{AbiCache, CachedAbi};
