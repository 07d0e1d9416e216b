//! ABI infrastructure - alloy-based call decoding, batch coordination, and
//! ABI source lookup

mod coordinator;
mod decoder;
mod fetcher;

pub use coordinator::{BatchOutcome, BatchPolicy, DecodeCoordinator, ItemOutcome};
pub use decoder::CallDecoder;
pub use fetcher::{AbiFetcher, CommandAbiFetcher, SourcifyFetcher};
