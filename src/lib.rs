//! Abidex: contract ABI registry and call-input decoding
//!
//! ABI documents are registered into a selector-keyed registry; raw call
//! inputs (`selector || encoded-arguments`) decode against the registered
//! entries or resolve to an explicit no-match result.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod store;
