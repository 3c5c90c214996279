//! CLI command implementations.

pub mod deps;
pub mod ecosystems;
pub mod export;
pub mod version;
