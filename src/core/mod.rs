//! Core business logic abstractions

pub mod asset;
pub mod cache;
pub mod config;
pub mod dividend;
pub mod log;
pub mod quote;

// Re-export main types for cleaner imports
pub use asset::{Asset, AssetType, PagedAssets};
pub use cache::{CacheEntry, QUOTE_TTL, QuoteCache};
pub use quote::{Quote, QuoteProvider, QuoteSource};
