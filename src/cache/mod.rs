//! Local response cache for the command layer.

pub mod manager;

pub use manager::{Cached, CacheManager};
