pub mod core;
pub mod http;
pub mod scoring;
pub mod scraping;
pub mod tools;

// --- Primary core exports ---
pub use crate::core::types;
pub use crate::core::types::*;
pub use crate::core::AppState;

pub use scoring::{price, resale};
pub use scraping::{browser_manager, extractor, marketplace, matcher};
pub use tools::{analyze, scan};
