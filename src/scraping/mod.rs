pub mod browser_manager;
pub mod extractor;
pub mod marketplace;
pub mod matcher;
