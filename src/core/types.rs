use serde::{Deserialize, Serialize};

/// Label stamped on every listing produced by the scanner.
pub const PLATFORM: &str = "Marketplace";

pub const DEFAULT_LOCATION: &str = "Murcia";
pub const DEFAULT_MAX_PRICE: f64 = 25.0;

/// Parameters of a single scan. Built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub location: String,
    pub max_price: f64,
}

impl ScanRequest {
    pub fn new(location: impl Into<String>, max_price: f64) -> Self {
        Self {
            location: location.into(),
            max_price,
        }
    }
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION, DEFAULT_MAX_PRICE)
    }
}

/// A listing fragment as pulled out of the rendered markup, before the price
/// text is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFragment {
    pub title: String,
    pub price_text: String,
    pub link: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Listing {
    pub title: String,
    pub price: f64,
    pub platform: String,
    pub location: String,
    pub link: String,
    pub estimated_resale: f64,
    /// Percentage, e.g. `50.0` for a 1.5x resale estimate.
    pub profit_potential: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Skip,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY",
            Recommendation::Skip => "SKIP",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScoreResult {
    pub title: String,
    pub buy_price: f64,
    pub estimated_resale: f64,
    pub profit_potential: f64,
    pub recommendation: Recommendation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResponse {
    pub success: bool,
    pub results: Vec<Listing>,
    pub total_found: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
