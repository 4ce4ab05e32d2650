use crate::scraping::marketplace::MarketplaceScanner;
use crate::types::{ScanRequest, ScanResponse, DEFAULT_LOCATION, DEFAULT_MAX_PRICE};
use tracing::{info, warn};

/// Build a request from raw caller arguments.
///
/// A missing location uses the default city. `max_price` must be a positive
/// integer; anything else (absent, `"abc"`, `"12.5"`, `"0"`) falls back to the
/// default budget.
pub fn resolve_request(location: Option<&str>, max_price: Option<&str>) -> ScanRequest {
    let location = location
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LOCATION);

    let max_price = match max_price.map(str::trim) {
        None | Some("") => DEFAULT_MAX_PRICE,
        Some(raw) => match raw.parse::<i64>() {
            Ok(v) if v > 0 => v as f64,
            _ => {
                warn!("Ignoring max_price '{}', using {}", raw, DEFAULT_MAX_PRICE);
                DEFAULT_MAX_PRICE
            }
        },
    };

    ScanRequest::new(location, max_price)
}

/// Run one scan and wrap it in the response envelope. Always `success: true`;
/// an empty `results` list is how failures show up.
pub async fn scan_marketplace(scanner: &MarketplaceScanner, request: &ScanRequest) -> ScanResponse {
    info!(
        "Scanning marketplace near {} for items up to {}",
        request.location, request.max_price
    );
    let results = scanner.scan(request).await;
    ScanResponse {
        success: true,
        total_found: results.len(),
        results,
    }
}
