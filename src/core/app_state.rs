use crate::core::config::{ScannerSettings, ScoutConfig};
use crate::scraping::browser_manager::{BrowserLauncher, ChromeLauncher};
use crate::scraping::marketplace::MarketplaceScanner;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppState {
    /// Stateless between requests; every scan launches its own browser.
    pub scanner: Arc<MarketplaceScanner>,
    /// File-based config loaded from `resale-scout.json`.
    pub config: Arc<ScoutConfig>,
}

impl AppState {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        settings: ScannerSettings,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            scanner: Arc::new(MarketplaceScanner::new(launcher, settings)?),
            config: Arc::new(ScoutConfig::default()),
        })
    }

    /// Production wiring: Chromium launcher, settings resolved from `config`.
    pub fn from_config(config: ScoutConfig) -> Result<Self, url::ParseError> {
        let settings = ScannerSettings::resolve(&config.scanner);
        let mut state = Self::new(Arc::new(ChromeLauncher::new()), settings)?;
        state.config = Arc::new(config);
        Ok(state)
    }
}
