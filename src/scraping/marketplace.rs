//! Marketplace scan: browser session lifecycle plus the extract → price →
//! score pipeline.
//!
//! One scan walks Init → Navigate → AwaitReady → IncrementalLoad → Extract →
//! Finalize. Only a failed Init aborts; every later stage degrades to fewer
//! (possibly zero) listings and the session is always quit before returning.

use crate::core::config::ScannerSettings;
use crate::core::{Harvest, ScanError};
use crate::scoring::{estimate_resale_value, parse_price, profit_potential};
use crate::scraping::browser_manager::{BrowserLauncher, BrowserSession};
use crate::scraping::extractor::ListingExtractor;
use crate::types::{Listing, RawFragment, ScanRequest, PLATFORM};
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};
use url::Url;

const PAGE_HEIGHT_SCRIPT: &str =
    "Math.max(document.body.scrollHeight, document.documentElement.scrollHeight)";
const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

pub struct MarketplaceScanner {
    launcher: Arc<dyn BrowserLauncher>,
    settings: ScannerSettings,
    extractor: ListingExtractor,
    search_base: Url,
}

impl std::fmt::Debug for MarketplaceScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceScanner")
            .field("origin", &self.settings.origin)
            .field("max_items", &self.settings.max_items)
            .finish()
    }
}

impl MarketplaceScanner {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        settings: ScannerSettings,
    ) -> Result<Self, url::ParseError> {
        let extractor = ListingExtractor::for_origin(&settings.origin)?;
        let search_base = extractor.origin().join(&settings.search_path)?;
        Ok(Self {
            launcher,
            settings,
            extractor,
            search_base,
        })
    }

    pub fn settings(&self) -> &ScannerSettings {
        &self.settings
    }

    /// Search page for the fixed category and coordinates, capped at `max_price`.
    pub fn search_url(&self, max_price: f64) -> Url {
        let mut url = self.search_base.clone();
        url.query_pairs_mut()
            .append_pair("keywords", &self.settings.keywords)
            .append_pair("latitude", &self.settings.latitude.to_string())
            .append_pair("longitude", &self.settings.longitude.to_string())
            .append_pair("max_sale_price", &max_price.to_string());
        url
    }

    /// Never fails: problems are logged and show up as a shorter result list.
    pub async fn scan(&self, request: &ScanRequest) -> Vec<Listing> {
        let mut session = match self.launcher.launch(&self.settings.browser).await {
            Ok(session) => session,
            Err(e) => {
                error!("Scan aborted, {}", e);
                return Vec::new();
            }
        };

        let listings = self.drive(session.as_mut(), request).await;

        if let Err(e) = session.quit().await {
            warn!("Browser teardown error (non-fatal): {}", e);
        }

        info!(
            "Scan for '{}' under {} finished with {} listings",
            request.location,
            request.max_price,
            listings.len()
        );
        listings
    }

    async fn drive(&self, session: &mut dyn BrowserSession, request: &ScanRequest) -> Vec<Listing> {
        let url = self.search_url(request.max_price);
        info!("🌐 Navigating to {}", url);
        if let Err(e) = session.navigate(url.as_str()).await {
            warn!("{}", e);
            return Vec::new();
        }

        if let Err(e) = self.await_ready(session).await {
            info!("{}, treating as no listings", e);
            return Vec::new();
        }

        if let Err(e) = self.incremental_load(session).await {
            warn!("Incremental load stopped early: {}", e);
        }

        let html = match session.page_source().await {
            Ok(html) => html,
            Err(e) => {
                warn!("{}", e);
                return Vec::new();
            }
        };

        let fragments = self.extractor.extract(&html, self.settings.max_items);
        let harvest = self.assemble(fragments, request);
        if harvest.dropped() > 0 {
            info!("{} fragments dropped for unparseable prices", harvest.dropped());
        }
        harvest.into_items()
    }

    /// Poll until a listing card exists or the ready timeout elapses.
    async fn await_ready(&self, session: &mut dyn BrowserSession) -> Result<(), ScanError> {
        let selector = self.extractor.ready_selector();
        let timeout = self.settings.ready_timeout;
        let deadline = Instant::now() + timeout;

        loop {
            match session.element_present(&selector).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => debug!("ready probe failed: {}", e),
            }
            if Instant::now() >= deadline {
                return Err(ScanError::RenderTimeout(timeout));
            }
            sleep(self.settings.ready_poll).await;
        }
    }

    /// Scroll to the bottom up to `scroll_rounds` times, stopping once the
    /// page height stops growing. Returns the number of scrolls performed.
    async fn incremental_load(&self, session: &mut dyn BrowserSession) -> Result<usize, ScanError> {
        let mut last_height = page_height(session).await?;
        let mut rounds = 0;

        while rounds < self.settings.scroll_rounds {
            session.execute_script(SCROLL_TO_BOTTOM_SCRIPT).await?;
            rounds += 1;
            sleep(self.settings.scroll_pause).await;

            let new_height = page_height(session).await?;
            if new_height == last_height {
                debug!("page height settled at {} after {} scrolls", new_height, rounds);
                break;
            }
            last_height = new_height;
        }
        Ok(rounds)
    }

    /// Parse, filter and score fragments. Unparseable prices are dropped into
    /// the harvest; fragments over budget are filtered silently.
    pub fn assemble(&self, fragments: Vec<RawFragment>, request: &ScanRequest) -> Harvest<Listing> {
        fragments
            .into_iter()
            .filter_map(|fragment| to_listing(fragment, request).transpose())
            .collect()
    }
}

fn to_listing(fragment: RawFragment, request: &ScanRequest) -> Result<Option<Listing>, ScanError> {
    let price = parse_price(&fragment.price_text).ok_or_else(|| {
        ScanError::FragmentParse(format!(
            "no price in '{}' for '{}'",
            fragment.price_text, fragment.title
        ))
    })?;

    if price > request.max_price {
        debug!("'{}' at {} is over budget", fragment.title, price);
        return Ok(None);
    }

    let estimated_resale = estimate_resale_value(&fragment.title, price);
    Ok(Some(Listing {
        profit_potential: profit_potential(price, estimated_resale),
        estimated_resale,
        price,
        title: fragment.title,
        platform: PLATFORM.to_string(),
        location: request.location.clone(),
        link: fragment.link,
    }))
}

async fn page_height(session: &mut dyn BrowserSession) -> Result<u64, ScanError> {
    let value = session.execute_script(PAGE_HEIGHT_SCRIPT).await?;
    value
        .as_u64()
        .or_else(|| value.as_f64().map(|h| h.max(0.0) as u64))
        .ok_or_else(|| ScanError::Browser(format!("page height was not a number: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::BrowserSettings;
    use async_trait::async_trait;

    struct NoBrowser;

    #[async_trait]
    impl BrowserLauncher for NoBrowser {
        async fn launch(
            &self,
            _settings: &BrowserSettings,
        ) -> Result<Box<dyn BrowserSession>, ScanError> {
            Err(ScanError::Session("no browser in unit tests".into()))
        }
    }

    fn scanner() -> MarketplaceScanner {
        MarketplaceScanner::new(Arc::new(NoBrowser), ScannerSettings::default()).unwrap()
    }

    fn fragment(title: &str, price_text: &str) -> RawFragment {
        RawFragment {
            title: title.into(),
            price_text: price_text.into(),
            link: format!("https://es.wallapop.com/item/{}", title.len()),
        }
    }

    #[test]
    fn search_url_carries_coordinates_and_budget() {
        let url = scanner().search_url(25.0);
        assert_eq!(
            url.as_str(),
            "https://es.wallapop.com/app/search?keywords=electronics&latitude=37.9838&longitude=-1.1297&max_sale_price=25"
        );
    }

    #[test]
    fn assemble_filters_by_budget_and_drops_unparseable() {
        let request = ScanRequest::new("Murcia", 25.0);
        let harvest = scanner().assemble(
            vec![
                fragment("iPhone 7", "15 €"),
                fragment("PlayStation 4", "30 €"),
                fragment("Cable USB", "Gratis"),
                fragment("Libro", "25,00 €"),
            ],
            &request,
        );
        assert_eq!(harvest.dropped(), 1);
        let listings = harvest.into_items();
        assert_eq!(listings.len(), 2);
        assert!(listings.iter().all(|l| l.price <= 25.0));
        assert_eq!(listings[0].platform, PLATFORM);
        assert_eq!(listings[0].location, "Murcia");
        assert!((listings[0].estimated_resale - 22.5).abs() < 1e-9);
        assert!((listings[1].profit_potential - 100.0).abs() < 1e-9);
    }

    #[test]
    fn session_failure_yields_empty_scan() {
        let listings = tokio_test::block_on(scanner().scan(&ScanRequest::default()));
        assert!(listings.is_empty());
    }
}
