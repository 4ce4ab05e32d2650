//! Listing extraction from fully rendered search-result markup.

use crate::core::{Harvest, ScanError};
use crate::scraping::matcher::{self, ClassMatcher};
use crate::types::RawFragment;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::{debug, info};
use url::Url;

struct Selectors {
    div: Selector,
    p: Selector,
    span: Selector,
    any: Selector,
    anchor: Selector,
    anchor_href: Selector,
}

static SELECTORS: OnceLock<Selectors> = OnceLock::new();

fn selectors() -> &'static Selectors {
    SELECTORS.get_or_init(|| Selectors {
        div: Selector::parse("div").expect("valid selector"),
        p: Selector::parse("p").expect("valid selector"),
        span: Selector::parse("span").expect("valid selector"),
        any: Selector::parse("*").expect("valid selector"),
        anchor: Selector::parse("a").expect("valid selector"),
        anchor_href: Selector::parse("a[href]").expect("valid selector"),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    let raw = element.text().collect::<Vec<_>>().join(" ");
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = ElementRef<'a>>,
{
    candidates
        .into_iter()
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Resolve `href` against the marketplace origin. Only http(s) results are
/// accepted; anchors, `javascript:` and `mailto:` links are rejected.
pub fn normalize_link(origin: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
    {
        return None;
    }
    let absolute = origin.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute.to_string()),
        _ => None,
    }
}

/// Pulls `(title, price text, link)` triples out of listing cards.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    origin: Url,
    container: ClassMatcher,
    title: ClassMatcher,
    price: ClassMatcher,
}

impl ListingExtractor {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            container: matcher::CONTAINER,
            title: matcher::TITLE,
            price: matcher::PRICE,
        }
    }

    pub fn for_origin(origin: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(origin)?))
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// CSS selector that is present in the DOM once at least one card rendered.
    pub fn ready_selector(&self) -> String {
        self.container.css_selector("div")
    }

    /// Complete fragments from the first `max_items` candidate cards.
    pub fn extract(&self, html: &str, max_items: usize) -> Vec<RawFragment> {
        self.extract_harvest(html, max_items).into_items()
    }

    /// Like [`extract`](Self::extract) but keeps the count of dropped cards.
    pub fn extract_harvest(&self, html: &str, max_items: usize) -> Harvest<RawFragment> {
        let document = Html::parse_document(html);
        let sel = selectors();

        let harvest: Harvest<RawFragment> = document
            .select(&sel.div)
            .filter(|div| self.container.matches(div))
            .take(max_items)
            .map(|card| self.fragment(card))
            .collect();

        info!(
            "Extracted {} listing fragments ({} incomplete cards skipped)",
            harvest.len(),
            harvest.dropped()
        );
        harvest
    }

    fn fragment(&self, card: ElementRef<'_>) -> Result<RawFragment, ScanError> {
        let title = self
            .title_text(card)
            .ok_or_else(|| ScanError::FragmentParse("missing title".into()))?;
        let price_text = self
            .price_text(card)
            .ok_or_else(|| ScanError::FragmentParse(format!("missing price for '{}'", title)))?;
        let link = self
            .link(card)
            .ok_or_else(|| ScanError::FragmentParse(format!("missing link for '{}'", title)))?;

        debug!("fragment: {} | {} | {}", title, price_text, link);
        Ok(RawFragment {
            title,
            price_text,
            link,
        })
    }

    /// Dedicated title paragraph, else the first hyperlink's text.
    fn title_text(&self, card: ElementRef<'_>) -> Option<String> {
        let sel = selectors();
        first_text(card.select(&sel.p).filter(|p| self.title.matches(p)))
            .or_else(|| first_text(card.select(&sel.anchor)))
    }

    /// Dedicated price span, else any element carrying a price-like class.
    fn price_text(&self, card: ElementRef<'_>) -> Option<String> {
        let sel = selectors();
        first_text(card.select(&sel.span).filter(|s| self.price.matches(s)))
            .or_else(|| first_text(card.select(&sel.any).filter(|e| self.price.matches(e))))
    }

    fn link(&self, card: ElementRef<'_>) -> Option<String> {
        let sel = selectors();
        let anchor = card.select(&sel.anchor_href).next()?;
        let href = anchor.value().attr("href")?;
        normalize_link(&self.origin, href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://es.wallapop.com";

    fn extractor() -> ListingExtractor {
        ListingExtractor::for_origin(ORIGIN).unwrap()
    }

    fn card(title: &str, price: &str, href: &str) -> String {
        format!(
            r#"<div class="CardItem-module__item___a1B2c">
                 <a href="{href}">
                   <p class="CardItem-module__title___Zz9">{title}</p>
                   <span class="CardItem-module__price___Qq1">{price}</span>
                 </a>
               </div>"#
        )
    }

    fn page(cards: &[String]) -> String {
        format!("<html><body><main>{}</main></body></html>", cards.join("\n"))
    }

    #[test]
    fn extracts_hashed_class_cards() {
        let html = page(&[card("iPhone 12", "150 €", "/item/iphone-12-123")]);
        let fragments = extractor().extract(&html, 20);
        assert_eq!(
            fragments,
            vec![RawFragment {
                title: "iPhone 12".into(),
                price_text: "150 €".into(),
                link: "https://es.wallapop.com/item/iphone-12-123".into(),
            }]
        );
    }

    #[test]
    fn truncates_to_max_items() {
        let cards: Vec<String> = (0..25)
            .map(|i| card(&format!("Item {i}"), &format!("{i} €"), &format!("/item/{i}")))
            .collect();
        let fragments = extractor().extract(&page(&cards), 20);
        assert_eq!(fragments.len(), 20);
        assert_eq!(fragments[0].title, "Item 0");
        assert_eq!(fragments[19].title, "Item 19");
    }

    #[test]
    fn card_without_link_is_skipped() {
        let no_link = r#"<div class="item-card">
                           <p class="item-title">Xbox One</p>
                           <span class="item-price">40 €</span>
                         </div>"#
            .to_string();
        let html = page(&[no_link, card("iPad", "90 €", "/item/ipad")]);
        let harvest = extractor().extract_harvest(&html, 20);
        assert_eq!(harvest.dropped(), 1);
        let fragments = harvest.into_items();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].title, "iPad");
    }

    #[test]
    fn price_falls_back_to_any_price_like_element() {
        let html = page(&[r#"<div class="item-card">
                 <a href="/item/cable"><p class="item-title">Cable HDMI</p></a>
                 <div class="item-price-wrapper"><b>5,50</b> €</div>
               </div>"#
            .to_string()]);
        let fragments = extractor().extract(&html, 20);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].price_text, "5,50 €");
    }

    #[test]
    fn title_falls_back_to_first_link_text() {
        let html = page(&[r#"<div class="item-card">
                 <a href="/item/switch">Nintendo Switch</a>
                 <span class="item-price">120 €</span>
               </div>"#
            .to_string()]);
        let fragments = extractor().extract(&html, 20);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].title, "Nintendo Switch");
    }

    #[test]
    fn missing_price_is_skipped() {
        let html = page(&[r#"<div class="item-card">
                 <a href="/item/x"><p class="item-title">Sin precio</p></a>
               </div>"#
            .to_string()]);
        assert!(extractor().extract(&html, 20).is_empty());
    }

    #[test]
    fn page_without_cards_is_empty() {
        let html = "<html><body><div class=\"search-empty\">Nada</div></body></html>";
        assert!(extractor().extract(html, 20).is_empty());
    }

    #[test]
    fn link_normalization() {
        let origin = Url::parse(ORIGIN).unwrap();
        assert_eq!(
            normalize_link(&origin, "/item/abc").as_deref(),
            Some("https://es.wallapop.com/item/abc")
        );
        assert_eq!(
            normalize_link(&origin, "https://es.wallapop.com/item/abc").as_deref(),
            Some("https://es.wallapop.com/item/abc")
        );
        assert_eq!(normalize_link(&origin, "javascript:void(0)"), None);
        assert_eq!(normalize_link(&origin, "#top"), None);
        assert_eq!(normalize_link(&origin, "  "), None);
    }

    #[test]
    fn ready_selector_targets_cards() {
        assert!(extractor().ready_selector().contains("div[class*=\"item-card\"]"));
    }
}
