//! Tolerant class matching for build-mangled markup.
//!
//! The marketplace ships class names both in a readable form (`item-card`)
//! and as CSS-module hashes (`CardItem-module__item___x7Gd2`). A node matches
//! when any of its class tokens contains any of the known fragments.

use scraper::ElementRef;

#[derive(Debug, Clone, Copy)]
pub struct ClassMatcher {
    fragments: &'static [&'static str],
}

pub const CONTAINER: ClassMatcher =
    ClassMatcher::new(&["item-card", "CardItem-module__item___"]);
pub const TITLE: ClassMatcher = ClassMatcher::new(&["item-title", "CardItem-module__title___"]);
pub const PRICE: ClassMatcher = ClassMatcher::new(&["item-price", "CardItem-module__price___"]);

impl ClassMatcher {
    pub const fn new(fragments: &'static [&'static str]) -> Self {
        Self { fragments }
    }

    /// True when any class token contains any known fragment.
    pub fn matches_classes<'a, I>(&self, classes: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        classes
            .into_iter()
            .any(|class| self.fragments.iter().any(|frag| class.contains(frag)))
    }

    /// Same test on a raw `class="..."` attribute value.
    pub fn matches_attr(&self, class_attr: &str) -> bool {
        self.matches_classes(class_attr.split_whitespace())
    }

    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        self.matches_classes(element.value().classes())
    }

    /// CSS selector list equivalent to this matcher for one tag, used where the
    /// check has to run inside the browser.
    pub fn css_selector(&self, tag: &str) -> String {
        self.fragments
            .iter()
            .map(|frag| format!("{}[class*=\"{}\"]", tag, frag))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readable_and_hashed_names_both_match() {
        assert!(CONTAINER.matches_attr("item-card"));
        assert!(CONTAINER.matches_attr("grid-cell CardItem-module__item___x7Gd2"));
        assert!(PRICE.matches_attr("item-price--big"));
        assert!(TITLE.matches_attr("CardItem-module__title___3kP0a ellipsis"));
    }

    #[test]
    fn unrelated_classes_do_not_match() {
        assert!(!CONTAINER.matches_attr("card item"));
        assert!(!CONTAINER.matches_attr(""));
        assert!(!PRICE.matches_attr("item-title"));
        assert!(!TITLE.matches_classes(Vec::<&str>::new()));
    }

    #[test]
    fn fragment_must_sit_inside_one_token() {
        // "item-" and "card" split across tokens is not a match
        assert!(!CONTAINER.matches_attr("item- card"));
    }

    #[test]
    fn css_selector_lists_every_fragment() {
        assert_eq!(
            CONTAINER.css_selector("div"),
            "div[class*=\"item-card\"], div[class*=\"CardItem-module__item___\"]"
        );
    }
}
