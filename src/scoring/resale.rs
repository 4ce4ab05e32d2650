//! Rule-based resale estimation.
//!
//! A listing title is lowercased and checked against [`CATEGORY_RULES`] in
//! order. The first row with a keyword contained in the title decides the
//! markup multiplier; titles matching nothing use [`DEFAULT_MULTIPLIER`].

use crate::types::{Recommendation, ScoreResult};
use serde::Serialize;

/// Profit percentage at or above which `analyze` recommends buying.
pub const BUY_THRESHOLD_PERCENT: f64 = 30.0;

/// Markup for titles that match no category.
pub const DEFAULT_MULTIPLIER: f64 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Phones,
    Laptops,
    Tablets,
    Consoles,
    Audio,
    Accessories,
    Books,
    Other,
}

#[derive(Debug)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: &'static [&'static str],
    pub multiplier: f64,
}

/// Evaluated top to bottom; the row order is the tie-break for titles that
/// mention several categories.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Phones,
        keywords: &["iphone", "samsung", "smartphone", "móvil"],
        multiplier: 1.5,
    },
    CategoryRule {
        category: Category::Laptops,
        keywords: &["laptop", "portátil", "macbook"],
        multiplier: 1.4,
    },
    CategoryRule {
        category: Category::Tablets,
        keywords: &["tablet", "ipad"],
        multiplier: 1.3,
    },
    CategoryRule {
        category: Category::Consoles,
        keywords: &["consola", "playstation", "xbox", "nintendo"],
        multiplier: 1.6,
    },
    CategoryRule {
        category: Category::Audio,
        keywords: &["auriculares", "headphones", "airpods"],
        multiplier: 1.4,
    },
    CategoryRule {
        category: Category::Accessories,
        keywords: &["cargador", "cable", "adaptador"],
        multiplier: 1.8,
    },
    CategoryRule {
        category: Category::Books,
        keywords: &["libro", "book"],
        multiplier: 2.0,
    },
];

/// First rule whose keywords appear in `title`, if any.
pub fn matching_rule(title: &str) -> Option<&'static CategoryRule> {
    let lower = title.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
}

pub fn classify(title: &str) -> Category {
    matching_rule(title)
        .map(|rule| rule.category)
        .unwrap_or(Category::Other)
}

pub fn multiplier_for(title: &str) -> f64 {
    matching_rule(title)
        .map(|rule| rule.multiplier)
        .unwrap_or(DEFAULT_MULTIPLIER)
}

pub fn estimate_resale_value(title: &str, price: f64) -> f64 {
    price * multiplier_for(title)
}

/// Signed percentage change from `buy_price` to `estimated_resale`.
/// A zero buy price yields `0.0`.
pub fn profit_potential(buy_price: f64, estimated_resale: f64) -> f64 {
    if buy_price == 0.0 {
        return 0.0;
    }
    (estimated_resale - buy_price) / buy_price * 100.0
}

pub fn recommend(profit_potential: f64) -> Recommendation {
    if profit_potential >= BUY_THRESHOLD_PERCENT {
        Recommendation::Buy
    } else {
        Recommendation::Skip
    }
}

pub fn score_item(title: &str, price: f64) -> ScoreResult {
    let estimated_resale = estimate_resale_value(title, price);
    let profit = profit_potential(price, estimated_resale);
    ScoreResult {
        title: title.to_string(),
        buy_price: price,
        estimated_resale,
        profit_potential: profit,
        recommendation: recommend(profit),
    }
}
