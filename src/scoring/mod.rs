pub mod price;
pub mod resale;

pub use price::parse_price;
pub use resale::{estimate_resale_value, profit_potential, score_item, Category};
