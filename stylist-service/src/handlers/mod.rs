//! HTTP handlers for stylist-service.

pub mod generate;
pub mod usage;
pub mod wardrobe;

pub use generate::generate_outfit;
pub use usage::get_usage;
pub use wardrobe::{add_wardrobe_item, score_wardrobe};
