//! Domain models for stylist-service.

pub mod tier;
pub mod usage;
pub mod wardrobe;
pub mod weather;

pub use tier::{SubscriptionRecord, Tier};
pub use usage::{GenerationEvent, QuotaDimension, UsageSnapshot};
pub use wardrobe::{NewWardrobeItem, Outfit, ScoredItem, WardrobeItem};
pub use weather::{CategoryAdvice, Season, TemperatureBand, WeatherContext};
