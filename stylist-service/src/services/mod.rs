//! Services for stylist-service.

pub mod composer;
pub mod database;
pub mod metrics;
pub mod quota;
pub mod scoring;
pub mod wardrobe;
pub mod weather;

pub use composer::{OutfitComposer, TopPickComposer};
pub use database::Database;
pub use quota::{GenerationEventStore, MonthlyQuotaService, SubscriptionSource};
pub use scoring::WeatherItemScorer;
pub use wardrobe::WardrobeStore;
pub use weather::{OpenMeteoProvider, WeatherProvider};
