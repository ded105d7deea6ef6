//! Domain types for PriceLab

pub mod ids;
pub mod price_point;
pub mod series;

pub use ids::DatasetHash;
pub use price_point::PricePoint;
pub use series::{Series, SeriesError};
