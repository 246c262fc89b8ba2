pub mod enums;
pub mod error;
pub mod series;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::PriceField;
pub use error::CoreError;
pub use series::{PricePoint, PriceSeries, ReturnPoint, ReturnSeries};
pub use structs::PriceTable;
