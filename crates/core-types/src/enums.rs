use serde::{Deserialize, Serialize};

/// The price columns a provider may deliver for an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceField {
    /// Close adjusted for dividends and splits.
    AdjClose,
    Close,
}

impl PriceField {
    /// Canonical price columns in order of preference.
    pub const PREFERENCE: [PriceField; 2] = [PriceField::AdjClose, PriceField::Close];

    /// The column header used by end-of-day CSV exports.
    pub fn column_name(&self) -> &'static str {
        match self {
            PriceField::AdjClose => "Adj Close",
            PriceField::Close => "Close",
        }
    }
}
