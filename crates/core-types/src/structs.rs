use crate::enums::PriceField;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A raw price table for a single asset, as handed over by a price history provider.
///
/// Columns are optional because providers do not always deliver every field.
/// A column that is present holds exactly one value per timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    pub symbol: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub close: Option<Vec<Decimal>>,
    pub adj_close: Option<Vec<Decimal>>,
}

impl PriceTable {
    /// Creates an empty table with no price columns.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timestamps: Vec::new(),
            close: None,
            adj_close: None,
        }
    }

    pub fn with_column(mut self, field: PriceField, values: Vec<Decimal>) -> Self {
        match field {
            PriceField::AdjClose => self.adj_close = Some(values),
            PriceField::Close => self.close = Some(values),
        }
        self
    }

    pub fn with_timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Returns the values of a column, if the provider delivered it.
    pub fn column(&self, field: PriceField) -> Option<&[Decimal]> {
        match field {
            PriceField::AdjClose => self.adj_close.as_deref(),
            PriceField::Close => self.close.as_deref(),
        }
    }

    /// The first column present in `PriceField::PREFERENCE` order.
    pub fn canonical_field(&self) -> Option<PriceField> {
        PriceField::PREFERENCE
            .into_iter()
            .find(|field| self.column(*field).is_some())
    }

    /// Number of rows (timestamps) in the table.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Checks that every present column is aligned with the timestamps.
    pub fn validate_shape(&self) -> Result<(), CoreError> {
        for field in PriceField::PREFERENCE {
            if let Some(values) = self.column(field) {
                if values.len() != self.timestamps.len() {
                    return Err(CoreError::ColumnLength {
                        column: field.column_name(),
                        expected: self.timestamps.len(),
                        actual: values.len(),
                    });
                }
            }
        }
        Ok(())
    }
}
