//! Pricing errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Caller errors raised by the pricing engine.
///
/// Unknown enumeration values are never an error; they resolve to the
/// defaults documented on each lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field {field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("Field {field} must be at least 1, got {value}")]
    InvalidCount { field: &'static str, value: i64 },

    #[error("discountPercent must be between 0 and 100, got {0}")]
    DiscountOutOfRange(Decimal),

    #[error("Arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    #[error("Line {index}: {source}")]
    Line {
        index: usize,
        #[source]
        source: Box<PricingError>,
    },
}

impl PricingError {
    pub fn at_line(self, index: usize) -> Self {
        Self::Line {
            index,
            source: Box::new(self),
        }
    }

    /// Name of the offending field, unwrapping line context.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(field)
            | Self::Negative { field, .. }
            | Self::InvalidCount { field, .. } => Some(*field),
            Self::DiscountOutOfRange(_) => Some("discountPercent"),
            Self::Overflow(_) => None,
            Self::Line { source, .. } => source.field(),
        }
    }
}

pub type PricingResult<T> = Result<T, PricingError>;
