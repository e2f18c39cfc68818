//! Error types shared by the book, its configuration and the replay tooling.

use crate::shared::protocol::Side;

/// Reasons an event is rejected. None of them are fatal: the event is dropped
/// and the book stays exactly as it was before the event arrived.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BookError {
    #[error("{side} order {order_id} already present")]
    DuplicateOrder { order_id: u64, side: Side },

    #[error("{side} order {order_id} not present")]
    UnknownOrder { order_id: u64, side: Side },

    #[error("side is neither B nor S: {0:?}")]
    InvalidSide(char),

    #[error("{side} order {order_id} at tick {int_price} lies below the visible window")]
    OutOfWindow { order_id: u64, side: Side, int_price: i64 },

    #[error("book not ready, dropping exec for order {order_id}")]
    NotReady { order_id: u64 },

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid size: {0}")]
    InvalidSize(String),
}

impl BookError {
    /// Stable label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            BookError::DuplicateOrder { .. } => "duplicate_order",
            BookError::UnknownOrder { .. } => "unknown_order",
            BookError::InvalidSide(_) => "invalid_side",
            BookError::OutOfWindow { .. } => "out_of_window",
            BookError::NotReady { .. } => "not_ready",
            BookError::InvalidPrice(_) => "invalid_price",
            BookError::InvalidSize(_) => "invalid_size",
        }
    }
}

/// Configuration errors, raised when a book is constructed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("min price increment must be positive and finite, got {0}")]
    InvalidPriceIncrement(f64),

    #[error("anchor offset must be greater than zero")]
    ZeroAnchorOffset,

    #[error("low water mark {low_water_mark} must be below anchor offset {anchor_offset}")]
    LowWaterMarkTooHigh {
        low_water_mark: usize,
        anchor_offset: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BookError::UnknownOrder { order_id: 42, side: Side::Ask };
        assert_eq!(err.to_string(), "ask order 42 not present");
        assert_eq!(err.reason(), "unknown_order");

        let err = BookError::InvalidSide('Q');
        assert_eq!(err.to_string(), "side is neither B nor S: 'Q'");
    }
}
