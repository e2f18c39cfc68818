//! AggregatedBook Trait - read side of an aggregated order book
//!
//! Anything that can report its best level per side gets spread and mid
//! price for free. Implemented by the level window itself and by the
//! lifecycle manager that owns it.
//!
//! ## Example
//! ```rust
//! use book_builder::domain::orderbook::{AggregatedBook, OrderLifecycleManager};
//! use book_builder::shared::{BookConfig, Side};
//!
//! let config = BookConfig::new("AMZN", 0.01).unwrap();
//! let mut book = OrderLifecycleManager::new(&config);
//! book.add(1, Side::Bid, 100.00, 10).unwrap();
//! book.add(2, Side::Ask, 100.03, 5).unwrap();
//! assert_eq!(book.spread_ticks(), Some(3));
//! ```

use crate::domain::orderbook::price_level_index::{PriceLevelIndex, PriceLevelRecord};
use crate::shared::protocol::Side;

pub trait AggregatedBook {
    /// Best occupied level of one side, `None` when the side is empty
    fn best_level(&self, side: Side) -> Option<PriceLevelRecord>;

    fn best_bid(&self) -> Option<PriceLevelRecord> {
        self.best_level(Side::Bid)
    }

    fn best_ask(&self) -> Option<PriceLevelRecord> {
        self.best_level(Side::Ask)
    }

    /// Spread in ticks (best_ask - best_bid); may be zero or negative since
    /// the book never matches
    fn spread_ticks(&self) -> Option<i64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.int_price - bid.int_price),
            _ => None,
        }
    }

    /// Midpoint price ((best_bid + best_ask) / 2)
    fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid.price + ask.price) / 2.0),
            _ => None,
        }
    }
}

impl AggregatedBook for PriceLevelIndex {
    fn best_level(&self, side: Side) -> Option<PriceLevelRecord> {
        if !self.is_built() || self.is_book_empty(side) {
            return None;
        }
        Some(*self.level(side, self.base_index(side)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockBook {
        bid: Option<PriceLevelRecord>,
        ask: Option<PriceLevelRecord>,
    }

    impl AggregatedBook for MockBook {
        fn best_level(&self, side: Side) -> Option<PriceLevelRecord> {
            match side {
                Side::Bid => self.bid,
                Side::Ask => self.ask,
            }
        }
    }

    fn level(int_price: i64, price: f64) -> PriceLevelRecord {
        PriceLevelRecord { int_price, price, size: 1, order_count: 1 }
    }

    #[test]
    fn test_trait_spread_calculation() {
        let mock = MockBook {
            bid: Some(level(99, 0.99)),
            ask: Some(level(101, 1.01)),
        };

        assert_eq!(mock.spread_ticks(), Some(2));
        assert!((mock.mid_price().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_trait_one_sided_book() {
        let mock = MockBook { bid: Some(level(99, 0.99)), ask: None };

        assert_eq!(mock.spread_ticks(), None);
        assert_eq!(mock.mid_price(), None);
    }
}
