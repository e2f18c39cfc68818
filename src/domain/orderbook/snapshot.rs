//! Top-of-book snapshot
//!
//! Collects the best `N` occupied levels of each side, walking down from the
//! best level and skipping empty slots, together with a size-weighted
//! average price over exactly the levels collected.

use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

use crate::domain::orderbook::price_level_index::PriceLevelIndex;
use crate::shared::protocol::Side;

/// One rendered level
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelView {
    pub price: f64,
    pub int_price: i64,
    pub size: i64,
    pub order_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSnapshot {
    pub symbol: String,
    pub bids: SmallVec<[LevelView; 8]>,
    pub asks: SmallVec<[LevelView; 8]>,
    pub bid_vwap: f64,
    pub ask_vwap: f64,
    #[serde(skip)]
    price_decimals: usize,
}

impl BookSnapshot {
    pub fn capture(symbol: &str, index: &PriceLevelIndex, levels: usize) -> Self {
        let bids = Self::collect(index, Side::Bid, levels);
        let asks = Self::collect(index, Side::Ask, levels);
        Self {
            symbol: symbol.to_string(),
            bid_vwap: vwap(&bids),
            ask_vwap: vwap(&asks),
            bids,
            asks,
            price_decimals: decimals_for(index.min_price_increment()),
        }
    }

    fn collect(index: &PriceLevelIndex, side: Side, levels: usize) -> SmallVec<[LevelView; 8]> {
        if !index.is_built() {
            return SmallVec::new();
        }
        index
            .occupied_levels(side)
            .take(levels)
            .map(|level| LevelView {
                price: level.price,
                int_price: level.int_price,
                size: level.size,
                order_count: level.order_count,
            })
            .collect()
    }
}

/// Σ(price·size) / Σ(size), 0 when there is no size
pub fn vwap(levels: &[LevelView]) -> f64 {
    let (notional, total_size) = levels.iter().fold((0.0, 0i64), |(notional, total), level| {
        (notional + level.price * level.size as f64, total + level.size)
    });
    if total_size == 0 {
        0.0
    } else {
        notional / total_size as f64
    }
}

/// Decimal places needed to print a multiple of `tick`
fn decimals_for(tick: f64) -> usize {
    let mut scaled = tick;
    let mut decimals = 0;
    while decimals < 9 && (scaled - scaled.round()).abs() > 1e-9 {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}

impl fmt::Display for BookSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.price_decimals;
        writeln!(f, "{}", self.symbol)?;
        let rows = self.bids.len().max(self.asks.len());
        for row in 0..rows {
            match self.bids.get(row) {
                Some(bid) => write!(
                    f,
                    "{:>5} {:>5} {:>10.dp$} {:>8}",
                    bid.size, bid.order_count, bid.price, bid.int_price
                )?,
                None => write!(f, "{:>5} {:>5} {:>10} {:>8}", "-", "-", "-", "-")?,
            }
            write!(f, " X ")?;
            match self.asks.get(row) {
                Some(ask) => writeln!(
                    f,
                    "{:<8} {:<10.dp$} {:<5} {:<5}",
                    ask.int_price, ask.price, ask.order_count, ask.size
                )?,
                None => writeln!(f, "{:<8} {:<10} {:<5} {:<5}", "-", "-", "-", "-")?,
            }
        }
        write!(f, "VWAP {:.4} X {:.4}", self.bid_vwap, self.ask_vwap)
    }
}
