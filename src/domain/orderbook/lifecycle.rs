//! Order lifecycle manager
//!
//! Keeps one ledger per side (`order_id -> OrderRecord`) and drives the
//! [`PriceLevelIndex`] from add / delete / modify / replace / exec events.
//! Delete, modify and exec arrive with only an order id; the ledger is what
//! resolves them back to a price level in O(1).
//!
//! Every check that can reject an event runs before the first mutation, so a
//! rejected event leaves both ledgers and the level window untouched.

use std::collections::HashMap;
use tracing::{debug, info, trace, warn};

use crate::domain::orderbook::price_level_index::{PriceLevelIndex, PriceLevelRecord};
use crate::domain::orderbook::snapshot::BookSnapshot;
use crate::domain::orderbook::traits::AggregatedBook;
use crate::domain::validation::EventValidator;
use crate::shared::config::BookConfig;
use crate::shared::error::BookError;
use crate::shared::protocol::Side;

/// 订单元数据
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderRecord {
    pub price: f64,
    pub size: i32,
    pub side: Side,
    /// Set once a recentring pushed the order's level out of the window;
    /// the order never contributes to a level again
    pub evicted: bool,
}

/// Where an accepted event landed in the book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookUpdate {
    pub side: Side,
    pub int_price: i64,
    /// Occupied levels strictly better than `int_price` after the event
    /// (0 = best level); `None` when the price lies outside the window
    pub depth: Option<usize>,
}

/// 订单生命周期管理器（单合约）
#[derive(Debug, Clone)]
pub struct OrderLifecycleManager {
    symbol: String,
    index: PriceLevelIndex,
    bid_orders: HashMap<u64, OrderRecord>,
    ask_orders: HashMap<u64, OrderRecord>,
    validator: EventValidator,
}

impl OrderLifecycleManager {
    pub fn new(config: &BookConfig) -> Self {
        Self::with_validator(config, EventValidator::new())
    }

    pub fn with_validator(config: &BookConfig, validator: EventValidator) -> Self {
        Self {
            symbol: config.symbol.clone(),
            index: PriceLevelIndex::new(config),
            bid_orders: HashMap::new(),
            ask_orders: HashMap::new(),
            validator,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Read access to the level window
    pub fn index(&self) -> &PriceLevelIndex {
        &self.index
    }

    /// Ledger entry of a live order
    pub fn order(&self, side: Side, order_id: u64) -> Option<&OrderRecord> {
        self.ledger(side).get(&order_id)
    }

    /// Number of live orders on one side
    pub fn live_orders(&self, side: Side) -> usize {
        self.ledger(side).len()
    }

    #[inline]
    fn ledger(&self, side: Side) -> &HashMap<u64, OrderRecord> {
        match side {
            Side::Bid => &self.bid_orders,
            Side::Ask => &self.ask_orders,
        }
    }

    #[inline]
    fn ledger_mut(&mut self, side: Side) -> &mut HashMap<u64, OrderRecord> {
        match side {
            Side::Bid => &mut self.bid_orders,
            Side::Ask => &mut self.ask_orders,
        }
    }

    /// Builds the window around `int_price` the first time an event needs it
    #[inline]
    fn ensure_built(&mut self, side: Side, int_price: i64) {
        if !self.index.is_built() {
            self.index.build_index(side, int_price);
        }
    }

    /// High recentring that flags every order whose level fell off the window
    fn recentre_high(&mut self, side: Side, int_price: i64) {
        self.index.rebuild_high_access(side, int_price);
        self.mark_evicted(side);
    }

    /// Low recentring, see [`recentre_high`](Self::recentre_high)
    fn recentre_low(&mut self, side: Side, int_price: i64) {
        self.index.rebuild_low_access(side, int_price);
        self.mark_evicted(side);
    }

    fn mark_evicted(&mut self, side: Side) {
        let index = &self.index;
        let ledger = match side {
            Side::Bid => &mut self.bid_orders,
            Side::Ask => &mut self.ask_orders,
        };
        let mut evicted = 0usize;
        for record in ledger.values_mut().filter(|record| !record.evicted) {
            if index.position(side, index.to_int_price(record.price)).is_none() {
                record.evicted = true;
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!(%side, evicted, "orders left behind by recentring");
        }
    }

    /// Rejects prices whose tick does not fit the window arithmetic
    fn check_price(&self, order_id: u64, side: Side, price: f64) -> Result<(), BookError> {
        self.validator
            .validate_price(price)
            .and_then(|()| self.validator.validate_ticks(price, self.index.min_price_increment()))
            .inspect_err(|err| {
                warn!(order_id, %side, %err, "rejecting price");
            })
    }

    /// Slot of a tracked order's level, `None` once the level was evicted
    #[inline]
    fn live_position(&self, record: &OrderRecord, int_price: i64) -> Option<usize> {
        if record.evicted {
            return None;
        }
        self.index.position(record.side, int_price)
    }

    fn unknown(order_id: u64, side: Side, event: &'static str) -> BookError {
        warn!(order_id, %side, event, "order not present, ignoring event");
        BookError::UnknownOrder { order_id, side }
    }

    fn duplicate(order_id: u64, side: Side, event: &'static str) -> BookError {
        warn!(order_id, %side, event, "order already present, ignoring event");
        BookError::DuplicateOrder { order_id, side }
    }

    /// A new order rests on the book
    pub fn add(
        &mut self,
        order_id: u64,
        side: Side,
        price: f64,
        size: i32,
    ) -> Result<BookUpdate, BookError> {
        trace!(order_id, %side, price, size, "add");
        self.validator.validate_add(price, size).inspect_err(|err| {
            warn!(order_id, %side, %err, "rejecting add");
        })?;
        self.check_price(order_id, side, price)?;
        if self.ledger(side).contains_key(&order_id) {
            return Err(Self::duplicate(order_id, side, "add"));
        }

        let int_price = self.index.to_int_price(price);
        self.ensure_built(side, int_price);

        let capacity = self.index.capacity() as isize;
        let low_water_mark = self.index.low_water_mark() as isize;
        let mut index = self.index.index_of(side, int_price);

        if self.index.is_book_empty(side) {
            // nothing to preserve: move the window to the new price if needed
            if index < low_water_mark {
                self.recentre_low(side, int_price);
                index = self.index.base_index(side) as isize;
            } else if index >= capacity {
                self.recentre_high(side, int_price);
                index = self.index.base_index(side) as isize;
            }
            self.index.set_base_index(side, index as usize);
        } else if index < 0 {
            warn!(order_id, %side, price, int_price, "order added way below the best level, ignoring");
            return Err(BookError::OutOfWindow { order_id, side, int_price });
        }

        if index >= capacity {
            self.recentre_high(side, int_price);
            index = self.index.base_index(side) as isize;
        }
        let index = index as usize;

        self.ledger_mut(side).insert(order_id, OrderRecord { price, size, side, evicted: false });

        let level = *self.index.level(side, index);
        if level.is_empty() {
            self.index.update_level(side, index, i64::from(size), 1);
        } else {
            self.index
                .update_level(side, index, level.size + i64::from(size), level.order_count + 1);
        }

        let best = self.index.base_index(side).max(index);
        self.index.set_base_index(side, best);

        Ok(BookUpdate {
            side,
            int_price,
            depth: Some(self.index.depth_of(side, int_price)),
        })
    }

    /// A resting order leaves the book
    pub fn delete(&mut self, order_id: u64, side: Side) -> Result<BookUpdate, BookError> {
        trace!(order_id, %side, "delete");
        let record = self
            .ledger_mut(side)
            .remove(&order_id)
            .ok_or_else(|| Self::unknown(order_id, side, "delete"))?;

        let int_price = self.index.to_int_price(record.price);
        let Some(index) = self.live_position(&record, int_price) else {
            debug!(order_id, %side, int_price, "level no longer in window, ledger entry dropped");
            return Ok(BookUpdate { side, int_price, depth: None });
        };

        let was_best = index == self.index.base_index(side);
        let level = *self.index.level(side, index);
        self.index.update_level(
            side,
            index,
            level.size - i64::from(record.size),
            level.order_count - 1,
        );

        if was_best && self.index.is_level_empty(side, index) {
            self.retreat_best(side);
        }

        Ok(BookUpdate {
            side,
            int_price,
            depth: Some(self.index.depth_of(side, int_price)),
        })
    }

    /// Same-price size change, optionally re-keying the order under `new_order_id`
    ///
    /// The level keeps its order count; only the aggregate size moves by
    /// `new_size - old_size`. A non-positive `new_size` removes the order.
    pub fn modify(
        &mut self,
        order_id: u64,
        side: Side,
        new_size: i32,
        new_order_id: u64,
    ) -> Result<BookUpdate, BookError> {
        trace!(order_id, %side, new_size, new_order_id, "modify");
        let record = *self
            .ledger(side)
            .get(&order_id)
            .ok_or_else(|| Self::unknown(order_id, side, "modify"))?;

        if new_size <= 0 {
            return self.delete(order_id, side);
        }
        self.validator.validate_size(new_size).inspect_err(|err| {
            warn!(order_id, %side, %err, "rejecting modify");
        })?;
        if new_order_id != order_id && self.ledger(side).contains_key(&new_order_id) {
            return Err(Self::duplicate(new_order_id, side, "modify"));
        }

        let int_price = self.index.to_int_price(record.price);
        let ledger = self.ledger_mut(side);
        ledger.remove(&order_id);
        ledger.insert(new_order_id, OrderRecord { size: new_size, ..record });

        let Some(index) = self.live_position(&record, int_price) else {
            debug!(order_id, %side, int_price, "level no longer in window, ledger entry updated");
            return Ok(BookUpdate { side, int_price, depth: None });
        };

        let level = *self.index.level(side, index);
        self.index.update_level(
            side,
            index,
            level.size - i64::from(record.size) + i64::from(new_size),
            level.order_count,
        );

        Ok(BookUpdate {
            side,
            int_price,
            depth: Some(self.index.depth_of(side, int_price)),
        })
    }

    /// Price and/or size change
    ///
    /// Same tick: handled as [`modify`](Self::modify). New tick: delete the
    /// old order and add `new_order_id` at the new price, or only delete when
    /// `new_size <= 0`.
    pub fn replace(
        &mut self,
        order_id: u64,
        side: Side,
        new_price: f64,
        new_size: i32,
        new_order_id: u64,
    ) -> Result<BookUpdate, BookError> {
        trace!(order_id, %side, new_price, new_size, new_order_id, "replace");
        let Some(record) = self.ledger(side).get(&order_id).copied() else {
            debug!(order_id, %side, "replace for untracked order, ignoring");
            return Err(BookError::UnknownOrder { order_id, side });
        };
        self.check_price(order_id, side, new_price)?;

        if self.index.to_int_price(record.price) == self.index.to_int_price(new_price) {
            return self.modify(order_id, side, new_size, new_order_id);
        }
        if new_size <= 0 {
            return self.delete(order_id, side);
        }

        // the add half must not fail after the delete half went through
        self.validator.validate_add(new_price, new_size).inspect_err(|err| {
            warn!(order_id, %side, %err, "rejecting replace");
        })?;
        if new_order_id != order_id && self.ledger(side).contains_key(&new_order_id) {
            return Err(Self::duplicate(new_order_id, side, "replace"));
        }

        self.delete(order_id, side)?;
        self.add(new_order_id, side, new_price, new_size)
    }

    /// A resting order traded; what is left stays on the book under the same id
    pub fn exec(
        &mut self,
        order_id: u64,
        side: Side,
        price: f64,
        size_executed: i32,
    ) -> Result<BookUpdate, BookError> {
        trace!(order_id, %side, price, size_executed, "exec");
        if !self.index.is_built()
            || self.index.is_book_empty(Side::Bid)
            || self.index.is_book_empty(Side::Ask)
        {
            warn!(order_id, %side, "book not ready, dropping exec");
            return Err(BookError::NotReady { order_id });
        }

        let record = *self
            .ledger(side)
            .get(&order_id)
            .ok_or_else(|| Self::unknown(order_id, side, "exec"))?;

        let remaining = record.size.saturating_sub(size_executed);
        if remaining > 0 {
            self.modify(order_id, side, remaining, order_id)
        } else {
            self.delete(order_id, side)
        }
    }

    /// Flushes every order and returns the window to its unbuilt state
    pub fn reset_begin(&mut self) {
        info!(
            symbol = %self.symbol,
            bids = self.bid_orders.len(),
            asks = self.ask_orders.len(),
            "resetting order book, flushing all orders"
        );
        self.index.reset();
        self.bid_orders.clear();
        self.ask_orders.clear();
    }

    /// Marks the end of a reset; the book rebuilds lazily on the next event
    pub fn reset_end(&mut self) {
        debug!(symbol = %self.symbol, "reset complete");
    }

    /// Walks the best pointer down to the next occupied level after the best
    /// level emptied
    ///
    /// Empty slots passed on the way are reset. When no occupied level is left
    /// the pointer stays where it is and the side reads as empty.
    fn retreat_best(&mut self, side: Side) {
        let base = self.index.base_index(side);
        let mut next = None;
        for index in (0..base).rev() {
            if !self.index.is_level_empty(side, index) {
                next = Some(index);
                break;
            }
            self.index.reset_level(side, index);
        }

        let Some(next) = next else {
            debug!(%side, "no levels left");
            return;
        };
        self.index.set_base_index(side, next);
        debug!(%side, from = base, to = next, "best level retreated");

        if next < self.index.low_water_mark() {
            let int_price = self.index.int_price_at(side, next);
            self.recentre_low(side, int_price);
        }
    }

    /// Top `levels` occupied levels per side plus their VWAP
    pub fn snapshot(&self, levels: usize) -> BookSnapshot {
        BookSnapshot::capture(&self.symbol, &self.index, levels)
    }
}

impl AggregatedBook for OrderLifecycleManager {
    fn best_level(&self, side: Side) -> Option<PriceLevelRecord> {
        self.index.best_level(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> OrderLifecycleManager {
        OrderLifecycleManager::new(&BookConfig::new("TEST", 0.01).unwrap())
    }

    fn small_manager() -> OrderLifecycleManager {
        let config = BookConfig::new("TEST", 1.0)
            .unwrap()
            .with_window(10, 3)
            .unwrap();
        OrderLifecycleManager::new(&config)
    }

    fn best(book: &OrderLifecycleManager, side: Side) -> (i64, i64, i64) {
        let level = book.best_level(side).expect("side has a best level");
        (level.int_price, level.size, level.order_count)
    }

    #[test]
    fn test_first_add_builds_window() {
        let mut book = manager();
        let update = book.add(1, Side::Bid, 100.00, 10).unwrap();

        assert!(book.index().is_built());
        assert_eq!(update, BookUpdate { side: Side::Bid, int_price: 10_000, depth: Some(0) });
        assert_eq!(best(&book, Side::Bid), (10_000, 10, 1));
        assert!(book.best_ask().is_none());
    }

    #[test]
    fn test_duplicate_add_rejected_without_change() {
        let mut book = manager();
        book.add(1, Side::Bid, 100.00, 10).unwrap();

        let err = book.add(1, Side::Bid, 100.05, 3).unwrap_err();
        assert_eq!(err, BookError::DuplicateOrder { order_id: 1, side: Side::Bid });
        assert_eq!(best(&book, Side::Bid), (10_000, 10, 1));
        assert_eq!(book.order(Side::Bid, 1).unwrap().size, 10);

        // the same id on the other side is a different order
        assert!(book.add(1, Side::Ask, 100.05, 3).is_ok());
    }

    #[test]
    fn test_add_below_window_is_dropped() {
        let mut book = small_manager();
        book.add(1, Side::Bid, 100.0, 5).unwrap();

        // 100 sits at index 10; 89 maps to -1
        let err = book.add(2, Side::Bid, 89.0, 5).unwrap_err();
        assert_eq!(
            err,
            BookError::OutOfWindow { order_id: 2, side: Side::Bid, int_price: 89 }
        );
        assert!(book.order(Side::Bid, 2).is_none());
        assert_eq!(book.live_orders(Side::Bid), 1);
    }

    #[test]
    fn test_add_above_window_recentres() {
        let mut book = small_manager();
        book.add(1, Side::Bid, 100.0, 5).unwrap();
        book.add(2, Side::Bid, 96.0, 4).unwrap();
        book.add(3, Side::Bid, 107.0, 2).unwrap();
        assert_eq!(book.index().base_index(Side::Bid), 17);

        // 112 maps to index 22, past the 21 slot window
        let update = book.add(4, Side::Bid, 112.0, 1).unwrap();
        assert_eq!(update.depth, Some(0));
        assert_eq!(book.index().base_index(Side::Bid), 10);
        assert_eq!(best(&book, Side::Bid), (112, 1, 1));

        // window is now 102..=122: 107 survives, 100 and 96 are evicted
        let levels: Vec<_> = book
            .index()
            .occupied_levels(Side::Bid)
            .map(|l| (l.int_price, l.size))
            .collect();
        assert_eq!(levels, vec![(112, 1), (107, 2)]);

        // evicted orders are still tracked and can be deleted cleanly
        let update = book.delete(1, Side::Bid).unwrap();
        assert_eq!(update.depth, None);
        assert!(book.order(Side::Bid, 1).is_none());
        assert_eq!(best(&book, Side::Bid), (112, 1, 1));
    }

    #[test]
    fn test_evicted_order_never_touches_a_returning_level() {
        let mut book = small_manager();
        book.add(1, Side::Bid, 100.0, 10).unwrap();
        // 112 is index 22: recentring evicts 100
        book.add(2, Side::Bid, 112.0, 1).unwrap();
        assert!(book.order(Side::Bid, 1).unwrap().evicted);

        // the emptied side relocates back over 100
        book.delete(2, Side::Bid).unwrap();
        book.add(3, Side::Bid, 100.0, 5).unwrap();
        assert_eq!(best(&book, Side::Bid), (100, 5, 1));

        let update = book.delete(1, Side::Bid).unwrap();
        assert_eq!(update.depth, None);
        assert_eq!(best(&book, Side::Bid), (100, 5, 1));
        assert!(book.order(Side::Bid, 3).is_some());
    }

    #[test]
    fn test_modify_evicted_order_updates_ledger_only() {
        let mut book = small_manager();
        book.add(1, Side::Ask, 100.0, 10).unwrap();
        // asks improve downwards: 88 is index 22
        book.add(2, Side::Ask, 88.0, 1).unwrap();
        book.delete(2, Side::Ask).unwrap();
        book.add(3, Side::Ask, 100.0, 5).unwrap();

        let update = book.modify(1, Side::Ask, 3, 11).unwrap();
        assert_eq!(update.depth, None);
        assert_eq!(best(&book, Side::Ask), (100, 5, 1));
        let record = book.order(Side::Ask, 11).unwrap();
        assert_eq!(record.size, 3);
        assert!(record.evicted);
    }

    #[test]
    fn test_add_into_empty_side_relocates_window() {
        let mut book = small_manager();
        book.add(1, Side::Bid, 100.0, 5).unwrap();
        // ask window is anchored at 101; 140 maps far below slot 0
        book.add(2, Side::Ask, 140.0, 2).unwrap();
        assert_eq!(best(&book, Side::Ask), (140, 2, 1));
        assert_eq!(book.index().base_index(Side::Ask), 10);

        // an empty side also follows a price far below the window
        book.delete(1, Side::Bid).unwrap();
        book.add(3, Side::Bid, 20.0, 9).unwrap();
        assert_eq!(best(&book, Side::Bid), (20, 9, 1));
    }

    #[test]
    fn test_add_into_empty_side_within_bounds_moves_pointer() {
        let mut book = small_manager();
        book.add(1, Side::Ask, 105.0, 5).unwrap();
        // bid window anchored at 104; 98 is index 4, just above the low water mark
        book.add(2, Side::Bid, 98.0, 1).unwrap();
        assert_eq!(book.index().base_index(Side::Bid), 4);
        assert_eq!(best(&book, Side::Bid), (98, 1, 1));
    }

    #[test]
    fn test_best_pointer_only_improves_on_add() {
        let mut book = small_manager();
        book.add(1, Side::Bid, 100.0, 5).unwrap();
        let update = book.add(2, Side::Bid, 97.0, 5).unwrap();
        assert_eq!(update.depth, Some(1));
        assert_eq!(best(&book, Side::Bid), (100, 5, 1));

        book.add(3, Side::Bid, 102.0, 1).unwrap();
        assert_eq!(best(&book, Side::Bid), (102, 1, 1));
    }

    #[test]
    fn test_delete_best_retreats_and_resets_gaps() {
        let mut book = small_manager();
        book.add(1, Side::Ask, 100.0, 5).unwrap();
        book.add(2, Side::Ask, 103.0, 7).unwrap();

        let update = book.delete(1, Side::Ask).unwrap();
        assert_eq!(update.depth, Some(0));
        assert_eq!(best(&book, Side::Ask), (103, 7, 1));

        book.delete(2, Side::Ask).unwrap();
        assert!(book.best_ask().is_none());
        assert_eq!(book.live_orders(Side::Ask), 0);
    }

    #[test]
    fn test_retreat_into_low_water_buffer_recentres() {
        let mut book = small_manager();
        book.add(1, Side::Bid, 100.0, 5).unwrap();
        // 92 sits at index 2, inside the low-water buffer of 3
        book.add(2, Side::Bid, 92.0, 4).unwrap();

        book.delete(1, Side::Bid).unwrap();
        assert_eq!(book.index().base_index(Side::Bid), 10);
        assert_eq!(best(&book, Side::Bid), (92, 4, 1));
        assert_eq!(book.index().stats().low_access, 1);
    }

    #[test]
    fn test_unrepresentable_prices_rejected() {
        let mut book = manager();
        book.add(1, Side::Bid, 100.0, 10).unwrap();
        let before = book.snapshot(10);

        for price in [1e20, -1e20, f64::MAX] {
            assert!(matches!(
                book.add(2, Side::Bid, price, 1),
                Err(BookError::InvalidPrice(_))
            ));
        }
        assert!(matches!(
            book.replace(1, Side::Bid, -1e20, 1, 1),
            Err(BookError::InvalidPrice(_))
        ));

        assert_eq!(book.snapshot(10), before);
        assert_eq!(book.live_orders(Side::Bid), 1);
    }

    #[test]
    fn test_delete_unknown() {
        let mut book = manager();
        assert_eq!(
            book.delete(9, Side::Ask),
            Err(BookError::UnknownOrder { order_id: 9, side: Side::Ask })
        );
        book.add(9, Side::Bid, 10.0, 1).unwrap();
        assert!(book.delete(9, Side::Ask).is_err());
        assert!(book.order(Side::Bid, 9).is_some());
    }

    #[test]
    fn test_modify_rekeys_and_keeps_count() {
        let mut book = manager();
        book.add(1, Side::Bid, 50.00, 10).unwrap();
        book.add(2, Side::Bid, 50.00, 6).unwrap();

        book.modify(1, Side::Bid, 4, 11).unwrap();
        assert!(book.order(Side::Bid, 1).is_none());
        assert_eq!(book.order(Side::Bid, 11).unwrap().size, 4);
        assert_eq!(best(&book, Side::Bid), (5_000, 10, 2));

        // re-keyed order deletes through its new id
        book.delete(11, Side::Bid).unwrap();
        assert_eq!(best(&book, Side::Bid), (5_000, 6, 1));
    }

    #[test]
    fn test_modify_into_existing_id_rejected() {
        let mut book = manager();
        book.add(1, Side::Bid, 50.00, 10).unwrap();
        book.add(2, Side::Bid, 49.99, 6).unwrap();

        assert_eq!(
            book.modify(1, Side::Bid, 3, 2),
            Err(BookError::DuplicateOrder { order_id: 2, side: Side::Bid })
        );
        assert_eq!(book.order(Side::Bid, 1).unwrap().size, 10);
        assert_eq!(best(&book, Side::Bid), (5_000, 10, 1));
    }

    #[test]
    fn test_replace_same_tick_is_modify() {
        let mut book = manager();
        book.add(1, Side::Ask, 20.00, 10).unwrap();
        book.replace(1, Side::Ask, 20.001, 12, 5).unwrap();

        assert_eq!(best(&book, Side::Ask), (2_000, 12, 1));
        assert_eq!(book.order(Side::Ask, 5).unwrap().price, 20.00);
    }

    #[test]
    fn test_replace_new_price_moves_order() {
        let mut book = manager();
        book.add(1, Side::Ask, 20.00, 10).unwrap();
        book.add(2, Side::Ask, 20.05, 1).unwrap();

        let update = book.replace(1, Side::Ask, 20.03, 8, 3).unwrap();
        assert_eq!(update.int_price, 2_003);
        assert_eq!(update.depth, Some(0));
        assert!(book.order(Side::Ask, 1).is_none());
        assert_eq!(best(&book, Side::Ask), (2_003, 8, 1));
        assert_eq!(book.index().depth_of(Side::Ask, 2_005), 1);
    }

    #[test]
    fn test_replace_zero_size_deletes() {
        let mut book = manager();
        book.add(1, Side::Ask, 20.00, 10).unwrap();
        book.add(2, Side::Ask, 20.02, 10).unwrap();

        book.replace(1, Side::Ask, 20.01, 0, 1).unwrap();
        assert!(book.order(Side::Ask, 1).is_none());
        assert_eq!(best(&book, Side::Ask), (2_002, 10, 1));

        book.replace(2, Side::Ask, 20.02, 0, 2).unwrap();
        assert!(book.best_ask().is_none());
    }

    #[test]
    fn test_replace_untracked_is_noop() {
        let mut book = manager();
        book.add(1, Side::Bid, 20.00, 10).unwrap();
        assert!(book.replace(7, Side::Bid, 21.00, 5, 8).is_err());
        assert!(book.order(Side::Bid, 8).is_none());
        assert_eq!(best(&book, Side::Bid), (2_000, 10, 1));
    }

    #[test]
    fn test_exec_requires_both_sides() {
        let mut book = manager();
        assert_eq!(book.exec(1, Side::Bid, 1.0, 1), Err(BookError::NotReady { order_id: 1 }));

        book.add(1, Side::Bid, 10.00, 5).unwrap();
        assert_eq!(book.exec(1, Side::Bid, 10.00, 1), Err(BookError::NotReady { order_id: 1 }));
        assert_eq!(book.order(Side::Bid, 1).unwrap().size, 5);

        book.add(2, Side::Ask, 10.01, 5).unwrap();
        assert_eq!(
            book.exec(3, Side::Ask, 10.01, 1),
            Err(BookError::UnknownOrder { order_id: 3, side: Side::Ask })
        );
    }

    #[test]
    fn test_exec_partial_then_full() {
        let mut book = manager();
        book.add(1, Side::Bid, 10.00, 5).unwrap();
        book.add(2, Side::Ask, 10.01, 5).unwrap();

        book.exec(2, Side::Ask, 10.01, 2).unwrap();
        assert_eq!(book.order(Side::Ask, 2).unwrap().size, 3);
        assert_eq!(best(&book, Side::Ask), (1_001, 3, 1));

        book.exec(2, Side::Ask, 10.01, 3).unwrap();
        assert!(book.order(Side::Ask, 2).is_none());
        assert!(book.best_ask().is_none());
    }

    #[test]
    fn test_reset_flushes_everything() {
        let mut book = manager();
        book.add(1, Side::Bid, 10.00, 5).unwrap();
        book.add(2, Side::Ask, 10.01, 5).unwrap();

        book.reset_begin();
        book.reset_end();

        assert!(!book.index().is_built());
        assert_eq!(book.live_orders(Side::Bid), 0);
        assert_eq!(book.live_orders(Side::Ask), 0);
        assert!(book.best_bid().is_none());

        // rebuilt around the next event
        book.add(3, Side::Ask, 55.00, 1).unwrap();
        assert_eq!(best(&book, Side::Ask), (5_500, 1, 1));
        assert_eq!(book.index().int_price_at(Side::Bid, book.index().anchor_offset()), 5_499);
    }

    #[test]
    fn test_invalid_payloads_rejected() {
        let mut book = manager();
        assert!(matches!(
            book.add(1, Side::Bid, f64::NAN, 5),
            Err(BookError::InvalidSize(_)) | Err(BookError::InvalidPrice(_))
        ));
        assert!(matches!(book.add(1, Side::Bid, 10.0, 0), Err(BookError::InvalidSize(_))));
        assert!(!book.index().is_built());
    }
}
