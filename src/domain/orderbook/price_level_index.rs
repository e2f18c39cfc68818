//! 基于Tick的滑动窗口价格层索引
//!
//! 核心设计：
//! 1. **价格离散化** - 价格换算成整数tick，索引运算全部用整数
//! 2. **Array索引** - 价格到数组位置 O(1)，无需查找
//! 3. **固定容量窗口** - 每边 `2 * anchor_offset + 1` 个价格层
//! 4. **重新居中** - 最优价越界时整体平移，保留仍在窗口内的价格层
//!
//! Array position grows with aggressiveness on both sides: a higher index is a
//! higher bid or a lower ask. Every slot always carries the tick that the
//! linear relation assigns to it, so an occupied slot and an empty slot differ
//! only in their size and order count.
//!
//! The index knows nothing about individual orders. Callers pass positions in
//! `[0, capacity)`; anything else is a bug in the caller and panics on the
//! slice access.

use serde::Serialize;
use std::ops::Range;

use crate::shared::config::BookConfig;
use crate::shared::protocol::Side;

/// 价格层记录（聚合数量与订单数）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriceLevelRecord {
    /// 整数价格 = price / min_price_increment
    pub int_price: i64,
    /// 价格
    pub price: f64,
    /// 该价位累计数量
    pub size: i64,
    /// 该价位累计订单数
    pub order_count: i64,
}

impl PriceLevelRecord {
    #[inline]
    fn fresh(int_price: i64, min_price_increment: f64) -> Self {
        Self {
            int_price,
            price: int_price as f64 * min_price_increment,
            size: 0,
            order_count: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size <= 0 || self.order_count <= 0
    }
}

/// Counters for window (re)construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    pub builds: u64,
    pub high_access: u64,
    pub low_access: u64,
}

/// One side of the window
#[derive(Debug, Clone)]
struct SideLevels {
    levels: Vec<PriceLevelRecord>,
    /// 最优价位置
    base_index: usize,
}

impl SideLevels {
    fn new(capacity: usize) -> Self {
        Self {
            levels: vec![PriceLevelRecord::default(); capacity],
            base_index: 0,
        }
    }

    /// Re-prices `range` so that `anchor_int_price` sits at `anchor` and zeroes the slots
    fn refill(
        &mut self,
        side: Side,
        range: Range<usize>,
        anchor: usize,
        anchor_int_price: i64,
        min_price_increment: f64,
    ) {
        for index in range {
            let int_price = anchor_int_price + side.direction() * (index as i64 - anchor as i64);
            self.levels[index] = PriceLevelRecord::fresh(int_price, min_price_increment);
        }
    }
}

/// 双边价格层索引
#[derive(Debug, Clone)]
pub struct PriceLevelIndex {
    min_price_increment: f64,
    anchor_offset: usize,
    low_water_mark: usize,
    bids: SideLevels,
    asks: SideLevels,
    built: bool,
    stats: RebuildStats,
}

impl PriceLevelIndex {
    /// Creates an unbuilt, empty index; the window is positioned by the first
    /// [`build_index`](Self::build_index)
    pub fn new(config: &BookConfig) -> Self {
        let capacity = config.window_capacity();
        Self {
            min_price_increment: config.min_price_increment,
            anchor_offset: config.anchor_offset,
            low_water_mark: config.low_water_mark,
            bids: SideLevels::new(capacity),
            asks: SideLevels::new(capacity),
            built: false,
            stats: RebuildStats::default(),
        }
    }

    #[inline]
    fn side(&self, side: Side) -> &SideLevels {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    #[inline]
    fn side_mut(&mut self, side: Side) -> &mut SideLevels {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    #[inline]
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// 每边价格层数
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bids.levels.len()
    }

    #[inline]
    pub fn anchor_offset(&self) -> usize {
        self.anchor_offset
    }

    #[inline]
    pub fn low_water_mark(&self) -> usize {
        self.low_water_mark
    }

    #[inline]
    pub fn min_price_increment(&self) -> f64 {
        self.min_price_increment
    }

    pub fn stats(&self) -> RebuildStats {
        self.stats
    }

    /// 价格转整数tick（四舍五入到最近的tick）
    #[inline]
    pub fn to_int_price(&self, price: f64) -> i64 {
        (price / self.min_price_increment).round() as i64
    }

    /// 整数tick转价格
    #[inline]
    pub fn to_price(&self, int_price: i64) -> f64 {
        int_price as f64 * self.min_price_increment
    }

    #[inline]
    pub fn base_index(&self, side: Side) -> usize {
        self.side(side).base_index
    }

    #[inline]
    pub fn set_base_index(&mut self, side: Side, index: usize) {
        debug_assert!(index < self.capacity(), "base index {index} outside window");
        self.side_mut(side).base_index = index;
    }

    /// 价格转数组位置（O(1)算术运算），结果可能落在窗口之外
    ///
    /// ```text
    /// bid: base_index - (base_price - int_price)
    /// ask: base_index + (base_price - int_price)
    /// ```
    #[inline]
    pub fn index_of(&self, side: Side, int_price: i64) -> isize {
        let book = self.side(side);
        let base_price = book.levels[book.base_index].int_price;
        book.base_index as isize + (side.direction() * (int_price - base_price)) as isize
    }

    /// Position of `int_price` when it is representable in the current window
    #[inline]
    pub fn position(&self, side: Side, int_price: i64) -> Option<usize> {
        usize::try_from(self.index_of(side, int_price))
            .ok()
            .filter(|&index| index < self.capacity())
    }

    #[inline]
    pub fn level(&self, side: Side, index: usize) -> &PriceLevelRecord {
        &self.side(side).levels[index]
    }

    #[inline]
    pub fn int_price_at(&self, side: Side, index: usize) -> i64 {
        self.side(side).levels[index].int_price
    }

    /// Centres both sides around `int_price`, discarding everything they held
    ///
    /// The side that triggers the build keeps `int_price` at the anchor; the
    /// other side starts one tick away so the initial book is touching, never
    /// crossed.
    pub fn build_index(&mut self, side: Side, int_price: i64) {
        let bid_int_price = match side {
            Side::Bid => int_price,
            Side::Ask => int_price - 1,
        };
        let ask_int_price = bid_int_price + 1;

        let anchor = self.anchor_offset;
        let capacity = self.capacity();
        let tick = self.min_price_increment;

        self.bids.refill(Side::Bid, 0..capacity, anchor, bid_int_price, tick);
        self.asks.refill(Side::Ask, 0..capacity, anchor, ask_int_price, tick);
        self.bids.base_index = anchor;
        self.asks.base_index = anchor;

        self.built = true;
        self.stats.builds += 1;
        tracing::debug!(bid_int_price, ask_int_price, capacity, "level window built");
    }

    /// Overwrites a slot with cumulative values; a negative value resets the slot
    pub fn update_level(&mut self, side: Side, index: usize, size: i64, order_count: i64) {
        if size < 0 || order_count < 0 {
            self.reset_level(side, index);
            return;
        }
        let level = &mut self.side_mut(side).levels[index];
        level.size = size;
        level.order_count = order_count;
    }

    /// 清空价格层
    ///
    /// Bid slots lose size and order count; ask slots lose only the order count.
    /// Either way the slot reads as empty afterwards.
    pub fn reset_level(&mut self, side: Side, index: usize) {
        let level = &mut self.side_mut(side).levels[index];
        match side {
            Side::Bid => {
                level.size = 0;
                level.order_count = 0;
            }
            Side::Ask => level.order_count = 0,
        }
    }

    /// Recentres after `new_int_price` ran past the aggressive end of the window
    ///
    /// Slot `i` takes the contents of slot `i + offset`, the base moves back to
    /// the anchor and the vacated slots at the top get fresh prices. Levels
    /// pushed off the bottom are gone for good.
    pub fn rebuild_high_access(&mut self, side: Side, new_int_price: i64) {
        let anchor = self.anchor_offset;
        let offset = side.direction() * (new_int_price - self.int_price_at(side, anchor));
        if offset < 0 {
            return self.rebuild_low_access(side, new_int_price);
        }

        let capacity = self.capacity();
        let tick = self.min_price_increment;
        let shift = usize::try_from(offset).map_or(capacity, |shift| shift.min(capacity));

        let book = self.side_mut(side);
        if shift < capacity {
            book.levels.copy_within(shift.., 0);
        }
        book.base_index = anchor;
        book.refill(side, capacity - shift..capacity, anchor, new_int_price, tick);

        self.stats.high_access += 1;
        tracing::debug!(%side, new_int_price, offset, "window recentred (high access)");
    }

    /// Recentres after the best level fell into the low-water buffer
    ///
    /// Mirror of [`rebuild_high_access`](Self::rebuild_high_access): slots move
    /// up by `offset` and the vacated low slots are re-priced. Large jumps are
    /// clamped to the window size.
    pub fn rebuild_low_access(&mut self, side: Side, new_int_price: i64) {
        let anchor = self.anchor_offset;
        let offset = side.direction() * (self.int_price_at(side, anchor) - new_int_price);
        if offset < 0 {
            return self.rebuild_high_access(side, new_int_price);
        }

        let capacity = self.capacity();
        let tick = self.min_price_increment;
        let shift = usize::try_from(offset).map_or(capacity, |shift| shift.min(capacity));

        let book = self.side_mut(side);
        if shift < capacity {
            book.levels.copy_within(..capacity - shift, shift);
        }
        book.base_index = anchor;
        book.refill(side, 0..shift, anchor, new_int_price, tick);

        self.stats.low_access += 1;
        tracing::debug!(%side, new_int_price, offset, "window recentred (low access)");
    }

    #[inline]
    pub fn is_level_empty(&self, side: Side, index: usize) -> bool {
        self.level(side, index).is_empty()
    }

    #[inline]
    pub fn is_book_empty(&self, side: Side) -> bool {
        self.is_level_empty(side, self.base_index(side))
    }

    /// Occupied levels from the best downwards
    pub fn occupied_levels(&self, side: Side) -> impl Iterator<Item = &PriceLevelRecord> + '_ {
        let book = self.side(side);
        book.levels[..=book.base_index]
            .iter()
            .rev()
            .filter(|level| !level.is_empty())
    }

    /// Number of occupied levels strictly better than `int_price` (0 = best)
    pub fn depth_of(&self, side: Side, int_price: i64) -> usize {
        self.occupied_levels(side)
            .take_while(|level| side.direction() * (level.int_price - int_price) > 0)
            .count()
    }

    /// Drops every level and returns to the unbuilt state
    pub fn reset(&mut self) {
        let capacity = self.capacity();
        self.bids = SideLevels::new(capacity);
        self.asks = SideLevels::new(capacity);
        self.built = false;
    }
}
