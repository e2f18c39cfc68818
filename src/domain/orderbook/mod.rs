/// Domain Layer - OrderBook Module
///
/// Aggregated, price-level order book built from a stream of order events.
///
/// ## Components
/// - `PriceLevelIndex`: fixed-size sliding window of levels per side,
///   recentred when prices walk off either end
/// - `OrderLifecycleManager`: per-order ledger that turns add/delete/modify/
///   replace/exec events into level updates
/// - `BookSnapshot`: top-N rendering with VWAP
///
/// ## Trait Abstraction
/// `AggregatedBook` exposes best level, spread and mid price for anything
/// that can report its top of book.

pub mod lifecycle;
pub mod price_level_index;
pub mod snapshot;
pub mod traits;

pub use lifecycle::{BookUpdate, OrderLifecycleManager, OrderRecord};
pub use price_level_index::{PriceLevelIndex, PriceLevelRecord, RebuildStats};
pub use snapshot::{BookSnapshot, LevelView};
pub use traits::AggregatedBook;
