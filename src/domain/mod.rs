/// Domain Layer - Core Book Logic
///
/// Pure book-building rules with no I/O. Everything here can be driven
/// and tested without the service or CLI layers.
///
/// ## Modules
/// - `orderbook`: level window, order lifecycle, snapshots
/// - `validation`: event payload checks

pub mod orderbook;
pub mod validation;

pub use orderbook::{AggregatedBook, BookSnapshot, BookUpdate, OrderLifecycleManager, PriceLevelIndex};
