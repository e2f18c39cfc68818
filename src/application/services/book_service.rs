/// Book Service - event dispatch for a single instrument
///
/// Turns raw `BookEvent`s into calls on the `OrderLifecycleManager`,
/// keeps running counters and publishes Prometheus metrics for every event.
///
/// ## Architecture
/// - `apply` handles one event synchronously and returns the book update
/// - `run` drains a crossbeam channel until every sender is dropped
///
/// ## Usage
/// ```rust
/// use book_builder::application::services::BookService;
/// use book_builder::shared::{BookConfig, BookEvent};
/// use crossbeam::channel;
///
/// let config = BookConfig::new("AMZN", 0.01).unwrap();
/// let mut service = BookService::new(&config);
///
/// let (tx, rx) = channel::unbounded();
/// tx.send(BookEvent::Add { order_id: 1, side: 'B', price: 100.0, size: 10 }).unwrap();
/// drop(tx);
///
/// let stats = service.run(rx);
/// assert_eq!(stats.applied, 1);
/// ```

use crossbeam::channel::Receiver;
use tracing::{debug, info, warn};

use crate::domain::orderbook::{BookSnapshot, BookUpdate, OrderLifecycleManager};
use crate::domain::validation::EventValidator;
use crate::shared::config::BookConfig;
use crate::shared::error::BookError;
use crate::shared::metrics::METRICS;
use crate::shared::protocol::{BookEvent, Side};

/// Running totals of one service instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub applied: u64,
    pub rejected: u64,
}

pub struct BookService {
    manager: OrderLifecycleManager,
    stats: ServiceStats,
}

impl BookService {
    pub fn new(config: &BookConfig) -> Self {
        Self::with_manager(OrderLifecycleManager::new(config))
    }

    pub fn with_validator(config: &BookConfig, validator: EventValidator) -> Self {
        Self::with_manager(OrderLifecycleManager::with_validator(config, validator))
    }

    pub fn with_manager(manager: OrderLifecycleManager) -> Self {
        Self {
            manager,
            stats: ServiceStats::default(),
        }
    }

    pub fn manager(&self) -> &OrderLifecycleManager {
        &self.manager
    }

    pub fn stats(&self) -> ServiceStats {
        self.stats
    }

    /// Top `levels` occupied levels of each side
    pub fn snapshot(&self, levels: usize) -> BookSnapshot {
        self.manager.snapshot(levels)
    }

    /// Applies one event
    ///
    /// Reset events yield `Ok(None)`. A rejected event leaves the book
    /// unchanged and is counted under its rejection reason.
    pub fn apply(&mut self, event: &BookEvent) -> Result<Option<BookUpdate>, BookError> {
        let kind = event.kind();
        METRICS.events_total.with_label_values(&[kind]).inc();
        let timer = METRICS.event_duration.with_label_values(&[kind]).start_timer();

        let result = self.dispatch(event);
        timer.observe_duration();

        match &result {
            Ok(_) => self.stats.applied += 1,
            Err(err) => {
                self.stats.rejected += 1;
                METRICS.rejections_total.with_label_values(&[err.reason()]).inc();
            }
        }
        self.publish_gauges();
        result
    }

    fn dispatch(&mut self, event: &BookEvent) -> Result<Option<BookUpdate>, BookError> {
        match *event {
            BookEvent::Add { order_id, side, price, size } => {
                let side = parse_side(side, order_id)?;
                self.manager.add(order_id, side, price, size).map(Some)
            }
            BookEvent::Delete { order_id, side } => {
                let side = parse_side(side, order_id)?;
                self.manager.delete(order_id, side).map(Some)
            }
            BookEvent::Modify { order_id, side, new_size, new_order_id } => {
                let side = parse_side(side, order_id)?;
                self.manager.modify(order_id, side, new_size, new_order_id).map(Some)
            }
            BookEvent::Replace { order_id, side, new_price, new_size, new_order_id } => {
                let side = parse_side(side, order_id)?;
                self.manager
                    .replace(order_id, side, new_price, new_size, new_order_id)
                    .map(Some)
            }
            BookEvent::Exec { order_id, side, price, size } => {
                let side = parse_side(side, order_id)?;
                self.manager.exec(order_id, side, price, size).map(Some)
            }
            BookEvent::ResetBegin => {
                self.manager.reset_begin();
                Ok(None)
            }
            BookEvent::ResetEnd => {
                self.manager.reset_end();
                Ok(None)
            }
        }
    }

    fn publish_gauges(&self) {
        for side in [Side::Bid, Side::Ask] {
            METRICS
                .live_orders
                .with_label_values(&[side.label()])
                .set(self.manager.live_orders(side) as f64);
        }
        let rebuilds = self.manager.index().stats();
        METRICS.window_rebuilds.with_label_values(&["build"]).set(rebuilds.builds as f64);
        METRICS.window_rebuilds.with_label_values(&["high"]).set(rebuilds.high_access as f64);
        METRICS.window_rebuilds.with_label_values(&["low"]).set(rebuilds.low_access as f64);
    }

    /// Runs the event loop
    ///
    /// Blocks until the channel is closed and every queued event has been
    /// applied. Rejected events are logged and skipped.
    pub fn run(&mut self, events: Receiver<BookEvent>) -> ServiceStats {
        info!(symbol = %self.manager.symbol(), "book service started");
        for event in events.iter() {
            if let Err(err) = self.apply(&event) {
                debug!(%err, event = event.kind(), "event rejected");
            }
        }
        info!(
            symbol = %self.manager.symbol(),
            applied = self.stats.applied,
            rejected = self.stats.rejected,
            "book service stopped"
        );
        self.stats
    }
}

fn parse_side(side: char, order_id: u64) -> Result<Side, BookError> {
    Side::try_from(side).inspect_err(|err| {
        warn!(order_id, %err, "rejecting event");
    })
}
