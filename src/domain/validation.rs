//! Event Validator - Payload Validation
//!
//! Checks event payloads before they reach the book, so that a malformed
//! event is rejected without touching any level or ledger entry.
//!
//! ## Validation Rules
//! - Prices must be finite and within `MAX_PRICE_TICKS` ticks of zero
//! - Added orders must have a positive size
//! - Sizes must not exceed the configured maximum
//!
//! ## Usage
//! ```rust
//! use book_builder::domain::validation::EventValidator;
//!
//! let validator = EventValidator::new();
//! assert!(validator.validate_add(101.5, 10).is_ok());
//! assert!(validator.validate_add(f64::NAN, 10).is_err());
//! ```

use crate::shared::error::BookError;

/// Largest tick magnitude a price may map to; keeps every window offset
/// well inside `i64` and the tick exactly representable as `f64`
pub const MAX_PRICE_TICKS: i64 = 1 << 52;

/// Order validation configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Maximum size of a single order (inclusive)
    pub max_order_size: i32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_order_size: i32::MAX,
        }
    }
}

/// Event payload validator
#[derive(Debug, Clone, Default)]
pub struct EventValidator {
    config: ValidationConfig,
}

impl EventValidator {
    /// Creates a new validator with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new validator with custom configuration
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validates the payload of an add event
    pub fn validate_add(&self, price: f64, size: i32) -> Result<(), BookError> {
        self.validate_price(price)?;
        if size <= 0 {
            return Err(BookError::InvalidSize(format!(
                "Size must be greater than zero, got {}",
                size
            )));
        }
        self.validate_size(size)
    }

    /// Validates a price carried by an event
    pub fn validate_price(&self, price: f64) -> Result<(), BookError> {
        if !price.is_finite() {
            return Err(BookError::InvalidPrice(format!("Price {} is not finite", price)));
        }
        Ok(())
    }

    /// Validates that `price` maps to a tick the level window can address
    pub fn validate_ticks(&self, price: f64, min_price_increment: f64) -> Result<(), BookError> {
        let ticks = (price / min_price_increment).abs();
        if ticks > MAX_PRICE_TICKS as f64 {
            return Err(BookError::InvalidPrice(format!(
                "Price {} is {} ticks from zero, limit is {}",
                price, ticks, MAX_PRICE_TICKS
            )));
        }
        Ok(())
    }

    /// Validates a resulting order size (zero or negative sizes are allowed here,
    /// they remove the order)
    pub fn validate_size(&self, size: i32) -> Result<(), BookError> {
        if size > self.config.max_order_size {
            return Err(BookError::InvalidSize(format!(
                "Size {} exceeds maximum {}",
                size, self.config.max_order_size
            )));
        }
        Ok(())
    }
}
