//! Book configuration
//!
//! The level window holds `2 * anchor_offset + 1` slots per side. After a
//! recentring the best price sits at `anchor_offset`; when the best pointer
//! retreats below `low_water_mark` the window is recentred again so worse
//! prices keep some room underneath.

use crate::shared::error::ConfigError;

/// Half-width of the level window
pub const DEFAULT_ANCHOR_OFFSET: usize = 1024;

/// Slots kept free below the best level before a low recentring
pub const DEFAULT_LOW_WATER_MARK: usize = 50;

/// 合约配置
#[derive(Debug, Clone, PartialEq)]
pub struct BookConfig {
    /// 合约代码
    pub symbol: String,
    /// 最小变动价位（tick size）
    pub min_price_increment: f64,
    /// 窗口半宽，同时是重新居中的目标位置
    pub anchor_offset: usize,
    /// 低水位缓冲区
    pub low_water_mark: usize,
}

impl BookConfig {
    /// Creates a config with the default window geometry
    ///
    /// # Example
    /// ```rust
    /// use book_builder::shared::config::BookConfig;
    ///
    /// let config = BookConfig::new("AMZN", 0.01).unwrap();
    /// assert_eq!(config.window_capacity(), 2049);
    /// ```
    pub fn new(symbol: impl Into<String>, min_price_increment: f64) -> Result<Self, ConfigError> {
        let config = Self {
            symbol: symbol.into(),
            min_price_increment,
            anchor_offset: DEFAULT_ANCHOR_OFFSET,
            low_water_mark: DEFAULT_LOW_WATER_MARK,
        };
        config.validate()?;
        Ok(config)
    }

    /// Replaces the window geometry
    pub fn with_window(
        mut self,
        anchor_offset: usize,
        low_water_mark: usize,
    ) -> Result<Self, ConfigError> {
        self.anchor_offset = anchor_offset;
        self.low_water_mark = low_water_mark;
        self.validate()?;
        Ok(self)
    }

    /// Number of slots per side
    #[inline]
    pub fn window_capacity(&self) -> usize {
        2 * self.anchor_offset + 1
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_price_increment.is_finite() || self.min_price_increment <= 0.0 {
            return Err(ConfigError::InvalidPriceIncrement(self.min_price_increment));
        }
        if self.anchor_offset == 0 {
            return Err(ConfigError::ZeroAnchorOffset);
        }
        if self.low_water_mark >= self.anchor_offset {
            return Err(ConfigError::LowWaterMarkTooHigh {
                low_water_mark: self.low_water_mark,
                anchor_offset: self.anchor_offset,
            });
        }
        Ok(())
    }
}
