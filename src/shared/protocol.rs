use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::error::BookError;

/// 订单方向
///
/// Bids grow more aggressive with price, asks with falling price. The sign
/// returned by [`Side::direction`] is what turns a tick distance into an
/// array offset in the level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// +1 when a higher tick is a better price, -1 otherwise
    #[inline]
    pub const fn direction(self) -> i64 {
        match self {
            Side::Bid => 1,
            Side::Ask => -1,
        }
    }

    /// Feed character for this side ('B' or 'S')
    pub const fn as_char(self) -> char {
        match self {
            Side::Bid => 'B',
            Side::Ask => 'S',
        }
    }

    /// Lower-case label used for log fields and metric labels
    pub const fn label(self) -> &'static str {
        match self {
            Side::Bid => "bid",
            Side::Ask => "ask",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<char> for Side {
    type Error = BookError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'B' => Ok(Side::Bid),
            'S' => Ok(Side::Ask),
            other => Err(BookError::InvalidSide(other)),
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = BookError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Side::try_from(char::from(value))
    }
}

/// 订单生命周期事件，由上游行情适配器产生
///
/// `side` stays a raw feed character here: turning it into a [`Side`] is the
/// first check every handler performs, so a bad side is rejected before the
/// book is touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookEvent {
    Add {
        order_id: u64,
        side: char,
        price: f64,
        size: i32,
    },
    Delete {
        order_id: u64,
        side: char,
    },
    Modify {
        order_id: u64,
        side: char,
        new_size: i32,
        new_order_id: u64,
    },
    Replace {
        order_id: u64,
        side: char,
        new_price: f64,
        new_size: i32,
        new_order_id: u64,
    },
    Exec {
        order_id: u64,
        side: char,
        price: f64,
        size: i32,
    },
    ResetBegin,
    ResetEnd,
}

impl BookEvent {
    /// Event name used as a metric label
    pub fn kind(&self) -> &'static str {
        match self {
            BookEvent::Add { .. } => "add",
            BookEvent::Delete { .. } => "delete",
            BookEvent::Modify { .. } => "modify",
            BookEvent::Replace { .. } => "replace",
            BookEvent::Exec { .. } => "exec",
            BookEvent::ResetBegin => "reset_begin",
            BookEvent::ResetEnd => "reset_end",
        }
    }
}
