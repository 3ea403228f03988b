//! # Domain Types
//!
//! The receipt record the scoring engine reads.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐          ┌─────────────────────┐              │
//! │  │      Receipt        │ 1      * │        Item         │              │
//! │  │  ─────────────────  │─────────►│  ─────────────────  │              │
//! │  │  id (UUID)          │          │  id (opaque)        │              │
//! │  │  store_name         │          │  description        │              │
//! │  │  purchase_time      │          │  price_cents        │              │
//! │  │  total_cents        │          └─────────────────────┘              │
//! │  └─────────────────────┘                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Receipts are plain data. The engine borrows them for one `process` call
//! and never mutates or keeps them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Item
// =============================================================================

/// A line item on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Item {
    /// Catalog identifier, opaque to the engine.
    pub id: String,

    /// Free text as printed on the receipt. May be empty.
    #[serde(default)]
    pub description: String,

    /// Price in cents (`price` in JSON).
    #[serde(rename = "price", with = "crate::money::decimal_cents")]
    #[ts(type = "number")]
    pub price_cents: i64,
}

impl Item {
    /// Creates an item.
    pub fn new(id: impl Into<String>, description: impl Into<String>, price: Money) -> Self {
        Item {
            id: id.into(),
            description: description.into(),
            price_cents: price.cents(),
        }
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// A purchase receipt submitted for points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Receipt {
    /// Unique identifier (UUID v4 when created through [`Receipt::new`]).
    pub id: String,

    /// Retailer name as printed on the receipt.
    pub store_name: String,

    /// Local date and time of purchase.
    #[ts(as = "String")]
    pub purchase_time: NaiveDateTime,

    /// Receipt total in cents (`total` in JSON).
    #[serde(rename = "total", with = "crate::money::decimal_cents")]
    #[ts(type = "number")]
    pub total_cents: i64,

    /// Line items in printed order.
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Receipt {
    /// Creates a receipt with a freshly generated id.
    pub fn new(
        store_name: impl Into<String>,
        purchase_time: NaiveDateTime,
        total: Money,
        items: Vec<Item>,
    ) -> Self {
        Receipt {
            id: Uuid::new_v4().to_string(),
            store_name: store_name.into(),
            purchase_time,
            total_cents: total.cents(),
            items,
        }
    }

    /// Returns the total as a Money type.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
