//! Item kinds and the key identifying an obligation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use naranja_core::types::ItemId;

/// The kind of obligation a required item represents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "item_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A training module to complete.
    Module,
    /// A policy document to acknowledge.
    Document,
    /// A behavioural competency to demonstrate.
    Behaviour,
}

impl ItemType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Document => "document",
            Self::Behaviour => "behaviour",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = naranja_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "module" => Ok(Self::Module),
            "document" => Ok(Self::Document),
            "behaviour" | "behavior" => Ok(Self::Behaviour),
            _ => Err(naranja_core::AppError::validation(format!(
                "Invalid item type: '{s}'. Expected one of: module, document, behaviour"
            ))),
        }
    }
}

/// Identifies one obligation independent of who holds it.
///
/// Set differences between required and assigned items are computed on
/// this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    /// The module, document, or behaviour.
    pub item_id: ItemId,
    /// Which kind of item `item_id` refers to.
    pub item_type: ItemType,
}

impl ItemKey {
    /// Create a new key.
    pub fn new(item_id: ItemId, item_type: ItemType) -> Self {
        Self { item_id, item_type }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.item_type, self.item_id)
    }
}
