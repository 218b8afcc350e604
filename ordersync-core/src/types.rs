//! Domain types for the order list and the action queue.
//!
//! Both documents are JSON arrays on the wire. The types here own their wire
//! encoding through serde so that the rest of the workspace only ever sees
//! parsed values: unknown statuses and unknown action kinds are carried
//! verbatim instead of failing the whole document.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed order identifier. Unique within one order list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The identifier list carried by an [`Action`].
///
/// Encoded on the wire as a single comma-separated string (`"A,B,C"`).
/// Decoding trims whitespace around each segment and drops empty segments,
/// so `"A, B,"` decodes to `[A, B]`.
///
/// Ids in the order list are not trimmed. An order stored as `" A"` is
/// therefore out of reach of any action: `rm " A"` decodes to `rm A`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct OrderIds(pub Vec<OrderId>);

impl OrderIds {
    pub fn iter(&self) -> std::slice::Iter<'_, OrderId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for OrderIds {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&str> for OrderIds {
    fn from(s: &str) -> Self {
        Self(
            s.split(',')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(OrderId::from)
                .collect(),
        )
    }
}

impl From<OrderIds> for String {
    fn from(ids: OrderIds) -> Self {
        ids.to_string()
    }
}

impl fmt::Display for OrderIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(id.as_str())?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a OrderIds {
    type Item = &'a OrderId;
    type IntoIter = std::slice::Iter<'a, OrderId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Status of an order.
///
/// Only `new` is produced by this system; any other value found in a
/// document is preserved as-is when the list is written back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    New,
    Other(String),
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "new" => OrderStatus::New,
            _ => OrderStatus::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::New => "new".to_string(),
            OrderStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::New => write!(f, "new"),
            OrderStatus::Other(s) => f.write_str(s),
        }
    }
}

/// The kind of a queued action.
///
/// Kinds outside `add` / `rm` deserialize into [`ActionKind::Unknown`] so a
/// single bad entry is reported and skipped instead of rejecting the queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Add,
    Rm,
    Unknown(String),
}

impl From<String> for ActionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "add" => ActionKind::Add,
            "rm" => ActionKind::Rm,
            _ => ActionKind::Unknown(s),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Add => "add".to_string(),
            ActionKind::Rm => "rm".to_string(),
            ActionKind::Unknown(s) => s,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Add => write!(f, "add"),
            ActionKind::Rm => write!(f, "rm"),
            ActionKind::Unknown(s) => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// One entry of the order-list document.
///
/// Fields other than the three named here belong to whoever else writes the
/// list; they are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub account_id: String,
    pub status: OrderStatus,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Order {
    pub fn new(id: impl Into<OrderId>, account_id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            status,
            extra: serde_json::Map::new(),
        }
    }
}

/// One entry of the action-queue document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub action: ActionKind,
    pub order_ids: OrderIds,
}

impl Action {
    pub fn new(action: ActionKind, order_ids: impl Into<OrderIds>) -> Self {
        Self {
            action,
            order_ids: order_ids.into(),
        }
    }
}

/// The persisted order list: an ordered sequence, no duplicate ids.
pub type OrderList = Vec<Order>;

/// The persisted action queue: applied first to last.
pub type ActionQueue = Vec<Action>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
