//! Order resolution for the `add` action.

use crate::types::{Order, OrderId, OrderStatus};

/// Account id given to orders built by [`PlaceholderResolver`].
pub const PLACEHOLDER_ACCOUNT: &str = "dummy_account";

/// Builds the full [`Order`] for an identifier named by an `add` action.
pub trait OrderResolver: Send + Sync {
    fn resolve(&self, id: &OrderId) -> Order;
}

/// Fabricates a `new` order under a fixed placeholder account.
///
/// Stands in until a real order-lookup integration exists.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderResolver {
    account_id: Option<String>,
}

impl PlaceholderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `account_id` instead of [`PLACEHOLDER_ACCOUNT`].
    pub fn with_account(account_id: impl Into<String>) -> Self {
        Self {
            account_id: Some(account_id.into()),
        }
    }
}

impl OrderResolver for PlaceholderResolver {
    fn resolve(&self, id: &OrderId) -> Order {
        let account_id = self
            .account_id
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_ACCOUNT.to_string());
        Order::new(id.clone(), account_id, OrderStatus::New)
    }
}
