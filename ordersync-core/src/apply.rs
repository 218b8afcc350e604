//! Applies an action queue to an order list.
//!
//! Actions run strictly in queue order, so a later action overrides an
//! earlier one for the same id (`add A` then `rm A` leaves no `A`).
//!
//! - `add`: append a resolved order for every id not already present.
//! - `rm`: drop the order with that id, if any.
//! - anything else: recorded in [`ApplyOutcome::rejected`], not applied.
//!
//! Given a duplicate-free input list the result is duplicate-free. Orders not
//! touched by the queue keep their relative position; additions go last.

use std::collections::HashSet;

use serde::Serialize;

use crate::resolver::OrderResolver;
use crate::types::{Action, ActionKind, Order, OrderId};

/// An action that was skipped because its kind is not `add` or `rm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedAction {
    /// Zero-based position in the queue.
    pub index: usize,
    pub kind: String,
    pub order_ids: String,
}

/// Result of [`apply_actions`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplyOutcome {
    pub orders: Vec<Order>,
    /// Ids appended by `add`.
    pub added: usize,
    /// Ids dropped by `rm`.
    pub removed: usize,
    /// Ids named by `add`/`rm` that needed no change.
    pub unchanged: usize,
    pub rejected: Vec<RejectedAction>,
}

impl ApplyOutcome {
    /// True when the resulting list differs from the input.
    pub fn changed(&self) -> bool {
        self.added > 0 || self.removed > 0
    }
}

/// Apply `actions` to `orders` in queue order.
pub fn apply_actions(
    orders: Vec<Order>,
    actions: &[Action],
    resolver: &dyn OrderResolver,
) -> ApplyOutcome {
    let mut present: HashSet<OrderId> = orders.iter().map(|o| o.id.clone()).collect();
    let mut outcome = ApplyOutcome {
        orders,
        ..ApplyOutcome::default()
    };

    for (index, action) in actions.iter().enumerate() {
        match &action.action {
            ActionKind::Add => {
                for id in &action.order_ids {
                    if present.insert(id.clone()) {
                        outcome.orders.push(resolver.resolve(id));
                        outcome.added += 1;
                    } else {
                        outcome.unchanged += 1;
                    }
                }
            }
            ActionKind::Rm => {
                for id in &action.order_ids {
                    if present.remove(id) {
                        if let Some(pos) = outcome.orders.iter().position(|o| &o.id == id) {
                            outcome.orders.remove(pos);
                        }
                        outcome.removed += 1;
                    } else {
                        outcome.unchanged += 1;
                    }
                }
            }
            ActionKind::Unknown(kind) => outcome.rejected.push(RejectedAction {
                index,
                kind: kind.clone(),
                order_ids: action.order_ids.to_string(),
            }),
        }
    }

    outcome
}

/// Ids that occur more than once in `orders`, in first-seen order.
///
/// A well-formed list returns an empty vec.
pub fn duplicate_ids(orders: &[Order]) -> Vec<OrderId> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for order in orders {
        if !seen.insert(&order.id) && !dups.contains(&order.id) {
            dups.push(order.id.clone());
        }
    }
    dups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::PlaceholderResolver;
    use crate::types::OrderStatus;

    fn order(id: &str) -> Order {
        Order::new(id, format!("acct-{id}"), OrderStatus::Other("open".to_string()))
    }

    fn ids(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn add_to_empty_list_appends_in_order() {
        let actions = vec![Action::new(ActionKind::Add, "A,B")];
        let out = apply_actions(vec![], &actions, &PlaceholderResolver::new());
        assert_eq!(ids(&out.orders), vec!["A", "B"]);
        assert_eq!(out.added, 2);
        assert!(out.orders.iter().all(|o| o.status == OrderStatus::New));
    }

    #[test]
    fn add_existing_id_keeps_existing_order() {
        let actions = vec![Action::new(ActionKind::Add, "A")];
        let out = apply_actions(vec![order("A")], &actions, &PlaceholderResolver::new());
        assert_eq!(out.orders, vec![order("A")]);
        assert_eq!(out.unchanged, 1);
        assert!(!out.changed());
    }

    #[test]
    fn rm_preserves_remaining_order() {
        let actions = vec![Action::new(ActionKind::Rm, "B")];
        let out = apply_actions(
            vec![order("A"), order("B"), order("C")],
            &actions,
            &PlaceholderResolver::new(),
        );
        assert_eq!(ids(&out.orders), vec!["A", "C"]);
        assert_eq!(out.removed, 1);
    }

    #[test]
    fn unknown_action_is_rejected_and_processing_continues() {
        let actions = vec![
            Action::new(ActionKind::Unknown("archive".to_string()), "A"),
            Action::new(ActionKind::Add, "B"),
        ];
        let out = apply_actions(vec![order("A")], &actions, &PlaceholderResolver::new());
        assert_eq!(ids(&out.orders), vec!["A", "B"]);
        assert_eq!(
            out.rejected,
            vec![RejectedAction {
                index: 0,
                kind: "archive".to_string(),
                order_ids: "A".to_string(),
            }]
        );
    }

    #[test]
    fn readd_after_rm_goes_to_the_end() {
        let actions = vec![
            Action::new(ActionKind::Rm, "A"),
            Action::new(ActionKind::Add, "A"),
        ];
        let out = apply_actions(
            vec![order("A"), order("B")],
            &actions,
            &PlaceholderResolver::new(),
        );
        assert_eq!(ids(&out.orders), vec!["B", "A"]);
        assert_eq!(out.orders[1].status, OrderStatus::New);
    }

    #[test]
    fn duplicate_ids_reports_each_once() {
        let list = vec![order("A"), order("B"), order("A"), order("A")];
        assert_eq!(duplicate_ids(&list), vec![OrderId::from("A")]);
        assert!(duplicate_ids(&[order("A"), order("B")]).is_empty());
    }
}
