//! ordersync core library: domain types, action application, configuration.
//!
//! - [`types`]: orders, actions and their wire encoding
//! - [`apply`]: [`apply_actions`], the queue-application algorithm
//! - [`resolver`]: [`OrderResolver`] and the placeholder implementation
//! - [`config`]: endpoint configuration loading
//! - [`error`]: [`ConfigError`]

pub mod apply;
pub mod config;
pub mod error;
pub mod resolver;
pub mod types;

pub use apply::{apply_actions, ApplyOutcome, RejectedAction};
pub use config::{Endpoint, EndpointDescriptor, EndpointName, EndpointTarget, Password};
pub use error::ConfigError;
pub use resolver::{OrderResolver, PlaceholderResolver};
pub use types::{Action, ActionKind, ActionQueue, Order, OrderId, OrderIds, OrderList, OrderStatus};
