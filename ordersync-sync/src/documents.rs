//! Document bootstrap and JSON (de)serialisation.
//!
//! Both documents are JSON arrays. A document that is missing is created as
//! `[]`; a document that cannot be reached is an error. Those two outcomes
//! come from distinct [`StoreError`] variants and are never conflated.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use ordersync_store::{bounded, DocumentStore, StoreError};

use crate::error::{store_err, SyncError};
use crate::reconcile::SyncStep;

/// Content written for a missing or consumed document.
pub const EMPTY_DOCUMENT: &[u8] = b"[]";

/// Result of [`ensure_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bootstrap {
    /// The document existed; its content.
    Existing(Vec<u8>),
    /// The document was missing and `[]` was written.
    Created,
    /// The document was missing and nothing was written (dry run).
    Missing,
}

impl Bootstrap {
    /// The document content to parse.
    pub fn content(&self) -> &[u8] {
        match self {
            Bootstrap::Existing(bytes) => bytes,
            Bootstrap::Created | Bootstrap::Missing => EMPTY_DOCUMENT,
        }
    }

    pub fn was_missing(&self) -> bool {
        !matches!(self, Bootstrap::Existing(_))
    }
}

/// Fetch the document at `path`, creating it as `[]` when it does not exist.
///
/// With `create_missing == false` a missing document is reported as
/// [`Bootstrap::Missing`] and the store is left untouched.
pub async fn ensure_document(
    store: &mut dyn DocumentStore,
    path: &str,
    create_missing: bool,
    op_timeout: Duration,
) -> Result<Bootstrap, StoreError> {
    match bounded(op_timeout, "fetch", store.fetch(path)).await {
        Ok(bytes) => Ok(Bootstrap::Existing(bytes)),
        Err(StoreError::NotFound { .. }) if create_missing => {
            bounded(op_timeout, "store", store.store(path, EMPTY_DOCUMENT.to_vec())).await?;
            tracing::info!(path, "created missing document");
            Ok(Bootstrap::Created)
        }
        Err(StoreError::NotFound { .. }) => Ok(Bootstrap::Missing),
        Err(err) => Err(err),
    }
}

/// Parse a JSON array document.
pub fn decode<T: DeserializeOwned>(
    bytes: &[u8],
    path: &str,
    step: SyncStep,
) -> Result<Vec<T>, SyncError> {
    serde_json::from_slice(bytes).map_err(|source| SyncError::MalformedDocument {
        step,
        path: path.to_string(),
        source,
    })
}

/// Encode a document as compact JSON.
pub fn encode<T: Serialize>(items: &[T], path: &str, step: SyncStep) -> Result<Vec<u8>, SyncError> {
    serde_json::to_vec(items).map_err(|source| SyncError::Encode {
        step,
        path: path.to_string(),
        source,
    })
}

/// Replace the document at `path` with `bytes`.
pub(crate) async fn write_document(
    store: &mut dyn DocumentStore,
    path: &str,
    bytes: Vec<u8>,
    step: SyncStep,
    op_timeout: Duration,
) -> Result<(), SyncError> {
    bounded(op_timeout, "store", store.store(path, bytes))
        .await
        .map_err(store_err(step))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordersync_core::{Endpoint, EndpointName, EndpointTarget, Order, Password};
    use ordersync_store::{Connector, MemoryConnector};

    const T: Duration = Duration::from_secs(5);

    fn endpoint() -> Endpoint {
        Endpoint {
            name: EndpointName::from("shop"),
            target: EndpointTarget::Ftp {
                host: "shop.example".to_string(),
                port: 21,
            },
            user: "u".to_string(),
            password: Password::new("p"),
            orders_path: "orders.json".to_string(),
            actions_path: "actions.json".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_document_is_created_empty() {
        let connector = MemoryConnector::new();
        let ep = endpoint();
        let mut store = connector.connect(&ep).await.expect("connect");

        let result = ensure_document(store.as_mut(), "orders.json", true, T)
            .await
            .expect("bootstrap");
        assert_eq!(result, Bootstrap::Created);
        assert_eq!(result.content(), EMPTY_DOCUMENT);

        let backend = connector.backend(&ep.name).await;
        assert_eq!(backend.get("orders.json").await.as_deref(), Some(EMPTY_DOCUMENT));
    }

    #[tokio::test]
    async fn missing_document_untouched_without_create() {
        let connector = MemoryConnector::new();
        let ep = endpoint();
        let mut store = connector.connect(&ep).await.expect("connect");

        let result = ensure_document(store.as_mut(), "orders.json", false, T)
            .await
            .expect("bootstrap");
        assert_eq!(result, Bootstrap::Missing);
        assert!(!connector.backend(&ep.name).await.contains("orders.json").await);
    }

    #[tokio::test]
    async fn existing_document_is_returned_verbatim() {
        let connector = MemoryConnector::new();
        let ep = endpoint();
        connector
            .backend(&ep.name)
            .await
            .put("orders.json", br#"[{"id":"A","account_id":"x","status":"new"}]"#.to_vec())
            .await;
        let mut store = connector.connect(&ep).await.expect("connect");

        let result = ensure_document(store.as_mut(), "orders.json", true, T)
            .await
            .expect("bootstrap");
        let orders: Vec<Order> =
            decode(result.content(), "orders.json", SyncStep::ParseOrders).expect("decode");
        assert_eq!(orders.len(), 1);
        assert!(!result.was_missing());
    }

    #[test]
    fn malformed_document_names_path_and_step() {
        let err = decode::<Order>(b"{not json", "orders.json", SyncStep::ParseOrders).unwrap_err();
        assert!(matches!(err, SyncError::MalformedDocument { .. }));
        let msg = err.to_string();
        assert!(msg.contains("orders.json"), "got: {msg}");
        assert!(msg.contains("parse orders"), "got: {msg}");
    }
}
