//! In-memory backend.
//!
//! Each endpoint name maps to its own [`MemoryBackend`]; sessions opened for
//! that endpoint share it, so state written by one pass is visible to the
//! next. Nothing survives the process.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use ordersync_core::{Endpoint, EndpointName};

use crate::{Connector, DocumentStore, StoreError};

/// Documents of one endpoint, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    docs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.docs.read().await.get(path).cloned()
    }

    pub async fn put(&self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.docs.write().await.insert(path.to_string(), bytes.into());
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.docs.read().await.contains_key(path)
    }
}

/// Hands out sessions on per-endpoint [`MemoryBackend`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    backends: Arc<RwLock<HashMap<EndpointName, MemoryBackend>>>,
    unreachable: Arc<RwLock<HashSet<EndpointName>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backend for `name`, created empty on first use.
    pub async fn backend(&self, name: &EndpointName) -> MemoryBackend {
        self.backends
            .write()
            .await
            .entry(name.clone())
            .or_default()
            .clone()
    }

    /// Make `connect` fail for `name`, as if the host were down.
    pub async fn set_unreachable(&self, name: &EndpointName, unreachable: bool) {
        let mut set = self.unreachable.write().await;
        if unreachable {
            set.insert(name.clone());
        } else {
            set.remove(name);
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn DocumentStore>, StoreError> {
        if self.unreachable.read().await.contains(&endpoint.name) {
            return Err(StoreError::Connect {
                target: endpoint.target.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(Box::new(MemoryStore {
            backend: self.backend(&endpoint.name).await,
            open: true,
        }))
    }
}

/// A session on a [`MemoryBackend`].
#[derive(Debug)]
pub struct MemoryStore {
    backend: MemoryBackend,
    open: bool,
}

impl MemoryStore {
    fn check_open(&self, op: &'static str, path: &str) -> Result<(), StoreError> {
        if self.open {
            Ok(())
        } else {
            Err(StoreError::transport(op, path, "session is closed"))
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch(&mut self, path: &str) -> Result<Vec<u8>, StoreError> {
        self.check_open("fetch", path)?;
        self.backend.get(path).await.ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })
    }

    async fn exists(&mut self, path: &str) -> Result<bool, StoreError> {
        self.check_open("exists", path)?;
        Ok(self.backend.contains(path).await)
    }

    async fn store(&mut self, path: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.check_open("store", path)?;
        self.backend.put(path, bytes).await;
        Ok(())
    }

    async fn delete(&mut self, path: &str) -> Result<(), StoreError> {
        self.check_open("delete", path)?;
        match self.backend.docs.write().await.remove(path) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    async fn disconnect(&mut self) -> Result<(), StoreError> {
        self.open = false;
        Ok(())
    }
}
