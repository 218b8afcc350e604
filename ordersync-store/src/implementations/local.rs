//! Local-directory backend for `file://` endpoints.
//!
//! Document paths are resolved under the endpoint root. Writes go to
//! `<path>.ordersync.tmp` and are renamed into place, so a reader never sees
//! a half-written document.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use ordersync_core::{Endpoint, EndpointTarget};

use crate::{Connector, DocumentStore, StoreError};

/// Opens sessions on local directories.
#[derive(Debug, Clone, Default)]
pub struct LocalConnector;

#[async_trait]
impl Connector for LocalConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn DocumentStore>, StoreError> {
        let EndpointTarget::Local { root } = &endpoint.target else {
            return Err(StoreError::Connect {
                target: endpoint.target.to_string(),
                message: "not a file:// endpoint".to_string(),
            });
        };
        let meta = fs::metadata(root).await.map_err(|e| StoreError::Connect {
            target: endpoint.target.to_string(),
            message: e.to_string(),
        })?;
        if !meta.is_dir() {
            return Err(StoreError::Connect {
                target: endpoint.target.to_string(),
                message: "not a directory".to_string(),
            });
        }
        Ok(Box::new(LocalStore::new(root.clone())))
    }
}

/// A session rooted at one directory.
#[derive(Debug)]
pub struct LocalStore {
    root: PathBuf,
    open: bool,
}

impl LocalStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root, open: true }
    }

    fn resolve(&self, op: &'static str, path: &str) -> Result<PathBuf, StoreError> {
        if !self.open {
            return Err(StoreError::transport(op, path, "session is closed"));
        }
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(StoreError::transport(
                op,
                path,
                "path must stay inside the endpoint root",
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn fetch(&mut self, path: &str) -> Result<Vec<u8>, StoreError> {
        let full = self.resolve("fetch", path)?;
        match fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
            Err(err) => Err(StoreError::transport("fetch", path, err)),
        }
    }

    async fn exists(&mut self, path: &str) -> Result<bool, StoreError> {
        let full = self.resolve("exists", path)?;
        fs::try_exists(&full)
            .await
            .map_err(|err| StoreError::transport("exists", path, err))
    }

    async fn store(&mut self, path: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let full = self.resolve("store", path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::transport("store", path, err))?;
        }
        let tmp = PathBuf::from(format!("{}.ordersync.tmp", full.display()));
        fs::write(&tmp, &bytes)
            .await
            .map_err(|err| StoreError::transport("store", path, err))?;
        if let Err(err) = fs::rename(&tmp, &full).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::transport("store", path, err));
        }
        Ok(())
    }

    async fn delete(&mut self, path: &str) -> Result<(), StoreError> {
        let full = self.resolve("delete", path)?;
        match fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
            Err(err) => Err(StoreError::transport("delete", path, err)),
        }
    }

    async fn disconnect(&mut self) -> Result<(), StoreError> {
        self.open = false;
        Ok(())
    }
}
