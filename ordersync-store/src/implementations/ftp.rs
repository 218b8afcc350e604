//! FTP backend.
//!
//! `suppaftp`'s blocking client runs on the blocking pool; each call moves the
//! control connection into the blocking task and back. If a call is abandoned
//! (timeout), the connection goes with it and the session reports itself
//! closed from then on.
//!
//! Control and data sockets carry read/write timeouts equal to the operation
//! bound, so a blocking call against a stalled server returns an error on its
//! own instead of pinning a blocking-pool thread.

use std::io::Cursor;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use async_trait::async_trait;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, Status};

use ordersync_core::{Endpoint, EndpointTarget};

use crate::{Connector, DocumentStore, StoreError};

/// Opens FTP sessions.
#[derive(Debug, Clone)]
pub struct FtpConnector {
    timeout: Duration,
}

impl FtpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Connector for FtpConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn DocumentStore>, StoreError> {
        let EndpointTarget::Ftp { host, port } = &endpoint.target else {
            return Err(StoreError::Connect {
                target: endpoint.target.to_string(),
                message: "not an FTP endpoint".to_string(),
            });
        };

        let target = endpoint.target.to_string();
        let host = host.clone();
        let port = *port;
        let user = endpoint.user.clone();
        let password = endpoint.password.clone();
        let timeout = self.timeout;

        let connect_target = target.clone();
        let stream = tokio::task::spawn_blocking(move || {
            let connect_err = |message: String| StoreError::Connect {
                target: connect_target.clone(),
                message,
            };
            let addr = resolve(&host, port).map_err(&connect_err)?;
            let control = open_socket(addr, timeout).map_err(|e| connect_err(e.to_string()))?;
            let mut stream = FtpStream::connect_with_stream(control)
                .map_err(|e| connect_err(e.to_string()))?
                .passive_stream_builder(move |addr| {
                    open_socket(addr, timeout).map_err(FtpError::ConnectionError)
                });
            stream
                .login(user.as_str(), password.expose())
                .map_err(|e| connect_err(format!("login failed: {e}")))?;
            stream
                .transfer_type(FileType::Binary)
                .map_err(|e| connect_err(format!("TYPE I rejected: {e}")))?;
            Ok::<_, StoreError>(stream)
        })
        .await
        .map_err(|err| StoreError::Connect {
            target: target.clone(),
            message: format!("connect task join error: {err}"),
        })??;

        tracing::debug!(target = %target, "ftp session open");
        Ok(Box::new(FtpStore {
            stream: Some(stream),
            target,
        }))
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, String> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| format!("cannot resolve {host}: {e}"))?
        .next()
        .ok_or_else(|| format!("{host} resolved to no addresses"))
}

/// Connect within `timeout` and bound every later read and write by it too.
fn open_socket(addr: SocketAddr, timeout: Duration) -> std::io::Result<TcpStream> {
    let socket = TcpStream::connect_timeout(&addr, timeout)?;
    socket.set_read_timeout(Some(timeout))?;
    socket.set_write_timeout(Some(timeout))?;
    Ok(socket)
}

/// One logged-in FTP control connection.
pub struct FtpStore {
    stream: Option<FtpStream>,
    target: String,
}

impl FtpStore {
    async fn with_stream<T, F>(&mut self, op: &'static str, path: &str, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut FtpStream) -> Result<T, FtpError> + Send + 'static,
    {
        let Some(mut stream) = self.stream.take() else {
            return Err(StoreError::transport(op, path, "session is closed"));
        };
        let (stream, result) = tokio::task::spawn_blocking(move || {
            let result = f(&mut stream);
            (stream, result)
        })
        .await
        .map_err(|err| StoreError::transport(op, path, format!("join error: {err}")))?;
        self.stream = Some(stream);
        result.map_err(|err| classify(op, path, err))
    }
}

/// 550 means the file is not there; everything else is a transport failure.
fn classify(op: &'static str, path: &str, err: FtpError) -> StoreError {
    match &err {
        FtpError::UnexpectedResponse(response) if response.status == Status::FileUnavailable => {
            StoreError::NotFound {
                path: path.to_string(),
            }
        }
        _ => StoreError::transport(op, path, err),
    }
}

#[async_trait]
impl DocumentStore for FtpStore {
    async fn fetch(&mut self, path: &str) -> Result<Vec<u8>, StoreError> {
        let remote = path.to_string();
        self.with_stream("fetch", path, move |s| {
            s.retr_as_buffer(&remote).map(Cursor::into_inner)
        })
        .await
    }

    async fn exists(&mut self, path: &str) -> Result<bool, StoreError> {
        let remote = path.to_string();
        match self.with_stream("size", path, move |s| s.size(&remote)).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn store(&mut self, path: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let remote = path.to_string();
        self.with_stream("store", path, move |s| {
            s.put_file(&remote, &mut Cursor::new(bytes)).map(|_| ())
        })
        .await
    }

    async fn delete(&mut self, path: &str) -> Result<(), StoreError> {
        let remote = path.to_string();
        self.with_stream("delete", path, move |s| s.rm(&remote)).await
    }

    async fn disconnect(&mut self) -> Result<(), StoreError> {
        if self.stream.is_none() {
            return Ok(());
        }
        let result = self.with_stream("quit", "", |s| s.quit()).await;
        self.stream = None;
        tracing::debug!(target = %self.target, "ftp session closed");
        result
    }
}
