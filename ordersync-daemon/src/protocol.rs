//! Control-socket protocol: one JSON object per line in each direction.
//!
//! Requests are tagged by `cmd` (`{"cmd":"sync","endpoint":"shop"}`); replies
//! carry either `data` or `error`.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{io_err, DaemonError};
use crate::paths::socket_path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ControlRequest {
    Status,
    /// Run a pass now, over one endpoint or all of them.
    Sync {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
    },
    Stop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlReply {
    Data(Value),
    Error(String),
}

impl ControlReply {
    pub fn into_result(self) -> Result<Value, DaemonError> {
        match self {
            ControlReply::Data(value) => Ok(value),
            ControlReply::Error(message) => Err(DaemonError::Refused(message)),
        }
    }
}

/// One request, one reply. A missing or refusing socket means the daemon is
/// not running; callers that just spawned it poll on that.
pub fn call(home: &Path, request: &ControlRequest) -> Result<Value, DaemonError> {
    let socket = socket_path(home);
    let stream = UnixStream::connect(&socket).map_err(|err| match err.kind() {
        ErrorKind::NotFound | ErrorKind::ConnectionRefused => DaemonError::NotRunning {
            socket: socket.clone(),
        },
        _ => io_err(&socket, err),
    })?;

    let mut line = serde_json::to_vec(request)?;
    line.push(b'\n');
    (&stream)
        .write_all(&line)
        .map_err(|e| io_err(&socket, e))?;

    let mut reply = String::new();
    let read = BufReader::new(&stream)
        .read_line(&mut reply)
        .map_err(|e| io_err(&socket, e))?;
    if read == 0 {
        return Err(DaemonError::Refused(
            "daemon closed the connection without replying".to_string(),
        ));
    }
    serde_json::from_str::<ControlReply>(&reply)?.into_result()
}

pub fn request_status(home: &Path) -> Result<Value, DaemonError> {
    call(home, &ControlRequest::Status)
}

pub fn request_stop(home: &Path) -> Result<(), DaemonError> {
    call(home, &ControlRequest::Stop).map(|_| ())
}

/// Ask the daemon to run a pass now and return its report. Refused while
/// another pass is in flight.
pub fn request_sync(home: &Path, endpoint: Option<String>) -> Result<Value, DaemonError> {
    call(home, &ControlRequest::Sync { endpoint })
}
