//! Endpoint configuration.
//!
//! # File format
//!
//! A JSON array (or YAML sequence, for `.yaml` / `.yml` files) of endpoint
//! descriptors:
//!
//! ```text
//! [
//!   { "server": "ftp.example.com", "user": "sync", "password": "secret" },
//!   { "server": "ftp://10.0.0.7:2121", "user": "u", "password": "p",
//!     "name": "warehouse", "orders_path": "data/orders.json" },
//!   { "server": "file:///srv/ordersync/local", "user": "", "password": "" }
//! ]
//! ```
//!
//! The list is read once at startup and never reloaded.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default endpoint file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ftp_servers.json";
pub const DEFAULT_FTP_PORT: u16 = 21;
pub const DEFAULT_ORDERS_PATH: &str = "orders.json";
pub const DEFAULT_ACTIONS_PATH: &str = "actions.json";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Label used in logs, reports and `--endpoint` filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointName(pub String);

impl fmt::Display for EndpointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for EndpointName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for EndpointName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A credential that never shows up in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The actual secret. Only transports should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password(***)")
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

// ---------------------------------------------------------------------------
// Descriptor (wire) and resolved endpoint
// ---------------------------------------------------------------------------

/// One entry of the configuration file, as written by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub server: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: Password,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions_path: Option<String>,
}

/// Where an endpoint's documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointTarget {
    /// An FTP server.
    Ftp { host: String, port: u16 },
    /// A directory on the local filesystem (`file://` servers).
    Local { root: PathBuf },
}

impl fmt::Display for EndpointTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointTarget::Ftp { host, port } => write!(f, "ftp://{host}:{port}"),
            EndpointTarget::Local { root } => write!(f, "file://{}", root.display()),
        }
    }
}

/// A validated endpoint. Immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: EndpointName,
    pub target: EndpointTarget,
    pub user: String,
    pub password: Password,
    pub orders_path: String,
    pub actions_path: String,
}

impl Endpoint {
    /// Resolve a descriptor found at position `index` in the file.
    pub fn from_descriptor(index: usize, d: EndpointDescriptor) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEndpoint { index, reason };

        let server = d.server.trim();
        if server.is_empty() {
            return Err(invalid("`server` must not be empty".to_string()));
        }
        let target = parse_target(server, d.port).map_err(invalid)?;

        let orders_path = d
            .orders_path
            .unwrap_or_else(|| DEFAULT_ORDERS_PATH.to_string());
        let actions_path = d
            .actions_path
            .unwrap_or_else(|| DEFAULT_ACTIONS_PATH.to_string());
        if orders_path.trim().is_empty() || actions_path.trim().is_empty() {
            return Err(invalid("document paths must not be empty".to_string()));
        }
        if orders_path == actions_path {
            return Err(invalid(format!(
                "orders and actions share the same path '{orders_path}'"
            )));
        }

        let name = match d.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => server.to_string(),
        };

        Ok(Self {
            name: EndpointName(name),
            target,
            user: d.user,
            password: d.password,
            orders_path,
            actions_path,
        })
    }
}

fn parse_target(server: &str, port: Option<u16>) -> Result<EndpointTarget, String> {
    if let Some(rest) = server.strip_prefix("file://") {
        if rest.is_empty() {
            return Err("`file://` server needs a directory path".to_string());
        }
        if port.is_some() {
            return Err("`port` does not apply to `file://` servers".to_string());
        }
        return Ok(EndpointTarget::Local {
            root: PathBuf::from(rest),
        });
    }

    let bare = server.strip_prefix("ftp://").unwrap_or(server);
    let bare = bare.trim_end_matches('/');
    if bare.contains('/') {
        return Err(format!("server '{server}' must not contain a path"));
    }

    // Exactly one ':' means `host:port`; IPv6 literals are taken as-is.
    let (host, inline_port) = match bare.split_once(':') {
        Some((host, p)) if !p.contains(':') => {
            let p = p
                .parse::<u16>()
                .map_err(|_| format!("invalid port in server '{server}'"))?;
            (host, Some(p))
        }
        _ => (bare, None),
    };
    if host.is_empty() {
        return Err(format!("server '{server}' has no host"));
    }

    let port = match (inline_port, port) {
        (Some(a), Some(b)) if a != b => {
            return Err(format!(
                "server '{server}' names port {a} but `port` is {b}"
            ))
        }
        (Some(p), _) | (None, Some(p)) => p,
        (None, None) => DEFAULT_FTP_PORT,
    };

    Ok(EndpointTarget::Ftp {
        host: host.to_string(),
        port,
    })
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load and validate the endpoint list at `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Json` /
/// `ConfigError::Yaml` (with path + line context) if malformed.
pub fn load_endpoints_at(path: &Path) -> Result<Vec<Endpoint>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let descriptors: Vec<EndpointDescriptor> = if is_yaml(path) {
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?
    };

    resolve_endpoints(descriptors)
}

/// Validate descriptors and reject duplicate names.
pub fn resolve_endpoints(
    descriptors: Vec<EndpointDescriptor>,
) -> Result<Vec<Endpoint>, ConfigError> {
    let mut endpoints: Vec<Endpoint> = Vec::with_capacity(descriptors.len());
    for (index, descriptor) in descriptors.into_iter().enumerate() {
        let endpoint = Endpoint::from_descriptor(index, descriptor)?;
        if endpoints.iter().any(|e| e.name == endpoint.name) {
            return Err(ConfigError::DuplicateEndpoint {
                name: endpoint.name.0,
            });
        }
        endpoints.push(endpoint);
    }
    Ok(endpoints)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(server: &str) -> EndpointDescriptor {
        EndpointDescriptor {
            server: server.to_string(),
            user: "u".to_string(),
            password: Password::new("p"),
            name: None,
            port: None,
            orders_path: None,
            actions_path: None,
        }
    }

    #[test]
    fn bare_host_defaults_to_port_21() {
        let ep = Endpoint::from_descriptor(0, descriptor("ftp.example.com")).unwrap();
        assert_eq!(
            ep.target,
            EndpointTarget::Ftp {
                host: "ftp.example.com".to_string(),
                port: 21
            }
        );
        assert_eq!(ep.name.0, "ftp.example.com");
        assert_eq!(ep.orders_path, DEFAULT_ORDERS_PATH);
        assert_eq!(ep.actions_path, DEFAULT_ACTIONS_PATH);
    }

    #[test]
    fn ftp_url_with_port() {
        let ep = Endpoint::from_descriptor(0, descriptor("ftp://10.0.0.7:2121/")).unwrap();
        assert_eq!(
            ep.target,
            EndpointTarget::Ftp {
                host: "10.0.0.7".to_string(),
                port: 2121
            }
        );
    }

    #[test]
    fn conflicting_ports_rejected() {
        let mut d = descriptor("host:2121");
        d.port = Some(21);
        let err = Endpoint::from_descriptor(3, d).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { index: 3, .. }));
    }

    #[test]
    fn file_server_is_local_target() {
        let ep = Endpoint::from_descriptor(0, descriptor("file:///srv/orders")).unwrap();
        assert_eq!(
            ep.target,
            EndpointTarget::Local {
                root: PathBuf::from("/srv/orders")
            }
        );
    }

    #[test]
    fn empty_server_rejected() {
        let err = Endpoint::from_descriptor(1, descriptor("  ")).unwrap_err();
        assert!(err.to_string().contains("endpoint #1"));
    }

    #[test]
    fn same_document_paths_rejected() {
        let mut d = descriptor("host");
        d.orders_path = Some("x.json".to_string());
        d.actions_path = Some("x.json".to_string());
        assert!(Endpoint::from_descriptor(0, d).is_err());
    }

    #[test]
    fn password_is_redacted() {
        let ep = Endpoint::from_descriptor(0, descriptor("host")).unwrap();
        let debug = format!("{ep:?}");
        assert!(!debug.contains("\"p\""), "password leaked: {debug}");
        assert!(debug.contains("Password(***)"));
        assert_eq!(ep.password.expose(), "p");
    }
}
