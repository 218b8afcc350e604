use std::fs;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use tokio::time::{Instant, MissedTickBehavior};

use ordersync_core::config::load_endpoints_at;
use ordersync_sync::{PassReport, ReconcileOptions, Reconciler, SyncScope};

use crate::error::{io_err, DaemonError};
use crate::gate::{PassGate, PassPermit};
use crate::paths::{run_dir, socket_path, DAEMON_LABEL};
use crate::protocol::{ControlReply, ControlRequest};
use crate::settings::DaemonSettings;
use crate::status::{unix_seconds_now, RuntimeStatus};

struct SyncJob {
    scope: SyncScope,
    source: &'static str,
    permit: PassPermit,
    respond_to: Option<oneshot::Sender<Result<PassReport, String>>>,
}

/// State shared by every daemon task.
#[derive(Clone)]
struct Shared {
    home: PathBuf,
    settings: DaemonSettings,
    reconciler: Arc<Reconciler>,
    status: Arc<RwLock<RuntimeStatus>>,
    gate: PassGate,
}

/// Start the daemon runtime and block the current thread until it exits.
pub fn start_blocking(home: &Path, settings: DaemonSettings) -> Result<(), DaemonError> {
    init_tracing("info", settings.json_logs);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(home.to_path_buf(), settings))
}

/// Load the endpoint configuration and run the daemon until shutdown.
///
/// A configuration error aborts startup; nothing is bound before it loads.
pub async fn run(home: PathBuf, settings: DaemonSettings) -> Result<(), DaemonError> {
    let endpoints = load_endpoints_at(&settings.config_path)?;
    if endpoints.is_empty() {
        tracing::warn!(
            config = %settings.config_path.display(),
            "no endpoints configured; passes will be no-ops",
        );
    } else {
        tracing::info!(endpoints = endpoints.len(), "loaded endpoint configuration");
    }

    let options = ReconcileOptions {
        dry_run: false,
        op_timeout: settings.op_timeout,
    };
    let reconciler = Arc::new(Reconciler::with_defaults(endpoints, options));
    run_with(home, settings, reconciler).await
}

/// Run the daemon tasks around an already-built [`Reconciler`].
pub async fn run_with(
    home: PathBuf,
    settings: DaemonSettings,
    reconciler: Arc<Reconciler>,
) -> Result<(), DaemonError> {
    ensure_runtime_dirs(&home)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.http_port));
    let http_listener = TcpListener::bind(addr)
        .await
        .map_err(|e| io_err(format!("liveness port {}", settings.http_port), e))?;

    let shared = Shared {
        home,
        settings,
        reconciler,
        status: Arc::new(RwLock::new(RuntimeStatus::new(unix_seconds_now()))),
        gate: PassGate::new(),
    };

    let (sync_tx, sync_rx) = mpsc::channel::<SyncJob>(8);
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let scheduler_handle = {
        let shutdown = shutdown_tx.clone();
        let shared = shared.clone();
        let sync_tx = sync_tx.clone();
        tokio::spawn(async move {
            let result = scheduler_task(shared, sync_tx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let processor_handle = {
        let shutdown = shutdown_tx.clone();
        let shared = shared.clone();
        tokio::spawn(async move {
            let result = sync_processor_task(shared, sync_rx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let socket_handle = {
        let shutdown = shutdown_tx.clone();
        let shared = shared.clone();
        tokio::spawn(async move {
            let result =
                socket_server_task(shared, sync_tx, shutdown.clone(), shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let liveness_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let result = crate::liveness::serve(http_listener, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down daemon");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(io_err("ctrl-c handler", err)),
                    }
                }
            }
        })
    };

    let (scheduler_result, processor_result, socket_result, liveness_result, signal_result) = tokio::join!(
        scheduler_handle,
        processor_handle,
        socket_handle,
        liveness_handle,
        signal_handle
    );

    handle_join("scheduler", scheduler_result)?;
    handle_join("sync_processor", processor_result)?;
    handle_join("socket_server", socket_result)?;
    handle_join("liveness", liveness_result)?;
    handle_join("signal_handler", signal_result)?;
    tracing::info!("daemon stopped");
    Ok(())
}

/// Fire a pass every interval, starting immediately. A tick that finds a
/// pass in flight is dropped.
async fn scheduler_task(
    shared: Shared,
    sync_tx: mpsc::Sender<SyncJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut interval = tokio::time::interval(shared.settings.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = interval.tick() => {
                let Some(permit) = shared.gate.try_acquire() else {
                    tracing::warn!("previous pass still running; skipping scheduled pass");
                    shared.status.write().await.record_skip();
                    continue;
                };
                let job = SyncJob {
                    scope: SyncScope::All,
                    source: "schedule",
                    permit,
                    respond_to: None,
                };
                if sync_tx.send(job).await.is_err() {
                    tracing::debug!("sync queue closed; scheduler exiting");
                    break;
                }
            }
        }
    }

    Ok(())
}

async fn sync_processor_task(
    shared: Shared,
    mut sync_rx: mpsc::Receiver<SyncJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            maybe_job = sync_rx.recv() => {
                let Some(job) = maybe_job else { break };
                let outcome = run_job(&shared, &job).await;
                drop(job.permit);
                if let Some(respond_to) = job.respond_to {
                    let _ = respond_to.send(outcome);
                }
            }
        }
    }

    Ok(())
}

async fn run_job(shared: &Shared, job: &SyncJob) -> Result<PassReport, String> {
    let started = Instant::now();
    match shared.reconciler.run(&job.scope, false).await {
        Ok(report) => {
            shared
                .status
                .write()
                .await
                .record_pass(&report, job.source, unix_seconds_now());
            tracing::info!(
                source = job.source,
                scope = %report.scope,
                succeeded = report.succeeded(),
                failed = report.failed(),
                duration_ms = started.elapsed().as_millis(),
                "pass completed",
            );
            Ok(report)
        }
        Err(err) => {
            tracing::error!(source = job.source, error = %err, "pass rejected");
            Err(err.to_string())
        }
    }
}

async fn socket_server_task(
    shared: Shared,
    sync_tx: mpsc::Sender<SyncJob>,
    shutdown_tx: broadcast::Sender<()>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let socket = socket_path(&shared.home);
    prepare_socket_for_bind(&socket)?;

    let listener = UnixListener::bind(&socket).map_err(|e| io_err(&socket, e))?;
    set_socket_permissions(&socket)?;
    tracing::info!(socket = %socket.display(), "control socket listening");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            accepted = listener.accept() => {
                let (stream, _) = accepted.map_err(|e| io_err(&socket, e))?;
                let shared = shared.clone();
                let sync_tx = sync_tx.clone();
                let shutdown_tx = shutdown_tx.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_socket_client(stream, shared, sync_tx, shutdown_tx).await {
                        tracing::error!(error = %err, "socket client error");
                    }
                });
            }
        }
    }

    if socket.exists() {
        let _ = fs::remove_file(&socket);
    }
    Ok(())
}

async fn handle_socket_client<S>(
    stream: S,
    shared: Shared,
    sync_tx: mpsc::Sender<SyncJob>,
    shutdown_tx: broadcast::Sender<()>,
) -> Result<(), DaemonError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| io_err("daemon socket read", e))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let request: ControlRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(err) => {
                write_reply(&mut writer, &ControlReply::Error(format!("invalid request: {err}")))
                    .await?;
                continue;
            }
        };

        let stop = request == ControlRequest::Stop;
        let reply = match request {
            ControlRequest::Status => ControlReply::Data(build_status_payload(&shared).await),
            ControlRequest::Sync { endpoint } => {
                let scope = endpoint.map_or(SyncScope::All, SyncScope::Endpoint);
                match request_pass(&shared, &sync_tx, scope).await {
                    Ok(report) => ControlReply::Data(serde_json::to_value(&report)?),
                    Err(err) => ControlReply::Error(err.to_string()),
                }
            }
            ControlRequest::Stop => {
                tracing::info!("stop requested over control socket");
                let _ = shutdown_tx.send(());
                ControlReply::Data(json!({ "stopping": true }))
            }
        };

        write_reply(&mut writer, &reply).await?;
        if stop {
            break;
        }
    }

    Ok(())
}

/// Queue a pass on behalf of a client and wait for its report.
async fn request_pass(
    shared: &Shared,
    sync_tx: &mpsc::Sender<SyncJob>,
    scope: SyncScope,
) -> Result<PassReport, DaemonError> {
    let Some(permit) = shared.gate.try_acquire() else {
        tracing::warn!(scope = %scope.label(), "pass already running; rejecting manual sync");
        shared.status.write().await.record_skip();
        return Err(DaemonError::PassInFlight);
    };

    let (tx, rx) = oneshot::channel();
    sync_tx
        .send(SyncJob {
            scope,
            source: "socket",
            permit,
            respond_to: Some(tx),
        })
        .await
        .map_err(|_| DaemonError::TaskLost("sync processor".to_string()))?;

    let outcome = rx
        .await
        .map_err(|_| DaemonError::TaskLost("sync processor".to_string()))?;
    outcome.map_err(DaemonError::Refused)
}

async fn build_status_payload(shared: &Shared) -> Value {
    let status = shared.status.read().await.clone();
    let now = unix_seconds_now();
    let endpoints: Vec<Value> = shared
        .reconciler
        .endpoints()
        .iter()
        .map(|endpoint| {
            let health = status.endpoints.get(&endpoint.name.0).cloned().unwrap_or_default();
            json!({
                "name": endpoint.name.0,
                "target": endpoint.target.to_string(),
                "last_success_at_unix": health.last_success_at_unix,
                "last_failure_at_unix": health.last_failure_at_unix,
                "last_error": health.last_error,
            })
        })
        .collect();

    json!({
        "running": true,
        "label": DAEMON_LABEL,
        "started_at_unix": status.started_at_unix,
        "uptime_secs": now.saturating_sub(status.started_at_unix),
        "interval_secs": shared.settings.interval.as_secs(),
        "http_port": shared.settings.http_port,
        "pass_in_flight": shared.gate.is_busy(),
        "passes": status.passes,
        "skipped_passes": status.skipped_passes,
        "last_pass": status.last_pass,
        "endpoints": endpoints,
        "socket": socket_path(&shared.home).display().to_string(),
    })
}

fn prepare_socket_for_bind(socket: &Path) -> Result<(), DaemonError> {
    if !socket.exists() {
        return Ok(());
    }

    match StdUnixStream::connect(socket) {
        Ok(_) => {
            return Err(DaemonError::SocketInUse(socket.to_path_buf()));
        }
        Err(err) => {
            tracing::warn!(
                socket = %socket.display(),
                error = %err,
                "removing stale daemon socket before bind",
            );
        }
    }

    match fs::remove_file(socket) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(socket, err)),
    }
}

fn ensure_runtime_dirs(home: &Path) -> Result<(), DaemonError> {
    let run = run_dir(home);
    if !run.exists() {
        fs::create_dir_all(&run).map_err(|e| io_err(&run, e))?;
    }
    Ok(())
}

async fn write_reply<W>(writer: &mut W, reply: &ControlReply) -> Result<(), DaemonError>
where
    W: AsyncWrite + Unpin,
{
    let mut payload = serde_json::to_string(reply)?;
    payload.push('\n');
    writer
        .write_all(payload.as_bytes())
        .await
        .map_err(|e| io_err("daemon socket write", e))?;
    writer
        .flush()
        .await
        .map_err(|e| io_err("daemon socket flush", e))?;
    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => {
            tracing::error!(task, error = %err, "daemon task panicked or was cancelled");
            Err(DaemonError::TaskLost(task.to_string()))
        }
    }
}

/// Install the global subscriber on stderr. `RUST_LOG` overrides
/// `default_directive`.
pub fn init_tracing(default_directive: &str, json_logs: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

#[cfg(unix)]
fn set_socket_permissions(path: &Path) -> Result<(), DaemonError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_socket_permissions(_path: &Path) -> Result<(), DaemonError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use ordersync_core::{
        Endpoint, EndpointName, EndpointTarget, OrderList, Password, PlaceholderResolver,
    };
    use ordersync_store::MemoryConnector;
    use tempfile::TempDir;
    use tokio::time::advance;

    fn endpoint(name: &str) -> Endpoint {
        Endpoint {
            name: EndpointName::from(name),
            target: EndpointTarget::Ftp {
                host: format!("{name}.example"),
                port: 21,
            },
            user: "u".to_string(),
            password: Password::new("p"),
            orders_path: "orders.json".to_string(),
            actions_path: "actions.json".to_string(),
        }
    }

    fn shared(home: &Path, connector: MemoryConnector, names: &[&str]) -> Shared {
        let mut settings = DaemonSettings::new(home.join("ftp_servers.json"));
        settings.interval = Duration::from_secs(10);
        let reconciler = Reconciler::new(
            names.iter().map(|n| endpoint(n)).collect(),
            Arc::new(connector),
            Arc::new(PlaceholderResolver::new()),
            ReconcileOptions::default(),
        );
        Shared {
            home: home.to_path_buf(),
            settings,
            reconciler: Arc::new(reconciler),
            status: Arc::new(RwLock::new(RuntimeStatus::new(1_000))),
            gate: PassGate::new(),
        }
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn scheduler_fires_immediately_then_every_interval() {
        let home = TempDir::new().expect("home");
        let shared = shared(home.path(), MemoryConnector::new(), &[]);
        let (sync_tx, mut sync_rx) = mpsc::channel(8);
        let (shutdown_tx, _) = broadcast::channel(1);
        let task = tokio::spawn(scheduler_task(
            shared.clone(),
            sync_tx,
            shutdown_tx.subscribe(),
        ));

        let first = sync_rx.recv().await.expect("first tick");
        assert_eq!(first.scope, SyncScope::All);
        assert_eq!(first.source, "schedule");
        drop(first);

        advance(Duration::from_secs(10)).await;
        let second = sync_rx.recv().await.expect("second tick");
        drop(second);

        shutdown_tx.send(()).expect("shutdown");
        task.await.expect("join").expect("scheduler");
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn scheduler_skips_tick_while_pass_in_flight() {
        let home = TempDir::new().expect("home");
        let shared = shared(home.path(), MemoryConnector::new(), &[]);
        let (sync_tx, mut sync_rx) = mpsc::channel(8);
        let (shutdown_tx, _) = broadcast::channel(1);
        let task = tokio::spawn(scheduler_task(
            shared.clone(),
            sync_tx,
            shutdown_tx.subscribe(),
        ));

        // Hold the first job's permit as if its pass were still running.
        let in_flight = sync_rx.recv().await.expect("first tick");

        advance(Duration::from_secs(10)).await;
        for _ in 0..10 {
            if shared.status.read().await.skipped_passes > 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(shared.status.read().await.skipped_passes, 1);
        assert!(sync_rx.try_recv().is_err(), "overlapping tick must be dropped");

        drop(in_flight);
        advance(Duration::from_secs(10)).await;
        let next = sync_rx.recv().await.expect("tick after release");
        drop(next);

        shutdown_tx.send(()).expect("shutdown");
        task.await.expect("join").expect("scheduler");
    }

    #[tokio::test]
    async fn processor_runs_pass_records_status_and_releases_gate() {
        let home = TempDir::new().expect("home");
        let connector = MemoryConnector::new();
        let shared = shared(home.path(), connector.clone(), &["shop"]);
        let backend = connector.backend(&EndpointName::from("shop")).await;
        backend
            .put("actions.json", br#"[{"action":"add","order_ids":"A1,A2"}]"#.to_vec())
            .await;

        let (sync_tx, sync_rx) = mpsc::channel(8);
        let (shutdown_tx, _) = broadcast::channel(1);
        let task = tokio::spawn(sync_processor_task(
            shared.clone(),
            sync_rx,
            shutdown_tx.subscribe(),
        ));

        let report = request_pass(&shared, &sync_tx, SyncScope::All)
            .await
            .expect("pass");
        assert_eq!(report.endpoints.len(), 1);
        assert_eq!(report.failed(), 0);
        assert!(!shared.gate.is_busy());

        let orders: OrderList =
            serde_json::from_slice(&backend.get("orders.json").await.expect("orders")).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(backend.get("actions.json").await.as_deref(), Some(&b"[]"[..]));

        let status = shared.status.read().await;
        assert_eq!(status.passes, 1);
        assert!(status.endpoints["shop"].last_success_at_unix.is_some());
        drop(status);

        shutdown_tx.send(()).expect("shutdown");
        task.await.expect("join").expect("processor");
    }

    #[tokio::test]
    async fn manual_sync_rejected_while_pass_in_flight() {
        let home = TempDir::new().expect("home");
        let shared = shared(home.path(), MemoryConnector::new(), &["shop"]);
        let (sync_tx, _sync_rx) = mpsc::channel(8);
        let _held = shared.gate.try_acquire().expect("acquire");

        let err = request_pass(&shared, &sync_tx, SyncScope::All)
            .await
            .unwrap_err();
        assert!(matches!(err, DaemonError::PassInFlight));
        assert_eq!(shared.status.read().await.skipped_passes, 1);
    }

    #[tokio::test]
    async fn unknown_endpoint_sync_reports_error_and_releases_gate() {
        let home = TempDir::new().expect("home");
        let shared = shared(home.path(), MemoryConnector::new(), &["shop"]);
        let (sync_tx, sync_rx) = mpsc::channel(8);
        let (shutdown_tx, _) = broadcast::channel(1);
        let task = tokio::spawn(sync_processor_task(
            shared.clone(),
            sync_rx,
            shutdown_tx.subscribe(),
        ));

        let err = request_pass(&shared, &sync_tx, SyncScope::Endpoint("nope".to_string()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nope"), "got: {err}");
        assert!(!shared.gate.is_busy());

        shutdown_tx.send(()).expect("shutdown");
        task.await.expect("join").expect("processor");
    }

    #[tokio::test]
    async fn socket_client_handles_status_unknown_and_stop() {
        let home = TempDir::new().expect("home");
        let shared = shared(home.path(), MemoryConnector::new(), &["shop", "depot"]);
        let (sync_tx, _sync_rx) = mpsc::channel(8);
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        let (client, server) = tokio::io::duplex(4096);
        let task = tokio::spawn(handle_socket_client(
            server,
            shared,
            sync_tx,
            shutdown_tx,
        ));

        let (read_half, mut write_half) = tokio::io::split(client);
        let mut lines = BufReader::new(read_half).lines();

        write_half
            .write_all(b"{\"cmd\":\"status\"}\nnot json\n{\"cmd\":\"bogus\"}\n{\"cmd\":\"stop\"}\n")
            .await
            .expect("write requests");

        let status: Value =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert!(status.get("error").is_none());
        assert_eq!(status["data"]["running"], json!(true));
        assert_eq!(status["data"]["passes"], json!(0));
        let names: Vec<&str> = status["data"]["endpoints"]
            .as_array()
            .expect("endpoints")
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["shop", "depot"]);

        let invalid: Value =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert!(invalid["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid request"));

        let unknown: Value =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        let message = unknown["error"].as_str().expect("error reply");
        assert!(message.contains("bogus"), "{message}");

        let stop: Value =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(stop["data"]["stopping"], json!(true));

        shutdown_rx.recv().await.expect("shutdown signal");
        task.await.expect("join").expect("client");
    }

    #[tokio::test]
    async fn status_payload_before_any_pass() {
        let home = TempDir::new().expect("home");
        let shared = shared(home.path(), MemoryConnector::new(), &["shop"]);

        let payload = build_status_payload(&shared).await;
        assert_eq!(payload["started_at_unix"], json!(1_000u64));
        assert_eq!(payload["interval_secs"], json!(10u64));
        assert_eq!(payload["pass_in_flight"], json!(false));
        assert_eq!(payload["last_pass"], Value::Null);
        assert_eq!(payload["endpoints"][0]["last_success_at_unix"], Value::Null);
    }

    #[test]
    fn stale_socket_is_removed_before_bind() {
        let home = TempDir::new().expect("home");
        let socket = home.path().join("daemon.sock");
        fs::write(&socket, b"").expect("stale socket file");
        prepare_socket_for_bind(&socket).expect("prepare");
        assert!(!socket.exists());
    }
}
