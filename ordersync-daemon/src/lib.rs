//! ordersync daemon: interval scheduler, pass processor, control socket and
//! liveness responder.

mod error;
mod gate;
pub mod liveness;
pub mod paths;
pub mod protocol;
mod runtime;
mod settings;
pub mod status;

pub use error::DaemonError;
pub use gate::{PassGate, PassPermit};
pub use protocol::{
    call, request_status, request_stop, request_sync, ControlReply, ControlRequest,
};
pub use runtime::{init_tracing, run, run_with, start_blocking};
pub use settings::DaemonSettings;
pub use status::{EndpointHealth, PassSummary, RuntimeStatus};
