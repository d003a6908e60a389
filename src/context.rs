//! Process-wide transport context.
//!
//! A single `zmq::Context` backs every endpoint in the process. It is created
//! lazily on first access and tuned from environment variables before any
//! socket gets a chance to open, since the underlying runtime only accepts
//! IO-thread changes prior to the first `socket()` call.
use std::env;
use std::sync::OnceLock;

use crate::errors::*;

/// Default `ZMQ_IO_THREADS`.
pub const DEFAULT_IO_THREADS: i32 = 1;
/// Default `ZMQ_MAX_SOCKETS`, matching the reference transport's own default.
pub const DEFAULT_MAX_SOCKETS: i32 = 16_636;

static CONTEXT: OnceLock<EndpointContext> = OnceLock::new();

/// Process-wide handle to the transport runtime.
///
/// `max_sockets` is validated and recorded here, but the `zmq` crate's safe
/// `Context` has no accessor for `ZMQ_MAX_SOCKETS` (only `ZMQ_IO_THREADS` is
/// exposed), so a configured cap cannot be pushed into the live runtime
/// through this dependency. See DESIGN.md for the resolution.
pub struct EndpointContext {
    ctx: zmq::Context,
    max_sockets: i32,
}

impl EndpointContext {
    fn build() -> Result<Self> {
        let ctx = zmq::Context::new();

        let io_threads = match env::var("IPM_ZMQ_IO_THREADS") {
            Ok(v) => {
                let parsed: i32 = v
                    .parse()
                    .map_err(|_| ErrorKind::InitError(format!("IPM_ZMQ_IO_THREADS={} is not an integer", v)))?;
                if parsed < 1 {
                    bail!(ErrorKind::InitError(format!(
                        "IPM_ZMQ_IO_THREADS={} must be >= 1",
                        parsed
                    )));
                }
                parsed
            }
            Err(_) => DEFAULT_IO_THREADS,
        };
        if io_threads > DEFAULT_IO_THREADS {
            ctx.set_io_threads(io_threads)
                .chain_err(|| "could not apply IPM_ZMQ_IO_THREADS to the transport context")?;
            tracing::debug!(io_threads, "raised transport IO thread count");
        }

        let max_sockets = match env::var("IPM_ZMQ_MAX_SOCKETS") {
            Ok(v) => {
                let parsed: i32 = v
                    .parse()
                    .map_err(|_| ErrorKind::InitError(format!("IPM_ZMQ_MAX_SOCKETS={} is not an integer", v)))?;
                if parsed < DEFAULT_MAX_SOCKETS {
                    bail!(ErrorKind::InitError(format!(
                        "IPM_ZMQ_MAX_SOCKETS={} must be >= {}",
                        parsed, DEFAULT_MAX_SOCKETS
                    )));
                }
                tracing::debug!(max_sockets = parsed, "recorded configured socket cap");
                parsed
            }
            Err(_) => DEFAULT_MAX_SOCKETS,
        };

        Ok(EndpointContext { ctx, max_sockets })
    }

    /// The process-wide singleton, created and tuned on first access.
    pub fn instance() -> &'static EndpointContext {
        CONTEXT.get_or_init(|| Self::build().expect("invalid IPM_ZMQ_* environment configuration"))
    }

    /// Try to initialize the singleton, surfacing validation failures instead
    /// of panicking. Calling this before any other use of the crate lets a
    /// caller handle a misconfigured environment gracefully; subsequent calls
    /// (including the implicit one inside `instance()`) are no-ops.
    pub fn try_init() -> Result<&'static EndpointContext> {
        if let Some(existing) = CONTEXT.get() {
            return Ok(existing);
        }
        let built = Self::build()?;
        Ok(CONTEXT.get_or_init(|| built))
    }

    /// A cheap clone of the underlying transport context (it is internally
    /// reference-counted), for constructing a socket.
    pub fn zmq_context(&self) -> zmq::Context {
        self.ctx.clone()
    }

    pub fn io_threads(&self) -> i32 {
        self.ctx.get_io_threads().unwrap_or(DEFAULT_IO_THREADS)
    }

    /// The configured socket cap. See the struct-level note: this value is
    /// validated and recorded but not currently applied to the live runtime.
    pub fn max_sockets(&self) -> i32 {
        self.max_sockets
    }
}
