//! Transport-backed Sender: a PUSH or PUB socket, grounded on
//! `ZmqSenderImpl.hpp`/`ZmqSender.cpp`/`ZmqPublisher.cpp`.
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::context::EndpointContext;
use crate::errors::*;
use crate::resolver::{rewrite_host_for_bind, PassthroughResolver, Resolver};
use crate::sender::Sender;
use crate::state::{AtomicEndpointState, Counters, EndpointState};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderKind {
    /// Point-to-point: connects to a receiver's bound address.
    Push,
    /// Topic fan-out: binds for any number of subscribers to connect to.
    Pub,
}

/// Shared send-loop implementation used by both `ZmqSender` and `ZmqPublisher`.
pub struct ZmqSenderImpl {
    kind: SenderKind,
    socket: Mutex<zmq::Socket>,
    state: AtomicEndpointState,
    endpoint: Mutex<Option<String>>,
    counters: Counters,
}

impl ZmqSenderImpl {
    fn new(kind: SenderKind) -> Result<Self> {
        let socket_type = match kind {
            SenderKind::Push => zmq::PUSH,
            SenderKind::Pub => zmq::PUB,
        };
        let socket = EndpointContext::instance()
            .zmq_context()
            .socket(socket_type)
            .chain_err(|| "could not create transport socket")?;
        socket
            .set_sndtimeo(0)
            .chain_err(|| "could not set non-blocking send timeout")?;
        if kind == SenderKind::Push {
            socket
                .set_immediate(true)
                .chain_err(|| "could not enable immediate mode")?;
        }
        Ok(ZmqSenderImpl {
            kind,
            socket: Mutex::new(socket),
            state: AtomicEndpointState::new(EndpointState::Unconnected),
            endpoint: Mutex::new(None),
            counters: Counters::default(),
        })
    }

    fn connect_for_sends_with(
        &mut self,
        config: &Config,
        resolver: &dyn Resolver,
    ) -> Result<String> {
        let connection_string = config
            .connection_string
            .as_deref()
            .unwrap_or("inproc://default");

        let resolved = resolver.resolve_connection_string(connection_string)?;
        let socket = self.socket.get_mut().expect("sender socket mutex poisoned");

        let mut last_ok = None;
        for endpoint in &resolved {
            let attempted = if self.kind == SenderKind::Pub {
                rewrite_host_for_bind(endpoint)
            } else {
                endpoint.clone()
            };
            let outcome = match self.kind {
                SenderKind::Push => socket.connect(&attempted),
                SenderKind::Pub => socket.bind(&attempted),
            };
            match outcome {
                Ok(()) => {
                    let bound = socket
                        .get_last_endpoint()
                        .chain_err(|| "could not read last endpoint")?
                        .unwrap_or(attempted.clone());
                    tracing::debug!(endpoint = %bound, kind = ?self.kind, "sender attached");
                    last_ok = Some(bound);
                    break;
                }
                Err(e) => {
                    tracing::warn!(endpoint = %attempted, error = %e, "sender attach attempt failed");
                }
            }
        }

        match last_ok {
            Some(endpoint) => {
                self.state.store(EndpointState::Connected);
                *self.endpoint.get_mut().unwrap() = Some(endpoint.clone());
                Ok(endpoint)
            }
            None => bail!(ErrorKind::ZmqOperationError(
                match self.kind {
                    SenderKind::Push => "connect".into(),
                    SenderKind::Pub => "bind".into(),
                },
                "send".into(),
                "no resolved endpoint succeeded".into(),
                connection_string.to_string(),
            )),
        }
    }

    fn send_loop(
        &self,
        data: &[u8],
        timeout: Duration,
        metadata: &str,
        no_throw_on_timeout: bool,
    ) -> Result<bool> {
        let socket = self.socket.lock().expect("sender socket mutex poisoned");
        let t0 = Instant::now();
        let mut header_sent = false;
        loop {
            if !header_sent {
                header_sent = match socket.send(metadata.as_bytes(), zmq::SNDMORE) {
                    Ok(()) => true,
                    Err(zmq::Error::EAGAIN) => {
                        tracing::trace!(metadata, "send loop: topic frame would block, retrying");
                        false
                    }
                    Err(e) => bail!(ErrorKind::ZmqSendError(
                        e.to_string(),
                        data.len(),
                        metadata.to_string()
                    )),
                };
            }
            if header_sent {
                match socket.send(data, 0) {
                    Ok(()) => {
                        self.counters.record(data.len());
                        return Ok(true);
                    }
                    Err(zmq::Error::EAGAIN) => {
                        tracing::trace!(metadata, "send loop: data frame would block, retrying");
                    }
                    Err(e) => bail!(ErrorKind::ZmqSendError(
                        e.to_string(),
                        data.len(),
                        metadata.to_string()
                    )),
                }
            }
            if t0.elapsed() >= timeout {
                break;
            }
            thread::sleep(POLL_INTERVAL);
        }
        if no_throw_on_timeout {
            Ok(false)
        } else {
            bail!(ErrorKind::SendTimeoutExpired(timeout.as_millis() as u64))
        }
    }

    fn teardown(&mut self) {
        let endpoint = self.endpoint.get_mut().unwrap().take();
        if let Some(endpoint) = endpoint {
            let socket = self.socket.get_mut().expect("sender socket mutex poisoned");
            let result = match self.kind {
                SenderKind::Push => socket.disconnect(&endpoint),
                SenderKind::Pub => socket.unbind(&endpoint),
            };
            if let Err(e) = result {
                tracing::warn!(endpoint = %endpoint, error = %e, "sender teardown failed");
            }
        }
        self.state.store(EndpointState::Closed);
    }
}

impl Drop for ZmqSenderImpl {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Point-to-point sender (PUSH). Connects to a receiver's bound address.
pub struct ZmqSender(ZmqSenderImpl);

impl ZmqSender {
    pub fn new() -> Result<Self> {
        Ok(ZmqSender(ZmqSenderImpl::new(SenderKind::Push)?))
    }
}

impl Sender for ZmqSender {
    fn connect_for_sends(&mut self, config: &Config) -> Result<String> {
        self.0.connect_for_sends_with(config, &PassthroughResolver)
    }

    fn can_send(&self) -> bool {
        self.0.state.is_connected()
    }

    fn send_timeout(
        &self,
        data: &[u8],
        timeout: Duration,
        metadata: &str,
        no_throw_on_timeout: bool,
    ) -> Result<bool> {
        self.0.send_loop(data, timeout, metadata, no_throw_on_timeout)
    }

    fn bytes_sent(&self) -> u64 {
        self.0.counters.bytes()
    }

    fn messages_sent(&self) -> u64 {
        self.0.counters.messages()
    }
}

/// Topic-addressed sender (PUB). Binds for subscribers to connect to.
pub struct ZmqPublisher(ZmqSenderImpl);

impl ZmqPublisher {
    pub fn new() -> Result<Self> {
        Ok(ZmqPublisher(ZmqSenderImpl::new(SenderKind::Pub)?))
    }
}

impl Sender for ZmqPublisher {
    fn connect_for_sends(&mut self, config: &Config) -> Result<String> {
        self.0.connect_for_sends_with(config, &PassthroughResolver)
    }

    fn can_send(&self) -> bool {
        self.0.state.is_connected()
    }

    fn send_timeout(
        &self,
        data: &[u8],
        timeout: Duration,
        metadata: &str,
        no_throw_on_timeout: bool,
    ) -> Result<bool> {
        self.0.send_loop(data, timeout, metadata, no_throw_on_timeout)
    }

    fn bytes_sent(&self) -> u64 {
        self.0.counters.bytes()
    }

    fn messages_sent(&self) -> u64 {
        self.0.counters.messages()
    }
}
