//! Transport-backed point-to-point Receiver (PULL), grounded on
//! `ZmqReceiver.cpp`. Binds; a peer `ZmqSender` connects to it.
use std::sync::Mutex;
use std::time::Duration;

use crate::config::Config;
use crate::context::EndpointContext;
use crate::errors::*;
use crate::message::Response;
use crate::receiver::Receiver;
use crate::resolver::{PassthroughResolver, Resolver};
use crate::state::{AtomicEndpointState, Counters, EndpointState};

use super::receive_loop::receive_loop;

pub struct ZmqReceiver {
    socket: Mutex<zmq::Socket>,
    state: AtomicEndpointState,
    endpoint: Mutex<Option<String>>,
    counters: Counters,
}

impl ZmqReceiver {
    pub fn new() -> Result<Self> {
        let socket = EndpointContext::instance()
            .zmq_context()
            .socket(zmq::PULL)
            .chain_err(|| "could not create transport socket")?;
        socket
            .set_rcvtimeo(0)
            .chain_err(|| "could not set non-blocking receive timeout")?;
        Ok(ZmqReceiver {
            socket: Mutex::new(socket),
            state: AtomicEndpointState::new(EndpointState::Unconnected),
            endpoint: Mutex::new(None),
            counters: Counters::default(),
        })
    }
}

impl Receiver for ZmqReceiver {
    fn connect_for_receives(&mut self, config: &Config) -> Result<String> {
        let connection_string = config
            .connection_string
            .as_deref()
            .unwrap_or("inproc://default");
        let resolved = PassthroughResolver.resolve_connection_string(connection_string)?;
        let socket = self.socket.get_mut().expect("receiver socket mutex poisoned");

        let mut last_ok = None;
        for endpoint in &resolved {
            match socket.bind(endpoint) {
                Ok(()) => {
                    let bound = socket
                        .get_last_endpoint()
                        .chain_err(|| "could not read last endpoint")?
                        .unwrap_or_else(|_| endpoint.clone());
                    tracing::debug!(endpoint = %bound, "receiver bound");
                    last_ok = Some(bound);
                    break;
                }
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "receiver bind attempt failed");
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
                "bind".into(),
                "receive".into(),
                "no resolved endpoint succeeded".into(),
                connection_string.to_string(),
            )),
        }
    }

    fn can_receive(&self) -> bool {
        self.state.is_connected()
    }

    fn receive_timeout(&self, timeout: Duration) -> Result<Response> {
        let socket = self.socket.lock().expect("receiver socket mutex poisoned");
        receive_loop(&socket, timeout, &self.counters)
    }

    fn bytes(&self) -> u64 {
        self.counters.bytes()
    }

    fn messages(&self) -> u64 {
        self.counters.messages()
    }

    fn snapshot_and_reset(&self) -> (u64, u64) {
        self.counters.snapshot_and_reset()
    }
}

impl Drop for ZmqReceiver {
    fn drop(&mut self) {
        if let Some(endpoint) = self.endpoint.get_mut().unwrap().take() {
            let socket = self.socket.get_mut().expect("receiver socket mutex poisoned");
            if let Err(e) = socket.unbind(&endpoint) {
                tracing::warn!(endpoint = %endpoint, error = %e, "receiver teardown failed");
            }
        }
        self.state.store(EndpointState::Closed);
    }
}
