//! Transport-backed topic Subscriber (SUB), grounded on `ZmqSubscriber.cpp`.
//! Connects to one or many publishers; each `connect_for_receives` call adds
//! new endpoints idempotently.
use std::sync::Mutex;
use std::time::Duration;

use crate::config::Config;
use crate::context::EndpointContext;
use crate::errors::*;
use crate::message::Response;
use crate::receiver::Receiver;
use crate::resolver::{PassthroughResolver, Resolver};
use crate::state::{AtomicEndpointState, Counters, EndpointState};
use crate::subscribe::SubscribeOps;

use super::receive_loop::receive_loop;

pub struct ZmqSubscriber {
    socket: Mutex<zmq::Socket>,
    state: AtomicEndpointState,
    connected_endpoints: Mutex<Vec<String>>,
    counters: Counters,
}

impl ZmqSubscriber {
    pub fn new() -> Result<Self> {
        let socket = EndpointContext::instance()
            .zmq_context()
            .socket(zmq::SUB)
            .chain_err(|| "could not create transport socket")?;
        socket
            .set_rcvtimeo(0)
            .chain_err(|| "could not set non-blocking receive timeout")?;
        Ok(ZmqSubscriber {
            socket: Mutex::new(socket),
            state: AtomicEndpointState::new(EndpointState::Unconnected),
            connected_endpoints: Mutex::new(Vec::new()),
            counters: Counters::default(),
        })
    }
}

impl Receiver for ZmqSubscriber {
    fn connect_for_receives(&mut self, config: &Config) -> Result<String> {
        let requested: Vec<&str> = config.connection_strings_iter().collect();
        if requested.is_empty() {
            bail!(ErrorKind::InitError(
                "subscriber requires connection_string or connection_strings".into()
            ));
        }

        let socket = self.socket.get_mut().expect("subscriber socket mutex poisoned");
        let connected = self.connected_endpoints.get_mut().unwrap();

        let mut last_ok = None;
        for connection_string in requested {
            for endpoint in PassthroughResolver.resolve_connection_string(connection_string)? {
                if connected.contains(&endpoint) {
                    last_ok = Some(endpoint);
                    continue;
                }
                match socket.connect(&endpoint) {
                    Ok(()) => {
                        tracing::debug!(endpoint = %endpoint, "subscriber connected");
                        connected.push(endpoint.clone());
                        last_ok = Some(endpoint);
                    }
                    Err(e) => {
                        tracing::warn!(endpoint = %endpoint, error = %e, "subscriber connect attempt failed");
                    }
                }
            }
        }

        match last_ok {
            Some(endpoint) => {
                self.state.store(EndpointState::Connected);
                Ok(endpoint)
            }
            None => bail!(ErrorKind::ZmqOperationError(
                "connect".into(),
                "receive".into(),
                "no resolved endpoint succeeded".into(),
                "<subscriber endpoints>".into(),
            )),
        }
    }

    fn can_receive(&self) -> bool {
        self.state.is_connected()
    }

    fn receive_timeout(&self, timeout: Duration) -> Result<Response> {
        let socket = self.socket.lock().expect("subscriber socket mutex poisoned");
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

impl SubscribeOps for ZmqSubscriber {
    fn subscribe(&self, topic: &str) -> Result<()> {
        let socket = self.socket.lock().expect("subscriber socket mutex poisoned");
        socket
            .set_subscribe(topic.as_bytes())
            .map_err(|e| ErrorKind::ZmqSubscribeError(e.to_string(), topic.to_string()).into())
    }

    fn unsubscribe(&self, topic: &str) -> Result<()> {
        let socket = self.socket.lock().expect("subscriber socket mutex poisoned");
        socket
            .set_unsubscribe(topic.as_bytes())
            .map_err(|e| ErrorKind::ZmqUnsubscribeError(e.to_string(), topic.to_string()).into())
    }
}

impl Drop for ZmqSubscriber {
    fn drop(&mut self) {
        let socket = self.socket.get_mut().expect("subscriber socket mutex poisoned");
        for endpoint in self.connected_endpoints.get_mut().unwrap().drain(..) {
            if let Err(e) = socket.disconnect(&endpoint) {
                tracing::warn!(endpoint = %endpoint, error = %e, "subscriber teardown failed");
            }
        }
        self.state.store(EndpointState::Closed);
    }
}
