//! The Receiver capability, grounded on the non-virtual-interface split
//! between `Receiver::receive` and a transport's `receive_` in the
//! reference sources.
use std::time::Duration;

use crate::errors::*;
use crate::message::Response;

pub trait Receiver {
    /// Resolves and binds (point-to-point) or connects (topic subscriber)
    /// the configured endpoint(s). Returns the concrete endpoint used (or,
    /// for a multi-endpoint subscriber, the most recently added one).
    fn connect_for_receives(&mut self, config: &crate::config::Config) -> Result<String>;

    fn can_receive(&self) -> bool;

    /// The transport-specific half of `receive`: attempt a single
    /// header+body receive before `timeout` elapses. Required method;
    /// callers should use `receive` instead.
    fn receive_timeout(&self, timeout: Duration) -> Result<Response>;

    fn bytes(&self) -> u64;
    fn messages(&self) -> u64;

    /// Atomically resets the byte/message counters and returns the values
    /// just before the reset, for an external metrics collector.
    fn snapshot_and_reset(&self) -> (u64, u64);

    /// Receives one message, optionally validating its payload length.
    ///
    /// `expected_size = None` accepts any size. On timeout, raises
    /// `ReceiveTimeoutExpired` unless `no_throw_on_timeout`, in which case an
    /// empty `Response` is returned.
    fn receive(
        &self,
        timeout: Duration,
        expected_size: Option<usize>,
        no_throw_on_timeout: bool,
    ) -> Result<Response> {
        if !self.can_receive() {
            bail!(ErrorKind::KnownStateForbidsReceive);
        }
        match self.receive_timeout(timeout) {
            Ok(response) => {
                if let Some(want) = expected_size {
                    if response.data.len() != want {
                        bail!(ErrorKind::UnexpectedNumberOfBytes(response.data.len(), want));
                    }
                }
                Ok(response)
            }
            Err(e) if e.is_timeout() && no_throw_on_timeout => Ok(Response::default()),
            Err(e) => Err(e),
        }
    }
}
