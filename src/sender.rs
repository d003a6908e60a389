//! The Sender capability: one-shot and multipart sending with shared
//! preconditions, grounded on the non-virtual-interface split between
//! `Sender::send` and a transport's `send_` in the reference sources.
use std::time::Duration;

use crate::errors::*;

/// Return immediately after a single non-blocking attempt.
pub const NO_BLOCK: Duration = Duration::from_millis(0);
/// Effectively unbounded: guaranteed to be at least one hour.
pub const BLOCK: Duration = Duration::from_secs(60 * 60);

pub trait Sender {
    /// Resolves `config.connection_string` (or `service_name`) and binds or
    /// connects accordingly. Returns the concrete endpoint used.
    fn connect_for_sends(&mut self, config: &crate::config::Config) -> Result<String>;

    fn can_send(&self) -> bool;

    /// The transport-specific half of `send`: given a non-empty buffer,
    /// attempt to transmit it (as metadata + data frames) before `timeout`
    /// elapses. Required method; callers should use `send` instead.
    fn send_timeout(
        &self,
        data: &[u8],
        timeout: Duration,
        metadata: &str,
        no_throw_on_timeout: bool,
    ) -> Result<bool>;

    fn bytes_sent(&self) -> u64;
    fn messages_sent(&self) -> u64;

    /// Sends `data` (declared length `len`) under topic `metadata`.
    ///
    /// `data` models a possibly-null buffer as `Option<&[u8]>` so the
    /// null-pointer precondition is expressible without unsafe code: `None`
    /// with `len > 0` raises `NullPointerPassedToSend`.
    fn send(
        &self,
        data: Option<&[u8]>,
        len: usize,
        timeout: Duration,
        metadata: &str,
        no_throw_on_timeout: bool,
    ) -> Result<bool> {
        if len == 0 {
            return Ok(true);
        }
        if !self.can_send() {
            bail!(ErrorKind::KnownStateForbidsSend);
        }
        let buf = data.ok_or(ErrorKind::NullPointerPassedToSend)?;
        self.send_timeout(buf, timeout, metadata, no_throw_on_timeout)
    }

    /// Sends each of `parts` under the same topic `metadata`, in order. The
    /// default policy re-sends the metadata frame ahead of every part, which
    /// a transport may override with a true multi-frame send.
    fn send_multipart(
        &self,
        parts: &[&[u8]],
        timeout: Duration,
        metadata: &str,
    ) -> Result<bool> {
        for part in parts {
            if !self.send(Some(part), part.len(), timeout, metadata, false)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Trivial stub whose sending ability can be toggled, mirroring
    /// `Sender_test.cxx`'s `SenderImpl`.
    struct StubSender {
        can_send: AtomicBool,
    }

    impl StubSender {
        fn new() -> Self {
            StubSender {
                can_send: AtomicBool::new(false),
            }
        }

        fn connect(&self) {
            self.can_send.store(true, Ordering::SeqCst);
        }

        fn sabotage(&self) {
            self.can_send.store(false, Ordering::SeqCst);
        }
    }

    impl Sender for StubSender {
        fn connect_for_sends(&mut self, _config: &crate::config::Config) -> Result<String> {
            self.can_send.store(true, Ordering::SeqCst);
            Ok(String::new())
        }

        fn can_send(&self) -> bool {
            self.can_send.load(Ordering::SeqCst)
        }

        fn send_timeout(
            &self,
            _data: &[u8],
            _timeout: Duration,
            _metadata: &str,
            _no_throw_on_timeout: bool,
        ) -> Result<bool> {
            Ok(true)
        }

        fn bytes_sent(&self) -> u64 {
            0
        }

        fn messages_sent(&self) -> u64 {
            0
        }
    }

    #[test]
    fn status_checks() {
        let stub = StubSender::new();
        let random_data = b"TEST";

        assert!(!stub.can_send());

        stub.connect();
        assert!(stub.can_send());
        stub.send(Some(random_data), random_data.len(), NO_BLOCK, "", false)
            .unwrap();

        stub.sabotage();
        assert!(!stub.can_send());
        let err = stub
            .send(Some(random_data), random_data.len(), NO_BLOCK, "", false)
            .unwrap_err();
        assert!(matches!(*err.kind(), ErrorKind::KnownStateForbidsSend));
    }

    #[test]
    fn bad_input() {
        let stub = StubSender::new();
        stub.connect();

        let err = stub.send(None, 10, NO_BLOCK, "", false).unwrap_err();
        assert!(matches!(*err.kind(), ErrorKind::NullPointerPassedToSend));

        let random_data = b"TEST";
        assert!(stub
            .send(Some(random_data), 0, NO_BLOCK, "", false)
            .unwrap());
    }
}
