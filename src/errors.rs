//! One-point stop for error-handling.
//!
//! Error handling is done using `error-chain`. Every failure surface described
//! by the component design funnels through this single `Error`/`ErrorKind`.
use std::io;

error_chain! {
    errors {
        KnownStateForbidsSend {
            description("endpoint is not in a state that allows sending")
        }
        KnownStateForbidsReceive {
            description("endpoint is not in a state that allows receiving")
        }
        NullPointerPassedToSend {
            description("send was called with no buffer and a non-zero length")
        }
        UnexpectedNumberOfBytes(got: usize, want: usize) {
            description("received message size did not match the expected size")
            display("expected {} bytes, got {}", want, got)
        }
        SendTimeoutExpired(timeout_ms: u64) {
            description("send timed out before completing")
            display("send timed out after {} ms", timeout_ms)
        }
        ReceiveTimeoutExpired(timeout_ms: u64) {
            description("receive timed out before completing")
            display("receive timed out after {} ms", timeout_ms)
        }
        ZmqOperationError(op: String, dir: String, reason: String, endpoint: String) {
            description("a transport bind/connect/unbind/disconnect operation failed")
            display("{} ({}) failed on {}: {}", op, dir, endpoint, reason)
        }
        ZmqSendError(reason: String, len: usize, metadata: String) {
            description("a transport send call raised an error")
            display("send of {} bytes under topic '{}' failed: {}", len, metadata, reason)
        }
        ZmqReceiveError(reason: String, frame: String) {
            description("a transport receive call raised an error")
            display("receive of {} frame failed: {}", frame, reason)
        }
        ZmqSubscribeError(reason: String, topic: String) {
            description("a transport subscribe call raised an error")
            display("subscribe to '{}' failed: {}", topic, reason)
        }
        ZmqUnsubscribeError(reason: String, topic: String) {
            description("a transport unsubscribe call raised an error")
            display("unsubscribe from '{}' failed: {}", topic, reason)
        }
        ServiceNotFound(name: String) {
            description("a named service could not be resolved")
            display("service not found: {}", name)
        }
        NameNotFound(name: String, reason: String) {
            description("a hostname could not be resolved")
            display("name not found: {} ({})", name, reason)
        }
        InitError(reason: String) {
            description("the endpoint context failed to initialize")
            display("init error: {}", reason)
        }
    }
    foreign_links {
        Io(io::Error);
        Zmq(zmq::Error);
    }
}

impl ErrorKind {
    /// True for the two timeout kinds, used by callers implementing `no_throw_on_timeout`.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ErrorKind::SendTimeoutExpired(_) | ErrorKind::ReceiveTimeoutExpired(_)
        )
    }
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        self.kind().is_timeout()
    }
}
