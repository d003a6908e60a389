//! Background callback pump, grounded on `CallbackAdapter.hpp`/`.cpp`, using
//! the teacher's `thread::Builder::new().name(...).spawn(...)` idiom for
//! worker threads.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::receiver::Receiver;
use crate::sender::NO_BLOCK;

const TIMEOUT_SLEEP: Duration = Duration::from_millis(10);

type BoxedReceiver = Arc<dyn Receiver + Send + Sync>;
type BoxedCallback = Arc<dyn Fn(crate::message::Response) + Send + Sync>;

/// Drives a `Receiver` from a background thread and dispatches each
/// successfully received message into a user callback.
///
/// The worker starts as soon as both a receiver and a callback are set, and
/// is always joined before the pump is dropped. `receiver`/`callback` are
/// shared slots the worker re-reads on every iteration, so clearing either
/// one from any thread is what the worker's own loop condition observes.
pub struct CallbackPump {
    receiver: Arc<Mutex<Option<BoxedReceiver>>>,
    callback: Arc<Mutex<Option<BoxedCallback>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    listening: Arc<AtomicBool>,
}

impl Default for CallbackPump {
    fn default() -> Self {
        CallbackPump {
            receiver: Arc::new(Mutex::new(None)),
            callback: Arc::new(Mutex::new(None)),
            worker: Mutex::new(None),
            listening: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl CallbackPump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_receiver(&self, receiver: Option<BoxedReceiver>) {
        *self.receiver.lock().unwrap() = receiver;
        self.restart_if_ready();
    }

    pub fn set_callback(&self, callback: Option<BoxedCallback>) {
        *self.callback.lock().unwrap() = callback;
        self.restart_if_ready();
    }

    /// Clears the callback and shuts the worker down. The receiver reference
    /// is left in place.
    pub fn clear_callback(&self) {
        *self.callback.lock().unwrap() = None;
        self.shutdown();
    }

    fn restart_if_ready(&self) {
        self.shutdown();
        let ready =
            self.receiver.lock().unwrap().is_some() && self.callback.lock().unwrap().is_some();
        if ready {
            self.startup();
        }
    }

    fn startup(&self) {
        let receiver = Arc::clone(&self.receiver);
        let callback = Arc::clone(&self.callback);
        self.listening.store(false, Ordering::SeqCst);
        let listening = Arc::clone(&self.listening);

        let handle = thread::Builder::new()
            .name("ipm-callback-pump".to_string())
            .spawn(move || worker_loop(receiver, callback, listening))
            .expect("could not spawn callback pump worker");
        *self.worker.lock().unwrap() = Some(handle);

        while !self.listening.load(Ordering::SeqCst) {
            thread::yield_now();
        }
    }

    fn shutdown(&self) {
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CallbackPump {
    fn drop(&mut self) {
        *self.callback.lock().unwrap() = None;
        self.shutdown();
        *self.receiver.lock().unwrap() = None;
    }
}

fn worker_loop(
    receiver: Arc<Mutex<Option<BoxedReceiver>>>,
    callback: Arc<Mutex<Option<BoxedCallback>>>,
    listening: Arc<AtomicBool>,
) {
    loop {
        let current_receiver = match receiver.lock().unwrap().clone() {
            Some(r) => r,
            None => return,
        };
        if callback.lock().unwrap().is_none() {
            return;
        }
        match current_receiver.receive(NO_BLOCK, None, false) {
            Ok(response) => {
                if let Some(cb) = callback.lock().unwrap().as_ref() {
                    cb(response);
                }
            }
            Err(e) if e.is_timeout() => {
                thread::sleep(TIMEOUT_SLEEP);
            }
            Err(e) => {
                tracing::error!(error = %e, "callback pump worker stopping on receive error");
                return;
            }
        }
        listening.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sender::Sender;
    use crate::zmq_transport::{ZmqReceiver, ZmqSender};
    use std::sync::mpsc;

    #[test]
    fn dispatches_received_messages_to_the_callback() {
        let mut receiver = ZmqReceiver::new().unwrap();
        let endpoint = receiver
            .connect_for_receives(&Config::with_connection_string("inproc://callback-pump-test"))
            .unwrap();

        let pump = CallbackPump::new();
        let (tx, rx) = mpsc::channel();
        pump.set_callback(Some(Arc::new(move |response: crate::message::Response| {
            tx.send(response.data).unwrap();
        })));
        pump.set_receiver(Some(Arc::new(receiver)));

        let mut sender = ZmqSender::new().unwrap();
        sender
            .connect_for_sends(&Config::with_connection_string(&endpoint))
            .unwrap();
        sender
            .send(Some(b"hi"), 2, Duration::from_millis(500), "", false)
            .unwrap();

        let received = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(received, b"hi");

        pump.clear_callback();
    }
}
