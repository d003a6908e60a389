//! The endpoint state machine shared by every transport-backed endpoint.
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum EndpointState {
    #[default]
    Unconnected = 0,
    Connected = 1,
    Closed = 2,
}

/// An `EndpointState` storable behind a shared reference.
#[derive(Debug, Default)]
pub struct AtomicEndpointState(AtomicU8);

impl AtomicEndpointState {
    pub fn new(state: EndpointState) -> Self {
        AtomicEndpointState(AtomicU8::new(state as u8))
    }

    pub fn load(&self) -> EndpointState {
        match self.0.load(Ordering::SeqCst) {
            1 => EndpointState::Connected,
            2 => EndpointState::Closed,
            _ => EndpointState::Unconnected,
        }
    }

    pub fn store(&self, state: EndpointState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.load() == EndpointState::Connected
    }
}

/// Atomic byte/message counters with a swap-to-zero snapshot, matching
/// `Sender::get_info`/`Receiver::get_info` in the reference sources.
#[derive(Debug, Default)]
pub struct Counters {
    bytes: AtomicU64,
    messages: AtomicU64,
}

impl Counters {
    pub fn record(&self, len: usize) {
        self.bytes.fetch_add(len as u64, Ordering::SeqCst);
        self.messages.fetch_add(1, Ordering::SeqCst);
    }

    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::SeqCst)
    }

    pub fn messages(&self) -> u64 {
        self.messages.load(Ordering::SeqCst)
    }

    pub fn snapshot_and_reset(&self) -> (u64, u64) {
        (
            self.bytes.swap(0, Ordering::SeqCst),
            self.messages.swap(0, Ordering::SeqCst),
        )
    }
}
