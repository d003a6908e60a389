//! The two-frame logical message shared by every exchange pattern.

/// A message as submitted by a sender: a topic/metadata frame and a payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub metadata: Vec<u8>,
    pub data: Vec<u8>,
}

impl Message {
    pub fn new(metadata: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        Message {
            metadata: metadata.into(),
            data: data.into(),
        }
    }
}

/// The receiver-side materialization of a `Message`. Returned by value; the
/// receiver retains no reference to it.
pub type Response = Message;

/// Sentinel meaning "accept any payload size" for `Receiver::receive`.
pub const ANY_SIZE: usize = 0;
