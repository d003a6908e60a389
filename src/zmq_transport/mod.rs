//! Transport-backed endpoint implementations on top of the `zmq` crate.
mod receive_loop;
pub mod receiver;
pub mod sender;
pub mod subscriber;

pub use receiver::ZmqReceiver;
pub use sender::{ZmqPublisher, ZmqSender, SenderKind};
pub use subscriber::ZmqSubscriber;
