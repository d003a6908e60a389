//! Topic filtering, grounded on `ZmqReceiverImpl::subscribe`/`unsubscribe`.
use crate::errors::*;
use crate::receiver::Receiver;

pub trait SubscribeOps {
    /// Adds `topic` to the filter set. An empty topic matches every message.
    fn subscribe(&self, topic: &str) -> Result<()>;
    fn unsubscribe(&self, topic: &str) -> Result<()>;
}

/// A Receiver that also supports topic filtering. Any type implementing both
/// capability traits gets this for free.
pub trait Subscriber: Receiver + SubscribeOps {}
impl<T: Receiver + SubscribeOps> Subscriber for T {}
