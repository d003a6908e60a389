//! Plugin factory: maps a well-known name to a constructor.
//!
//! The reference sources resolve plugins through a dynamically-linked
//! loader; that concern is external here. This module keeps the same
//! string-keyed lookup API but backs it with an in-process type registry
//! populated once, on first use.
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::errors::*;
use crate::receiver::Receiver;
use crate::sender::Sender;
use crate::subscribe::Subscriber;
use crate::zmq_transport::{ZmqPublisher, ZmqReceiver, ZmqSender, ZmqSubscriber};

/// The four roles a plugin can be recommended for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpmPluginType {
    Sender,
    Receiver,
    Publisher,
    Subscriber,
}

/// The default plugin name for each role.
pub fn recommended_plugin_name(plugin_type: IpmPluginType) -> &'static str {
    match plugin_type {
        IpmPluginType::Sender => "ZmqSender",
        IpmPluginType::Receiver => "ZmqReceiver",
        IpmPluginType::Publisher => "ZmqPublisher",
        IpmPluginType::Subscriber => "ZmqSubscriber",
    }
}

type SenderCtor = fn() -> Result<Box<dyn Sender + Send + Sync>>;
type ReceiverCtor = fn() -> Result<Box<dyn Receiver + Send + Sync>>;
type SubscriberCtor = fn() -> Result<Box<dyn Subscriber + Send + Sync>>;

struct Registry {
    senders: Mutex<HashMap<&'static str, SenderCtor>>,
    receivers: Mutex<HashMap<&'static str, ReceiverCtor>>,
    subscribers: Mutex<HashMap<&'static str, SubscriberCtor>>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let mut senders: HashMap<&'static str, SenderCtor> = HashMap::new();
        senders.insert("ZmqSender", || {
            Ok(Box::new(ZmqSender::new()?) as Box<dyn Sender + Send + Sync>)
        });
        senders.insert("ZmqPublisher", || {
            Ok(Box::new(ZmqPublisher::new()?) as Box<dyn Sender + Send + Sync>)
        });

        let mut receivers: HashMap<&'static str, ReceiverCtor> = HashMap::new();
        receivers.insert("ZmqReceiver", || {
            Ok(Box::new(ZmqReceiver::new()?) as Box<dyn Receiver + Send + Sync>)
        });

        let mut subscribers: HashMap<&'static str, SubscriberCtor> = HashMap::new();
        subscribers.insert("ZmqSubscriber", || {
            Ok(Box::new(ZmqSubscriber::new()?) as Box<dyn Subscriber + Send + Sync>)
        });

        Registry {
            senders: Mutex::new(senders),
            receivers: Mutex::new(receivers),
            subscribers: Mutex::new(subscribers),
        }
    })
}

/// Registers an additional sender plugin under `name`, overriding any
/// existing registration.
pub fn register_sender(name: &'static str, ctor: SenderCtor) {
    registry().senders.lock().unwrap().insert(name, ctor);
}

pub fn register_receiver(name: &'static str, ctor: ReceiverCtor) {
    registry().receivers.lock().unwrap().insert(name, ctor);
}

pub fn register_subscriber(name: &'static str, ctor: SubscriberCtor) {
    registry().subscribers.lock().unwrap().insert(name, ctor);
}

pub fn make_ipm_sender(name: &str) -> Result<Box<dyn Sender + Send + Sync>> {
    let ctor = *registry()
        .senders
        .lock()
        .unwrap()
        .get(name)
        .ok_or_else(|| Error::from(format!("no sender plugin registered under '{}'", name)))?;
    ctor()
}

pub fn make_ipm_publisher(name: &str) -> Result<Box<dyn Sender + Send + Sync>> {
    make_ipm_sender(name)
}

pub fn make_ipm_receiver(name: &str) -> Result<Box<dyn Receiver + Send + Sync>> {
    let ctor = *registry()
        .receivers
        .lock()
        .unwrap()
        .get(name)
        .ok_or_else(|| Error::from(format!("no receiver plugin registered under '{}'", name)))?;
    ctor()
}

pub fn make_ipm_subscriber(name: &str) -> Result<Box<dyn Subscriber + Send + Sync>> {
    let ctor = *registry()
        .subscribers
        .lock()
        .unwrap()
        .get(name)
        .ok_or_else(|| Error::from(format!("no subscriber plugin registered under '{}'", name)))?;
    ctor()
}
