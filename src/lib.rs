#![recursion_limit = "1024"]

//! Inter-process messaging over a pluggable transport.
//!
//! Four exchange patterns sit behind a small set of capability traits:
//! point-to-point `Sender`/`Receiver` and topic-addressed `Publisher`
//! (a `Sender`) / `Subscriber` (a `Receiver` + `SubscribeOps`). Concrete
//! endpoints are obtained by plugin name through [`factory`], backed here by
//! a ZeroMQ transport in [`zmq_transport`].

#[macro_use]
extern crate error_chain;

pub mod callback;
pub mod config;
pub mod context;
pub mod errors;
pub mod factory;
pub mod message;
pub mod receiver;
pub mod resolver;
pub mod sender;
pub mod state;
pub mod subscribe;
pub mod zmq_transport;

pub use callback::CallbackPump;
pub use config::Config;
pub use context::EndpointContext;
pub use errors::{Error, ErrorKind, Result};
pub use factory::{
    make_ipm_publisher, make_ipm_receiver, make_ipm_sender, make_ipm_subscriber,
    recommended_plugin_name, IpmPluginType,
};
pub use message::{Message, Response, ANY_SIZE};
pub use receiver::Receiver;
pub use resolver::Resolver;
pub use sender::{Sender, BLOCK, NO_BLOCK};
pub use subscribe::{SubscribeOps, Subscriber};

/// Eagerly initializes the process-wide transport context, surfacing an
/// `InitError` if the environment carries an invalid `IPM_ZMQ_*` setting
/// instead of panicking the first time an endpoint is constructed.
pub fn init() -> Result<()> {
    EndpointContext::try_init()?;
    Ok(())
}
