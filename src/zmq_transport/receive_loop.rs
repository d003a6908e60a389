//! Shared header+body receive loop used by both `ZmqReceiver` and
//! `ZmqSubscriber`, grounded on `ZmqReceiver.cpp`'s `receive_()`.
use std::thread;
use std::time::{Duration, Instant};

use crate::errors::*;
use crate::message::Response;
use crate::state::Counters;

const POLL_INTERVAL: Duration = Duration::from_millis(1);

pub fn receive_loop(
    socket: &zmq::Socket,
    timeout: Duration,
    counters: &Counters,
) -> Result<Response> {
    let mut header = zmq::Message::new();
    let mut body = zmq::Message::new();
    let t0 = Instant::now();
    let mut pending_header: Option<(Vec<u8>, bool)> = None;

    loop {
        if pending_header.is_none() {
            match socket.recv(&mut header, 0) {
                Ok(()) => {
                    let more = socket
                        .get_rcvmore()
                        .chain_err(|| "could not query multipart continuation flag")?;
                    pending_header = Some((header.to_vec(), more));
                }
                Err(zmq::Error::EAGAIN) => {
                    tracing::trace!("receive loop: header frame would block, retrying");
                }
                Err(e) => bail!(ErrorKind::ZmqReceiveError(e.to_string(), "header".into())),
            }
        }
        if let Some((metadata, more)) = &pending_header {
            if *more {
                match socket.recv(&mut body, 0) {
                    Ok(()) => {
                        let response = Response {
                            metadata: metadata.clone(),
                            data: body.to_vec(),
                        };
                        counters.record(response.data.len());
                        return Ok(response);
                    }
                    Err(zmq::Error::EAGAIN) => {
                        // Header already arrived; the body frame is part of
                        // the same atomic multipart message and is expected
                        // to be immediately available. Keep polling rather
                        // than dropping the half-received message.
                        tracing::trace!("receive loop: data frame would block, retrying");
                    }
                    Err(e) => bail!(ErrorKind::ZmqReceiveError(e.to_string(), "data".into())),
                }
            } else {
                let response = Response {
                    metadata: Vec::new(),
                    data: metadata.clone(),
                };
                counters.record(response.data.len());
                return Ok(response);
            }
        }
        if t0.elapsed() >= timeout {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }
    bail!(ErrorKind::ReceiveTimeoutExpired(timeout.as_millis() as u64))
}
