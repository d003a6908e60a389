use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use ipm::{CallbackPump, Config, Receiver, Sender, SubscribeOps};

fn unique_inproc(name: &str) -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    format!("inproc://{}-{}", name, COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Surfaces the send/receive-loop trace logs on `RUST_LOG=trace` when these
/// scenarios are run directly; harmless to call more than once per process.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn push_pull_echo() {
    init_tracing();
    let addr = unique_inproc("push-pull-echo");
    let mut receiver = ipm::zmq_transport::ZmqReceiver::new().unwrap();
    let endpoint = receiver
        .connect_for_receives(&Config::with_connection_string(&addr))
        .unwrap();

    let mut sender = ipm::zmq_transport::ZmqSender::new().unwrap();
    sender
        .connect_for_sends(&Config::with_connection_string(&endpoint))
        .unwrap();

    let payload = b"TEST";
    sender
        .send(Some(payload), payload.len(), Duration::from_millis(500), "", false)
        .unwrap();

    let response = receiver
        .receive(Duration::from_millis(500), None, false)
        .unwrap();
    assert_eq!(response.data, payload);
    assert_eq!(response.data.len(), 4);
}

#[test]
fn receive_times_out_with_no_sender() {
    init_tracing();
    let mut receiver = ipm::zmq_transport::ZmqReceiver::new().unwrap();
    receiver
        .connect_for_receives(&Config::with_connection_string(unique_inproc("no-sender")))
        .unwrap();

    let timeout = Duration::from_millis(100);
    let t0 = Instant::now();
    let result = receiver.receive(timeout, None, false);
    let elapsed = t0.elapsed();

    assert!(result.is_err());
    assert!(result.unwrap_err().is_timeout());
    assert!(elapsed >= timeout);
}

#[test]
fn topic_filtering_and_unsubscribe() {
    init_tracing();
    let addr = unique_inproc("topic-filter");
    let mut publisher = ipm::zmq_transport::ZmqPublisher::new().unwrap();
    let endpoint = publisher
        .connect_for_sends(&Config::with_connection_string(&addr))
        .unwrap();

    let mut subscriber = ipm::zmq_transport::ZmqSubscriber::new().unwrap();
    subscriber
        .connect_for_receives(&Config::with_connection_string(&endpoint))
        .unwrap();
    subscriber.subscribe("testTopic").unwrap();

    // give the SUB connection time to register before the first publish
    std::thread::sleep(Duration::from_millis(100));

    let payload = b"TEST";
    publisher
        .send(
            Some(payload),
            payload.len(),
            Duration::from_millis(500),
            "ignoredTopic",
            false,
        )
        .unwrap();
    let missed = subscriber.receive(Duration::from_millis(100), None, false);
    assert!(missed.is_err());
    assert!(missed.unwrap_err().is_timeout());

    publisher
        .send(
            Some(payload),
            payload.len(),
            Duration::from_millis(500),
            "testTopic",
            false,
        )
        .unwrap();
    let received = subscriber
        .receive(Duration::from_millis(500), None, false)
        .unwrap();
    assert_eq!(received.data, payload);

    subscriber.unsubscribe("testTopic").unwrap();
    std::thread::sleep(Duration::from_millis(100));
    publisher
        .send(
            Some(payload),
            payload.len(),
            Duration::from_millis(500),
            "testTopic",
            false,
        )
        .unwrap();
    let after_unsubscribe = subscriber.receive(Duration::from_millis(500), None, false);
    assert!(after_unsubscribe.is_err());
    assert!(after_unsubscribe.unwrap_err().is_timeout());
}

#[test]
fn callback_pump_delivers_until_cleared() {
    init_tracing();
    let addr = unique_inproc("callback");
    let mut receiver = ipm::zmq_transport::ZmqReceiver::new().unwrap();
    let endpoint = receiver
        .connect_for_receives(&Config::with_connection_string(&addr))
        .unwrap();

    let pump = CallbackPump::new();
    let (tx, rx) = mpsc::channel();
    pump.set_callback(Some(Arc::new(move |response: ipm::Response| {
        tx.send(response.data).unwrap();
    })));
    pump.set_receiver(Some(Arc::new(receiver)));

    let mut sender = ipm::zmq_transport::ZmqSender::new().unwrap();
    sender
        .connect_for_sends(&Config::with_connection_string(&endpoint))
        .unwrap();

    let payload = b"TEST";
    sender
        .send(Some(payload), payload.len(), Duration::from_millis(500), "", false)
        .unwrap();
    let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(first, payload);

    pump.clear_callback();
    sender
        .send(Some(payload), payload.len(), Duration::from_millis(500), "", false)
        .unwrap();
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn multi_publisher_subscribe() {
    init_tracing();
    let addr_a = unique_inproc("multi-pub-a");
    let addr_b = unique_inproc("multi-pub-b");

    let mut pub_a = ipm::zmq_transport::ZmqPublisher::new().unwrap();
    let endpoint_a = pub_a
        .connect_for_sends(&Config::with_connection_string(&addr_a))
        .unwrap();
    let mut pub_b = ipm::zmq_transport::ZmqPublisher::new().unwrap();
    let endpoint_b = pub_b
        .connect_for_sends(&Config::with_connection_string(&addr_b))
        .unwrap();

    let mut subscriber = ipm::zmq_transport::ZmqSubscriber::new().unwrap();
    subscriber
        .connect_for_receives(&Config::with_connection_strings([endpoint_a, endpoint_b]))
        .unwrap();
    subscriber.subscribe("testTopic").unwrap();
    std::thread::sleep(Duration::from_millis(100));

    let payload = b"TEST";
    pub_a
        .send(
            Some(payload),
            payload.len(),
            Duration::from_millis(500),
            "testTopic",
            false,
        )
        .unwrap();
    let from_a = subscriber
        .receive(Duration::from_millis(500), None, false)
        .unwrap();
    assert_eq!(from_a.data, payload);

    pub_b
        .send(
            Some(payload),
            payload.len(),
            Duration::from_millis(500),
            "testTopic",
            false,
        )
        .unwrap();
    let from_b = subscriber
        .receive(Duration::from_millis(500), None, false)
        .unwrap();
    assert_eq!(from_b.data, payload);
}

#[test]
fn send_rejects_null_buffer_with_nonzero_length() {
    init_tracing();
    let mut sender = ipm::zmq_transport::ZmqSender::new().unwrap();
    sender
        .connect_for_sends(&Config::with_connection_string(unique_inproc("null-guard")))
        .unwrap();
    let result = sender.send(None, 4, Duration::from_millis(100), "", false);
    assert!(result.is_err());
}

#[test]
fn send_zero_length_is_a_no_op() {
    init_tracing();
    let mut sender = ipm::zmq_transport::ZmqSender::new().unwrap();
    sender
        .connect_for_sends(&Config::with_connection_string(unique_inproc("zero-len")))
        .unwrap();
    let result = sender.send(None, 0, Duration::from_millis(100), "", false);
    assert!(result.unwrap());
}

#[test]
fn receive_validates_expected_size() {
    init_tracing();
    let addr = unique_inproc("size-check");
    let mut receiver = ipm::zmq_transport::ZmqReceiver::new().unwrap();
    let endpoint = receiver
        .connect_for_receives(&Config::with_connection_string(&addr))
        .unwrap();
    let mut sender = ipm::zmq_transport::ZmqSender::new().unwrap();
    sender
        .connect_for_sends(&Config::with_connection_string(&endpoint))
        .unwrap();
    sender
        .send(Some(b"TEST"), 4, Duration::from_millis(500), "", false)
        .unwrap();

    let result = receiver.receive(Duration::from_millis(500), Some(99), false);
    assert!(result.is_err());
}
