//! HttpBroker against an in-process relay

use std::net::TcpListener;
use wargame_broker::HttpBroker;
use wargame_core::{BrokerError, BrokerMove, Coord, Move, MoveBroker};

/// Start the relay on its own thread and runtime; returns its URL
fn spawn_relay() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            wargame_broker::serve(listener).await.unwrap();
        });
    });

    format!("http://{}/", addr)
}

fn sample(turn: u32) -> BrokerMove {
    BrokerMove::new(Move::new(Coord::new(1, 1), Coord::new(1, 2)), turn)
}

#[test]
fn test_submit_then_poll() {
    let url = spawn_relay();
    let mut broker = HttpBroker::new(url.as_str()).unwrap();

    // The listener is bound before the thread starts, so requests queue
    assert_eq!(broker.poll().unwrap(), None);

    broker.submit(&sample(2)).unwrap();
    assert_eq!(broker.poll().unwrap(), Some(sample(2)));

    // A second client sees the same slot
    let mut peer = HttpBroker::new(url).unwrap();
    assert_eq!(peer.poll().unwrap(), Some(sample(2)));
    peer.submit(&sample(3)).unwrap();
    assert_eq!(broker.poll().unwrap().map(|mv| mv.turn), Some(3));
}

#[test]
fn test_unreachable_relay_is_transport_error() {
    // Bind then drop to get a port nobody listens on
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let mut broker = HttpBroker::new(format!("http://127.0.0.1:{}/", port)).unwrap();

    let err = broker.poll().unwrap_err();
    assert!(matches!(err, BrokerError::Transport(_)));
}

#[test]
fn test_wrong_route_is_status_error() {
    let url = spawn_relay();
    let mut broker = HttpBroker::new(format!("{}missing", url)).unwrap();

    match broker.submit(&sample(1)) {
        Err(BrokerError::Status(code)) => assert_eq!(code, 404),
        other => panic!("expected status error, got {:?}", other),
    }
}
