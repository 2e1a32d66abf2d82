//! Round-trips a FETCH over a real TCP socket, the demo's analogue of
//! `hkv-client/tests/client.rs` exercising the sync client against a live
//! server.

use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use meshcache_common::{CacheError, Getter, GetterFn, PeerGetter};
use meshcache_group::{Group, Registry};

use tcp_peer_demo::{PeerServer, TcpPeerGetter};

fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let registry = Arc::new(Registry::new());
    let getter: Arc<dyn Getter> = Arc::new(GetterFn::new(|key: &str| {
        if key == "missing" {
            return Err(CacheError::origin_failure("no such key"));
        }
        Ok(format!("origin:{key}").into_bytes())
    }));
    let group = Group::new("scores", 1 << 16, getter, "lru").unwrap();
    registry.insert(group);

    let server = PeerServer::new(registry);
    thread::spawn(move || {
        server.serve_listener(listener).unwrap();
    });

    addr
}

#[test]
fn fetch_returns_origin_value_over_tcp() {
    let addr = spawn_server();
    let peer = TcpPeerGetter::new(addr);

    let bytes = peer.fetch("scores", "Tom").unwrap();
    assert_eq!(bytes, b"origin:Tom".to_vec());
}

#[test]
fn fetch_unknown_group_is_peer_failure() {
    let addr = spawn_server();
    let peer = TcpPeerGetter::new(addr);

    let err = peer.fetch("no-such-group", "Tom").unwrap_err();
    assert!(matches!(err, CacheError::PeerFailure(_)));
}

#[test]
fn fetch_propagates_origin_error() {
    let addr = spawn_server();
    let peer = TcpPeerGetter::new(addr);

    let err = peer.fetch("scores", "missing").unwrap_err();
    assert!(matches!(err, CacheError::PeerFailure(_)));
}

#[test]
fn pooled_connections_are_reused_across_calls() {
    let addr = spawn_server();
    let peer = TcpPeerGetter::new(addr);

    for i in 0..20 {
        let key = format!("key-{i}");
        let bytes = peer.fetch("scores", &key).unwrap();
        assert_eq!(bytes, format!("origin:{key}").into_bytes());
    }
}
