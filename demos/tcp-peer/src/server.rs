//! Accept loop and command dispatch, grounded in `hkv-server::server`'s
//! `handle_connection`/`dispatch_command` split. Uses synchronous std
//! sockets here rather than tokio, since `meshcache_common::PeerGetter::fetch`
//! is itself a blocking call.

use std::io::BufReader;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use meshcache_common::CacheError;
use meshcache_group::Registry;
use tracing::{debug, warn};

use crate::error::{PeerTransportError, TransportResult};
use crate::protocol::{encode_bulk, encode_error, read_value, write_all_flushed, WireValue};

/// Serves FETCH requests for every group registered in `registry`.
pub struct PeerServer {
    registry: Arc<Registry>,
}

impl PeerServer {
    pub fn new(registry: Arc<Registry>) -> Self {
        PeerServer { registry }
    }

    /// Binds `addr` and serves connections until the listener errors.
    /// Each connection is handled on its own thread, mirroring the
    /// one-thread-per-connection model the workspace's synchronous
    /// client pool already assumes on the other end of the wire.
    pub fn serve(self, addr: &str) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr)?;
        self.serve_listener(listener)
    }

    /// Same as [`serve`](Self::serve), but takes an already-bound
    /// listener. Lets callers (tests) bind on an ephemeral port and learn
    /// its address before the accept loop starts.
    pub fn serve_listener(self, listener: TcpListener) -> std::io::Result<()> {
        let registry = self.registry;
        for stream in listener.incoming() {
            let stream = stream?;
            let registry = registry.clone();
            thread::spawn(move || {
                if let Err(err) = handle_connection(stream, &registry) {
                    warn!(%err, "peer connection ended with an error");
                }
            });
        }
        Ok(())
    }
}

fn handle_connection(stream: TcpStream, registry: &Registry) -> TransportResult<()> {
    stream.set_nodelay(true)?;
    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);
    let mut line_buf = Vec::with_capacity(128);

    loop {
        let value = match read_value(&mut reader, &mut line_buf) {
            Ok(value) => value,
            Err(PeerTransportError::ConnectionClosed) => return Ok(()),
            Err(err) => return Err(err),
        };
        let mut out = Vec::with_capacity(64);
        dispatch(&value, registry, &mut out);
        write_all_flushed(&mut writer, &out)?;
    }
}

fn dispatch(value: &WireValue, registry: &Registry, out: &mut Vec<u8>) {
    let WireValue::Array(args) = value else {
        return encode_error("expected command array", out);
    };
    let bulk_args: Option<Vec<&[u8]>> = args
        .iter()
        .map(|v| match v {
            WireValue::Bulk(Some(bytes)) => Some(bytes.as_slice()),
            _ => None,
        })
        .collect();
    let Some(bulk_args) = bulk_args else {
        return encode_error("command arguments must be bulk strings", out);
    };

    match bulk_args.as_slice() {
        [cmd, group, key] if cmd.eq_ignore_ascii_case(b"FETCH") => {
            handle_fetch(registry, group, key, out)
        }
        [cmd, ..] => encode_error(
            &format!("unknown command: {}", String::from_utf8_lossy(cmd)),
            out,
        ),
        [] => encode_error("empty command", out),
    }
}

fn handle_fetch(registry: &Registry, group_bytes: &[u8], key_bytes: &[u8], out: &mut Vec<u8>) {
    let group_name = String::from_utf8_lossy(group_bytes);
    let key = String::from_utf8_lossy(key_bytes);

    let Some(group) = registry.get(&group_name) else {
        return encode_error(&format!("unknown group: {group_name}"), out);
    };

    match group.get(&key) {
        Ok(view) => {
            debug!(group = %group_name, %key, "served peer fetch");
            encode_bulk(&view.as_bytes(), out)
        }
        Err(CacheError::InvalidArgument(message)) => encode_error(&message, out),
        Err(err) => encode_error(&err.to_string(), out),
    }
}
