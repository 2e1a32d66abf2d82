//! Bounded connection pool for the peer client, grounded in
//! `hkv-client::pool`'s object-pool pattern: idle connections are handed
//! back out before a new socket is opened, and the pool holds its mutex
//! only long enough to move a connection in or out.

use std::collections::VecDeque;
use std::io::{BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{PeerTransportError, TransportResult};
use crate::protocol::{encode_command, read_value, WireValue};

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub addr: String,
    pub max_idle: usize,
    pub max_total: usize,
    pub connect_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            addr: String::new(),
            max_idle: 4,
            max_total: 16,
            connect_timeout: Some(Duration::from_secs(2)),
        }
    }
}

struct PoolState {
    idle: VecDeque<Connection>,
    total: usize,
}

struct PoolInner {
    config: PoolConfig,
    state: Mutex<PoolState>,
}

#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    pub fn new(config: PoolConfig) -> Self {
        ConnectionPool {
            inner: Arc::new(PoolInner {
                state: Mutex::new(PoolState {
                    idle: VecDeque::with_capacity(config.max_idle),
                    total: 0,
                }),
                config,
            }),
        }
    }

    pub fn acquire(&self) -> TransportResult<PooledConnection> {
        if let Some(conn) = self.pop_idle() {
            return Ok(PooledConnection::new(self.inner.clone(), conn));
        }
        if !self.try_reserve() {
            return Err(PeerTransportError::PoolExhausted);
        }
        match Connection::connect(&self.inner.config) {
            Ok(conn) => Ok(PooledConnection::new(self.inner.clone(), conn)),
            Err(err) => {
                self.release_slot();
                Err(err)
            }
        }
    }

    fn pop_idle(&self) -> Option<Connection> {
        self.inner.state.lock().expect("pool mutex poisoned").idle.pop_front()
    }

    fn try_reserve(&self) -> bool {
        let mut state = self.inner.state.lock().expect("pool mutex poisoned");
        if state.total >= self.inner.config.max_total {
            return false;
        }
        state.total += 1;
        true
    }

    fn release_slot(&self) {
        let mut state = self.inner.state.lock().expect("pool mutex poisoned");
        state.total = state.total.saturating_sub(1);
    }

    fn return_connection(&self, conn: Connection) {
        let mut state = self.inner.state.lock().expect("pool mutex poisoned");
        if state.idle.len() < self.inner.config.max_idle {
            state.idle.push_back(conn);
        } else {
            state.total = state.total.saturating_sub(1);
        }
    }
}

pub struct PooledConnection {
    pool: Arc<PoolInner>,
    conn: Option<Connection>,
    valid: bool,
}

impl PooledConnection {
    fn new(pool: Arc<PoolInner>, conn: Connection) -> Self {
        PooledConnection { pool, conn: Some(conn), valid: true }
    }

    pub fn exec(&mut self, args: &[&[u8]]) -> TransportResult<WireValue> {
        let conn = self.conn.as_mut().expect("connection exists");
        let response = conn.exec(args);
        if response.is_err() {
            self.valid = false;
        }
        response
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else { return };
        let pool = ConnectionPool { inner: self.pool.clone() };
        if self.valid {
            pool.return_connection(conn);
        } else {
            pool.release_slot();
        }
    }
}

struct Connection {
    reader: BufReader<TcpStream>,
    line_buf: Vec<u8>,
    write_buf: Vec<u8>,
}

impl Connection {
    fn connect(config: &PoolConfig) -> TransportResult<Self> {
        let addr: SocketAddr = config
            .addr
            .parse()
            .map_err(|_| PeerTransportError::InvalidAddress)?;
        let stream = match config.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };
        stream.set_nodelay(true)?;
        Ok(Connection {
            reader: BufReader::new(stream),
            line_buf: Vec::with_capacity(128),
            write_buf: Vec::with_capacity(256),
        })
    }

    fn exec(&mut self, args: &[&[u8]]) -> TransportResult<WireValue> {
        self.write_buf.clear();
        encode_command(args, &mut self.write_buf);
        let stream = self.reader.get_mut();
        stream.write_all(&self.write_buf)?;
        stream.flush()?;
        read_value(&mut self.reader, &mut self.line_buf)
    }
}
