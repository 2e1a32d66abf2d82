//! Wire protocol shared by the server and client halves: a RESP2-style
//! array-of-bulk-strings framing, grounded in `hkv-client`'s hand-rolled
//! encoder/parser rather than pulling in a serialization crate: this
//! workspace already reaches for a dependency-free wire format when the
//! payload is just bytes in, bytes out.

use std::io::{BufRead, Write};

use crate::error::{PeerTransportError, TransportResult};

/// One parsed wire value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    /// `+OK` style.
    Simple(Vec<u8>),
    /// `-ERR ...` style.
    Error(Vec<u8>),
    /// `$...` bulk string, `None` for the null bulk string.
    Bulk(Option<Vec<u8>>),
    /// `*...` array of values; only used to frame commands.
    Array(Vec<WireValue>),
}

/// Encodes a command as a RESP2 array of bulk strings.
pub fn encode_command(args: &[&[u8]], out: &mut Vec<u8>) {
    out.push(b'*');
    push_usize(out, args.len());
    out.extend_from_slice(b"\r\n");
    for arg in args {
        out.push(b'$');
        push_usize(out, arg.len());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(arg);
        out.extend_from_slice(b"\r\n");
    }
}

/// Encodes a successful bulk-string reply.
pub fn encode_bulk(data: &[u8], out: &mut Vec<u8>) {
    out.push(b'$');
    push_usize(out, data.len());
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
}

/// Encodes an error reply.
pub fn encode_error(message: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(b"-ERR ");
    out.extend_from_slice(message.as_bytes());
    out.extend_from_slice(b"\r\n");
}

/// Reads one value from a buffered reader.
pub fn read_value<R: BufRead>(reader: &mut R, line_buf: &mut Vec<u8>) -> TransportResult<WireValue> {
    read_line(reader, line_buf)?;
    if line_buf.is_empty() {
        return Err(PeerTransportError::Protocol);
    }
    match line_buf[0] {
        b'+' => Ok(WireValue::Simple(line_buf[1..].to_vec())),
        b'-' => Ok(WireValue::Error(line_buf[1..].to_vec())),
        b'$' => {
            let len = parse_i64(&line_buf[1..])?;
            read_bulk(reader, len)
        }
        b'*' => {
            let len = parse_i64(&line_buf[1..])?;
            read_array(reader, len, line_buf)
        }
        _ => Err(PeerTransportError::Protocol),
    }
}

fn read_bulk<R: BufRead>(reader: &mut R, len: i64) -> TransportResult<WireValue> {
    if len < 0 {
        return Ok(WireValue::Bulk(None));
    }
    let mut data = vec![0u8; len as usize];
    reader.read_exact(&mut data)?;
    let mut crlf = [0u8; 2];
    reader.read_exact(&mut crlf)?;
    if crlf != [b'\r', b'\n'] {
        return Err(PeerTransportError::Protocol);
    }
    Ok(WireValue::Bulk(Some(data)))
}

fn read_array<R: BufRead>(
    reader: &mut R,
    len: i64,
    line_buf: &mut Vec<u8>,
) -> TransportResult<WireValue> {
    if len <= 0 {
        return Ok(WireValue::Array(Vec::new()));
    }
    let mut items = Vec::with_capacity(len as usize);
    for _ in 0..len {
        items.push(read_value(reader, line_buf)?);
    }
    Ok(WireValue::Array(items))
}

fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> TransportResult<()> {
    buf.clear();
    let bytes = reader.read_until(b'\n', buf)?;
    if bytes == 0 {
        return Err(PeerTransportError::ConnectionClosed);
    }
    if buf.len() < 2 || buf[buf.len() - 2] != b'\r' {
        return Err(PeerTransportError::Protocol);
    }
    buf.truncate(buf.len() - 2);
    Ok(())
}

fn parse_i64(data: &[u8]) -> TransportResult<i64> {
    if data.is_empty() {
        return Err(PeerTransportError::Protocol);
    }
    let (negative, digits) = match data[0] {
        b'-' => (true, &data[1..]),
        _ => (false, data),
    };
    let mut value: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(PeerTransportError::Protocol);
        }
        value = value.saturating_mul(10).saturating_add((b - b'0') as i64);
    }
    Ok(if negative { -value } else { value })
}

fn push_usize(out: &mut Vec<u8>, mut value: usize) {
    let mut buf = [0u8; 20];
    let mut len = 0;
    if value == 0 {
        buf[0] = b'0';
        len = 1;
    } else {
        while value > 0 {
            buf[len] = b'0' + (value % 10) as u8;
            value /= 10;
            len += 1;
        }
    }
    for idx in (0..len).rev() {
        out.push(buf[idx]);
    }
}

/// Writes `bytes` and flushes, converting IO errors into the transport's
/// error type.
pub fn write_all_flushed<W: Write>(writer: &mut W, bytes: &[u8]) -> TransportResult<()> {
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}
