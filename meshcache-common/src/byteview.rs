//! Immutable, length-bounded view of a cached payload.

use std::fmt;

/// An owned, read-only byte payload.
///
/// `ByteView` is the value type stored by every cache shard. It owns its
/// bytes and is never mutated after construction; any API that hands bytes
/// back to a caller returns a fresh copy so the cached original can't be
/// corrupted by an external mutation.
#[derive(Clone, Eq)]
pub struct ByteView {
    bytes: Box<[u8]>,
}

impl ByteView {
    /// Builds a view by copying `data`.
    pub fn new(data: impl AsRef<[u8]>) -> Self {
        ByteView {
            bytes: data.as_ref().to_vec().into_boxed_slice(),
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a fresh copy of the payload.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Returns a fresh `String` copy, lossily converting invalid UTF-8.
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Borrows the payload without copying.
    ///
    /// Intended for store internals (size accounting, equality checks);
    /// callers outside the cache should prefer `as_bytes`.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl PartialEq for ByteView {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView").field("len", &self.len()).finish()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        ByteView {
            bytes: data.into_boxed_slice(),
        }
    }
}

impl From<&str> for ByteView {
    fn from(data: &str) -> Self {
        ByteView::new(data.as_bytes())
    }
}

impl From<String> for ByteView {
    fn from(data: String) -> Self {
        ByteView::from(data.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_bytes() {
        let view = ByteView::new(b"hello");
        assert_eq!(view.len(), 5);
        assert_eq!(view.as_bytes(), b"hello".to_vec());
    }

    #[test]
    fn export_is_a_fresh_copy() {
        let view = ByteView::new(b"hello");
        let mut copy = view.as_bytes();
        copy[0] = b'H';
        assert_eq!(view.as_bytes(), b"hello".to_vec());
    }

    #[test]
    fn equality_is_by_contents() {
        assert_eq!(ByteView::new(b"a"), ByteView::new(b"a"));
        assert_ne!(ByteView::new(b"a"), ByteView::new(b"b"));
    }
}
