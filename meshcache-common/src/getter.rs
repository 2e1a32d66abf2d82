//! Origin data source (spec §6, "Getter").

use crate::error::CacheResult;

/// Loads data for a key from the origin on a cache miss.
///
/// Implementations are user-supplied; a returned error surfaces to the
/// caller unchanged (after any peer fallback has also failed).
pub trait Getter: Send + Sync {
    fn get(&self, key: &str) -> CacheResult<Vec<u8>>;
}

/// Adapts a plain closure into a `Getter`, mirroring Go's
/// `GetterFunc`/"interface-typed function" idiom so callers can pass a
/// closure directly instead of defining a struct.
pub struct GetterFn<F>(F)
where
    F: Fn(&str) -> CacheResult<Vec<u8>> + Send + Sync;

impl<F> GetterFn<F>
where
    F: Fn(&str) -> CacheResult<Vec<u8>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        GetterFn(f)
    }
}

impl<F> Getter for GetterFn<F>
where
    F: Fn(&str) -> CacheResult<Vec<u8>> + Send + Sync,
{
    fn get(&self, key: &str) -> CacheResult<Vec<u8>> {
        (self.0)(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_adapter_forwards_calls() {
        let getter = GetterFn::new(|key: &str| Ok(key.as_bytes().to_vec()));
        assert_eq!(getter.get("hi").unwrap(), b"hi".to_vec());
    }
}
