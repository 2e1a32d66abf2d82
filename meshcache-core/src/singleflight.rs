//! Request coalescer: at most one in-flight load per key (spec §4.F).
//!
//! Grounded in `geecache/core/singleflight.go`'s `RequestGroup`: a guarded
//! map from key to an in-flight call record, with waiters blocking on a
//! barrier that the executor trips once before removing the record.
//! `sync.WaitGroup` becomes a `parking_lot::Condvar` pair here since Rust
//! has no zero-to-one-shot waitgroup in the standard toolbox.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use meshcache_common::{ByteView, CacheError, CacheResult};

struct Call {
    done: Mutex<bool>,
    condvar: Condvar,
    outcome: Mutex<Option<CacheResult<ByteView>>>,
}

impl Call {
    fn new() -> Self {
        Call {
            done: Mutex::new(false),
            condvar: Condvar::new(),
            outcome: Mutex::new(None),
        }
    }

    fn wait(&self) -> CacheResult<ByteView> {
        let mut done = self.done.lock();
        while !*done {
            self.condvar.wait(&mut done);
        }
        self.outcome
            .lock()
            .clone()
            .expect("call outcome set before barrier trips")
    }

    fn finish(&self, outcome: CacheResult<ByteView>) {
        *self.outcome.lock() = Some(outcome);
        *self.done.lock() = true;
        self.condvar.notify_all();
    }
}

/// At-most-one in-flight loader per key, with result fan-out to all
/// concurrent callers.
#[derive(Default)]
pub struct Coalescer {
    calls: Mutex<HashMap<String, Arc<Call>>>,
}

impl Coalescer {
    pub fn new() -> Self {
        Coalescer {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `load` at most once for `key` among concurrent callers.
    ///
    /// A caller that finds a record already in flight waits on its
    /// barrier and returns the same outcome, without running `load`.
    /// A call arriving after the record has been removed starts a fresh
    /// execution: this layer caches nothing, that's the store's job.
    pub fn do_call<F>(&self, key: &str, load: F) -> CacheResult<ByteView>
    where
        F: FnOnce() -> CacheResult<ByteView>,
    {
        let call = {
            let mut calls = self.calls.lock();
            if let Some(existing) = calls.get(key) {
                let existing = existing.clone();
                drop(calls);
                return existing.wait();
            }
            let call = Arc::new(Call::new());
            calls.insert(key.to_string(), call.clone());
            call
        };

        let outcome = match catch_unwind(AssertUnwindSafe(load)) {
            Ok(outcome) => outcome,
            Err(_) => Err(CacheError::origin_failure(format!(
                "loader panicked while fetching key {key:?}"
            ))),
        };

        call.finish(outcome.clone());
        self.calls.lock().remove(key);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn property7_coalesces_concurrent_loads() {
        let coalescer = Arc::new(Coalescer::new());
        let call_count = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let coalescer = coalescer.clone();
            let call_count = call_count.clone();
            handles.push(thread::spawn(move || {
                coalescer.do_call("k", || {
                    call_count.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(50));
                    Ok(ByteView::new(b"value"))
                })
            }));
        }

        for handle in handles {
            let outcome = handle.join().unwrap();
            assert_eq!(outcome.unwrap(), ByteView::new(b"value"));
        }
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fresh_call_after_removal_reexecutes() {
        let coalescer = Coalescer::new();
        let count = AtomicUsize::new(0);

        coalescer
            .do_call("k", || {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(ByteView::new(b"1"))
            })
            .unwrap();
        coalescer
            .do_call("k", || {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(ByteView::new(b"2"))
            })
            .unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn panicking_loader_surfaces_as_error_and_clears_record() {
        let coalescer = Coalescer::new();
        let result = coalescer.do_call("k", || -> CacheResult<ByteView> {
            panic!("boom");
        });
        assert!(result.is_err());
        // Record must be gone: a subsequent call runs fresh, not hangs.
        let result = coalescer.do_call("k", || Ok(ByteView::new(b"ok")));
        assert!(result.is_ok());
    }

    #[test]
    fn waiters_all_observe_same_error() {
        let coalescer = Arc::new(Coalescer::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let coalescer = coalescer.clone();
            handles.push(thread::spawn(move || {
                coalescer.do_call("k", || {
                    thread::sleep(Duration::from_millis(30));
                    Err(CacheError::origin_failure("boom"))
                })
            }));
        }
        for handle in handles {
            let outcome = handle.join().unwrap();
            assert!(matches!(outcome, Err(CacheError::OriginFailure(_))));
        }
    }
}
