//! Scoped ownership of driver handles.

use std::ops::{Deref, DerefMut};

use tracing::warn;

use crate::driver::{Closeable, DriverError};

/// RAII wrapper that closes its handle exactly once.
///
/// The handle is closed on drop, including during unwinding, unless it was
/// already closed through [`Scoped::release`]. A failed close on drop is
/// logged and otherwise ignored so it never masks the caller's result.
pub struct Scoped<T: Closeable> {
    handle: T,
    kind: &'static str,
    closed: bool,
}

impl<T: Closeable> Scoped<T> {
    pub fn new(kind: &'static str, handle: T) -> Self {
        Self {
            handle,
            kind,
            closed: false,
        }
    }

    /// Close the handle now and report the outcome.
    pub fn release(mut self) -> Result<(), DriverError> {
        self.closed = true;
        self.handle.close()
    }
}

impl<T: Closeable> Deref for Scoped<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.handle
    }
}

impl<T: Closeable> DerefMut for Scoped<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.handle
    }
}

impl<T: Closeable> Drop for Scoped<T> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.handle.close() {
            warn!(handle = self.kind, error = %err, "failed to release handle");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    struct Counting {
        closes: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Closeable for Counting {
        fn close(&mut self) -> Result<(), DriverError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err("already broken".into());
            }
            Ok(())
        }
    }

    fn counting(fail: bool) -> (Arc<AtomicUsize>, Counting) {
        let closes = Arc::new(AtomicUsize::new(0));
        let handle = Counting {
            closes: closes.clone(),
            fail,
        };
        (closes, handle)
    }

    #[test]
    fn drop_closes_once() {
        let (closes, handle) = counting(false);
        {
            let _scoped = Scoped::new("cursor", handle);
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_does_not_close_again_on_drop() {
        let (closes, handle) = counting(false);
        let scoped = Scoped::new("connection", handle);
        assert!(scoped.release().is_ok());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_close_on_drop_is_swallowed() {
        let (closes, handle) = counting(true);
        drop(Scoped::new("cursor", handle));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_reports_close_failure() {
        let (closes, handle) = counting(true);
        let err = Scoped::new("statement", handle).release();
        assert!(err.is_err());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn closes_during_unwind() {
        let (closes, handle) = counting(false);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _scoped = Scoped::new("connection", handle);
            panic!("extractor blew up");
        }));
        assert!(outcome.is_err());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
