//! Client state containers mirroring the device and preset resources.
//!
//! State sits behind a `std::sync::RwLock` that is only taken between
//! suspension points, so the synchronous optimistic update can run from
//! any context. Every async action races its request against a
//! [`CancellationToken`]; a cancelled action leaves state untouched.

mod device;
mod preset;

pub use device::{DeviceStore, LocalDevice};
pub use preset::PresetStore;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, Result};

/// Counts outstanding actions; `loading` is true while any guard is alive.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    request: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        result = request => result,
    }
}
