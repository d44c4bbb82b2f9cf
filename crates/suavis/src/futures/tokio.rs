use core::{future::Future, pin::Pin, time::Duration};

use super::{IdAllocatorAsyncExt, SleepProvider};
use crate::{IdAllocator, Result, SnowflakeId};

/// A [`SleepProvider`] backed by Tokio's timer.
///
/// This is the default provider for async applications built on Tokio.
pub struct TokioSleep;

impl SleepProvider for TokioSleep {
    type Sleep = tokio::time::Sleep;

    fn sleep_for(dur: Duration) -> Self::Sleep {
        tokio::time::sleep(dur)
    }
}

/// A [`SleepProvider`] that yields to the Tokio scheduler instead of arming a
/// timer.
///
/// Waiting tasks are polled again as soon as the scheduler gets to them, which
/// keeps latency low when few tasks contend for one allocator. Under heavy
/// contention the tighter polling loop burns more CPU than [`TokioSleep`].
pub struct TokioYield;

impl SleepProvider for TokioYield {
    /// `yield_now()` returns a private future type, hence the box.
    type Sleep = Pin<Box<dyn Future<Output = ()> + Send>>;

    fn sleep_for(_dur: Duration) -> Self::Sleep {
        Box::pin(tokio::task::yield_now())
    }
}

/// Extension trait for awaiting IDs on the
/// [`tokio`](https://docs.rs/tokio) runtime without naming a
/// [`SleepProvider`].
pub trait IdAllocatorAsyncTokioExt {
    /// Returns a future that resolves to the next available ID, waiting with
    /// [`TokioSleep`].
    ///
    /// # Errors
    ///
    /// Resolves to the same errors as [`IdAllocator::next_id`].
    fn next_id_async(&self) -> impl Future<Output = Result<SnowflakeId>>;
}

impl<A> IdAllocatorAsyncTokioExt for A
where
    A: IdAllocator + Sync + ?Sized,
{
    fn next_id_async(&self) -> impl Future<Output = Result<SnowflakeId>> {
        <Self as IdAllocatorAsyncExt>::try_next_id_async::<TokioSleep>(self)
    }
}
