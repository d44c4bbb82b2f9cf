use core::{future::Future, time::Duration};

use super::SleepProvider;
use crate::{
    IdAllocator, Result, SnowflakeId,
    generator::{Backoff, PolicyDriver},
};

/// Extension trait for awaiting Snowflake IDs instead of blocking a thread.
///
/// The allocator's [`AllocatorPolicy`] is applied exactly as in
/// [`IdAllocator::next_id`], but every wait is an `S::sleep_for(..).await`.
/// Dropping the future abandons the wait; no sequence value is consumed
/// until an ID is actually returned.
///
/// [`AllocatorPolicy`]: crate::AllocatorPolicy
pub trait IdAllocatorAsyncExt {
    /// Returns a future that resolves to the next available ID.
    ///
    /// # Errors
    ///
    /// Resolves to the same errors as [`IdAllocator::next_id`].
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>>
    where
        S: SleepProvider;
}

impl<A> IdAllocatorAsyncExt for A
where
    A: IdAllocator + Sync + ?Sized,
{
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>>
    where
        S: SleepProvider,
    {
        async move {
            let mut driver = PolicyDriver::new(self.policy());
            loop {
                let dur = match driver.step(self.try_poll_id()?)? {
                    Backoff::Ready(id) => return Ok(id),
                    Backoff::Retry => Duration::ZERO,
                    Backoff::Yield { millis } | Backoff::Sleep { millis } => {
                        Duration::from_millis(millis)
                    }
                };
                S::sleep_for(dur).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        pin::Pin,
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        task::{Context, Poll, Waker},
    };

    use super::*;
    use crate::{
        AllocatorPolicy, AtomicAllocator, Error, LockAllocator, TimeSource, WorkerId,
    };

    /// A clock the sleep provider moves forward, so waits complete instantly.
    #[derive(Clone, Default)]
    struct SharedTime(Arc<AtomicU64>);

    impl TimeSource for SharedTime {
        fn current_millis(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    static CLOCK: AtomicU64 = AtomicU64::new(0);

    struct StaticTime;

    impl TimeSource for StaticTime {
        fn current_millis(&self) -> u64 {
            CLOCK.load(Ordering::SeqCst)
        }
    }

    /// Advances [`CLOCK`] by the requested duration and completes at once.
    struct AdvanceClock;

    impl SleepProvider for AdvanceClock {
        type Sleep = core::future::Ready<()>;

        fn sleep_for(dur: Duration) -> Self::Sleep {
            CLOCK.fetch_add(dur.as_millis() as u64, Ordering::SeqCst);
            core::future::ready(())
        }
    }

    fn block_on<F: Future>(fut: F) -> F::Output {
        let mut fut = core::pin::pin!(fut);
        let mut cx = Context::from_waker(Waker::noop());
        loop {
            if let Poll::Ready(out) = Pin::as_mut(&mut fut).poll(&mut cx) {
                return out;
            }
        }
    }

    #[test]
    fn exhaustion_waits_through_the_sleep_provider() {
        CLOCK.store(42, Ordering::SeqCst);
        let allocator = LockAllocator::new(WorkerId::default(), StaticTime);
        for _ in 0..=SnowflakeId::max_sequence() {
            block_on(allocator.try_next_id_async::<AdvanceClock>()).unwrap();
        }

        let id = block_on(allocator.try_next_id_async::<AdvanceClock>()).unwrap();
        assert_eq!(id.timestamp(), 43);
        assert_eq!(id.sequence(), 0);
    }

    #[test]
    fn non_blocking_policy_fails_fast() {
        let time = SharedTime::default();
        time.0.store(7, Ordering::SeqCst);
        let allocator =
            AtomicAllocator::with_policy(WorkerId::default(), time, AllocatorPolicy::non_blocking());
        for _ in 0..=SnowflakeId::max_sequence() {
            block_on(allocator.try_next_id_async::<AdvanceClock>()).unwrap();
        }
        assert_eq!(
            block_on(allocator.try_next_id_async::<AdvanceClock>()),
            Err(Error::SequenceExhausted)
        );
    }
}
