use core::time::Duration;

use crate::{
    AllocatorPolicy, Poll, Result, SnowflakeId, WorkerId,
    generator::{Backoff, PolicyDriver},
};

/// A concurrent allocator of unique [`SnowflakeId`]s.
///
/// Implementations are safe to share across threads (behind `&`, an `Arc`, or
/// a `static`) and need no external locking by the caller. For IDs issued by
/// one allocator, a call that returns before another starts always yields a
/// smaller `(timestamp, sequence)` pair; concurrent calls get distinct IDs in
/// an unspecified order.
///
/// The trait is object safe, so an allocator chosen at runtime can be used as
/// `Box<dyn IdAllocator + Send + Sync>`.
pub trait IdAllocator {
    /// Sets the worker id embedded in subsequently issued IDs.
    ///
    /// This is a setup step: call it once, before the allocator is shared.
    /// Calling it while other threads allocate never corrupts the allocator,
    /// but those threads may observe either the old or the new worker id for
    /// an ID issued across the call; ordering that is the caller's
    /// responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `worker_id` is outside
    /// `[0, WorkerId::MAX]`; the previous worker id stays in effect.
    ///
    /// [`Error::Configuration`]: crate::Error::Configuration
    fn configure(&self, worker_id: i64) -> Result<()>;

    /// Returns the worker id currently embedded in issued IDs.
    fn worker_id(&self) -> WorkerId;

    /// Returns the policy [`Self::next_id`] applies.
    fn policy(&self) -> AllocatorPolicy;

    /// Makes one non-blocking allocation attempt.
    ///
    /// # Errors
    ///
    /// - [`Error::TimestampOverflow`] if the clock no longer fits in the
    ///   timestamp field
    /// - [`Error::LockPoisoned`] for a mutex-backed allocator whose lock was
    ///   poisoned
    ///
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    fn try_poll_id(&self) -> Result<Poll>;

    /// Issues the next ID, waiting or failing as the [`AllocatorPolicy`]
    /// dictates.
    ///
    /// The only waits are the bounded ones the policy opts into: yielding
    /// until the next millisecond on sequence exhaustion, and sleeping through
    /// a clock regression within tolerance.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] when the clock moved backward beyond the
    ///   policy's tolerance
    /// - [`Error::SequenceExhausted`] under [`ExhaustionPolicy::Fail`]
    /// - any error from [`Self::try_poll_id`]
    ///
    /// # Example
    ///
    /// ```
    /// use suavis::{AtomicAllocator, IdAllocator, MonotonicClock};
    ///
    /// let allocator = AtomicAllocator::<MonotonicClock>::default();
    /// allocator.configure(3).unwrap();
    ///
    /// let a = allocator.next_id().unwrap();
    /// let b = allocator.next_id().unwrap();
    /// assert!(a < b);
    /// assert_eq!(b.worker_id(), 3);
    /// ```
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    /// [`Error::SequenceExhausted`]: crate::Error::SequenceExhausted
    /// [`ExhaustionPolicy::Fail`]: crate::ExhaustionPolicy::Fail
    fn next_id(&self) -> Result<SnowflakeId> {
        let mut driver = PolicyDriver::new(self.policy());
        loop {
            match driver.step(self.try_poll_id()?)? {
                Backoff::Ready(id) => return Ok(id),
                Backoff::Retry => core::hint::spin_loop(),
                Backoff::Yield { .. } => std::thread::yield_now(),
                Backoff::Sleep { millis } => std::thread::sleep(Duration::from_millis(millis)),
            }
        }
    }
}
