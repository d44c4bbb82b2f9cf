#[cfg(feature = "tracing")]
use tracing::{debug, instrument};

use crate::{
    AllocatorPolicy, Error, IdAllocator, Poll, Result, TimeSource, WorkerId,
    generator::{Mutex, TickState, Transition, WorkerSlot},
};

/// A lock-based ID allocator suitable for multi-threaded environments.
///
/// Reading the clock, comparing it with the last tick and publishing the new
/// `(tick, sequence)` pair all happen inside one mutex critical section.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Fair access across threads (with `parking-lot`)
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access across threads is important
/// - Your target doesn't support 64-bit atomics
///
/// ## See Also
/// - [`AtomicAllocator`]
///
/// [`AtomicAllocator`]: crate::AtomicAllocator
pub struct LockAllocator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<TickState>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<TickState>,
    worker: WorkerSlot,
    policy: AllocatorPolicy,
    time: T,
}

impl<T> LockAllocator<T>
where
    T: TimeSource,
{
    /// Creates a new [`LockAllocator`] with the default [`AllocatorPolicy`].
    ///
    /// # Parameters
    ///
    /// - `worker_id`: The worker (shard) identifier encoded into every ID.
    /// - `time`: A [`TimeSource`] implementation (e.g., [`MonotonicClock`])
    ///   that supplies timestamps.
    ///
    /// # Example
    /// ```
    /// use suavis::{IdAllocator, LockAllocator, MonotonicClock, WorkerId};
    ///
    /// let allocator = LockAllocator::new(WorkerId::new(2).unwrap(), MonotonicClock::default());
    /// let id = allocator.next_id().unwrap();
    /// assert_eq!(id.worker_id(), 2);
    /// ```
    ///
    /// [`MonotonicClock`]: crate::MonotonicClock
    pub fn new(worker_id: WorkerId, time: T) -> Self {
        Self::with_policy(worker_id, time, AllocatorPolicy::default())
    }

    /// Creates a new [`LockAllocator`] with an explicit policy.
    pub fn with_policy(worker_id: WorkerId, time: T, policy: AllocatorPolicy) -> Self {
        Self::from_state(TickState::UNSET, worker_id, time, policy)
    }

    /// Creates an allocator that resumes after an already issued
    /// `(timestamp, sequence)` pair.
    ///
    /// In typical use cases, you should prefer [`Self::new`].
    pub fn from_components(timestamp: u64, worker_id: WorkerId, sequence: u64, time: T) -> Self {
        Self::from_state(
            TickState::new(timestamp, sequence),
            worker_id,
            time,
            AllocatorPolicy::default(),
        )
    }

    fn from_state(state: TickState, worker_id: WorkerId, time: T, policy: AllocatorPolicy) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(state)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(state),
            worker: WorkerSlot::new(worker_id),
            policy,
            time,
        }
    }

    /// Attempts to issue the next ID without waiting.
    ///
    /// The clock is read while the lock is held, so the comparison always
    /// sees the latest published tick.
    ///
    /// # Returns
    /// - `Ok(Poll::Ready { id })`: A new ID is available
    /// - `Ok(Poll::Pending { yield_for })`: the tick is exhausted
    /// - `Ok(Poll::ClockBehind { delta })`: the clock regressed
    ///
    /// # Errors
    /// - [`Error::TimestampOverflow`] if the clock is past
    ///   [`SnowflakeId::max_timestamp`]
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (not with `parking-lot`)
    ///
    /// [`SnowflakeId::max_timestamp`]: crate::SnowflakeId::max_timestamp
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        let now = self.time.current_millis();
        match state.advance(now) {
            Transition::Issue(next) => {
                *state = next;
                Ok(Poll::Ready {
                    id: next.compose(self.worker.load()),
                })
            }
            Transition::Exhausted => Ok(Poll::Pending { yield_for: 1 }),
            Transition::Behind { delta } => Ok(Self::cold_clock_behind(delta)),
            Transition::Overflow { millis } => Err(Error::TimestampOverflow { millis }),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(delta: u64) -> Poll {
        debug_assert!(delta > 0);
        Poll::ClockBehind { delta }
    }
}

impl<T> Default for LockAllocator<T>
where
    T: TimeSource + Default,
{
    /// Worker id 0, default policy and a default clock.
    fn default() -> Self {
        Self::new(WorkerId::default(), T::default())
    }
}

impl<T> IdAllocator for LockAllocator<T>
where
    T: TimeSource,
{
    fn configure(&self, worker_id: i64) -> Result<()> {
        let worker_id = WorkerId::new(worker_id)?;
        self.worker.store(worker_id);
        #[cfg(feature = "tracing")]
        debug!(%worker_id, "lock allocator configured");
        Ok(())
    }

    fn worker_id(&self) -> WorkerId {
        self.worker.load()
    }

    fn policy(&self) -> AllocatorPolicy {
        self.policy
    }

    fn try_poll_id(&self) -> Result<Poll> {
        self.try_poll_id()
    }
}
