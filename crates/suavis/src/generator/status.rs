use crate::SnowflakeId;

/// The outcome of a single, non-blocking allocation attempt.
///
/// Returned by [`IdAllocator::try_poll_id`]. [`IdAllocator::next_id`] turns
/// `Pending` and `ClockBehind` into waits or errors according to the
/// allocator's [`AllocatorPolicy`].
///
/// # Example
///
/// ```
/// use suavis::{AtomicAllocator, IdAllocator, Poll, TimeSource, WorkerId};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1
///     }
/// }
///
/// let allocator = AtomicAllocator::new(WorkerId::default(), FixedTime);
/// match allocator.try_poll_id().unwrap() {
///     Poll::Ready { id } => println!("ID: {id}"),
///     Poll::Pending { yield_for } => println!("Back off for {yield_for}ms"),
///     Poll::ClockBehind { delta } => println!("Clock moved back {delta}ms"),
/// }
/// ```
///
/// [`IdAllocator::try_poll_id`]: crate::IdAllocator::try_poll_id
/// [`IdAllocator::next_id`]: crate::IdAllocator::next_id
/// [`AllocatorPolicy`]: crate::AllocatorPolicy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: SnowflakeId,
    },
    /// No ID was generated, try again after `yield_for` milliseconds.
    ///
    /// `1` means the current tick's sequence space is exhausted. `0` means a
    /// concurrent caller won the race for the same state and the attempt can
    /// be retried immediately.
    Pending {
        /// Milliseconds to wait before retrying.
        yield_for: u64,
    },
    /// The clock reads `delta` milliseconds earlier than the last issued tick.
    ClockBehind {
        /// Size of the regression in milliseconds.
        delta: u64,
    },
}
