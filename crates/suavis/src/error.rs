use crate::WorkerId;

/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `suavis` can emit.
///
/// Every failure is surfaced to the immediate caller. The allocator never maps
/// an error to a sentinel identifier and never issues a duplicate or
/// out-of-range value to avoid one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested worker id is outside `[0, WorkerId::MAX]`.
    ///
    /// Fatal to the configuration call only; configuration may be retried with
    /// a valid value.
    #[error("worker id {worker_id} is outside the valid range [0, {}]", WorkerId::MAX)]
    Configuration {
        /// The rejected value, as supplied by the caller.
        worker_id: i64,
    },

    /// The clock reported a time earlier than the last issued tick.
    ///
    /// Carries the regression in milliseconds. The caller may retry after that
    /// delay, or construct the allocator with
    /// [`ClockRegressionPolicy::WaitUpTo`].
    ///
    /// [`ClockRegressionPolicy::WaitUpTo`]: crate::ClockRegressionPolicy::WaitUpTo
    #[error("clock regression detected: Δ={0}")]
    ClockRegression(u64),

    /// All sequence values for the current tick have been issued.
    ///
    /// Only returned under [`ExhaustionPolicy::Fail`]. Retrying once the clock
    /// has advanced succeeds.
    ///
    /// [`ExhaustionPolicy::Fail`]: crate::ExhaustionPolicy::Fail
    #[error("sequence space exhausted for the current tick")]
    SequenceExhausted,

    /// The clock reading is past the largest timestamp a non-negative
    /// identifier can carry.
    #[error("timestamp {millis}ms exceeds the maximum of {}ms", crate::SnowflakeId::max_timestamp())]
    TimestampOverflow {
        /// The clock reading that could not be encoded.
        millis: u64,
    },

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("allocator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
