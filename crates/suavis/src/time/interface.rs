use core::time::Duration;
use std::{boxed::Box, sync::Arc};

/// Default epoch: Wednesday, January 1, 2025 00:00:00 UTC
///
/// Timestamps keep the identifier's sign bit clear until roughly 2094.
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// A trait for time sources that return a monotonic or wall-clock timestamp.
///
/// This abstraction allows you to plug in a real system clock, a monotonic
/// timer, or a mocked time source in tests.
///
/// The unit is **whole milliseconds** relative to the source's epoch. Sources
/// should be monotonic, but the allocator tolerates readings that move
/// backwards (see [`ClockRegressionPolicy`]).
///
/// # Example
///
/// ```
/// use suavis::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
///
/// [`ClockRegressionPolicy`]: crate::ClockRegressionPolicy
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
