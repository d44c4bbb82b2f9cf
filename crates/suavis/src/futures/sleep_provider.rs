use core::{future::Future, time::Duration};

/// Abstracts over how to wait for a given [`Duration`] in async contexts, so
/// the async allocation path stays runtime agnostic.
pub trait SleepProvider {
    /// `Send` so the allocation future can move across worker threads.
    type Sleep: Future<Output = ()> + Send;

    /// Returns a future that completes once `dur` has passed.
    fn sleep_for(dur: Duration) -> Self::Sleep;
}
