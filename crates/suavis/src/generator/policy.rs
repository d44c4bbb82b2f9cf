#[cfg(feature = "tracing")]
use tracing::warn;

use crate::{Error, Poll, Result, SnowflakeId};

/// What an allocator does when every sequence value of the current tick has
/// been issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExhaustionPolicy {
    /// Wait (yielding the thread, or the task in async code) until the clock
    /// reaches the next millisecond, then continue. Throughput is capped at
    /// 4096 IDs per millisecond per worker.
    #[default]
    Block,
    /// Return [`Error::SequenceExhausted`] immediately.
    Fail,
}

/// What an allocator does when the clock reads earlier than the last issued
/// tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClockRegressionPolicy {
    /// Return [`Error::ClockRegression`] carrying the size of the jump.
    #[default]
    Fail,
    /// Wait for the clock to catch up when it is at most this many
    /// milliseconds behind; fail like [`ClockRegressionPolicy::Fail`] beyond
    /// that tolerance.
    WaitUpTo(u64),
}

/// Behaviour of [`IdAllocator::next_id`] when an ID cannot be issued
/// immediately.
///
/// The default blocks on sequence exhaustion and fails on clock regression.
///
/// ```
/// use suavis::{AllocatorPolicy, ClockRegressionPolicy, ExhaustionPolicy};
///
/// let policy = AllocatorPolicy::default()
///     .with_exhaustion(ExhaustionPolicy::Fail)
///     .with_clock_regression(ClockRegressionPolicy::WaitUpTo(5));
/// assert_eq!(policy.exhaustion, ExhaustionPolicy::Fail);
/// ```
///
/// [`IdAllocator::next_id`]: crate::IdAllocator::next_id
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AllocatorPolicy {
    /// Sequence exhaustion handling.
    pub exhaustion: ExhaustionPolicy,
    /// Clock regression handling.
    pub clock_regression: ClockRegressionPolicy,
}

impl AllocatorPolicy {
    /// A policy that never waits: both conditions are reported as errors.
    pub const fn non_blocking() -> Self {
        Self {
            exhaustion: ExhaustionPolicy::Fail,
            clock_regression: ClockRegressionPolicy::Fail,
        }
    }

    /// Replaces the sequence exhaustion handling.
    #[must_use]
    pub const fn with_exhaustion(mut self, exhaustion: ExhaustionPolicy) -> Self {
        self.exhaustion = exhaustion;
        self
    }

    /// Replaces the clock regression handling.
    #[must_use]
    pub const fn with_clock_regression(mut self, clock_regression: ClockRegressionPolicy) -> Self {
        self.clock_regression = clock_regression;
        self
    }
}

/// How a caller should proceed after one allocation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Backoff {
    Ready(SnowflakeId),
    /// Lost a race; retry right away.
    Retry,
    /// Sequence exhausted; yield until the next tick.
    Yield { millis: u64 },
    /// Clock behind, within tolerance; wait for it to catch up.
    Sleep { millis: u64 },
}

/// Applies an [`AllocatorPolicy`] across the attempts of one allocation.
pub(crate) struct PolicyDriver {
    policy: AllocatorPolicy,
    reported_regression: bool,
}

impl PolicyDriver {
    pub(crate) const fn new(policy: AllocatorPolicy) -> Self {
        Self {
            policy,
            reported_regression: false,
        }
    }

    pub(crate) fn step(&mut self, poll: Poll) -> Result<Backoff> {
        match poll {
            Poll::Ready { id } => Ok(Backoff::Ready(id)),
            Poll::Pending { yield_for: 0 } => Ok(Backoff::Retry),
            Poll::Pending { yield_for } => match self.policy.exhaustion {
                ExhaustionPolicy::Block => Ok(Backoff::Yield { millis: yield_for }),
                ExhaustionPolicy::Fail => Err(Error::SequenceExhausted),
            },
            Poll::ClockBehind { delta } => {
                self.report_regression(delta);
                match self.policy.clock_regression {
                    ClockRegressionPolicy::WaitUpTo(max) if delta <= max => {
                        Ok(Backoff::Sleep { millis: delta })
                    }
                    _ => Err(Error::ClockRegression(delta)),
                }
            }
        }
    }

    // Once per allocation, so a catch-up wait doesn't flood the log.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn report_regression(&mut self, delta: u64) {
        if self.reported_regression {
            return;
        }
        self.reported_regression = true;
        #[cfg(feature = "tracing")]
        warn!(delta_ms = delta, "clock regression detected: Δ={delta}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> SnowflakeId {
        SnowflakeId::from_components(1, 2, 3)
    }

    #[test]
    fn ready_and_contention_pass_through() {
        let mut driver = PolicyDriver::new(AllocatorPolicy::non_blocking());
        assert_eq!(
            driver.step(Poll::Ready { id: id() }),
            Ok(Backoff::Ready(id()))
        );
        assert_eq!(
            driver.step(Poll::Pending { yield_for: 0 }),
            Ok(Backoff::Retry)
        );
    }

    #[test]
    fn exhaustion_blocks_by_default() {
        let mut driver = PolicyDriver::new(AllocatorPolicy::default());
        assert_eq!(
            driver.step(Poll::Pending { yield_for: 1 }),
            Ok(Backoff::Yield { millis: 1 })
        );
    }

    #[test]
    fn exhaustion_fails_when_configured() {
        let policy = AllocatorPolicy::default().with_exhaustion(ExhaustionPolicy::Fail);
        let mut driver = PolicyDriver::new(policy);
        assert_eq!(
            driver.step(Poll::Pending { yield_for: 1 }),
            Err(Error::SequenceExhausted)
        );
    }

    #[test]
    fn regression_fails_by_default() {
        let mut driver = PolicyDriver::new(AllocatorPolicy::default());
        assert_eq!(
            driver.step(Poll::ClockBehind { delta: 50 }),
            Err(Error::ClockRegression(50))
        );
    }

    #[test]
    fn regression_waits_within_tolerance_only() {
        let policy =
            AllocatorPolicy::default().with_clock_regression(ClockRegressionPolicy::WaitUpTo(10));
        let mut driver = PolicyDriver::new(policy);
        assert_eq!(
            driver.step(Poll::ClockBehind { delta: 10 }),
            Ok(Backoff::Sleep { millis: 10 })
        );
        assert_eq!(
            driver.step(Poll::ClockBehind { delta: 11 }),
            Err(Error::ClockRegression(11))
        );
    }

    #[cfg(feature = "tracing")]
    mod logging {
        use std::{
            fmt::Debug,
            sync::{Arc, Mutex},
            vec::Vec,
        };

        use tracing::{
            Event, Subscriber,
            field::{Field, Visit},
        };
        use tracing_subscriber::{
            Layer,
            layer::{Context, SubscriberExt},
        };

        use super::*;

        /// Records the message of every event it sees.
        #[derive(Clone, Default)]
        struct CaptureMessages(Arc<Mutex<Vec<String>>>);

        struct MessageVisitor(Option<String>);

        impl Visit for MessageVisitor {
            fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
                if field.name() == "message" {
                    self.0 = Some(format!("{value:?}"));
                }
            }
        }

        impl<S: Subscriber> Layer<S> for CaptureMessages {
            fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
                let mut visitor = MessageVisitor(None);
                event.record(&mut visitor);
                if let Some(message) = visitor.0 {
                    self.0.lock().unwrap().push(message);
                }
            }
        }

        #[test]
        fn regression_is_logged_once_per_allocation() {
            let capture = CaptureMessages::default();
            let subscriber = tracing_subscriber::registry().with(capture.clone());

            tracing::subscriber::with_default(subscriber, || {
                let policy = AllocatorPolicy::default()
                    .with_clock_regression(ClockRegressionPolicy::WaitUpTo(100));

                // One allocation that waits through the same regression twice.
                let mut driver = PolicyDriver::new(policy);
                assert_eq!(
                    driver.step(Poll::ClockBehind { delta: 5 }),
                    Ok(Backoff::Sleep { millis: 5 })
                );
                assert_eq!(
                    driver.step(Poll::ClockBehind { delta: 3 }),
                    Ok(Backoff::Sleep { millis: 3 })
                );

                // The next allocation reports again.
                let mut driver = PolicyDriver::new(policy);
                assert_eq!(
                    driver.step(Poll::ClockBehind { delta: 7 }),
                    Ok(Backoff::Sleep { millis: 7 })
                );
            });

            assert_eq!(
                *capture.0.lock().unwrap(),
                ["clock regression detected: Δ=5", "clock regression detected: Δ=7"]
            );
        }
    }
}
