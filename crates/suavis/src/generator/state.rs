use core::cmp::Ordering;

use portable_atomic::{AtomicU16, Ordering as AtomicOrdering};

use crate::{SnowflakeId, WorkerId};

/// The `(last tick, last sequence)` pair shared by every caller of one
/// allocator, packed into a single word so it is always read and replaced as
/// a unit.
///
/// ```text
///  Bit Index:  63            54 53            12 11             0
///              +---------------+----------------+---------------+
///  Field:      |  unused (10)  |   tick (42)    | sequence (12) |
///              +---------------+----------------+---------------+
/// ```
///
/// [`TickState::UNSET`] (all ones) marks an allocator that has not issued
/// anything yet; it cannot collide with a packed pair because the unused
/// bits of a real pair are zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TickState(u64);

/// What a single allocation attempt should do given the current state and
/// clock reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Publish this state and emit the identifier it describes.
    Issue(TickState),
    /// The tick's sequence space is used up.
    Exhausted,
    /// The clock is `delta` ms behind the last issued tick.
    Behind { delta: u64 },
    /// The clock no longer fits in the timestamp field.
    Overflow { millis: u64 },
}

impl TickState {
    pub(crate) const UNSET: Self = Self(u64::MAX);

    const SEQUENCE_BITS: u32 = SnowflakeId::SEQUENCE_BITS;
    const SEQUENCE_MASK: u64 = SnowflakeId::SEQUENCE_MASK;

    pub(crate) const fn new(tick: u64, sequence: u64) -> Self {
        Self(
            ((tick & SnowflakeId::TIMESTAMP_MASK) << Self::SEQUENCE_BITS)
                | (sequence & Self::SEQUENCE_MASK),
        )
    }

    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub(crate) const fn to_raw(self) -> u64 {
        self.0
    }

    pub(crate) const fn tick(self) -> u64 {
        self.0 >> Self::SEQUENCE_BITS
    }

    pub(crate) const fn sequence(self) -> u64 {
        self.0 & Self::SEQUENCE_MASK
    }

    fn has_sequence_room(self) -> bool {
        self.sequence() < SnowflakeId::max_sequence()
    }

    fn increment_sequence(self) -> Self {
        Self::new(self.tick(), self.sequence() + 1)
    }

    fn rollover_to_timestamp(now: u64) -> Self {
        Self::new(now, 0)
    }

    /// Decides the next state for a clock reading of `now`.
    pub(crate) fn advance(self, now: u64) -> Transition {
        if now > SnowflakeId::max_timestamp() {
            return Transition::Overflow { millis: now };
        }
        if self == Self::UNSET {
            return Transition::Issue(Self::rollover_to_timestamp(now));
        }

        let last = self.tick();
        match now.cmp(&last) {
            Ordering::Equal => {
                if self.has_sequence_room() {
                    Transition::Issue(self.increment_sequence())
                } else {
                    Transition::Exhausted
                }
            }
            Ordering::Greater => Transition::Issue(Self::rollover_to_timestamp(now)),
            Ordering::Less => Transition::Behind { delta: last - now },
        }
    }

    /// Packs this state with `worker_id` into the identifier it describes.
    pub(crate) const fn compose(self, worker_id: WorkerId) -> SnowflakeId {
        SnowflakeId::from_components(self.tick(), worker_id.get() as u64, self.sequence())
    }
}

/// The worker id of one allocator.
///
/// Kept apart from [`TickState`]: it changes at most a handful of times, at
/// setup, so readers never need to synchronize it with the tick/sequence pair.
#[derive(Debug)]
pub(crate) struct WorkerSlot(AtomicU16);

impl WorkerSlot {
    pub(crate) const fn new(worker_id: WorkerId) -> Self {
        Self(AtomicU16::new(worker_id.get()))
    }

    pub(crate) fn load(&self) -> WorkerId {
        WorkerId::from_raw(self.0.load(AtomicOrdering::Acquire))
    }

    pub(crate) fn store(&self, worker_id: WorkerId) {
        self.0.store(worker_id.get(), AtomicOrdering::Release);
    }
}
