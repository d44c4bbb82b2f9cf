use core::fmt;

use crate::{Error, Result, SnowflakeId};

/// The worker (shard) identifier embedded in every [`SnowflakeId`].
///
/// Distinct worker ids partition the identifier space, so allocators in
/// different processes or nodes never collide as long as each one is given its
/// own value. Construction validates the `[0, 1023]` range.
///
/// ```
/// use suavis::{Error, WorkerId};
///
/// assert_eq!(WorkerId::new(7).unwrap().get(), 7);
/// assert_eq!(WorkerId::new(1024), Err(Error::Configuration { worker_id: 1024 }));
/// ```
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(u16);

impl WorkerId {
    /// Largest accepted worker id.
    pub const MAX: u16 = SnowflakeId::WORKER_ID_MASK as u16;

    /// Validates `value` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `value` is negative or greater than
    /// [`WorkerId::MAX`].
    pub const fn new(value: i64) -> Result<Self> {
        if value < 0 || value > Self::MAX as i64 {
            return Err(Error::Configuration { worker_id: value });
        }
        Ok(Self(value as u16))
    }

    /// Returns the raw value.
    pub const fn get(self) -> u16 {
        self.0
    }

    pub(crate) const fn from_raw(raw: u16) -> Self {
        Self(raw & Self::MAX)
    }
}

impl TryFrom<i64> for WorkerId {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<WorkerId> for u64 {
    fn from(worker_id: WorkerId) -> Self {
        u64::from(worker_id.0)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkerId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_range_bounds() {
        assert_eq!(WorkerId::new(0).unwrap().get(), 0);
        assert_eq!(WorkerId::new(1023).unwrap().get(), 1023);
        assert_eq!(WorkerId::default().get(), 0);
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            WorkerId::new(1024),
            Err(Error::Configuration { worker_id: 1024 })
        );
        assert_eq!(
            WorkerId::try_from(-1),
            Err(Error::Configuration { worker_id: -1 })
        );
        assert!(WorkerId::new(i64::MAX).is_err());
        assert!(WorkerId::new(i64::MIN).is_err());
    }

    #[test]
    fn configuration_error_message_names_range() {
        let err = WorkerId::new(2048).unwrap_err();
        assert_eq!(
            err.to_string(),
            "worker id 2048 is outside the valid range [0, 1023]"
        );
    }
}
