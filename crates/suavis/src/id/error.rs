use core::num::ParseIntError;

/// Errors that can occur while parsing the decimal form of a [`SnowflakeId`].
///
/// [`SnowflakeId`]: crate::SnowflakeId
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseIdError {
    /// The input is empty or contains something other than ASCII digits,
    /// including a sign.
    #[error("invalid decimal identifier: expected only ASCII digits")]
    NonDigit,

    /// The digits do not fit in a non-negative `i64`.
    #[error("invalid decimal identifier: {0}")]
    InvalidDigits(#[from] ParseIntError),

    /// The value is negative, i.e. sets the reserved sign bit.
    #[error("identifier {value} is negative")]
    Negative {
        /// The parsed value.
        value: i64,
    },
}
