use crate::ParseIdError;

/// Errors raised while decoding a [`SnowflakeId`] through the serde adapters.
///
/// [`SnowflakeId`]: crate::SnowflakeId
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SerdeError {
    /// The decoded integer sets the reserved high bit.
    #[error("decoded value {raw:#x} sets the reserved sign bit")]
    DecodeOverflow {
        /// The raw value that failed validation.
        raw: u64,
    },

    /// The decimal string form could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseIdError),
}
