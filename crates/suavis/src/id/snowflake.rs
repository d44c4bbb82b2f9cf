use core::{fmt, str::FromStr, time::Duration};

use crate::{ParseIdError, WorkerId};

/// A 64-bit Snowflake identifier.
///
/// - 42 bits timestamp (ms since the allocator clock's epoch)
/// - 10 bits worker ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63 62                 22 21            12 11             0
///              +--+--------------------+----------------+---------------+
///  Field:      |  timestamp (42)       | worker ID (10) | sequence (12) |
///              +--+--------------------+----------------+---------------+
///               ^ sign bit, always zero
/// ```
///
/// The top timestamp bit is also the `i64` sign bit. It must stay clear so
/// every identifier is non-negative, which caps issuable timestamps at
/// [`Self::max_timestamp`] (2^41 - 1 ms, about 69 years past the epoch).
///
/// Identifiers compare by their raw value, which orders them by timestamp,
/// then worker id, then sequence.
///
/// The canonical text form is the decimal string produced by [`Display`] and
/// accepted by [`FromStr`]. Prefer it over a JSON number when identifiers
/// travel to clients whose integers are IEEE doubles (e.g. JavaScript), which
/// only represent integers up to 2^53 exactly.
///
/// ```
/// use suavis::SnowflakeId;
///
/// let id = SnowflakeId::from_components(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.worker_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(id.to_string().parse::<SnowflakeId>(), Ok(id));
/// ```
///
/// [`Display`]: fmt::Display
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Width of the timestamp field.
    pub const TIMESTAMP_BITS: u32 = 42;

    /// Width of the worker id field.
    pub const WORKER_ID_BITS: u32 = 10;

    /// Width of the sequence field.
    pub const SEQUENCE_BITS: u32 = 12;

    /// Bitmask for extracting the 42-bit timestamp field. Occupies bits 22
    /// through 63.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Bitmask for extracting the 10-bit worker ID field. Occupies bits 12
    /// through 21.
    pub const WORKER_ID_MASK: u64 = (1 << Self::WORKER_ID_BITS) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Number of bits to shift the timestamp to its correct position (bit 22).
    pub const TIMESTAMP_SHIFT: u32 = Self::WORKER_ID_SHIFT + Self::WORKER_ID_BITS;

    /// Number of bits to shift the worker ID to its correct position (bit 12).
    pub const WORKER_ID_SHIFT: u32 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u32 = 0;

    /// Packs the three fields into an identifier.
    ///
    /// Each field is masked to its width, so out-of-range input cannot bleed
    /// into neighbouring fields or the reserved bit.
    pub const fn from_components(timestamp: u64, worker_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let worker_id = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | worker_id | sequence,
        }
    }

    /// Extracts the timestamp from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the worker ID from the packed ID.
    pub const fn worker_id(&self) -> u64 {
        (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns the largest timestamp that keeps the sign bit clear.
    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK >> 1
    }

    /// Returns the maximum possible value for the worker id field.
    pub const fn max_worker_id() -> u64 {
        Self::WORKER_ID_MASK
    }

    /// Returns the maximum possible value for the sequence field.
    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// Returns the worker id field as a validated [`WorkerId`].
    pub const fn worker(&self) -> WorkerId {
        WorkerId::from_raw(self.worker_id() as u16)
    }

    /// Converts this type into its raw type representation.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Converts a raw value into this type without validation.
    ///
    /// Use [`Self::is_valid`] to check that the reserved bit is clear.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns `true` if the reserved high bit is clear.
    pub const fn is_valid(&self) -> bool {
        self.id >> (u64::BITS - 1) == 0
    }

    /// Returns the identifier as the signed 64-bit integer exposed to callers.
    ///
    /// Valid identifiers are always non-negative.
    pub const fn to_i64(&self) -> i64 {
        self.id as i64
    }

    /// Returns the ID as a zero-padded 19-digit string.
    ///
    /// Padded strings sort lexicographically in the same order as the
    /// identifiers themselves.
    pub fn to_padded_string(&self) -> String {
        format!("{:019}", self.id)
    }

    /// Returns the timestamp field as milliseconds since the Unix epoch, given
    /// the epoch the issuing clock counted from.
    pub fn unix_millis(&self, epoch: Duration) -> u64 {
        let epoch_ms = u64::try_from(epoch.as_millis()).unwrap_or(u64::MAX);
        epoch_ms.saturating_add(self.timestamp())
    }
}

impl From<SnowflakeId> for i64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_i64()
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl TryFrom<i64> for SnowflakeId {
    type Error = ParseIdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(ParseIdError::Negative { value });
        }
        Ok(Self::from_raw(value as u64))
    }
}

impl FromStr for SnowflakeId {
    type Err = ParseIdError;

    /// Parses the decimal form. Only ASCII digits are accepted, so signs such
    /// as `+5` or `-0` are rejected. Leading zeros are allowed so the padded
    /// form parses too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseIdError::NonDigit);
        }
        let value: i64 = s.parse()?;
        Self::try_from(value)
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("id", &format_args!("0x{:016x}", self.id))
            .field("timestamp", &self.timestamp())
            .field("worker_id", &self.worker_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_documented_shifts() {
        assert_eq!(SnowflakeId::TIMESTAMP_SHIFT, 22);
        assert_eq!(SnowflakeId::WORKER_ID_SHIFT, 12);
        assert_eq!(
            SnowflakeId::TIMESTAMP_BITS + SnowflakeId::WORKER_ID_BITS + SnowflakeId::SEQUENCE_BITS,
            64
        );
        assert_eq!(SnowflakeId::TIMESTAMP_MASK, (1 << 42) - 1);
        assert_eq!(SnowflakeId::max_timestamp(), (1 << 41) - 1);
        assert_eq!(SnowflakeId::max_worker_id(), 1023);
        assert_eq!(SnowflakeId::max_sequence(), 4095);
    }

    #[test]
    fn packs_fields_into_expected_bits() {
        let id = SnowflakeId::from_components(1, 1, 1);
        assert_eq!(id.to_raw(), (1 << 22) | (1 << 12) | 1);

        let id = SnowflakeId::from_components(0x2AB, 0x155, 0xABC);
        assert_eq!(id.to_raw(), (0x2AB << 22) | (0x155 << 12) | 0xABC);
    }

    #[test]
    fn field_round_trip_is_bit_exact() {
        let samples = [
            SnowflakeId::from_components(0, 0, 0),
            SnowflakeId::from_components(123_456_789, 3, 17),
            SnowflakeId::from_components(
                SnowflakeId::max_timestamp(),
                SnowflakeId::max_worker_id(),
                SnowflakeId::max_sequence(),
            ),
        ];
        for id in samples {
            let rebuilt = SnowflakeId::from_components(id.timestamp(), id.worker_id(), id.sequence());
            assert_eq!(rebuilt.to_raw(), id.to_raw());
        }
    }

    #[test]
    fn max_components_keep_reserved_bit_clear() {
        let id = SnowflakeId::from_components(
            SnowflakeId::max_timestamp(),
            SnowflakeId::max_worker_id(),
            SnowflakeId::max_sequence(),
        );
        assert!(id.is_valid());
        assert_eq!(id.to_i64(), i64::MAX);
        assert!(!SnowflakeId::from_raw(u64::MAX).is_valid());

        let past_max = SnowflakeId::from_components(SnowflakeId::max_timestamp() + 1, 0, 0);
        assert!(!past_max.is_valid());
        assert_eq!(past_max.timestamp(), 1 << 41);
    }

    #[test]
    fn oversized_fields_are_masked() {
        let id = SnowflakeId::from_components(5, 1024 + 3, 4096 + 9);
        assert_eq!(id.timestamp(), 5);
        assert_eq!(id.worker_id(), 3);
        assert_eq!(id.sequence(), 9);
    }

    #[test]
    fn distinct_workers_never_collide() {
        let a = SnowflakeId::from_components(42, 3, 0);
        let b = SnowflakeId::from_components(42, 7, 0);
        assert_eq!(a.timestamp(), b.timestamp());
        assert_eq!(a.sequence(), b.sequence());
        assert_ne!(a.worker_id(), b.worker_id());
        assert_ne!(a, b);
    }

    #[test]
    fn ordering_follows_timestamp_then_sequence() {
        let a = SnowflakeId::from_components(10, 5, 4095);
        let b = SnowflakeId::from_components(11, 5, 0);
        let c = SnowflakeId::from_components(11, 5, 1);
        assert!(a < b && b < c);
    }

    #[test]
    fn decimal_string_round_trip() {
        let id = SnowflakeId::from_components(1_000_000, 1023, 4095);
        let s = id.to_string();
        assert_eq!(s, id.to_raw().to_string());
        assert_eq!(s.parse::<SnowflakeId>(), Ok(id));
    }

    #[test]
    fn parse_rejects_bad_input() {
        for input in ["", "12a", " 5", "5 ", "+5", "-0", "-1", "0x10"] {
            assert_eq!(
                input.parse::<SnowflakeId>(),
                Err(ParseIdError::NonDigit),
                "{input:?}"
            );
        }
        assert!(matches!(
            "9223372036854775808".parse::<SnowflakeId>(),
            Err(ParseIdError::InvalidDigits(_))
        ));
    }

    #[test]
    fn parse_then_print_is_stable() {
        for input in ["0", "5", "4202499", "9223372036854775807"] {
            let id: SnowflakeId = input.parse().unwrap();
            assert_eq!(id.to_string(), input);
        }
        let padded = SnowflakeId::from_components(3, 2, 1).to_padded_string();
        assert_eq!(
            padded.parse::<SnowflakeId>(),
            Ok(SnowflakeId::from_components(3, 2, 1))
        );
    }

    #[test]
    fn signed_conversions() {
        let id = SnowflakeId::from_components(77, 1, 2);
        let signed: i64 = id.into();
        assert_eq!(SnowflakeId::try_from(signed), Ok(id));
        assert_eq!(
            SnowflakeId::try_from(i64::MIN),
            Err(ParseIdError::Negative { value: i64::MIN })
        );
    }

    #[test]
    fn padded_string_sorts_like_ids() {
        let small = SnowflakeId::from_components(1, 0, 0);
        let large = SnowflakeId::from_components(1 << 30, 0, 0);
        assert_eq!(small.to_padded_string().len(), 19);
        assert_eq!(large.to_padded_string().len(), 19);
        assert!(small.to_padded_string() < large.to_padded_string());
    }

    #[test]
    fn unix_millis_adds_epoch() {
        let id = SnowflakeId::from_components(500, 0, 0);
        assert_eq!(id.unix_millis(Duration::from_millis(1_000)), 1_500);
    }

    #[test]
    fn debug_shows_fields() {
        let id = SnowflakeId::from_components(1, 2, 3);
        let dbg = format!("{id:?}");
        assert!(dbg.contains("timestamp: 1"));
        assert!(dbg.contains("worker_id: 2"));
        assert!(dbg.contains("sequence: 3"));
    }
}
