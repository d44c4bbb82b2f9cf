use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{SerdeError, SnowflakeId};

fn validated(raw: u64) -> Result<SnowflakeId, SerdeError> {
    let id = SnowflakeId::from_raw(raw);
    if id.is_valid() {
        Ok(id)
    } else {
        Err(SerdeError::DecodeOverflow { raw })
    }
}

pub mod as_native {
    use super::{Deserialize, Deserializer, Serialize, Serializer, SnowflakeId, validated};

    /// Serialize an ID as its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.to_raw().serialize(s)
    }

    /// Deserialize an ID from its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The value sets the reserved high bit
    pub fn deserialize<'de, D>(d: D) -> Result<SnowflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u64::deserialize(d)?;
        validated(raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for the canonical decimal string form.
///
/// Decimal strings survive transports that round large integers through
/// IEEE-754 doubles, such as JavaScript clients.
pub mod as_decimal_string {
    use core::fmt;

    use serde::de::{self, Visitor};

    use super::{Deserializer, Serializer, SnowflakeId, validated};
    use crate::SerdeError;

    /// Serialize an ID as its decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(id)
    }

    /// Deserialize an ID from its decimal string. Bare integers are accepted
    /// too.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a base-10 integer
    /// - The value is negative or sets the reserved high bit
    pub fn deserialize<'de, D>(d: D) -> Result<SnowflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecimalVisitor;

        impl Visitor<'_> for DecimalVisitor {
            type Value = SnowflakeId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a decimal snowflake id string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse::<SnowflakeId>()
                    .map_err(|e| E::custom(SerdeError::from(e)))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                validated(v).map_err(E::custom)
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                SnowflakeId::try_from(v).map_err(|e| E::custom(SerdeError::from(e)))
            }
        }

        d.deserialize_any(DecimalVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ParseIdError;

    #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
    struct NativeRow {
        #[serde(with = "as_native")]
        event_id: SnowflakeId,
    }

    #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
    struct StringRow {
        #[serde(with = "as_decimal_string")]
        event_id: SnowflakeId,
    }

    #[test]
    fn native_roundtrip() {
        let row = NativeRow {
            event_id: SnowflakeId::from_components(1, 2, 3),
        };
        let json = serde_json::to_string(&row).expect("serialize");
        assert_eq!(json, r#"{"event_id":4202499}"#);
        let back: NativeRow = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, row);
    }

    #[test]
    fn native_rejects_reserved_bit() {
        let err = serde_json::from_value::<NativeRow>(json!({ "event_id": u64::MAX }))
            .expect_err("should fail");
        assert_eq!(
            err.to_string(),
            SerdeError::DecodeOverflow { raw: u64::MAX }.to_string()
        );
    }

    #[test]
    fn decimal_string_roundtrip() {
        let id = SnowflakeId::from_components(SnowflakeId::max_timestamp(), 1023, 4095);
        let row = StringRow { event_id: id };
        let json = serde_json::to_string(&row).expect("serialize");
        assert_eq!(json, format!(r#"{{"event_id":"{}"}}"#, i64::MAX));
        let back: StringRow = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, row);
    }

    #[test]
    fn decimal_string_accepts_bare_integers() {
        let row: StringRow = serde_json::from_value(json!({ "event_id": 4202499 })).unwrap();
        assert_eq!(row.event_id, SnowflakeId::from_components(1, 2, 3));
    }

    #[test]
    fn decimal_string_rejects_garbage_and_negatives() {
        let err = serde_json::from_value::<StringRow>(json!({ "event_id": "12a" }))
            .expect_err("should fail");
        assert!(err.to_string().starts_with("invalid decimal identifier"));

        let err = serde_json::from_value::<StringRow>(json!({ "event_id": "-5" }))
            .expect_err("should fail");
        assert_eq!(err.to_string(), ParseIdError::NonDigit.to_string());

        let err = serde_json::from_value::<StringRow>(json!({ "event_id": -5 }))
            .expect_err("should fail");
        assert_eq!(
            err.to_string(),
            ParseIdError::Negative { value: -5 }.to_string()
        );
    }
}
