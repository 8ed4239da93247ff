//! Serde helpers for lamport-valued fields.
//!
//! JavaScript tooling reading the results file cannot hold lamport counts
//! in a double without precision loss, so every `u64`/`i64` lamport field
//! is written as a decimal string and parsed back on load.

/// `u64` as a decimal string.
pub mod u64_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// `i64` as a decimal string (attack profits may be negative).
pub mod i64_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Sample {
        #[serde(with = "super::u64_string")]
        lamports: u64,
        #[serde(with = "super::i64_string")]
        profit: i64,
    }

    #[test]
    fn lamports_serialize_as_strings() {
        let sample = Sample {
            lamports: u64::MAX,
            profit: -42,
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, r#"{"lamports":"18446744073709551615","profit":"-42"}"#);
        let back: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn malformed_strings_are_rejected() {
        let err = serde_json::from_str::<Sample>(r#"{"lamports":"1.5","profit":"0"}"#);
        assert!(err.is_err());
    }
}
