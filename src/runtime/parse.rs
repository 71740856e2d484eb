//! Text parsers for bindable parameter tags.
//!
//! Every parser has the shape `fn(&str) -> Option<T>`; `None` means the text
//! is not a valid value of the tag and the binder reports the key as
//! unparsable. The formatters produce the canonical text each parser accepts.

use chrono::{DateTime, SecondsFormat, Utc};
use prost_types::Timestamp;
use std::fmt::Display;

#[must_use]
pub fn int32(s: &str) -> Option<i32> {
    s.parse().ok()
}

#[must_use]
pub fn uint32(s: &str) -> Option<u32> {
    s.parse().ok()
}

#[must_use]
pub fn int64(s: &str) -> Option<i64> {
    s.parse().ok()
}

#[must_use]
pub fn uint64(s: &str) -> Option<u64> {
    s.parse().ok()
}

#[must_use]
pub fn float32(s: &str) -> Option<f32> {
    s.parse().ok()
}

#[must_use]
pub fn float64(s: &str) -> Option<f64> {
    s.parse().ok()
}

/// Canonical boolean text: `1 t T TRUE true True` and `0 f F FALSE false False`
#[must_use]
pub fn boolean(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Raw text as byte content (no base64 decoding)
#[must_use]
pub fn bytes(s: &str) -> Option<Vec<u8>> {
    Some(s.as_bytes().to_vec())
}

#[must_use]
pub fn string(s: &str) -> Option<String> {
    Some(s.to_string())
}

/// Strict RFC 3339 timestamp
///
/// ```rust
/// use protoroute::runtime::parse;
/// let ts = parse::timestamp("2017-07-21T17:32:28Z").unwrap();
/// assert_eq!(ts.seconds, 1_500_658_348);
/// assert!(parse::timestamp("2017-07-21 17:32:28").is_none());
/// ```
#[must_use]
pub fn timestamp(s: &str) -> Option<Timestamp> {
    let dt = DateTime::parse_from_rfc3339(s).ok()?;
    Some(Timestamp {
        seconds: dt.timestamp(),
        nanos: i32::try_from(dt.timestamp_subsec_nanos()).ok()?,
    })
}

/// Look an enum value name up in its name→ordinal table
#[must_use]
pub fn enumeration(values: &[(&str, i32)], s: &str) -> Option<i32> {
    values
        .iter()
        .find(|(name, _)| *name == s)
        .map(|(_, ordinal)| *ordinal)
}

/// Canonical text of an integer or float
#[must_use]
pub fn format_number<T: Display>(value: T) -> String {
    value.to_string()
}

#[must_use]
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// RFC 3339 text of a timestamp in UTC; `None` when out of range
#[must_use]
pub fn format_timestamp(value: &Timestamp) -> Option<String> {
    let nanos = u32::try_from(value.nanos).ok()?;
    let dt = DateTime::<Utc>::from_timestamp(value.seconds, nanos)?;
    Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_round_trip() {
        for v in [i64::MIN, -1, 0, 42, i64::MAX] {
            assert_eq!(int64(&format_number(v)), Some(v));
        }
        for v in [0u64, 7, u64::MAX] {
            assert_eq!(uint64(&format_number(v)), Some(v));
        }
        for v in [i32::MIN, 0, i32::MAX] {
            assert_eq!(int32(&format_number(v)), Some(v));
        }
        for v in [0u32, u32::MAX] {
            assert_eq!(uint32(&format_number(v)), Some(v));
        }
    }

    #[test]
    fn test_integer_width_and_sign() {
        assert_eq!(int32("2147483648"), None);
        assert_eq!(uint32("-1"), None);
        assert_eq!(uint64("-1"), None);
        assert_eq!(int64("12abc"), None);
        assert_eq!(int64(""), None);
        assert_eq!(int32("+5"), Some(5));
    }

    #[test]
    fn test_float_round_trip() {
        for v in [0.0f64, -1.5, 3.141_592_653_589_793, 1e300, f64::MIN_POSITIVE] {
            assert_eq!(float64(&format_number(v)), Some(v));
        }
        for v in [0.0f32, 2.5, f32::MAX] {
            assert_eq!(float32(&format_number(v)), Some(v));
        }
        assert_eq!(float64("one"), None);
    }

    #[test]
    fn test_bool() {
        for t in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(boolean(t), Some(true), "{t}");
        }
        for f in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(boolean(f), Some(false), "{f}");
        }
        assert_eq!(boolean("yes"), None);
        assert_eq!(boolean("tRUE"), None);
        for v in [true, false] {
            assert_eq!(boolean(format_bool(v)), Some(v));
        }
    }

    #[test]
    fn test_timestamp_round_trip() {
        for text in [
            "2017-07-21T17:32:28Z",
            "1970-01-01T00:00:00Z",
            "2024-02-29T23:59:59.123456789Z",
        ] {
            let ts = timestamp(text).unwrap();
            assert_eq!(format_timestamp(&ts).as_deref(), Some(text));
        }
    }

    #[test]
    fn test_timestamp_offsets_normalise_to_utc() {
        let ts = timestamp("2017-07-21T19:32:28+02:00").unwrap();
        assert_eq!(format_timestamp(&ts).as_deref(), Some("2017-07-21T17:32:28Z"));
    }

    #[test]
    fn test_timestamp_is_strict() {
        assert!(timestamp("2017-07-21").is_none());
        assert!(timestamp("2017-07-21T17:32:28").is_none());
        assert!(timestamp("yesterday").is_none());
    }

    #[test]
    fn test_enumeration() {
        const COLORS: &[(&str, i32)] = &[("RED", 0), ("BLUE", 3)];
        assert_eq!(enumeration(COLORS, "BLUE"), Some(3));
        assert_eq!(enumeration(COLORS, "blue"), None);
        assert_eq!(enumeration(COLORS, "3"), None);
    }

    #[test]
    fn test_bytes_and_string_are_raw() {
        assert_eq!(bytes("aGk="), Some(b"aGk=".to_vec()));
        assert_eq!(string(""), Some(String::new()));
    }
}
