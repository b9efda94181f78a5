#![forbid(unsafe_code)]

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use poem_openapi::registry::{MetaSchema, MetaSchemaRef};
use poem_openapi::types::{ParseError, ParseFromJSON, ParseFromParameter, ParseResult, ToJSON, Type};
use serde_json::Value;

use crate::utils::errors::Errors;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Millisecond precision is the resolution of the hour-difference floor.
const MILLIS_PER_HOUR : i64 = 3_600_000;

// ***************************************************************************
//                               Timestamp
// ***************************************************************************
/** An instant paired with an explicit UTC offset.  The canonical external
 * text form is RFC 3339 with a numeric offset, for example
 * 2024-01-01T00:00:00+00:00.  The same codec backs query parameter, path
 * segment and JSON body binding.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Wrap an already-parsed datetime.
    #[allow(dead_code)]
    pub fn new(dt: DateTime<FixedOffset>) -> Self {
        Timestamp(dt)
    }

    /// The current instant, carried with a zero offset.
    pub fn now() -> Self {
        Timestamp(Utc::now().fixed_offset())
    }

    // -----------------------------------------------------------------------
    // encode:
    // -----------------------------------------------------------------------
    /** Render the canonical offset-qualified text form.  Total; fractional
     * seconds appear only when nonzero, so decode(encode(t)) == t for every
     * representable value.
     */
    pub fn encode(&self) -> String {
        self.0.to_rfc3339()
    }

    // -----------------------------------------------------------------------
    // decode:
    // -----------------------------------------------------------------------
    /** Parse the canonical text form.  Fails on empty text, text without an
     * offset, or anything else that is not an RFC 3339 date-time.
     */
    pub fn decode(text: &str) -> Result<Timestamp, Errors> {
        DateTime::parse_from_rfc3339(text)
            .map(Timestamp)
            .map_err(|e| Errors::InvalidTimestamp(text.to_string(), e.to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl FromStr for Timestamp {
    type Err = Errors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::decode(s)
    }
}

// ***************************************************************************
//                         OpenAPI Type Integration
// ***************************************************************************
// Register Timestamp with the request binder so the one codec serves all
// three binding sites: query parameters, path segments and JSON fields.
impl Type for Timestamp {
    const IS_REQUIRED: bool = true;

    type RawValueType = Self;

    type RawElementValueType = Self;

    fn name() -> Cow<'static, str> {
        "string_date-time".into()
    }

    fn schema_ref() -> MetaSchemaRef {
        MetaSchemaRef::Inline(Box::new(MetaSchema::new_with_format("string", "date-time")))
    }

    fn as_raw_value(&self) -> Option<&Self::RawValueType> {
        Some(self)
    }

    fn raw_element_iter<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Self::RawElementValueType> + 'a> {
        Box::new(self.as_raw_value().into_iter())
    }
}

impl ParseFromParameter for Timestamp {
    fn parse_from_parameter(value: &str) -> ParseResult<Self> {
        Timestamp::decode(value).map_err(ParseError::custom)
    }
}

impl ParseFromJSON for Timestamp {
    fn parse_from_json(value: Option<Value>) -> ParseResult<Self> {
        let value = value.unwrap_or_default();
        if let Value::String(s) = value {
            Timestamp::decode(&s).map_err(ParseError::custom)
        } else {
            Err(ParseError::expected_type(value))
        }
    }
}

impl ToJSON for Timestamp {
    fn to_json(&self) -> Option<Value> {
        Some(Value::String(self.encode()))
    }
}

// ***************************************************************************
// GENERAL PUBLIC FUNCTIONS
// ***************************************************************************
// ---------------------------------------------------------------------------
// hours_between:
// ---------------------------------------------------------------------------
/** The whole-hour difference between two instants, floored and signed:
 * negative when from is later than to.  Floor (not truncation) means the
 * result for a reversed sub-hour interval is one less than the negated
 * forward result.
 */
pub fn hours_between(from: &Timestamp, to: &Timestamp) -> i64 {
    (to.0 - from.0).num_milliseconds().div_euclid(MILLIS_PER_HOUR)
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    fn ts(text: &str) -> Timestamp {
        Timestamp::decode(text).expect(text)
    }

    #[test]
    fn roundtrip_whole_seconds() {
        let t = ts("2024-01-01T00:00:00+00:00");
        assert_eq!(t.encode(), "2024-01-01T00:00:00+00:00");
        assert_eq!(Timestamp::decode(&t.encode()).unwrap(), t);
    }

    #[test]
    fn roundtrip_preserves_fraction_and_offset() {
        for text in [
            "2022-09-13T14:14:42.719849+02:00",
            "1999-12-31T23:59:59-08:00",
            "2024-06-30T12:00:00.5+05:30",
        ] {
            let t = ts(text);
            assert_eq!(Timestamp::decode(&t.encode()).unwrap(), t);
        }
    }

    #[test]
    fn decode_accepts_zulu() {
        let t = ts("2024-01-01T12:00:00Z");
        assert_eq!(t.encode(), "2024-01-01T12:00:00+00:00");
    }

    #[test]
    fn decode_rejects_malformed() {
        assert!(Timestamp::decode("").is_err());
        assert!(Timestamp::decode("2024-01-01T00:00:00").is_err());     // no offset
        assert!(Timestamp::decode("2024-01-01").is_err());              // date only
        assert!(Timestamp::decode("notATimestamp").is_err());
    }

    #[test]
    fn decode_error_is_invalid_timestamp() {
        match Timestamp::decode("asdf") {
            Err(Errors::InvalidTimestamp(raw, _)) => assert_eq!(raw, "asdf"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn hours_between_five_days() {
        let from = ts("2024-01-01T00:00:00+00:00");
        let to = ts("2024-01-06T00:00:00+00:00");
        assert_eq!(hours_between(&from, &to), 120);
        assert_eq!(hours_between(&to, &from), -120);
    }

    #[test]
    fn hours_between_respects_offsets() {
        // Same instant expressed in two zones is zero hours apart.
        let utc = ts("2024-01-01T12:00:00+00:00");
        let ist = ts("2024-01-01T17:30:00+05:30");
        assert_eq!(hours_between(&utc, &ist), 0);
    }

    #[test]
    fn hours_between_antisymmetric_when_aligned() {
        let a = ts("2024-03-01T06:00:00+00:00");
        let b = ts("2024-03-02T09:00:00+00:00");
        assert_eq!(hours_between(&a, &b), -hours_between(&b, &a));
    }

    #[test]
    fn hours_between_floors_subhour() {
        let a = ts("2024-01-01T00:00:00+00:00");
        let b = ts("2024-01-01T01:30:00+00:00");
        // Forward: 1.5h floors to 1.  Reversed: -1.5h floors to -2.
        assert_eq!(hours_between(&a, &b), 1);
        assert_eq!(hours_between(&b, &a), -2);
    }

    #[test]
    fn hours_between_subhour_is_zero_forward() {
        let a = ts("2024-01-01T00:00:00+00:00");
        let b = ts("2024-01-01T00:59:59+00:00");
        assert_eq!(hours_between(&a, &b), 0);
        assert_eq!(hours_between(&b, &a), -1);
    }
}
