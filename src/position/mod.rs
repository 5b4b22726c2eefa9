//! Position codec
//!
//! A position is the remembered tuple of ordering-field values of a page's
//! edge item, rendered to a single string so it can ride inside a page
//! token. Each value is written as `<tag><len>:<text>`:
//!
//! | tag | value    | text                      |
//! |-----|----------|---------------------------|
//! | `n` | null     | empty                     |
//! | `b` | bool     | `true` / `false`          |
//! | `i` | integer  | decimal                   |
//! | `f` | float    | shortest round-trip form  |
//! | `s` | string   | the string itself         |
//! | `o` | ObjectId | 24 hex digits             |
//! | `d` | datetime | milliseconds since epoch  |
//!
//! `len` is the byte length of `text`, so field content can never be
//! mistaken for a separator and two different tuples never share an
//! encoding. Filters are always built from the decoded typed values, never
//! from the string.

mod boundary;
mod reader;
mod value;

pub use boundary::Boundary;
pub use reader::{FieldReader, Record};
pub use value::FieldValue;

use std::cmp::Ordering;
use std::fmt;

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::Serialize;

use crate::error::TokenError;
use crate::ordering::OrderingSpec;

/// Opaque encoded ordering-field tuple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Position(String);

impl Position {
    /// Wrap an already-encoded position, e.g. one read from a token
    ///
    /// The text is not checked here; [`Position::values`] validates it.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encode a tuple of values
    pub fn from_values(values: &[FieldValue]) -> Self {
        let mut out = String::new();
        for value in values {
            let (tag, text) = render(value);
            out.push(tag);
            out.push_str(&text.len().to_string());
            out.push(':');
            out.push_str(&text);
        }
        Self(out)
    }

    /// Position of `item` under `spec`
    pub fn extract<R: FieldReader + ?Sized>(item: &R, spec: &OrderingSpec) -> Self {
        Self::from_values(&extract_values(item, spec))
    }

    /// Decode back into typed values
    pub fn values(&self) -> Result<Vec<FieldValue>, TokenError> {
        let mut values = Vec::new();
        let mut rest = self.0.as_str();

        while !rest.is_empty() {
            let mut chars = rest.chars();
            let tag = chars.next().unwrap_or_default();
            rest = chars.as_str();

            let colon = rest
                .find(':')
                .ok_or_else(|| malformed("missing length separator"))?;
            let len: usize = rest[..colon]
                .parse()
                .map_err(|_| malformed("invalid component length"))?;
            rest = &rest[colon + 1..];

            let text = rest
                .get(..len)
                .ok_or_else(|| malformed("component length out of range"))?;
            rest = &rest[len..];

            values.push(parse(tag, text)?);
        }

        Ok(values)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Values of `spec`'s fields on `item`, missing fields reading as null
pub fn extract_values<R: FieldReader + ?Sized>(item: &R, spec: &OrderingSpec) -> Vec<FieldValue> {
    spec.fields()
        .iter()
        .map(|field| item.field(field.name()).unwrap_or(FieldValue::Null))
        .collect()
}

/// Compare two value tuples under `spec`'s field directions
pub fn compare_values(spec: &OrderingSpec, a: &[FieldValue], b: &[FieldValue]) -> Ordering {
    spec.fields()
        .iter()
        .zip(a.iter().zip(b))
        .map(|(field, (a, b))| field.direction().apply(a.cmp(b)))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn render(value: &FieldValue) -> (char, String) {
    match value {
        FieldValue::Null => ('n', String::new()),
        FieldValue::Bool(b) => ('b', b.to_string()),
        FieldValue::Int(n) => ('i', n.to_string()),
        FieldValue::Float(v) => ('f', v.to_string()),
        FieldValue::String(s) => ('s', s.clone()),
        FieldValue::ObjectId(oid) => ('o', oid.to_hex()),
        FieldValue::DateTime(dt) => ('d', dt.timestamp_millis().to_string()),
    }
}

fn parse(tag: char, text: &str) -> Result<FieldValue, TokenError> {
    let value = match tag {
        'n' if text.is_empty() => FieldValue::Null,
        'b' => match text {
            "true" => FieldValue::Bool(true),
            "false" => FieldValue::Bool(false),
            _ => return Err(malformed("invalid boolean component")),
        },
        'i' => FieldValue::Int(
            text.parse()
                .map_err(|_| malformed("invalid integer component"))?,
        ),
        'f' => FieldValue::Float(text.parse().map_err(|_| malformed("invalid float component"))?),
        's' => FieldValue::String(text.to_string()),
        'o' => FieldValue::ObjectId(
            ObjectId::parse_str(text).map_err(|_| malformed("invalid ObjectId component"))?,
        ),
        'd' => FieldValue::DateTime(DateTime::from_millis(
            text.parse()
                .map_err(|_| malformed("invalid datetime component"))?,
        )),
        _ => return Err(malformed("unknown component tag")),
    };
    Ok(value)
}

fn malformed(reason: &str) -> TokenError {
    TokenError::MalformedToken(format!("position: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_single_integer_position() {
        let spec = OrderingSpec::parse("-id").unwrap();
        let item = doc! { "id": 42, "name": "test" };

        let position = Position::extract(&item, &spec);
        assert_eq!(position.as_str(), "i2:42");
        assert_eq!(position.values().unwrap(), vec![FieldValue::Int(42)]);
    }

    #[test]
    fn test_multi_field_positions_do_not_collide() {
        let a = Position::from_values(&["a:1".into(), "b".into()]);
        let b = Position::from_values(&["a".into(), "1:b".into()]);
        assert_ne!(a, b);

        assert_eq!(
            a.values().unwrap(),
            vec![FieldValue::from("a:1"), FieldValue::from("b")]
        );
        assert_eq!(
            b.values().unwrap(),
            vec![FieldValue::from("a"), FieldValue::from("1:b")]
        );
    }

    #[test]
    fn test_all_value_kinds_decode() {
        let oid = ObjectId::new();
        let values = vec![
            FieldValue::Null,
            FieldValue::Bool(true),
            FieldValue::Int(-17),
            FieldValue::Float(2.5),
            FieldValue::String("naïve & = %".into()),
            FieldValue::ObjectId(oid),
            FieldValue::DateTime(DateTime::from_millis(1_700_000_000_000)),
        ];

        let decoded = Position::from_values(&values).values().unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_compare_values_follows_directions() {
        let spec = OrderingSpec::parse("-score,name").unwrap();
        let high = vec![FieldValue::Int(9), FieldValue::from("b")];
        let low = vec![FieldValue::Int(1), FieldValue::from("a")];
        let high_a = vec![FieldValue::Int(9), FieldValue::from("a")];

        assert_eq!(compare_values(&spec, &high, &low), Ordering::Less);
        assert_eq!(compare_values(&spec, &high_a, &high), Ordering::Less);
        assert_eq!(compare_values(&spec, &high, &high), Ordering::Equal);
    }

    #[test]
    fn test_missing_field_reads_as_null() {
        let spec = OrderingSpec::parse("score,_id").unwrap();
        let item = doc! { "_id": 1 };
        assert_eq!(
            extract_values(&item, &spec),
            vec![FieldValue::Null, FieldValue::Int(1)]
        );
    }

    #[test]
    fn test_malformed_positions_rejected() {
        let cases = [
            "i",
            "i2",
            "i2:4",
            "x1:a",
            "i1:a",
            "b3:yes",
            "n1:x",
            "i2:42junk",
            "i99999999999999999999:1",
        ];
        for bad in cases {
            let err = Position::new(bad).values().unwrap_err();
            assert!(
                matches!(err, TokenError::MalformedToken(_)),
                "{bad} should be malformed"
            );
        }
    }

    #[test]
    fn test_length_counts_bytes() {
        let position = Position::from_values(&["é".into()]);
        assert_eq!(position.as_str(), "s2:é");
        // A length splitting a multi-byte char must not panic
        assert!(Position::new("s1:é").values().is_err());
    }
}
