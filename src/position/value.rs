//! Typed ordering-field values
//!
//! Comparison follows MongoDB's cross-type sort order so in-memory pages
//! line up with what a server-side sort returns:
//! `Null < numbers < strings < ObjectId < Bool < DateTime`.

use std::cmp::Ordering;
use std::fmt;

use mongodb::bson::{Bson, DateTime, oid::ObjectId};

/// A comparable scalar read from an ordering field
#[derive(Debug, Clone)]
pub enum FieldValue {
    Null,
    Int(i64),
    Float(f64),
    String(String),
    ObjectId(ObjectId),
    Bool(bool),
    DateTime(DateTime),
}

impl FieldValue {
    /// Convert a BSON value
    ///
    /// Returns `None` for values that cannot take part in an ordering
    /// (documents, arrays, binary data and the like).
    pub fn from_bson(value: &Bson) -> Option<Self> {
        let converted = match value {
            Bson::Null | Bson::Undefined => FieldValue::Null,
            Bson::Int32(n) => FieldValue::Int(i64::from(*n)),
            Bson::Int64(n) => FieldValue::Int(*n),
            Bson::Double(f) => FieldValue::Float(*f),
            Bson::String(s) | Bson::Symbol(s) => FieldValue::String(s.clone()),
            Bson::ObjectId(oid) => FieldValue::ObjectId(*oid),
            Bson::Boolean(b) => FieldValue::Bool(*b),
            Bson::DateTime(dt) => FieldValue::DateTime(*dt),
            _ => return None,
        };
        Some(converted)
    }

    /// Convert back to BSON, for use in query filters
    pub fn to_bson(&self) -> Bson {
        match self {
            FieldValue::Null => Bson::Null,
            FieldValue::Int(n) => Bson::Int64(*n),
            FieldValue::Float(f) => Bson::Double(*f),
            FieldValue::String(s) => Bson::String(s.clone()),
            FieldValue::ObjectId(oid) => Bson::ObjectId(*oid),
            FieldValue::Bool(b) => Bson::Boolean(*b),
            FieldValue::DateTime(dt) => Bson::DateTime(*dt),
        }
    }

    /// Rank of the value's type in the cross-type sort order
    pub(crate) fn type_rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Int(_) | FieldValue::Float(_) => 1,
            FieldValue::String(_) => 2,
            FieldValue::ObjectId(_) => 3,
            FieldValue::Bool(_) => 4,
            FieldValue::DateTime(_) => 5,
        }
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use FieldValue::*;

        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => cmp_floats(*a, *b),
            (Int(a), Float(b)) => cmp_int_float(*a, *b),
            (Float(a), Int(b)) => cmp_int_float(*b, *a).reverse(),
            (String(a), String(b)) => a.cmp(b),
            (ObjectId(a), ObjectId(b)) => a.bytes().cmp(&b.bytes()),
            (Bool(a), Bool(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.timestamp_millis().cmp(&b.timestamp_millis()),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

/// NaN sorts below every other number and zeros of either sign are equal
fn cmp_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Exact comparison, without rounding `int` to the nearest float
fn cmp_int_float(int: i64, float: f64) -> Ordering {
    // i64::MIN is -2^63 exactly; 2^63 is the first float above i64::MAX
    const LOWER: f64 = i64::MIN as f64;
    const UPPER: f64 = -LOWER;

    if float.is_nan() {
        return Ordering::Greater;
    }
    if float >= UPPER {
        return Ordering::Less;
    }
    if float < LOWER {
        return Ordering::Greater;
    }

    let whole = float.trunc();
    int.cmp(&(whole as i64)).then_with(|| {
        if float > whole {
            Ordering::Less
        } else if float < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::String(s) => write!(f, "{s:?}"),
            FieldValue::ObjectId(oid) => write!(f, "ObjectId('{}')", oid.to_hex()),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::DateTime(dt) => write!(f, "Date({})", dt.timestamp_millis()),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Int(i64::from(n))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}
