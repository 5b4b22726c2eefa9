use std::cmp::Ordering;

use mongodb::bson::{Bson, Document, doc};

use super::reader::FieldReader;
use super::value::FieldValue;
use super::Position;
use crate::error::TokenError;
use crate::ordering::{Direction, OrderingSpec};

/// Typed page boundary
///
/// Selects the items that come after a remembered position in an effective
/// ordering, comparing ordering-field tuples lexicographically: the first
/// field decides unless equal, then the second, and so on. An inclusive
/// boundary also selects items tying with the position on every field.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    keys: Vec<BoundaryKey>,
    inclusive: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct BoundaryKey {
    field: String,
    direction: Direction,
    value: FieldValue,
}

impl Boundary {
    /// Build the boundary for `position` under the effective `spec`
    ///
    /// Fails when the position does not decode or carries a different
    /// number of values than `spec` has fields.
    pub fn build(
        spec: &OrderingSpec,
        position: &Position,
        inclusive: bool,
    ) -> Result<Self, TokenError> {
        Self::from_values(spec, position.values()?, inclusive)
    }

    pub fn from_values(
        spec: &OrderingSpec,
        values: Vec<FieldValue>,
        inclusive: bool,
    ) -> Result<Self, TokenError> {
        if values.len() != spec.len() {
            return Err(TokenError::MalformedToken(format!(
                "position has {} values, ordering has {} fields",
                values.len(),
                spec.len()
            )));
        }

        let keys = spec
            .fields()
            .iter()
            .zip(values)
            .map(|(field, value)| BoundaryKey {
                field: field.name().to_string(),
                direction: field.direction(),
                value,
            })
            .collect();

        Ok(Self { keys, inclusive })
    }

    pub fn is_inclusive(&self) -> bool {
        self.inclusive
    }

    /// Where `item` sits relative to the boundary in the effective ordering
    pub fn compare<R: FieldReader + ?Sized>(&self, item: &R) -> Ordering {
        for key in &self.keys {
            let value = item.field(&key.field).unwrap_or(FieldValue::Null);
            let ordering = key.direction.apply(value.cmp(&key.value));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    pub fn matches<R: FieldReader + ?Sized>(&self, item: &R) -> bool {
        match self.compare(item) {
            Ordering::Greater => true,
            Ordering::Equal => self.inclusive,
            Ordering::Less => false,
        }
    }

    /// Render as a MongoDB query filter
    ///
    /// `(a, b) > (x, y)` expands to `a > x OR (a = x AND b > y)`, with `$lt`
    /// standing in for descending fields. An inclusive boundary relaxes the
    /// last clause to `$gte` / `$lte`.
    ///
    /// MongoDB range operators only match values of their operand's type,
    /// so each comparison also selects the type brackets that sort after
    /// the value. `{f: null}` stands for the null bracket and matches
    /// missing fields too.
    pub fn to_filter(&self) -> Document {
        let last = self.keys.len().saturating_sub(1);
        let mut clauses: Vec<Bson> = Vec::with_capacity(self.keys.len());

        for (idx, key) in self.keys.iter().enumerate() {
            let mut alternatives = key.after(self.inclusive && idx == last);
            let mut clause = self.equality_prefix(idx);

            if clause.is_empty() {
                clauses.extend(alternatives.into_iter().map(Bson::Document));
            } else if alternatives.len() == 1 {
                if let Some(only) = alternatives.pop() {
                    for (field, condition) in only {
                        clause.insert(field, condition);
                    }
                    clauses.push(Bson::Document(clause));
                }
            } else if !alternatives.is_empty() {
                clause.insert("$or", alternatives);
                clauses.push(Bson::Document(clause));
            }
        }

        match clauses.len() {
            0 => doc! { "$expr": false },
            1 => match clauses.pop() {
                Some(Bson::Document(only)) => only,
                _ => doc! { "$expr": false },
            },
            _ => doc! { "$or": clauses },
        }
    }

    /// Equality on the first `len` keys
    fn equality_prefix(&self, len: usize) -> Document {
        let mut prefix = Document::new();
        for key in &self.keys[..len] {
            prefix.insert(key.field.as_str(), key.value.to_bson());
        }
        prefix
    }
}

/// `$type` aliases of the type brackets, in cross-type sort order
const TYPE_BRACKETS: [&str; 6] = ["null", "number", "string", "objectId", "bool", "date"];

impl BoundaryKey {
    /// Single-field conditions selecting the values that come after this
    /// key in its direction, or tie with it when `inclusive`
    fn after(&self, inclusive: bool) -> Vec<Document> {
        let rank = usize::from(self.value.type_rank());
        let mut alternatives = Vec::new();

        match (&self.value, inclusive) {
            (FieldValue::Null, true) => alternatives.push(self.condition(Bson::Null)),
            (FieldValue::Null, false) => {}
            (value, _) => {
                let op = match (self.direction, inclusive) {
                    (Direction::Ascending, false) => "$gt",
                    (Direction::Ascending, true) => "$gte",
                    (Direction::Descending, false) => "$lt",
                    (Direction::Descending, true) => "$lte",
                };
                let mut comparison = Document::new();
                comparison.insert(op, value.to_bson());
                alternatives.push(self.condition(comparison.into()));
            }
        }

        let brackets = match self.direction {
            Direction::Ascending => &TYPE_BRACKETS[rank + 1..],
            Direction::Descending => &TYPE_BRACKETS[1..rank.max(1)],
        };
        if !brackets.is_empty() {
            alternatives.push(self.condition(doc! { "$type": brackets.to_vec() }.into()));
        }
        if self.direction == Direction::Descending && rank > 0 {
            alternatives.push(self.condition(Bson::Null));
        }

        alternatives
    }

    fn condition(&self, condition: Bson) -> Document {
        let mut document = Document::new();
        document.insert(self.field.as_str(), condition);
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(text: &str) -> OrderingSpec {
        OrderingSpec::parse(text).unwrap()
    }

    #[test]
    fn test_descending_single_field() {
        let boundary = Boundary::from_values(&spec("-id"), vec![16.into()], false).unwrap();

        assert!(boundary.matches(&doc! { "id": 15 }));
        assert!(!boundary.matches(&doc! { "id": 16 }));
        assert!(!boundary.matches(&doc! { "id": 17 }));
        assert_eq!(
            boundary.to_filter(),
            doc! { "$or": [ { "id": { "$lt": 16_i64 } }, { "id": null } ] }
        );
    }

    #[test]
    fn test_inclusive_keeps_ties() {
        let boundary = Boundary::from_values(&spec("score"), vec![3.into()], true).unwrap();

        assert!(boundary.matches(&doc! { "score": 3 }));
        assert!(boundary.matches(&doc! { "score": 4.5 }));
        assert!(!boundary.matches(&doc! { "score": 2 }));
        assert_eq!(
            boundary.to_filter(),
            doc! { "$or": [
                { "score": { "$gte": 3_i64 } },
                { "score": { "$type": ["string", "objectId", "bool", "date"] } }
            ] }
        );

        let pair =
            Boundary::from_values(&spec("-score,name"), vec![5.into(), "m".into()], true).unwrap();
        assert!(pair.matches(&doc! { "score": 5, "name": "m" }));
        assert_eq!(
            pair.to_filter(),
            doc! { "$or": [
                { "score": { "$lt": 5_i64 } },
                { "score": null },
                { "score": 5_i64, "$or": [
                    { "name": { "$gte": "m" } },
                    { "name": { "$type": ["objectId", "bool", "date"] } }
                ] }
            ] }
        );
    }

    #[test]
    fn test_lexicographic_tuple_comparison() {
        let boundary =
            Boundary::from_values(&spec("-score,name"), vec![5.into(), "m".into()], false)
                .unwrap();

        // lower score comes later in a descending ordering
        assert!(boundary.matches(&doc! { "score": 4, "name": "a" }));
        // same score, later name
        assert!(boundary.matches(&doc! { "score": 5, "name": "z" }));
        assert!(!boundary.matches(&doc! { "score": 5, "name": "a" }));
        assert!(!boundary.matches(&doc! { "score": 6, "name": "z" }));
        // missing score sorts last when descending
        assert!(boundary.matches(&doc! { "name": "a" }));

        assert_eq!(
            boundary.to_filter(),
            doc! { "$or": [
                { "score": { "$lt": 5_i64 } },
                { "score": null },
                { "score": 5_i64, "$or": [
                    { "name": { "$gt": "m" } },
                    { "name": { "$type": ["objectId", "bool", "date"] } }
                ] }
            ] }
        );
    }

    #[test]
    fn test_null_boundary_ascending() {
        let inclusive =
            Boundary::from_values(&spec("score"), vec![FieldValue::Null], true).unwrap();
        assert!(inclusive.matches(&doc! { "other": 1 }));
        assert!(inclusive.matches(&doc! { "score": 1 }));
        assert_eq!(
            inclusive.to_filter(),
            doc! { "$or": [
                { "score": null },
                { "score": { "$type": ["number", "string", "objectId", "bool", "date"] } }
            ] }
        );

        let strict =
            Boundary::from_values(&spec("score"), vec![FieldValue::Null], false).unwrap();
        assert!(!strict.matches(&doc! { "other": 1 }));
        assert!(strict.matches(&doc! { "score": 1 }));
        assert_eq!(
            strict.to_filter(),
            doc! { "score": { "$type": ["number", "string", "objectId", "bool", "date"] } }
        );
    }

    #[test]
    fn test_null_boundary_descending_selects_nothing_after() {
        let strict =
            Boundary::from_values(&spec("-score"), vec![FieldValue::Null], false).unwrap();
        assert!(!strict.matches(&doc! { "score": 1 }));
        assert!(!strict.matches(&doc! { "other": 1 }));
        assert_eq!(strict.to_filter(), doc! { "$expr": false });

        let inclusive =
            Boundary::from_values(&spec("-score"), vec![FieldValue::Null], true).unwrap();
        assert_eq!(inclusive.to_filter(), doc! { "score": null });
    }

    #[test]
    fn test_descending_boundary_reaches_lower_types() {
        let boundary = Boundary::from_values(&spec("-name"), vec!["m".into()], false).unwrap();

        assert!(boundary.matches(&doc! { "name": "a" }));
        assert!(boundary.matches(&doc! { "name": 42 }));
        assert!(boundary.matches(&doc! { "other": true }));
        assert!(!boundary.matches(&doc! { "name": true }));
        assert_eq!(
            boundary.to_filter(),
            doc! { "$or": [
                { "name": { "$lt": "m" } },
                { "name": { "$type": ["number"] } },
                { "name": null }
            ] }
        );
    }

    #[test]
    fn test_null_in_equality_prefix() {
        let boundary = Boundary::from_values(
            &spec("score,name"),
            vec![FieldValue::Null, "m".into()],
            false,
        )
        .unwrap();

        assert!(boundary.matches(&doc! { "name": "z" }));
        assert!(boundary.matches(&doc! { "score": 0, "name": "a" }));
        assert_eq!(
            boundary.to_filter(),
            doc! { "$or": [
                { "score": { "$type": ["number", "string", "objectId", "bool", "date"] } },
                { "score": null, "$or": [
                    { "name": { "$gt": "m" } },
                    { "name": { "$type": ["objectId", "bool", "date"] } }
                ] }
            ] }
        );
    }

    #[test]
    fn test_inverted_spec_flips_comparison() {
        let inverted = spec("-id").invert();
        let boundary = Boundary::from_values(&inverted, vec![10.into()], false).unwrap();

        assert!(boundary.matches(&doc! { "id": 11 }));
        assert!(!boundary.matches(&doc! { "id": 9 }));
    }

    #[test]
    fn test_arity_mismatch_is_malformed() {
        let position = Position::from_values(&[1.into(), 2.into()]);
        let err = Boundary::build(&spec("id"), &position, false).unwrap_err();
        assert!(matches!(err, TokenError::MalformedToken(_)));
    }
}
