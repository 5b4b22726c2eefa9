//! Ordering specifications
//!
//! An [`OrderingSpec`] is the list of fields a paginated collection is sorted
//! by, each ascending or descending. Backward traversal reuses the forward
//! algorithm against the [inverted](OrderingSpec::invert) spec.
//!
//! Specs are usually written in their textual form, a comma-separated list
//! of field names where a leading `-` marks a descending field:
//!
//! ```rust
//! use keypage::ordering::OrderingSpec;
//!
//! let spec: OrderingSpec = "-created, uuid".parse().unwrap();
//! assert_eq!(spec.invert().to_string(), "created,-uuid");
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

use crate::error::OrderingError;

/// Field MongoDB collections use as the implicit tie-breaker.
pub const ID_FIELD: &str = "_id";

/// Sort direction of a single ordering field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    /// The opposite direction
    pub fn flip(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }

    /// Value used in a MongoDB sort document
    pub fn sort_value(self) -> i32 {
        match self {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        }
    }

    /// Orient an ascending comparison result in this direction
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// A single `(field, direction)` pair of an ordering
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortField {
    name: String,
    direction: Direction,
}

impl SortField {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }

    pub fn asc(name: impl Into<String>) -> Self {
        Self::new(name, Direction::Ascending)
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self::new(name, Direction::Descending)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Same field, opposite direction
    pub fn inverted(&self) -> Self {
        Self::new(self.name.clone(), self.direction.flip())
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Ascending => write!(f, "{}", self.name),
            Direction::Descending => write!(f, "-{}", self.name),
        }
    }
}

/// Validated, immutable ordering used by a paginator
///
/// Besides the declared fields, a spec carries the direction in which rows
/// tying on every field are visited (their storage order). It is ascending
/// for a declared spec and flips together with the fields on inversion, so
/// tied rows are walked backward in exactly the reverse of the forward order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingSpec {
    fields: Vec<SortField>,
    tiebreak: Direction,
}

impl OrderingSpec {
    /// Build a spec from its fields
    ///
    /// Fails when `fields` is empty, when a name is blank or starts with `$`
    /// or `-`, or when the same name is used twice.
    pub fn new(fields: Vec<SortField>) -> Result<Self, OrderingError> {
        if fields.is_empty() {
            return Err(OrderingError::Empty);
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            validate_field_name(field.name())?;
            if !seen.insert(field.name()) {
                return Err(OrderingError::DuplicateField(field.name().to_string()));
            }
        }

        Ok(Self {
            fields,
            tiebreak: Direction::Ascending,
        })
    }

    /// Parse the textual form, e.g. `"-score,_id"`
    pub fn parse(text: &str) -> Result<Self, OrderingError> {
        let fields = text
            .split(',')
            .map(|segment| {
                let segment = segment.trim();
                match segment.strip_prefix('-') {
                    Some(name) => SortField::desc(name.trim()),
                    None => SortField::asc(segment),
                }
            })
            .collect::<Vec<_>>();

        // "" splits into one blank segment; report it as an empty spec
        if fields.len() == 1 && fields[0].name().is_empty() && text.trim().is_empty() {
            return Err(OrderingError::Empty);
        }

        Self::new(fields)
    }

    pub fn fields(&self) -> &[SortField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Direction tied rows are visited in, by storage order
    pub fn tiebreak(&self) -> Direction {
        self.tiebreak
    }

    /// Whether this spec is the inversion of a declared spec
    pub fn is_inverted(&self) -> bool {
        self.tiebreak == Direction::Descending
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name() == name)
    }

    /// Reverse every field's direction, keeping field order
    pub fn invert(&self) -> Self {
        Self {
            fields: self.fields.iter().map(SortField::inverted).collect(),
            tiebreak: self.tiebreak.flip(),
        }
    }

    /// Render as a MongoDB sort document
    ///
    /// `_id` is appended in the tie-break direction unless the spec already
    /// orders by it, which keeps the server's order of tied rows stable.
    pub fn to_sort_document(&self) -> Document {
        let mut sort = Document::new();
        for field in &self.fields {
            sort.insert(field.name(), field.direction().sort_value());
        }
        if !self.contains(ID_FIELD) {
            sort.insert(ID_FIELD, self.tiebreak.sort_value());
        }
        sort
    }
}

impl fmt::Display for OrderingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, field) in self.fields.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

impl FromStr for OrderingSpec {
    type Err = OrderingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn validate_field_name(name: &str) -> Result<(), OrderingError> {
    let unusable = name.is_empty()
        || name.starts_with('$')
        || name.starts_with('-')
        || name.chars().any(char::is_whitespace);

    if unusable {
        return Err(OrderingError::InvalidField(name.to_string()));
    }
    Ok(())
}
