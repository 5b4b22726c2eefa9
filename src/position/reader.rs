//! Field access over item shapes
//!
//! The paginator never inspects item types itself. It asks a
//! [`FieldReader`] for the value of each ordering field:
//! - [`Document`] covers plain key-value records (dotted paths descend into
//!   embedded documents)
//! - [`Record`] wraps any `Serialize` struct and reads it through its serde
//!   representation

use std::ops::Deref;

use mongodb::bson::{Bson, Document};
use serde::Serialize;

use super::value::FieldValue;
use crate::error::{PagerError, Result};

/// Read an ordering field's value off an item
pub trait FieldReader {
    /// Value of `name`, or `None` when the item has no usable value for it
    fn field(&self, name: &str) -> Option<FieldValue>;
}

impl FieldReader for Document {
    fn field(&self, name: &str) -> Option<FieldValue> {
        lookup_path(self, name).and_then(FieldValue::from_bson)
    }
}

impl<R: FieldReader + ?Sized> FieldReader for &R {
    fn field(&self, name: &str) -> Option<FieldValue> {
        (**self).field(name)
    }
}

/// Resolve `a.b.c` against nested documents
fn lookup_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    if let Some(value) = doc.get(path) {
        return Some(value);
    }

    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        match current {
            Bson::Document(inner) => current = inner.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

/// A structured record paired with its field view
///
/// The record is serialized once on construction; field reads afterwards
/// are map lookups.
#[derive(Debug, Clone)]
pub struct Record<T> {
    inner: T,
    fields: Document,
}

impl<T: Serialize> Record<T> {
    /// Wrap `inner`, failing if it does not serialize to a document
    pub fn new(inner: T) -> Result<Self> {
        let fields = mongodb::bson::to_document(&inner)
            .map_err(|e| PagerError::Generic(format!("record is not a document: {e}")))?;
        Ok(Self { inner, fields })
    }
}

impl<T> Record<T> {
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> FieldReader for Record<T> {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.fields.field(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[derive(Serialize)]
    struct Post {
        id: i64,
        title: String,
        author: Author,
    }

    #[derive(Serialize)]
    struct Author {
        name: String,
    }

    #[test]
    fn test_document_fields() {
        let item = doc! { "id": 42, "name": "test", "meta": { "rank": 3 } };

        assert_eq!(item.field("id"), Some(FieldValue::Int(42)));
        assert_eq!(item.field("meta.rank"), Some(FieldValue::Int(3)));
        assert_eq!(item.field("missing"), None);
        assert_eq!(item.field("name.inner"), None);
    }

    #[test]
    fn test_dotted_key_takes_precedence() {
        let item = doc! { "a.b": 1, "a": { "b": 2 } };
        assert_eq!(item.field("a.b"), Some(FieldValue::Int(1)));
    }

    #[test]
    fn test_record_fields() {
        let record = Record::new(Post {
            id: 7,
            title: "hello".into(),
            author: Author { name: "ann".into() },
        })
        .unwrap();

        assert_eq!(record.field("id"), Some(FieldValue::Int(7)));
        assert_eq!(record.field("author.name"), Some(FieldValue::from("ann")));
        assert_eq!(record.title, "hello");
    }

    #[test]
    fn test_record_rejects_non_documents() {
        assert!(Record::new(5_i32).is_err());
    }
}
