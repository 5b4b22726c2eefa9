//! JSON formatting for pages and decoded tokens
//!
//! Documents are rendered as relaxed extended JSON, so ObjectIds and dates
//! keep their `$oid` / `$date` wrappers and a printed page can be fed back
//! in as JSON Lines.

use bson::{Bson, Document};
use colored_json::prelude::*;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{PagerError, Result};
use crate::paginator::Page;

/// JSON formatter with pretty printing support
pub struct JsonFormatter {
    /// Enable pretty printing
    pretty: bool,

    /// Indentation level
    indent: usize,

    /// Enable colored output
    use_colors: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    ///
    /// # Arguments
    /// * `pretty` - Enable pretty printing
    /// * `use_colors` - Enable colored output
    /// * `indent` - Spaces per indentation level
    ///
    /// # Returns
    /// * `Self` - New formatter
    pub fn new(pretty: bool, use_colors: bool, indent: usize) -> Self {
        Self {
            pretty,
            indent,
            use_colors,
        }
    }

    /// Format a page as `{items, previous, next}`
    ///
    /// # Arguments
    /// * `page` - Page of documents to format
    ///
    /// # Returns
    /// * `Result<String>` - JSON object string
    pub fn format_page(&self, page: &Page<Document>) -> Result<String> {
        let items: Vec<Value> = page.iter().map(document_to_json).collect();

        self.format_value(&json!({
            "items": items,
            "previous": page.previous_token(),
            "next": page.next_token(),
        }))
    }

    /// Format any serializable value
    pub fn format_value<T: Serialize>(&self, value: &T) -> Result<String> {
        let json_str = if self.pretty {
            self.to_pretty_string(value)?
        } else {
            serde_json::to_string(value).map_err(json_error)?
        };

        // Compact JSON stays plain for piping
        if self.use_colors && self.pretty {
            Ok(json_str.to_colored_json_auto().unwrap_or(json_str))
        } else {
            Ok(json_str)
        }
    }

    /// Convert a value to pretty-printed JSON with custom indentation
    fn to_pretty_string<T: Serialize>(&self, value: &T) -> Result<String> {
        let mut buf = Vec::new();
        let indent = " ".repeat(self.indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser).map_err(json_error)?;
        String::from_utf8(buf).map_err(|e| PagerError::Generic(e.to_string()))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(true, false, 2)
    }
}

/// Relaxed extended JSON rendering of a document
pub fn document_to_json(doc: &Document) -> Value {
    Bson::Document(doc.clone()).into_relaxed_extjson()
}

fn json_error(e: serde_json::Error) -> PagerError {
    PagerError::Generic(format!("JSON serialization failed: {e}"))
}
