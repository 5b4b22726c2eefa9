//! Output formatting for keypage
//!
//! Pages and decoded tokens are printed as JSON, pretty-printed and
//! colorized for terminals or compact for piping.

mod json;

pub use json::{JsonFormatter, document_to_json};
