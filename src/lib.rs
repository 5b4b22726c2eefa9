//! keypage: keyset (cursor) pagination
//!
//! Pages are located by the ordering-field values of the last row seen
//! rather than by a numeric offset, so paging stays stable while rows are
//! inserted and deep pages cost the same as the first one. Clients only
//! ever see opaque tokens.
//!
//! # Modules
//!
//! - `ordering`: Ordering specs and their inversion
//! - `position`: Field values, position encoding and boundary predicates
//! - `cursor`: The decoded state a token carries
//! - `token`: Token encoding and validation
//! - `collection`: Ordered collection adapters (memory, MongoDB)
//! - `paginator`: The paging algorithm and `Page`
//! - `config`: Configuration management
//! - `connection`: MongoDB connection management
//! - `error`: Error types and handling
//! - `formatter`: JSON output
//! - `cli`: Command-line interface
//! - `utils`: Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use bson::doc;
//! use keypage::{MemoryCollection, OrderingSpec, Paginator};
//!
//! # tokio_test::block_on(async {
//! let posts: MemoryCollection<_> = (1..=25).map(|id| doc! { "_id": id }).collect();
//! let paginator = Paginator::new(posts, OrderingSpec::parse("-_id")?, 10)?;
//!
//! let first = paginator.paginate(None).await?;
//! assert_eq!(first.len(), 10);
//! assert!(!first.has_previous());
//!
//! let second = paginator.paginate(first.next_token()).await?;
//! assert_eq!(second.items()[0].get_i32("_id").unwrap(), 15);
//! # Ok::<(), keypage::PagerError>(())
//! # }).unwrap();
//! ```

pub mod cli;
pub mod collection;
pub mod config;
pub mod connection;
pub mod cursor;
pub mod error;
pub mod formatter;
pub mod ordering;
pub mod paginator;
pub mod position;
pub mod token;
pub mod utils;

// Re-export commonly used types
pub use collection::{CollectionAdapter, MemoryCollection, MongoCollection};
pub use config::Config;
pub use connection::ConnectionManager;
pub use cursor::Cursor;
pub use error::{PagerError, Result};
pub use ordering::{Direction, OrderingSpec, SortField};
pub use paginator::{Page, Paginator};
pub use position::{FieldReader, FieldValue, Position, Record};
pub use token::TokenCodec;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
