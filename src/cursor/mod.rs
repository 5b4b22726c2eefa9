//! Page cursors
//!
//! A [`Cursor`] says where in the ordering a page starts and which way the
//! page is read. It is what a page token decodes to.

use serde::Serialize;

use crate::position::Position;

/// Immutable `{offset, reverse, position}` triple
///
/// - `position`: the boundary item's encoded ordering-field tuple, `None`
///   for the first page in the cursor's direction
/// - `reverse`: read toward the start of the natural ordering
/// - `offset`: rows tying with the boundary item on every ordering field,
///   other than the boundary item itself, that were already returned in
///   this direction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cursor {
    offset: u64,
    reverse: bool,
    position: Option<Position>,
}

impl Cursor {
    pub fn new(offset: u64, reverse: bool, position: Option<Position>) -> Self {
        Self {
            offset,
            reverse,
            position,
        }
    }

    /// The implicit cursor of the first page in natural order
    pub fn start() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn reverse(&self) -> bool {
        self.reverse
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Whether this is the start cursor, which encodes to the empty token
    pub fn is_start(&self) -> bool {
        self.offset == 0 && !self.reverse && self.position.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_creation() {
        let cursor = Cursor::new(5, true, Some(Position::new("abc")));
        assert_eq!(cursor.offset(), 5);
        assert!(cursor.reverse());
        assert_eq!(cursor.position().map(Position::as_str), Some("abc"));
        assert!(!cursor.is_start());
    }

    #[test]
    fn test_start_cursor() {
        let cursor = Cursor::start();
        assert!(cursor.is_start());
        assert_eq!(cursor, Cursor::new(0, false, None));
    }
}
