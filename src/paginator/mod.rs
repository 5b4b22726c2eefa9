//! Keyset paginator
//!
//! The paginator turns a client token into one bounded read and the read
//! back into a [`Page`] with links. Reading backward is the forward
//! algorithm run against the inverted ordering, with the rows flipped back
//! into natural order afterwards.
//!
//! Each read asks for one row more than the page holds. That lookahead row
//! only says something about the far edge of the read:
//! - forward pages always have a previous page (unless they are the first),
//!   and have a next page only if the lookahead row showed up
//! - backward pages always have a next page, and have a previous page only
//!   if the lookahead row showed up

mod page;

pub use page::Page;

use tracing::{debug, warn};

use crate::collection::CollectionAdapter;
use crate::config::PaginationConfig;
use crate::cursor::Cursor;
use crate::error::{ConfigError, Result};
use crate::ordering::OrderingSpec;
use crate::position::{Boundary, FieldReader, FieldValue, Position, extract_values};
use crate::token::TokenCodec;

/// Cursor-based paginator over one ordered collection
#[derive(Debug, Clone)]
pub struct Paginator<A> {
    adapter: A,
    ordering: OrderingSpec,
    page_size: usize,
    codec: TokenCodec,
}

impl<A: CollectionAdapter> Paginator<A> {
    /// Create a paginator
    ///
    /// # Arguments
    /// * `adapter` - Collection to read pages from
    /// * `ordering` - Natural ordering of the pages
    /// * `page_size` - Default number of items per page, must be positive
    pub fn new(adapter: A, ordering: OrderingSpec, page_size: usize) -> Result<Self> {
        check_page_size(page_size)?;

        Ok(Self {
            adapter,
            ordering,
            page_size,
            codec: TokenCodec::new(),
        })
    }

    /// Create a paginator from the `[pagination]` configuration section
    pub fn from_config(adapter: A, config: &PaginationConfig) -> Result<Self> {
        let paginator = Self::new(adapter, config.ordering_spec()?, config.page_size)?;

        Ok(match config.offset_cutoff {
            Some(cutoff) => paginator.with_offset_cutoff(cutoff),
            None => paginator,
        })
    }

    /// Clamp the tie-skip offset a token may request
    pub fn with_offset_cutoff(mut self, cutoff: u64) -> Self {
        self.codec = self.codec.with_offset_cutoff(cutoff);
        self
    }

    pub fn ordering(&self) -> &OrderingSpec {
        &self.ordering
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Encode a cursor as a token
    pub fn encode_cursor(&self, cursor: &Cursor) -> String {
        self.codec.encode(cursor)
    }

    /// Decode a client token, `None` meaning the first page
    pub fn decode_cursor(&self, token: Option<&str>) -> Result<Option<Cursor>> {
        self.codec.decode(token).map_err(|e| {
            warn!("Rejected page token: {e}");
            e.into()
        })
    }

    /// Fetch the page `token` points at, using the default page size
    pub async fn paginate(&self, token: Option<&str>) -> Result<Page<A::Item>> {
        self.paginate_with_size(token, self.page_size).await
    }

    /// Fetch the page `token` points at, holding up to `page_size` items
    pub async fn paginate_with_size(
        &self,
        token: Option<&str>,
        page_size: usize,
    ) -> Result<Page<A::Item>> {
        check_page_size(page_size)?;

        let cursor = self.decode_cursor(token)?;
        let reverse = cursor.as_ref().is_some_and(Cursor::reverse);

        let effective = if reverse {
            self.ordering.invert()
        } else {
            self.ordering.clone()
        };

        // Decoded boundary values, kept to recognise tie runs spanning pages
        let mut anchor: Option<Vec<FieldValue>> = None;
        let mut boundary = None;
        let mut tie_skip = 0;

        if let Some(cursor) = &cursor {
            match cursor.position() {
                Some(position) => {
                    let values = position.values().map_err(|e| {
                        warn!("Rejected page token: {e}");
                        e
                    })?;
                    // The boundary row and `offset` rows tying with it were consumed
                    boundary = Some(Boundary::from_values(&effective, values.clone(), true)?);
                    tie_skip = cursor.offset().saturating_add(1);
                    anchor = Some(values);
                }
                // No boundary: the offset counts rows from the start
                None => tie_skip = cursor.offset(),
            }
        }

        let limit = u64::try_from(page_size)
            .unwrap_or(u64::MAX)
            .saturating_add(1);

        debug!(
            "Reading page: ordering {}, boundary {}, skip {}, limit {}",
            effective,
            boundary.is_some(),
            tie_skip,
            limit
        );

        let mut items = self
            .adapter
            .read(&effective, boundary.as_ref(), tie_skip, limit)
            .await?;

        let overflow = items.len() > page_size;
        if overflow {
            items.truncate(page_size);
        }
        if reverse {
            items.reverse();
        }

        let (has_previous, has_next) = match &cursor {
            None => (false, overflow),
            Some(cursor) if cursor.reverse() => (overflow, true),
            Some(_) => (true, overflow),
        };

        debug!(
            "Page of {} items, overflow {}, previous {}, next {}",
            items.len(),
            overflow,
            has_previous,
            has_next
        );

        let incoming = cursor.as_ref().map(|cursor| (cursor, anchor.as_deref()));

        let next_token = match items.last() {
            Some(last) if has_next => Some(self.edge_token(&items, last, false, incoming)),
            _ => None,
        };
        let previous_token = match items.first() {
            Some(first) if has_previous => Some(self.edge_token(&items, first, true, incoming)),
            _ => None,
        };

        Ok(Page::new(items, previous_token, next_token))
    }

    /// Token continuing from `edge`, one of the page's end items
    ///
    /// The offset counts the other page items tying with `edge`. When the
    /// whole page ties with the incoming boundary and the token keeps the
    /// incoming direction, the run started on an earlier page and the rows
    /// consumed there are carried over.
    fn edge_token(
        &self,
        items: &[A::Item],
        edge: &A::Item,
        reverse: bool,
        incoming: Option<(&Cursor, Option<&[FieldValue]>)>,
    ) -> String {
        let values = extract_values(edge, &self.ordering);
        let tied = count_tied(items, &values, &self.ordering);
        let mut offset = tied.saturating_sub(1) as u64;

        if let Some((cursor, Some(anchor))) = incoming {
            let continues_run = cursor.reverse() == reverse
                && tied == items.len()
                && anchor == values.as_slice();
            if continues_run {
                offset = offset.saturating_add(cursor.offset()).saturating_add(1);
            }
        }

        let cursor = Cursor::new(offset, reverse, Some(Position::from_values(&values)));
        self.codec.encode(&cursor)
    }
}

/// Number of `items` whose ordering values equal `values`
fn count_tied<R: FieldReader>(items: &[R], values: &[FieldValue], ordering: &OrderingSpec) -> usize {
    items
        .iter()
        .filter(|item| extract_values(*item, ordering) == values)
        .count()
}

fn check_page_size(page_size: usize) -> Result<()> {
    if page_size == 0 {
        return Err(ConfigError::InvalidValue {
            field: "page_size".to_string(),
            value: page_size.to_string(),
        }
        .into());
    }
    Ok(())
}
