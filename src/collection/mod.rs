//! Ordered collection adapters
//!
//! The paginator issues exactly one read per page through a
//! [`CollectionAdapter`]. An adapter must:
//! - sort by the given spec, breaking full ties by storage order in the
//!   spec's [tie-break direction](crate::ordering::OrderingSpec::tiebreak)
//! - keep only rows the boundary matches, when one is given
//! - skip `tie_skip` rows, then return at most `limit` rows
//!
//! Failures are returned as-is; adapters do not retry.

mod memory;
mod mongo;

pub use memory::MemoryCollection;
pub use mongo::MongoCollection;

use async_trait::async_trait;

use crate::error::Result;
use crate::ordering::OrderingSpec;
use crate::position::{Boundary, FieldReader};

/// Capability to run one bounded, ordered read
#[async_trait]
pub trait CollectionAdapter: Send + Sync {
    /// Row type handed back to callers
    type Item: FieldReader + Send;

    /// Read up to `limit` rows after `boundary` under `spec`, skipping the
    /// first `tie_skip` matching rows
    async fn read(
        &self,
        spec: &OrderingSpec,
        boundary: Option<&Boundary>,
        tie_skip: u64,
        limit: u64,
    ) -> Result<Vec<Self::Item>>;
}

#[async_trait]
impl<A: CollectionAdapter + ?Sized> CollectionAdapter for std::sync::Arc<A> {
    type Item = A::Item;

    async fn read(
        &self,
        spec: &OrderingSpec,
        boundary: Option<&Boundary>,
        tie_skip: u64,
        limit: u64,
    ) -> Result<Vec<Self::Item>> {
        (**self).read(spec, boundary, tie_skip, limit).await
    }
}
