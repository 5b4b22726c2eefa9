use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use tracing::debug;

use super::CollectionAdapter;
use crate::error::{Result, StorageError};
use crate::ordering::OrderingSpec;
use crate::position::{Boundary, FieldReader, compare_values, extract_values};

/// In-memory snapshot of a collection
///
/// Storage order is the order items were added in; it breaks ties between
/// rows equal on every ordering field.
#[derive(Debug, Clone, Default)]
pub struct MemoryCollection<T> {
    items: Vec<T>,
}

impl<T> MemoryCollection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> FromIterator<T> for MemoryCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl MemoryCollection<Document> {
    /// Load documents from JSON Lines text
    ///
    /// Each non-blank line must hold one JSON object. MongoDB extended JSON
    /// (`{"$oid": ...}`, `{"$date": ...}`) is understood.
    pub fn from_json_lines(text: &str) -> Result<Self> {
        let mut items = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let value: serde_json::Value = serde_json::from_str(line)
                .map_err(|e| StorageError::ReadFailed(format!("line {}: {e}", idx + 1)))?;
            match Bson::try_from(value) {
                Ok(Bson::Document(doc)) => items.push(doc),
                Ok(_) => {
                    return Err(StorageError::ReadFailed(format!(
                        "line {}: expected a JSON object",
                        idx + 1
                    ))
                    .into());
                }
                Err(e) => {
                    return Err(StorageError::ReadFailed(format!("line {}: {e}", idx + 1)).into());
                }
            }
        }

        Ok(Self::new(items))
    }
}

#[async_trait]
impl<T> CollectionAdapter for MemoryCollection<T>
where
    T: FieldReader + Clone + Send + Sync,
{
    type Item = T;

    async fn read(
        &self,
        spec: &OrderingSpec,
        boundary: Option<&Boundary>,
        tie_skip: u64,
        limit: u64,
    ) -> Result<Vec<T>> {
        let mut rows: Vec<_> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| boundary.is_none_or(|boundary| boundary.matches(*item)))
            .map(|(idx, item)| (idx, extract_values(item, spec), item))
            .collect();

        rows.sort_by(|(a_idx, a_key, _), (b_idx, b_key, _)| {
            compare_values(spec, a_key, b_key)
                .then_with(|| spec.tiebreak().apply(a_idx.cmp(b_idx)))
        });

        debug!(
            "Memory read: {} candidate rows, skip {}, limit {}",
            rows.len(),
            tie_skip,
            limit
        );

        let skip = usize::try_from(tie_skip).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(rows
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|(_, _, item)| item.clone())
            .collect())
    }
}
