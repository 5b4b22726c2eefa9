use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::{Document, doc};
use mongodb::error::ErrorKind;
use mongodb::options::FindOptions;
use tracing::debug;

use super::CollectionAdapter;
use crate::error::{PagerError, Result, StorageError};
use crate::ordering::OrderingSpec;
use crate::position::Boundary;
use crate::utils::string::truncate;

/// Longest filter rendering written to debug logs
const LOGGED_FILTER_LEN: usize = 256;

/// MongoDB collection read through a single `find` per page
///
/// Ties are broken by `_id`, which MongoDB indexes on every collection, so
/// an ordering backed by an index on its fields plus `_id` never needs an
/// in-memory sort.
#[derive(Debug, Clone)]
pub struct MongoCollection {
    collection: Collection<Document>,
    filter: Document,
}

impl MongoCollection {
    pub fn new(collection: Collection<Document>) -> Self {
        Self {
            collection,
            filter: Document::new(),
        }
    }

    /// Restrict every page to documents matching `filter`
    pub fn with_filter(mut self, filter: Document) -> Self {
        self.filter = filter;
        self
    }

    pub fn name(&self) -> &str {
        self.collection.name()
    }

    /// Base filter combined with the page boundary
    fn build_filter(&self, boundary: Option<&Boundary>) -> Document {
        match boundary {
            Some(boundary) if self.filter.is_empty() => boundary.to_filter(),
            Some(boundary) => doc! { "$and": [self.filter.clone(), boundary.to_filter()] },
            None => self.filter.clone(),
        }
    }
}

/// Sort, skip and limit for one page read
///
/// The server rejects counts above `i64::MAX`; no collection holds that
/// many rows, so larger values are clamped.
fn find_options(spec: &OrderingSpec, tie_skip: u64, limit: u64) -> FindOptions {
    let mut options = FindOptions::default();
    options.sort = Some(spec.to_sort_document());
    options.limit = Some(i64::try_from(limit).unwrap_or(i64::MAX));
    if tie_skip > 0 {
        options.skip = Some(tie_skip.min(i64::MAX as u64));
    }
    options
}

/// No server could be selected for the read; everything else is passed
/// through as a driver error
fn read_error(err: mongodb::error::Error) -> PagerError {
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. } => StorageError::Unavailable(err.to_string()).into(),
        _ => err.into(),
    }
}

#[async_trait]
impl CollectionAdapter for MongoCollection {
    type Item = Document;

    async fn read(
        &self,
        spec: &OrderingSpec,
        boundary: Option<&Boundary>,
        tie_skip: u64,
        limit: u64,
    ) -> Result<Vec<Document>> {
        let filter = self.build_filter(boundary);
        let options = find_options(spec, tie_skip, limit);

        debug!(
            "Executing find on collection '{}' with filter {} sort {} skip {} limit {}",
            self.collection.name(),
            truncate(&filter.to_string(), LOGGED_FILTER_LEN),
            spec,
            tie_skip,
            limit
        );

        let cursor = self
            .collection
            .find(filter)
            .with_options(options)
            .await
            .map_err(read_error)?;
        let documents: Vec<Document> = cursor.try_collect().await.map_err(read_error)?;

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::FieldValue;

    async fn posts() -> MongoCollection {
        // Client construction is lazy; no server is contacted here
        let client = mongodb::Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        MongoCollection::new(client.database("blog").collection("posts"))
    }

    #[tokio::test]
    async fn test_filter_without_boundary() {
        let collection = posts().await.with_filter(doc! { "published": true });
        assert_eq!(collection.build_filter(None), doc! { "published": true });
        assert_eq!(collection.name(), "posts");
    }

    #[tokio::test]
    async fn test_boundary_is_combined_with_base_filter() {
        let spec = OrderingSpec::parse("-_id").unwrap();
        let boundary = Boundary::from_values(&spec, vec![FieldValue::Int(16)], false).unwrap();

        let plain = posts().await;
        assert_eq!(
            plain.build_filter(Some(&boundary)),
            doc! { "$or": [ { "_id": { "$lt": 16_i64 } }, { "_id": null } ] }
        );

        let filtered = plain.with_filter(doc! { "published": true });
        assert_eq!(
            filtered.build_filter(Some(&boundary)),
            doc! { "$and": [
                { "published": true },
                { "$or": [ { "_id": { "$lt": 16_i64 } }, { "_id": null } ] }
            ] }
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        // Nothing listens on port 1
        let client =
            mongodb::Client::with_uri_str("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200")
                .await
                .unwrap();
        let collection = MongoCollection::new(client.database("blog").collection("posts"));
        let spec = OrderingSpec::parse("-_id").unwrap();

        let err = collection.read(&spec, None, 0, 11).await.unwrap_err();
        assert!(matches!(err, PagerError::Storage(StorageError::Unavailable(_))));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_find_options_clamp_oversized_counts() {
        let spec = OrderingSpec::parse("-score").unwrap();

        let options = find_options(&spec, u64::MAX, u64::MAX);
        assert_eq!(options.skip, Some(i64::MAX as u64));
        assert_eq!(options.limit, Some(i64::MAX));

        let options = find_options(&spec, 0, 11);
        assert_eq!(options.skip, None);
        assert_eq!(options.limit, Some(11));
        assert_eq!(options.sort, Some(spec.to_sort_document()));
    }
}
