use bson::{Bson, Document};
use tracing::info;

use super::PageArgs;
use crate::collection::{CollectionAdapter, MemoryCollection, MongoCollection};
use crate::config::Config;
use crate::connection::ConnectionManager;
use crate::error::{ConfigError, PagerError, Result};
use crate::formatter::JsonFormatter;
use crate::paginator::{Page, Paginator};

/// Database used when neither `--db` nor the URI names one
const DEFAULT_DATABASE: &str = "test";

/// Fetch the requested page and render it
pub(super) async fn run(args: &PageArgs, config: &Config) -> Result<String> {
    let page = match &args.file {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let collection = MemoryCollection::from_json_lines(&text)?;
            info!("Loaded {} documents from {}", collection.len(), path.display());
            fetch(collection, args, config).await?
        }
        None => {
            let name = args.collection.as_deref().ok_or_else(|| {
                PagerError::Generic("either --collection or --file is required".to_string())
            })?;

            let mut manager =
                ConnectionManager::new(config.connection.uri.clone(), config.connection.clone());
            manager.connect().await?;

            let database = match &args.database {
                Some(database) => database.clone(),
                None => manager
                    .default_database()
                    .await
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            };

            let mut collection = MongoCollection::new(manager.get_collection(&database, name)?);
            if let Some(filter) = &args.filter {
                collection = collection.with_filter(parse_filter(filter)?);
            }

            let page = fetch(collection, args, config).await;
            manager.disconnect().await?;
            page?
        }
    };

    let formatter = JsonFormatter::new(!args.compact, !args.no_color, 2);
    formatter.format_page(&page)
}

async fn fetch<A>(adapter: A, args: &PageArgs, config: &Config) -> Result<Page<Document>>
where
    A: CollectionAdapter<Item = Document>,
{
    let paginator = Paginator::from_config(adapter, &config.pagination)?;
    paginator.paginate(args.token.as_deref()).await
}

/// Parse a `--filter` argument as a JSON object
fn parse_filter(text: &str) -> Result<Document> {
    let invalid = |reason: String| -> PagerError {
        ConfigError::InvalidValue {
            field: "filter".to_string(),
            value: reason,
        }
        .into()
    };

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| invalid(format!("{text} ({e})")))?;

    match Bson::try_from(value) {
        Ok(Bson::Document(filter)) => Ok(filter),
        Ok(_) => Err(invalid(format!("{text} (not a JSON object)"))),
        Err(e) => Err(invalid(format!("{text} ({e})"))),
    }
}
