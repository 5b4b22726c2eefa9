use serde_json::json;
use tracing::warn;

use crate::config::Config;
use crate::connection::ConnectionManager;
use crate::error::Result;
use crate::formatter::JsonFormatter;

/// Connect to the configured deployment and report its health
pub(super) async fn run(config: &Config) -> Result<String> {
    let mut manager =
        ConnectionManager::new(config.connection.uri.clone(), config.connection.clone());

    if let Err(e) = manager.connect().await {
        warn!("Connection {}", manager.get_state().await);
        return Err(e);
    }

    let health = manager.health_check().await?;
    let report = json!({
        "state": manager.get_state().await.to_string(),
        "healthy": health.is_healthy && manager.is_connected().await,
        "response_time_ms": health.response_time_ms,
    });

    manager.disconnect().await?;
    JsonFormatter::default().format_value(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConnectionError, PagerError};

    #[tokio::test]
    async fn test_ping_unreachable_server_fails() {
        let mut config = Config::default();
        // Nothing listens on port 1
        config.connection.uri = "mongodb://127.0.0.1:1".to_string();
        config.connection.timeout = 1;

        let err = run(&config).await.unwrap_err();
        assert!(matches!(err, PagerError::Connection(ConnectionError::PingFailed(_))));
        assert!(!err.is_client_error());
    }
}
