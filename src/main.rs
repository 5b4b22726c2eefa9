//! keypage command-line tool
//!
//! Pages through MongoDB collections or JSON Lines files with opaque
//! cursor tokens.
//!
//! # Usage
//!
//! ```bash
//! # First page of a collection, newest first
//! keypage page --collection posts --db blog --order -_id --size 20
//!
//! # Follow the `next` token of the previous output
//! keypage page --collection posts --db blog --token <TOKEN>
//!
//! # Inspect a token
//! keypage token decode <TOKEN>
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use keypage::cli::CliInterface;
use keypage::error::Result;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if e.is_client_error() {
            eprintln!("{}", e);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Run the selected subcommand
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    cli.run().await
}

/// Initialize logging on stderr, leaving stdout to command output
///
/// `RUST_LOG` takes precedence over the configured level.
fn initialize_logging(cli: &CliInterface) {
    let level = LevelFilter::from_level(cli.config().logging.level.to_tracing_level());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // Configure timestamps
    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
