//! Command-line interface for keypage
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and merging (file, environment, flags)
//! - Dispatch of the `page`, `ping`, `token` and `config` subcommands

mod page;
mod ping;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

use crate::config::{Config, LogLevel};
use crate::cursor::Cursor;
use crate::error::{ConfigError, Result};
use crate::formatter::JsonFormatter;
use crate::position::Position;
use crate::token::TokenCodec;
use crate::utils::number::parse_positive_int;

/// Keyset pagination over MongoDB collections and JSON Lines files
#[derive(Parser, Debug)]
#[command(
    name = "keypage",
    version,
    about = "Cursor-based pagination over ordered collections",
    long_about = "Pages through a MongoDB collection or a JSON Lines file in a stable order,
handing out opaque tokens for the previous and next pages."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for keypage
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one page
    Page(PageArgs),

    /// Check that the MongoDB deployment answers
    Ping {
        /// MongoDB connection URI
        #[arg(long, value_name = "URI")]
        uri: Option<String>,

        /// Connection timeout in seconds
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },

    /// Inspect or build page tokens
    Token {
        #[command(subcommand)]
        action: TokenCommand,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Show version information
    Version,
}

/// Arguments of the `page` subcommand
#[derive(Args, Debug)]
pub struct PageArgs {
    /// MongoDB collection to page through
    #[arg(long, value_name = "NAME", required_unless_present = "file", conflicts_with = "file")]
    pub collection: Option<String>,

    /// JSON Lines file to page through instead of a collection
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// MongoDB connection URI
    #[arg(long, value_name = "URI")]
    pub uri: Option<String>,

    /// Database holding the collection
    #[arg(long = "db", value_name = "NAME")]
    pub database: Option<String>,

    /// Base filter applied to every page, as JSON
    #[arg(long, value_name = "JSON")]
    pub filter: Option<String>,

    /// Ordering, e.g. `-created,_id`
    #[arg(long, value_name = "SPEC", allow_hyphen_values = true)]
    pub order: Option<String>,

    /// Items per page
    #[arg(long, value_name = "N")]
    pub size: Option<String>,

    /// Token from a previous page
    #[arg(long, value_name = "TOKEN", allow_hyphen_values = true)]
    pub token: Option<String>,

    /// Connection timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

/// Token inspection commands
#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Print the cursor a token carries
    Decode {
        /// Token to decode
        #[arg(value_name = "TOKEN", allow_hyphen_values = true)]
        token: String,
    },

    /// Build a token from cursor fields
    Encode {
        /// Tie-skip offset
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Walk backward
        #[arg(long)]
        reverse: bool,

        /// Encoded position, e.g. `i2:42`
        #[arg(long, value_name = "POSITION")]
        position: Option<String>,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Build from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge environment and arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        config.apply_env()?;
        Self::apply_args_to_config(&mut config, args)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI arguments to configuration
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) -> Result<()> {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };

        let (uri, timeout) = match &args.command {
            Commands::Page(page) => {
                if let Some(size) = &page.size {
                    config.pagination.page_size = parse_page_size(size)?;
                }
                if let Some(order) = &page.order {
                    config.pagination.ordering = order.clone();
                }
                (&page.uri, page.timeout)
            }
            Commands::Ping { uri, timeout } => (uri, *timeout),
            _ => return Ok(()),
        };

        if let Some(uri) = uri {
            config.connection.uri = uri.clone();
        }
        if let Some(timeout) = timeout {
            config.connection.timeout = timeout;
        }

        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Get configuration file path (from args or default)
    pub fn config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }

    /// Run the selected subcommand, printing its output
    pub async fn run(&self) -> Result<()> {
        match &self.args.command {
            Commands::Page(args) => {
                let output = page::run(args, &self.config).await?;
                println!("{output}");
            }
            Commands::Ping { .. } => {
                println!("{}", ping::run(&self.config).await?);
            }
            Commands::Token { action } => {
                println!("{}", self.handle_token_command(action)?);
            }
            Commands::Config { show, validate } => {
                self.handle_config_command(*show, *validate)?;
            }
            Commands::Version => {
                println!("keypage version {}", env!("CARGO_PKG_VERSION"));
                println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
            }
        }
        Ok(())
    }

    /// Handle token subcommand
    fn handle_token_command(&self, action: &TokenCommand) -> Result<String> {
        let codec = match self.config.pagination.offset_cutoff {
            Some(cutoff) => TokenCodec::new().with_offset_cutoff(cutoff),
            None => TokenCodec::new(),
        };
        let formatter = JsonFormatter::default();

        match action {
            TokenCommand::Decode { token } => {
                let cursor = codec.decode(Some(token))?.unwrap_or_default();
                formatter.format_value(&describe_cursor(&cursor)?)
            }
            TokenCommand::Encode {
                offset,
                reverse,
                position,
            } => {
                let position = position.as_deref().map(Position::new);
                if let Some(position) = &position {
                    position.values()?;
                }
                Ok(codec.encode(&Cursor::new(*offset, *reverse, position)))
            }
        }
    }

    /// Handle config subcommand
    ///
    /// # Arguments
    /// * `show` - Whether to show configuration
    /// * `validate` - Whether to validate configuration
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file(&self.config_path())?;
        }

        if show || !validate {
            println!("# Configuration file: {}", self.config_path().display());
            println!("{}", self.config.to_toml_string()?);
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            println!("Configuration file {} does not exist", path.display());
            return Ok(());
        }

        Config::load_from_file(Some(path))?.validate()?;
        println!("Configuration file {} is valid", path.display());
        Ok(())
    }
}

/// Parse a page size given on the command line
fn parse_page_size(text: &str) -> Result<usize> {
    parse_positive_int(text, true, None)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "size".to_string(),
                value: text.to_string(),
            }
            .into()
        })
}

/// JSON view of a cursor, with its position values decoded
fn describe_cursor(cursor: &Cursor) -> Result<Value> {
    let values = match cursor.position() {
        Some(position) => position
            .values()?
            .iter()
            .map(|value| value.to_bson().into_relaxed_extjson())
            .collect(),
        None => Vec::new(),
    };

    Ok(json!({
        "offset": cursor.offset(),
        "reverse": cursor.reverse(),
        "position": cursor.position().map(Position::as_str),
        "values": values,
    }))
}
