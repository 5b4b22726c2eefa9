use std::{fmt, io};

use crate::error::mongo::format_mongodb_error;

/// Crate-wide `Result` type using [`PagerError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, PagerError>;

/// Top-level error type for keypage operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum PagerError {
    /// Client supplied a token that could not be interpreted.
    Token(TokenError),

    /// Ordering spec could not be built.
    Ordering(OrderingError),

    /// Configuration errors.
    Config(ConfigError),

    /// Backing collection failed to serve a read.
    Storage(StorageError),

    /// Connection-related errors.
    Connection(ConnectionError),

    /// MongoDB driver errors.
    MongoDb(mongodb::error::Error),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Per-request token errors.
///
/// Every variant is caused by client input and maps to a rejected request,
/// never to a server fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token is not a valid base64 query-string payload, or a field in it
    /// is structurally wrong.
    MalformedToken(String),

    /// The `o` field is not a non-negative integer.
    InvalidOffset(String),

    /// Token exceeds the accepted length.
    TooLong { len: usize, max: usize },
}

/// Ordering spec construction errors.
///
/// These are configuration-time errors, not per-request errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderingError {
    /// No fields were given.
    Empty,

    /// The same field appears more than once.
    DuplicateField(String),

    /// A field identifier is blank or otherwise unusable.
    InvalidField(String),
}

/// Errors raised by a collection adapter.
#[derive(Debug)]
pub enum StorageError {
    /// The read itself failed.
    ReadFailed(String),

    /// The backing store could not be reached.
    Unavailable(String),
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection.
    ConnectionFailed(String),

    /// Invalid connection URI.
    InvalidUri(String),

    /// Not currently connected to MongoDB.
    NotConnected,

    /// Ping command failed.
    PingFailed(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

impl PagerError {
    /// Whether the error was caused by client input (a bad token).
    ///
    /// Callers exposing the paginator over HTTP should answer these with a
    /// 400-class status and everything else with a 500-class status.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PagerError::Token(_))
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for PagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PagerError::Token(e) => write!(f, "Bad request: {e}"),
            PagerError::Ordering(e) => write!(f, "Ordering error: {e}"),
            PagerError::Config(e) => write!(f, "Configuration error: {e}"),
            PagerError::Storage(e) => write!(f, "Storage error: {e}"),
            PagerError::Connection(e) => write!(f, "Connection error: {e}"),
            PagerError::MongoDb(e) => format_mongodb_error(f, e),
            PagerError::Io(e) => write!(f, "I/O error: {e}"),
            PagerError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::MalformedToken(msg) => write!(f, "Malformed page token: {msg}"),
            TokenError::InvalidOffset(value) => {
                write!(f, "Invalid page token offset: '{value}'")
            }
            TokenError::TooLong { len, max } => {
                write!(f, "Page token too long: {len} characters (max {max})")
            }
        }
    }
}

impl fmt::Display for OrderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderingError::Empty => write!(f, "ordering must name at least one field"),
            OrderingError::DuplicateField(name) => {
                write!(f, "field '{name}' appears more than once in ordering")
            }
            OrderingError::InvalidField(name) => write!(f, "invalid ordering field '{name}'"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ReadFailed(msg) => write!(f, "Read failed: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed(msg) => write!(f, "Failed to connect: {msg}"),
            ConnectionError::InvalidUri(uri) => write!(f, "Invalid connection URI: {uri}"),
            ConnectionError::NotConnected => write!(f, "Not connected to MongoDB"),
            ConnectionError::PingFailed(msg) => write!(f, "Ping failed: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for PagerError {}
impl std::error::Error for TokenError {}
impl std::error::Error for OrderingError {}
impl std::error::Error for StorageError {}
impl std::error::Error for ConnectionError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to PagerError ========================= */

impl From<io::Error> for PagerError {
    fn from(err: io::Error) -> Self {
        PagerError::Io(err)
    }
}

impl From<mongodb::error::Error> for PagerError {
    fn from(err: mongodb::error::Error) -> Self {
        PagerError::MongoDb(err)
    }
}

impl From<TokenError> for PagerError {
    fn from(err: TokenError) -> Self {
        PagerError::Token(err)
    }
}

impl From<OrderingError> for PagerError {
    fn from(err: OrderingError) -> Self {
        PagerError::Ordering(err)
    }
}

impl From<StorageError> for PagerError {
    fn from(err: StorageError) -> Self {
        PagerError::Storage(err)
    }
}

impl From<ConnectionError> for PagerError {
    fn from(err: ConnectionError) -> Self {
        PagerError::Connection(err)
    }
}

impl From<ConfigError> for PagerError {
    fn from(err: ConfigError) -> Self {
        PagerError::Config(err)
    }
}

impl From<String> for PagerError {
    fn from(msg: String) -> Self {
        PagerError::Generic(msg)
    }
}

impl From<&str> for PagerError {
    fn from(msg: &str) -> Self {
        PagerError::Generic(msg.to_owned())
    }
}
