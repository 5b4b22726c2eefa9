//! Error handling module for keypage.
//!
//! This module provides:
//! - A single crate-wide error type with per-concern error kinds
//! - A split between client-input errors (bad tokens) and server-side faults
//! - Structured JSON rendering of MongoDB driver errors
//!
//! # Example
//!
//! ```rust
//! use keypage::error::{PagerError, TokenError};
//!
//! let err: PagerError = TokenError::MalformedToken("not base64".into()).into();
//! assert!(err.is_client_error());
//! ```

pub mod kinds;
pub mod mongo;

// Re-export commonly used types
pub use kinds::{
    ConfigError, ConnectionError, OrderingError, PagerError, Result, StorageError, TokenError,
};
pub use mongo::{ErrorInfo, extract_error_info};
