//! Errors reported by the encryption context and the engine beneath it.

use std::fmt;

/// The four key slots an [EncryptionContext](crate::EncryptionContext) may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// The secret key.
    Secret,
    /// The public key.
    Public,
    /// The relinearization keys.
    Relin,
    /// The Galois (rotation) keys.
    Galois,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyKind::Secret => "secret key",
            KeyKind::Public => "public key",
            KeyKind::Relin => "relinearization keys",
            KeyKind::Galois => "Galois keys",
        };
        f.write_str(name)
    }
}

/// Errors that may occur.
#[derive(thiserror::Error, Debug)]
pub enum ContextError {
    /// A key slot was read while it is empty.
    #[error("{0} not set")]
    NotFound(KeyKind),
    /// The operation needs key material this context does not hold.
    #[error("permission denied: {0}")]
    Permission(&'static str),
    /// A value was read before it has been assigned.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    /// Scheme parameters are malformed or insecure.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// A homomorphic operation received operands it cannot combine.
    #[error("evaluation failed: {0}")]
    Evaluation(String),
    /// A byte stream does not hold a valid context.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for ContextError {
    fn from(err: std::io::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for ContextError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for context operations.
pub type Result<T> = std::result::Result<T, ContextError>;
