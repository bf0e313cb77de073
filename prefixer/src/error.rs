//! Error types for identifier prefixing.
//!
//! Covers configuration loading, prefix encoding and the quote-strategy
//! failures that reject a sequence rename.

use thiserror::Error;

use crate::platform::QuoteError;

/// Errors that can occur while configuring or running the prefixer.
#[derive(Debug, Error)]
pub enum PrefixError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The configured encoding label is unknown or cannot be encoded to.
    #[error("unsupported encoding '{0}'")]
    UnsupportedEncoding(String),

    /// The prefix contains characters the target encoding cannot represent.
    #[error("prefix '{prefix}' cannot be represented in {encoding}")]
    UnmappablePrefix { prefix: String, encoding: String },

    /// An identifier contains characters the target encoding cannot represent.
    #[error("identifier '{identifier}' cannot be represented in {encoding}")]
    UnmappableIdentifier { identifier: String, encoding: String },

    /// The quote strategy rejected the renamed sequence.
    #[error("class metadata for {class} rejected the sequence rename: {source}")]
    SequenceRejected {
        class: String,
        #[source]
        source: QuoteError,
    },
}

/// Convenience alias for results with [`PrefixError`].
pub type Result<T> = std::result::Result<T, PrefixError>;
