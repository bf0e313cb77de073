//! Prefixes the physical identifiers of ORM class metadata.
//!
//! Every table, index, unique constraint, many-to-many join table and
//! sequence of a selected class is renamed so that all identifiers of a
//! deployment share one prefix. The prefixer runs once per mapped class,
//! when the host ORM compiles that class's metadata.
//!
//! # Architecture
//!
//! - **`prefixer`** — [`IdentifierPrefixer`]: class selection and the rewrite
//!   steps, all funnelled through one idempotent
//!   [`add_prefix`](IdentifierPrefixer::add_prefix)
//! - **`config`** — [`PrefixSettings`] loaded from YAML
//! - **`encoding`** — [`PrefixEncoding`], normalization of the prefix into a
//!   target text encoding
//! - **`platform`** — [`Platform`] and [`QuoteStrategy`] collaborators used to
//!   resolve quoted sequence names
//! - **`hook`** — [`MetadataHook`], the per-class entry point a host calls
//!
//! # Quick start
//!
//! ```
//! use table_prefix::{IdentifierPrefixer, MetadataHook, PlatformContext,
//!     DefaultQuoteStrategy, PostgreSqlPlatform, PrefixSettings};
//! use table_prefix_core::{ClassMetadata, IndexDefinition, TableDefinition};
//!
//! let settings = PrefixSettings::from_yaml("prefix: app_\nbundles: ['App\\Entity']").unwrap();
//! let prefixer = IdentifierPrefixer::from_settings(&settings).unwrap();
//! let ctx = PlatformContext::new(&PostgreSqlPlatform, &DefaultQuoteStrategy);
//!
//! let mut metadata = ClassMetadata::new("App\\Entity\\User", "user").with_table(
//!     TableDefinition::new("user").with_index(IndexDefinition::named("idx_email", &["email"])),
//! );
//! prefixer.load_class_metadata(&mut metadata, &ctx).unwrap();
//!
//! assert_eq!(metadata.table_name(), "app_user");
//! assert_eq!(
//!     metadata.table.indexes.unwrap()[0].name.as_deref(),
//!     Some("app_idx_email"),
//! );
//! ```
//!
//! # Selection
//!
//! With no namespace filters every class is prefixed. Otherwise a class is
//! prefixed when its namespace contains one of the filters as a
//! case-sensitive substring. An empty prefix disables prefixing entirely.

mod config;
mod encoding;
mod error;
mod hook;
mod platform;
mod prefixer;

pub use config::{DEFAULT_ENCODING, DEFAULT_PREFIX, PrefixSettings};
pub use encoding::PrefixEncoding;
pub use error::{PrefixError, Result};
pub use hook::{MetadataHook, compile_all};
pub use platform::{
    DefaultQuoteStrategy, GenericPlatform, MySqlPlatform, Platform, PlatformContext,
    PlatformKind, PostgreSqlPlatform, QuoteError, QuoteStrategy,
};
pub use prefixer::{IdentifierPrefixer, PrefixConfig, PrefixOutcome, RenameSummary, SkipReason};
