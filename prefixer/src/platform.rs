//! Database platform and quote strategy collaborators.
//!
//! The prefixer consults these only when it regenerates identifier
//! generators: the quote strategy turns a sequence definition into the
//! canonical, possibly quoted, sequence name for the active platform.

use table_prefix_core::{ClassMetadata, SequenceDefinition};
use thiserror::Error;

/// Errors raised while resolving a quoted schema object name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    /// The name to resolve is empty.
    #[error("identifier cannot be empty")]
    EmptyIdentifier,
    /// The name cannot be expressed on this platform.
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),
}

/// Known platform implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformKind {
    /// ANSI double-quote identifiers.
    #[default]
    Generic,
    /// PostgreSQL.
    PostgreSql,
    /// MySQL / MariaDB.
    MySql,
}

impl PlatformKind {
    /// Returns a platform instance of this kind.
    pub fn platform(self) -> Box<dyn Platform> {
        match self {
            Self::Generic => Box::new(GenericPlatform),
            Self::PostgreSql => Box::new(PostgreSqlPlatform),
            Self::MySql => Box::new(MySqlPlatform),
        }
    }
}

/// SQL dialect rules for naming schema objects.
///
/// # Examples
///
/// ```
/// use table_prefix::{MySqlPlatform, Platform, PostgreSqlPlatform};
///
/// assert_eq!(PostgreSqlPlatform.quote_identifier("public.app_user_id_seq"),
///            "\"public\".\"app_user_id_seq\"");
/// assert_eq!(MySqlPlatform.quote_identifier("app_user"), "`app_user`");
/// ```
pub trait Platform: Send + Sync {
    /// Platform name for diagnostics.
    fn name(&self) -> &'static str;

    /// Which known platform this is.
    fn kind(&self) -> PlatformKind;

    /// Character that opens and closes a quoted identifier.
    fn identifier_quote_character(&self) -> char {
        '"'
    }

    /// Quotes a single identifier part, doubling embedded quote characters.
    fn quote_single_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote_character();
        let escaped = name.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }

    /// Quotes a possibly schema-qualified identifier part by part.
    fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|part| self.quote_single_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Adjusts a generated schema element name to platform rules.
    fn fix_schema_element_name(&self, name: &str) -> String {
        name.to_string()
    }
}

/// ANSI SQL platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericPlatform;

impl Platform for GenericPlatform {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn kind(&self) -> PlatformKind {
        PlatformKind::Generic
    }
}

/// PostgreSQL platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgreSqlPlatform;

impl Platform for PostgreSqlPlatform {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn kind(&self) -> PlatformKind {
        PlatformKind::PostgreSql
    }
}

/// MySQL platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlPlatform;

impl Platform for MySqlPlatform {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn kind(&self) -> PlatformKind {
        PlatformKind::MySql
    }

    fn identifier_quote_character(&self) -> char {
        '`'
    }
}

/// Resolves the final form of schema object names.
pub trait QuoteStrategy: Send + Sync {
    /// Returns the canonical sequence name for `definition`.
    ///
    /// # Errors
    ///
    /// Returns a [`QuoteError`] when the name cannot be resolved.
    fn sequence_name(
        &self,
        definition: &SequenceDefinition,
        metadata: &ClassMetadata,
        platform: &dyn Platform,
    ) -> Result<String, QuoteError>;
}

/// Quotes a sequence name only when its definition is marked quoted.
///
/// # Examples
///
/// ```
/// use table_prefix::{DefaultQuoteStrategy, PostgreSqlPlatform, QuoteStrategy};
/// use table_prefix_core::{ClassMetadata, SequenceDefinition};
///
/// let metadata = ClassMetadata::new("App\\Entity\\User", "user");
/// let plain = SequenceDefinition::new("app_user_id_seq", 1);
/// let quoted = plain.clone().quoted();
///
/// let strategy = DefaultQuoteStrategy;
/// assert_eq!(strategy.sequence_name(&plain, &metadata, &PostgreSqlPlatform).unwrap(),
///            "app_user_id_seq");
/// assert_eq!(strategy.sequence_name(&quoted, &metadata, &PostgreSqlPlatform).unwrap(),
///            "\"app_user_id_seq\"");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultQuoteStrategy;

impl QuoteStrategy for DefaultQuoteStrategy {
    fn sequence_name(
        &self,
        definition: &SequenceDefinition,
        _metadata: &ClassMetadata,
        platform: &dyn Platform,
    ) -> Result<String, QuoteError> {
        if definition.sequence_name.is_empty() {
            return Err(QuoteError::EmptyIdentifier);
        }
        if definition.quoted {
            return Ok(platform.quote_identifier(&definition.sequence_name));
        }
        Ok(definition.sequence_name.clone())
    }
}

/// Platform accessor handed to each metadata compilation.
#[derive(Clone, Copy)]
pub struct PlatformContext<'a> {
    /// Active database platform.
    pub platform: &'a dyn Platform,
    /// Strategy resolving quoted names.
    pub quote_strategy: &'a dyn QuoteStrategy,
}

impl<'a> PlatformContext<'a> {
    /// Bundles a platform and a quote strategy.
    pub fn new(platform: &'a dyn Platform, quote_strategy: &'a dyn QuoteStrategy) -> Self {
        Self {
            platform,
            quote_strategy,
        }
    }
}

impl std::fmt::Debug for PlatformContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformContext")
            .field("platform", &self.platform.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_doubles_embedded_quotes() {
        assert_eq!(GenericPlatform.quote_single_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(MySqlPlatform.quote_single_identifier("a`b"), "`a``b`");
    }

    #[test]
    fn test_quote_identifier_splits_schema() {
        assert_eq!(
            MySqlPlatform.quote_identifier("shop.app_order"),
            "`shop`.`app_order`"
        );
    }

    #[test]
    fn test_platform_kind_roundtrip() {
        for kind in [PlatformKind::Generic, PlatformKind::PostgreSql, PlatformKind::MySql] {
            assert_eq!(kind.platform().kind(), kind);
        }
        assert_eq!(PlatformKind::PostgreSql.platform().name(), "postgresql");
    }

    #[test]
    fn test_fix_schema_element_name_is_identity_by_default() {
        assert_eq!(
            PostgreSqlPlatform.fix_schema_element_name("app_user_id_seq"),
            "app_user_id_seq"
        );
    }

    #[test]
    fn test_default_strategy_rejects_empty_name() {
        let metadata = ClassMetadata::new("App\\Entity\\User", "user");
        let definition = SequenceDefinition::new("", 1);
        assert_eq!(
            DefaultQuoteStrategy.sequence_name(&definition, &metadata, &GenericPlatform),
            Err(QuoteError::EmptyIdentifier)
        );
    }
}
