//! The identifier prefixer.
//!
//! [`IdentifierPrefixer`] decides whether a mapped class takes part in
//! prefixing and rewrites its table, index, unique constraint, join table and
//! sequence names in place. Every rename goes through
//! [`add_prefix`](IdentifierPrefixer::add_prefix), so running the prefixer
//! twice over the same metadata changes nothing the second time.
//!
//! # Example
//!
//! ```
//! use table_prefix::{DefaultQuoteStrategy, IdentifierPrefixer, PlatformContext, PostgreSqlPlatform};
//! use table_prefix_core::*;
//!
//! let prefixer = IdentifierPrefixer::new("app_", ["App\\Entity"], "UTF-8").unwrap();
//! let ctx = PlatformContext::new(&PostgreSqlPlatform, &DefaultQuoteStrategy);
//!
//! let mut user = ClassMetadata::new("App\\Entity\\User", "user")
//!     .with_association(AssociationMapping::many_to_many_owning(
//!         "roles",
//!         "App\\Entity\\Role",
//!         "user_role",
//!     ))
//!     .with_sequence(SequenceDefinition::new("user_id_seq", 1));
//!
//! prefixer.apply(&mut user, &ctx).unwrap();
//! assert_eq!(user.table_name(), "app_user");
//! assert_eq!(user.associations[0].join_table().unwrap().name, "app_user_role");
//! assert_eq!(
//!     user.id_generator,
//!     Some(IdGenerator::Sequence { sequence_name: "app_user_id_seq".into(), allocation_size: 1 }),
//! );
//! ```

use table_prefix_core::{ClassMetadata, IdGenerator, SequenceDefinition};
use tracing::{debug, trace, warn};

use crate::config::PrefixSettings;
use crate::encoding::PrefixEncoding;
use crate::error::{PrefixError, Result};
use crate::platform::{PlatformContext, PlatformKind};

/// Field type whose identity generator yields 64-bit values.
const BIGINT_TYPE: &str = "bigint";

/// Normalized, immutable prefixer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixConfig {
    prefix: String,
    namespace_filters: Vec<String>,
    encoding: PrefixEncoding,
    skip_inheritance_children: bool,
    legacy_identity_sequences: bool,
}

impl PrefixConfig {
    /// The prefix, already normalized to [`encoding`](Self::encoding).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Namespace filters in configuration order.
    pub fn namespace_filters(&self) -> &[String] {
        &self.namespace_filters
    }

    /// Target encoding of the prefix.
    pub fn encoding(&self) -> PrefixEncoding {
        self.encoding
    }

    /// Whether single-table-inheritance children are skipped.
    pub fn skip_inheritance_children(&self) -> bool {
        self.skip_inheritance_children
    }

    /// Whether PostgreSQL identity generators are regenerated.
    pub fn legacy_identity_sequences(&self) -> bool {
        self.legacy_identity_sequences
    }
}

/// Why a class was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The configured prefix is empty.
    EmptyPrefix,
    /// No namespace filter matched the class namespace.
    NamespaceFiltered,
    /// The class inherits its table from a single-table-inheritance root.
    InheritedTable,
}

/// Identifiers renamed in one class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameSummary {
    /// The primary table was renamed.
    pub table: bool,
    /// Number of renamed indexes.
    pub indexes: usize,
    /// Number of renamed unique constraints.
    pub unique_constraints: usize,
    /// Number of renamed join tables.
    pub join_tables: usize,
    /// The sequence definition and generator were rewritten.
    pub sequence: bool,
    /// The sequence name itself changed.
    pub sequence_renamed: bool,
    /// An identity generator was rebuilt from the prefixed table name.
    pub identity_sequence: bool,
}

impl RenameSummary {
    /// Total number of identifiers that changed name.
    pub fn renamed_count(&self) -> usize {
        usize::from(self.table)
            + self.indexes
            + self.unique_constraints
            + self.join_tables
            + usize::from(self.sequence_renamed)
    }
}

/// Result of running the prefixer over one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOutcome {
    /// The class was left untouched.
    Skipped(SkipReason),
    /// The class was selected and rewritten.
    Applied(RenameSummary),
}

impl PrefixOutcome {
    /// Returns `true` when the class was selected.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Rewrites physical identifiers of mapped classes to share a prefix.
///
/// Built once from configuration and never mutated afterwards, so one
/// instance can be shared by concurrent compilation passes.
///
/// # Examples
///
/// ```
/// use table_prefix::IdentifierPrefixer;
///
/// let prefixer = IdentifierPrefixer::new("app_", Vec::<String>::new(), "UTF-8").unwrap();
/// assert_eq!(prefixer.prefix(), "app_");
/// assert_eq!(prefixer.add_prefix("user"), "app_user");
/// assert_eq!(prefixer.add_prefix("app_user"), "app_user");
/// ```
#[derive(Debug, Clone)]
pub struct IdentifierPrefixer {
    config: PrefixConfig,
}

impl IdentifierPrefixer {
    /// Creates a prefixer, normalizing `prefix` into `encoding`.
    ///
    /// # Errors
    ///
    /// Returns [`PrefixError::UnsupportedEncoding`] for an unknown encoding
    /// label and [`PrefixError::UnmappablePrefix`] when the prefix cannot be
    /// represented in that encoding.
    pub fn new<I, S>(prefix: &str, namespace_filters: I, encoding: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let encoding = PrefixEncoding::for_label(encoding)?;
        let prefix = encoding.normalize(prefix)?;
        Ok(Self {
            config: PrefixConfig {
                prefix,
                namespace_filters: namespace_filters.into_iter().map(Into::into).collect(),
                encoding,
                skip_inheritance_children: false,
                legacy_identity_sequences: false,
            },
        })
    }

    /// Creates a prefixer from loaded settings.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn from_settings(settings: &PrefixSettings) -> Result<Self> {
        Ok(
            Self::new(&settings.prefix, settings.bundles.iter().cloned(), &settings.encoding)?
                .skip_inheritance_children(settings.skip_inheritance_children)
                .legacy_identity_sequences(settings.legacy_identity_sequences),
        )
    }

    /// Sets whether single-table-inheritance children are skipped.
    pub fn skip_inheritance_children(mut self, skip: bool) -> Self {
        self.config.skip_inheritance_children = skip;
        self
    }

    /// Sets whether PostgreSQL identity generators are regenerated.
    pub fn legacy_identity_sequences(mut self, enabled: bool) -> Self {
        self.config.legacy_identity_sequences = enabled;
        self
    }

    /// The normalized configuration.
    pub fn config(&self) -> &PrefixConfig {
        &self.config
    }

    /// The normalized prefix.
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    /// Namespace filters in configuration order.
    pub fn namespace_filters(&self) -> &[String] {
        &self.config.namespace_filters
    }

    /// Canonical name of the target encoding.
    pub fn encoding_name(&self) -> &'static str {
        self.config.encoding.name()
    }

    /// Encodes an identifier into the target encoding's bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PrefixError::UnmappableIdentifier`] when `name` cannot be
    /// represented in the target encoding.
    pub fn encode_identifier(&self, name: &str) -> Result<Vec<u8>> {
        self.config.encoding.encode(name)
    }

    /// Returns `true` when `metadata` takes part in prefixing.
    ///
    /// With no namespace filters every class is selected. Otherwise the
    /// class namespace must contain one of the filters as a case-sensitive
    /// substring.
    pub fn is_applicable(&self, metadata: &ClassMetadata) -> bool {
        self.config.namespace_filters.is_empty()
            || self
                .config
                .namespace_filters
                .iter()
                .any(|filter| metadata.namespace().contains(filter.as_str()))
    }

    /// Returns `name` with the prefix prepended, unless the prefix is empty
    /// or `name` already starts with it.
    pub fn add_prefix(&self, name: &str) -> String {
        if self.config.prefix.is_empty() || name.starts_with(&self.config.prefix) {
            return name.to_string();
        }
        format!("{}{}", self.config.prefix, name)
    }

    /// Runs selection and every rewrite step over one class.
    ///
    /// # Errors
    ///
    /// Returns [`PrefixError::SequenceRejected`] when the quote strategy
    /// fails to resolve the renamed sequence. Renames applied before the
    /// failure remain; the sequence definition and generator are untouched.
    pub fn apply(
        &self,
        metadata: &mut ClassMetadata,
        ctx: &PlatformContext<'_>,
    ) -> Result<PrefixOutcome> {
        if let Some(reason) = self.skip_reason(metadata) {
            debug!(class = %metadata.name, reason = ?reason, "Skipping class metadata");
            return Ok(PrefixOutcome::Skipped(reason));
        }

        let table = self.rewrite_table(metadata);
        let indexes = self.rewrite_indexes(metadata);
        let unique_constraints = self.rewrite_unique_constraints(metadata);
        let join_tables = self.rewrite_join_tables(metadata);
        let sequence_before = sequence_name(metadata).map(str::to_owned);
        let sequence = self.rewrite_sequence(metadata, ctx)?;
        let sequence_renamed = sequence && sequence_name(metadata) != sequence_before.as_deref();
        let identity_sequence = self.rewrite_identity_sequence(metadata, ctx)?;

        let summary = RenameSummary {
            table,
            indexes,
            unique_constraints,
            join_tables,
            sequence,
            sequence_renamed,
            identity_sequence,
        };
        debug!(
            class = %metadata.name,
            table = %metadata.table.name,
            renamed = summary.renamed_count(),
            sequence,
            "Prefixed class metadata"
        );
        Ok(PrefixOutcome::Applied(summary))
    }

    fn skip_reason(&self, metadata: &ClassMetadata) -> Option<SkipReason> {
        if self.config.prefix.is_empty() {
            return Some(SkipReason::EmptyPrefix);
        }
        if self.config.skip_inheritance_children
            && metadata.is_inheritance_type_single_table()
            && !metadata.is_root_entity()
        {
            return Some(SkipReason::InheritedTable);
        }
        if !self.is_applicable(metadata) {
            return Some(SkipReason::NamespaceFiltered);
        }
        None
    }

    /// Prefixes the primary table name. Returns `true` if it changed.
    pub fn rewrite_table(&self, metadata: &mut ClassMetadata) -> bool {
        let prefixed = self.add_prefix(metadata.table_name());
        if prefixed == metadata.table_name() {
            return false;
        }
        trace!(from = %metadata.table.name, to = %prefixed, "Renaming table");
        metadata.set_primary_table_name(prefixed);
        true
    }

    /// Prefixes every explicitly named index, keeping declaration order.
    /// Returns the number of renamed indexes.
    pub fn rewrite_indexes(&self, metadata: &mut ClassMetadata) -> usize {
        let Some(indexes) = metadata.table.indexes.as_mut() else {
            return 0;
        };
        indexes
            .iter_mut()
            .filter_map(|index| index.name.as_mut())
            .map(|name| self.rename(name, "index"))
            .filter(|&renamed| renamed)
            .count()
    }

    /// Prefixes every explicitly named unique constraint, keeping
    /// declaration order. Returns the number of renamed constraints.
    pub fn rewrite_unique_constraints(&self, metadata: &mut ClassMetadata) -> usize {
        let Some(constraints) = metadata.table.unique_constraints.as_mut() else {
            return 0;
        };
        constraints
            .iter_mut()
            .filter_map(|constraint| constraint.name.as_mut())
            .map(|name| self.rename(name, "unique constraint"))
            .filter(|&renamed| renamed)
            .count()
    }

    /// Prefixes the join table of every owning many-to-many association
    /// with a non-empty join table name. Returns the number renamed.
    pub fn rewrite_join_tables(&self, metadata: &mut ClassMetadata) -> usize {
        metadata
            .associations
            .iter_mut()
            .filter_map(|association| association.join_table_mut())
            .filter(|join_table| !join_table.name.is_empty())
            .map(|join_table| self.rename(&mut join_table.name, "join table"))
            .filter(|&renamed| renamed)
            .count()
    }

    /// Prefixes the sequence of a sequence-strategy class and installs a
    /// sequence generator bound to the quoted new name.
    ///
    /// Returns `Ok(false)` when the class does not use a sequence, has no
    /// sequence definition, or the prefix is empty.
    ///
    /// # Errors
    ///
    /// Returns [`PrefixError::SequenceRejected`] when the quote strategy
    /// fails; neither the definition nor the generator is changed then.
    pub fn rewrite_sequence(
        &self,
        metadata: &mut ClassMetadata,
        ctx: &PlatformContext<'_>,
    ) -> Result<bool> {
        if self.config.prefix.is_empty() || !metadata.is_id_generator_sequence() {
            return Ok(false);
        }
        let Some(current) = metadata.sequence_definition.as_ref() else {
            warn!(class = %metadata.name, "Sequence strategy without sequence definition");
            return Ok(false);
        };

        let mut updated = current.clone();
        updated.sequence_name = self.add_prefix(&current.sequence_name);

        let sequence_name = ctx
            .quote_strategy
            .sequence_name(&updated, metadata, ctx.platform)
            .map_err(|source| PrefixError::SequenceRejected {
                class: metadata.name.clone(),
                source,
            })?;

        trace!(
            class = %metadata.name,
            sequence = %sequence_name,
            allocation_size = updated.allocation_size,
            "Installing sequence generator"
        );
        let allocation_size = updated.allocation_size;
        metadata.set_sequence_definition(updated);
        metadata.set_id_generator(IdGenerator::Sequence {
            sequence_name,
            allocation_size,
        });
        Ok(true)
    }

    /// Rebuilds the identity generator of a PostgreSQL identity-strategy
    /// class from the implicit `{table}_{column}_seq` sequence of the
    /// prefixed table.
    ///
    /// Only runs when legacy identity sequences are enabled. Returns
    /// `Ok(false)` when the step does not apply or the identifier column is
    /// unknown.
    ///
    /// # Errors
    ///
    /// Returns [`PrefixError::SequenceRejected`] when the quote strategy
    /// fails; the generator is left unchanged then.
    pub fn rewrite_identity_sequence(
        &self,
        metadata: &mut ClassMetadata,
        ctx: &PlatformContext<'_>,
    ) -> Result<bool> {
        if !self.config.legacy_identity_sequences
            || self.config.prefix.is_empty()
            || ctx.platform.kind() != PlatformKind::PostgreSql
            || !metadata.is_id_generator_identity()
        {
            return Ok(false);
        }
        let Some(identifier) = metadata.identifier.as_ref() else {
            debug!(class = %metadata.name, "No identifier column, keeping identity generator");
            return Ok(false);
        };

        let implicit = format!("{}_{}_seq", metadata.table.name, identifier.column_name);
        let mut definition =
            SequenceDefinition::new(&ctx.platform.fix_schema_element_name(&implicit), 1);
        definition.quoted = identifier.quoted || metadata.table.quoted;
        let big_integer = identifier.field_type == BIGINT_TYPE;

        let sequence_name = ctx
            .quote_strategy
            .sequence_name(&definition, metadata, ctx.platform)
            .map_err(|source| PrefixError::SequenceRejected {
                class: metadata.name.clone(),
                source,
            })?;

        let sequence_name = Some(sequence_name);
        metadata.set_id_generator(if big_integer {
            IdGenerator::BigIntegerIdentity { sequence_name }
        } else {
            IdGenerator::Identity { sequence_name }
        });
        Ok(true)
    }

    fn rename(&self, name: &mut String, kind: &'static str) -> bool {
        let prefixed = self.add_prefix(name);
        if prefixed == *name {
            return false;
        }
        trace!(kind, from = %name, to = %prefixed, "Renaming identifier");
        *name = prefixed;
        true
    }
}

fn sequence_name(metadata: &ClassMetadata) -> Option<&str> {
    metadata
        .sequence_definition
        .as_ref()
        .map(|definition| definition.sequence_name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{
        DefaultQuoteStrategy, GenericPlatform, Platform, PostgreSqlPlatform, QuoteError,
        QuoteStrategy,
    };
    use table_prefix_core::{
        AssociationMapping, IdentifierField, IndexDefinition, InheritanceType, TableDefinition,
        UniqueConstraint,
    };

    struct RejectingQuoteStrategy;

    impl QuoteStrategy for RejectingQuoteStrategy {
        fn sequence_name(
            &self,
            definition: &SequenceDefinition,
            _metadata: &ClassMetadata,
            _platform: &dyn Platform,
        ) -> std::result::Result<String, QuoteError> {
            Err(QuoteError::InvalidIdentifier(definition.sequence_name.clone()))
        }
    }

    fn prefixer(prefix: &str) -> IdentifierPrefixer {
        IdentifierPrefixer::new(prefix, Vec::<String>::new(), "UTF-8").unwrap()
    }

    fn generic() -> PlatformContext<'static> {
        PlatformContext::new(&GenericPlatform, &DefaultQuoteStrategy)
    }

    fn postgres() -> PlatformContext<'static> {
        PlatformContext::new(&PostgreSqlPlatform, &DefaultQuoteStrategy)
    }

    fn user(table: &str) -> ClassMetadata {
        ClassMetadata::new("App\\Entity\\User", table)
    }

    #[test]
    fn test_add_prefix() {
        let p = prefixer("app_");
        assert_eq!(p.add_prefix("user"), "app_user");
        assert_eq!(p.add_prefix("app_user"), "app_user");
        assert_eq!(p.add_prefix(""), "app_");
        assert_eq!(prefixer("").add_prefix("user"), "user");
    }

    #[test]
    fn test_add_prefix_is_case_sensitive() {
        assert_eq!(prefixer("app_").add_prefix("APP_user"), "app_APP_user");
    }

    #[test]
    fn test_is_applicable_without_filters() {
        let p = prefixer("app_");
        assert!(p.is_applicable(&user("user")));
        assert!(p.is_applicable(&user("user").with_namespace("")));
    }

    #[test]
    fn test_is_applicable_substring_match() {
        let p = IdentifierPrefixer::new("app_", ["Entity", "Acme"], "UTF-8").unwrap();
        assert!(p.is_applicable(&user("user")));
        assert!(p.is_applicable(&user("user").with_namespace("Acme\\Blog\\Model")));
        assert!(p.is_applicable(&user("user").with_namespace("Vendor\\Bundle\\Entity")));
        assert!(!p.is_applicable(&user("user").with_namespace("Vendor\\Model")));
        assert!(!p.is_applicable(&user("user").with_namespace("app\\entity")));
    }

    #[test]
    fn test_rewrite_table_reports_change() {
        let p = prefixer("app_");
        let mut m = user("user");
        assert!(p.rewrite_table(&mut m));
        assert!(!p.rewrite_table(&mut m));
        assert_eq!(m.table_name(), "app_user");
    }

    #[test]
    fn test_rewrite_indexes_skips_anonymous() {
        let p = prefixer("app_");
        let mut m = user("user").with_table(
            TableDefinition::new("user")
                .with_index(IndexDefinition::named("idx_email", &["email"]))
                .with_index(IndexDefinition::anonymous(&["created_at"]))
                .with_index(IndexDefinition::named("app_idx_slug", &["slug"])),
        );

        assert_eq!(p.rewrite_indexes(&mut m), 1);
        let names: Vec<_> = m
            .table
            .indexes
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(
            names,
            vec![Some("app_idx_email".into()), None, Some("app_idx_slug".into())]
        );
    }

    #[test]
    fn test_rewrite_missing_collections_is_noop() {
        let p = prefixer("app_");
        let mut m = user("user");
        assert_eq!(p.rewrite_indexes(&mut m), 0);
        assert_eq!(p.rewrite_unique_constraints(&mut m), 0);
        assert!(m.table.indexes.is_none());
        assert!(m.table.unique_constraints.is_none());
    }

    #[test]
    fn test_rewrite_unique_constraints_keeps_columns() {
        let p = prefixer("app_");
        let mut m = user("user").with_table(
            TableDefinition::new("user")
                .with_unique_constraint(UniqueConstraint::named("uniq_email", &["email"])),
        );
        assert_eq!(p.rewrite_unique_constraints(&mut m), 1);
        assert_eq!(
            m.table.unique_constraints.unwrap(),
            vec![UniqueConstraint::named("app_uniq_email", &["email"])]
        );
    }

    #[test]
    fn test_rewrite_join_tables_filters_associations() {
        let p = prefixer("app_");
        let mut m = user("user")
            .with_association(AssociationMapping::many_to_many_owning("roles", "Role", "user_role"))
            .with_association(AssociationMapping::many_to_many_inverse("groups", "Group", "users"))
            .with_association(AssociationMapping::many_to_one("team", "Team"))
            .with_association(AssociationMapping::many_to_many_owning("tags", "Tag", ""));

        assert_eq!(p.rewrite_join_tables(&mut m), 1);
        assert_eq!(m.associations[0].join_table().unwrap().name, "app_user_role");
        assert_eq!(m.associations[3].join_table().unwrap().name, "");
    }

    #[test]
    fn test_rewrite_sequence_installs_generator() {
        let p = prefixer("app_");
        let mut m = user("user").with_sequence(SequenceDefinition::new("user_id_seq", 5));

        assert!(p.rewrite_sequence(&mut m, &generic()).unwrap());
        let def = m.sequence_definition.as_ref().unwrap();
        assert_eq!(def.sequence_name, "app_user_id_seq");
        assert_eq!(def.allocation_size, 5);
        assert_eq!(
            m.id_generator,
            Some(IdGenerator::Sequence {
                sequence_name: "app_user_id_seq".into(),
                allocation_size: 5,
            })
        );
    }

    #[test]
    fn test_rewrite_sequence_quotes_through_strategy() {
        let p = prefixer("app_");
        let mut m =
            user("user").with_sequence(SequenceDefinition::new("user_id_seq", 1).quoted());

        p.rewrite_sequence(&mut m, &postgres()).unwrap();
        assert_eq!(
            m.id_generator,
            Some(IdGenerator::Sequence {
                sequence_name: "\"app_user_id_seq\"".into(),
                allocation_size: 1,
            })
        );
        assert_eq!(
            m.sequence_definition.unwrap().sequence_name,
            "app_user_id_seq"
        );
    }

    #[test]
    fn test_rewrite_sequence_without_definition_is_noop() {
        let p = prefixer("app_");
        let mut m = user("user");
        m.id_generator_type = table_prefix_core::IdGeneratorType::Sequence;

        assert!(!p.rewrite_sequence(&mut m, &generic()).unwrap());
        assert!(m.id_generator.is_none());
    }

    #[test]
    fn test_rewrite_sequence_ignores_other_strategies() {
        let p = prefixer("app_");
        let mut m = user("user").with_identity();
        m.sequence_definition = Some(SequenceDefinition::new("user_id_seq", 1));

        assert!(!p.rewrite_sequence(&mut m, &generic()).unwrap());
        assert_eq!(
            m.sequence_definition.unwrap().sequence_name,
            "user_id_seq"
        );
    }

    #[test]
    fn test_rejected_sequence_leaves_sequence_untouched() {
        let p = prefixer("app_");
        let ctx = PlatformContext::new(&GenericPlatform, &RejectingQuoteStrategy);
        let mut m = user("user")
            .with_association(AssociationMapping::many_to_many_owning("roles", "Role", "user_role"))
            .with_sequence(SequenceDefinition::new("user_id_seq", 1));

        let err = p.apply(&mut m, &ctx).unwrap_err();
        assert!(matches!(
            err,
            PrefixError::SequenceRejected { ref class, .. } if class == "App\\Entity\\User"
        ));
        assert_eq!(m.table_name(), "app_user");
        assert_eq!(m.associations[0].join_table().unwrap().name, "app_user_role");
        assert_eq!(m.sequence_definition.unwrap().sequence_name, "user_id_seq");
        assert!(m.id_generator.is_none());
    }

    #[test]
    fn test_apply_skips_filtered_namespace() {
        let p = IdentifierPrefixer::new("app_", ["App\\Entity"], "UTF-8").unwrap();
        let mut m = ClassMetadata::new("Vendor\\Bundle\\Entity\\User", "user")
            .with_sequence(SequenceDefinition::new("user_id_seq", 1));
        let before = m.clone();

        let outcome = p.apply(&mut m, &generic()).unwrap();
        assert_eq!(outcome, PrefixOutcome::Skipped(SkipReason::NamespaceFiltered));
        assert_eq!(m, before);
    }

    #[test]
    fn test_apply_with_empty_prefix_changes_nothing() {
        let p = prefixer("");
        let mut m = user("user")
            .with_table(
                TableDefinition::new("user")
                    .with_index(IndexDefinition::named("idx_email", &["email"])),
            )
            .with_sequence(SequenceDefinition::new("user_id_seq", 1));
        let before = m.clone();

        let outcome = p.apply(&mut m, &generic()).unwrap();
        assert_eq!(outcome, PrefixOutcome::Skipped(SkipReason::EmptyPrefix));
        assert_eq!(m, before);
    }

    #[test]
    fn test_apply_summary() {
        let p = prefixer("app_");
        let mut m = user("user")
            .with_table(
                TableDefinition::new("user")
                    .with_index(IndexDefinition::named("idx_email", &["email"]))
                    .with_index(IndexDefinition::named("idx_username", &["username"]))
                    .with_unique_constraint(UniqueConstraint::named("uniq_email", &["email"])),
            )
            .with_association(AssociationMapping::many_to_many_owning("roles", "Role", "user_role"))
            .with_sequence(SequenceDefinition::new("user_id_seq", 1));

        let outcome = p.apply(&mut m, &generic()).unwrap();
        let PrefixOutcome::Applied(summary) = outcome else {
            panic!("expected class to be prefixed, got {outcome:?}");
        };
        assert!(summary.table);
        assert_eq!(summary.indexes, 2);
        assert_eq!(summary.unique_constraints, 1);
        assert_eq!(summary.join_tables, 1);
        assert!(summary.sequence);
        assert!(summary.sequence_renamed);
        assert!(!summary.identity_sequence);
        assert_eq!(summary.renamed_count(), 6);

        let outcome = p.apply(&mut m, &generic()).unwrap();
        let PrefixOutcome::Applied(again) = outcome else {
            panic!("expected class to be prefixed, got {outcome:?}");
        };
        assert!(again.sequence);
        assert!(!again.sequence_renamed);
        assert_eq!(again.renamed_count(), 0);
    }

    #[test]
    fn test_undeclared_namespace_is_derived_for_filters() {
        let p = IdentifierPrefixer::new("app_", ["App\\Entity"], "UTF-8").unwrap();
        let mut m = ClassMetadata {
            name: "App\\Entity\\User".into(),
            table: TableDefinition::new("user"),
            ..Default::default()
        };
        assert!(m.namespace.is_empty());

        assert!(p.is_applicable(&m));
        assert!(p.apply(&mut m, &generic()).unwrap().is_applied());
        assert_eq!(m.table_name(), "app_user");
    }

    #[test]
    fn test_single_table_child_is_prefixed_by_default() {
        let p = prefixer("app_");
        let mut child = ClassMetadata::new("App\\Entity\\Admin", "app_user")
            .with_inheritance(InheritanceType::SingleTable, "App\\Entity\\User");

        assert!(p.apply(&mut child, &generic()).unwrap().is_applied());
        assert_eq!(child.table_name(), "app_user");
    }

    #[test]
    fn test_single_table_child_skipped_when_configured() {
        let p = prefixer("app_").skip_inheritance_children(true);
        let mut child = ClassMetadata::new("App\\Entity\\Admin", "admin_override")
            .with_inheritance(InheritanceType::SingleTable, "App\\Entity\\User");
        let mut root = ClassMetadata::new("App\\Entity\\User", "user")
            .with_inheritance(InheritanceType::SingleTable, "App\\Entity\\User");
        let mut joined = ClassMetadata::new("App\\Entity\\Editor", "editor")
            .with_inheritance(InheritanceType::Joined, "App\\Entity\\User");

        assert_eq!(
            p.apply(&mut child, &generic()).unwrap(),
            PrefixOutcome::Skipped(SkipReason::InheritedTable)
        );
        assert_eq!(child.table_name(), "admin_override");

        assert!(p.apply(&mut root, &generic()).unwrap().is_applied());
        assert_eq!(root.table_name(), "app_user");

        assert!(p.apply(&mut joined, &generic()).unwrap().is_applied());
        assert_eq!(joined.table_name(), "app_editor");
    }

    #[test]
    fn test_legacy_identity_sequence_on_postgres() {
        let p = prefixer("app_").legacy_identity_sequences(true);
        let mut m = user("user")
            .with_identity()
            .with_identifier(IdentifierField::new("id", "id", "integer"));

        let outcome = p.apply(&mut m, &postgres()).unwrap();
        let PrefixOutcome::Applied(summary) = outcome else {
            panic!("expected class to be prefixed, got {outcome:?}");
        };
        assert!(summary.identity_sequence);
        assert_eq!(
            m.id_generator,
            Some(IdGenerator::Identity {
                sequence_name: Some("app_user_id_seq".into())
            })
        );
    }

    #[test]
    fn test_legacy_identity_sequence_bigint_and_quoted() {
        let p = prefixer("app_").legacy_identity_sequences(true);
        let mut m = user("user")
            .with_identity()
            .with_identifier(IdentifierField::new("id", "user_id", "bigint"));
        m.table.quoted = true;

        p.apply(&mut m, &postgres()).unwrap();
        assert_eq!(
            m.id_generator,
            Some(IdGenerator::BigIntegerIdentity {
                sequence_name: Some("\"app_user_user_id_seq\"".into())
            })
        );
    }

    #[test]
    fn test_legacy_identity_sequence_only_on_postgres() {
        let p = prefixer("app_").legacy_identity_sequences(true);
        let mut m = user("user")
            .with_identity()
            .with_identifier(IdentifierField::new("id", "id", "integer"));

        p.apply(&mut m, &generic()).unwrap();
        assert!(m.id_generator.is_none());
    }

    #[test]
    fn test_legacy_identity_sequence_disabled_by_default() {
        let p = prefixer("app_");
        let mut m = user("user")
            .with_identity()
            .with_identifier(IdentifierField::new("id", "id", "integer"));

        p.apply(&mut m, &postgres()).unwrap();
        assert!(m.id_generator.is_none());
    }

    #[test]
    fn test_legacy_identity_sequence_without_identifier() {
        let p = prefixer("app_").legacy_identity_sequences(true);
        let mut m = user("user").with_identity();

        assert!(!p.rewrite_identity_sequence(&mut m, &postgres()).unwrap());
        assert!(m.id_generator.is_none());
    }

    #[test]
    fn test_from_settings() {
        let settings = PrefixSettings {
            prefix: "app_".into(),
            bundles: vec!["App\\Entity".into()],
            encoding: "utf-8".into(),
            skip_inheritance_children: true,
            legacy_identity_sequences: true,
        };
        let p = IdentifierPrefixer::from_settings(&settings).unwrap();
        assert_eq!(p.prefix(), "app_");
        assert_eq!(p.namespace_filters(), ["App\\Entity".to_string()]);
        assert_eq!(p.encoding_name(), "UTF-8");
        assert!(p.config().skip_inheritance_children());
        assert!(p.config().legacy_identity_sequences());
    }

    #[test]
    fn test_construction_rejects_bad_encoding() {
        let err = IdentifierPrefixer::new("app_", Vec::<String>::new(), "nope").unwrap_err();
        assert!(matches!(err, PrefixError::UnsupportedEncoding(_)));

        let err =
            IdentifierPrefixer::new("🚀_", Vec::<String>::new(), "windows-1252").unwrap_err();
        assert!(matches!(err, PrefixError::UnmappablePrefix { .. }));
    }
}
