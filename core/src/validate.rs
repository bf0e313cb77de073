//! Structural validation of class metadata.
//!
//! Catches incomplete metadata (empty names, a sequence strategy without a
//! sequence, duplicate association fields) before it is handed to a schema
//! tool. Validation is advisory: the prefixer tolerates every finding here by
//! skipping the affected step.
//!
//! # Examples
//!
//! ```
//! use table_prefix_core::*;
//!
//! let metadata = ClassMetadata::new("App\\Entity\\User", "user")
//!     .with_sequence(SequenceDefinition::new("user_id_seq", 1));
//! assert!(validate_metadata(&metadata).is_empty());
//!
//! // Sequence strategy with no sequence declared
//! let mut broken = ClassMetadata::new("App\\Entity\\User", "user");
//! broken.id_generator_type = IdGeneratorType::Sequence;
//! assert_eq!(
//!     validate_metadata(&broken),
//!     vec![MetadataError::MissingSequenceDefinition("App\\Entity\\User".into())],
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{AssociationMapping, ClassMetadata};

/// Metadata validation findings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// Class name is empty or whitespace-only.
    #[error("class name cannot be empty")]
    EmptyClassName,
    /// Table name is empty.
    #[error("table name cannot be empty for class {0}")]
    EmptyTableName(String),
    /// An index declares an explicit but empty name.
    #[error("index name cannot be empty on table {0}")]
    EmptyIndexName(String),
    /// A unique constraint declares an explicit but empty name.
    #[error("unique constraint name cannot be empty on table {0}")]
    EmptyConstraintName(String),
    /// An owning many-to-many association has no join table name.
    #[error("join table name cannot be empty for association {0}")]
    EmptyJoinTableName(String),
    /// Two associations share a field name.
    #[error("duplicate association field: {0}")]
    DuplicateAssociation(String),
    /// The class uses the sequence strategy without a sequence definition.
    #[error("sequence strategy without sequence definition for class {0}")]
    MissingSequenceDefinition(String),
    /// The sequence definition allocates zero values per fetch.
    #[error("sequence {0} has an allocation size of zero")]
    ZeroAllocationSize(String),
}

/// Validates one class metadata record.
///
/// Findings are returned in the order the record is walked: class, table,
/// indexes, constraints, associations, sequence.
pub fn validate_metadata(metadata: &ClassMetadata) -> Vec<MetadataError> {
    let mut errors = Vec::new();

    if metadata.name.trim().is_empty() {
        errors.push(MetadataError::EmptyClassName);
    }
    if metadata.table.name.is_empty() {
        errors.push(MetadataError::EmptyTableName(metadata.name.clone()));
    }

    let table = &metadata.table.name;
    for index in metadata.table.indexes.iter().flatten() {
        if index.name.as_deref() == Some("") {
            errors.push(MetadataError::EmptyIndexName(table.clone()));
        }
    }
    for constraint in metadata.table.unique_constraints.iter().flatten() {
        if constraint.name.as_deref() == Some("") {
            errors.push(MetadataError::EmptyConstraintName(table.clone()));
        }
    }

    let mut seen_fields: HashSet<&str> = HashSet::new();
    for association in &metadata.associations {
        let field = association.field_name();
        if !seen_fields.insert(field) {
            errors.push(MetadataError::DuplicateAssociation(field.to_string()));
        }
        if let AssociationMapping::ManyToManyOwning { join_table, .. } = association {
            if join_table.name.is_empty() {
                errors.push(MetadataError::EmptyJoinTableName(field.to_string()));
            }
        }
    }

    if metadata.is_id_generator_sequence() {
        match &metadata.sequence_definition {
            None => errors.push(MetadataError::MissingSequenceDefinition(
                metadata.name.clone(),
            )),
            Some(def) if def.allocation_size == 0 => {
                errors.push(MetadataError::ZeroAllocationSize(def.sequence_name.clone()));
            }
            Some(_) => {}
        }
    }

    errors
}
