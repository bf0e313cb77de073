//! Mapped-class metadata model for identifier prefixing.
//!
//! This crate defines the compiled metadata an ORM produces for each mapped
//! class:
//!
//! - [`ClassMetadata`] — one mapped class: namespace, primary table,
//!   associations, inheritance and identifier generation.
//! - [`TableDefinition`] — the primary table with its
//!   [`IndexDefinition`]s and [`UniqueConstraint`]s.
//! - [`AssociationMapping`] — a closed set of association kinds; only the
//!   owning side of a many-to-many carries a [`JoinTable`].
//! - [`SequenceDefinition`] / [`IdGenerator`] — sequence and generator state
//!   for sequence and identity strategies.
//! - [`MappingDocument`] — a serializable list of classes.
//!
//! Validation ([`validate_metadata`]) reports incomplete metadata such as
//! empty names or a sequence strategy without a sequence.
//!
//! # Example
//!
//! ```
//! use table_prefix_core::*;
//!
//! let metadata = ClassMetadata::new("App\\Entity\\User", "user")
//!     .with_table(
//!         TableDefinition::new("user")
//!             .with_index(IndexDefinition::named("idx_email", &["email"])),
//!     )
//!     .with_association(AssociationMapping::many_to_many_owning(
//!         "roles",
//!         "App\\Entity\\Role",
//!         "user_role",
//!     ));
//!
//! assert_eq!(metadata.namespace, "App\\Entity");
//! assert!(validate_metadata(&metadata).is_empty());
//! ```

mod package;
mod types;
mod validate;

pub use package::MappingDocument;
pub use types::*;
pub use validate::{MetadataError, validate_metadata};
