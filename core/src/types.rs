//! Mapped-class metadata type definitions.
//!
//! This module defines the data model an ORM compiles for every mapped class:
//! the primary table with its indexes and unique constraints, the association
//! mappings, and the identifier generation strategy. The types are designed
//! for serialization with [`serde`] so metadata can round-trip through JSON
//! and YAML documents.

use serde::{Deserialize, Serialize};

/// Separator between namespace segments in a fully qualified class name.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Inheritance mapping strategy of a class hierarchy.
///
/// # Examples
///
/// ```
/// use table_prefix_core::InheritanceType;
///
/// assert_eq!(InheritanceType::default(), InheritanceType::None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InheritanceType {
    /// The class is not part of a mapped hierarchy (the default).
    #[default]
    None,
    /// All classes of the hierarchy share the root's table.
    SingleTable,
    /// Every class has its own table joined to the parent's.
    Joined,
    /// Every concrete class has a complete table of its own.
    TablePerClass,
}

/// Strategy used to produce primary-key values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdGeneratorType {
    /// No generation; the class has no generated identifier (the default).
    #[default]
    None,
    /// Values are drawn from a database sequence.
    Sequence,
    /// Values come from an engine-native auto-increment column.
    Identity,
    /// The application assigns identifiers itself.
    Assigned,
    /// A user-supplied generator.
    Custom,
}

/// Secondary index declared on a table.
///
/// An index without a `name` is anonymous; the engine or the schema tool
/// picks its name later.
///
/// # Examples
///
/// ```
/// use table_prefix_core::IndexDefinition;
///
/// let idx = IndexDefinition::named("idx_email", &["email"]);
/// assert_eq!(idx.name.as_deref(), Some("idx_email"));
/// assert_eq!(idx.columns, vec!["email"]);
///
/// let anon = IndexDefinition::anonymous(&["created_at"]);
/// assert!(anon.name.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Explicit index name, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Indexed columns, in key order.
    pub columns: Vec<String>,
    /// Engine-specific flags (e.g. `fulltext`, `spatial`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
}

impl IndexDefinition {
    /// Creates an index with an explicit name.
    pub fn named(name: &str, columns: &[&str]) -> Self {
        Self {
            name: Some(name.to_string()),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            flags: Vec::new(),
        }
    }

    /// Creates an index without an explicit name.
    pub fn anonymous(columns: &[&str]) -> Self {
        Self {
            name: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            flags: Vec::new(),
        }
    }

    /// Adds an engine-specific flag.
    pub fn with_flag(mut self, flag: &str) -> Self {
        self.flags.push(flag.to_string());
        self
    }
}

/// Unique constraint declared on a table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UniqueConstraint {
    /// Explicit constraint name, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Columns covered by the constraint.
    pub columns: Vec<String>,
}

impl UniqueConstraint {
    /// Creates a constraint with an explicit name.
    pub fn named(name: &str, columns: &[&str]) -> Self {
        Self {
            name: Some(name.to_string()),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Creates a constraint without an explicit name.
    pub fn anonymous(columns: &[&str]) -> Self {
        Self {
            name: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Primary table of a mapped class.
///
/// `indexes` and `unique_constraints` distinguish "not declared" (`None`)
/// from "declared but empty" (`Some(vec![])`).
///
/// # Examples
///
/// ```
/// use table_prefix_core::{IndexDefinition, TableDefinition};
///
/// let table = TableDefinition::new("user")
///     .with_index(IndexDefinition::named("idx_email", &["email"]));
/// assert_eq!(table.name, "user");
/// assert_eq!(table.indexes.as_ref().map(Vec::len), Some(1));
/// assert!(table.unique_constraints.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Physical table name.
    pub name: String,
    /// Database schema the table lives in, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Whether the table name must be quoted.
    #[serde(default)]
    pub quoted: bool,
    /// Declared indexes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexes: Option<Vec<IndexDefinition>>,
    /// Declared unique constraints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_constraints: Option<Vec<UniqueConstraint>>,
}

impl TableDefinition {
    /// Creates a table definition with the given physical name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds an index.
    pub fn with_index(mut self, index: IndexDefinition) -> Self {
        self.indexes.get_or_insert_with(Vec::new).push(index);
        self
    }

    /// Adds a unique constraint.
    pub fn with_unique_constraint(mut self, constraint: UniqueConstraint) -> Self {
        self.unique_constraints
            .get_or_insert_with(Vec::new)
            .push(constraint);
        self
    }
}

/// Join column of a join table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinColumn {
    /// Column name in the join table.
    pub name: String,
    /// Referenced column on the related table.
    pub referenced_column_name: String,
}

impl JoinColumn {
    /// Creates a join column.
    pub fn new(name: &str, referenced_column_name: &str) -> Self {
        Self {
            name: name.to_string(),
            referenced_column_name: referenced_column_name.to_string(),
        }
    }
}

/// Join table physically declared by the owning side of a many-to-many
/// association.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JoinTable {
    /// Physical join table name. May be empty in incomplete metadata.
    #[serde(default)]
    pub name: String,
    /// Columns referencing the owning class.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub join_columns: Vec<JoinColumn>,
    /// Columns referencing the target class.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inverse_join_columns: Vec<JoinColumn>,
}

impl JoinTable {
    /// Creates a join table with no columns declared.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// Association from a mapped class to another mapped class.
///
/// Only [`ManyToManyOwning`](AssociationMapping::ManyToManyOwning) carries a
/// join table; no other kind of association declares one.
///
/// # Examples
///
/// ```
/// use table_prefix_core::AssociationMapping;
///
/// let roles = AssociationMapping::many_to_many_owning("roles", "App\\Entity\\Role", "user_role");
/// assert_eq!(roles.field_name(), "roles");
/// assert_eq!(roles.join_table().map(|t| t.name.as_str()), Some("user_role"));
///
/// let author = AssociationMapping::many_to_one("author", "App\\Entity\\User");
/// assert!(author.join_table().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssociationMapping {
    /// Single-valued association to a single related object.
    OneToOne {
        field_name: String,
        target_entity: String,
        #[serde(default)]
        owning: bool,
    },
    /// Collection on the inverse side of a many-to-one.
    OneToMany {
        field_name: String,
        target_entity: String,
        mapped_by: String,
    },
    /// Foreign key from this class to the target.
    ManyToOne {
        field_name: String,
        target_entity: String,
    },
    /// Many-to-many association that declares the join table.
    ManyToManyOwning {
        field_name: String,
        target_entity: String,
        join_table: JoinTable,
    },
    /// Many-to-many association mapped by the other side's join table.
    ManyToManyInverse {
        field_name: String,
        target_entity: String,
        mapped_by: String,
    },
}

impl AssociationMapping {
    /// Creates an owning-side many-to-many association.
    pub fn many_to_many_owning(field_name: &str, target_entity: &str, join_table: &str) -> Self {
        Self::ManyToManyOwning {
            field_name: field_name.to_string(),
            target_entity: target_entity.to_string(),
            join_table: JoinTable::new(join_table),
        }
    }

    /// Creates an inverse-side many-to-many association.
    pub fn many_to_many_inverse(field_name: &str, target_entity: &str, mapped_by: &str) -> Self {
        Self::ManyToManyInverse {
            field_name: field_name.to_string(),
            target_entity: target_entity.to_string(),
            mapped_by: mapped_by.to_string(),
        }
    }

    /// Creates a many-to-one association.
    pub fn many_to_one(field_name: &str, target_entity: &str) -> Self {
        Self::ManyToOne {
            field_name: field_name.to_string(),
            target_entity: target_entity.to_string(),
        }
    }

    /// Creates a one-to-many association.
    pub fn one_to_many(field_name: &str, target_entity: &str, mapped_by: &str) -> Self {
        Self::OneToMany {
            field_name: field_name.to_string(),
            target_entity: target_entity.to_string(),
            mapped_by: mapped_by.to_string(),
        }
    }

    /// Creates a one-to-one association.
    pub fn one_to_one(field_name: &str, target_entity: &str, owning: bool) -> Self {
        Self::OneToOne {
            field_name: field_name.to_string(),
            target_entity: target_entity.to_string(),
            owning,
        }
    }

    /// Returns the mapped field name.
    pub fn field_name(&self) -> &str {
        match self {
            Self::OneToOne { field_name, .. }
            | Self::OneToMany { field_name, .. }
            | Self::ManyToOne { field_name, .. }
            | Self::ManyToManyOwning { field_name, .. }
            | Self::ManyToManyInverse { field_name, .. } => field_name,
        }
    }

    /// Returns the target class name.
    pub fn target_entity(&self) -> &str {
        match self {
            Self::OneToOne { target_entity, .. }
            | Self::OneToMany { target_entity, .. }
            | Self::ManyToOne { target_entity, .. }
            | Self::ManyToManyOwning { target_entity, .. }
            | Self::ManyToManyInverse { target_entity, .. } => target_entity,
        }
    }

    /// Returns the join table when this is an owning many-to-many mapping.
    pub fn join_table(&self) -> Option<&JoinTable> {
        match self {
            Self::ManyToManyOwning { join_table, .. } => Some(join_table),
            _ => None,
        }
    }

    /// Mutable access to the join table of an owning many-to-many mapping.
    pub fn join_table_mut(&mut self) -> Option<&mut JoinTable> {
        match self {
            Self::ManyToManyOwning { join_table, .. } => Some(join_table),
            _ => None,
        }
    }
}

/// Sequence backing a sequence-based identifier strategy.
///
/// # Examples
///
/// ```
/// use table_prefix_core::SequenceDefinition;
///
/// let seq = SequenceDefinition::new("user_id_seq", 1);
/// assert_eq!(seq.sequence_name, "user_id_seq");
/// assert_eq!(seq.initial_value, 1);
/// assert!(!seq.quoted);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDefinition {
    /// Sequence name as declared in the mapping.
    pub sequence_name: String,
    /// Number of values fetched per round trip.
    pub allocation_size: u32,
    /// First value handed out by the sequence.
    #[serde(default = "default_initial_value")]
    pub initial_value: u32,
    /// Whether the sequence name must be quoted.
    #[serde(default)]
    pub quoted: bool,
}

fn default_initial_value() -> u32 {
    1
}

impl SequenceDefinition {
    /// Creates an unquoted sequence definition starting at 1.
    pub fn new(sequence_name: &str, allocation_size: u32) -> Self {
        Self {
            sequence_name: sequence_name.to_string(),
            allocation_size,
            initial_value: default_initial_value(),
            quoted: false,
        }
    }

    /// Marks the sequence name as quoted.
    pub fn quoted(mut self) -> Self {
        self.quoted = true;
        self
    }
}

/// Generator object installed on the metadata to produce primary keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdGenerator {
    /// Draws values from the named (already quoted) sequence.
    Sequence {
        sequence_name: String,
        allocation_size: u32,
    },
    /// Reads back the engine-assigned value after insert.
    Identity {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sequence_name: Option<String>,
    },
    /// Like [`Identity`](IdGenerator::Identity), returning 64-bit values.
    BigIntegerIdentity {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sequence_name: Option<String>,
    },
    /// Identifiers are assigned by the application.
    Assigned,
}

/// Single-column identifier of a mapped class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierField {
    /// Mapped field name.
    pub field_name: String,
    /// Physical column name.
    pub column_name: String,
    /// Mapping type name (e.g. `integer`, `bigint`).
    #[serde(default = "default_field_type")]
    pub field_type: String,
    /// Whether the column name must be quoted.
    #[serde(default)]
    pub quoted: bool,
}

fn default_field_type() -> String {
    "integer".to_string()
}

impl IdentifierField {
    /// Creates an unquoted identifier field.
    pub fn new(field_name: &str, column_name: &str, field_type: &str) -> Self {
        Self {
            field_name: field_name.to_string(),
            column_name: column_name.to_string(),
            field_type: field_type.to_string(),
            quoted: false,
        }
    }
}

/// Compiled metadata of one mapped class.
///
/// This is the record an ORM hands to its metadata-loading hook. The fields
/// are public so hosts can build and inspect metadata directly; the setters
/// mirror the mutation points a hook is expected to use.
///
/// # Examples
///
/// ```
/// use table_prefix_core::*;
///
/// let metadata = ClassMetadata::new("App\\Entity\\User", "user")
///     .with_association(AssociationMapping::many_to_many_owning(
///         "roles",
///         "App\\Entity\\Role",
///         "user_role",
///     ))
///     .with_sequence(SequenceDefinition::new("user_id_seq", 1));
///
/// assert_eq!(metadata.namespace, "App\\Entity");
/// assert_eq!(metadata.table_name(), "user");
/// assert!(metadata.is_root_entity());
/// assert!(metadata.is_id_generator_sequence());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassMetadata {
    /// Fully qualified class name.
    pub name: String,
    /// Namespace of the class. An empty value is derived from `name`; read
    /// it through [`namespace`](Self::namespace).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Root class of the inheritance hierarchy (the class itself when not
    /// inherited). An empty value is treated as the class itself.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub root_entity_name: String,
    /// Primary table.
    pub table: TableDefinition,
    /// Association mappings, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associations: Vec<AssociationMapping>,
    /// Inheritance mapping strategy.
    #[serde(default)]
    pub inheritance: InheritanceType,
    /// Identifier generation strategy.
    #[serde(default)]
    pub id_generator_type: IdGeneratorType,
    /// Sequence backing a sequence strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_definition: Option<SequenceDefinition>,
    /// Installed generator object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_generator: Option<IdGenerator>,
    /// Single-column identifier, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<IdentifierField>,
}

impl ClassMetadata {
    /// Creates metadata for `class_name` mapped to `table_name`.
    ///
    /// The namespace is everything before the last `\` of the class name.
    pub fn new(class_name: &str, table_name: &str) -> Self {
        Self {
            name: class_name.to_string(),
            namespace: namespace_of(class_name).to_string(),
            root_entity_name: class_name.to_string(),
            table: TableDefinition::new(table_name),
            ..Default::default()
        }
    }

    /// Returns the class namespace, falling back to the part of `name`
    /// before the last `\` when none was declared.
    pub fn namespace(&self) -> &str {
        if self.namespace.is_empty() {
            return namespace_of(&self.name);
        }
        &self.namespace
    }

    /// Returns the physical table name.
    pub fn table_name(&self) -> &str {
        &self.table.name
    }

    /// Replaces the physical table name.
    pub fn set_primary_table_name(&mut self, name: impl Into<String>) {
        self.table.name = name.into();
    }

    /// Replaces the sequence definition.
    pub fn set_sequence_definition(&mut self, definition: SequenceDefinition) {
        self.sequence_definition = Some(definition);
    }

    /// Installs an identifier generator.
    pub fn set_id_generator(&mut self, generator: IdGenerator) {
        self.id_generator = Some(generator);
    }

    /// Returns `true` when this class is the root of its hierarchy.
    pub fn is_root_entity(&self) -> bool {
        self.root_entity_name.is_empty() || self.root_entity_name == self.name
    }

    /// Returns `true` for single-table-inheritance hierarchies.
    pub fn is_inheritance_type_single_table(&self) -> bool {
        self.inheritance == InheritanceType::SingleTable
    }

    /// Returns `true` when identifiers come from a sequence.
    pub fn is_id_generator_sequence(&self) -> bool {
        self.id_generator_type == IdGeneratorType::Sequence
    }

    /// Returns `true` when identifiers come from an identity column.
    pub fn is_id_generator_identity(&self) -> bool {
        self.id_generator_type == IdGeneratorType::Identity
    }

    /// Replaces the namespace.
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    /// Replaces the primary table definition.
    pub fn with_table(mut self, table: TableDefinition) -> Self {
        self.table = table;
        self
    }

    /// Adds an association mapping.
    pub fn with_association(mut self, association: AssociationMapping) -> Self {
        self.associations.push(association);
        self
    }

    /// Sets the identifier field.
    pub fn with_identifier(mut self, identifier: IdentifierField) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Switches to the sequence strategy backed by `definition`.
    pub fn with_sequence(mut self, definition: SequenceDefinition) -> Self {
        self.id_generator_type = IdGeneratorType::Sequence;
        self.sequence_definition = Some(definition);
        self
    }

    /// Switches to the identity strategy.
    pub fn with_identity(mut self) -> Self {
        self.id_generator_type = IdGeneratorType::Identity;
        self
    }

    /// Places the class in a hierarchy rooted at `root_entity_name`.
    pub fn with_inheritance(mut self, inheritance: InheritanceType, root_entity_name: &str) -> Self {
        self.inheritance = inheritance;
        self.root_entity_name = root_entity_name.to_string();
        self
    }
}

/// Returns the namespace part of a fully qualified class name.
///
/// # Examples
///
/// ```
/// use table_prefix_core::namespace_of;
///
/// assert_eq!(namespace_of("App\\Entity\\User"), "App\\Entity");
/// assert_eq!(namespace_of("User"), "");
/// ```
pub fn namespace_of(class_name: &str) -> &str {
    class_name
        .rfind(NAMESPACE_SEPARATOR)
        .map(|idx| &class_name[..idx])
        .unwrap_or("")
}
