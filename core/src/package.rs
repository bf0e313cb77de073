use serde::{Deserialize, Serialize};

use crate::ClassMetadata;

/// Serializable document holding the metadata of several mapped classes.
///
/// Hosts exchange metadata with the command-line tool in this shape, as JSON
/// or YAML.
///
/// # Examples
///
/// ```
/// use table_prefix_core::*;
///
/// let mut document = MappingDocument::default();
/// document.classes.push(ClassMetadata::new("App\\Entity\\User", "user"));
/// document.classes.push(ClassMetadata::new("App\\Entity\\Role", "role"));
///
/// assert_eq!(document.class_count(), 2);
/// assert!(document.find_class("App\\Entity\\Role").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingDocument {
    /// Mapped classes, in compilation order.
    #[serde(default)]
    pub classes: Vec<ClassMetadata>,
}

impl MappingDocument {
    /// Number of classes in the document.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Finds a class by its fully qualified name.
    pub fn find_class(&self, name: &str) -> Option<&ClassMetadata> {
        self.classes.iter().find(|c| c.name == name)
    }
}
