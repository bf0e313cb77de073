//! Metadata compilation hook.
//!
//! A host ORM calls [`MetadataHook::load_class_metadata`] once per mapped
//! class while it compiles metadata, before any schema or query is generated
//! from it.

use table_prefix_core::ClassMetadata;

use crate::error::Result;
use crate::platform::PlatformContext;
use crate::prefixer::IdentifierPrefixer;

/// Per-class callback invoked during metadata compilation.
pub trait MetadataHook: Send + Sync {
    /// Inspects and possibly rewrites the metadata of one class.
    ///
    /// # Errors
    ///
    /// An error aborts compilation of this class.
    fn load_class_metadata(
        &self,
        metadata: &mut ClassMetadata,
        ctx: &PlatformContext<'_>,
    ) -> Result<()>;
}

impl MetadataHook for IdentifierPrefixer {
    fn load_class_metadata(
        &self,
        metadata: &mut ClassMetadata,
        ctx: &PlatformContext<'_>,
    ) -> Result<()> {
        self.apply(metadata, ctx).map(|_| ())
    }
}

/// Runs `hook` over every class in order, stopping at the first error.
///
/// # Examples
///
/// ```
/// use table_prefix::{compile_all, DefaultQuoteStrategy, GenericPlatform, IdentifierPrefixer, PlatformContext};
/// use table_prefix_core::ClassMetadata;
///
/// let prefixer = IdentifierPrefixer::new("app_", Vec::<String>::new(), "UTF-8").unwrap();
/// let ctx = PlatformContext::new(&GenericPlatform, &DefaultQuoteStrategy);
/// let mut classes = vec![
///     ClassMetadata::new("App\\Entity\\User", "user"),
///     ClassMetadata::new("App\\Entity\\Role", "role"),
/// ];
///
/// compile_all(&prefixer, &mut classes, &ctx).unwrap();
/// assert_eq!(classes[1].table_name(), "app_role");
/// ```
pub fn compile_all<H>(hook: &H, classes: &mut [ClassMetadata], ctx: &PlatformContext<'_>) -> Result<()>
where
    H: MetadataHook + ?Sized,
{
    for metadata in classes.iter_mut() {
        hook.load_class_metadata(metadata, ctx)?;
    }
    Ok(())
}
