//! Document store trait.

use crate::Result;
use crate::models::ConfigDocument;

/// Trait for configuration document stores.
///
/// A store is the single source of truth for multigit state. Services call
/// [`load`](Self::load) at the start of every operation and
/// [`save`](Self::save) after every mutation; stores never cache between
/// calls on behalf of callers.
pub trait DocumentStore: Send + Sync {
    /// Loads the persisted document.
    ///
    /// Returns the empty default document if nothing has been stored yet.
    fn load(&self) -> Result<ConfigDocument>;

    /// Replaces the persisted document.
    fn save(&self, document: &ConfigDocument) -> Result<()>;

    /// Returns true if a document has been persisted.
    fn exists(&self) -> Result<bool>;
}
