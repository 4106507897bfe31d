//! Business logic services.
//!
//! Services operate on the shared [`ConfigDocument`] through a
//! [`DocumentStore`]. Each public operation is one load, in-memory edit and
//! save round trip; nothing is cached between calls.
//!
//! | Service | Responsibility |
//! |---------|----------------|
//! | [`ConfigRegistry`] | Identity CRUD and the `initialized` flag |
//! | [`GroupRegistry`] | Named groups of identities |
//! | [`DirectoryResolver`] | Directory mappings and auto-switch resolution |
//! | [`TransferService`] | Export and merge-on-import |

mod container;
mod directory;
mod group;
mod registry;
mod transfer;

pub use container::ServiceContainer;
pub use directory::{DirectoryResolver, MatchMode, canonicalize_with_base, find_best_match};
pub use group::GroupRegistry;
pub use registry::ConfigRegistry;
pub use transfer::TransferService;

use crate::Result;
use crate::models::ConfigDocument;
use crate::storage::DocumentStore;

/// Loads the document, applies `mutate`, and saves it if anything changed.
///
/// Nothing is written when `mutate` fails or leaves the document untouched.
pub(crate) fn update_document<T, F>(store: &dyn DocumentStore, mutate: F) -> Result<T>
where
    F: FnOnce(&mut ConfigDocument) -> Result<T>,
{
    let mut document = store.load()?;
    let original = document.clone();
    let value = mutate(&mut document)?;
    if document != original {
        store.save(&document)?;
    }
    Ok(value)
}
