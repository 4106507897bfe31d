//! Data models for multigit.
//!
//! This module contains the identity record, the persisted document and the
//! export format.

mod document;
mod export;
mod identity;

pub use document::{ConfigDocument, DirectoryMap, GroupMap};
pub use export::{EXPORT_FORMAT_VERSION, ExportData, ImportSummary};
pub use identity::{
    Identity, default_display_name, default_ssh_key_name, is_valid_email,
    is_valid_identity_name, is_valid_key_name,
};
