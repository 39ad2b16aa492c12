//! Statement Bundle Module
//!
//! Unpacks a statement bundle archive and picks out the files worth
//! sending to the model.
//!
//! # Pipeline
//! ```text
//! bundle.zip ──► read_bundle ──► BundleContents ──► select_files ──► Vec<SelectedFile>
//!                                                        ▲
//!                                                    RoleTable
//! ```

mod error;
mod reader;
mod roles;
mod selector;

pub use error::{BundleError, BundleResult};
pub use reader::{BundleContents, read_bundle, read_bundle_file};
pub use roles::{RoleSpec, RoleTable};
pub use selector::{SelectedFile, TRUNCATION_MARKER, select_files};
