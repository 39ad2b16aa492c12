//! File selector - picks the recognized bundle files in role order

use super::reader::BundleContents;
use super::roles::RoleTable;
use crate::utils::StringExt;

/// Appended to content that was cut at the character limit
pub const TRUNCATION_MARKER: &str = "\n... [truncated]";

/// A recognized bundle file, ready to be embedded in a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content: String,
    /// Whether `content` was cut and carries [`TRUNCATION_MARKER`]
    pub truncated: bool,
}

/// Select every bundle entry whose path exactly matches a role name.
///
/// Output follows the role table's order, so the same bundle and table always
/// yield the same sequence. No match is not an error.
pub fn select_files(
    contents: &BundleContents,
    roles: &RoleTable,
    max_chars_per_file: usize,
) -> Vec<SelectedFile> {
    let mut selected = Vec::new();

    for role in roles.iter() {
        let Some(raw) = contents.get(&role.name) else {
            tracing::debug!("Bundle has no {}", role.name);
            continue;
        };

        let (content, truncated) = raw.truncated_with_marker(max_chars_per_file, TRUNCATION_MARKER);
        if truncated {
            tracing::info!(
                "Truncated {} to {} characters (was {})",
                role.name,
                max_chars_per_file,
                raw.chars().count()
            );
        }

        selected.push(SelectedFile { name: role.name.clone(), content, truncated });
    }

    tracing::debug!(
        "Selected {} of {} bundle entries: {:?}",
        selected.len(),
        contents.len(),
        selected.iter().map(|f| f.name.as_str()).collect::<Vec<_>>()
    );

    selected
}
