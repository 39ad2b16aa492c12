//! Prompt Builder - turns selected bundle files into model prompts
//!
//! Two shapes are produced:
//! - one prompt for the whole bundle: shared preamble, then every file in order
//! - one prompt per file: per-file preamble, the role's questions, then the file
//!
//! Contents are embedded verbatim; truncation already happened in the selector.

use crate::services::bundle::{RoleTable, SelectedFile};

const BUNDLE_PREAMBLE: &str = include_str!("bundle_preamble.md");
const FILE_PREAMBLE: &str = include_str!("file_preamble.md");

/// Builds prompts from a fixed preamble pair and a role table
#[derive(Debug, Clone)]
pub struct PromptBuilder<'a> {
    roles: &'a RoleTable,
    bundle_preamble: &'a str,
    file_preamble: &'a str,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(roles: &'a RoleTable) -> Self {
        Self { roles, bundle_preamble: BUNDLE_PREAMBLE, file_preamble: FILE_PREAMBLE }
    }

    /// Replace the built-in preambles
    pub fn with_preambles(mut self, bundle_preamble: &'a str, file_preamble: &'a str) -> Self {
        self.bundle_preamble = bundle_preamble;
        self.file_preamble = file_preamble;
        self
    }

    pub fn bundle_preamble(&self) -> &str {
        self.bundle_preamble
    }

    /// Preamble followed by each file's content, each terminated by a newline.
    pub fn build_bundle_prompt(&self, files: &[SelectedFile]) -> String {
        let capacity = self.bundle_preamble.len()
            + files.iter().map(|f| f.content.len() + 1).sum::<usize>();
        let mut prompt = String::with_capacity(capacity);
        prompt.push_str(self.bundle_preamble);
        for file in files {
            prompt.push_str(&file.content);
            prompt.push('\n');
        }
        prompt
    }

    /// Per-file preamble, the role's questions, a blank line, then the content.
    pub fn build_file_prompt(&self, file: &SelectedFile) -> String {
        let mut prompt = String::from(self.file_preamble);
        if let Some(instruction) = self.roles.instruction(&file.name) {
            prompt.push_str(instruction);
        }
        prompt.push_str("\n\n");
        prompt.push_str(&file.content);
        prompt.push('\n');
        prompt
    }
}
