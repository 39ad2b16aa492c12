//! Bundle Analyzer - drives select → prompt → complete → report
//!
//! In per-file mode every file gets its own completion call and a failed call
//! only costs that file. In combined mode the whole bundle is one call.

use std::io::Write;

use crate::config::{AnalysisMode, BundleConfig};
use crate::services::bundle::{BundleContents, BundleError, RoleTable, SelectedFile, select_files};
use crate::services::llm::{ChatTransport, CompletionClient, CompletionError, HttpTransport};
use crate::services::prompt::PromptBuilder;
use crate::services::report::Reporter;

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("Failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

/// Outcome counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    pub selected: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl AnalysisStats {
    /// Files were sent but not one analysis came back
    pub fn all_failed(&self) -> bool {
        self.failed > 0 && self.succeeded == 0
    }
}

pub struct BundleAnalyzer<T: ChatTransport = HttpTransport> {
    client: CompletionClient<T>,
    roles: RoleTable,
    max_chars_per_file: usize,
    mode: AnalysisMode,
}

impl<T: ChatTransport> BundleAnalyzer<T> {
    pub fn new(client: CompletionClient<T>, roles: RoleTable, config: &BundleConfig) -> Self {
        Self { client, roles, max_chars_per_file: config.max_chars_per_file, mode: config.mode }
    }

    pub fn client(&self) -> &CompletionClient<T> {
        &self.client
    }

    pub fn roles(&self) -> &RoleTable {
        &self.roles
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn select(&self, contents: &BundleContents) -> Vec<SelectedFile> {
        select_files(contents, &self.roles, self.max_chars_per_file)
    }

    /// Prompts this analyzer would send, labeled by file (or "bundle")
    pub fn prompts(&self, files: &[SelectedFile]) -> Vec<(String, String)> {
        let builder = PromptBuilder::new(&self.roles);
        match self.mode {
            AnalysisMode::PerFile => files
                .iter()
                .map(|f| (f.name.clone(), builder.build_file_prompt(f)))
                .collect(),
            AnalysisMode::Combined => {
                vec![("bundle".to_string(), builder.build_bundle_prompt(files))]
            },
        }
    }

    /// Select, then analyze (or only print prompts when `dry_run`)
    pub async fn run<W: Write, E: Write>(
        &self,
        contents: &BundleContents,
        reporter: &mut Reporter<W, E>,
        dry_run: bool,
    ) -> Result<AnalysisStats, AnalyzeError> {
        let files = self.select(contents);
        tracing::info!(
            "Bundle has {} entries, {} recognized (mode={})",
            contents.len(),
            files.len(),
            self.mode.as_str()
        );

        if files.is_empty() {
            tracing::warn!("No recognized files in bundle: {:?}", contents.paths());
            reporter.no_files(&self.roles.names())?;
            return Ok(AnalysisStats::default());
        }

        if dry_run {
            for (label, prompt) in self.prompts(&files) {
                reporter.prompt(&label, &prompt)?;
            }
            return Ok(AnalysisStats { selected: files.len(), ..Default::default() });
        }

        match self.mode {
            AnalysisMode::PerFile => self.analyze_each(&files, reporter).await,
            AnalysisMode::Combined => self.analyze_combined(&files, reporter).await,
        }
    }

    /// One completion per file; failures are reported and skipped
    pub async fn analyze_each<W: Write, E: Write>(
        &self,
        files: &[SelectedFile],
        reporter: &mut Reporter<W, E>,
    ) -> Result<AnalysisStats, AnalyzeError> {
        let builder = PromptBuilder::new(&self.roles);
        let mut stats = AnalysisStats { selected: files.len(), ..Default::default() };

        for (i, file) in files.iter().enumerate() {
            reporter.file_started(i + 1, files.len(), &file.name)?;

            let prompt = builder.build_file_prompt(file);
            match self.client.complete(&prompt).await {
                Ok(summary) => {
                    reporter.file_summary(&file.name, &summary)?;
                    stats.succeeded += 1;
                },
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    tracing::debug!("Completion failed for {}: {}", file.name, e);
                    reporter.file_failed(&file.name, &e)?;
                    stats.failed += 1;
                },
            }
        }

        Ok(stats)
    }

    /// One completion for the whole bundle
    pub async fn analyze_combined<W: Write, E: Write>(
        &self,
        files: &[SelectedFile],
        reporter: &mut Reporter<W, E>,
    ) -> Result<AnalysisStats, AnalyzeError> {
        let prompt = PromptBuilder::new(&self.roles).build_bundle_prompt(files);
        let summary = self.client.complete(&prompt).await?;

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        reporter.bundle_summary(&names, &summary)?;

        Ok(AnalysisStats { selected: files.len(), succeeded: 1, failed: 0 })
    }
}
