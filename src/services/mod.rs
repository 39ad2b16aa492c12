pub mod analyzer;
pub mod bundle;
pub mod llm;
pub mod prompt;
pub mod report;

pub use analyzer::{AnalysisStats, AnalyzeError, BundleAnalyzer};
pub use bundle::{BundleContents, BundleError, RoleSpec, RoleTable, SelectedFile};
pub use llm::{ChatTransport, CompletionClient, CompletionError, HttpTransport};
pub use prompt::PromptBuilder;
pub use report::Reporter;
