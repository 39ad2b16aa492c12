//! Bundle Advisor Library
//!
//! Reads a CockroachDB statement bundle, builds prompts from its schema,
//! statement, plan and environment files, and asks a chat completion API
//! for a performance review.

pub mod config;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::{AnalysisMode, CommandLineArgs, Config};
pub use services::{
    AnalysisStats, AnalyzeError, BundleAnalyzer, BundleError, CompletionClient, CompletionError,
    Reporter, RoleTable,
};

#[cfg(test)]
mod tests;
