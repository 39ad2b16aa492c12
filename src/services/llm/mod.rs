//! LLM Service Module
//!
//! Chat completion client for OpenAI-compatible APIs.
//!
//! # Architecture
//! ```text
//! ┌──────────────────┐
//! │ CompletionClient │  ← credential check, request building, response decoding
//! └────────┬─────────┘
//!          │ ChatTransport (trait)
//!    ┌─────┴──────┐
//!    ▼            ▼
//! ┌──────────┐ ┌──────────┐
//! │   HTTP   │ │  Test    │
//! │Transport │ │  fakes   │
//! └──────────┘ └──────────┘
//! ```

mod client;
mod models;

pub use client::{ChatTransport, CompletionClient, HttpTransport, api_key_from_env};
pub use models::*;
