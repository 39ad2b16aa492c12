// Common test utilities and helpers

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::config::{AnalysisMode, BundleConfig, LlmConfig};
use crate::services::bundle::RoleTable;
use crate::services::llm::{
    ChatCompletionRequest, ChatTransport, CompletionClient, CompletionError, TransportResponse,
};
use crate::services::{BundleAnalyzer, Reporter};

/// Build an in-memory zip with the given files and directory entries
pub fn build_zip(files: &[(&str, &str)], dirs: &[&str]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for dir in dirs {
        writer.add_directory(*dir, options).expect("Failed to add directory");
    }
    for (name, body) in files {
        writer.start_file(*name, options).expect("Failed to start file");
        writer.write_all(body.as_bytes()).expect("Failed to write file");
    }
    writer.finish().expect("Failed to finish zip").into_inner()
}

/// A typical statement bundle plus one irrelevant file
pub fn sample_bundle() -> Vec<u8> {
    build_zip(
        &[
            ("notes.txt", "irrelevant"),
            ("plan.txt", "scan cost=100"),
            ("statement.sql", "SELECT * FROM t WHERE a = 1"),
            ("schema.sql", "CREATE TABLE t (a INT, b STRING)"),
        ],
        &["trace/"],
    )
}

/// Chat completion reply body with a single choice
pub fn reply(content: &str) -> Result<TransportResponse, CompletionError> {
    let body = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    });
    Ok(TransportResponse::new(200, body.to_string()))
}

/// Transport fake: replays queued outcomes in order and records every request
#[derive(Default)]
pub struct FakeTransport {
    outcomes: Mutex<VecDeque<Result<TransportResponse, CompletionError>>>,
    requests: Mutex<Vec<ChatCompletionRequest>>,
    calls: AtomicUsize,
}

impl FakeTransport {
    pub fn with_outcomes(
        outcomes: impl IntoIterator<Item = Result<TransportResponse, CompletionError>>,
    ) -> Self {
        Self { outcomes: Mutex::new(outcomes.into_iter().collect()), ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User-role message of every request, in call order
    pub fn user_prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.messages.iter().find(|m| m.role == "user"))
            .map(|m| m.content.clone())
            .collect()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn post_chat(
        &self,
        _endpoint: &str,
        _api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<TransportResponse, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Transport("no more canned responses".into())))
    }
}

pub fn analyzer(
    mode: AnalysisMode,
    api_key: Option<&str>,
    transport: FakeTransport,
) -> BundleAnalyzer<FakeTransport> {
    let client = CompletionClient::with_transport(
        &LlmConfig::default(),
        api_key.map(str::to_string),
        transport,
    );
    let config = BundleConfig { mode, ..Default::default() };
    BundleAnalyzer::new(client, RoleTable::default(), &config)
}

pub type BufReporter = Reporter<Vec<u8>, Vec<u8>>;

pub fn reporter() -> BufReporter {
    Reporter::new(Vec::new(), Vec::new(), false)
}

/// Consume a reporter into (stdout, stderr) text
pub fn output(reporter: BufReporter) -> (String, String) {
    let (out, err) = reporter.into_inner();
    (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
}

/// Shared sink for capturing formatted log lines
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
