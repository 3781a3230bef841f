//! Shared fixtures for integration tests.

use std::io::Write;
use std::sync::Arc;

use arbor_config::testing::RecordingSink;
use arbor_config::{Config, LookupOptions, Node, ShowMode, Value};
use tempfile::NamedTempFile;

/// Build a tree from a JSON literal.
#[allow(dead_code)]
pub fn tree(json: serde_json::Value) -> Node {
    arbor_config::testing::tree(json)
}

/// A config over `json` whose macro issues are recorded.
#[allow(dead_code)]
pub fn recording(json: serde_json::Value) -> (Config, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let config = Config::new(tree(json)).with_sink(sink.clone());
    (config, sink)
}

/// Look up `path` with default options, expecting a string.
#[allow(dead_code)]
pub fn lookup_str(config: &Config, path: &str) -> String {
    match config.lookup(path, &LookupOptions::new()).unwrap() {
        Some(Value::String(s)) => s,
        other => panic!("expected a string at {path}, got {other:?}"),
    }
}

/// Look up `path` revealing secrets.
#[allow(dead_code)]
pub fn lookup_plain(config: &Config, path: &str) -> Option<Value> {
    config
        .lookup(path, &LookupOptions::new().with_show(ShowMode::Plaintext))
        .unwrap()
}

/// Write `content` to a temp file with the given suffix.
#[allow(dead_code)]
pub fn source_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("failed to write temp file");
    file
}
