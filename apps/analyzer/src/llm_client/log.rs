//! Append-only interaction logs: one file per protocol stage, one entry per
//! request/response exchange.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::llm_client::ChatMessage;

/// A named append-only log file. The file is opened, appended, and closed on
/// every call; no handle is held between interactions, so external tools can
/// tail the log while a run is in progress.
#[derive(Debug, Clone)]
pub struct InteractionLog {
    path: PathBuf,
}

impl InteractionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one `{"request": [...], "response": "..."}` entry followed by
    /// a blank line separator.
    pub fn append(&self, request: &[ChatMessage], response: &str) -> std::io::Result<()> {
        let entry = serde_json::json!({
            "request": request,
            "response": response,
        });
        let rendered = serde_json::to_string_pretty(&entry)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{rendered}\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_append_writes_entry_with_blank_line_separator() {
        let dir = tempfile::tempdir().unwrap();
        let log = InteractionLog::new(dir.path().join("initial.log"));

        let request = vec![ChatMessage::system("sys"), ChatMessage::user("hello")];
        log.append(&request, "response one").unwrap();
        log.append(&request, "response two").unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let entries: Vec<&str> = contents
            .split("\n\n")
            .filter(|chunk| !chunk.trim().is_empty())
            .collect();
        assert_eq!(entries.len(), 2);

        let first: Value = serde_json::from_str(entries[0]).unwrap();
        assert_eq!(first["request"][0]["role"], "system");
        assert_eq!(first["request"][1]["content"], "hello");
        assert_eq!(first["response"], "response one");

        let second: Value = serde_json::from_str(entries[1]).unwrap();
        assert_eq!(second["response"], "response two");
    }

    #[test]
    fn test_append_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = InteractionLog::new(dir.path().join("fresh.log"));
        assert!(!log.path().exists());
        log.append(&[ChatMessage::user("q")], "a").unwrap();
        assert!(log.path().exists());
    }
}
