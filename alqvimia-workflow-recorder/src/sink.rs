use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Where saved and exported workflows go.
///
/// `save` is fire-and-forget: the session never waits for, or hears about,
/// the outcome.
pub trait WorkflowSink: Send + Sync {
    fn save(&self, name: &str, bytes: Vec<u8>);
}

/// Keeps everything in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    saved: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far, oldest first
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn last(&self) -> Option<(String, Vec<u8>)> {
        self.saved().pop()
    }
}

impl WorkflowSink for MemorySink {
    fn save(&self, name: &str, bytes: Vec<u8>) {
        let mut saved = self.saved.lock().unwrap_or_else(|e| e.into_inner());
        saved.push((name.to_string(), bytes));
    }
}

/// Writes each save to a file in one directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn write(path: PathBuf, bytes: Vec<u8>) {
        let result = path
            .parent()
            .map(std::fs::create_dir_all)
            .unwrap_or(Ok(()))
            .and_then(|_| std::fs::write(&path, bytes));
        match result {
            Ok(()) => info!("Saved workflow to {:?}", path),
            Err(e) => warn!("Failed to save workflow to {:?}: {}", path, e),
        }
    }
}

impl WorkflowSink for DirectorySink {
    fn save(&self, name: &str, bytes: Vec<u8>) {
        // only the final component, so a name cannot escape the directory
        let file_name = std::path::Path::new(name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "workflow.wfl".into());
        let path = self.dir.join(file_name);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || Self::write(path, bytes));
            }
            Err(_) => Self::write(path, bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.save("a.wfl", b"1".to_vec());
        sink.save("b.wfl", b"2".to_vec());
        let names: Vec<_> = sink.saved().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a.wfl", "b.wfl"]);
    }

    #[test]
    fn test_directory_sink_without_runtime_writes_inline() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        sink.save("../escape/Invoice_Run.wfl", b"ALQWFL2e30=".to_vec());

        let written = std::fs::read(dir.path().join("Invoice_Run.wfl")).unwrap();
        assert_eq!(written, b"ALQWFL2e30=");
    }
}
