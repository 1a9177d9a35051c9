use std::io;
use std::path::{Path, PathBuf};

use edgen_client::Message;

/// Conversation kept on disk as a JSON array of messages.
pub struct History {
    file_path: PathBuf,
}

impl History {
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        History {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    /// A missing file is an empty conversation.
    pub async fn load_context(&self) -> io::Result<Vec<Message>> {
        let content = match tokio::fs::read_to_string(&self.file_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub async fn save_context(&self, context: &[Message]) -> io::Result<()> {
        let json = serde_json::to_string_pretty(context)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        tokio::fs::write(&self.file_path, json).await
    }
}
