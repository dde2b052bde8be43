use chrono::Utc;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid filename pattern"));

/// Reduce a client-supplied filename to a safe basename
///
/// Path separators become spaces, whitespace runs collapse to `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `.`/`_` are
/// trimmed. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let spaced = filename.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    stripped.trim_matches(|c: char| c == '.' || c == '_').to_string()
}

/// Storage name for an upload: `<unix millis>_<sanitized name>`
pub fn timestamped_filename(original: &str) -> String {
    format!("{}_{}", Utc::now().timestamp_millis(), secure_filename(original))
}

/// Uploaded file held on disk for the duration of one analysis
///
/// The file is removed by [`StoredUpload::remove`] on the success path and on
/// drop otherwise.
#[derive(Debug)]
pub struct StoredUpload {
    path: PathBuf,
    file_name: String,
    removed: bool,
}

impl StoredUpload {
    /// Write `bytes` into `dir` under a timestamped, sanitized name
    pub async fn save(dir: &Path, original_name: &str, bytes: &[u8]) -> io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let file_name = timestamped_filename(original_name);
        let path = dir.join(&file_name);
        tokio::fs::write(&path, bytes).await?;
        debug!("Stored upload at {}", path.display());

        Ok(Self {
            path,
            file_name,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Delete the file, reporting failure to the caller
    pub fn remove(mut self) -> io::Result<()> {
        self.removed = true;
        std::fs::remove_file(&self.path)
    }
}

impl Drop for StoredUpload {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove upload {}: {}", self.path.display(), e);
            }
        }
    }
}
