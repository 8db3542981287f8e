//! Candidate files: a name, a byte length, and somewhere to read the bytes from.
//!
//! ## Why not read everything up front?
//!
//! Uploads may be up to 200 MiB and the session can hold several of them.
//! A file selected from disk keeps only its path and metadata until it is
//! actually submitted; the bytes are read once, by the submission pipeline.

use crate::error::DocSageError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Where the bytes of a candidate file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// A file on the local file system.
    Path(PathBuf),
    /// Bytes already held in memory, shared between clones.
    Memory(Arc<[u8]>),
}

/// A user-supplied file before or after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    name: String,
    size_bytes: u64,
    content: FileContent,
}

impl CandidateFile {
    /// Wrap in-memory bytes under the given display name.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            content: FileContent::Memory(bytes.into()),
        }
    }

    /// Build a candidate from explicit parts without touching the file system.
    pub fn from_parts(name: impl Into<String>, size_bytes: u64, content: FileContent) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            content,
        }
    }

    /// Resolve a local path to a candidate, reading only its metadata.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocSageError> {
        let path = path.as_ref().to_path_buf();
        let meta = std::fs::metadata(&path).map_err(|source| DocSageError::FileRead {
            path: path.clone(),
            source,
        })?;
        if !meta.is_file() {
            return Err(DocSageError::FileRead {
                path,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!("Resolved candidate '{}' ({} bytes)", name, meta.len());
        Ok(Self {
            name,
            size_bytes: meta.len(),
            content: FileContent::Path(path),
        })
    }

    /// File name used for extension checks and display.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte length as reported when the file was selected.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    /// Size in MiB with two decimals, as shown next to each selected file.
    pub fn display_size(&self) -> String {
        format_size(self.size_bytes)
    }

    /// Load the full contents for upload.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, DocSageError> {
        match &self.content {
            FileContent::Memory(bytes) => Ok(bytes.to_vec()),
            FileContent::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| DocSageError::FileRead {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}

/// Format a byte count in MiB with two decimals, e.g. `1.50 MB`.
pub fn format_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_bytes_records_length() {
        let f = CandidateFile::from_bytes("notes.txt", b"hello".to_vec());
        assert_eq!(f.name(), "notes.txt");
        assert_eq!(f.size_bytes(), 5);
    }

    #[test]
    fn display_size_in_megabytes() {
        let size = 3 * 1024 * 1024 / 2;
        let f = CandidateFile::from_parts("a.pdf", size, FileContent::Memory(Arc::from([])));
        assert_eq!(f.display_size(), "1.50 MB");
        assert_eq!(format_size(0), "0.00 MB");
    }

    #[test]
    fn clones_share_in_memory_bytes() {
        let a = CandidateFile::from_bytes("a.pdf", vec![7; 1024]);
        let b = a.clone();
        match (a.content(), b.content()) {
            (FileContent::Memory(x), FileContent::Memory(y)) => assert!(Arc::ptr_eq(x, y)),
            _ => panic!("expected in-memory content"),
        }
    }

    #[test]
    fn from_path_missing_file() {
        let err = CandidateFile::from_path("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, DocSageError::FileRead { .. }));
    }

    #[test]
    fn from_path_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = CandidateFile::from_path(dir.path()).unwrap_err();
        assert!(matches!(err, DocSageError::FileRead { .. }));
    }

    #[tokio::test]
    async fn from_path_reads_metadata_then_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Report.MD");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"# Title\n").unwrap();

        let candidate = CandidateFile::from_path(&path).unwrap();
        assert_eq!(candidate.name(), "Report.MD");
        assert_eq!(candidate.size_bytes(), 8);
        assert_eq!(candidate.read_bytes().await.unwrap(), b"# Title\n");
    }
}
