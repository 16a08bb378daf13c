//! Local files: gzip-aware readers and writers, and scratch-file cleanup.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::error::StorageError;

pub const GZIP_SUFFIX: &str = ".gz";

/// Whether `name` carries the gzip suffix.
#[must_use]
pub fn is_gzip(name: &str) -> bool {
    name.ends_with(GZIP_SUFFIX)
}

/// `name` without a trailing `.gz`.
#[must_use]
pub fn strip_gzip(name: &str) -> &str {
    name.strip_suffix(GZIP_SUFFIX).unwrap_or(name)
}

/// Open `path` for reading, decompressing when it ends in `.gz`.
///
/// # Errors
///
/// Returns [`StorageError::Io`] if the file cannot be opened.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>, StorageError> {
    let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    let compressed = path.to_str().is_some_and(is_gzip);
    Ok(if compressed {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    })
}

/// A buffered output file, optionally gzip-compressed.
///
/// Call [`OutputWriter::finish`]; dropping the writer flushes buffers but
/// swallows errors and may leave a truncated gzip trailer.
pub enum OutputWriter {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputWriter {
    /// Create (or truncate) `path`, making parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file cannot be created.
    pub fn create(path: &Path, compressed: bool) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        let file = BufWriter::new(File::create(path).map_err(|e| StorageError::io(path, e))?);
        Ok(if compressed {
            Self::Gzip(GzEncoder::new(file, Compression::default()))
        } else {
            Self::Plain(file)
        })
    }

    /// Write the gzip trailer if any and flush to disk.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub fn finish(self) -> io::Result<()> {
        let mut file = match self {
            Self::Plain(file) => file,
            Self::Gzip(encoder) => encoder.finish()?,
        };
        file.flush()
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
        }
    }
}

/// Removes a local file when dropped, unless disarmed.
///
/// Guards downloaded sources and generated outputs so they are cleaned up
/// on every exit path of a task.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    armed: bool,
}

impl ScratchFile {
    /// Guard `path`; it is deleted on drop only when `delete` is set.
    pub fn new(path: impl Into<PathBuf>, delete: bool) -> Self {
        Self {
            path: path.into(),
            armed: delete,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file after all.
    pub const fn keep(&mut self) {
        self.armed = false;
    }

    /// Ask for deletion on drop regardless of the flag given at creation.
    pub const fn arm(&mut self) {
        self.armed = true;
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed local file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "could not remove local file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Read;

    #[test]
    fn gzip_names() {
        assert!(is_gzip("a/b.jsonl.gz"));
        assert!(!is_gzip("a/b.jsonl"));
        assert_eq!(strip_gzip("a/b.jsonl.gz"), "a/b.jsonl");
        assert_eq!(strip_gzip("a/b.jsonl"), "a/b.jsonl");
    }

    #[test]
    fn compressed_output_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.nq.gz");

        let mut writer = OutputWriter::create(&path, true).unwrap();
        writer.write_all(b"line one\nline two\n").unwrap();
        writer.finish().unwrap();

        let lines: Vec<String> = open_input(&path).unwrap().lines().map(Result::unwrap).collect();
        assert_eq!(lines, vec!["line one", "line two"]);

        let mut raw = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut raw).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn plain_output_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.nq");

        let mut writer = OutputWriter::create(&path, false).unwrap();
        writer.write_all(b"{}\n").unwrap();
        writer.finish().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            open_input(&dir.path().join("absent.jsonl")),
            Err(StorageError::Io { .. })
        ));
    }

    #[test]
    fn scratch_file_removed_only_when_armed() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept");
        let removed = dir.path().join("removed");
        std::fs::write(&kept, "x").unwrap();
        std::fs::write(&removed, "x").unwrap();

        drop(ScratchFile::new(&kept, false));
        drop(ScratchFile::new(&removed, true));

        assert!(kept.exists());
        assert!(!removed.exists());
    }

    #[test]
    fn disarmed_scratch_file_survives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, "x").unwrap();

        let mut guard = ScratchFile::new(&path, true);
        guard.keep();
        drop(guard);

        assert!(path.exists());
        drop(ScratchFile::new(dir.path().join("never-created"), true));
    }
}
