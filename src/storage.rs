use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::Message;

/// The file extension message files are recognised by when walking a
/// directory.
pub const MESSAGE_EXTENSION: &str = "hl7";

impl Message {
    /// Reads and parses a message file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let message = Self::parse(&text);
        tracing::debug!(
            "Loaded {} segments from {}",
            message.len(),
            path.display()
        );
        Ok(message)
    }

    /// Writes the message to a file, segments separated by CRLF.
    ///
    /// Parent directories are created if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directories cannot be
    /// written.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let write = || -> io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, self.to_string())
        };
        write().map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Expands `roots` into the message files they name.
///
/// Files are returned as given, whatever their extension. Directories are
/// walked recursively for files with the [`MESSAGE_EXTENSION`] extension, in
/// a stable order. Paths that do not exist are returned unchanged, so the
/// error surfaces when they are loaded.
#[must_use]
pub fn collect_message_paths(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for root in roots {
        if root.is_dir() {
            paths.extend(
                WalkDir::new(root)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|entry| entry.file_type().is_file())
                    .filter(|entry| is_message_file(entry.path()))
                    .map(walkdir::DirEntry::into_path),
            );
        } else {
            paths.push(root.clone());
        }
    }
    paths
}

fn is_message_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| extension.eq_ignore_ascii_case(MESSAGE_EXTENSION))
}

/// Errors that can occur when reading or writing message files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file could not be read.
    #[error("Failed to read message file {path}: {source}")]
    Read {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The file could not be written.
    #[error("Failed to write message file {path}: {source}")]
    Write {
        /// The file that was being written.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIT: &str = "MSH|^~\\&|A|B|C|D|20240101||ADT^A01\nPID|1||X||DOE^JOHN\n";

    #[test]
    fn load_parses_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("admit.hl7");
        fs::write(&path, ADMIT).unwrap();

        let message = Message::load(&path).unwrap();
        assert_eq!(message.len(), 2);
        assert_eq!(message.get("PID-5.2"), "JOHN");
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let error = Message::load(&tmp.path().join("missing.hl7")).unwrap_err();
        assert!(matches!(error, Error::Read { .. }));
        assert!(error.to_string().starts_with("Failed to read message file"));
    }

    #[test]
    fn save_writes_crlf_and_creates_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out/nested/admit.hl7");

        let mut message = Message::parse(ADMIT);
        message.set("PID-3", "12345");
        message.save(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "MSH|^~\\&|A|B|C|D|20240101||ADT^A01\r\nPID|1||12345||DOE^JOHN"
        );
        assert_eq!(Message::load(&path).unwrap(), message);
    }

    #[test]
    fn collects_files_and_walks_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("inbox/archive")).unwrap();
        fs::write(root.join("inbox/b.hl7"), ADMIT).unwrap();
        fs::write(root.join("inbox/a.HL7"), ADMIT).unwrap();
        fs::write(root.join("inbox/archive/c.hl7"), ADMIT).unwrap();
        fs::write(root.join("inbox/notes.txt"), "not a message").unwrap();
        fs::write(root.join("single.msg"), ADMIT).unwrap();

        let paths = collect_message_paths(&[root.join("single.msg"), root.join("inbox")]);

        assert_eq!(
            paths,
            vec![
                root.join("single.msg"),
                root.join("inbox/a.HL7"),
                root.join("inbox/archive/c.hl7"),
                root.join("inbox/b.hl7"),
            ]
        );
    }
}
