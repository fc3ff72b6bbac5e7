use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::fileapi::error::FileApiError;
use crate::fileapi::query::{CLIENT_ID, Query};

/// Trait for loading reply-relative JSON documents
///
/// The codemodel only carries references; each target lives in its own JSON
/// file next to the index. Parsing code goes through this seam so tests can
/// supply an in-memory reply tree.
pub trait ReplyLoader {
    fn load(&self, relative: &str) -> Result<serde_json::Value, FileApiError>;
}

/// On-disk request/reply gateway for one build folder.
///
/// CMake replaces the whole reply tree on each configure: the old index file
/// is removed and a new one written under a fresh name. During that short
/// window multiple index files may coexist; the one with the greatest name in
/// lexicographic order is the current one. Selecting an index that is still
/// being written is a narrow, accepted race.
#[derive(Debug, Clone)]
pub struct FileApi {
    build_dir: PathBuf,
}

impl FileApi {
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
        }
    }

    fn api_dir(&self) -> PathBuf {
        self.build_dir.join(".cmake").join("api").join("v1")
    }

    pub fn query_dir(&self) -> PathBuf {
        self.api_dir().join("query").join(CLIENT_ID)
    }

    pub fn reply_dir(&self) -> PathBuf {
        self.api_dir().join("reply")
    }

    /// Stage the query descriptor for the next configure invocation.
    ///
    /// Creates the query directory tree (idempotent) and writes `query.json`
    /// into it.
    pub fn ensure_query_written(&self) -> Result<(), FileApiError> {
        let dir = self.query_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join("query.json");
        let payload = serde_json::to_string(&Query::default()).map_err(|source| {
            FileApiError::Parse {
                path: path.display().to_string(),
                source,
            }
        })?;
        fs::write(&path, payload)?;
        debug!(path = %path.display(), "query staged");
        Ok(())
    }

    /// Select the current reply index file.
    ///
    /// Deterministic for a given directory snapshot: among all
    /// `index-*.json` entries the lexicographically greatest name wins,
    /// independent of filesystem listing order.
    pub fn locate_reply_index(&self) -> Result<PathBuf, FileApiError> {
        let reply = self.reply_dir();
        if !reply.is_dir() {
            return Err(FileApiError::NotFound {
                path: reply.display().to_string(),
            });
        }
        let mut best: Option<String> = None;
        for entry in fs::read_dir(&reply)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with("index-")
                && name.ends_with(".json")
                && best.as_deref().is_none_or(|current| name > current)
            {
                best = Some(name.to_string());
            }
        }
        match best {
            Some(name) => Ok(reply.join(name)),
            None => Err(FileApiError::NotFound {
                path: reply.display().to_string(),
            }),
        }
    }

    /// Parse the current reply index.
    pub fn load_index(&self) -> Result<serde_json::Value, FileApiError> {
        let path = self.locate_reply_index()?;
        load_json(&path)
    }

    /// Read and parse a reply-relative JSON document.
    pub fn load_reply_document(&self, relative: &str) -> Result<serde_json::Value, FileApiError> {
        load_json(&self.reply_dir().join(relative))
    }
}

impl ReplyLoader for FileApi {
    fn load(&self, relative: &str) -> Result<serde_json::Value, FileApiError> {
        self.load_reply_document(relative)
    }
}

fn load_json(path: &Path) -> Result<serde_json::Value, FileApiError> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FileApiError::NotFound {
                path: path.display().to_string(),
            }
        } else {
            FileApiError::Io(e)
        }
    })?;
    serde_json::from_str(&content).map_err(|source| FileApiError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn gateway_with_reply_dir() -> (TempDir, FileApi) {
        let dir = TempDir::new().unwrap();
        let gateway = FileApi::new(dir.path());
        fs::create_dir_all(gateway.reply_dir()).unwrap();
        (dir, gateway)
    }

    #[test]
    fn query_written_idempotently() {
        let dir = TempDir::new().unwrap();
        let gateway = FileApi::new(dir.path());

        gateway.ensure_query_written().unwrap();
        gateway.ensure_query_written().unwrap();

        let content = fs::read_to_string(gateway.query_dir().join("query.json")).unwrap();
        let parsed: Query = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, Query::default());
    }

    #[test]
    fn greatest_index_name_wins() {
        let (_dir, gateway) = gateway_with_reply_dir();
        // Written out of order on purpose; selection must not depend on it.
        for name in [
            "index-2024-01-02T10-00-00-0002.json",
            "index-2024-01-02T10-00-01-0003.json",
            "index-2024-01-01T09-00-00-0001.json",
        ] {
            fs::write(gateway.reply_dir().join(name), "{}").unwrap();
        }
        fs::write(gateway.reply_dir().join("codemodel-v2-abc.json"), "{}").unwrap();

        let index = gateway.locate_reply_index().unwrap();
        assert_eq!(
            index.file_name().unwrap().to_str().unwrap(),
            "index-2024-01-02T10-00-01-0003.json"
        );
    }

    #[test]
    fn empty_reply_dir_is_not_found() {
        let (_dir, gateway) = gateway_with_reply_dir();
        assert!(matches!(
            gateway.locate_reply_index(),
            Err(FileApiError::NotFound { .. })
        ));
    }

    #[test]
    fn missing_reply_dir_is_not_found() {
        let dir = TempDir::new().unwrap();
        let gateway = FileApi::new(dir.path());
        assert!(matches!(
            gateway.locate_reply_index(),
            Err(FileApiError::NotFound { .. })
        ));
    }

    #[test]
    fn missing_document_is_not_found() {
        let (_dir, gateway) = gateway_with_reply_dir();
        assert!(matches!(
            gateway.load_reply_document("target-app.json"),
            Err(FileApiError::NotFound { .. })
        ));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let (_dir, gateway) = gateway_with_reply_dir();
        fs::write(gateway.reply_dir().join("broken.json"), "{not json").unwrap();
        assert!(matches!(
            gateway.load_reply_document("broken.json"),
            Err(FileApiError::Parse { .. })
        ));
    }

    #[test]
    fn load_index_parses_selected_file() {
        let (_dir, gateway) = gateway_with_reply_dir();
        fs::write(
            gateway.reply_dir().join("index-0001.json"),
            r#"{"cmake": {"generator": {"name": "Ninja"}}}"#,
        )
        .unwrap();
        let index = gateway.load_index().unwrap();
        assert_eq!(index["cmake"]["generator"]["name"], "Ninja");
    }
}
