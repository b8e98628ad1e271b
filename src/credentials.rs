use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("couldn't find home dir")]
    NoHomeDir,
}

/// Source of the bearer token. A store only reads; obtaining a token is the
/// backend's login flow and happens elsewhere.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Human-readable description of where the token comes from.
    fn describe(&self) -> String;
}

/// Token kept in a plain file, one token per file. Surrounding whitespace is
/// ignored and an empty file counts as no token.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.echoes/token`
    pub fn default_path() -> Result<PathBuf, StorageError> {
        let home = dirs::home_dir().ok_or(StorageError::NoHomeDir)?;
        Ok(home.join(".echoes").join("token"))
    }
}

impl CredentialStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Token fixed at startup (from `--token` / `ECHOES_TOKEN`), or explicitly none.
pub struct StaticTokenStore {
    token: Option<String>,
}

impl StaticTokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl CredentialStore for StaticTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.token.clone())
    }

    fn describe(&self) -> String {
        "command line / environment".to_string()
    }
}

/// Literal sent in place of a missing token.
pub const ABSENT_TOKEN: &str = "null";

/// `Authorization` header value for an optional token.
pub fn bearer_value(token: Option<&str>) -> String {
    format!("Bearer {}", token.unwrap_or(ABSENT_TOKEN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn file_store_trims_token() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  abc.def.ghi").unwrap();
        file.flush().unwrap();

        let store = FileTokenStore::new(file.path());
        assert_eq!(store.load().unwrap().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_or_empty_file_is_no_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token");
        assert_eq!(FileTokenStore::new(&path).load().unwrap(), None);

        fs::write(&path, "\n").unwrap();
        assert_eq!(FileTokenStore::new(&path).load().unwrap(), None);
    }

    #[test]
    fn unreadable_path_is_an_error() {
        // A directory cannot be read as a token file.
        let dir = tempdir().unwrap();
        assert!(matches!(
            FileTokenStore::new(dir.path()).load(),
            Err(StorageError::Io { .. })
        ));
    }

    #[test]
    fn bearer_value_uses_placeholder_when_absent() {
        assert_eq!(bearer_value(Some("K")), "Bearer K");
        assert_eq!(bearer_value(None), "Bearer null");
    }
}
