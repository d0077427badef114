use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{QuoteError, Result};
use crate::model::Client;

pub const CLIENTS_FILE: &str = "clients.json";

/// The saved client list, one JSON array on disk.
///
/// Reads return an empty list when nothing has been saved yet. Saves
/// overwrite the whole file; the last writer wins.
#[derive(Debug, Clone)]
pub struct ClientBook {
    path: PathBuf,
}

impl ClientBook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_root: &Path) -> Self {
        Self::new(data_root.join(CLIENTS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_clients(&self) -> Result<Vec<Client>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| QuoteError::io(&self.path, e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let clients: Vec<Client> = serde_json::from_str(&content)?;
        debug!(count = clients.len(), path = %self.path.display(), "loaded clients");
        Ok(clients)
    }

    pub fn save_clients(&self, clients: &[Client]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| QuoteError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(clients)?;
        fs::write(&self.path, json).map_err(|e| QuoteError::io(&self.path, e))?;
        debug!(count = clients.len(), path = %self.path.display(), "saved clients");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn client(name: &str) -> Client {
        Client {
            name: name.into(),
            address: format!("{name} House, Noida"),
        }
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let book = ClientBook::in_dir(dir.path());
        assert!(book.get_clients().unwrap().is_empty());
    }

    #[test]
    fn save_overwrites_wholesale() {
        let dir = TempDir::new().unwrap();
        let book = ClientBook::in_dir(dir.path());

        book.save_clients(&[client("Globex"), client("Initech")]).unwrap();
        assert_eq!(book.get_clients().unwrap().len(), 2);

        book.save_clients(&[client("Umbrella")]).unwrap();
        assert_eq!(book.get_clients().unwrap(), vec![client("Umbrella")]);
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let book = ClientBook::new(dir.path().join("nested/deeper/clients.json"));
        book.save_clients(&[client("Globex")]).unwrap();
        assert!(book.path().exists());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let book = ClientBook::in_dir(dir.path());
        fs::write(book.path(), "{not json").unwrap();
        let err = book.get_clients().unwrap_err();
        assert!(matches!(err, QuoteError::Json(_)));
        assert!(err.to_string().starts_with("Client list JSON error"));
    }
}
