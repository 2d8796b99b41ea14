//! Destination of exported documents.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_CLIENT_NAME: &str = "cliente";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not write `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("document store rejected `{filename}`: {reason}")]
    Rejected { filename: String, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoredDocument {
    pub filename: String,
    pub location: String,
    pub size: usize,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<StoredDocument, StoreError>;
}

/// `Cotizacion_<client>.<ext>`, with `cliente` standing in for a blank name.
/// Path separators in the name are replaced so the file stays in place.
pub fn export_filename(client_name: &str, extension: &str) -> String {
    let name = client_name.trim();
    let name = if name.is_empty() { DEFAULT_CLIENT_NAME } else { name };
    let name: String =
        name.chars().map(|ch| if matches!(ch, '/' | '\\') { '_' } else { ch }).collect();
    format!("Cotizacion_{name}.{extension}")
}

/// Writes documents into a directory, creating it on first use.
#[derive(Clone, Debug)]
pub struct FsDocumentStore {
    dir: PathBuf,
}

impl FsDocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<StoredDocument, StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Write { path: self.dir.clone(), source })?;

        let path = self.dir.join(filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StoreError::Write { path: path.clone(), source })?;

        Ok(StoredDocument {
            filename: filename.to_owned(),
            location: path.display().to_string(),
            size: bytes.len(),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryDocumentStore {
    files: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl InMemoryDocumentStore {
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        match self.files.lock() {
            Ok(files) => files.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<StoredDocument, StoreError> {
        let entry = (filename.to_owned(), bytes.to_vec());
        match self.files.lock() {
            Ok(mut files) => files.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
        Ok(StoredDocument {
            filename: filename.to_owned(),
            location: format!("memory://{filename}"),
            size: bytes.len(),
        })
    }
}
