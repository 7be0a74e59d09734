use bytes::Bytes;
use sqlx::PgPool;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::models::Document;

pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

const DOCUMENT_COLUMNS: &str =
    "id, player_id, uploaded_by, file_name, content_type, size_bytes, storage_path, created_at";

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub root: PathBuf,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let root = env::var("DOCUMENT_STORAGE_ROOT")
            .unwrap_or_else(|_| "./data/documents".to_string());
        StorageConfig { root: PathBuf::from(root) }
    }
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Document not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug)]
pub struct NewDocument {
    pub player_id: Option<Uuid>,
    pub uploaded_by: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Stores attachment bytes on disk under a configured root and keeps
/// the metadata row in the database.
#[derive(Clone)]
pub struct DocumentService {
    db: PgPool,
    root: PathBuf,
}

impl DocumentService {
    pub fn new(db: PgPool, config: StorageConfig) -> Self {
        Self {
            db,
            root: config.root,
        }
    }

    pub async fn store(&self, upload: NewDocument) -> Result<Document, DocumentError> {
        if upload.file_name.is_empty() {
            return Err(DocumentError::Validation("file name is required".to_string()));
        }
        if upload.data.is_empty() {
            return Err(DocumentError::Validation("file is empty".to_string()));
        }
        if upload.data.len() > MAX_DOCUMENT_BYTES {
            return Err(DocumentError::Validation(format!(
                "file exceeds the {MAX_DOCUMENT_BYTES} byte limit"
            )));
        }
        if upload.content_type.parse::<mime::Mime>().is_err() {
            return Err(DocumentError::Validation(format!(
                "invalid content type '{}'",
                upload.content_type
            )));
        }

        let stored_name = match extension_of(&upload.file_name) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        let path = self.root.join(&stored_name);

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, &upload.data).await?;

        let document = sqlx::query_as::<_, Document>(&format!(
            "INSERT INTO documents \
             (player_id, uploaded_by, file_name, content_type, size_bytes, storage_path) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(upload.player_id)
        .bind(upload.uploaded_by)
        .bind(&upload.file_name)
        .bind(&upload.content_type)
        .bind(upload.data.len() as i64)
        .bind(path.to_string_lossy().as_ref())
        .fetch_one(&self.db)
        .await?;

        Ok(document)
    }

    pub async fn get(&self, document_id: Uuid) -> Result<Option<Document>, DocumentError> {
        let document = sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"
        ))
        .bind(document_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(document)
    }

    pub async fn list_for_player(&self, player_id: Uuid) -> Result<Vec<Document>, DocumentError> {
        let documents = sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents \
             WHERE player_id = $1 ORDER BY created_at DESC"
        ))
        .bind(player_id)
        .fetch_all(&self.db)
        .await?;
        Ok(documents)
    }

    /// Open the stored bytes for streaming to a response body.
    pub async fn open_content(&self, document: &Document) -> Result<tokio::fs::File, DocumentError> {
        Ok(tokio::fs::File::open(&document.storage_path).await?)
    }

    /// Delete metadata and bytes. A missing file on disk is logged and
    /// otherwise ignored so a stale row can always be cleared.
    pub async fn delete(&self, document_id: Uuid) -> Result<bool, DocumentError> {
        let Some(document) = self.get(document_id).await? else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&self.db)
            .await?;

        if let Err(e) = tokio::fs::remove_file(&document.storage_path).await {
            warn!(
                "could not remove stored file {}: {e}",
                document.storage_path
            );
        }
        Ok(true)
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    let safe: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(10)
        .collect();
    if safe.is_empty() {
        None
    } else {
        Some(safe.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_sanitizing() {
        assert_eq!(extension_of("report.pdf"), Some("pdf".to_string()));
        assert_eq!(extension_of("archive.tar.GZ"), Some("gz".to_string()));
        assert_eq!(extension_of("no_extension"), None);
        assert_eq!(extension_of("notes.T X T"), Some("txt".to_string()));
    }
}
