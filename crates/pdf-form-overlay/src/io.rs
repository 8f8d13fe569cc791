//! Document read/write boundary

use crate::error::{OverlayError, Result};
use lopdf::Document;
use std::path::Path;

/// Load a PDF document from disk
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| OverlayError::DocumentRead(format!("{}: {}", path.display(), e)))?;
    let doc = load_pdf_bytes(bytes).await?;
    log::debug!("Loaded {} ({} page(s))", path.display(), doc.get_pages().len());
    Ok(doc)
}

/// Parse a PDF document held in memory
pub async fn load_pdf_bytes(bytes: Vec<u8>) -> Result<Document> {
    tokio::task::spawn_blocking(move || Document::load_mem(&bytes))
        .await?
        .map_err(|e| OverlayError::DocumentRead(e.to_string()))
}

/// Serialize a document to bytes
pub async fn pdf_to_bytes(mut doc: Document) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)
            .map_err(|e| OverlayError::DocumentWrite(e.to_string()))?;
        Ok::<_, OverlayError>(writer)
    })
    .await?
}

/// Save a document to disk
pub async fn save_pdf(doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = pdf_to_bytes(doc).await?;
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| OverlayError::DocumentWrite(format!("{}: {}", path.display(), e)))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}
