use pdf_form_layout::LayoutError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Failed to read document: {0}")]
    DocumentRead(String),
    #[error("Failed to write document: {0}")]
    DocumentWrite(String),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Malformed document: {0}")]
    Structure(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
