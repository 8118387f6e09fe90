use std::{
    fs,
    path::{Path, PathBuf},
};

use super::ExtractError;

/// Produces the text of one bill document.
#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Local PDF text extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfText;

#[async_trait::async_trait]
impl TextExtractor for PdfText {
    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        load_text(path).await
    }
}

/// Every `*.pdf` directly under `dir`, sorted by file name.
pub fn list_bills(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut bills: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    bills.sort();
    Ok(bills)
}

/// Extract the text of one PDF. Runs on the blocking pool; a panic inside
/// the PDF library is reported as an unreadable document.
pub async fn load_text(path: &Path) -> Result<String, ExtractError> {
    let bytes = tokio::task::spawn_blocking({
        let path = path.to_path_buf();
        move || fs::read(&path)
    })
    .await
    .map_err(|e| ExtractError::Document(e.to_string()))?
    .map_err(|e| ExtractError::Document(e.to_string()))?;

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ExtractError::Document(format!("PDF reader panicked: {e}")))?
        .map_err(|e| ExtractError::Document(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(ExtractError::EmptyText);
    }
    Ok(text)
}
