//! User content entering the pipeline.

use std::path::Path;

use crate::domain::error::{BenchError, Result};

/// Upper bound on submitted text, in characters.
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 50_000;

/// A file uploaded by the user, sent to the extraction service as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// What the user submitted for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSubmission {
    /// Raw text typed or pasted by the user.
    Text(String),
    /// A document that must be converted to text by the extraction service.
    Document(UploadedDocument),
}

impl ContentSubmission {
    pub fn text(content: impl Into<String>) -> Self {
        ContentSubmission::Text(content.into())
    }

    pub fn document(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        ContentSubmission::Document(UploadedDocument {
            file_name: file_name.into(),
            bytes,
        })
    }

    /// Read a file from disk as a document submission.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| BenchError::invalid(format!("no file name in {}", path.display())))?;
        let bytes = std::fs::read(path)?;
        Ok(Self::document(file_name, bytes))
    }
}

impl UploadedDocument {
    /// Reject uploads the extraction service could not possibly handle.
    pub fn validate(&self) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(BenchError::invalid("no file selected"));
        }
        if self.bytes.is_empty() {
            return Err(BenchError::invalid(format!(
                "uploaded file {} is empty",
                self.file_name
            )));
        }
        Ok(())
    }
}

/// Trim `text` and check it against the length bound.
pub fn validate_text(text: &str, max_chars: usize) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(BenchError::invalid("no content provided"));
    }
    let chars = trimmed.chars().count();
    if chars > max_chars {
        return Err(BenchError::invalid(format!(
            "content is {chars} characters, limit is {max_chars}"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text_trims() {
        let text = validate_text("  plan a trip to Lisbon \n", 100).unwrap();
        assert_eq!(text, "plan a trip to Lisbon");
    }

    #[test]
    fn test_validate_text_rejects_blank() {
        let err = validate_text(" \n\t ", 100).unwrap_err();
        assert!(matches!(err, BenchError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_text_counts_chars_not_bytes() {
        // 4 chars, 8 bytes
        assert!(validate_text("ßßßß", 4).is_ok());
        assert!(validate_text("ßßßßß", 4).is_err());
    }

    #[test]
    fn test_document_validation() {
        let doc = UploadedDocument {
            file_name: "resume.pdf".to_string(),
            bytes: vec![],
        };
        assert!(doc.validate().is_err());

        let doc = UploadedDocument {
            file_name: " ".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert!(doc.validate().is_err());

        let doc = UploadedDocument {
            file_name: "resume.pdf".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, b"# Notes").unwrap();

        match ContentSubmission::from_path(&path).unwrap() {
            ContentSubmission::Document(doc) => {
                assert_eq!(doc.file_name, "notes.md");
                assert_eq!(doc.bytes, b"# Notes".to_vec());
            }
            other => panic!("expected document, got {other:?}"),
        }
    }
}
