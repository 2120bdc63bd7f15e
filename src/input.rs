//! Upload handling for the hosting application.
//!
//! Classifies uploaded files and turns verification outcomes into messages
//! a user can act on.

use crate::error::Result;
use crate::signatures::{FailureKind, VerificationOutcome};
use std::path::Path;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Kind of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A `.p7s` signature file
    Signature,
    /// A PDF document
    Pdf,
    /// Anything else
    Unsupported,
}

impl InputKind {
    /// Classify a file by name, falling back to the PDF header.
    pub fn detect(file_name: &str, bytes: &[u8]) -> Self {
        let name = file_name.to_lowercase();
        if name.ends_with(".p7s") {
            InputKind::Signature
        } else if name.ends_with(".pdf") || bytes.starts_with(PDF_MAGIC) {
            InputKind::Pdf
        } else {
            InputKind::Unsupported
        }
    }

    /// Message shown when an upload is rejected.
    pub fn rejection_message(&self) -> Option<&'static str> {
        match self {
            InputKind::Unsupported => Some("Select a PDF (.pdf) or signature (.p7s) file."),
            _ => None,
        }
    }
}

/// Read a whole file into memory.
pub fn read_input(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    log::debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Actionable message for a verification outcome.
pub fn user_message(outcome: &VerificationOutcome) -> String {
    let reason = outcome.reason.as_deref().unwrap_or_default();
    match outcome.failure {
        None if outcome.ok => "Signature is valid: it matches the document content.".to_string(),
        Some(FailureKind::NotSignedData) => {
            "The selected file is not a SignedData (.p7s) signature.".to_string()
        },
        Some(FailureKind::MissingDetachedContent) => {
            "This signature is detached: add the original document to verify it.".to_string()
        },
        Some(FailureKind::SignatureMismatch) => {
            format!("Signature does not match the document ({}).", reason)
        },
        Some(FailureKind::VerificationException) | None => {
            format!("The signature could not be verified: {}", reason)
        },
    }
}
