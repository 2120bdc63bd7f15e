//! Error types for the signature library.
//!
//! Only structural failures travel through [`Error`]. Expected negative
//! outcomes (not a SignedData, missing detached content, signature mismatch)
//! are reported as data on [`crate::signatures::VerificationOutcome`].

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while decoding or verifying a `.p7s` message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input bytes could not be decoded as a BER/DER CMS structure
    #[error("Malformed BER/DER encoding: {0}")]
    MalformedEncoding(String),

    /// Digest or signature algorithm OID with no implementation
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signer public key could not be decoded
    #[error("Invalid public key: {0}")]
    InvalidKey(String),

    /// No certificate in the SignedData matches the signer identifier
    #[error("Signer certificate not found: {0}")]
    CertificateNotFound(String),

    /// Any other failure raised while evaluating a signature
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error means the input itself is structurally broken.
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::MalformedEncoding(_))
    }
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Self {
        Error::MalformedEncoding(err.to_string())
    }
}
