//! Configuration for signature verification.

/// Options for a single verification call.
///
/// Certificate chain and revocation checks are never performed, so there is
/// no switch for them here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Index of the SignerInfo to verify, in order of appearance.
    pub signer_index: usize,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl VerifyOptions {
    /// Create new options with defaults (first signer).
    pub fn new() -> Self {
        Self { signer_index: 0 }
    }

    /// Select which signer to verify.
    pub fn with_signer_index(mut self, index: usize) -> Self {
        self.signer_index = index;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_first_signer() {
        assert_eq!(VerifyOptions::default().signer_index, 0);
    }

    #[test]
    fn test_with_signer_index() {
        let opts = VerifyOptions::new().with_signer_index(2);
        assert_eq!(opts.signer_index, 2);
    }
}
