//! Fatal error types for SAML logout processing
//!
//! These errors cover the cases where a message cannot even be decoded or
//! parsed. Semantic validation failures (wrong issuer, bad signature, ...)
//! are not errors in this sense — they accumulate in a
//! [`ValidationResult`](crate::ValidationResult) instead.

use thiserror::Error;

/// Result type for SAML logout operations
pub type SamlResult<T> = Result<T, SamlError>;

/// Fatal SAML processing errors
#[derive(Debug, Error)]
pub enum SamlError {
    /// Base64 or DEFLATE decoding failed, or the inflated output exceeded
    /// the size cap
    #[error("decoding error: {0}")]
    Decoding(String),

    /// The message could not be parsed as a SAML logout message
    #[error("malformed SAML message: {0}")]
    MalformedMessage(String),

    /// Certificate parsing or key extraction error
    #[error("invalid certificate: {0}")]
    Certificate(String),

    /// Private key error
    #[error("private key error: {0}")]
    PrivateKey(String),

    /// Signature verification could not be carried out
    #[error("signature validation failed: {0}")]
    SignatureInvalid(String),

    /// Signature creation failed
    #[error("signature creation failed: {0}")]
    SignatureCreation(String),

    /// Registration configuration is incomplete or inconsistent
    #[error("invalid registration: {0}")]
    Registration(String),
}
