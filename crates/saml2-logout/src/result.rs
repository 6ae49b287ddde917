//! Validation error taxonomy and the accumulating validation result
//!
//! Semantic checks never short-circuit: every applicable rule runs and its
//! outcome is merged into one [`ValidationResult`], so a caller sees all
//! violations for a message in a single pass.

use std::fmt;

/// Fixed taxonomy of SAML validation error codes.
///
/// Signature problems of any kind map to [`InvalidSignature`] — the code
/// deliberately does not distinguish a parse failure from a wrong key, to
/// avoid handing an attacker an oracle.
///
/// [`InvalidSignature`]: Saml2ErrorCode::InvalidSignature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Saml2ErrorCode {
    InvalidSignature,
    InvalidIssuer,
    InvalidDestination,
    InvalidRequest,
    InvalidResponse,
    SubjectNotFound,
    MalformedResponseData,
    DecryptionError,
}

impl Saml2ErrorCode {
    /// Stable string form of the code
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidSignature => "invalid_signature",
            Self::InvalidIssuer => "invalid_issuer",
            Self::InvalidDestination => "invalid_destination",
            Self::InvalidRequest => "invalid_request",
            Self::InvalidResponse => "invalid_response",
            Self::SubjectNotFound => "subject_not_found",
            Self::MalformedResponseData => "malformed_response_data",
            Self::DecryptionError => "decryption_error",
        }
    }
}

impl fmt::Display for Saml2ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation error: a code from the fixed taxonomy plus a
/// human-readable description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saml2Error {
    code: Saml2ErrorCode,
    description: String,
}

impl Saml2Error {
    pub fn new(code: Saml2ErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> Saml2ErrorCode {
        self.code
    }

    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}

impl fmt::Display for Saml2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)
    }
}

/// An append-only collection of validation errors.
///
/// An empty result denotes success. `concat` consumes the receiver and
/// returns a new result; existing values are never mutated in place.
/// The empty result carries an empty `Vec`, which allocates nothing, so
/// `success()` is free to call per validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<Saml2Error>,
}

impl ValidationResult {
    /// The canonical empty (successful) result
    #[must_use]
    pub fn success() -> Self {
        Self { errors: Vec::new() }
    }

    /// A result wrapping the given errors.
    ///
    /// An empty collection canonicalizes to [`ValidationResult::success`].
    #[must_use]
    pub fn failure(errors: Vec<Saml2Error>) -> Self {
        Self { errors }
    }

    /// A result wrapping a single error
    #[must_use]
    pub fn failure_of(error: Saml2Error) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Whether this result carries any errors. O(1).
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The accumulated errors, in insertion order
    #[must_use]
    pub fn errors(&self) -> &[Saml2Error] {
        &self.errors
    }

    /// Consume this result and return its errors
    #[must_use]
    pub fn into_errors(self) -> Vec<Saml2Error> {
        self.errors
    }

    /// A new result holding this result's errors followed by `error`
    #[must_use]
    pub fn concat_error(mut self, error: Saml2Error) -> Self {
        self.errors.push(error);
        self
    }

    /// A new result holding this result's errors followed by `other`'s
    #[must_use]
    pub fn concat(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(code: Saml2ErrorCode, desc: &str) -> Saml2Error {
        Saml2Error::new(code, desc)
    }

    #[test]
    fn test_success_has_no_errors() {
        let result = ValidationResult::success();
        assert!(!result.has_errors());
        assert!(result.errors().is_empty());
    }

    #[test]
    fn test_empty_failure_equals_success() {
        assert_eq!(ValidationResult::failure(Vec::new()), ValidationResult::success());
    }

    #[test]
    fn test_concat_preserves_order() {
        let e1 = err(Saml2ErrorCode::InvalidIssuer, "issuer");
        let e2 = err(Saml2ErrorCode::InvalidDestination, "destination");

        let chained = ValidationResult::success()
            .concat_error(e1.clone())
            .concat_error(e2.clone());
        let batched = ValidationResult::failure(vec![e1, e2]);

        assert_eq!(chained, batched);
        assert_eq!(chained.errors()[0].code(), Saml2ErrorCode::InvalidIssuer);
        assert_eq!(chained.errors()[1].code(), Saml2ErrorCode::InvalidDestination);
    }

    #[test]
    fn test_concat_is_associative() {
        let e1 = err(Saml2ErrorCode::InvalidSignature, "a");
        let e2 = err(Saml2ErrorCode::InvalidResponse, "b");
        let e3 = err(Saml2ErrorCode::SubjectNotFound, "c");

        let left = ValidationResult::failure_of(e1.clone())
            .concat(ValidationResult::failure_of(e2.clone()))
            .concat(ValidationResult::failure_of(e3.clone()));
        let right = ValidationResult::failure_of(e1).concat(
            ValidationResult::failure_of(e2).concat(ValidationResult::failure_of(e3)),
        );

        assert_eq!(left, right);
    }

    #[test]
    fn test_concat_with_success_is_identity() {
        let result = ValidationResult::failure_of(err(Saml2ErrorCode::InvalidRequest, "x"));
        assert_eq!(result.clone().concat(ValidationResult::success()), result);
        assert_eq!(ValidationResult::success().concat(result.clone()), result);
    }

    #[test]
    fn test_error_code_strings() {
        assert_eq!(Saml2ErrorCode::InvalidSignature.as_str(), "invalid_signature");
        assert_eq!(Saml2ErrorCode::SubjectNotFound.as_str(), "subject_not_found");
        assert_eq!(
            Saml2ErrorCode::MalformedResponseData.as_str(),
            "malformed_response_data"
        );
    }
}
