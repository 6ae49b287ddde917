//! Validate incoming SAML `LogoutRequest` messages
//!
//! A single pass over a single message: decode, parse, verify the
//! signature, then run every field-level check and concatenate the
//! outcomes. Semantic failures accumulate — the caller sees all of them,
//! not just the first — while an undecodable or unparseable message fails
//! fast with a [`SamlError`].

use crate::codec;
use crate::error::{SamlError, SamlResult};
use crate::message::{Saml2Binding, Saml2LogoutRequest};
use crate::registration::RelyingPartyRegistration;
use crate::result::{Saml2Error, Saml2ErrorCode, ValidationResult};
use crate::services::logout_parser::{parse_logout_request_xml, ParsedLogoutRequest};
use crate::services::signature_validator::SignatureValidator;

/// Inputs for one logout request validation
pub struct LogoutRequestValidatorParameters<'a> {
    /// The received wire message
    pub logout_request: &'a Saml2LogoutRequest,
    /// Trust configuration for the asserting party that sent it
    pub registration: &'a RelyingPartyRegistration,
    /// Name of the currently authenticated principal, if any; `None` for
    /// idle-session logout, which skips the subject check
    pub authenticated_principal: Option<&'a str>,
}

/// Field-level checks, run unconditionally and in order
type RequestCheck =
    fn(&ParsedLogoutRequest, &RelyingPartyRegistration, Option<&str>) -> ValidationResult;

const REQUEST_CHECKS: [RequestCheck; 3] = [validate_issuer, validate_destination, validate_subject];

/// Validates `LogoutRequest` messages received from an asserting party
#[derive(Debug, Default)]
pub struct LogoutRequestValidator;

impl LogoutRequestValidator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decode, parse and validate a logout request.
    ///
    /// Returns `Err` only when the message cannot be decoded or parsed;
    /// all semantic findings land in the returned [`ValidationResult`].
    pub fn validate(
        &self,
        parameters: &LogoutRequestValidatorParameters<'_>,
    ) -> SamlResult<ValidationResult> {
        let request = parameters.logout_request;
        let registration = parameters.registration;

        let xml = decode_message(&request.saml_request, request.binding)?;
        let parsed = parse_logout_request_xml(&xml)?;

        let signature = if parsed.signed {
            SignatureValidator::verify_post(&xml, registration)
        } else {
            SignatureValidator::verify_redirect(
                "SAMLRequest",
                &request.saml_request,
                request.relay_state.as_deref(),
                request.sig_alg.as_deref(),
                request.signature.as_deref(),
                registration,
            )
        };

        let result = REQUEST_CHECKS.iter().fold(signature, |acc, check| {
            acc.concat(check(
                &parsed,
                registration,
                parameters.authenticated_principal,
            ))
        });

        if result.has_errors() {
            tracing::warn!(
                issuer = parsed.issuer.as_deref().unwrap_or("<missing>"),
                error_count = result.errors().len(),
                "logout request failed validation"
            );
        }
        Ok(result)
    }
}

/// Base64-decode a wire payload, inflating it first for the Redirect
/// binding, and return the XML text
pub(crate) fn decode_message(encoded: &str, binding: Saml2Binding) -> SamlResult<String> {
    match binding {
        Saml2Binding::Post => {
            if encoded.len() > codec::MAX_ENCODED_SIZE_POST {
                return Err(SamlError::Decoding("Encoded message too large".to_string()));
            }
            let bytes = codec::decode(encoded)?;
            String::from_utf8(bytes)
                .map_err(|e| SamlError::Decoding(format!("Invalid UTF-8: {e}")))
        }
        Saml2Binding::Redirect => {
            if encoded.len() > codec::MAX_ENCODED_SIZE_REDIRECT {
                return Err(SamlError::Decoding("Encoded message too large".to_string()));
            }
            let bytes = codec::decode(encoded)?;
            codec::inflate(&bytes)
        }
    }
}

fn validate_issuer(
    request: &ParsedLogoutRequest,
    registration: &RelyingPartyRegistration,
    _principal: Option<&str>,
) -> ValidationResult {
    match request.issuer.as_deref() {
        None => ValidationResult::failure_of(Saml2Error::new(
            Saml2ErrorCode::InvalidIssuer,
            "Failed to find issuer in LogoutRequest",
        )),
        Some(issuer) if issuer != registration.asserting_party_entity_id() => {
            ValidationResult::failure_of(Saml2Error::new(
                Saml2ErrorCode::InvalidIssuer,
                "Failed to match issuer to configured issuer",
            ))
        }
        Some(_) => ValidationResult::success(),
    }
}

fn validate_destination(
    request: &ParsedLogoutRequest,
    registration: &RelyingPartyRegistration,
    _principal: Option<&str>,
) -> ValidationResult {
    match request.destination.as_deref() {
        None => ValidationResult::failure_of(Saml2Error::new(
            Saml2ErrorCode::InvalidDestination,
            "Failed to find destination in LogoutRequest",
        )),
        Some(destination) if destination != registration.single_logout_service_location() => {
            ValidationResult::failure_of(Saml2Error::new(
                Saml2ErrorCode::InvalidDestination,
                "Failed to match destination to configured destination",
            ))
        }
        Some(_) => ValidationResult::success(),
    }
}

fn validate_subject(
    request: &ParsedLogoutRequest,
    _registration: &RelyingPartyRegistration,
    principal: Option<&str>,
) -> ValidationResult {
    // No authenticated session means nothing to cross-check
    let Some(principal) = principal else {
        return ValidationResult::success();
    };
    match request.name_id.as_deref() {
        None => ValidationResult::failure_of(Saml2Error::new(
            Saml2ErrorCode::SubjectNotFound,
            "Failed to find subject in LogoutRequest",
        )),
        Some(name) if name != principal => ValidationResult::failure_of(Saml2Error::new(
            Saml2ErrorCode::InvalidRequest,
            "Failed to match subject in LogoutRequest with currently logged in user",
        )),
        Some(_) => ValidationResult::success(),
    }
}
