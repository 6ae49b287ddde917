//! Validate incoming SAML `LogoutResponse` messages
//!
//! Mirrors the request side but correlates against the `LogoutRequest`
//! this response answers: `InResponseTo`, when present, must name the
//! request's ID, and the destination is checked against the response
//! location rather than the request location.

use crate::error::SamlResult;
use crate::message::{Saml2LogoutRequest, Saml2LogoutResponse};
use crate::registration::RelyingPartyRegistration;
use crate::result::{Saml2Error, Saml2ErrorCode, ValidationResult};
use crate::saml::{STATUS_PARTIAL_LOGOUT, STATUS_SUCCESS};
use crate::services::logout_parser::{parse_logout_response_xml, ParsedLogoutResponse};
use crate::services::logout_request_validator::decode_message;
use crate::services::signature_validator::SignatureValidator;

/// Inputs for one logout response validation
pub struct LogoutResponseValidatorParameters<'a> {
    /// The received wire message
    pub logout_response: &'a Saml2LogoutResponse,
    /// The `LogoutRequest` this response is expected to answer
    pub logout_request: &'a Saml2LogoutRequest,
    /// Trust configuration for the asserting party that sent it
    pub registration: &'a RelyingPartyRegistration,
}

type ResponseCheck = fn(
    &ParsedLogoutResponse,
    &Saml2LogoutRequest,
    &RelyingPartyRegistration,
) -> ValidationResult;

const RESPONSE_CHECKS: [ResponseCheck; 4] = [
    validate_in_response_to,
    validate_issuer,
    validate_destination,
    validate_status,
];

/// Validates `LogoutResponse` messages received from an asserting party
#[derive(Debug, Default)]
pub struct LogoutResponseValidator;

impl LogoutResponseValidator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decode, parse and validate a logout response.
    ///
    /// Returns `Err` only when the message cannot be decoded or parsed;
    /// all semantic findings land in the returned [`ValidationResult`].
    pub fn validate(
        &self,
        parameters: &LogoutResponseValidatorParameters<'_>,
    ) -> SamlResult<ValidationResult> {
        let response = parameters.logout_response;
        let registration = parameters.registration;

        let xml = decode_message(&response.saml_response, response.binding)?;
        let parsed = parse_logout_response_xml(&xml)?;

        let signature = if parsed.signed {
            SignatureValidator::verify_post(&xml, registration)
        } else {
            SignatureValidator::verify_redirect(
                "SAMLResponse",
                &response.saml_response,
                response.relay_state.as_deref(),
                response.sig_alg.as_deref(),
                response.signature.as_deref(),
                registration,
            )
        };

        let result = RESPONSE_CHECKS.iter().fold(signature, |acc, check| {
            acc.concat(check(&parsed, parameters.logout_request, registration))
        });

        if result.has_errors() {
            tracing::warn!(
                issuer = parsed.issuer.as_deref().unwrap_or("<missing>"),
                error_count = result.errors().len(),
                "logout response failed validation"
            );
        }
        Ok(result)
    }
}

fn validate_in_response_to(
    response: &ParsedLogoutResponse,
    logout_request: &Saml2LogoutRequest,
    _registration: &RelyingPartyRegistration,
) -> ValidationResult {
    // An absent InResponseTo is tolerated; some asserting parties omit it
    match response.in_response_to.as_deref() {
        None => ValidationResult::success(),
        Some(in_response_to) if in_response_to == logout_request.id => {
            ValidationResult::success()
        }
        Some(_) => ValidationResult::failure_of(Saml2Error::new(
            Saml2ErrorCode::InvalidResponse,
            "LogoutResponse InResponseTo doesn't match ID of associated LogoutRequest",
        )),
    }
}

fn validate_issuer(
    response: &ParsedLogoutResponse,
    _logout_request: &Saml2LogoutRequest,
    registration: &RelyingPartyRegistration,
) -> ValidationResult {
    match response.issuer.as_deref() {
        None => ValidationResult::failure_of(Saml2Error::new(
            Saml2ErrorCode::InvalidIssuer,
            "Failed to find issuer in LogoutResponse",
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
    response: &ParsedLogoutResponse,
    _logout_request: &Saml2LogoutRequest,
    registration: &RelyingPartyRegistration,
) -> ValidationResult {
    match response.destination.as_deref() {
        None => ValidationResult::failure_of(Saml2Error::new(
            Saml2ErrorCode::InvalidDestination,
            "Failed to find destination in LogoutResponse",
        )),
        Some(destination)
            if destination != registration.single_logout_service_response_location() =>
        {
            ValidationResult::failure_of(Saml2Error::new(
                Saml2ErrorCode::InvalidDestination,
                "Failed to match destination to configured destination",
            ))
        }
        Some(_) => ValidationResult::success(),
    }
}

fn validate_status(
    response: &ParsedLogoutResponse,
    _logout_request: &Saml2LogoutRequest,
    _registration: &RelyingPartyRegistration,
) -> ValidationResult {
    // A response without a status is treated as successful
    match response.status_code.as_deref() {
        None => ValidationResult::success(),
        Some(STATUS_SUCCESS) | Some(STATUS_PARTIAL_LOGOUT) => ValidationResult::success(),
        Some(_) => ValidationResult::failure_of(Saml2Error::new(
            Saml2ErrorCode::InvalidResponse,
            "Response indicated logout failed",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RelyingPartyRegistration {
        RelyingPartyRegistration::builder()
            .entity_id("https://rp.example.org/saml2/metadata")
            .asserting_party_entity_id("https://ap.example.com/idp")
            .single_logout_service_location("https://rp.example.org/logout/saml2/slo")
            .build()
            .unwrap()
    }

    fn request() -> Saml2LogoutRequest {
        Saml2LogoutRequest::new("_request-id", crate::message::Saml2Binding::Post, "encoded")
    }

    fn response_with(
        in_response_to: Option<&str>,
        status_code: Option<&str>,
    ) -> ParsedLogoutResponse {
        ParsedLogoutResponse {
            in_response_to: in_response_to.map(String::from),
            status_code: status_code.map(String::from),
            ..ParsedLogoutResponse::default()
        }
    }

    #[test]
    fn test_missing_in_response_to_is_tolerated() {
        let result = validate_in_response_to(&response_with(None, None), &request(), &registration());
        assert!(!result.has_errors());
    }

    #[test]
    fn test_mismatched_in_response_to() {
        let result = validate_in_response_to(
            &response_with(Some("_other-id"), None),
            &request(),
            &registration(),
        );
        assert_eq!(result.errors()[0].code(), Saml2ErrorCode::InvalidResponse);
    }

    #[test]
    fn test_matching_in_response_to() {
        let result = validate_in_response_to(
            &response_with(Some("_request-id"), None),
            &request(),
            &registration(),
        );
        assert!(!result.has_errors());
    }

    #[test]
    fn test_missing_status_is_success() {
        let result = validate_status(&response_with(None, None), &request(), &registration());
        assert!(!result.has_errors());
    }

    #[test]
    fn test_partial_logout_is_success() {
        let result = validate_status(
            &response_with(None, Some(STATUS_PARTIAL_LOGOUT)),
            &request(),
            &registration(),
        );
        assert!(!result.has_errors());
    }

    #[test]
    fn test_failure_status() {
        let result = validate_status(
            &response_with(None, Some("urn:oasis:names:tc:SAML:2.0:status:Requester")),
            &request(),
            &registration(),
        );
        assert_eq!(result.errors()[0].code(), Saml2ErrorCode::InvalidResponse);
    }
}
