//! Logout message signature validation
//!
//! Two verification modes, selected by how the message was signed:
//! an enveloped XML signature inside the document (POST binding), or a
//! detached signature over the ordered query parameters (Redirect binding).
//! Every failure surfaces as the single coarse `invalid_signature` code so
//! callers cannot be used as a parse-vs-crypto oracle; the specific cause
//! is only logged.

use crate::codec;
use crate::error::{SamlError, SamlResult};
use crate::registration::RelyingPartyRegistration;
use crate::result::{Saml2Error, Saml2ErrorCode, ValidationResult};
use crate::saml::xmlsig::{
    build_signed_info, canonicalize_xml, remove_signature_element, SignatureAlgorithm,
};
use openssl::hash::hash;
use openssl::sign::Verifier;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Validates logout message signatures against a registration's trusted
/// verification certificates
pub struct SignatureValidator;

impl SignatureValidator {
    /// Verify the enveloped XML signature of a signed logout message.
    pub fn verify_post(xml: &str, registration: &RelyingPartyRegistration) -> ValidationResult {
        match verify_post_inner(xml, registration) {
            Ok(()) => ValidationResult::success(),
            Err(err) => {
                tracing::debug!(error = %err, "embedded logout signature rejected");
                invalid_signature()
            }
        }
    }

    /// Verify the detached query-parameter signature of a Redirect-binding
    /// message. An unsigned message (no `Signature` parameter) passes —
    /// requiring a signature is the caller's policy, not this layer's.
    pub fn verify_redirect(
        message_param: &str,
        message_value: &str,
        relay_state: Option<&str>,
        sig_alg: Option<&str>,
        signature: Option<&str>,
        registration: &RelyingPartyRegistration,
    ) -> ValidationResult {
        let Some(signature) = signature else {
            return ValidationResult::success();
        };
        match verify_redirect_inner(
            message_param,
            message_value,
            relay_state,
            sig_alg,
            signature,
            registration,
        ) {
            Ok(()) => ValidationResult::success(),
            Err(err) => {
                tracing::debug!(error = %err, "detached logout signature rejected");
                invalid_signature()
            }
        }
    }
}

fn invalid_signature() -> ValidationResult {
    ValidationResult::failure_of(Saml2Error::new(
        Saml2ErrorCode::InvalidSignature,
        "Failed to verify the signature of the logout message",
    ))
}

fn verify_post_inner(xml: &str, registration: &RelyingPartyRegistration) -> SamlResult<()> {
    let info = extract_signature_info(xml)?;

    let algorithm = SignatureAlgorithm::from_uri(&info.signature_method).ok_or_else(|| {
        SamlError::SignatureInvalid(format!(
            "Unsupported signature algorithm: {}",
            info.signature_method
        ))
    })?;

    // The reference must target the document root, otherwise a signature
    // lifted from elsewhere (signature wrapping) could validate
    let root_id = extract_root_id(xml)?;
    if !info.reference_uri.is_empty() {
        let target = info.reference_uri.strip_prefix('#').ok_or_else(|| {
            SamlError::SignatureInvalid(format!(
                "Reference URI is not a local reference: {}",
                info.reference_uri
            ))
        })?;
        if root_id.as_deref() != Some(target) {
            return Err(SamlError::SignatureInvalid(format!(
                "Reference URI does not target the document root: {}",
                info.reference_uri
            )));
        }
    }

    // Enveloped transform: digest the document with the signature removed
    let content = remove_signature_element(xml);
    let canonical = canonicalize_xml(&content)?;
    let digest_md = info
        .digest_method
        .as_deref()
        .and_then(SignatureAlgorithm::digest_from_uri)
        .unwrap_or_else(|| algorithm.message_digest());
    let computed = hash(digest_md, canonical.as_bytes())
        .map_err(|e| SamlError::SignatureInvalid(format!("Digest computation failed: {e}")))?;
    if codec::encode(&computed) != info.digest_value {
        return Err(SamlError::SignatureInvalid("Digest mismatch".to_string()));
    }

    // The signature itself covers the canonicalized SignedInfo
    let signed_info = build_signed_info(algorithm, &info.reference_uri, &info.digest_value);
    let canonical_signed_info = canonicalize_xml(&signed_info)?;
    let signature_bytes = codec::decode(&info.signature_value)
        .map_err(|e| SamlError::SignatureInvalid(format!("Invalid signature encoding: {e}")))?;

    // An embedded certificate must itself be one of the trusted credentials
    if let Some(ref cert_b64) = info.x509_certificate {
        let cert_der = codec::decode(cert_b64)
            .map_err(|e| SamlError::SignatureInvalid(format!("Invalid certificate encoding: {e}")))?;
        let trusted = registration.verification_certificates().iter().any(|c| {
            c.to_der().map(|der| der == cert_der).unwrap_or(false)
        });
        if !trusted {
            return Err(SamlError::SignatureInvalid(
                "Signing certificate is not a configured verification credential".to_string(),
            ));
        }
    }

    verify_with_trusted_certificates(
        canonical_signed_info.as_bytes(),
        &signature_bytes,
        algorithm,
        registration,
    )
}

fn verify_redirect_inner(
    message_param: &str,
    message_value: &str,
    relay_state: Option<&str>,
    sig_alg: Option<&str>,
    signature: &str,
    registration: &RelyingPartyRegistration,
) -> SamlResult<()> {
    let sig_alg = sig_alg.ok_or_else(|| {
        SamlError::SignatureInvalid("Signature present without SigAlg parameter".to_string())
    })?;
    let algorithm = SignatureAlgorithm::from_uri(sig_alg).ok_or_else(|| {
        SamlError::SignatureInvalid(format!("Unsupported signature algorithm: {sig_alg}"))
    })?;

    let content = crate::saml::xmlsig::redirect_signing_content(
        message_param,
        message_value,
        relay_state,
        sig_alg,
    );
    let signature_bytes = codec::decode(signature)
        .map_err(|e| SamlError::SignatureInvalid(format!("Invalid signature encoding: {e}")))?;

    verify_with_trusted_certificates(
        content.as_bytes(),
        &signature_bytes,
        algorithm,
        registration,
    )
}

/// Try each trusted certificate until one validates the signature
fn verify_with_trusted_certificates(
    data: &[u8],
    signature: &[u8],
    algorithm: SignatureAlgorithm,
    registration: &RelyingPartyRegistration,
) -> SamlResult<()> {
    if registration.verification_certificates().is_empty() {
        return Err(SamlError::SignatureInvalid(
            "No verification credentials configured".to_string(),
        ));
    }

    for certificate in registration.verification_certificates() {
        let Ok(public_key) = certificate.public_key() else {
            continue;
        };
        let verified = Verifier::new(algorithm.message_digest(), &public_key)
            .and_then(|mut verifier| {
                verifier.update(data)?;
                verifier.verify(signature)
            })
            .unwrap_or(false);
        if verified {
            return Ok(());
        }
    }

    Err(SamlError::SignatureInvalid(
        "Signature did not verify against any trusted credential".to_string(),
    ))
}

/// Signature fields extracted from a signed document
struct SignatureInfo {
    signature_method: String,
    digest_method: Option<String>,
    reference_uri: String,
    digest_value: String,
    signature_value: String,
    x509_certificate: Option<String>,
}

fn extract_signature_info(xml: &str) -> SamlResult<SignatureInfo> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut signature_method = None;
    let mut digest_method = None;
    let mut reference_uri = None;
    let mut digest_value = None;
    let mut signature_value = None;
    let mut x509_certificate = None;
    let mut current_element = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let local = String::from_utf8_lossy(e.local_name().into_inner()).to_string();
                match local.as_str() {
                    "SignatureMethod" if signature_method.is_none() => {
                        signature_method = attribute_value(e, "Algorithm");
                    }
                    "DigestMethod" if digest_method.is_none() => {
                        digest_method = attribute_value(e, "Algorithm");
                    }
                    "Reference" if reference_uri.is_none() => {
                        reference_uri = attribute_value(e, "URI");
                    }
                    _ => {}
                }
                current_element = local;
            }
            Ok(Event::Text(ref e)) => {
                let text = e.decode().unwrap_or_default().to_string();
                match current_element.as_str() {
                    "DigestValue" if digest_value.is_none() => {
                        digest_value = Some(strip_whitespace(&text));
                    }
                    "SignatureValue" if signature_value.is_none() => {
                        signature_value = Some(strip_whitespace(&text));
                    }
                    "X509Certificate" if x509_certificate.is_none() => {
                        x509_certificate = Some(strip_whitespace(&text));
                    }
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current_element.clear(),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SamlError::SignatureInvalid(format!("XML parse error: {e}")));
            }
            _ => {}
        }
    }

    Ok(SignatureInfo {
        signature_method: signature_method
            .ok_or_else(|| SamlError::SignatureInvalid("No SignatureMethod found".to_string()))?,
        digest_method,
        reference_uri: reference_uri
            .ok_or_else(|| SamlError::SignatureInvalid("No Reference found".to_string()))?,
        digest_value: digest_value
            .ok_or_else(|| SamlError::SignatureInvalid("No DigestValue found".to_string()))?,
        signature_value: signature_value
            .ok_or_else(|| SamlError::SignatureInvalid("No SignatureValue found".to_string()))?,
        x509_certificate,
    })
}

/// The `ID` attribute of the document's root element
fn extract_root_id(xml: &str) -> SamlResult<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                return Ok(attribute_value(e, "ID"));
            }
            Ok(Event::Eof) => {
                return Err(SamlError::SignatureInvalid(
                    "Document has no root element".to_string(),
                ));
            }
            Err(e) => {
                return Err(SamlError::SignatureInvalid(format!("XML parse error: {e}")));
            }
            _ => {}
        }
    }
}

fn attribute_value(e: &quick_xml::events::BytesStart<'_>, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.local_name().into_inner()).to_string();
        if key == name {
            return Some(attr.unescape_value().unwrap_or_default().to_string());
        }
    }
    None
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}
