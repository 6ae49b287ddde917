//! Relying-party trust configuration
//!
//! A [`RelyingPartyRegistration`] identifies this system as a SAML relying
//! party and carries everything logout validation needs to know about one
//! asserting party: its entity id, its trusted verification certificates,
//! our logout endpoints, and the preferred binding. It is built once at
//! startup and read-only afterwards; validation never mutates it.

use crate::error::{SamlError, SamlResult};
use crate::message::Saml2Binding;
use base64::{engine::general_purpose::STANDARD, Engine};
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;

/// Parse an X.509 certificate from PEM, tolerating input without the
/// `-----BEGIN CERTIFICATE-----` headers (bare base64, as embedded in
/// SAML metadata).
pub(crate) fn parse_certificate(pem: &str) -> SamlResult<X509> {
    let pem_data = if pem.contains("-----BEGIN CERTIFICATE-----") {
        pem.to_string()
    } else {
        format!(
            "-----BEGIN CERTIFICATE-----\n{}\n-----END CERTIFICATE-----",
            pem.trim()
        )
    };

    X509::from_pem(pem_data.as_bytes())
        .map_err(|e| SamlError::Certificate(format!("Invalid certificate: {e}")))
}

/// Signing credentials: an X.509 certificate plus its private key
pub struct SigningCredentials {
    certificate: X509,
    private_key: PKey<Private>,
}

impl SigningCredentials {
    /// Load credentials from PEM-encoded certificate and private key
    pub fn from_pem(certificate_pem: &str, private_key_pem: &str) -> SamlResult<Self> {
        let certificate = parse_certificate(certificate_pem)?;
        let private_key = PKey::private_key_from_pem(private_key_pem.as_bytes())
            .map_err(|e| SamlError::PrivateKey(format!("Invalid private key: {e}")))?;
        Ok(Self {
            certificate,
            private_key,
        })
    }

    #[must_use]
    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }

    #[must_use]
    pub fn private_key(&self) -> &PKey<Private> {
        &self.private_key
    }

    /// The certificate as whitespace-free base64 DER, the form embedded in
    /// a `ds:X509Certificate` element
    pub fn certificate_base64(&self) -> SamlResult<String> {
        let der = self
            .certificate
            .to_der()
            .map_err(|e| SamlError::Certificate(format!("Certificate DER encoding failed: {e}")))?;
        Ok(STANDARD.encode(der))
    }
}

/// Static trust configuration for one asserting party
pub struct RelyingPartyRegistration {
    entity_id: String,
    asserting_party_entity_id: String,
    verification_certificates: Vec<X509>,
    signing_credentials: Option<SigningCredentials>,
    single_logout_service_location: String,
    single_logout_service_response_location: String,
    single_logout_service_binding: Saml2Binding,
}

impl RelyingPartyRegistration {
    #[must_use]
    pub fn builder() -> RelyingPartyRegistrationBuilder {
        RelyingPartyRegistrationBuilder::default()
    }

    /// Our entity id
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// The asserting party's entity id, matched against message issuers
    #[must_use]
    pub fn asserting_party_entity_id(&self) -> &str {
        &self.asserting_party_entity_id
    }

    /// Certificates trusted to have signed incoming logout messages
    #[must_use]
    pub fn verification_certificates(&self) -> &[X509] {
        &self.verification_certificates
    }

    /// Credentials used to sign outbound logout messages, if configured
    #[must_use]
    pub fn signing_credentials(&self) -> Option<&SigningCredentials> {
        self.signing_credentials.as_ref()
    }

    /// Where the asserting party sends logout requests (our endpoint)
    #[must_use]
    pub fn single_logout_service_location(&self) -> &str {
        &self.single_logout_service_location
    }

    /// Where the asserting party sends logout responses (our endpoint)
    #[must_use]
    pub fn single_logout_service_response_location(&self) -> &str {
        &self.single_logout_service_response_location
    }

    #[must_use]
    pub fn single_logout_service_binding(&self) -> Saml2Binding {
        self.single_logout_service_binding
    }
}

/// Builder for [`RelyingPartyRegistration`]
#[derive(Default)]
pub struct RelyingPartyRegistrationBuilder {
    entity_id: Option<String>,
    asserting_party_entity_id: Option<String>,
    verification_certificate_pems: Vec<String>,
    signing_credentials: Option<SigningCredentials>,
    single_logout_service_location: Option<String>,
    single_logout_service_response_location: Option<String>,
    single_logout_service_binding: Saml2Binding,
}

impl RelyingPartyRegistrationBuilder {
    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn asserting_party_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.asserting_party_entity_id = Some(entity_id.into());
        self
    }

    /// Add a trusted verification certificate (PEM, headers optional).
    /// May be called multiple times; signature verification tries each.
    #[must_use]
    pub fn verification_certificate_pem(mut self, pem: impl Into<String>) -> Self {
        self.verification_certificate_pems.push(pem.into());
        self
    }

    #[must_use]
    pub fn signing_credentials(mut self, credentials: SigningCredentials) -> Self {
        self.signing_credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn single_logout_service_location(mut self, location: impl Into<String>) -> Self {
        self.single_logout_service_location = Some(location.into());
        self
    }

    #[must_use]
    pub fn single_logout_service_response_location(mut self, location: impl Into<String>) -> Self {
        self.single_logout_service_response_location = Some(location.into());
        self
    }

    #[must_use]
    pub fn single_logout_service_binding(mut self, binding: Saml2Binding) -> Self {
        self.single_logout_service_binding = binding;
        self
    }

    /// Validate the configuration and parse the trusted certificates
    pub fn build(self) -> SamlResult<RelyingPartyRegistration> {
        let entity_id = self
            .entity_id
            .ok_or_else(|| SamlError::Registration("entity_id is required".to_string()))?;
        let asserting_party_entity_id = self.asserting_party_entity_id.ok_or_else(|| {
            SamlError::Registration("asserting_party_entity_id is required".to_string())
        })?;
        let single_logout_service_location = self.single_logout_service_location.ok_or_else(|| {
            SamlError::Registration("single_logout_service_location is required".to_string())
        })?;
        // Many asserting parties post responses back to the request endpoint
        let single_logout_service_response_location = self
            .single_logout_service_response_location
            .unwrap_or_else(|| single_logout_service_location.clone());

        let mut verification_certificates = Vec::with_capacity(self.verification_certificate_pems.len());
        for pem in &self.verification_certificate_pems {
            verification_certificates.push(parse_certificate(pem)?);
        }

        Ok(RelyingPartyRegistration {
            entity_id,
            asserting_party_entity_id,
            verification_certificates,
            signing_credentials: self.signing_credentials,
            single_logout_service_location,
            single_logout_service_response_location,
            single_logout_service_binding: self.single_logout_service_binding,
        })
    }
}
