//! Build and sign outbound SAML logout messages
//!
//! Produces `LogoutRequest`/`LogoutResponse` XML and signs it either with
//! an enveloped XML signature (POST binding) or a detached query-parameter
//! signature (Redirect binding). Signing shares its canonicalization and
//! `SignedInfo` assembly with the validator, so messages built here
//! round-trip through validation.

use crate::codec;
use crate::error::{SamlError, SamlResult};
use crate::registration::SigningCredentials;
use crate::saml::xmlsig::{
    build_signed_info, canonicalize_xml, redirect_signing_content, xml_escape,
    SignatureAlgorithm, XMLDSIG_NS,
};
use openssl::hash::hash;
use openssl::sign::Signer;
use uuid::Uuid;

/// An unsigned logout message and its generated ID
#[derive(Debug, Clone)]
pub struct LogoutMessage {
    pub id: String,
    pub xml: String,
}

/// Detached-signature parameters for the Redirect binding
#[derive(Debug, Clone)]
pub struct DetachedSignature {
    pub sig_alg: String,
    pub signature: String,
}

/// Builder for signed SAML logout messages
pub struct SloBuilder {
    issuer_entity_id: String,
    credentials: SigningCredentials,
}

impl SloBuilder {
    pub fn new(issuer_entity_id: impl Into<String>, credentials: SigningCredentials) -> Self {
        Self {
            issuer_entity_id: issuer_entity_id.into(),
            credentials,
        }
    }

    /// Build an unsigned `LogoutRequest`
    #[must_use]
    pub fn logout_request(
        &self,
        destination: &str,
        name_id: Option<&str>,
        session_index: Option<&str>,
    ) -> LogoutMessage {
        let id = format!("_{}", Uuid::new_v4());
        let issue_instant = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
<samlp:LogoutRequest xmlns:samlp=\"urn:oasis:names:tc:SAML:2.0:protocol\" \
xmlns:saml=\"urn:oasis:names:tc:SAML:2.0:assertion\" \
ID=\"{id}\" Version=\"2.0\" IssueInstant=\"{issue_instant}\" \
Destination=\"{destination}\">\
<saml:Issuer>{issuer}</saml:Issuer>",
            id = id,
            issue_instant = issue_instant,
            destination = xml_escape(destination),
            issuer = xml_escape(&self.issuer_entity_id),
        );
        if let Some(name_id) = name_id {
            xml.push_str(&format!(
                "<saml:NameID Format=\"urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress\">{}</saml:NameID>",
                xml_escape(name_id)
            ));
        }
        if let Some(session_index) = session_index {
            xml.push_str(&format!(
                "<samlp:SessionIndex>{}</samlp:SessionIndex>",
                xml_escape(session_index)
            ));
        }
        xml.push_str("</samlp:LogoutRequest>");

        LogoutMessage { id, xml }
    }

    /// Build an unsigned `LogoutResponse`.
    ///
    /// `in_response_to` and `status_value` are optional because some peers
    /// omit them; validators on the receiving side are lenient about both.
    #[must_use]
    pub fn logout_response(
        &self,
        destination: &str,
        in_response_to: Option<&str>,
        status_value: Option<&str>,
    ) -> LogoutMessage {
        let id = format!("_{}", Uuid::new_v4());
        let issue_instant = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
<samlp:LogoutResponse xmlns:samlp=\"urn:oasis:names:tc:SAML:2.0:protocol\" \
xmlns:saml=\"urn:oasis:names:tc:SAML:2.0:assertion\" \
ID=\"{id}\" Version=\"2.0\" IssueInstant=\"{issue_instant}\" \
Destination=\"{destination}\"",
            id = id,
            issue_instant = issue_instant,
            destination = xml_escape(destination),
        );
        if let Some(in_response_to) = in_response_to {
            xml.push_str(&format!(" InResponseTo=\"{}\"", xml_escape(in_response_to)));
        }
        xml.push_str(&format!(
            "><saml:Issuer>{}</saml:Issuer>",
            xml_escape(&self.issuer_entity_id)
        ));
        if let Some(status_value) = status_value {
            xml.push_str(&format!(
                "<samlp:Status><samlp:StatusCode Value=\"{}\"/></samlp:Status>",
                xml_escape(status_value)
            ));
        }
        xml.push_str("</samlp:LogoutResponse>");

        LogoutMessage { id, xml }
    }

    /// Sign a logout message with an enveloped XML signature, returning the
    /// signed document. The signature is inserted directly after the Issuer
    /// element, per the xmldsig SAML profile.
    pub fn sign_enveloped(&self, message: &LogoutMessage) -> SamlResult<String> {
        let algorithm = SignatureAlgorithm::RsaSha256;

        let canonical = canonicalize_xml(&message.xml)?;
        let digest = hash(algorithm.message_digest(), canonical.as_bytes())
            .map_err(|e| SamlError::SignatureCreation(format!("Digest failed: {e}")))?;
        let digest_value = codec::encode(&digest);

        let signed_info = build_signed_info(algorithm, &format!("#{}", message.id), &digest_value);
        let canonical_signed_info = canonicalize_xml(&signed_info)?;

        let signature_value = self.sign_bytes(canonical_signed_info.as_bytes(), algorithm)?;
        let certificate = self.credentials.certificate_base64()?;

        let signature_block = format!(
            "<ds:Signature xmlns:ds=\"{ns}\">{signed_info}\
<ds:SignatureValue>{signature_value}</ds:SignatureValue>\
<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{certificate}</ds:X509Certificate></ds:X509Data></ds:KeyInfo>\
</ds:Signature>",
            ns = XMLDSIG_NS,
        );

        let issuer_end = message.xml.find("</saml:Issuer>").ok_or_else(|| {
            SamlError::SignatureCreation("Cannot find Issuer element to anchor signature".to_string())
        })? + "</saml:Issuer>".len();

        let mut signed = String::with_capacity(message.xml.len() + signature_block.len());
        signed.push_str(&message.xml[..issuer_end]);
        signed.push_str(&signature_block);
        signed.push_str(&message.xml[issuer_end..]);
        Ok(signed)
    }

    /// Compute the detached signature over Redirect-binding query
    /// parameters. `message_value` is the base64 (deflated) message exactly
    /// as it will appear, URL-decoded, in the query string.
    pub fn detached_signature(
        &self,
        message_param: &str,
        message_value: &str,
        relay_state: Option<&str>,
    ) -> SamlResult<DetachedSignature> {
        let algorithm = SignatureAlgorithm::RsaSha256;
        let content =
            redirect_signing_content(message_param, message_value, relay_state, algorithm.uri());
        let signature = self.sign_bytes(content.as_bytes(), algorithm)?;
        Ok(DetachedSignature {
            sig_alg: algorithm.uri().to_string(),
            signature,
        })
    }

    fn sign_bytes(&self, data: &[u8], algorithm: SignatureAlgorithm) -> SamlResult<String> {
        let mut signer = Signer::new(algorithm.message_digest(), self.credentials.private_key())
            .map_err(|e| SamlError::SignatureCreation(format!("Signer creation failed: {e}")))?;
        signer
            .update(data)
            .map_err(|e| SamlError::SignatureCreation(format!("Signing failed: {e}")))?;
        let signature = signer
            .sign_to_vec()
            .map_err(|e| SamlError::SignatureCreation(format!("Signing failed: {e}")))?;
        Ok(codec::encode(&signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::logout_parser::{parse_logout_request_xml, parse_logout_response_xml};
    use openssl::asn1::Asn1Time;
    use openssl::bn::BigNum;
    use openssl::pkey::PKey;
    use openssl::rsa::Rsa;
    use openssl::x509::{X509NameBuilder, X509};

    fn test_credentials() -> SigningCredentials {
        let rsa = Rsa::generate(2048).unwrap();
        let key = PKey::from_rsa(rsa).unwrap();

        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", "test").unwrap();
        let name = name.build();

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&key).unwrap();
        builder
            .set_not_before(&Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(365).unwrap())
            .unwrap();
        builder
            .sign(&key, openssl::hash::MessageDigest::sha256())
            .unwrap();
        let cert = builder.build();

        let cert_pem = String::from_utf8(cert.to_pem().unwrap()).unwrap();
        let key_pem = String::from_utf8(key.private_key_to_pem_pkcs8().unwrap()).unwrap();
        SigningCredentials::from_pem(&cert_pem, &key_pem).unwrap()
    }

    #[test]
    fn test_logout_request_parses_back() {
        let builder = SloBuilder::new("https://ap.example.com/idp", test_credentials());
        let message = builder.logout_request(
            "https://rp.example.org/logout/saml2/slo",
            Some("user@example.com"),
            Some("_session1"),
        );

        let parsed = parse_logout_request_xml(&message.xml).unwrap();
        assert_eq!(parsed.id.as_deref(), Some(message.id.as_str()));
        assert_eq!(parsed.issuer.as_deref(), Some("https://ap.example.com/idp"));
        assert_eq!(parsed.name_id.as_deref(), Some("user@example.com"));
        assert_eq!(parsed.session_index.as_deref(), Some("_session1"));
        assert!(!parsed.signed);
    }

    #[test]
    fn test_logout_response_omits_optional_fields() {
        let builder = SloBuilder::new("https://ap.example.com/idp", test_credentials());
        let message =
            builder.logout_response("https://rp.example.org/logout/saml2/slo/response", None, None);

        let parsed = parse_logout_response_xml(&message.xml).unwrap();
        assert!(parsed.in_response_to.is_none());
        assert!(parsed.status_code.is_none());
    }

    #[test]
    fn test_sign_enveloped_inserts_signature_after_issuer() {
        let builder = SloBuilder::new("https://ap.example.com/idp", test_credentials());
        let message =
            builder.logout_request("https://rp.example.org/logout/saml2/slo", None, None);
        let signed = builder.sign_enveloped(&message).unwrap();

        let parsed = parse_logout_request_xml(&signed).unwrap();
        assert!(parsed.signed);
        let issuer_end = signed.find("</saml:Issuer>").unwrap() + "</saml:Issuer>".len();
        assert!(signed[issuer_end..].starts_with("<ds:Signature"));
        // Removing the signature must restore the unsigned document
        assert_eq!(
            crate::saml::xmlsig::remove_signature_element(&signed),
            message.xml
        );
    }
}
