//! Shared fixtures for logout protocol tests
//!
//! Generates a throwaway RSA key pair and self-signed certificate per
//! call, plus registration builders wired so the asserting party's
//! signing certificate is the relying party's verification certificate.

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::x509::{X509, X509NameBuilder};

use saml2_logout::{
    RelyingPartyRegistration, Saml2Binding, SigningCredentials, SloBuilder,
};

pub const AP_ENTITY_ID: &str = "https://ap.example.com/idp";
pub const RP_ENTITY_ID: &str = "https://rp.example.org/saml2/metadata";
pub const SLO_LOCATION: &str = "https://rp.example.org/logout/saml2/slo";

/// PEM certificate and private key for one generated identity
pub struct TestIdentity {
    pub certificate_pem: String,
    pub private_key_pem: String,
}

pub fn generate_identity() -> TestIdentity {
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

    TestIdentity {
        certificate_pem: String::from_utf8(cert.to_pem().unwrap()).unwrap(),
        private_key_pem: String::from_utf8(key.private_key_to_pem_pkcs8().unwrap()).unwrap(),
    }
}

pub fn signing_credentials(identity: &TestIdentity) -> SigningCredentials {
    SigningCredentials::from_pem(&identity.certificate_pem, &identity.private_key_pem).unwrap()
}

/// An asserting-party builder plus the registration that trusts it
pub fn asserting_party() -> (SloBuilder, RelyingPartyRegistration) {
    let identity = generate_identity();
    let builder = SloBuilder::new(AP_ENTITY_ID, signing_credentials(&identity));
    let registration = registration_trusting(&identity, Saml2Binding::Post);
    (builder, registration)
}

pub fn registration_trusting(
    identity: &TestIdentity,
    binding: Saml2Binding,
) -> RelyingPartyRegistration {
    RelyingPartyRegistration::builder()
        .entity_id(RP_ENTITY_ID)
        .asserting_party_entity_id(AP_ENTITY_ID)
        .single_logout_service_location(SLO_LOCATION)
        .single_logout_service_binding(binding)
        .verification_certificate_pem(identity.certificate_pem.clone())
        .build()
        .unwrap()
}
