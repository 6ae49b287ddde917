//! SAML-specific constants and XML signature plumbing

pub mod xmlsig;

/// SAML 2.0 status code meaning the logout succeeded
pub const STATUS_SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";

/// SAML 2.0 status code meaning the asserting party could log out only some
/// session participants; treated as success
pub const STATUS_PARTIAL_LOGOUT: &str = "urn:oasis:names:tc:SAML:2.0:status:PartialLogout";
