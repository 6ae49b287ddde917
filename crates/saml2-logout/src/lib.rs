//! SAML 2.0 Single Logout validation library
//!
//! This crate implements the relying-party side of the SAML 2.0 Single
//! Logout protocol:
//! - `LogoutRequest` and `LogoutResponse` validation for the POST and
//!   Redirect bindings
//! - Enveloped XML signature and detached query-string signature
//!   verification
//! - Error accumulation, so a rejected message reports every problem
//!   found rather than only the first
//! - Outbound `LogoutRequest`/`LogoutResponse` construction and signing
//!
//! Validation distinguishes two failure tiers: a message that cannot be
//! decoded or parsed fails fast with a [`SamlError`], while a well-formed
//! message that violates protocol rules yields a [`ValidationResult`]
//! carrying one [`Saml2Error`] per finding.

pub mod codec;
pub mod error;
pub mod message;
pub mod registration;
pub mod result;
pub mod saml;
pub mod services;

pub use error::{SamlError, SamlResult};
pub use message::{Saml2Binding, Saml2LogoutRequest, Saml2LogoutResponse};
pub use registration::{RelyingPartyRegistration, RelyingPartyRegistrationBuilder, SigningCredentials};
pub use result::{Saml2Error, Saml2ErrorCode, ValidationResult};
pub use services::{
    LogoutRequestValidator, LogoutRequestValidatorParameters, LogoutResponseValidator,
    LogoutResponseValidatorParameters, SignatureValidator, SloBuilder,
};
