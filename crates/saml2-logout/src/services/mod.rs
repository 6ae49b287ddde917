//! Logout protocol services
//!
//! The parser and signature validator are building blocks; the two
//! validators orchestrate them into the full inbound checks, and the
//! builder produces outbound messages.

pub mod logout_parser;
pub mod logout_request_validator;
pub mod logout_response_validator;
pub mod signature_validator;
pub mod slo_builder;

pub use logout_parser::{
    parse_logout_request_xml, parse_logout_response_xml, ParsedLogoutRequest, ParsedLogoutResponse,
};
pub use logout_request_validator::{LogoutRequestValidator, LogoutRequestValidatorParameters};
pub use logout_response_validator::{LogoutResponseValidator, LogoutResponseValidatorParameters};
pub use signature_validator::SignatureValidator;
pub use slo_builder::{DetachedSignature, LogoutMessage, SloBuilder};
