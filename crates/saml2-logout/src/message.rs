//! Wire-level SAML logout message types
//!
//! A wire message is the payload exactly as received from the transport:
//! the base64 parameter value (deflated first for the Redirect binding),
//! plus — for Redirect — the detached-signature query parameters. Parameter
//! values are stored URL-decoded.

/// HTTP binding that carried a SAML message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Saml2Binding {
    /// base64 XML in a form field
    #[default]
    Post,
    /// base64 + DEFLATE XML in a query parameter, with an optional
    /// detached signature over the query string
    Redirect,
}

/// A SAML `LogoutRequest` as sent or received on the wire.
///
/// Doubles as the record of a logout request this relying party previously
/// sent, in which case `id` is used to correlate the asserting party's
/// `LogoutResponse` back to it.
#[derive(Debug, Clone)]
pub struct Saml2LogoutRequest {
    /// The message ID (the XML `ID` attribute of the request we issued)
    pub id: String,
    pub binding: Saml2Binding,
    /// The `SAMLRequest` parameter value: base64 XML, deflated iff Redirect
    pub saml_request: String,
    pub relay_state: Option<String>,
    /// `SigAlg` parameter (Redirect binding only)
    pub sig_alg: Option<String>,
    /// `Signature` parameter, base64 (Redirect binding only)
    pub signature: Option<String>,
}

impl Saml2LogoutRequest {
    pub fn new(id: impl Into<String>, binding: Saml2Binding, saml_request: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            binding,
            saml_request: saml_request.into(),
            relay_state: None,
            sig_alg: None,
            signature: None,
        }
    }

    #[must_use]
    pub fn relay_state(mut self, relay_state: impl Into<String>) -> Self {
        self.relay_state = Some(relay_state.into());
        self
    }

    /// Attach the detached-signature parameters of the Redirect binding
    #[must_use]
    pub fn detached_signature(mut self, sig_alg: impl Into<String>, signature: impl Into<String>) -> Self {
        self.sig_alg = Some(sig_alg.into());
        self.signature = Some(signature.into());
        self
    }
}

/// A SAML `LogoutResponse` as received on the wire
#[derive(Debug, Clone)]
pub struct Saml2LogoutResponse {
    pub binding: Saml2Binding,
    /// The `SAMLResponse` parameter value: base64 XML, deflated iff Redirect
    pub saml_response: String,
    pub relay_state: Option<String>,
    /// `SigAlg` parameter (Redirect binding only)
    pub sig_alg: Option<String>,
    /// `Signature` parameter, base64 (Redirect binding only)
    pub signature: Option<String>,
}

impl Saml2LogoutResponse {
    pub fn new(binding: Saml2Binding, saml_response: impl Into<String>) -> Self {
        Self {
            binding,
            saml_response: saml_response.into(),
            relay_state: None,
            sig_alg: None,
            signature: None,
        }
    }

    #[must_use]
    pub fn relay_state(mut self, relay_state: impl Into<String>) -> Self {
        self.relay_state = Some(relay_state.into());
        self
    }

    /// Attach the detached-signature parameters of the Redirect binding
    #[must_use]
    pub fn detached_signature(mut self, sig_alg: impl Into<String>, signature: impl Into<String>) -> Self {
        self.sig_alg = Some(sig_alg.into());
        self.signature = Some(signature.into());
        self
    }
}
