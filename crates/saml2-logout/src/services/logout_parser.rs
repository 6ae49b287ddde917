//! Parse SAML `LogoutRequest` / `LogoutResponse` XML
//!
//! Parsing is deliberately lenient about missing fields: a well-formed
//! document with no Issuer still parses, and the field-level validators
//! report the absence as an accumulated error. Only structural problems
//! (not XML, wrong root element) are fatal here.

use crate::error::{SamlError, SamlResult};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Fields of a parsed `LogoutRequest`
#[derive(Debug, Clone, Default)]
pub struct ParsedLogoutRequest {
    pub id: Option<String>,
    pub issuer: Option<String>,
    pub destination: Option<String>,
    pub name_id: Option<String>,
    pub session_index: Option<String>,
    /// Whether the document carries an embedded `ds:Signature`
    pub signed: bool,
}

/// Fields of a parsed `LogoutResponse`
#[derive(Debug, Clone, Default)]
pub struct ParsedLogoutResponse {
    pub id: Option<String>,
    pub issuer: Option<String>,
    pub destination: Option<String>,
    pub in_response_to: Option<String>,
    pub status_code: Option<String>,
    /// Whether the document carries an embedded `ds:Signature`
    pub signed: bool,
}

/// Parse a `LogoutRequest` document
pub fn parse_logout_request_xml(xml: &str) -> SamlResult<ParsedLogoutRequest> {
    let fields = parse_logout_xml(xml, "LogoutRequest")?;
    Ok(ParsedLogoutRequest {
        id: fields.id,
        issuer: fields.issuer,
        destination: fields.destination,
        name_id: fields.name_id,
        session_index: fields.session_index,
        signed: fields.signed,
    })
}

/// Parse a `LogoutResponse` document
pub fn parse_logout_response_xml(xml: &str) -> SamlResult<ParsedLogoutResponse> {
    let fields = parse_logout_xml(xml, "LogoutResponse")?;
    Ok(ParsedLogoutResponse {
        id: fields.id,
        issuer: fields.issuer,
        destination: fields.destination,
        in_response_to: fields.in_response_to,
        status_code: fields.status_code,
        signed: fields.signed,
    })
}

#[derive(Default)]
struct LogoutFields {
    id: Option<String>,
    issuer: Option<String>,
    destination: Option<String>,
    in_response_to: Option<String>,
    name_id: Option<String>,
    session_index: Option<String>,
    status_code: Option<String>,
    signed: bool,
}

fn parse_logout_xml(xml: &str, expected_root: &str) -> SamlResult<LogoutFields> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut fields = LogoutFields::default();
    let mut root_seen = false;
    let mut signature_depth = 0usize;
    let mut current_element = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let local = String::from_utf8_lossy(e.local_name().into_inner()).to_string();

                if !root_seen {
                    if local != expected_root {
                        return Err(SamlError::MalformedMessage(format!(
                            "Expected {expected_root} document, found {local}"
                        )));
                    }
                    root_seen = true;
                    for attr in e.attributes().flatten() {
                        let key =
                            String::from_utf8_lossy(attr.key.local_name().into_inner()).to_string();
                        let value = attr.unescape_value().unwrap_or_default().to_string();
                        match key.as_str() {
                            "ID" => fields.id = Some(value),
                            "Destination" => fields.destination = Some(value),
                            "InResponseTo" => fields.in_response_to = Some(value),
                            _ => {}
                        }
                    }
                    current_element = local;
                    continue;
                }

                if local == "Signature" {
                    fields.signed = true;
                    signature_depth += 1;
                } else if signature_depth == 0 && local == "StatusCode" {
                    for attr in e.attributes().flatten() {
                        let key =
                            String::from_utf8_lossy(attr.key.local_name().into_inner()).to_string();
                        if key == "Value" {
                            fields.status_code =
                                Some(attr.unescape_value().unwrap_or_default().to_string());
                        }
                    }
                }
                current_element = local;
            }
            Ok(Event::Text(ref e)) => {
                if signature_depth > 0 {
                    continue;
                }
                let text = e.decode().unwrap_or_default().to_string();
                match current_element.as_str() {
                    "Issuer" => fields.issuer = Some(text),
                    "NameID" => fields.name_id = Some(text),
                    "SessionIndex" => fields.session_index = Some(text),
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let local = String::from_utf8_lossy(e.local_name().into_inner()).to_string();
                if local == "Signature" && signature_depth > 0 {
                    signature_depth -= 1;
                }
                current_element.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SamlError::MalformedMessage(format!("XML parse error: {e}")));
            }
            _ => {}
        }
    }

    if !root_seen {
        return Err(SamlError::MalformedMessage(format!(
            "No {expected_root} element found"
        )));
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_logout_request() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<samlp:LogoutRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
    xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
    ID="_lr_test123" Version="2.0" IssueInstant="2026-08-31T10:00:00Z"
    Destination="https://rp.example.org/logout/saml2/slo">
    <saml:Issuer>https://ap.example.com/idp</saml:Issuer>
    <saml:NameID Format="urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress">user@example.com</saml:NameID>
    <samlp:SessionIndex>_session_abc123</samlp:SessionIndex>
</samlp:LogoutRequest>"#;

        let parsed = parse_logout_request_xml(xml).unwrap();
        assert_eq!(parsed.id.as_deref(), Some("_lr_test123"));
        assert_eq!(parsed.issuer.as_deref(), Some("https://ap.example.com/idp"));
        assert_eq!(
            parsed.destination.as_deref(),
            Some("https://rp.example.org/logout/saml2/slo")
        );
        assert_eq!(parsed.name_id.as_deref(), Some("user@example.com"));
        assert_eq!(parsed.session_index.as_deref(), Some("_session_abc123"));
        assert!(!parsed.signed);
    }

    #[test]
    fn test_parse_logout_request_missing_fields_is_not_fatal() {
        let xml = r#"<samlp:LogoutRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_x" Version="2.0"/>"#;
        let parsed = parse_logout_request_xml(xml).unwrap();
        assert!(parsed.issuer.is_none());
        assert!(parsed.destination.is_none());
        assert!(parsed.name_id.is_none());
    }

    #[test]
    fn test_parse_logout_response() {
        let xml = r#"<samlp:LogoutResponse xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
    xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
    ID="_lresp_1" Version="2.0" IssueInstant="2026-08-31T10:00:00Z"
    Destination="https://rp.example.org/logout/saml2/slo/response"
    InResponseTo="_lr_test123">
    <saml:Issuer>https://ap.example.com/idp</saml:Issuer>
    <samlp:Status>
        <samlp:StatusCode Value="urn:oasis:names:tc:SAML:2.0:status:Success"/>
    </samlp:Status>
</samlp:LogoutResponse>"#;

        let parsed = parse_logout_response_xml(xml).unwrap();
        assert_eq!(parsed.in_response_to.as_deref(), Some("_lr_test123"));
        assert_eq!(
            parsed.status_code.as_deref(),
            Some("urn:oasis:names:tc:SAML:2.0:status:Success")
        );
    }

    #[test]
    fn test_parse_logout_response_without_status_or_in_response_to() {
        let xml = r#"<samlp:LogoutResponse xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_y" Version="2.0"/>"#;
        let parsed = parse_logout_response_xml(xml).unwrap();
        assert!(parsed.status_code.is_none());
        assert!(parsed.in_response_to.is_none());
    }

    #[test]
    fn test_wrong_root_element_is_fatal() {
        let xml = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_z"/>"#;
        assert!(parse_logout_request_xml(xml).is_err());
    }

    #[test]
    fn test_malformed_xml_is_fatal() {
        assert!(parse_logout_request_xml("<samlp:LogoutRequest><unclosed").is_err());
    }

    #[test]
    fn test_detects_embedded_signature() {
        let xml = r#"<samlp:LogoutRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_s">
    <saml:Issuer xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion">https://ap.example.com/idp</saml:Issuer>
    <ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#"><ds:SignedInfo></ds:SignedInfo></ds:Signature>
</samlp:LogoutRequest>"#;
        let parsed = parse_logout_request_xml(xml).unwrap();
        assert!(parsed.signed);
        // Issuer must come from the message, not from inside the signature
        assert_eq!(parsed.issuer.as_deref(), Some("https://ap.example.com/idp"));
    }
}
