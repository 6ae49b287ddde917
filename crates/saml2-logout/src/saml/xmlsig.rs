//! XML digital signature building blocks
//!
//! Shared between the signature validator and the outbound message builder
//! so that a message signed here verifies there byte-for-byte: the same
//! normalization, the same `SignedInfo` assembly, the same Redirect-binding
//! signed-content reconstruction.

use crate::error::{SamlError, SamlResult};
use openssl::hash::MessageDigest;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Exclusive XML canonicalization algorithm URI
pub const ALGO_C14N_EXCLUSIVE: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

/// Enveloped-signature transform URI
pub const ALGO_ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

/// XML digital signature namespace
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Supported signature algorithms.
///
/// RSA-SHA1 is deliberately absent: messages signed with it are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    RsaSha256,
    RsaSha384,
    RsaSha512,
}

impl SignatureAlgorithm {
    /// Resolve an algorithm from its `SigAlg`/`SignatureMethod` URI
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256" => Some(Self::RsaSha256),
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384" => Some(Self::RsaSha384),
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512" => Some(Self::RsaSha512),
            _ => None,
        }
    }

    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::RsaSha256 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256",
            Self::RsaSha384 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384",
            Self::RsaSha512 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512",
        }
    }

    #[must_use]
    pub const fn digest_uri(self) -> &'static str {
        match self {
            Self::RsaSha256 => "http://www.w3.org/2001/04/xmlenc#sha256",
            Self::RsaSha384 => "http://www.w3.org/2001/04/xmldsig-more#sha384",
            Self::RsaSha512 => "http://www.w3.org/2001/04/xmlenc#sha512",
        }
    }

    #[must_use]
    pub fn message_digest(self) -> MessageDigest {
        match self {
            Self::RsaSha256 => MessageDigest::sha256(),
            Self::RsaSha384 => MessageDigest::sha384(),
            Self::RsaSha512 => MessageDigest::sha512(),
        }
    }

    /// Resolve the digest algorithm of a `DigestMethod` URI
    #[must_use]
    pub fn digest_from_uri(uri: &str) -> Option<MessageDigest> {
        match uri {
            "http://www.w3.org/2001/04/xmlenc#sha256" => Some(MessageDigest::sha256()),
            "http://www.w3.org/2001/04/xmldsig-more#sha384" => Some(MessageDigest::sha384()),
            "http://www.w3.org/2001/04/xmlenc#sha512" => Some(MessageDigest::sha512()),
            _ => None,
        }
    }
}

/// Normalize XML into a canonical-form byte string for digesting/signing.
///
/// Drops the XML declaration, comments and processing instructions, trims
/// whitespace-only text nodes and expands empty-element tags, keeping
/// attributes and namespace declarations as written. Signer and verifier
/// both run documents through here, which is what makes digests comparable;
/// it intentionally stops short of a full exclusive-C14N implementation
/// (attribute reordering, namespace pruning).
pub fn canonicalize_xml(xml: &str) -> SamlResult<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut out = String::with_capacity(xml.len());
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let raw = std::str::from_utf8(&e)
                    .map_err(|e| SamlError::MalformedMessage(format!("Invalid UTF-8: {e}")))?;
                out.push('<');
                out.push_str(raw);
                out.push('>');
            }
            Ok(Event::Empty(e)) => {
                // C14N writes empty elements as a start/end pair
                let raw = std::str::from_utf8(&e)
                    .map_err(|e| SamlError::MalformedMessage(format!("Invalid UTF-8: {e}")))?;
                let name = std::str::from_utf8(e.name().as_ref())
                    .map_err(|e| SamlError::MalformedMessage(format!("Invalid UTF-8: {e}")))?
                    .to_string();
                out.push('<');
                out.push_str(raw);
                out.push_str("></");
                out.push_str(&name);
                out.push('>');
            }
            Ok(Event::End(e)) => {
                let qname = e.name();
                let name = std::str::from_utf8(qname.as_ref())
                    .map_err(|e| SamlError::MalformedMessage(format!("Invalid UTF-8: {e}")))?;
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            Ok(Event::Text(e)) => {
                // Keep the text as written, entity references included
                let raw = std::str::from_utf8(&e)
                    .map_err(|e| SamlError::MalformedMessage(format!("Invalid UTF-8: {e}")))?;
                out.push_str(raw);
            }
            Ok(Event::CData(e)) => {
                let raw = std::str::from_utf8(&e)
                    .map_err(|e| SamlError::MalformedMessage(format!("Invalid UTF-8: {e}")))?;
                out.push_str(raw);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SamlError::MalformedMessage(format!("XML parse error: {e}")));
            }
            // XML declaration, comments, processing instructions
            _ => {}
        }
    }

    Ok(out)
}

/// Assemble the `ds:SignedInfo` element for the given reference.
///
/// Written with an explicit `xmlns:ds` declaration so the standalone
/// form rebuilt at verification time is identical to the embedded form.
#[must_use]
pub fn build_signed_info(
    algorithm: SignatureAlgorithm,
    reference_uri: &str,
    digest_value: &str,
) -> String {
    format!(
        concat!(
            "<ds:SignedInfo xmlns:ds=\"{ns}\">",
            "<ds:CanonicalizationMethod Algorithm=\"{c14n}\"/>",
            "<ds:SignatureMethod Algorithm=\"{sig_alg}\"/>",
            "<ds:Reference URI=\"{uri}\">",
            "<ds:Transforms>",
            "<ds:Transform Algorithm=\"{enveloped}\"/>",
            "<ds:Transform Algorithm=\"{c14n}\"/>",
            "</ds:Transforms>",
            "<ds:DigestMethod Algorithm=\"{digest_alg}\"/>",
            "<ds:DigestValue>{digest}</ds:DigestValue>",
            "</ds:Reference>",
            "</ds:SignedInfo>"
        ),
        ns = XMLDSIG_NS,
        c14n = ALGO_C14N_EXCLUSIVE,
        sig_alg = algorithm.uri(),
        uri = xml_escape(reference_uri),
        enveloped = ALGO_ENVELOPED_SIGNATURE,
        digest_alg = algorithm.digest_uri(),
        digest = digest_value,
    )
}

/// Rebuild the exact byte string a Redirect-binding detached signature
/// covers: `{param}=<enc>[&RelayState=<enc>]&SigAlg=<enc>` with
/// percent-encoded values, in that fixed order.
#[must_use]
pub fn redirect_signing_content(
    message_param: &str,
    message_value: &str,
    relay_state: Option<&str>,
    sig_alg: &str,
) -> String {
    let mut content = format!("{}={}", message_param, urlencoding::encode(message_value));
    if let Some(rs) = relay_state {
        if !rs.is_empty() {
            content.push_str("&RelayState=");
            content.push_str(&urlencoding::encode(rs));
        }
    }
    content.push_str("&SigAlg=");
    content.push_str(&urlencoding::encode(sig_alg));
    content
}

/// Remove the enveloped `ds:Signature` element (or an unprefixed
/// `Signature`), restoring the content the signature's reference digests.
#[must_use]
pub fn remove_signature_element(xml: &str) -> String {
    for (open, close) in [
        ("<ds:Signature", "</ds:Signature>"),
        ("<Signature", "</Signature>"),
    ] {
        if let Some(start) = xml.find(open) {
            if let Some(end_offset) = xml[start..].find(close) {
                let end = start + end_offset + close.len();
                let mut result = String::with_capacity(xml.len());
                result.push_str(&xml[..start]);
                result.push_str(&xml[end..]);
                return result;
            }
        }
    }
    xml.to_string()
}

/// Minimal XML attribute/text escaping
#[must_use]
pub fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
