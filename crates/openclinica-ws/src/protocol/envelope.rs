//! SOAP 1.1 envelope writing and reading.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::auth::UsernameToken;
use crate::error::{OcwsError, OcwsResult};
use crate::protocol::constants::{Namespaces, Prefixes, request_element};
use crate::protocol::xml::XmlElement;

/// The body of one remote operation call.
pub trait RequestBody {
    /// Operation name as declared in the WSDL.
    const OPERATION: &'static str;

    /// Write the children of the `{operation}Request` wrapper element.
    fn write_body<W: Write>(&self, writer: &mut Writer<W>) -> OcwsResult<()>;
}

/// Build a complete request envelope with a WS-Security header.
///
/// `service_namespace` is bound to the `v1` prefix and qualifies the request
/// wrapper; bean types use the `bean` prefix.
pub fn build_envelope<R: RequestBody>(
    service_namespace: &str,
    token: UsernameToken<'_>,
    request: &R,
) -> OcwsResult<String> {
    let mut writer = Writer::new(Vec::new());
    let envelope_tag = format!("{}:Envelope", Prefixes::SOAP_ENVELOPE);
    let header_tag = format!("{}:Header", Prefixes::SOAP_ENVELOPE);
    let body_tag = format!("{}:Body", Prefixes::SOAP_ENVELOPE);
    let wrapper_tag = format!("{}:{}", Prefixes::SERVICE, request_element(R::OPERATION));

    let soap_xmlns = format!("xmlns:{}", Prefixes::SOAP_ENVELOPE);
    let service_xmlns = format!("xmlns:{}", Prefixes::SERVICE);
    let beans_xmlns = format!("xmlns:{}", Prefixes::BEANS);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(envelope_tag.as_str()).with_attributes([
        (soap_xmlns.as_str(), Namespaces::SOAP_ENVELOPE),
        (service_xmlns.as_str(), service_namespace),
        (beans_xmlns.as_str(), Namespaces::BEANS),
    ])))?;

    writer.write_event(Event::Start(BytesStart::new(header_tag.as_str())))?;
    token.write_security_header(&mut writer, Prefixes::SOAP_ENVELOPE)?;
    writer.write_event(Event::End(BytesEnd::new(header_tag.as_str())))?;

    writer.write_event(Event::Start(BytesStart::new(body_tag.as_str())))?;
    writer.write_event(Event::Start(BytesStart::new(wrapper_tag.as_str())))?;
    request.write_body(&mut writer)?;
    writer.write_event(Event::End(BytesEnd::new(wrapper_tag.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new(body_tag.as_str())))?;

    writer.write_event(Event::End(BytesEnd::new(envelope_tag.as_str())))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| OcwsError::XmlParse(format!("envelope is not UTF-8: {e}")))
}

/// Return the first element inside `Envelope/Body`.
///
/// A `Fault` in the body becomes [`OcwsError::SoapFault`].
pub fn unwrap_body(envelope: XmlElement) -> OcwsResult<XmlElement> {
    if !envelope.is(Namespaces::SOAP_ENVELOPE, "Envelope") {
        return Err(OcwsError::XmlParse(format!(
            "expected a SOAP 1.1 Envelope, found '{}'",
            envelope.name
        )));
    }

    let body = envelope
        .children
        .into_iter()
        .find(|c| c.is(Namespaces::SOAP_ENVELOPE, "Body"))
        .ok_or_else(|| OcwsError::missing("Body"))?;

    let payload = body
        .children
        .into_iter()
        .next()
        .ok_or_else(|| OcwsError::missing("Body content"))?;

    if payload.is(Namespaces::SOAP_ENVELOPE, "Fault") {
        return Err(fault_error(&payload));
    }
    Ok(payload)
}

/// Extract a SOAP fault from a parsed reply, if it carries one.
pub fn find_fault(envelope: &XmlElement) -> Option<OcwsError> {
    envelope
        .find(Namespaces::SOAP_ENVELOPE, "Fault")
        .map(fault_error)
}

fn fault_error(fault: &XmlElement) -> OcwsError {
    OcwsError::SoapFault {
        code: fault.child_text("faultcode").unwrap_or_default().to_string(),
        message: fault.child_text("faultstring").unwrap_or_default().to_string(),
    }
}
