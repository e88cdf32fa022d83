#![allow(dead_code)]

use openclinica_ws::OcwsConfig;
use openclinica_ws::protocol::constants::ServiceEndpoint;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "api-user";
pub const PASSWORD: &str = "secret";
/// SHA-1 hex digest of [`PASSWORD`].
pub const PASSWORD_DIGEST: &str = "e5e9fa1ba31ecd1ae84f75caaa474f3a663f05f4";

pub const MULTIPART_BOUNDARY: &str = "----=_Part_7_1234.5678";

/// Mock OpenClinica webservices deployment on a local port.
pub struct MockOcws {
    server: MockServer,
}

impl MockOcws {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    pub fn config(&self) -> OcwsConfig {
        OcwsConfig::new(self.base_url(), USERNAME, PASSWORD)
    }

    /// Path envelopes for `service` are POSTed to.
    pub fn address_path(service: ServiceEndpoint) -> String {
        service.wsdl_path.trim_end_matches(".wsdl").to_string()
    }

    /// Serve a WSDL for `service` declaring `operations`.
    pub async fn mount_wsdl(&self, service: ServiceEndpoint, operations: &[&str]) {
        let address = format!("{}{}", self.base_url(), Self::address_path(service));
        Mock::given(method("GET"))
            .and(path(service.wsdl_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(wsdl(service.namespace, &address, operations), "text/xml"),
            )
            .mount(&self.server)
            .await;
    }

    /// Answer `operation` on `service` with a plain SOAP reply.
    pub async fn mount_reply(&self, service: ServiceEndpoint, operation: &str, status: u16, body: &str) {
        self.mount_raw(
            service,
            operation,
            ResponseTemplate::new(status).set_body_raw(envelope(body), "text/xml;charset=utf-8"),
        )
        .await;
    }

    /// Answer `operation` on `service` with a MIME multipart reply.
    pub async fn mount_multipart_reply(&self, service: ServiceEndpoint, operation: &str, body: &str) {
        let content_type = format!(
            "multipart/related; type=\"application/xop+xml\"; boundary=\"{MULTIPART_BOUNDARY}\""
        );
        self.mount_raw(
            service,
            operation,
            ResponseTemplate::new(200).set_body_raw(multipart(&envelope(body)), &content_type),
        )
        .await;
    }

    pub async fn mount_raw(&self, service: ServiceEndpoint, operation: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(Self::address_path(service)))
            .and(body_string_contains(format!("{operation}Request")))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Bodies of every POST received so far, in order.
    pub async fn posted_envelopes(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == "POST")
            .map(|r| String::from_utf8(r.body).expect("request body is UTF-8"))
            .collect()
    }

    /// `SOAPAction` headers of every POST received so far.
    pub async fn soap_actions(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == "POST")
            .filter_map(|r| {
                r.headers
                    .get("SOAPAction")
                    .and_then(|v| v.to_str().ok())
                    .map(ToString::to_string)
            })
            .collect()
    }
}

/// WSDL 1.1 document for a service group.
pub fn wsdl(namespace: &str, address: &str, operations: &[&str]) -> String {
    let binding_ops: String = operations
        .iter()
        .map(|op| {
            format!(
                r#"<wsdl:operation name="{op}"><soap:operation soapAction=""/><wsdl:input name="{op}Request"><soap:body use="literal"/></wsdl:input></wsdl:operation>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
    xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
    xmlns:sch="{namespace}"
    xmlns:tns="{namespace}"
    targetNamespace="{namespace}">
  <wsdl:binding name="wsSoap11" type="tns:ws">
    <soap:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
    {binding_ops}
  </wsdl:binding>
  <wsdl:service name="wsService">
    <wsdl:port binding="tns:wsSoap11" name="wsSoap11">
      <soap:address location="{address}"/>
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>"#
    )
}

/// SOAP 1.1 reply envelope around `body`.
pub fn envelope(body: &str) -> String {
    format!(
        r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"><SOAP-ENV:Header/><SOAP-ENV:Body>{body}</SOAP-ENV:Body></SOAP-ENV:Envelope>"#
    )
}

/// MTOM-style multipart framing around an envelope.
pub fn multipart(envelope: &str) -> String {
    format!(
        "--{MULTIPART_BOUNDARY}\r\n\
Content-Type: application/xop+xml; charset=utf-8; type=\"text/xml\"\r\n\
Content-Transfer-Encoding: binary\r\n\
Content-ID: <root.message@cxf.apache.org>\r\n\r\n\
{envelope}\r\n\
--{MULTIPART_BOUNDARY}--\r\n"
    )
}

/// SOAP fault element, to be placed in a reply body.
pub fn fault(code: &str, message: &str) -> String {
    format!(
        "<SOAP-ENV:Fault><faultcode>{code}</faultcode><faultstring xml:lang=\"en\">{message}</faultstring></SOAP-ENV:Fault>"
    )
}
