//! # OpenClinica SOAP Client
//!
//! Low-level transport for one OpenClinica service group. A client is
//! created from a WSDL URL: the WSDL is fetched and parsed into a
//! [`ServiceDescription`], and every call POSTs a WS-Security envelope to
//! the service address it declares.
//!
//! ```text
//! create_client ── GET  {base}/ws/<group>/v1/<group>Wsdl.wsdl ─► ServiceDescription
//!
//! call(request) ─┬─ build_envelope (UsernameToken + {op}Request)
//!                ├─ filters.sending(envelope)
//!                ├─ POST soap:address   SOAPAction from the binding
//!                ├─ filters.received(reply)
//!                └─ parse ─► fault? ─► OcwsError::SoapFault
//!                                └──► Body payload
//! ```
//!
//! A client carries no state between calls; each call is one sequential
//! request/response exchange with no retries.

use std::fmt;

use reqwest::header::{CONTENT_TYPE, HeaderValue};

use crate::auth::Credentials;
use crate::error::{OcwsError, OcwsResult};
use crate::filters::MessageFilter;
use crate::protocol::envelope::{RequestBody, build_envelope, find_fault, unwrap_body};
use crate::protocol::xml::XmlElement;
use crate::wsdl::ServiceDescription;

/// Content type of SOAP 1.1 requests.
const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Header carrying the operation's `soapAction`.
const SOAP_ACTION_HEADER: &str = "SOAPAction";

/// Authenticated client bound to one WSDL.
pub struct OcwsClient {
    http: reqwest::Client,
    service: ServiceDescription,
    credentials: Credentials,
    filters: Vec<Box<dyn MessageFilter>>,
}

impl fmt::Debug for OcwsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcwsClient")
            .field("service", &self.service)
            .field("credentials", &self.credentials)
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}

impl OcwsClient {
    /// Fetch the WSDL at `wsdl_url` and build a client for its service.
    ///
    /// Fails with [`OcwsError::ConnectionFailed`] if the WSDL cannot be
    /// fetched and [`OcwsError::InvalidWsdl`] if it cannot be understood.
    pub async fn create_client(
        wsdl_url: &str,
        credentials: Credentials,
        filters: Vec<Box<dyn MessageFilter>>,
    ) -> OcwsResult<Self> {
        let http = reqwest::Client::builder().build()?;
        Self::create_with_http(http, wsdl_url, credentials, filters).await
    }

    /// Like [`create_client`](Self::create_client), reusing an existing
    /// `reqwest` client (proxies, custom roots, ...).
    pub async fn create_with_http(
        http: reqwest::Client,
        wsdl_url: &str,
        credentials: Credentials,
        filters: Vec<Box<dyn MessageFilter>>,
    ) -> OcwsResult<Self> {
        let connection_failed = |reason: String| OcwsError::ConnectionFailed {
            url: wsdl_url.to_string(),
            reason,
        };

        tracing::debug!(url = wsdl_url, "Fetching WSDL");
        let response = http
            .get(wsdl_url)
            .send()
            .await
            .map_err(|e| connection_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(connection_failed(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| connection_failed(e.to_string()))?;
        let service = ServiceDescription::parse(wsdl_url, &body)?;

        tracing::info!(
            url = wsdl_url,
            address = %service.address,
            user = credentials.username(),
            "Created webservice client"
        );

        Ok(Self {
            http,
            service,
            credentials,
            filters,
        })
    }

    /// The parsed WSDL this client is bound to.
    pub fn service(&self) -> &ServiceDescription {
        &self.service
    }

    // ─── Core call ──────────────────────────────────────────────────────

    /// Call an operation and return the first element of the reply body.
    pub async fn call<R: RequestBody>(&self, request: &R) -> OcwsResult<XmlElement> {
        unwrap_body(self.call_raw(request).await?)
    }

    /// Call an operation and return the whole reply envelope.
    ///
    /// Faults are still turned into [`OcwsError::SoapFault`].
    pub async fn call_raw<R: RequestBody>(&self, request: &R) -> OcwsResult<XmlElement> {
        let operation = R::OPERATION;
        let soap_action = self.service.soap_action(operation)?;
        let envelope = build_envelope(
            &self.service.target_namespace,
            self.credentials.token(),
            request,
        )?;

        for filter in &self.filters {
            filter.sending(&envelope);
        }

        tracing::debug!(operation, address = %self.service.address, "Sending SOAP request");

        let response = self
            .http
            .post(&self.service.address)
            .header(CONTENT_TYPE, HeaderValue::from_static(SOAP_CONTENT_TYPE))
            .header(SOAP_ACTION_HEADER, format!("\"{soap_action}\""))
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let mut reply = response.bytes().await?.to_vec();
        for filter in &self.filters {
            reply = filter.received(reply);
        }

        let document = XmlElement::parse_bytes(&reply);
        if !status.is_success() {
            if let Some(fault) = document.as_ref().ok().and_then(find_fault) {
                tracing::warn!(operation, %status, "SOAP fault");
                return Err(fault);
            }
            return Err(OcwsError::HttpStatus {
                status: status.as_u16(),
                url: self.service.address.clone(),
            });
        }

        let document = document?;
        if let Some(fault) = find_fault(&document) {
            tracing::warn!(operation, "SOAP fault");
            return Err(fault);
        }

        tracing::debug!(operation, "SOAP call succeeded");
        Ok(document)
    }
}
