//! # WSDL service descriptions
//!
//! Each OpenClinica service group publishes a WSDL 1.1 document. Only three
//! things are taken from it: the target namespace that qualifies request
//! wrappers, the `soap:address` the envelopes are POSTed to, and the
//! binding's operation → `SOAPAction` table.
//!
//! The table is keyed by the operation's wire name, so operations whose
//! names collide with reserved words elsewhere (`import`) need no special
//! handling.

use std::collections::HashMap;

use crate::error::{OcwsError, OcwsResult};
use crate::protocol::constants::Namespaces;
use crate::protocol::xml::XmlElement;

/// What a client needs to know about one service group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescription {
    /// Where the WSDL was loaded from.
    pub wsdl_url: String,
    /// `targetNamespace` of the definitions.
    pub target_namespace: String,
    /// `soap:address/@location` of the first SOAP port.
    pub address: String,
    operations: HashMap<String, String>,
}

impl ServiceDescription {
    /// Parse a WSDL document fetched from `wsdl_url`.
    pub fn parse(wsdl_url: &str, xml: &str) -> OcwsResult<Self> {
        let invalid = |reason: String| OcwsError::InvalidWsdl {
            url: wsdl_url.to_string(),
            reason,
        };

        let definitions = XmlElement::parse(xml).map_err(|e| invalid(e.to_string()))?;
        if !definitions.is(Namespaces::WSDL, "definitions") {
            return Err(invalid(format!(
                "root element is '{}', expected wsdl:definitions",
                definitions.name
            )));
        }

        let target_namespace = definitions
            .attribute("targetNamespace")
            .ok_or_else(|| invalid("definitions has no targetNamespace".into()))?
            .to_string();

        let address = definitions
            .find_all(Namespaces::WSDL, "port")
            .find_map(|port| {
                port.children
                    .iter()
                    .find(|c| c.is(Namespaces::WSDL_SOAP, "address"))
                    .and_then(|a| a.attribute("location"))
            })
            .ok_or_else(|| invalid("no SOAP 1.1 service address".into()))?
            .to_string();

        let mut operations = HashMap::new();
        for binding in definitions.find_all(Namespaces::WSDL, "binding") {
            let is_soap = binding
                .children
                .iter()
                .any(|c| c.is(Namespaces::WSDL_SOAP, "binding"));
            if !is_soap {
                continue;
            }
            for operation in binding
                .children
                .iter()
                .filter(|c| c.is(Namespaces::WSDL, "operation"))
            {
                let Some(name) = operation.attribute("name") else {
                    continue;
                };
                let action = operation
                    .children
                    .iter()
                    .find(|c| c.is(Namespaces::WSDL_SOAP, "operation"))
                    .and_then(|op| op.attribute("soapAction"))
                    .unwrap_or_default();
                operations
                    .entry(name.to_string())
                    .or_insert_with(|| action.to_string());
            }
        }

        tracing::debug!(
            url = wsdl_url,
            address = %address,
            operations = operations.len(),
            "Parsed service description"
        );

        Ok(Self {
            wsdl_url: wsdl_url.to_string(),
            target_namespace,
            address,
            operations,
        })
    }

    /// `SOAPAction` for `operation`; empty when the binding declares none.
    pub fn soap_action(&self, operation: &str) -> OcwsResult<&str> {
        self.operations
            .get(operation)
            .map(String::as_str)
            .ok_or_else(|| OcwsError::UnknownOperation {
                operation: operation.to_string(),
                url: self.wsdl_url.clone(),
            })
    }

    /// Declared operation names, sorted.
    pub fn operation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA_WSDL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
    xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
    xmlns:tns="http://openclinica.org/ws/data/v1"
    targetNamespace="http://openclinica.org/ws/data/v1">
  <wsdl:portType name="ws">
    <wsdl:operation name="import"/>
  </wsdl:portType>
  <wsdl:binding name="wsSoap11" type="tns:ws">
    <soap:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
    <wsdl:operation name="import">
      <soap:operation soapAction=""/>
    </wsdl:operation>
    <wsdl:operation name="ping">
      <soap:operation soapAction="urn:ping"/>
    </wsdl:operation>
    <wsdl:operation name="bare"/>
  </wsdl:binding>
  <wsdl:service name="wsService">
    <wsdl:port binding="tns:wsSoap11" name="wsSoap11">
      <soap:address location="http://oc.example.org/OpenClinica-ws/ws/data/v1"/>
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>"#;

    #[test]
    fn test_parse_reads_address_namespace_and_actions() {
        let desc = ServiceDescription::parse("http://x/dataWsdl.wsdl", DATA_WSDL).unwrap();
        assert_eq!(desc.target_namespace, Namespaces::DATA_V1);
        assert_eq!(desc.address, "http://oc.example.org/OpenClinica-ws/ws/data/v1");
        assert_eq!(desc.soap_action("import").unwrap(), "");
        assert_eq!(desc.soap_action("ping").unwrap(), "urn:ping");
        assert_eq!(desc.soap_action("bare").unwrap(), "");
        assert_eq!(desc.operation_names(), vec!["bare", "import", "ping"]);
    }

    #[test]
    fn test_unknown_operation() {
        let desc = ServiceDescription::parse("http://x/dataWsdl.wsdl", DATA_WSDL).unwrap();
        let err = desc.soap_action("listAll").unwrap_err();
        assert!(matches!(
            err,
            OcwsError::UnknownOperation { ref operation, .. } if operation == "listAll"
        ));
    }

    #[test]
    fn test_missing_address_is_invalid() {
        let xml = r#"<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
    targetNamespace="urn:x"><wsdl:service name="s"/></wsdl:definitions>"#;
        let err = ServiceDescription::parse("http://x/w.wsdl", xml).unwrap_err();
        assert!(matches!(err, OcwsError::InvalidWsdl { .. }));
    }

    #[test]
    fn test_not_a_wsdl() {
        let err = ServiceDescription::parse("http://x/w.wsdl", "<html><body/></html>").unwrap_err();
        assert!(matches!(err, OcwsError::InvalidWsdl { ref url, .. } if url == "http://x/w.wsdl"));

        let err = ServiceDescription::parse("http://x/w.wsdl", "not xml <").unwrap_err();
        assert!(matches!(err, OcwsError::InvalidWsdl { .. }));
    }
}
