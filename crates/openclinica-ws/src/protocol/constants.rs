//! Protocol constants for namespaces, service endpoints, operation names,
//! and result markers.

/// XML namespaces used on the wire.
pub struct Namespaces;

impl Namespaces {
    // ─── SOAP / WS-Security ─────────────────────────────────────────
    /// SOAP 1.1 envelope.
    pub const SOAP_ENVELOPE: &'static str = "http://schemas.xmlsoap.org/soap/envelope/";

    /// WSDL 1.1 definitions.
    pub const WSDL: &'static str = "http://schemas.xmlsoap.org/wsdl/";

    /// WSDL SOAP 1.1 binding extensions.
    pub const WSDL_SOAP: &'static str = "http://schemas.xmlsoap.org/wsdl/soap/";

    /// WS-Security extension elements.
    pub const WSSE: &'static str =
        "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";

    // ─── OpenClinica ────────────────────────────────────────────────
    /// Shared bean types (study/site/subject references, events).
    pub const BEANS: &'static str = "http://openclinica.org/ws/beans";

    /// Study service messages.
    pub const STUDY_V1: &'static str = "http://openclinica.org/ws/study/v1";

    /// Study subject service messages.
    pub const STUDY_SUBJECT_V1: &'static str = "http://openclinica.org/ws/studySubject/v1";

    /// Event service messages.
    pub const EVENT_V1: &'static str = "http://openclinica.org/ws/event/v1";

    /// Data service messages.
    pub const DATA_V1: &'static str = "http://openclinica.org/ws/data/v1";

    // ─── CDISC ──────────────────────────────────────────────────────
    /// ODM 1.3 metadata and clinical data documents.
    pub const ODM_V1_3: &'static str = "http://www.cdisc.org/ns/odm/v1.3";
}

/// Namespace prefixes written into outgoing envelopes.
pub struct Prefixes;

impl Prefixes {
    pub const SOAP_ENVELOPE: &'static str = "soapenv";
    pub const SERVICE: &'static str = "v1";
    pub const BEANS: &'static str = "bean";
}

// ─── Service endpoints ──────────────────────────────────────────────────

/// One WSDL-described service group of the webservices deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceEndpoint {
    /// Short name used in logs (`study.listAll`).
    pub name: &'static str,
    /// WSDL location relative to the deployment base URL.
    pub wsdl_path: &'static str,
    /// Namespace of the request/response wrapper elements.
    pub namespace: &'static str,
}

/// Known service endpoints.
pub struct Services;

impl Services {
    /// Study listing and metadata.
    pub const STUDY: ServiceEndpoint = ServiceEndpoint {
        name: "study",
        wsdl_path: "/ws/study/v1/studyWsdl.wsdl",
        namespace: Namespaces::STUDY_V1,
    };

    /// Study subject listing, reached through the study path.
    pub const STUDY_SUBJECT_LISTING: ServiceEndpoint = ServiceEndpoint {
        name: "studySubject",
        wsdl_path: "/ws/study/v1/studySubjectWsdl.wsdl",
        namespace: Namespaces::STUDY_SUBJECT_V1,
    };

    /// Study subject creation and lookup.
    pub const STUDY_SUBJECT: ServiceEndpoint = ServiceEndpoint {
        name: "studySubject",
        wsdl_path: "/ws/studySubject/v1/studySubjectWsdl.wsdl",
        namespace: Namespaces::STUDY_SUBJECT_V1,
    };

    /// Event scheduling.
    pub const EVENT: ServiceEndpoint = ServiceEndpoint {
        name: "event",
        wsdl_path: "/ws/event/v1/eventWsdl.wsdl",
        namespace: Namespaces::EVENT_V1,
    };

    /// Clinical data import.
    pub const DATA: ServiceEndpoint = ServiceEndpoint {
        name: "data",
        wsdl_path: "/ws/data/v1/dataWsdl.wsdl",
        namespace: Namespaces::DATA_V1,
    };
}

// ─── Operations ─────────────────────────────────────────────────────────

/// Remote operation names as declared in the WSDLs.
pub struct Operations;

impl Operations {
    /// List every study (and its sites) in the instance.
    pub const LIST_ALL: &'static str = "listAll";

    /// ODM metadata for a study or site.
    pub const GET_METADATA: &'static str = "getMetadata";

    /// List the subjects of a study or site.
    pub const LIST_ALL_BY_STUDY: &'static str = "listAllByStudy";

    /// Create a study subject.
    pub const CREATE: &'static str = "create";

    /// Check whether a study subject exists.
    pub const IS_STUDY_SUBJECT: &'static str = "isStudySubject";

    /// Schedule an event for a study subject.
    pub const SCHEDULE: &'static str = "schedule";

    /// Import ODM clinical data.
    pub const IMPORT: &'static str = "import";
}

/// Request wrapper element local name for an operation (`listAllRequest`).
pub fn request_element(operation: &str) -> String {
    format!("{operation}Request")
}

// ─── Result markers ─────────────────────────────────────────────────────

/// Values of the `result` element carried by every response.
pub struct ResultCodes;

impl ResultCodes {
    pub const SUCCESS: &'static str = "Success";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_element_names() {
        assert_eq!(request_element(Operations::IMPORT), "importRequest");
        assert_eq!(
            request_element(Operations::IS_STUDY_SUBJECT),
            "isStudySubjectRequest"
        );
    }

    #[test]
    fn test_study_subject_paths_differ_by_operation_group() {
        assert_ne!(
            Services::STUDY_SUBJECT_LISTING.wsdl_path,
            Services::STUDY_SUBJECT.wsdl_path
        );
        assert_eq!(
            Services::STUDY_SUBJECT_LISTING.namespace,
            Services::STUDY_SUBJECT.namespace
        );
    }
}
