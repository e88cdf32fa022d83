//! # Error Types
//!
//! Semantic error types for the OpenClinica webservices client. Every
//! variant carries enough context to diagnose the problem without digging
//! through logs.
//!
//! Business-level failures reported inside a successful SOAP reply (a
//! `result` other than `Success`) are *not* errors: they surface through
//! the typed response records instead.

use thiserror::Error;

/// Convenient Result alias for webservice operations.
pub type OcwsResult<T> = std::result::Result<T, OcwsError>;

/// All errors that can occur when talking to OpenClinica webservices.
#[derive(Error, Debug)]
pub enum OcwsError {
    // ─── Connection ─────────────────────────────────────────────────
    /// The WSDL endpoint could not be reached or returned a non-success status.
    #[error("Failed to load WSDL from {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// The WSDL document was fetched but could not be understood.
    #[error("Invalid WSDL at {url}: {reason}")]
    InvalidWsdl { url: String, reason: String },

    /// The WSDL does not declare the requested operation.
    #[error("Operation '{operation}' is not declared by the service at {url}")]
    UnknownOperation { operation: String, url: String },

    // ─── Transport ──────────────────────────────────────────────────
    /// Low-level HTTP transport error.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status and no SOAP fault.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    // ─── SOAP ───────────────────────────────────────────────────────
    /// The service answered with a SOAP fault.
    #[error("SOAP fault {code}: {message}")]
    SoapFault { code: String, message: String },

    // ─── Parsing ────────────────────────────────────────────────────
    /// XML was malformed or not valid UTF-8.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// A node required to interpret the response was absent.
    #[error("Response is missing expected element '{element}'")]
    MissingElement { element: String },

    // ─── Config ─────────────────────────────────────────────────────
    /// Configuration file error (missing, malformed, or invalid values).
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    // ─── I/O ────────────────────────────────────────────────────────
    /// Filesystem or buffer I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OcwsError {
    /// Shorthand for a [`OcwsError::MissingElement`] naming `element`.
    pub fn missing(element: impl Into<String>) -> Self {
        OcwsError::MissingElement {
            element: element.into(),
        }
    }

    /// Returns `true` if the call never produced a readable SOAP reply.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            OcwsError::ConnectionFailed { .. }
                | OcwsError::Transport(_)
                | OcwsError::HttpStatus { .. }
        )
    }
}

// ─── From impls for external error types ────────────────────────────────

impl From<reqwest::Error> for OcwsError {
    fn from(err: reqwest::Error) -> Self {
        OcwsError::Transport(err.to_string())
    }
}

impl From<quick_xml::Error> for OcwsError {
    fn from(err: quick_xml::Error) -> Self {
        OcwsError::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for OcwsError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OcwsError::XmlParse(err.to_string())
    }
}

impl From<std::str::Utf8Error> for OcwsError {
    fn from(err: std::str::Utf8Error) -> Self {
        OcwsError::XmlParse(format!("invalid UTF-8: {err}"))
    }
}

#[cfg(feature = "config-toml")]
impl From<toml::de::Error> for OcwsError {
    fn from(err: toml::de::Error) -> Self {
        OcwsError::ConfigError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_transport_error() {
        assert!(OcwsError::Transport("reset".into()).is_transport_error());
        assert!(
            OcwsError::HttpStatus {
                status: 502,
                url: "http://oc/ws".into(),
            }
            .is_transport_error()
        );
        assert!(
            OcwsError::ConnectionFailed {
                url: "http://oc/ws".into(),
                reason: "refused".into(),
            }
            .is_transport_error()
        );
        assert!(!OcwsError::missing("result").is_transport_error());
        assert!(
            !OcwsError::SoapFault {
                code: "SOAP-ENV:Client".into(),
                message: "bad".into(),
            }
            .is_transport_error()
        );
    }

    #[test]
    fn test_missing_element_message() {
        let err = OcwsError::missing("subjectOID");
        assert!(matches!(err, OcwsError::MissingElement { .. }));
        assert!(err.to_string().contains("subjectOID"));
    }

    #[test]
    fn test_from_quick_xml_error() {
        let mut reader = quick_xml::Reader::from_str("<a></b>");
        let err = loop {
            match reader.read_event() {
                Ok(quick_xml::events::Event::Eof) => panic!("expected a mismatch error"),
                Ok(_) => {}
                Err(e) => break e,
            }
        };
        let err: OcwsError = err.into();
        assert!(matches!(err, OcwsError::XmlParse(_)));
        assert!(err.to_string().contains("XML parsing error"));
    }

    #[cfg(feature = "config-toml")]
    #[test]
    fn test_from_toml_error_conversion() {
        #[derive(Debug, serde::Deserialize)]
        struct DummyConfig {
            _value: String,
        }

        let toml_err = toml::from_str::<DummyConfig>("value = [").unwrap_err();
        let err: OcwsError = toml_err.into();
        assert!(matches!(err, OcwsError::ConfigError { .. }));
        assert!(err.to_string().contains("Configuration error"));
    }
}
