//! OpenClinica SOAP protocol domain modules.
//!
//! - [`constants`]: namespaces, service endpoints, and operation names.
//! - [`xml`]: namespace-resolved element tree used for every reply.
//! - [`beans`]: request records shared across services (`studyRef`, `event`, ...).
//! - [`requests`]: one request body per operation.
//! - [`envelope`]: SOAP envelope building and fault detection.
//! - [`responses`]: typed replies and the ODM metadata document.

pub mod beans;
pub mod constants;
pub mod envelope;
pub mod requests;
pub mod responses;
pub mod xml;
