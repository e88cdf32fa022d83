//! # openclinica-ws
//!
//! A Rust client for the [OpenClinica](https://www.openclinica.com/) 3.x
//! SOAP webservices.
//!
//! The crate covers the operations needed to drive a clinical trial
//! database from another system: listing studies and their ODM metadata,
//! enrolling and looking up study subjects, scheduling events, and
//! importing clinical data.
//!
//! ## Quick Start
//!
//! ```no_run
//! use openclinica_ws::{OcwsConfig, Webservices};
//!
//! #[tokio::main]
//! async fn main() -> openclinica_ws::OcwsResult<()> {
//!     // Load config from environment or ocws.toml
//!     let config = OcwsConfig::discover(None)?;
//!     let ws = Webservices::new(config);
//!
//!     let studies = ws.list_all_studies().await?;
//!     for study in &studies.studies {
//!         println!("{:?} ({:?})", study.identifier, study.oid);
//!     }
//!
//!     if let Some(oid) = ws.subject_exists("default-study", "SS-1", None).await? {
//!         println!("SS-1 is {oid}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Two-Layer API
//!
//! | Layer | Type | Scope | Best for |
//! |-------|------|-------|----------|
//! | Low-level | [`OcwsClient`] | One WSDL, any [`RequestBody`](protocol::envelope::RequestBody) | Custom operations, filters |
//! | High-level | [`Webservices`] | The seven supported operations | Applications |
//!
//! ## Configuration
//!
//! See [`OcwsConfig`] for the full configuration reference.
//! The simplest setup uses environment variables:
//!
//! ```bash
//! export OCWS_URL="https://oc.example.org/OpenClinica-ws"
//! export OCWS_USERNAME="api-user"
//! export OCWS_PASSWORD="secret"
//! ```
//!
//! Or an `ocws.toml` file:
//!
//! ```toml
//! base_url = "https://oc.example.org/OpenClinica-ws"
//! username = "api-user"
//! password = "secret"
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod filters;
pub mod protocol;
pub mod webservices;
pub mod wsdl;

// ─── Public re-exports ──────────────────────────────────────────────────

pub use auth::Credentials;
pub use client::OcwsClient;
pub use config::OcwsConfig;
pub use error::{OcwsError, OcwsResult};
pub use protocol::responses::OdmDocument;
pub use webservices::{NewEvent, NewSubject, Webservices};
