//! # Webservices facade
//!
//! One async method per remote operation. Every call opens a fresh
//! [`OcwsClient`] for its service group (WSDL fetch plus token), performs a
//! single exchange, and logs the attempt:
//!
//! | Method                  | Service group       | Operation        |
//! |-------------------------|---------------------|------------------|
//! | [`list_all_studies`]    | study               | `listAll`        |
//! | [`get_study_metadata`]  | study               | `getMetadata`    |
//! | [`list_all_subjects`]   | study subject (list)| `listAllByStudy` |
//! | [`create_subject`]      | study subject       | `create`         |
//! | [`subject_exists`]      | study subject       | `isStudySubject` |
//! | [`schedule_event`]      | event               | `schedule`       |
//! | [`import_data`]         | data                | `import`         |
//!
//! [`list_all_studies`]: Webservices::list_all_studies
//! [`get_study_metadata`]: Webservices::get_study_metadata
//! [`list_all_subjects`]: Webservices::list_all_subjects
//! [`create_subject`]: Webservices::create_subject
//! [`subject_exists`]: Webservices::subject_exists
//! [`schedule_event`]: Webservices::schedule_event
//! [`import_data`]: Webservices::import_data

use crate::auth::Credentials;
use crate::client::OcwsClient;
use crate::config::OcwsConfig;
use crate::error::OcwsResult;
use crate::filters::{LogMessages, MessageFilter, TrimMultipartReply};
use crate::protocol::beans::{BirthDate, Event, StudyRef, StudySubject, StudySubjectRef, Subject};
use crate::protocol::constants::{Namespaces, Operations, ResultCodes, ServiceEndpoint, Services};
use crate::protocol::requests::{
    CreateRequest, GetMetadataRequest, ImportRequest, IsStudySubjectRequest,
    ListAllByStudyRequest, ListAllRequest, ScheduleRequest,
};
use crate::protocol::responses::{
    CreateSubjectResponse, FromResponse, ImportResponse, OdmDocument, ScheduleEventResponse,
    StudyListResponse, SubjectListResponse,
};

/// A subject to enroll with [`Webservices::create_subject`].
#[derive(Debug, Clone, Default)]
pub struct NewSubject<'a> {
    /// Unique identifier of the study (not its OID).
    pub study_id: &'a str,
    /// Study subject ID.
    pub subject_label: &'a str,
    /// ISO-8601 date, e.g. `2015-01-01`.
    pub enrollment_date: &'a str,
    /// `m` or `f`.
    pub gender: &'a str,
    pub secondary_label: Option<&'a str>,
    /// Person ID.
    pub person_id: Option<&'a str>,
    /// Full date (`1990-10-10`) or year (`1990`); see [`BirthDate::from_input`].
    pub date_of_birth: Option<&'a str>,
    /// Unique identifier of the site, if enrolling at a site.
    pub site_id: Option<&'a str>,
}

impl NewSubject<'_> {
    fn to_study_subject(&self) -> StudySubject {
        StudySubject {
            label: self.subject_label.to_string(),
            secondary_label: self.secondary_label.map(ToString::to_string),
            enrollment_date: Some(self.enrollment_date.to_string()),
            subject: Some(Subject {
                unique_identifier: self.person_id.map(ToString::to_string),
                gender: self.gender.to_string(),
                birth_date: self.date_of_birth.and_then(BirthDate::from_input),
            }),
            study_ref: StudyRef::new(self.study_id, self.site_id),
        }
    }
}

/// An event to schedule with [`Webservices::schedule_event`].
#[derive(Debug, Clone, Default)]
pub struct NewEvent<'a> {
    pub study_id: &'a str,
    pub subject_label: &'a str,
    /// `StudyEventDef` OID, e.g. `SE_BASELINE`.
    pub event_definition_oid: &'a str,
    /// Must not be blank.
    pub location: &'a str,
    /// ISO-8601 date.
    pub start_date: &'a str,
    pub site_id: Option<&'a str>,
    /// ISO-8601 time, e.g. `13:51`.
    pub start_time: Option<&'a str>,
    pub end_date: Option<&'a str>,
    pub end_time: Option<&'a str>,
}

impl NewEvent<'_> {
    fn to_event(&self) -> Event {
        Event {
            study_subject_ref: StudySubjectRef {
                label: self.subject_label.to_string(),
            },
            study_ref: StudyRef::new(self.study_id, self.site_id),
            event_definition_oid: self.event_definition_oid.to_string(),
            location: self.location.to_string(),
            start_date: self.start_date.to_string(),
            start_time: self.start_time.map(ToString::to_string),
            end_date: self.end_date.map(ToString::to_string),
            end_time: self.end_time.map(ToString::to_string),
        }
    }
}

/// Entry point for calling OpenClinica webservices.
///
/// ```no_run
/// # async fn run() -> openclinica_ws::OcwsResult<()> {
/// use openclinica_ws::{OcwsConfig, Webservices};
///
/// let ws = Webservices::new(OcwsConfig::from_env()?);
/// for study in ws.list_all_studies().await?.studies {
///     println!("{:?} {:?}", study.identifier, study.oid);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Webservices {
    config: OcwsConfig,
    credentials: Credentials,
}

impl Webservices {
    pub fn new(config: OcwsConfig) -> Self {
        let credentials = Credentials::new(config.username.clone(), &config.password);
        Self {
            config,
            credentials,
        }
    }

    pub fn config(&self) -> &OcwsConfig {
        &self.config
    }

    /// Create a client for `service`, with the trimming filter if `trim`.
    async fn client(&self, service: ServiceEndpoint, trim: bool) -> OcwsResult<OcwsClient> {
        let mut filters: Vec<Box<dyn MessageFilter>> = Vec::new();
        if trim {
            filters.push(Box::new(TrimMultipartReply));
        }
        if self.config.log_messages {
            filters.push(Box::new(LogMessages));
        }
        OcwsClient::create_client(
            &self.config.wsdl_url(service.wsdl_path),
            self.credentials.clone(),
            filters,
        )
        .await
    }

    // ─── Study ──────────────────────────────────────────────────────────

    /// All studies and their sites visible to the account.
    pub async fn list_all_studies(&self) -> OcwsResult<StudyListResponse> {
        let (service, operation) = (Services::STUDY, Operations::LIST_ALL);
        tracing::info!(service = service.name, operation, "Call attempt starting");

        let client = self.client(service, false).await?;
        let response = StudyListResponse::from_response(client.call(&ListAllRequest).await?)?;

        tracing::info!(
            service = service.name,
            operation,
            result = %response.status.result,
            "Call attempt finished",
        );
        Ok(response)
    }

    /// ODM metadata of a study, or of one of its sites.
    pub async fn get_study_metadata(
        &self,
        study_id: &str,
        site_id: Option<&str>,
    ) -> OcwsResult<OdmDocument> {
        let (service, operation) = (Services::STUDY, Operations::GET_METADATA);
        tracing::info!(service = service.name, operation, study_id, "Call attempt starting");

        let client = self.client(service, false).await?;
        let request = GetMetadataRequest {
            study_ref: StudyRef::new(study_id, site_id),
        };
        let reply = client.call_raw(&request).await?;
        let result = reply.require_text(Namespaces::STUDY_V1, "result")?;
        let odm_text = reply.require_text(Namespaces::STUDY_V1, "odm")?;
        let odm = OdmDocument::parse(odm_text)?;

        tracing::info!(service = service.name, operation, result, "Call attempt finished");
        Ok(odm)
    }

    // ─── Study subject ──────────────────────────────────────────────────

    /// All study subjects of a study or site, with their events.
    pub async fn list_all_subjects(
        &self,
        study_id: &str,
        site_id: Option<&str>,
    ) -> OcwsResult<SubjectListResponse> {
        let (service, operation) = (Services::STUDY_SUBJECT_LISTING, Operations::LIST_ALL_BY_STUDY);
        tracing::info!(service = service.name, operation, study_id, "Call attempt starting");

        let client = self.client(service, true).await?;
        let request = ListAllByStudyRequest {
            study_ref: StudyRef::new(study_id, site_id),
        };
        let response = SubjectListResponse::from_response(client.call(&request).await?)?;

        tracing::info!(
            service = service.name,
            operation,
            result = %response.status.result,
            "Call attempt finished",
        );
        Ok(response)
    }

    /// Enroll a new study subject.
    pub async fn create_subject(&self, subject: &NewSubject<'_>) -> OcwsResult<CreateSubjectResponse> {
        let (service, operation) = (Services::STUDY_SUBJECT, Operations::CREATE);
        tracing::info!(
            service = service.name,
            operation,
            study_id = subject.study_id,
            label = subject.subject_label,
            "Call attempt starting"
        );

        let client = self.client(service, false).await?;
        let request = CreateRequest {
            study_subject: subject.to_study_subject(),
        };
        let response = CreateSubjectResponse::from_response(client.call(&request).await?)?;

        tracing::info!(
            service = service.name,
            operation,
            result = %response.status.result,
            "Call attempt finished",
        );
        Ok(response)
    }

    /// OID of the study subject labelled `subject_label`, if it exists.
    ///
    /// Any result other than `Success` yields `Ok(None)`.
    pub async fn subject_exists(
        &self,
        study_id: &str,
        subject_label: &str,
        site_id: Option<&str>,
    ) -> OcwsResult<Option<String>> {
        let (service, operation) = (Services::STUDY_SUBJECT, Operations::IS_STUDY_SUBJECT);
        tracing::info!(
            service = service.name,
            operation,
            study_id,
            label = subject_label,
            "Call attempt starting",
        );

        let client = self.client(service, true).await?;
        let request = IsStudySubjectRequest {
            study_subject: StudySubject::reference(
                subject_label,
                StudyRef::new(study_id, site_id),
            ),
        };
        let reply = client.call_raw(&request).await?;
        let result = reply.require_text(Namespaces::STUDY_SUBJECT_V1, "result")?;

        let subject_oid = if result == ResultCodes::SUCCESS {
            Some(
                reply
                    .require_text(Namespaces::STUDY_SUBJECT_V1, "subjectOID")?
                    .to_string(),
            )
        } else {
            None
        };

        tracing::info!(service = service.name, operation, result, "Call attempt finished");
        Ok(subject_oid)
    }

    // ─── Event ──────────────────────────────────────────────────────────

    /// Schedule a study event for an existing study subject.
    pub async fn schedule_event(&self, event: &NewEvent<'_>) -> OcwsResult<ScheduleEventResponse> {
        let (service, operation) = (Services::EVENT, Operations::SCHEDULE);
        tracing::info!(
            service = service.name,
            operation,
            label = event.subject_label,
            event = event.event_definition_oid,
            "Call attempt starting"
        );

        let client = self.client(service, false).await?;
        let request = ScheduleRequest {
            event: event.to_event(),
        };
        let response = ScheduleEventResponse::from_response(client.call(&request).await?)?;

        tracing::info!(
            service = service.name,
            operation,
            result = %response.status.result,
            "Call attempt finished",
        );
        Ok(response)
    }

    // ─── Data ───────────────────────────────────────────────────────────

    /// Import ODM clinical data.
    ///
    /// `odm` is the content of the `<odm>` element, typically a
    /// `<ClinicalData>` fragment. It is sent verbatim.
    pub async fn import_data(&self, odm: &str) -> OcwsResult<ImportResponse> {
        let (service, operation) = (Services::DATA, Operations::IMPORT);
        tracing::info!(
            service = service.name,
            operation,
            bytes = odm.len(),
            "Call attempt starting",
        );

        let client = self.client(service, false).await?;
        let request = ImportRequest {
            odm: odm.to_string(),
        };
        let response = ImportResponse::from_response(client.call(&request).await?)?;

        tracing::info!(
            service = service.name,
            operation,
            result = %response.status.result,
            "Call attempt finished",
        );
        Ok(response)
    }
}
