//! Typed response records.
//!
//! Every OpenClinica reply carries a `result` (`Success` / `Fail`) and zero
//! or more `error` messages; a `Fail` is a normal value, not an
//! [`OcwsError`]. The response element itself is kept alongside the typed
//! fields for callers that need something not mapped here.

use serde::Serialize;

use crate::error::{OcwsError, OcwsResult};
use crate::protocol::constants::{Namespaces, ResultCodes};
use crate::protocol::xml::XmlElement;

/// Conversion from the unwrapped `{operation}Response` element.
pub trait FromResponse: Sized {
    fn from_response(element: XmlElement) -> OcwsResult<Self>;
}

/// Status shared by every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseStatus {
    /// Literal `result` text, e.g. `Success` or `Fail`.
    pub result: String,
    /// `error` messages reported by the service.
    pub errors: Vec<String>,
}

impl ResponseStatus {
    fn read(element: &XmlElement) -> OcwsResult<Self> {
        let result = element
            .child_text("result")
            .ok_or_else(|| OcwsError::missing("result"))?
            .to_string();
        let errors = element
            .children_named("error")
            .map(|e| e.text.clone())
            .collect();
        Ok(Self { result, errors })
    }

    pub fn is_success(&self) -> bool {
        self.result == ResultCodes::SUCCESS
    }
}

fn opt_text(element: &XmlElement, name: &str) -> Option<String> {
    element
        .child_text(name)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}

// ─── study.listAll ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteSummary {
    pub identifier: Option<String>,
    pub oid: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudySummary {
    pub identifier: Option<String>,
    pub oid: Option<String>,
    pub name: Option<String>,
    pub sites: Vec<SiteSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyListResponse {
    #[serde(flatten)]
    pub status: ResponseStatus,
    pub studies: Vec<StudySummary>,
    #[serde(skip)]
    pub element: XmlElement,
}

impl FromResponse for StudyListResponse {
    fn from_response(element: XmlElement) -> OcwsResult<Self> {
        let status = ResponseStatus::read(&element)?;
        let studies = element
            .child("studies")
            .map(|studies| {
                studies
                    .children_named("study")
                    .map(|study| StudySummary {
                        identifier: opt_text(study, "identifier"),
                        oid: opt_text(study, "oid"),
                        name: opt_text(study, "name"),
                        sites: study
                            .child("sites")
                            .map(|sites| {
                                sites
                                    .children_named("site")
                                    .map(|site| SiteSummary {
                                        identifier: opt_text(site, "identifier"),
                                        oid: opt_text(site, "oid"),
                                        name: opt_text(site, "name"),
                                    })
                                    .collect()
                            })
                            .unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            status,
            studies,
            element,
        })
    }
}

// ─── studySubject.listAllByStudy ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectSummary {
    pub unique_identifier: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub year_of_birth: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub event_definition_oid: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudySubjectSummary {
    pub label: Option<String>,
    pub secondary_label: Option<String>,
    pub oid: Option<String>,
    pub enrollment_date: Option<String>,
    pub subject: Option<SubjectSummary>,
    pub events: Vec<EventSummary>,
}

impl StudySubjectSummary {
    fn read(element: &XmlElement) -> Self {
        Self {
            label: opt_text(element, "label"),
            secondary_label: opt_text(element, "secondaryLabel"),
            oid: opt_text(element, "oid"),
            enrollment_date: opt_text(element, "enrollmentDate"),
            subject: element.child("subject").map(|s| SubjectSummary {
                unique_identifier: opt_text(s, "uniqueIdentifier"),
                gender: opt_text(s, "gender"),
                date_of_birth: opt_text(s, "dateOfBirth"),
                year_of_birth: opt_text(s, "yearOfBirth"),
            }),
            events: element
                .child("events")
                .map(|events| {
                    events
                        .children_named("event")
                        .map(|e| EventSummary {
                            event_definition_oid: opt_text(e, "eventDefinitionOID"),
                            location: opt_text(e, "location"),
                            start_date: opt_text(e, "startDate"),
                            start_time: opt_text(e, "startTime"),
                            end_date: opt_text(e, "endDate"),
                            end_time: opt_text(e, "endTime"),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectListResponse {
    #[serde(flatten)]
    pub status: ResponseStatus,
    pub study_subjects: Vec<StudySubjectSummary>,
    #[serde(skip)]
    pub element: XmlElement,
}

impl FromResponse for SubjectListResponse {
    fn from_response(element: XmlElement) -> OcwsResult<Self> {
        let status = ResponseStatus::read(&element)?;
        let study_subjects = element
            .child("studySubjects")
            .map(|list| {
                list.children_named("studySubject")
                    .map(StudySubjectSummary::read)
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            status,
            study_subjects,
            element,
        })
    }
}

// ─── studySubject.create ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSubjectResponse {
    #[serde(flatten)]
    pub status: ResponseStatus,
    /// Label of the created study subject.
    pub label: Option<String>,
    #[serde(skip)]
    pub element: XmlElement,
}

impl FromResponse for CreateSubjectResponse {
    fn from_response(element: XmlElement) -> OcwsResult<Self> {
        Ok(Self {
            status: ResponseStatus::read(&element)?,
            label: opt_text(&element, "label"),
            element,
        })
    }
}

// ─── event.schedule ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEventResponse {
    #[serde(flatten)]
    pub status: ResponseStatus,
    pub event_definition_oid: Option<String>,
    pub study_subject_oid: Option<String>,
    pub study_event_ordinal: Option<String>,
    #[serde(skip)]
    pub element: XmlElement,
}

impl FromResponse for ScheduleEventResponse {
    fn from_response(element: XmlElement) -> OcwsResult<Self> {
        Ok(Self {
            status: ResponseStatus::read(&element)?,
            event_definition_oid: opt_text(&element, "eventDefinitionOID"),
            study_subject_oid: opt_text(&element, "studySubjectOID"),
            study_event_ordinal: opt_text(&element, "studyEventOrdinal"),
            element,
        })
    }
}

// ─── data.import ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportResponse {
    #[serde(flatten)]
    pub status: ResponseStatus,
    #[serde(skip)]
    pub element: XmlElement,
}

impl FromResponse for ImportResponse {
    fn from_response(element: XmlElement) -> OcwsResult<Self> {
        Ok(Self {
            status: ResponseStatus::read(&element)?,
            element,
        })
    }
}

// ─── ODM ────────────────────────────────────────────────────────────────

/// ODM metadata document returned by `study.getMetadata`.
///
/// This is the same document the OpenClinica UI offers for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OdmDocument {
    pub root: XmlElement,
}

impl OdmDocument {
    /// Parse the ODM text embedded in a metadata reply.
    pub fn parse(xml: &str) -> OcwsResult<Self> {
        Ok(Self {
            root: XmlElement::parse(xml)?,
        })
    }

    /// Every element in document order with the given namespace and local name.
    pub fn find_all<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.root.find_all(namespace, name)
    }

    /// OIDs of every `ItemDef`.
    pub fn item_oids(&self) -> Vec<&str> {
        self.oids_of("ItemDef")
    }

    /// OIDs of every `StudyEventDef`.
    pub fn event_definition_oids(&self) -> Vec<&str> {
        self.oids_of("StudyEventDef")
    }

    fn oids_of(&self, name: &'static str) -> Vec<&str> {
        self.find_all(Namespaces::ODM_V1_3, name)
            .filter_map(|e| e.attribute("OID"))
            .collect()
    }
}
