//! Typed request records for the OpenClinica bean types.
//!
//! Each record writes itself as a `bean:`-qualified element. Optional
//! fields are written only when set, so the outgoing request carries
//! exactly what the caller supplied.

use std::io::Write;

use quick_xml::Writer;

use crate::error::OcwsResult;
use crate::protocol::xml::{write_end, write_optional_element, write_start, write_text_element};

/// A record that can be written as a child element of a SOAP request.
pub trait WriteXml {
    /// Write `self` as an element named `name` (already prefixed).
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> OcwsResult<()>;
}

/// `siteRefType`: a site within a study, by unique identifier (not OID).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRef {
    pub identifier: String,
}

impl WriteXml for SiteRef {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> OcwsResult<()> {
        write_start(writer, name)?;
        write_text_element(writer, "bean:identifier", &self.identifier)?;
        write_end(writer, name)
    }
}

/// `studyRefType`: a study by unique identifier, optionally narrowed to a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyRef {
    pub identifier: String,
    pub site_ref: Option<SiteRef>,
}

impl StudyRef {
    /// Reference a study, and a site within it when `site_identifier` is given.
    pub fn new(identifier: impl Into<String>, site_identifier: Option<&str>) -> Self {
        Self {
            identifier: identifier.into(),
            site_ref: site_identifier.map(|id| SiteRef {
                identifier: id.to_string(),
            }),
        }
    }
}

impl WriteXml for StudyRef {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> OcwsResult<()> {
        write_start(writer, name)?;
        write_text_element(writer, "bean:identifier", &self.identifier)?;
        if let Some(site) = &self.site_ref {
            site.write_xml(writer, "bean:siteRef")?;
        }
        write_end(writer, name)
    }
}

/// `studySubjectRefType`: a study subject by label (study subject ID, not OID).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySubjectRef {
    pub label: String,
}

impl WriteXml for StudySubjectRef {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> OcwsResult<()> {
        write_start(writer, name)?;
        write_text_element(writer, "bean:label", &self.label)?;
        write_end(writer, name)
    }
}

/// Date of birth as accepted by `subjectType`: full date or year only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthDate {
    /// ISO-8601 date, e.g. `1990-10-10`.
    Full(String),
    /// Four-digit year, e.g. `1990`.
    Year(String),
}

impl BirthDate {
    /// Classify a caller-supplied value by length.
    ///
    /// Longer than four characters is a full date, exactly four is a year.
    /// Anything shorter is not a usable value and yields `None`.
    pub fn from_input(value: &str) -> Option<Self> {
        match value.chars().count() {
            n if n > 4 => Some(BirthDate::Full(value.to_string())),
            4 => Some(BirthDate::Year(value.to_string())),
            _ => None,
        }
    }
}

/// `subjectType`: the person behind a study subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    /// Person ID.
    pub unique_identifier: Option<String>,
    /// `m` or `f`; required by the service regardless of study settings.
    pub gender: String,
    pub birth_date: Option<BirthDate>,
}

impl WriteXml for Subject {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> OcwsResult<()> {
        write_start(writer, name)?;
        write_optional_element(writer, "bean:uniqueIdentifier", self.unique_identifier.as_deref())?;
        write_text_element(writer, "bean:gender", &self.gender)?;
        match &self.birth_date {
            Some(BirthDate::Full(date)) => write_text_element(writer, "bean:dateOfBirth", date)?,
            Some(BirthDate::Year(year)) => write_text_element(writer, "bean:yearOfBirth", year)?,
            None => {}
        }
        write_end(writer, name)
    }
}

/// `studySubjectType`: a subject enrolled in a study.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySubject {
    pub label: String,
    pub secondary_label: Option<String>,
    /// ISO-8601 enrollment date; absent for existence checks.
    pub enrollment_date: Option<String>,
    pub subject: Option<Subject>,
    pub study_ref: StudyRef,
}

impl StudySubject {
    /// Label and study reference only, as used by `isStudySubject`.
    pub fn reference(label: impl Into<String>, study_ref: StudyRef) -> Self {
        Self {
            label: label.into(),
            secondary_label: None,
            enrollment_date: None,
            subject: None,
            study_ref,
        }
    }
}

impl WriteXml for StudySubject {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> OcwsResult<()> {
        write_start(writer, name)?;
        write_text_element(writer, "bean:label", &self.label)?;
        write_optional_element(writer, "bean:secondaryLabel", self.secondary_label.as_deref())?;
        write_optional_element(writer, "bean:enrollmentDate", self.enrollment_date.as_deref())?;
        if let Some(subject) = &self.subject {
            subject.write_xml(writer, "bean:subject")?;
        }
        self.study_ref.write_xml(writer, "bean:studyRef")?;
        write_end(writer, name)
    }
}

/// `eventType`: a study event to schedule for a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub study_subject_ref: StudySubjectRef,
    pub study_ref: StudyRef,
    pub event_definition_oid: String,
    /// Non-blank location; required by the service regardless of study settings.
    pub location: String,
    /// ISO-8601 date, e.g. `2015-01-01`.
    pub start_date: String,
    /// ISO-8601 time, e.g. `13:51`.
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
}

impl WriteXml for Event {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> OcwsResult<()> {
        write_start(writer, name)?;
        self.study_subject_ref.write_xml(writer, "bean:studySubjectRef")?;
        self.study_ref.write_xml(writer, "bean:studyRef")?;
        write_text_element(writer, "bean:eventDefinitionOID", &self.event_definition_oid)?;
        write_text_element(writer, "bean:location", &self.location)?;
        write_text_element(writer, "bean:startDate", &self.start_date)?;
        write_optional_element(writer, "bean:startTime", self.start_time.as_deref())?;
        write_optional_element(writer, "bean:endDate", self.end_date.as_deref())?;
        write_optional_element(writer, "bean:endTime", self.end_time.as_deref())?;
        write_end(writer, name)
    }
}
