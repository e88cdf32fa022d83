//! Request bodies, one per remote operation.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesText, Event};

use crate::error::OcwsResult;
use crate::protocol::beans::{Event as EventRecord, StudyRef, StudySubject, WriteXml};
use crate::protocol::constants::Operations;
use crate::protocol::envelope::RequestBody;
use crate::protocol::xml::{write_end, write_start};

/// `study.listAll`: no parameters.
#[derive(Debug, Clone, Default)]
pub struct ListAllRequest;

impl RequestBody for ListAllRequest {
    const OPERATION: &'static str = Operations::LIST_ALL;

    fn write_body<W: Write>(&self, _writer: &mut Writer<W>) -> OcwsResult<()> {
        Ok(())
    }
}

/// `study.getMetadata`.
#[derive(Debug, Clone)]
pub struct GetMetadataRequest {
    pub study_ref: StudyRef,
}

impl RequestBody for GetMetadataRequest {
    const OPERATION: &'static str = Operations::GET_METADATA;

    fn write_body<W: Write>(&self, writer: &mut Writer<W>) -> OcwsResult<()> {
        write_start(writer, "v1:studyMetadata")?;
        self.study_ref.write_xml(writer, "bean:studyRef")?;
        write_end(writer, "v1:studyMetadata")
    }
}

/// `studySubject.listAllByStudy`.
#[derive(Debug, Clone)]
pub struct ListAllByStudyRequest {
    pub study_ref: StudyRef,
}

impl RequestBody for ListAllByStudyRequest {
    const OPERATION: &'static str = Operations::LIST_ALL_BY_STUDY;

    fn write_body<W: Write>(&self, writer: &mut Writer<W>) -> OcwsResult<()> {
        self.study_ref.write_xml(writer, "bean:studyRef")
    }
}

/// `studySubject.create`.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub study_subject: StudySubject,
}

impl RequestBody for CreateRequest {
    const OPERATION: &'static str = Operations::CREATE;

    fn write_body<W: Write>(&self, writer: &mut Writer<W>) -> OcwsResult<()> {
        self.study_subject.write_xml(writer, "v1:studySubject")
    }
}

/// `studySubject.isStudySubject`.
#[derive(Debug, Clone)]
pub struct IsStudySubjectRequest {
    pub study_subject: StudySubject,
}

impl RequestBody for IsStudySubjectRequest {
    const OPERATION: &'static str = Operations::IS_STUDY_SUBJECT;

    fn write_body<W: Write>(&self, writer: &mut Writer<W>) -> OcwsResult<()> {
        self.study_subject.write_xml(writer, "v1:studySubject")
    }
}

/// `event.schedule`.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub event: EventRecord,
}

impl RequestBody for ScheduleRequest {
    const OPERATION: &'static str = Operations::SCHEDULE;

    fn write_body<W: Write>(&self, writer: &mut Writer<W>) -> OcwsResult<()> {
        self.event.write_xml(writer, "v1:event")
    }
}

/// `data.import`: caller-supplied ODM written verbatim inside `<odm>`.
///
/// The WSDL declares no ODM type, so the payload is emitted as a raw
/// literal. It must be UTF-8 and must not be escaped.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub odm: String,
}

impl RequestBody for ImportRequest {
    const OPERATION: &'static str = Operations::IMPORT;

    fn write_body<W: Write>(&self, writer: &mut Writer<W>) -> OcwsResult<()> {
        write_start(writer, "odm")?;
        writer.write_event(Event::Text(BytesText::from_escaped(self.odm.as_str())))?;
        write_end(writer, "odm")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::beans::{BirthDate, Subject};

    fn render<R: RequestBody>(request: &R) -> String {
        let mut writer = Writer::new(Vec::new());
        request.write_body(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_import_payload_is_not_escaped() {
        let odm = r#"<ClinicalData StudyOID="S_1"><ItemData ItemOID="I_X" Value="a &amp; b"/></ClinicalData> & <"#;
        let xml = render(&ImportRequest { odm: odm.into() });
        assert_eq!(xml, format!("<odm>{odm}</odm>"));
    }

    #[test]
    fn test_list_all_has_empty_body() {
        assert_eq!(render(&ListAllRequest), "");
    }

    #[test]
    fn test_get_metadata_wraps_study_ref() {
        let xml = render(&GetMetadataRequest {
            study_ref: StudyRef::new("S_DEF", Some("SITE-1")),
        });
        assert!(xml.starts_with("<v1:studyMetadata><bean:studyRef>"));
        assert!(xml.contains("<bean:siteRef><bean:identifier>SITE-1</bean:identifier></bean:siteRef>"));
    }

    #[test]
    fn test_create_request_field_order() {
        let request = CreateRequest {
            study_subject: StudySubject {
                label: "SS-9".into(),
                secondary_label: Some("second".into()),
                enrollment_date: Some("2015-01-01".into()),
                subject: Some(Subject {
                    unique_identifier: None,
                    gender: "m".into(),
                    birth_date: BirthDate::from_input("1970"),
                }),
                study_ref: StudyRef::new("S_DEF", None),
            },
        };
        let xml = render(&request);
        let label = xml.find("<bean:label>").unwrap();
        let secondary = xml.find("<bean:secondaryLabel>").unwrap();
        let enrollment = xml.find("<bean:enrollmentDate>").unwrap();
        let subject = xml.find("<bean:subject>").unwrap();
        let study = xml.find("<bean:studyRef>").unwrap();
        assert!(label < secondary && secondary < enrollment);
        assert!(enrollment < subject && subject < study);
        assert!(xml.starts_with("<v1:studySubject>"));
    }

    #[test]
    fn test_is_study_subject_carries_only_label_and_study() {
        let xml = render(&IsStudySubjectRequest {
            study_subject: StudySubject::reference("SS-1", StudyRef::new("S_DEF", None)),
        });
        assert_eq!(
            xml,
            "<v1:studySubject><bean:label>SS-1</bean:label>\
             <bean:studyRef><bean:identifier>S_DEF</bean:identifier></bean:studyRef>\
             </v1:studySubject>"
        );
    }
}
