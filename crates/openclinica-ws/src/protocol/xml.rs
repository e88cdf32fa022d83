//! Owned, namespace-resolved XML element tree.
//!
//! Responses are small, so they are read once into an [`XmlElement`] tree
//! and navigated from there, much like the object graph a dynamic SOAP
//! toolkit would hand back. Uses quick-xml, which never expands external
//! entities.

use std::io::Write;

use quick_xml::NsReader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use serde::Serialize;

use crate::error::{OcwsError, OcwsResult};

/// An XML element with its resolved namespace, attributes, text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XmlElement {
    /// Namespace URI the element name resolved to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Local name (prefix stripped).
    pub name: String,
    /// Attributes in document order, keyed by their qualified name.
    /// Namespace declarations are not included.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    /// Unescaped text and CDATA content. Each text or CDATA segment is
    /// trimmed, and successive segments (for example text on either side of
    /// a child element) are joined with a single space.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a complete document and return its root element.
    pub fn parse(xml: &str) -> OcwsResult<Self> {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut open: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let (ns, event) = reader.read_resolved_event()?;
            match event {
                Event::Start(e) => {
                    open.push(Self::from_start(ns, &e)?);
                }
                Event::Empty(e) => {
                    let element = Self::from_start(ns, &e)?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| OcwsError::XmlParse("unexpected closing tag".into()))?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::Text(t) => {
                    if let Some(current) = open.last_mut() {
                        current.push_text(&t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if let Some(current) = open.last_mut() {
                        current.push_text(std::str::from_utf8(&c)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(OcwsError::XmlParse(format!(
                "element '{}' is never closed",
                unclosed.name
            )));
        }
        root.ok_or_else(|| OcwsError::XmlParse("document has no root element".into()))
    }

    /// Parse raw reply bytes, which must be UTF-8.
    pub fn parse_bytes(xml: &[u8]) -> OcwsResult<Self> {
        Self::parse(std::str::from_utf8(xml)?)
    }

    fn from_start(ns: ResolveResult<'_>, start: &BytesStart<'_>) -> OcwsResult<Self> {
        let namespace = match ns {
            ResolveResult::Bound(Namespace(uri)) => Some(std::str::from_utf8(uri)?.to_string()),
            ResolveResult::Unbound => None,
            ResolveResult::Unknown(prefix) => {
                return Err(OcwsError::XmlParse(format!(
                    "undeclared namespace prefix '{}'",
                    String::from_utf8_lossy(&prefix)
                )));
            }
        };
        let name = std::str::from_utf8(start.local_name().as_ref())?.to_string();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            attributes.push((key.to_string(), attr.unescape_value()?.into_owned()));
        }

        Ok(Self {
            namespace,
            name,
            attributes,
            ..Self::default()
        })
    }

    fn push_text(&mut self, segment: &str) {
        if segment.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(segment);
    }

    /// `true` if this element has the given namespace and local name.
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// First direct child with the given local name, in any namespace.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given local name, in any namespace.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first direct child with the given local name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Value of an attribute, matched on its qualified or local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name || key.rsplit(':').next() == Some(name))
            .map(|(_, value)| value.as_str())
    }

    /// All descendants in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// First descendant with the given namespace and local name.
    pub fn find(&self, namespace: &str, name: &str) -> Option<&XmlElement> {
        self.descendants().find(|e| e.is(namespace, name))
    }

    /// Every descendant with the given namespace and local name.
    pub fn find_all<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.descendants().filter(move |e| e.is(namespace, name))
    }

    /// Text of the first descendant with the given namespace and local name,
    /// or [`OcwsError::MissingElement`].
    pub fn require_text(&self, namespace: &str, name: &str) -> OcwsResult<&str> {
        self.find(namespace, name)
            .map(|e| e.text.as_str())
            .ok_or_else(|| OcwsError::missing(name))
    }
}

/// Depth-first, document-order iterator over an element's descendants.
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

fn attach(
    open: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> OcwsResult<()> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(OcwsError::XmlParse("document has more than one root element".into()));
    }
    *root = Some(element);
    Ok(())
}

// ─── Writing helpers ────────────────────────────────────────────────────

/// Write `<name>text</name>`, escaping `text`.
pub(crate) fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> OcwsResult<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Write `<name>text</name>` only when `text` is present.
pub(crate) fn write_optional_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: Option<&str>,
) -> OcwsResult<()> {
    match text {
        Some(text) => write_text_element(writer, name, text),
        None => Ok(()),
    }
}

pub(crate) fn write_start<W: Write>(writer: &mut Writer<W>, name: &str) -> OcwsResult<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

pub(crate) fn write_end<W: Write>(writer: &mut Writer<W>, name: &str) -> OcwsResult<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ODM xmlns="http://www.cdisc.org/ns/odm/v1.3" xmlns:OpenClinica="http://www.openclinica.org/ns/odm_ext_v130/v3.1">
  <Study OID="S_DEFAULTS1">
    <MetaDataVersion OID="v1.0.0" Name="MetaDataVersion_v1.0.0">
      <ItemDef OID="I_AGE" Name="AGE" DataType="integer"/>
      <ItemDef OID="I_SEX" Name="SEX &amp; GENDER" DataType="text">
        <Question><TranslatedText>Sex?</TranslatedText></Question>
      </ItemDef>
      <OpenClinica:ItemDetails ItemOID="I_AGE"/>
    </MetaDataVersion>
  </Study>
</ODM>"#;

    #[test]
    fn test_parse_namespaces_and_attributes() {
        let root = XmlElement::parse(SAMPLE).unwrap();
        assert!(root.is("http://www.cdisc.org/ns/odm/v1.3", "ODM"));

        let items: Vec<_> = root
            .find_all("http://www.cdisc.org/ns/odm/v1.3", "ItemDef")
            .map(|e| e.attribute("OID").unwrap())
            .collect();
        assert_eq!(items, vec!["I_AGE", "I_SEX"]);

        let sex = root
            .find_all("http://www.cdisc.org/ns/odm/v1.3", "ItemDef")
            .nth(1)
            .unwrap();
        assert_eq!(sex.attribute("Name"), Some("SEX & GENDER"));

        let ext = root
            .find("http://www.openclinica.org/ns/odm_ext_v130/v3.1", "ItemDetails")
            .unwrap();
        assert_eq!(ext.attribute("ItemOID"), Some("I_AGE"));
    }

    #[test]
    fn test_text_is_unescaped_and_cdata_kept_verbatim() {
        let root = XmlElement::parse(
            "<r><a>&lt;ODM/&gt; &amp; more</a><b><![CDATA[<x>&amp;</x>]]></b></r>",
        )
        .unwrap();
        assert_eq!(root.child_text("a"), Some("<ODM/> & more"));
        assert_eq!(root.child_text("b"), Some("<x>&amp;</x>"));
        assert!(root.namespace.is_none());
    }

    #[test]
    fn test_mixed_content_keeps_word_boundaries() {
        let root =
            XmlElement::parse("<faultstring>Invalid <b>x</b> value</faultstring>").unwrap();
        assert_eq!(root.text, "Invalid value");
        assert_eq!(root.child_text("b"), Some("x"));
    }

    #[test]
    fn test_descendants_in_document_order() {
        let root = XmlElement::parse("<a><b><c/></b><d/></a>").unwrap();
        let names: Vec<_> = root.descendants().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_require_text_missing() {
        let root = XmlElement::parse(r#"<r xmlns="urn:x"><result>Success</result></r>"#).unwrap();
        assert_eq!(root.require_text("urn:x", "result").unwrap(), "Success");
        let err = root.require_text("urn:x", "subjectOID").unwrap_err();
        assert!(matches!(err, OcwsError::MissingElement { .. }));
        // Same local name in another namespace does not match.
        assert!(root.require_text("urn:y", "result").is_err());
    }

    #[test]
    fn test_malformed_documents_fail() {
        assert!(matches!(
            XmlElement::parse("<a><b></a>"),
            Err(OcwsError::XmlParse(_))
        ));
        assert!(matches!(
            XmlElement::parse("<a>"),
            Err(OcwsError::XmlParse(_))
        ));
        assert!(matches!(
            XmlElement::parse("   "),
            Err(OcwsError::XmlParse(_))
        ));
        assert!(matches!(
            XmlElement::parse("<p:a/>"),
            Err(OcwsError::XmlParse(_))
        ));
        assert!(matches!(
            XmlElement::parse_bytes(&[0x3c, 0x61, 0xff, 0x3e]),
            Err(OcwsError::XmlParse(_))
        ));
    }

    #[test]
    fn test_write_optional_element() {
        let mut writer = Writer::new(Vec::new());
        write_optional_element(&mut writer, "bean:secondaryLabel", None).unwrap();
        write_optional_element(&mut writer, "bean:label", Some("A&B")).unwrap();
        let xml = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(xml, "<bean:label>A&amp;B</bean:label>");
    }
}
