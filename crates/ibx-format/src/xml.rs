//! XML output for element trees and documents.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::{Document, Element, Error, RenderOptions, Result};

/// Tag used for property elements.
pub(crate) const PROPERTY_TAG: &str = "property";

impl Element {
    /// Convert to XML string.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut output = Vec::new();
        self.write_xml(&mut output)?;
        String::from_utf8(output).map_err(|e| Error::Xml(e.to_string()))
    }

    /// Write XML to a writer.
    ///
    /// Each property becomes a `<property name type value/>` element, written
    /// before any child elements. Elements are indented by two spaces.
    pub fn write_xml<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut xml_writer = Writer::new_with_indent(writer, b' ', 2);

        xml_writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| Error::Xml(e.to_string()))?;

        write_element(&mut xml_writer, self)
    }
}

impl Document {
    /// Render the document as XML.
    pub fn to_xml_string(&self, options: &RenderOptions) -> Result<String> {
        self.to_element(options)?.to_xml_string()
    }

    /// Render the document as XML into a writer.
    pub fn write_xml<W: Write>(&self, writer: &mut W, options: &RenderOptions) -> Result<()> {
        self.to_element(options)?.write_xml(writer)
    }
}

/// Reject names that would not read back as the same element.
fn check_element_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == ':');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'));

    if !valid_start || !valid_rest {
        return Err(Error::Xml(format!("{:?} is not a valid element name", name)));
    }
    if name == PROPERTY_TAG {
        return Err(Error::Xml(format!(
            "element name {:?} is reserved for properties",
            name
        )));
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    check_element_name(&element.name)?;
    let start = BytesStart::new(element.name.as_str());

    if element.properties.is_empty() && element.children.is_empty() {
        writer
            .write_event(Event::Empty(start))
            .map_err(|e| Error::Xml(e.to_string()))?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::Xml(e.to_string()))?;

    for property in &element.properties {
        let mut elem = BytesStart::new(PROPERTY_TAG);
        elem.push_attribute(("name", property.name.as_str()));
        elem.push_attribute(("type", property.kind.as_str()));
        elem.push_attribute(("value", property.value.as_str()));
        writer
            .write_event(Event::Empty(elem))
            .map_err(|e| Error::Xml(e.to_string()))?;
    }

    for child in &element.children {
        write_element(writer, child)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| Error::Xml(e.to_string()))?;

    Ok(())
}
