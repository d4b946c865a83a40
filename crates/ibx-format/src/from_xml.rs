//! Parse XML text into element trees and IBX1 documents.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::xml::PROPERTY_TAG;
use crate::{BuildOptions, Document, Element, Error, PropertyEntry, Result, ValueKind, MAX_DEPTH};

impl Element {
    /// Parse XML text into an element tree.
    ///
    /// `<property name=".." type=".." value=".."/>` elements become
    /// properties of the enclosing element; every other element becomes a
    /// child. Text, comments and declarations are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use ibx_format::{Element, ValueKind};
    ///
    /// let xml = r#"<?xml version="1.0"?>
    /// <Root>
    ///   <property name="Root" type="bool" value="true"/>
    /// </Root>"#;
    ///
    /// let root = Element::from_xml(xml)?;
    /// assert_eq!(root, Element::new("Root").property("Root", ValueKind::Bool, "true"));
    /// # Ok::<(), ibx_format::Error>(())
    /// ```
    pub fn from_xml(xml: &str) -> Result<Self> {
        parse_xml_to_element(xml)
    }

    /// Parse XML bytes into an element tree.
    pub fn from_xml_bytes(xml: &[u8]) -> Result<Self> {
        let xml_str = std::str::from_utf8(xml).map_err(Error::Utf8)?;
        Self::from_xml(xml_str)
    }
}

impl Document {
    /// Parse XML text and build an IBX1 document from it.
    pub fn from_xml(xml: &str, options: &BuildOptions) -> Result<Self> {
        Self::from_element(&Element::from_xml(xml)?, options)
    }
}

/// An open XML element.
enum Frame {
    Element(Element),
    Property(PropertyEntry),
}

fn parse_xml_to_element(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let frame = open(&e, &stack)?;
                stack.push(frame);
            }
            Ok(Event::Empty(e)) => {
                let frame = open(&e, &stack)?;
                close(frame, &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                if let Some(frame) = stack.pop() {
                    close(frame, &mut stack, &mut root)?;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // text, comments, declarations
            Err(e) => return Err(Error::Xml(format!("XML parse error: {}", e))),
        }
    }

    if !stack.is_empty() {
        return Err(Error::Xml("unexpected end of input inside an element".to_string()));
    }

    root.ok_or(Error::NoRootElement)
}

fn open(start: &BytesStart<'_>, stack: &[Frame]) -> Result<Frame> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_string();

    if let Some(Frame::Property(property)) = stack.last() {
        return Err(Error::Xml(format!(
            "element <{}> inside property {:?}",
            name, property.name
        )));
    }

    if name == PROPERTY_TAG {
        if stack.is_empty() {
            return Err(Error::Xml("property outside of any element".to_string()));
        }
        return read_property(start).map(Frame::Property);
    }

    if start.attributes().next().is_some() {
        return Err(Error::UnsupportedAttributes { element: name });
    }

    // every open frame is an element here, so the stack length is the parent's depth
    if stack.len() >= MAX_DEPTH {
        return Err(Error::NestingTooDeep { max: MAX_DEPTH });
    }

    Ok(Frame::Element(Element::new(name)))
}

fn close(frame: Frame, stack: &mut [Frame], root: &mut Option<Element>) -> Result<()> {
    match (frame, stack.last_mut()) {
        (Frame::Property(property), Some(Frame::Element(parent))) => {
            parent.properties.push(property);
        }
        (Frame::Element(element), Some(Frame::Element(parent))) => {
            parent.children.push(element);
        }
        (Frame::Element(element), None) => {
            if root.is_some() {
                return Err(Error::Xml(format!(
                    "second root element <{}>",
                    element.name
                )));
            }
            *root = Some(element);
        }
        // `open` never places a frame under a property or a property at the top
        (_, _) => return Err(Error::Xml("misplaced element".to_string())),
    }
    Ok(())
}

fn read_property(start: &BytesStart<'_>) -> Result<PropertyEntry> {
    let mut name = None;
    let mut kind = None;
    let mut value = String::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let text = attr
            .unescape_value()
            .map_err(|e| Error::Xml(e.to_string()))?
            .into_owned();

        match attr.key.as_ref() {
            b"name" => name = Some(text),
            b"type" => kind = Some(text.parse::<ValueKind>()?),
            b"value" => value = text,
            other => log::debug!(
                "ignoring attribute {:?} on property",
                String::from_utf8_lossy(other)
            ),
        }
    }

    let name = name.ok_or_else(|| Error::Xml("property without a name attribute".to_string()))?;
    let kind = kind.ok_or_else(|| Error::Xml(format!("property {:?} without a type attribute", name)))?;

    Ok(PropertyEntry { name, kind, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderOptions;

    #[test]
    fn test_from_xml_simple() {
        let xml = r#"<Root><property name="Root" type="bool" value="true"/></Root>"#;
        let document = Document::from_xml(xml, &BuildOptions::default()).unwrap();
        assert_eq!(
            document.encode().unwrap(),
            vec![
                0x49, 0x42, 0x58, 0x31, 0x01, 0x04, 0x52, 0x6f, 0x6f, 0x74, 0x00, 0x01, 0x41,
                0x01, 0x00, 0x00, 0x01, 0x00, 0x80, 0x00,
            ]
        );
    }

    #[test]
    fn test_from_xml_nested() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- exported -->
<A>
  <property name="x" type="int" value="-4"/>
  <B>
    <C/>
    <property name="label" type="string" value="a &amp; b"/>
  </B>
  <E></E>
</A>"#;

        let root = Element::from_xml(xml).unwrap();
        let expected = Element::new("A")
            .property("x", ValueKind::Int32, "-4")
            .child(
                Element::new("B")
                    .property("label", ValueKind::String, "a & b")
                    .child(Element::new("C")),
            )
            .child(Element::new("E"));
        assert_eq!(root, expected);
    }

    #[test]
    fn test_missing_value_is_empty() {
        let root = Element::from_xml(r#"<R><property name="s" type="string"/></R>"#).unwrap();
        assert_eq!(root.properties[0].value, "");
    }

    #[test]
    fn test_property_requires_name_and_type() {
        assert!(matches!(
            Element::from_xml(r#"<R><property type="bool" value="true"/></R>"#),
            Err(Error::Xml(_))
        ));
        assert!(matches!(
            Element::from_xml(r#"<R><property name="b" value="true"/></R>"#),
            Err(Error::Xml(_))
        ));
        assert!(matches!(
            Element::from_xml(r#"<R><property name="b" type="double" value="1"/></R>"#),
            Err(Error::UnknownValueKind(kind)) if kind == "double"
        ));
    }

    #[test]
    fn test_element_attributes_unsupported() {
        match Element::from_xml(r#"<Root><Material Name="x"/></Root>"#) {
            Err(Error::UnsupportedAttributes { element }) => assert_eq!(element, "Material"),
            other => panic!("expected UnsupportedAttributes, got {:?}", other),
        }
    }

    #[test]
    fn test_no_root_element() {
        for xml in ["", "<!-- nothing -->", "just some text", "<?xml version=\"1.0\"?>"] {
            assert!(
                matches!(Element::from_xml(xml), Err(Error::NoRootElement)),
                "{:?} should have no root",
                xml
            );
        }
    }

    #[test]
    fn test_structural_errors() {
        for xml in [
            r#"<property name="a" type="bool" value="true"/>"#,
            "<A/><B/>",
            r#"<A><property name="a" type="bool" value="true"><B/></property></A>"#,
            "<A><B></A>",
        ] {
            assert!(Element::from_xml(xml).is_err(), "{:?} should fail", xml);
        }
    }

    #[test]
    fn test_invalid_value_text() {
        let xml = r#"<R><property name="n" type="uint8" value="300"/></R>"#;
        assert!(matches!(
            Document::from_xml(xml, &BuildOptions::default()),
            Err(Error::ValueParse { kind: ValueKind::UInt8, .. })
        ));
    }

    #[test]
    fn test_xml_round_trip() {
        let original = Element::new("Config")
            .property("version", ValueKind::Int16, "2")
            .property("name", ValueKind::String, "test <1>")
            .child(Element::new("Setting").property("enabled", ValueKind::Bool, "false"))
            .child(Element::new("Setting").property("scale", ValueKind::Float, "0.25"));

        let document = Document::from_element(&original, &BuildOptions::default()).unwrap();
        let decoded = Document::parse(&document.encode().unwrap()).unwrap();
        let xml = decoded.to_xml_string(&RenderOptions::default()).unwrap();

        let reparsed = Document::from_xml(&xml, &BuildOptions::default()).unwrap();
        assert_eq!(reparsed.encode().unwrap(), document.encode().unwrap());
        assert_eq!(Element::from_xml(&xml).unwrap(), original);
    }

    #[test]
    fn test_nesting_limit() {
        let xml = |depth: usize| format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));

        let root = Element::from_xml(&xml(MAX_DEPTH)).unwrap();
        assert_eq!(root.count(), MAX_DEPTH);

        assert!(matches!(
            Element::from_xml(&xml(MAX_DEPTH + 1)),
            Err(Error::NestingTooDeep { max: MAX_DEPTH })
        ));
        // far past the limit the parse still fails cleanly
        assert!(matches!(
            Element::from_xml(&xml(200_000)),
            Err(Error::NestingTooDeep { max: MAX_DEPTH })
        ));
        assert!(matches!(
            Element::from_xml(&format!("{}<b/>{}", "<a>".repeat(MAX_DEPTH), "</a>".repeat(MAX_DEPTH))),
            Err(Error::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn test_from_xml_bytes_rejects_invalid_utf8() {
        assert!(matches!(Element::from_xml_bytes(b"<A>\xff</A>"), Err(Error::Utf8(_))));
    }
}
