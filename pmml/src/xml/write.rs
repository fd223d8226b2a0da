//! [`Document`] to XML text

use super::{Document, NodeId, NodeKind};
use crate::error::{PmmlError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// Serialize `doc` into `sink`, indenting per the document configuration
pub(crate) fn write_document<W: Write>(doc: &Document, sink: W) -> Result<()> {
    let indent = doc.config().indent;
    let mut writer = if indent > 0 {
        Writer::new_with_indent(sink, b' ', indent)
    } else {
        Writer::new(sink)
    };

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_node(&mut writer, doc, doc.root())?;

    let sink = writer.get_mut();
    sink.write_all(b"\n").map_err(|e| PmmlError::Xml(e.to_string()))?;
    sink.flush().map_err(|e| PmmlError::Xml(e.to_string()))?;
    Ok(())
}

fn write_node<W: Write>(writer: &mut Writer<W>, doc: &Document, id: NodeId) -> Result<()> {
    let Some(node) = doc.nodes.get(id.0) else {
        return Ok(());
    };
    match &node.kind {
        NodeKind::Text(text) => {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        NodeKind::Element(el) => {
            let mut start = BytesStart::new(el.name.as_str());
            for (key, value) in &el.attributes {
                start.push_attribute((key.as_str(), value.as_str()));
            }
            if node.children.is_empty() {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                for &child in &node.children {
                    write_node(writer, doc, child)?;
                }
                writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_serializes_root() {
        let xml = Document::new().to_xml_string().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(r#"<PMML version="3.0" xmlns="http://www.dmg.org/PMML-3_0"/>"#));
    }

    #[test]
    fn test_write_then_parse_preserves_structure() {
        let source = r#"<PMML xmlns="urn:x"><A k="a &lt; b"><B>text</B></A><C/></PMML>"#;
        let doc = Document::parse(source).unwrap();
        let xml = doc.to_xml_string().unwrap();
        let again = Document::parse(&xml).unwrap();

        let a = again.child_elements(again.root()).next().unwrap();
        assert_eq!(again.get_attribute(a, "k"), Some("a < b"));
        assert_eq!(again.text_content(a), "text");
        assert_eq!(again.default_namespace(), Some("urn:x"));
        assert_eq!(again.child_elements(again.root()).count(), 2);
    }

    #[test]
    fn test_indentation_follows_config() {
        let mut doc = Document::new();
        let root = doc.root();
        let header = doc.create_element("Header");
        doc.append_child(root, header);
        let xml = doc.to_xml_string().unwrap();
        assert!(xml.contains("\n  <Header/>"));
    }
}
