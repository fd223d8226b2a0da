//! XML text to [`Document`]
//!
//! Namespaces are resolved while reading so every element records the URI
//! it belongs to; queries then compare local names within the root's
//! namespace and never need to know which prefix the producer chose.

use super::{Document, Element, Node, NodeId, NodeKind};
use crate::config::PmmlConfig;
use crate::error::{PmmlError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

/// Parse `source` into a document
pub(crate) fn parse_document(source: &str, config: PmmlConfig) -> Result<Document> {
    let mut reader = NsReader::from_str(source);
    reader.trim_text(true);

    let mut builder = TreeBuilder::default();
    loop {
        let position = reader.buffer_position();
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(start))) => {
                let namespace = resolve_namespace(ns, position)?;
                let id = builder.open_element(&start, namespace, position)?;
                builder.stack.push(id);
            }
            Ok((ns, Event::Empty(start))) => {
                let namespace = resolve_namespace(ns, position)?;
                builder.open_element(&start, namespace, position)?;
            }
            Ok((_, Event::End(_))) => {
                builder.stack.pop();
            }
            Ok((_, Event::Text(text))) => {
                let text = text.unescape().map_err(|e| parse_error(position, e))?;
                builder.push_text(&text);
            }
            Ok((_, Event::CData(data))) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                builder.push_text(&text);
            }
            Ok((_, Event::Eof)) => break,
            // Declarations, comments, processing instructions, doctype
            Ok(_) => {}
            Err(e) => return Err(parse_error(position, e)),
        }
    }

    builder.finish(config, reader.buffer_position())
}

fn parse_error(position: usize, err: impl std::fmt::Display) -> PmmlError {
    PmmlError::Parse {
        position,
        message: err.to_string(),
    }
}

fn resolve_namespace(ns: ResolveResult<'_>, position: usize) -> Result<Option<String>> {
    match ns {
        ResolveResult::Bound(namespace) => {
            Ok(Some(String::from_utf8_lossy(namespace.0).into_owned()))
        }
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(PmmlError::Parse {
            position,
            message: format!(
                "unknown namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            ),
        }),
    }
}

#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
}

impl TreeBuilder {
    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn open_element(
        &mut self,
        start: &BytesStart<'_>,
        namespace: Option<String>,
        position: usize,
    ) -> Result<NodeId> {
        let parent = self.stack.last().copied();
        if parent.is_none() && self.root.is_some() {
            return Err(PmmlError::Parse {
                position,
                message: "more than one root element".to_string(),
            });
        }

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| parse_error(position, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| parse_error(position, e))?
                .into_owned();
            attributes.push((key, value));
        }

        let element = Element {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            local_name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            namespace,
            attributes,
        };
        let id = self.push(NodeKind::Element(element), parent);
        if parent.is_none() {
            self.root = Some(id);
        }
        Ok(id)
    }

    fn push_text(&mut self, text: &str) {
        // Character data outside the root element is not part of the tree
        if let Some(&parent) = self.stack.last() {
            if !text.trim().is_empty() {
                self.push(NodeKind::Text(text.to_string()), Some(parent));
            }
        }
    }

    fn finish(self, config: PmmlConfig, position: usize) -> Result<Document> {
        if let Some(&open) = self.stack.last() {
            let name = match &self.nodes[open.0].kind {
                NodeKind::Element(el) => el.name.clone(),
                NodeKind::Text(_) => String::new(),
            };
            return Err(PmmlError::Parse {
                position,
                message: format!("unexpected end of document, <{}> is not closed", name),
            });
        }
        let root = self.root.ok_or_else(|| PmmlError::Parse {
            position,
            message: "document has no root element".to_string(),
        })?;
        let namespace = match &self.nodes[root.0].kind {
            NodeKind::Element(el) => el.namespace.clone(),
            NodeKind::Text(_) => None,
        };
        Ok(Document {
            nodes: self.nodes,
            root,
            namespace,
            config,
        })
    }
}
