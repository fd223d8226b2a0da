//! In-memory PMML document tree
//!
//! The document is an arena of nodes addressed by [`NodeId`]. Elements keep
//! their attributes in document order, their resolved namespace, and an
//! ordered child list; text nodes carry character data. Whitespace-only text
//! is dropped on parse and indentation is regenerated on write, so formatting
//! is cosmetic and never affects queries.
//!
//! Reading goes through the query layer in [`query`]; structural changes are
//! limited to the insertion primitives used by [`mutate`].

pub mod mutate;
pub mod parse;
pub mod query;
pub mod write;

use crate::config::PmmlConfig;
use crate::error::{PmmlError, Result};
use std::path::Path;

/// Handle to a node inside one [`Document`]
///
/// A `NodeId` is only meaningful for the document that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Element payload
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    local_name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
}

impl Element {
    /// Qualified name as written in the document (may carry a prefix)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without prefix
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Resolved namespace URI
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value of the attribute with the given name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A PMML document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    namespace: Option<String>,
    config: PmmlConfig,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document: a namespaced `PMML` root carrying the format version
    pub fn new() -> Self {
        Self::with_config(PmmlConfig::default())
    }

    /// Empty document built from the given configuration
    pub fn with_config(config: PmmlConfig) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            namespace: None,
            config,
        };
        doc.reset();
        doc
    }

    /// Parse a document from XML text
    pub fn parse(source: &str) -> Result<Self> {
        Self::parse_with_config(source, PmmlConfig::default())
    }

    /// Parse a document from XML text, keeping `config` for later exports
    pub fn parse_with_config(source: &str, config: PmmlConfig) -> Result<Self> {
        parse::parse_document(source, config)
    }

    /// Open and parse a document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut doc = Self::new();
        doc.read_file(path)?;
        Ok(doc)
    }

    /// Replace the contents of this document with the file at `path`
    ///
    /// On a parse failure the document is left reset (empty namespaced root)
    /// and the error is returned.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| PmmlError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        if !self.is_empty() {
            tracing::warn!(
                path = %path.display(),
                "document is not empty, its contents are discarded before reading"
            );
        }
        match parse::parse_document(&source, self.config.clone()) {
            Ok(parsed) => {
                *self = parsed;
                tracing::debug!(path = %path.display(), nodes = self.nodes.len(), "document read");
                Ok(())
            }
            Err(err) => {
                self.reset();
                Err(err)
            }
        }
    }

    /// Serialize into `sink`
    pub fn write_to<W: std::io::Write>(&self, sink: W) -> Result<()> {
        write::write_document(self, sink)
    }

    /// Serialize into a string
    pub fn to_xml_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).map_err(|e| PmmlError::Xml(e.to_string()))
    }

    /// Serialize into the file at `path`
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| PmmlError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_to(std::io::BufWriter::new(file))
    }

    /// Drop all content and recreate the empty namespaced root
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.namespace = Some(self.config.namespace.clone());
        let root = Element {
            name: "PMML".to_string(),
            local_name: "PMML".to_string(),
            namespace: self.namespace.clone(),
            attributes: vec![
                ("version".to_string(), self.config.format_version.clone()),
                ("xmlns".to_string(), self.config.namespace.clone()),
            ],
        };
        self.root = self.push_node(NodeKind::Element(root), None);
    }

    pub fn config(&self) -> &PmmlConfig {
        &self.config
    }

    /// The `PMML` root element
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Default namespace of the document (namespace of the root element)
    pub fn default_namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// True when the root has no element children
    pub fn is_empty(&self) -> bool {
        self.child_elements(self.root).next().is_none()
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    /// Character data of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// All children (elements and text) in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element children in document order
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| self.element(c).is_some())
    }

    /// Value of attribute `name` on element `id`
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attribute(name)
    }

    /// Concatenated character data of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.nodes.get(id.0).map(|n| &n.kind) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(NodeKind::Element(_)) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    /// True when `id` is an element with local name `tag` in the default namespace
    pub fn has_tag(&self, id: NodeId, tag: &str) -> bool {
        self.element(id).is_some_and(|el| {
            el.local_name == tag && el.namespace.as_deref() == self.namespace.as_deref()
        })
    }

    // =========================================================================
    // Construction primitives
    // =========================================================================

    fn push_node(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element in the default namespace
    ///
    /// When the root is written with a prefix the new element reuses it so
    /// that it stays in the document namespace after a write/read cycle.
    pub(crate) fn create_element(&mut self, local_name: &str) -> NodeId {
        let prefix = self
            .element(self.root)
            .and_then(|root| root.name.split_once(':'))
            .map(|(prefix, _)| prefix.to_string());
        let name = match prefix {
            Some(prefix) => format!("{}:{}", prefix, local_name),
            None => local_name.to_string(),
        };
        let element = Element {
            name,
            local_name: local_name.to_string(),
            namespace: self.namespace.clone(),
            attributes: Vec::new(),
        };
        self.push_node(NodeKind::Element(element), None)
    }

    /// Append `child` as the last child of `parent`
    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child);
    }

    /// Insert `child` at position `index` among the children of `parent`
    pub(crate) fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent.0) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = Some(parent);
        }
    }

    /// Set (or overwrite in place) an attribute on an element
    pub(crate) fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(Node {
            kind: NodeKind::Element(el),
            ..
        }) = self.nodes.get_mut(id.0)
        {
            match el.attributes.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value,
                None => el.attributes.push((name.to_string(), value)),
            }
        }
    }

    /// Position of `child` among its parent's children
    pub(crate) fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_has_namespaced_root() {
        let doc = Document::new();
        let root = doc.element(doc.root()).unwrap();
        assert_eq!(root.local_name(), "PMML");
        assert_eq!(root.attribute("version"), Some("3.0"));
        assert_eq!(doc.default_namespace(), Some(crate::config::DEFAULT_NAMESPACE));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_insertion_primitives() {
        let mut doc = Document::new();
        let root = doc.root();
        let b = doc.create_element("B");
        doc.append_child(root, b);
        let a = doc.create_element("A");
        doc.insert_child(root, 0, a);
        doc.set_attribute(a, "k", "1");
        doc.set_attribute(a, "k", "2");

        let names: Vec<_> = doc
            .child_elements(root)
            .map(|id| doc.element(id).unwrap().local_name().to_string())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(doc.get_attribute(a, "k"), Some("2"));
        assert_eq!(doc.parent(a), Some(root));
        assert_eq!(doc.child_index(root, b), Some(1));
        assert!(doc.has_tag(a, "A"));
    }

    #[test]
    fn test_reset_discards_content() {
        let mut doc = Document::new();
        let root = doc.root();
        let child = doc.create_element("Header");
        doc.append_child(root, child);
        assert!(!doc.is_empty());
        doc.reset();
        assert!(doc.is_empty());
    }
}
