//! The GRD document model.
//!
//! Nodes live in an arena owned by [`GrdTree`] and are addressed by [`NodeId`].
//! Moving a node between parents only rewrites child lists, so handles held
//! across edits stay valid. Detached nodes keep their slot.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Stable handle to a node inside one [`GrdTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

/// An element with its attributes in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Element(Element),
    /// A run of character data, kept verbatim.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A parsed `.grd` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrdTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl GrdTree {
    /// Creates a tree holding a single root element.
    pub fn new(root_tag: &str) -> Self {
        let mut tree = GrdTree {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.new_element(root_tag);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Creates a detached element, ready to be attached with [`GrdTree::append_child`].
    pub fn new_element(&mut self, tag: &str) -> NodeId {
        self.element_with_attrs(tag, std::iter::empty::<(&str, &str)>())
    }

    /// Creates a detached element with the given attributes.
    pub fn element_with_attrs<K, V>(
        &mut self,
        tag: &str,
        attrs: impl IntoIterator<Item = (K, V)>,
    ) -> NodeId
    where
        K: Into<String>,
        V: Into<String>,
    {
        let element = Element {
            tag: tag.to_string(),
            attrs: attrs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        };
        self.push(NodeKind::Element(element))
    }

    /// Creates a detached text node.
    pub fn new_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id).kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, Error> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Ok(element),
            NodeKind::Text(_) => Err(Error::InvalidResource(format!(
                "node {} is text, not an element",
                id.0
            ))),
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, replacing an existing value in place or appending a new one.
    pub fn set_attr(&mut self, id: NodeId, key: &str, value: impl Into<String>) -> Result<(), Error> {
        let value = value.into();
        let element = self.element_mut(id)?;
        match element.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => element.attrs.push((key.to_string(), value)),
        }
        Ok(())
    }

    /// Removes an attribute and returns its previous value.
    pub fn remove_attr(&mut self, id: NodeId, key: &str) -> Result<Option<String>, Error> {
        let element = self.element_mut(id)?;
        let position = element.attrs.iter().position(|(k, _)| k == key);
        Ok(position.map(|i| element.attrs.remove(i).1))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Element children only; text runs are skipped.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.element(child).is_some())
    }

    /// The `n`th element child (zero-based), ignoring text runs.
    pub fn nth_element_child(&self, id: NodeId, n: usize) -> Option<NodeId> {
        self.element_children(id).nth(n)
    }

    /// Concatenated text of all descendant text runs.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.node(id).kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(_) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Attaches a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        if self.element(parent).is_none() {
            return Err(Error::InvalidResource(format!(
                "cannot attach to text node {}",
                parent.0
            )));
        }
        if child == self.root {
            return Err(Error::InvalidResource(
                "the root element cannot be attached".to_string(),
            ));
        }
        if let Some(current) = self.nodes[child.0].parent {
            return Err(Error::InvalidResource(format!(
                "node {} is already attached to node {}",
                child.0, current.0
            )));
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Detaches `child` from `parent`. The node keeps its subtree and can be re-attached.
    pub fn detach(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        let children = &mut self.nodes[parent.0].children;
        let position = children.iter().position(|&c| c == child).ok_or_else(|| {
            Error::InvalidResource(format!(
                "node {} is not a child of node {}",
                child.0, parent.0
            ))
        })?;
        children.remove(position);
        self.nodes[child.0].parent = None;
        Ok(())
    }
}
