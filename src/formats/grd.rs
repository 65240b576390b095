use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::io::{BufRead, Write};

use crate::{
    error::Error,
    traits::Parser,
    types::{GrdTree, NodeId, NodeKind},
};

const INDENT: &str = "  ";

impl Parser for GrdTree {
    /// Parse a GRD document. Indentation between elements is dropped, other
    /// text is kept verbatim; comments, processing instructions and the
    /// doctype are skipped.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = Reader::from_reader(reader);

        let mut buf = Vec::new();
        let mut tree: Option<GrdTree> = None;
        let mut stack: Vec<NodeId> = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let id = open_element(&mut tree, &stack, e)?;
                    stack.push(id);
                }
                Ok(Event::Empty(ref e)) => {
                    open_element(&mut tree, &stack, e)?;
                }
                Ok(Event::End(_)) => {
                    let id = stack.pop().ok_or_else(|| {
                        Error::InvalidResource("closing tag without an open element".to_string())
                    })?;
                    if let Some(tree) = tree.as_mut() {
                        prune_layout_text(tree, id)?;
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(Error::XmlParse)?;
                    push_text(&mut tree, &stack, &text)?;
                }
                Ok(Event::CData(e)) => {
                    let raw = e.into_inner();
                    push_text(&mut tree, &stack, &String::from_utf8_lossy(&raw))?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::XmlParse(e)),
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(Error::InvalidResource(
                "unexpected end of document inside an element".to_string(),
            ));
        }
        tree.ok_or_else(|| Error::InvalidResource("document has no root element".to_string()))
    }

    /// Write the document with an XML declaration. Element-only content is
    /// indented; elements holding text are written inline so their text is
    /// emitted unchanged.
    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut xml_writer = Writer::new(&mut writer);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        write_node(&mut xml_writer, self, self.root(), 0)?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        Ok(())
    }
}

fn open_element(
    tree: &mut Option<GrdTree>,
    stack: &[NodeId],
    e: &BytesStart,
) -> Result<NodeId, Error> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();

    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::InvalidResource(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }

    match (tree.as_mut(), stack.last()) {
        (None, _) => {
            let mut new_tree = GrdTree::new(&tag);
            let root = new_tree.root();
            for (key, value) in attrs {
                new_tree.set_attr(root, &key, value)?;
            }
            *tree = Some(new_tree);
            Ok(root)
        }
        (Some(tree), Some(&parent)) => {
            let id = tree.element_with_attrs(&tag, attrs);
            tree.append_child(parent, id)?;
            Ok(id)
        }
        (Some(_), None) => Err(Error::InvalidResource(format!(
            "second root element <{}>",
            tag
        ))),
    }
}

fn push_text(tree: &mut Option<GrdTree>, stack: &[NodeId], text: &str) -> Result<(), Error> {
    if text.is_empty() {
        return Ok(());
    }
    if let (Some(tree), Some(&parent)) = (tree.as_mut(), stack.last()) {
        let id = tree.new_text(text);
        tree.append_child(parent, id)?;
    }
    Ok(())
}

/// Drops indentation runs from a closed element: whitespace-only text that
/// spans a line break, when the element holds no other text. Inline
/// whitespace such as the space between two `<ph>` placeholders is kept.
fn prune_layout_text(tree: &mut GrdTree, id: NodeId) -> Result<(), Error> {
    let children = tree.children(id);
    let has_text = children
        .iter()
        .filter_map(|&child| tree.text(child))
        .any(|text| !text.trim().is_empty());
    if has_text {
        return Ok(());
    }

    let layout: Vec<NodeId> = children
        .iter()
        .copied()
        .filter(|&child| tree.text(child).is_some_and(|text| text.contains('\n')))
        .collect();
    for child in layout {
        tree.detach(id, child)?;
    }
    Ok(())
}

fn write_node<W: Write>(
    xml_writer: &mut Writer<W>,
    tree: &GrdTree,
    id: NodeId,
    depth: usize,
) -> Result<(), Error> {
    let element = match &tree.node(id).kind {
        NodeKind::Text(text) => {
            xml_writer.write_event(Event::Text(BytesText::new(text)))?;
            return Ok(());
        }
        NodeKind::Element(element) => element,
    };

    let mut start = BytesStart::new(element.tag.as_str());
    for (key, value) in &element.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let children = tree.children(id);
    if children.is_empty() {
        xml_writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    xml_writer.write_event(Event::Start(start))?;
    let inline = children.iter().any(|&child| tree.text(child).is_some());
    for &child in children {
        if !inline {
            write_indent(xml_writer, depth + 1)?;
        }
        write_node(xml_writer, tree, child, depth + 1)?;
    }
    if !inline {
        write_indent(xml_writer, depth)?;
    }
    xml_writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
    Ok(())
}

fn write_indent<W: Write>(xml_writer: &mut Writer<W>, depth: usize) -> Result<(), Error> {
    let indent = format!("\n{}", INDENT.repeat(depth));
    xml_writer.write_event(Event::Text(BytesText::new(&indent)))?;
    Ok(())
}
