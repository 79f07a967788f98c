use std::path::Path;

use quick_xml::{
    Reader, Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
    document::node::{NodeId, NodeKind},
    document::tree::Document,
    foundation::error::{EditError, EditResult},
};

impl Document {
    /// Parse a document from XML text.
    ///
    /// Whitespace-only character data between tags is dropped; comments, processing
    /// instructions and the XML declaration are not kept.
    pub fn from_xml_str(xml: &str) -> EditResult<Self> {
        let mut reader = Reader::from_str(xml);

        let mut doc: Option<Document> = None;
        let mut stack: Vec<NodeId> = Vec::new();
        // Character data is split around entity references, so collect it until the next tag.
        let mut pending = String::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                EditError::xml(format!(
                    "parse error at byte {}: {e}",
                    reader.error_position()
                ))
            })?;
            match event {
                Event::Start(start) => {
                    flush_text(&mut doc, &stack, &mut pending);
                    let node = open_element(&mut doc, &stack, &start, &reader)?;
                    stack.push(node);
                }
                Event::Empty(start) => {
                    flush_text(&mut doc, &stack, &mut pending);
                    open_element(&mut doc, &stack, &start, &reader)?;
                }
                Event::End(_) => {
                    flush_text(&mut doc, &stack, &mut pending);
                    stack.pop();
                }
                Event::Text(text) => {
                    let s = std::str::from_utf8(&text)
                        .map_err(|e| EditError::xml(format!("text is not UTF-8: {e}")))?;
                    pending.push_str(s);
                }
                Event::CData(data) => {
                    let s = std::str::from_utf8(&data)
                        .map_err(|e| EditError::xml(format!("cdata is not UTF-8: {e}")))?;
                    pending.push_str(s);
                }
                Event::GeneralRef(r) => {
                    let resolved = match r
                        .resolve_char_ref()
                        .map_err(|e| EditError::xml(format!("character reference: {e}")))?
                    {
                        Some(ch) => ch.to_string(),
                        None => {
                            let name = std::str::from_utf8(&r).map_err(|e| {
                                EditError::xml(format!("entity name is not UTF-8: {e}"))
                            })?;
                            quick_xml::escape::resolve_predefined_entity(name)
                                .ok_or_else(|| {
                                    EditError::xml(format!("unknown entity '&{name};'"))
                                })?
                                .to_string()
                        }
                    };
                    pending.push_str(&resolved);
                }
                Event::Eof => {
                    flush_text(&mut doc, &stack, &mut pending);
                    break;
                }
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(EditError::xml("unexpected end of input inside an element"));
        }
        doc.ok_or_else(|| EditError::xml("document has no root element"))
    }

    /// Read and parse a document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> EditResult<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)
            .map_err(|e| EditError::persistence(path, e))?;
        Self::from_xml_str(&xml)
    }

    /// Serialize the whole document body (no XML declaration).
    pub fn to_xml_string(&self) -> EditResult<String> {
        self.subtree_to_xml(self.root())
    }

    /// Serialize the subtree rooted at `node`.
    pub fn subtree_to_xml(&self, node: NodeId) -> EditResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_node(&mut writer, node)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| EditError::xml(format!("serialized output is not UTF-8: {e}")))
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, node: NodeId) -> EditResult<()> {
        let n = self.node(node);
        let tag = n.kind().tag();
        let start = BytesStart::new(tag).with_attributes(n.attrs());
        let write_err = write_error(tag);

        if n.children().is_empty() && n.text().is_none() {
            return writer.write_event(Event::Empty(start)).map_err(&write_err);
        }

        writer.write_event(Event::Start(start)).map_err(&write_err)?;
        if let Some(text) = n.text() {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(&write_err)?;
        }
        for child in n.children() {
            self.write_node(writer, *child)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(&write_err)
    }
}

fn open_element(
    doc: &mut Option<Document>,
    stack: &[NodeId],
    start: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
) -> EditResult<NodeId> {
    let name = start.name();
    let tag = std::str::from_utf8(name.as_ref())
        .map_err(|e| EditError::xml(format!("element name is not UTF-8: {e}")))?;
    let kind = NodeKind::from_tag(tag);

    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| EditError::xml(format!("attribute on <{tag}>: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| EditError::xml(format!("attribute name is not UTF-8: {e}")))?
            .to_string();
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| EditError::xml(format!("attribute '{key}' on <{tag}>: {e}")))?
            .into_owned();
        attrs.push((key, value));
    }
    let attr_refs: Vec<(&str, &str)> = attrs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    match (doc.as_mut(), stack.last()) {
        (None, _) => {
            let mut fresh = Document::with_root(kind);
            let root = fresh.root();
            for (k, v) in attr_refs {
                fresh.set_attr(root, k, v)?;
            }
            *doc = Some(fresh);
            Ok(root)
        }
        (Some(d), Some(parent)) => {
            let node = d.create_with_attrs(kind, &attr_refs);
            d.append_child(*parent, node)?;
            Ok(node)
        }
        (Some(_), None) => Err(EditError::xml(format!(
            "second root element <{tag}>"
        ))),
    }
}

fn write_error<E: std::fmt::Display>(tag: &str) -> impl Fn(E) -> EditError + '_ {
    move |e| EditError::xml(format!("write <{tag}>: {e}"))
}

fn flush_text(doc: &mut Option<Document>, stack: &[NodeId], pending: &mut String) {
    let text = std::mem::take(pending);
    if text.trim().is_empty() {
        return;
    }
    let (Some(d), Some(node)) = (doc.as_mut(), stack.last()) else {
        return;
    };
    let merged = match d.node(*node).text() {
        Some(prev) => format!("{prev}{text}"),
        None => text,
    };
    d.set_text(*node, merged);
}

#[cfg(test)]
#[path = "../../tests/unit/document/xml.rs"]
mod tests;
