//! XML documents.
//!
//! Elements map to nodes and element attributes map to node attributes. An
//! element with child elements is a container; otherwise its trimmed text is
//! the node value.

use crate::error::{CodecError, ConfigError, Result};
use crate::provider::{ConfigProvider, existing_or_empty, read_document, write_changes, write_document};
use crate::tree::{ConfigTree, KeyMatch, NodeId};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlProvider;

impl ConfigProvider for XmlProvider {
	fn load(&self, path: &Path) -> Result<ConfigTree> {
		let content = read_document(path)?;
		parse_xml_str(&content).map_err(|source| ConfigError::ParseError {
			path: path.to_path_buf(),
			source,
		})
	}

	/// The existing document is rewritten from its parsed tree, so comments,
	/// processing instructions and text mixed with child elements are dropped.
	fn save(&self, tree: &ConfigTree, path: &Path, rule: KeyMatch) -> Result<()> {
		let mut document = existing_or_empty(path, tree, |p| self.load(p))?;
		let root = document.root();
		write_changes(&mut document, root, tree, tree.root(), rule);

		let bytes = to_xml_bytes(&document).map_err(|source| ConfigError::SerializeError {
			path: path.to_path_buf(),
			source,
		})?;
		write_document(path, &bytes)
	}
}

/// Parse an XML document into a tree.
pub fn parse_xml_str(content: &str) -> std::result::Result<ConfigTree, CodecError> {
	let mut reader = Reader::from_str(content);
	reader.config_mut().trim_text(true);

	let mut tree: Option<ConfigTree> = None;
	// Open elements and the text collected for each of them.
	let mut stack: Vec<(NodeId, String)> = Vec::new();

	loop {
		match reader.read_event()? {
			Event::Start(element) => {
				let id = open_element(&mut tree, &stack, &element)?;
				stack.push((id, String::new()));
			}
			Event::Empty(element) => {
				open_element(&mut tree, &stack, &element)?;
			}
			Event::Text(text) => {
				if let Some((_, buffer)) = stack.last_mut() {
					buffer.push_str(&text.unescape()?);
				}
			}
			Event::CData(data) => {
				if let Some((_, buffer)) = stack.last_mut() {
					buffer.push_str(&String::from_utf8_lossy(&data.into_inner()));
				}
			}
			Event::End(_) => {
				if let Some((id, text)) = stack.pop()
					&& let Some(tree) = tree.as_mut()
					&& tree.node(id).is_leaf()
				{
					tree.update_node(id, text.trim(), false);
				}
			}
			Event::Eof => break,
			_ => {}
		}
	}

	if !stack.is_empty() {
		return Err("unexpected end of document".into());
	}
	tree.ok_or_else(|| "document has no root element".into())
}

fn open_element(
	tree: &mut Option<ConfigTree>,
	stack: &[(NodeId, String)],
	element: &BytesStart<'_>,
) -> std::result::Result<NodeId, CodecError> {
	let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();

	let id = if let Some(tree) = tree.as_mut() {
		let Some((parent, _)) = stack.last() else {
			return Err("document has more than one root element".into());
		};
		tree.add_child(*parent, name, "")
	} else {
		let created = ConfigTree::new(name);
		let root = created.root();
		*tree = Some(created);
		root
	};

	if let Some(tree) = tree.as_mut() {
		for attribute in element.attributes() {
			let attribute = attribute?;
			let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
			let value = attribute.unescape_value()?.into_owned();
			tree.add_attribute(id, key, value);
		}
	}

	Ok(id)
}

/// Serialize a tree as an indented XML document.
pub fn to_xml_bytes(tree: &ConfigTree) -> std::result::Result<Vec<u8>, CodecError> {
	let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
	writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
	write_element(&mut writer, tree, tree.root())?;
	Ok(writer.into_inner())
}

fn write_element(
	writer: &mut Writer<Vec<u8>>,
	tree: &ConfigTree,
	id: NodeId,
) -> std::result::Result<(), CodecError> {
	let node = tree.node(id);
	let mut start = BytesStart::new(node.key());
	for attribute in node.attributes() {
		start.push_attribute((attribute.key(), attribute.value()));
	}

	if !node.is_leaf() {
		writer.write_event(Event::Start(start))?;
		for child in node.children() {
			write_element(writer, tree, *child)?;
		}
		writer.write_event(Event::End(BytesEnd::new(node.key())))?;
	} else if node.value().is_empty() {
		writer.write_event(Event::Empty(start))?;
	} else {
		writer.write_event(Event::Start(start))?;
		writer.write_event(Event::Text(BytesText::new(node.value())))?;
		writer.write_event(Event::End(BytesEnd::new(node.key())))?;
	}

	Ok(())
}
