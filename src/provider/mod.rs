//! Document formats.
//!
//! A [`ConfigProvider`] turns a document on disk into a [`ConfigTree`] and
//! writes the changed parts of a tree back. New formats are added by
//! implementing the trait.

pub mod ini_provider;
pub mod toml_provider;
pub mod xml_provider;

pub use ini_provider::IniProvider;
pub use toml_provider::TomlProvider;
pub use xml_provider::XmlProvider;

use crate::error::{ConfigError, Result};
use crate::tree::{ConfigTree, KeyMatch, NodeId};
use std::path::Path;

/// Loads and saves one document format.
pub trait ConfigProvider {
	/// Parse the document at `path` into a tree.
	fn load(&self, path: &Path) -> Result<ConfigTree>;

	/// Write every changed node and attribute of `tree` to `path`.
	///
	/// Keys already in the document are matched with `rule`. Anything in the
	/// document that was not changed at runtime is left as found.
	fn save(&self, tree: &ConfigTree, path: &Path, rule: KeyMatch) -> Result<()>;
}

impl<P: ConfigProvider + ?Sized> ConfigProvider for Box<P> {
	fn load(&self, path: &Path) -> Result<ConfigTree> {
		(**self).load(path)
	}

	fn save(&self, tree: &ConfigTree, path: &Path, rule: KeyMatch) -> Result<()> {
		(**self).save(tree, path, rule)
	}
}

/// Pick a provider from a file extension.
pub fn for_path(path: &Path) -> Option<Box<dyn ConfigProvider>> {
	let extension = path.extension()?.to_str()?.to_ascii_lowercase();
	match extension.as_str() {
		"xml" | "cfg" | "config" => Some(Box::new(XmlProvider)),
		"ini" => Some(Box::new(IniProvider)),
		"toml" => Some(Box::new(TomlProvider)),
		_ => None,
	}
}

/// Root key for formats that do not name their root: the file stem.
pub(crate) fn root_key_from_path(path: &Path) -> String {
	path.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.unwrap_or_default()
}

pub(crate) fn read_document(path: &Path) -> Result<String> {
	std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
		path: path.to_path_buf(),
		source,
	})
}

/// Write `contents`, creating the destination directory if it is missing.
pub(crate) fn write_document(path: &Path, contents: &[u8]) -> Result<()> {
	if let Some(parent) = path.parent()
		&& !parent.as_os_str().is_empty()
		&& !parent.exists()
	{
		std::fs::create_dir_all(parent).map_err(|source| ConfigError::WriteError {
			path: parent.to_path_buf(),
			source,
		})?;
	}

	std::fs::write(path, contents).map_err(|source| ConfigError::WriteError {
		path: path.to_path_buf(),
		source,
	})
}

/// Load the existing document at `path` through `load`, or start an empty one
/// named after the tree's root.
pub(crate) fn existing_or_empty(
	path: &Path,
	tree: &ConfigTree,
	load: impl FnOnce(&Path) -> Result<ConfigTree>,
) -> Result<ConfigTree> {
	if path.exists() {
		load(path)
	} else {
		Ok(ConfigTree::new(tree.node(tree.root()).key()))
	}
}

/// Copy every changed value below `source` into `document`.
///
/// Existing keys are found with `rule` and keep the document's spelling.
/// Missing nodes and attributes are created in `document`; nothing that was
/// not changed in `tree` is touched. A node with children keeps its scalar
/// value out of the document.
pub(crate) fn write_changes(
	document: &mut ConfigTree,
	document_node: NodeId,
	tree: &ConfigTree,
	source: NodeId,
	rule: KeyMatch,
) {
	let node = tree.node(source);
	if !node.changed() {
		return;
	}

	if node.is_leaf() {
		document.update_node(document_node, node.value(), false);
	}

	for attribute in node.attributes().iter().filter(|a| a.changed()) {
		match document.find_attribute(document_node, attribute.key(), rule) {
			Some(index) => {
				document.update_attribute(document_node, index, attribute.value(), false)
			}
			None => {
				document.add_attribute(document_node, attribute.key(), attribute.value());
			}
		}
	}

	for child in node.children() {
		let child_node = tree.node(*child);
		if !child_node.changed() {
			continue;
		}
		let target = document
			.find_child(document_node, child_node.key(), rule)
			.unwrap_or_else(|| document.add_child(document_node, child_node.key(), ""));
		write_changes(document, target, tree, *child, rule);
	}
}
