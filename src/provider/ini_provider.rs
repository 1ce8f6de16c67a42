//! INI documents.
//!
//! Entries outside any section become leaf children of the root, named after
//! the file stem. Each section becomes a child node whose entries are its
//! leaves. Sections do not nest and there are no attributes.

use crate::error::{ConfigError, Result};
use crate::provider::{
	ConfigProvider, existing_or_empty, read_document, root_key_from_path, write_changes,
	write_document,
};
use crate::tree::{ConfigTree, KeyMatch};
use ini::{EscapePolicy, Ini, ParseOption};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct IniProvider;

impl ConfigProvider for IniProvider {
	fn load(&self, path: &Path) -> Result<ConfigTree> {
		let content = read_document(path)?;
		parse_ini_str(&content, &root_key_from_path(path)).map_err(|source| {
			ConfigError::ParseError {
				path: path.to_path_buf(),
				source: Box::new(source),
			}
		})
	}

	fn save(&self, tree: &ConfigTree, path: &Path, rule: KeyMatch) -> Result<()> {
		let mut document = existing_or_empty(path, tree, |p| self.load(p))?;
		let root = document.root();
		write_changes(&mut document, root, tree, tree.root(), rule);

		let mut bytes = Vec::new();
		to_ini(&document)
			.write_to_policy(&mut bytes, EscapePolicy::Nothing)
			.map_err(|source| ConfigError::WriteError {
				path: path.to_path_buf(),
				source,
			})?;
		write_document(path, &bytes)
	}
}

/// Parse INI text into a tree whose root is called `root_key`.
///
/// Backslashes are taken literally so Windows-style paths survive.
pub fn parse_ini_str(content: &str, root_key: &str) -> std::result::Result<ConfigTree, ini::ParseError> {
	let option = ParseOption {
		enabled_escape: false,
		..ParseOption::default()
	};
	let ini = Ini::load_from_str_opt(content, option)?;

	let mut tree = ConfigTree::new(root_key);
	let root = tree.root();
	for (section, properties) in ini.iter() {
		let parent = match section {
			Some(name) => tree.add_child(root, name, ""),
			None => root,
		};
		for (key, value) in properties.iter() {
			tree.add_child(parent, key, value);
		}
	}

	Ok(tree)
}

/// Lay a tree out as INI: root leaves go to the general section and every
/// container child becomes a section.
fn to_ini(tree: &ConfigTree) -> Ini {
	let mut ini = Ini::new();
	let root = tree.node(tree.root());

	for child in root.children() {
		let node = tree.node(*child);
		if node.is_leaf() {
			ini.with_general_section().set(node.key(), node.value());
			continue;
		}

		for entry in node.children() {
			let entry = tree.node(*entry);
			if !entry.is_leaf() {
				tracing::warn!(
					section = node.key(),
					key = entry.key(),
					"INI sections cannot nest, skipping"
				);
				continue;
			}
			ini.with_section(Some(node.key())).set(entry.key(), entry.value());
		}
	}

	ini
}

#[cfg(test)]
mod tests {
	use super::*;

	const EDITOR: &str = r#"
AssetsDir = .\Assets

[WindowSize]
Width = 640
Height = 480

[Font]
Family = Consolas
Size = 14.5
"#;

	#[test]
	fn test_parse_global_entries_and_sections() {
		let tree = parse_ini_str(EDITOR, "Editor").unwrap();
		let root = tree.root();
		assert_eq!(tree.node(root).key(), "Editor");

		let assets = tree.find_child(root, "AssetsDir", KeyMatch::Exact).unwrap();
		assert_eq!(tree.node(assets).value(), r".\Assets");

		let size = tree.find_child(root, "WindowSize", KeyMatch::Exact).unwrap();
		let height = tree.find_child(size, "Height", KeyMatch::Exact).unwrap();
		assert_eq!(tree.node(height).value(), "480");
	}

	#[test]
	fn test_to_ini_round_trips_layout() {
		let tree = parse_ini_str(EDITOR, "Editor").unwrap();
		let mut bytes = Vec::new();
		to_ini(&tree)
			.write_to_policy(&mut bytes, EscapePolicy::Nothing)
			.unwrap();
		let text = String::from_utf8(bytes).unwrap();

		assert!(text.contains("[Font]"));
		let reparsed = parse_ini_str(&text, "Editor").unwrap();
		assert_eq!(reparsed.entries('.'), tree.entries('.'));
	}
}
