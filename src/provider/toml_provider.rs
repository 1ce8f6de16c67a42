//! TOML documents.
//!
//! Tables become container nodes, everything else becomes a leaf. Strings are
//! stored verbatim; other values keep their TOML spelling.

use crate::error::{ConfigError, Result};
use crate::provider::{ConfigProvider, read_document, root_key_from_path, write_document};
use crate::tree::{ConfigTree, KeyMatch, NodeId};
use std::path::Path;
use toml::{Table, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct TomlProvider;

impl ConfigProvider for TomlProvider {
	fn load(&self, path: &Path) -> Result<ConfigTree> {
		let table = read_table(path)?;
		let mut tree = ConfigTree::new(root_key_from_path(path));
		let root = tree.root();
		add_table(&mut tree, root, &table);
		Ok(tree)
	}

	fn save(&self, tree: &ConfigTree, path: &Path, rule: KeyMatch) -> Result<()> {
		let mut table = if path.exists() {
			read_table(path)?
		} else {
			Table::new()
		};
		write_changes(&mut table, tree, tree.root(), rule);

		let content = toml::to_string(&table).map_err(|source| ConfigError::SerializeError {
			path: path.to_path_buf(),
			source: Box::new(source),
		})?;
		write_document(path, content.as_bytes())
	}
}

fn read_table(path: &Path) -> Result<Table> {
	let content = read_document(path)?;
	toml::from_str(&content).map_err(|source| ConfigError::ParseError {
		path: path.to_path_buf(),
		source: Box::new(source),
	})
}

fn add_table(tree: &mut ConfigTree, parent: NodeId, table: &Table) {
	for (key, value) in table {
		match value {
			Value::Table(inner) => {
				let child = tree.add_child(parent, key.as_str(), "");
				add_table(tree, child, inner);
			}
			Value::String(text) => {
				tree.add_child(parent, key.as_str(), text.as_str());
			}
			other => {
				tree.add_child(parent, key.as_str(), other.to_string());
			}
		}
	}
}

fn write_changes(table: &mut Table, tree: &ConfigTree, id: NodeId, rule: KeyMatch) {
	for child in tree.node(id).children() {
		let node = tree.node(*child);
		if !node.changed() {
			continue;
		}

		let key = table
			.keys()
			.find(|existing| rule.matches(existing.as_str(), node.key()))
			.cloned()
			.unwrap_or_else(|| node.key().to_string());

		if node.is_leaf() {
			let value = typed_value(table.get(&key), node.value());
			table.insert(key, value);
			continue;
		}

		let entry = table.entry(key).or_insert(Value::Table(Table::new()));
		if !entry.is_table() {
			*entry = Value::Table(Table::new());
		}
		if let Value::Table(inner) = entry {
			write_changes(inner, tree, *child, rule);
		}
	}
}

/// Convert a stored string back to a TOML value, keeping the type of the
/// value it replaces when there is one.
fn typed_value(existing: Option<&Value>, raw: &str) -> Value {
	let parsed = match existing {
		Some(Value::String(_)) => None,
		Some(Value::Integer(_)) => raw.trim().parse().ok().map(Value::Integer),
		Some(Value::Float(_)) => raw.trim().parse().ok().map(Value::Float),
		Some(Value::Boolean(_)) => parse_bool(raw).map(Value::Boolean),
		_ => raw
			.trim()
			.parse()
			.ok()
			.map(Value::Integer)
			.or_else(|| raw.trim().parse().ok().map(Value::Float))
			.or_else(|| parse_bool(raw).map(Value::Boolean)),
	};
	parsed.unwrap_or_else(|| Value::String(raw.to_string()))
}

fn parse_bool(raw: &str) -> Option<bool> {
	match raw.trim() {
		"true" => Some(true),
		"false" => Some(false),
		_ => None,
	}
}
