//! Routing fully-qualified keys across several configuration files.

use crate::convert::ConfigValue;
use crate::error::{ConfigError, Result};
use crate::file::{ConfigFile, DEFAULT_SEPARATOR};
use std::collections::BTreeMap;
use tracing::debug;

/// A set of [`ConfigFile`]s addressed by their root key.
///
/// Keys take the form `File.Path.To.Key`. With exactly one registered file
/// the leading file name may be left out.
#[derive(Debug)]
pub struct ConfigManager {
	files: BTreeMap<String, ConfigFile>,
	separator: char,
}

impl Default for ConfigManager {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigManager {
	/// Create a manager for files using [`DEFAULT_SEPARATOR`].
	pub fn new() -> Self {
		Self::with_separator(DEFAULT_SEPARATOR)
	}

	/// Create a manager splitting the file name off keys with `separator`.
	pub fn with_separator(separator: char) -> Self {
		Self {
			files: BTreeMap::new(),
			separator,
		}
	}

	/// Register a file under its root key.
	///
	/// The file must split keys on the manager's separator.
	pub fn add(&mut self, file: ConfigFile) -> Result<&mut Self> {
		let root = file.root_key().to_string();
		if file.options().separator != self.separator {
			return Err(ConfigError::InvalidArgument(format!(
				"{root} splits keys on '{}' but the manager uses '{}'",
				file.options().separator,
				self.separator
			)));
		}
		if self.files.contains_key(&root) {
			return Err(ConfigError::DuplicateFile { root });
		}

		debug!(root = %root, path = %file.definition_file().display(), "registered config file");
		self.files.insert(root, file);
		Ok(self)
	}

	pub fn file(&self, root: &str) -> Option<&ConfigFile> {
		self.files.get(root)
	}

	pub fn file_mut(&mut self, root: &str) -> Option<&mut ConfigFile> {
		self.files.get_mut(root)
	}

	/// Root keys of all registered files, sorted.
	pub fn roots(&self) -> impl Iterator<Item = &str> {
		self.files.keys().map(String::as_str)
	}

	/// Save every registered file that has changes.
	pub fn save(&self) -> Result<()> {
		for file in self.files.values() {
			file.save()?;
		}
		Ok(())
	}

	pub fn get(&self, key: &str) -> Result<&str> {
		let (file, rest) = self.routed(key)?;
		file.get(rest)
	}

	pub fn get_as<T: ConfigValue>(&self, key: &str) -> Result<T> {
		let (file, rest) = self.routed(key)?;
		file.get_as(rest)
	}

	pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
		let (file, rest) = self.routed_mut(key)?;
		file.set(rest, value)
	}

	pub fn set_as<T: ConfigValue>(&mut self, key: &str, value: T) -> Result<()> {
		let (file, rest) = self.routed_mut(key)?;
		file.set_as(rest, value)
	}

	fn routed<'k>(&self, key: &'k str) -> Result<(&ConfigFile, &'k str)> {
		let (root, rest) = self.route(key)?;
		let file = self.files.get(&root).ok_or(ConfigError::NoFiles)?;
		Ok((file, rest))
	}

	fn routed_mut<'k>(&mut self, key: &'k str) -> Result<(&mut ConfigFile, &'k str)> {
		let (root, rest) = self.route(key)?;
		let file = self.files.get_mut(&root).ok_or(ConfigError::NoFiles)?;
		Ok((file, rest))
	}

	/// Split `key` into the root of the file it addresses and the key to pass on.
	fn route<'k>(&self, key: &'k str) -> Result<(String, &'k str)> {
		if key.is_empty() {
			return Err(ConfigError::InvalidArgument("key can't be empty".to_string()));
		}

		if let Some(pos) = key.find(self.separator)
			&& pos > 0
			&& self.files.contains_key(&key[..pos])
		{
			let rest = &key[pos + self.separator.len_utf8()..];
			return Ok((key[..pos].to_string(), rest));
		}

		let mut roots = self.files.keys();
		match (roots.next(), roots.next()) {
			(Some(only), None) => Ok((only.clone(), key)),
			(Some(_), Some(_)) => Err(ConfigError::AmbiguousKey {
				key: key.to_string(),
			}),
			(None, _) => Err(ConfigError::NoFiles),
		}
	}
}
