//! A single configuration file built from a definition document and overlays.
//!
//! This module handles:
//! - Loading the definition document that fixes the key shape
//! - Merging overlay documents from additional directories
//! - Dotted-key lookup and typed get/set
//! - Writing runtime changes to the save location

pub mod locations;
pub mod merge;
pub mod resolve;

pub use merge::merge_into;
pub use resolve::resolve_key;

use crate::convert::{self, ConfigValue};
use crate::error::{ConfigError, Result};
use crate::provider::{self, ConfigProvider};
use crate::tree::{ConfigTree, KeyMatch};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: char = '.';

/// Options controlling how a [`ConfigFile`] is located and addressed.
#[derive(Debug, Clone)]
pub struct FileOptions {
	/// Character splitting a key into path segments.
	pub separator: char,

	/// Compare keys without regard to case.
	pub ignore_case: bool,

	/// Directory a relative definition path is resolved against.
	/// Defaults to the directory of the running executable.
	pub base_dir: Option<PathBuf>,
}

impl Default for FileOptions {
	fn default() -> Self {
		Self {
			separator: DEFAULT_SEPARATOR,
			ignore_case: true,
			base_dir: None,
		}
	}
}

/// One configuration tree plus the documents it was assembled from.
pub struct ConfigFile {
	definition_file: PathBuf,
	save_location: Option<PathBuf>,
	tree: ConfigTree,
	changed: bool,
	provider: Box<dyn ConfigProvider>,
	options: FileOptions,
}

impl std::fmt::Debug for ConfigFile {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConfigFile")
			.field("definition_file", &self.definition_file)
			.field("save_location", &self.save_location)
			.field("root_key", &self.root_key())
			.field("changed", &self.changed)
			.field("options", &self.options)
			.finish()
	}
}

impl ConfigFile {
	/// Load a definition document with default options.
	pub fn load(definition: impl AsRef<Path>, provider: impl ConfigProvider + 'static) -> Result<Self> {
		Self::load_with_options(definition, provider, FileOptions::default())
	}

	/// Load a definition document, picking the format from its extension.
	pub fn open(definition: impl AsRef<Path>, options: FileOptions) -> Result<Self> {
		let definition = definition.as_ref();
		let provider = provider::for_path(definition).ok_or_else(|| {
			ConfigError::InvalidArgument(format!(
				"no format registered for {}",
				definition.display()
			))
		})?;
		Self::from_boxed(definition, provider, options)
	}

	/// Load a definition document.
	///
	/// Fails if the document is missing or malformed.
	pub fn load_with_options(
		definition: impl AsRef<Path>,
		provider: impl ConfigProvider + 'static,
		options: FileOptions,
	) -> Result<Self> {
		Self::from_boxed(definition.as_ref(), Box::new(provider), options)
	}

	fn from_boxed(
		definition: &Path,
		provider: Box<dyn ConfigProvider>,
		options: FileOptions,
	) -> Result<Self> {
		if definition.as_os_str().is_empty() {
			return Err(ConfigError::InvalidArgument(
				"definition file can't be empty".to_string(),
			));
		}

		let definition_file = absolute_definition_path(definition, options.base_dir.as_deref());
		if !definition_file.is_file() {
			return Err(ConfigError::DefinitionNotFound {
				path: definition_file,
			});
		}

		let tree = provider.load(&definition_file)?;
		debug!(path = %definition_file.display(), nodes = tree.len(), "loaded definition");

		Ok(Self {
			definition_file,
			save_location: None,
			tree,
			changed: false,
			provider,
			options,
		})
	}

	/// Key of the root node, used by [`crate::ConfigManager`] to address this file.
	pub fn root_key(&self) -> &str {
		self.tree.node(self.tree.root()).key()
	}

	pub fn definition_file(&self) -> &Path {
		&self.definition_file
	}

	/// Where [`ConfigFile::save`] writes, if any location was marked for saving.
	pub fn save_location(&self) -> Option<&Path> {
		self.save_location.as_deref()
	}

	/// True once any value was set at runtime.
	pub fn is_changed(&self) -> bool {
		self.changed
	}

	pub fn options(&self) -> &FileOptions {
		&self.options
	}

	pub fn tree(&self) -> &ConfigTree {
		&self.tree
	}

	fn key_match(&self) -> KeyMatch {
		KeyMatch::from_ignore_case(self.options.ignore_case)
	}

	/// Merge the copy of the definition document found in `directory`.
	///
	/// A missing overlay is skipped. With `save` the location becomes the
	/// single save location, replacing any earlier one.
	pub fn add_location(&mut self, directory: impl AsRef<Path>, save: bool) -> Result<&mut Self> {
		let directory = directory.as_ref();
		if directory.as_os_str().is_empty() {
			return Err(ConfigError::InvalidArgument(
				"target directory can't be empty".to_string(),
			));
		}

		let file_name = self.definition_file.file_name().ok_or_else(|| {
			ConfigError::InvalidArgument(format!(
				"definition path has no file name: {}",
				self.definition_file.display()
			))
		})?;
		let location = directory.join(file_name);

		if location != self.definition_file && location.is_file() {
			// Parse fully before touching the tree so a bad overlay changes nothing.
			let overlay = self.provider.load(&location)?;
			let root = self.tree.root();
			let rule = self.key_match();
			let replaced = merge_into(&mut self.tree, root, &overlay, overlay.root(), rule);
			debug!(path = %location.display(), replaced, "applied overlay");
		} else {
			debug!(path = %location.display(), "no overlay found, skipping");
		}

		if save {
			debug!(path = %location.display(), "save location set");
			self.save_location = Some(location);
		}

		Ok(self)
	}

	/// Write runtime changes to the save location.
	///
	/// Does nothing when no save location is set or nothing was changed.
	pub fn save(&self) -> Result<()> {
		let Some(location) = self.save_location.as_deref() else {
			return Ok(());
		};
		if !self.changed {
			return Ok(());
		}

		debug!(path = %location.display(), "saving changes");
		self.provider.save(&self.tree, location, self.key_match())
	}

	/// Get the value stored at `key`.
	pub fn get(&self, key: &str) -> Result<&str> {
		let target = resolve_key(&self.tree, key, self.options.separator, self.key_match())?;
		trace!(key, ?target, "resolved");
		Ok(self.tree.value(target))
	}

	/// Get the value stored at `key` converted to `T`.
	pub fn get_as<T: ConfigValue>(&self, key: &str) -> Result<T> {
		convert::parse(self.get(key)?)
	}

	/// Set the value stored at `key`, marking it for saving.
	pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
		let target = resolve_key(&self.tree, key, self.options.separator, self.key_match())?;
		self.tree.update(target, value, true);
		self.changed = true;
		Ok(())
	}

	/// Format `value` and store it at `key`.
	pub fn set_as<T: ConfigValue>(&mut self, key: &str, value: T) -> Result<()> {
		self.set(key, value.format_value())
	}

	/// Every leaf and attribute path with its current value.
	pub fn entries(&self) -> Vec<(String, String)> {
		self.tree.entries(self.options.separator)
	}
}

fn absolute_definition_path(definition: &Path, base_dir: Option<&Path>) -> PathBuf {
	if definition.is_absolute() {
		return definition.to_path_buf();
	}

	let base = base_dir.map(Path::to_path_buf).or_else(|| {
		std::env::current_exe()
			.ok()
			.and_then(|exe| exe.parent().map(Path::to_path_buf))
	});
	match base {
		Some(base) => base.join(definition),
		None => definition.to_path_buf(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::provider::XmlProvider;
	use std::fs;

	const EDITOR: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Editor>
  <AssetsDir>.\Assets</AssetsDir>
  <MainWindow>
    <Size>
      <Width>640</Width>
      <Height>480</Height>
    </Size>
    <Font>
      <Family>Consolas</Family>
      <Size>18.5</Size>
    </Font>
    <Colors>
      <Foreground R="255" G="215" B="0" />
    </Colors>
  </MainWindow>
</Editor>
"#;

	fn write_definition(dir: &Path) -> PathBuf {
		let path = dir.join("Editor.cfg");
		fs::write(&path, EDITOR).unwrap();
		path
	}

	#[test]
	fn test_get_and_typed_get() {
		let temp_dir = tempfile::tempdir().unwrap();
		let config = ConfigFile::load(write_definition(temp_dir.path()), XmlProvider).unwrap();

		assert_eq!(config.root_key(), "Editor");
		assert_eq!(config.get("AssetsDir").unwrap(), r".\Assets");
		assert_eq!(config.get_as::<i32>("MainWindow.Colors.Foreground.R").unwrap(), 255);
		assert!((config.get_as::<f64>("MainWindow.Font.Size").unwrap() - 18.5).abs() < 1e-6);
	}

	#[test]
	fn test_typed_get_reports_conversion_error() {
		let temp_dir = tempfile::tempdir().unwrap();
		let config = ConfigFile::load(write_definition(temp_dir.path()), XmlProvider).unwrap();

		let err = config.get_as::<i32>("MainWindow.Font.Family").unwrap_err();
		assert!(matches!(err, ConfigError::Conversion { target: "i32", .. }));
	}

	#[test]
	fn test_set_round_trip_marks_changed() {
		let temp_dir = tempfile::tempdir().unwrap();
		let mut config = ConfigFile::load(write_definition(temp_dir.path()), XmlProvider).unwrap();
		assert!(!config.is_changed());

		config.set("MainWindow.Size.Width", "768").unwrap();
		config.set_as("MainWindow.Colors.Foreground.B", 11u8).unwrap();

		assert!(config.is_changed());
		assert_eq!(config.get("MainWindow.Size.Width").unwrap(), "768");
		assert_eq!(config.get_as::<u8>("MainWindow.Colors.Foreground.B").unwrap(), 11);
	}

	#[test]
	fn test_set_unknown_key_fails_without_marking() {
		let temp_dir = tempfile::tempdir().unwrap();
		let mut config = ConfigFile::load(write_definition(temp_dir.path()), XmlProvider).unwrap();

		let err = config.set("MainWindow.Missing.Width", "1").unwrap_err();
		assert!(err.is_key_not_found());
		assert!(!config.is_changed());
	}

	#[test]
	fn test_missing_definition_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		let err = ConfigFile::load(temp_dir.path().join("Nope.cfg"), XmlProvider).unwrap_err();
		assert!(matches!(err, ConfigError::DefinitionNotFound { .. }));
	}

	#[test]
	fn test_relative_definition_uses_base_dir() {
		let temp_dir = tempfile::tempdir().unwrap();
		write_definition(temp_dir.path());
		let options = FileOptions {
			base_dir: Some(temp_dir.path().to_path_buf()),
			..FileOptions::default()
		};

		let config = ConfigFile::open("Editor.cfg", options).unwrap();
		assert_eq!(config.definition_file(), temp_dir.path().join("Editor.cfg"));
	}

	#[test]
	fn test_case_sensitive_option() {
		let temp_dir = tempfile::tempdir().unwrap();
		let definition = write_definition(temp_dir.path());
		let options = FileOptions {
			ignore_case: false,
			..FileOptions::default()
		};
		let config = ConfigFile::load_with_options(&definition, XmlProvider, options).unwrap();
		assert!(config.get("mainwindow.size.width").unwrap_err().is_key_not_found());

		let config = ConfigFile::load(&definition, XmlProvider).unwrap();
		assert_eq!(
			config.get("mainwindow.size.width").unwrap(),
			config.get("MainWindow.Size.Width").unwrap()
		);
	}

	#[test]
	fn test_overlay_applies_and_missing_overlay_is_skipped() {
		let temp_dir = tempfile::tempdir().unwrap();
		let definition = write_definition(temp_dir.path());
		let user_dir = temp_dir.path().join("user");
		fs::create_dir(&user_dir).unwrap();
		fs::write(
			user_dir.join("Editor.cfg"),
			"<Editor><MainWindow><Size><Width>768</Width></Size><Extra>1</Extra></MainWindow></Editor>",
		)
		.unwrap();

		let mut config = ConfigFile::load(&definition, XmlProvider).unwrap();
		config
			.add_location(temp_dir.path().join("absent"), false)
			.unwrap()
			.add_location(&user_dir, false)
			.unwrap();

		assert_eq!(config.get("MainWindow.Size.Width").unwrap(), "768");
		assert_eq!(config.get("MainWindow.Size.Height").unwrap(), "480");
		assert!(config.get("MainWindow.Extra").unwrap_err().is_key_not_found());
		assert!(!config.is_changed());
	}

	#[test]
	fn test_corrupt_overlay_leaves_tree_untouched() {
		let temp_dir = tempfile::tempdir().unwrap();
		let definition = write_definition(temp_dir.path());
		let user_dir = temp_dir.path().join("user");
		fs::create_dir(&user_dir).unwrap();
		fs::write(user_dir.join("Editor.cfg"), "<Editor><AssetsDir>x</Editor>").unwrap();

		let mut config = ConfigFile::load(&definition, XmlProvider).unwrap();
		let err = config.add_location(&user_dir, true).unwrap_err();

		assert!(matches!(err, ConfigError::ParseError { .. }));
		assert_eq!(config.get("AssetsDir").unwrap(), r".\Assets");
		assert!(config.save_location().is_none());
	}

	#[test]
	fn test_save_without_changes_writes_nothing() {
		let temp_dir = tempfile::tempdir().unwrap();
		let definition = write_definition(temp_dir.path());
		let save_dir = temp_dir.path().join("save");

		let mut config = ConfigFile::load(&definition, XmlProvider).unwrap();
		config.add_location(&save_dir, true).unwrap();
		config.save().unwrap();

		assert!(!save_dir.join("Editor.cfg").exists());
	}

	#[test]
	fn test_last_save_location_wins() {
		let temp_dir = tempfile::tempdir().unwrap();
		let definition = write_definition(temp_dir.path());
		let first = temp_dir.path().join("first");
		let second = temp_dir.path().join("second");

		let mut config = ConfigFile::load(&definition, XmlProvider).unwrap();
		config.add_location(&first, true).unwrap().add_location(&second, true).unwrap();
		config.set("AssetsDir", "/srv/assets").unwrap();
		config.save().unwrap();

		assert!(!first.join("Editor.cfg").exists());
		assert!(second.join("Editor.cfg").exists());
	}

	#[test]
	fn test_save_writes_only_changed_values() {
		let temp_dir = tempfile::tempdir().unwrap();
		let definition = write_definition(temp_dir.path());
		let save_dir = temp_dir.path().join("save");

		let mut config = ConfigFile::load(&definition, XmlProvider).unwrap();
		config.add_location(&save_dir, true).unwrap();
		config.set("MainWindow.Colors.Foreground.B", "11").unwrap();
		config.save().unwrap();

		let saved = fs::read_to_string(save_dir.join("Editor.cfg")).unwrap();
		assert!(saved.contains(r#"B="11""#));
		assert!(!saved.contains("AssetsDir"));
		assert!(!saved.contains("Width"));

		let mut reloaded = ConfigFile::load(&definition, XmlProvider).unwrap();
		reloaded.add_location(&save_dir, false).unwrap();
		assert_eq!(reloaded.get("MainWindow.Colors.Foreground.B").unwrap(), "11");
		assert_eq!(reloaded.get("MainWindow.Colors.Foreground.R").unwrap(), "255");
	}

	#[test]
	fn test_save_preserves_existing_overlay_content() {
		let temp_dir = tempfile::tempdir().unwrap();
		let definition = write_definition(temp_dir.path());
		let save_dir = temp_dir.path().join("save");
		fs::create_dir(&save_dir).unwrap();
		fs::write(
			save_dir.join("Editor.cfg"),
			"<Editor><MainWindow><Font><Family>Fira Code</Family></Font></MainWindow></Editor>",
		)
		.unwrap();

		let mut config = ConfigFile::load(&definition, XmlProvider).unwrap();
		config.add_location(&save_dir, true).unwrap();
		assert_eq!(config.get("MainWindow.Font.Family").unwrap(), "Fira Code");
		config.set("MainWindow.Size.Height", "600").unwrap();
		config.save().unwrap();

		let mut reloaded = ConfigFile::load(&definition, XmlProvider).unwrap();
		reloaded.add_location(&save_dir, false).unwrap();
		assert_eq!(reloaded.get("MainWindow.Font.Family").unwrap(), "Fira Code");
		assert_eq!(reloaded.get("MainWindow.Size.Height").unwrap(), "600");
		assert_eq!(reloaded.get("MainWindow.Size.Width").unwrap(), "640");
	}

	#[test]
	fn test_save_edits_differently_cased_overlay_in_place() {
		let temp_dir = tempfile::tempdir().unwrap();
		let definition = write_definition(temp_dir.path());
		let save_dir = temp_dir.path().join("save");
		fs::create_dir(&save_dir).unwrap();
		fs::write(
			save_dir.join("Editor.cfg"),
			"<editor><mainwindow><size><width>700</width></size></mainwindow></editor>",
		)
		.unwrap();

		let mut config = ConfigFile::load(&definition, XmlProvider).unwrap();
		config.add_location(&save_dir, true).unwrap();
		assert_eq!(config.get("MainWindow.Size.Width").unwrap(), "700");
		config.set("MainWindow.Size.Width", "900").unwrap();
		config.save().unwrap();

		let saved = fs::read_to_string(save_dir.join("Editor.cfg")).unwrap();
		assert!(saved.contains("<width>900</width>"));
		assert!(!saved.contains("700"));
		assert!(!saved.contains("MainWindow"));
		assert!(!saved.contains("Width"));
	}
}
