//! Overlay locations relative to well-known directories.

use crate::error::{ConfigError, Result};
use crate::file::ConfigFile;
use std::path::{Path, PathBuf};

impl ConfigFile {
	/// Merge the overlay in the current working directory. Never a save location.
	pub fn add_current_directory(&mut self) -> Result<&mut Self> {
		let cwd = std::env::current_dir().map_err(|source| ConfigError::ReadError {
			path: PathBuf::from("."),
			source,
		})?;
		self.add_location(cwd, false)
	}

	/// Overlay under the user's roaming application data directory.
	pub fn add_app_data(&mut self, relative_path: impl AsRef<Path>, save: bool) -> Result<&mut Self> {
		let base = dirs::config_dir().ok_or(ConfigError::DirectoryNotFound("application data"))?;
		self.add_relative(base, relative_path.as_ref(), save)
	}

	/// Overlay under the user's local application data directory.
	pub fn add_local_app_data(
		&mut self,
		relative_path: impl AsRef<Path>,
		save: bool,
	) -> Result<&mut Self> {
		let base = dirs::data_local_dir()
			.ok_or(ConfigError::DirectoryNotFound("local application data"))?;
		self.add_relative(base, relative_path.as_ref(), save)
	}

	/// Overlay under the machine-wide application data directory.
	pub fn add_common_app_data(
		&mut self,
		relative_path: impl AsRef<Path>,
		save: bool,
	) -> Result<&mut Self> {
		let base = common_app_data_dir()
			.ok_or(ConfigError::DirectoryNotFound("common application data"))?;
		self.add_relative(base, relative_path.as_ref(), save)
	}

	/// Overlay under the user's home directory.
	pub fn add_user_home(&mut self, relative_path: impl AsRef<Path>, save: bool) -> Result<&mut Self> {
		let base = dirs::home_dir().ok_or(ConfigError::DirectoryNotFound("home"))?;
		self.add_relative(base, relative_path.as_ref(), save)
	}

	/// Overlay under the user's documents directory.
	pub fn add_documents(&mut self, relative_path: impl AsRef<Path>, save: bool) -> Result<&mut Self> {
		let base = dirs::document_dir().ok_or(ConfigError::DirectoryNotFound("documents"))?;
		self.add_relative(base, relative_path.as_ref(), save)
	}

	fn add_relative(&mut self, base: PathBuf, relative_path: &Path, save: bool) -> Result<&mut Self> {
		if relative_path.is_absolute() {
			return Err(ConfigError::InvalidArgument(format!(
				"{} must be relative, use add_location for absolute paths",
				relative_path.display()
			)));
		}
		self.add_location(base.join(relative_path), save)
	}
}

#[cfg(windows)]
fn common_app_data_dir() -> Option<PathBuf> {
	std::env::var_os("PROGRAMDATA").map(PathBuf::from)
}

#[cfg(target_os = "macos")]
fn common_app_data_dir() -> Option<PathBuf> {
	Some(PathBuf::from("/Library/Application Support"))
}

#[cfg(not(any(windows, target_os = "macos")))]
fn common_app_data_dir() -> Option<PathBuf> {
	Some(PathBuf::from("/usr/share"))
}
