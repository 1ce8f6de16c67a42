//! Strata - layered configuration files with dotted-path access.
//!
//! This library provides:
//! - A configuration tree with change tracking
//! - Overlay merging on top of a definition document
//! - Dotted-key lookup with typed get/set
//! - Saving only the values changed at runtime
//! - XML, INI and TOML document formats
//!
//! # Example
//!
//! ```no_run
//! use strata_config::{ConfigFile, ConfigManager, XmlProvider};
//!
//! let mut file = ConfigFile::load("/opt/editor/Editor.cfg", XmlProvider).unwrap();
//! file.add_app_data("Editor", true).unwrap().add_current_directory().unwrap();
//!
//! let mut manager = ConfigManager::new();
//! manager.add(file).unwrap();
//!
//! let width: i32 = manager.get_as("Editor.MainWindow.Size.Width").unwrap();
//! manager.set_as("MainWindow.Size.Width", width + 128).unwrap();
//! manager.save().unwrap();
//! ```

pub mod convert;
pub mod error;
pub mod file;
pub mod manager;
pub mod provider;
pub mod tree;

pub use convert::ConfigValue;
pub use error::{ConfigError, Result};
pub use file::{ConfigFile, DEFAULT_SEPARATOR, FileOptions};
pub use manager::ConfigManager;
pub use provider::{ConfigProvider, IniProvider, TomlProvider, XmlProvider};
pub use tree::{ConfigAttribute, ConfigNode, ConfigTree, KeyMatch, NodeId, Target};
