use std::path::PathBuf;

/// Boxed error produced by a document codec.
pub type CodecError = Box<dyn std::error::Error + Send + Sync>;

/// Library-level structured errors for strata.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	#[error("Definition file not found: {path}")]
	DefinitionNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write config file: {path}")]
	WriteError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ParseError {
		path: PathBuf,
		#[source]
		source: CodecError,
	},

	#[error("Failed to serialize config file: {path}")]
	SerializeError {
		path: PathBuf,
		#[source]
		source: CodecError,
	},

	#[error("Node {segment} not found (key: {key})")]
	NodeNotFound { key: String, segment: String },

	#[error("Attribute {segment} not found (key: {key})")]
	AttributeNotFound { key: String, segment: String },

	#[error("Cannot convert {value:?} to {target}")]
	Conversion { value: String, target: &'static str },

	#[error("Ambiguous key {key}: more than one config file is registered, qualify it with the file name")]
	AmbiguousKey { key: String },

	#[error("No config files registered")]
	NoFiles,

	#[error("Config file with root {root} is already registered")]
	DuplicateFile { root: String },

	#[error("Failed to resolve {0} directory")]
	DirectoryNotFound(&'static str),
}

impl ConfigError {
	/// True for errors raised because a path segment or attribute is absent.
	pub fn is_key_not_found(&self) -> bool {
		matches!(
			self,
			ConfigError::NodeNotFound { .. } | ConfigError::AttributeNotFound { .. }
		)
	}
}

/// Result type alias using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;
