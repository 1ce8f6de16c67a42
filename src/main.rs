use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use strata_config::provider::{self, ConfigProvider};
use strata_config::{
	ConfigFile, DEFAULT_SEPARATOR, FileOptions, IniProvider, TomlProvider, XmlProvider,
};

#[derive(Parser)]
#[command(name = "strata")]
#[command(
	author,
	version,
	about = "Read and write layered configuration files"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	/// Log debug output to stderr
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the value stored at a key
	Get {
		#[command(flatten)]
		source: SourceArgs,

		/// Dotted key, optionally starting with the root name
		key: String,
	},
	/// Change the value stored at a key and save it to --save-dir
	Set {
		#[command(flatten)]
		source: SourceArgs,

		/// Dotted key, optionally starting with the root name
		key: String,

		/// New value
		value: String,
	},
	/// Print every key with its effective value
	Show {
		#[command(flatten)]
		source: SourceArgs,
	},
}

#[derive(Args)]
struct SourceArgs {
	/// Definition document that fixes the available keys
	definition: PathBuf,

	/// Directory holding an overlay copy of the definition (later ones win)
	#[arg(long = "overlay", value_name = "DIR")]
	overlays: Vec<PathBuf>,

	/// Directory that receives changed values; also read as the last overlay
	#[arg(long, value_name = "DIR")]
	save_dir: Option<PathBuf>,

	/// Key segment separator
	#[arg(long, default_value_t = DEFAULT_SEPARATOR)]
	separator: char,

	/// Match keys case-sensitively
	#[arg(long)]
	case_sensitive: bool,

	/// Document format (default: from the definition's extension)
	#[arg(long, value_enum)]
	format: Option<Format>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
	Xml,
	Ini,
	Toml,
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
	let subscriber = FmtSubscriber::builder()
		.with_max_level(level)
		.with_writer(std::io::stderr)
		.finish();
	tracing::subscriber::set_global_default(subscriber)
		.context("Failed to install log subscriber")?;

	match cli.command {
		Commands::Get { source, key } => handle_get(&source, &key),
		Commands::Set { source, key, value } => handle_set(&source, &key, value),
		Commands::Show { source } => handle_show(&source),
	}
}

fn open_file(source: &SourceArgs) -> Result<ConfigFile> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let options = FileOptions {
		separator: source.separator,
		ignore_case: !source.case_sensitive,
		base_dir: Some(cwd),
	};

	let provider: Box<dyn ConfigProvider> = match source.format {
		Some(Format::Xml) => Box::new(XmlProvider),
		Some(Format::Ini) => Box::new(IniProvider),
		Some(Format::Toml) => Box::new(TomlProvider),
		None => provider::for_path(&source.definition).with_context(|| {
			format!(
				"Cannot tell the format of {}, pass --format",
				source.definition.display()
			)
		})?,
	};

	let mut file = ConfigFile::load_with_options(&source.definition, provider, options)
		.with_context(|| format!("Failed to load {}", source.definition.display()))?;

	for overlay in &source.overlays {
		file.add_location(overlay, false)
			.with_context(|| format!("Failed to apply overlay in {}", overlay.display()))?;
	}
	if let Some(ref save_dir) = source.save_dir {
		file.add_location(save_dir, true)
			.with_context(|| format!("Failed to apply overlay in {}", save_dir.display()))?;
	}

	Ok(file)
}

fn handle_get(source: &SourceArgs, key: &str) -> Result<ExitCode> {
	let file = open_file(source)?;
	let value = file.get(key).with_context(|| format!("Failed to read {key}"))?;
	println!("{value}");
	Ok(ExitCode::SUCCESS)
}

fn handle_set(source: &SourceArgs, key: &str, value: String) -> Result<ExitCode> {
	if source.save_dir.is_none() {
		anyhow::bail!("set needs --save-dir to know where to write the change");
	}

	let mut file = open_file(source)?;
	file.set(key, value)
		.with_context(|| format!("Failed to set {key}"))?;
	file.save().context("Failed to save changes")?;

	if let Some(location) = file.save_location() {
		println!("Saved {} to {}", key, location.display());
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_show(source: &SourceArgs) -> Result<ExitCode> {
	let file = open_file(source)?;

	println!("# Definition: {}", file.definition_file().display());
	println!("# Root: {}", file.root_key());
	for (key, value) in file.entries() {
		println!("{key} = {value}");
	}

	Ok(ExitCode::SUCCESS)
}
