use chain_metadata_core::types::tracing_level_format;
use serde::{Deserialize, Serialize};
use tracing::Level;

/// Representation of a configuration used by this project.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
	/// Path to the metadata file, raw SCALE bytes or 0x-prefixed hex (default: "metadata.scale").
	pub metadata_path: String,
	/// Set to true if the metadata is preceded by its compact encoded length, which is the case for the output of the `Metadata_metadata` runtime call (default: false).
	pub length_prefixed: bool,
	/// Log level, default is `INFO`. See `<https://docs.rs/log/0.4.14/log/enum.LevelFilter.html>` for possible log level values. (default: `INFO`).
	#[serde(with = "tracing_level_format")]
	pub log_level: Level,
	/// If set to true, logs are displayed in JSON format, which is used for structured logging. Otherwise, plain text format is used (default: false).
	pub log_format_json: bool,
	/// If set to true, command results are printed as JSON (default: false).
	pub output_json: bool,
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		RuntimeConfig {
			metadata_path: "metadata.scale".to_owned(),
			length_prefixed: false,
			log_level: Level::INFO,
			log_format_json: false,
			output_json: false,
		}
	}
}
