use clap::{command, Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(version)]
pub struct CliOpts {
	/// Path to the toml configuration file
	#[arg(short, long, value_name = "FILE")]
	pub config: Option<String>,
	/// Path to the metadata file, raw SCALE bytes or 0x-prefixed hex
	#[arg(short, long, value_name = "FILE")]
	pub metadata: Option<String>,
	/// Metadata is preceded by its compact length, as returned by the runtime
	#[arg(long)]
	pub length_prefixed: bool,
	/// Log level
	#[arg(long)]
	pub verbosity: Option<Level>,
	/// Set logs format to JSON
	#[arg(long)]
	pub logs_json: bool,
	/// Print results as JSON
	#[arg(long)]
	pub json: bool,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// List pallets with their indices and item counts
	Pallets,
	/// Print the call index of a `Module.method` call
	Call { path: String },
	/// Print the pallet and event names of an event id
	Event { pallet_index: u8, event_index: u8 },
	/// Print a storage entry, its hashers and key prefix
	Storage { prefix: String, item: String },
	/// Print the SCALE-encoded value of a constant
	Constant { module: String, name: String },
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_subcommands() {
		let opts = CliOpts::try_parse_from([
			"chain-metadata",
			"--metadata",
			"metadata.scale",
			"--json",
			"call",
			"System.remark",
		])
		.unwrap();
		assert_eq!(opts.metadata.as_deref(), Some("metadata.scale"));
		assert!(opts.json);
		assert_eq!(
			opts.command,
			Command::Call {
				path: "System.remark".to_string()
			}
		);

		let opts = CliOpts::try_parse_from(["chain-metadata", "event", "2", "1"]).unwrap();
		assert_eq!(
			opts.command,
			Command::Event {
				pallet_index: 2,
				event_index: 1
			}
		);

		assert!(CliOpts::try_parse_from(["chain-metadata", "event", "256", "1"]).is_err());
	}
}
