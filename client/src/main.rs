use crate::cli::{CliOpts, Command};
use crate::config::RuntimeConfig;
use chain_metadata_core::{
	metadata::{self, storage_prefix, MetadataV14, StorageEntryMetadata, StorageHasher},
	types::EventId,
	utils::{default_subscriber, install_panic_hooks, json_subscriber},
};
use clap::Parser;
use color_eyre::{
	eyre::{eyre, WrapErr},
	Result,
};
use serde::Serialize;
use std::fs;
use tracing::{info, span, Level};

mod cli;
mod config;

pub fn load_runtime_config(opts: &CliOpts) -> Result<RuntimeConfig> {
	let mut cfg = if let Some(config_path) = &opts.config {
		fs::metadata(config_path).map_err(|_| eyre!("Provided config file doesn't exist."))?;
		confy::load_path(config_path)
			.wrap_err(format!("Failed to load configuration from {}", config_path))?
	} else {
		RuntimeConfig::default()
	};

	cfg.log_format_json = opts.logs_json || cfg.log_format_json;
	cfg.log_level = opts.verbosity.unwrap_or(cfg.log_level);

	// Flags override the config parameters
	if let Some(metadata_path) = &opts.metadata {
		cfg.metadata_path = metadata_path.to_string();
	}
	cfg.length_prefixed |= opts.length_prefixed;
	cfg.output_json |= opts.json;

	Ok(cfg)
}

/// Metadata files hold either raw SCALE bytes or their `0x`-prefixed hex encoding, as returned
/// by the `state_getMetadata` RPC.
fn metadata_bytes(file_content: Vec<u8>) -> Result<Vec<u8>> {
	let Some(hex_encoded) = file_content.trim_ascii().strip_prefix(b"0x") else {
		return Ok(file_content);
	};
	hex::decode(hex_encoded).wrap_err("Failed to decode hex encoded metadata")
}

fn load_metadata(cfg: &RuntimeConfig) -> Result<MetadataV14> {
	let file_content = fs::read(&cfg.metadata_path)
		.wrap_err(format!("Failed to read metadata from {}", cfg.metadata_path))?;
	let bytes = metadata_bytes(file_content)?;

	let bytes = if cfg.length_prefixed {
		metadata::remove_length_prefix(&bytes)?
	} else {
		&bytes[..]
	};

	let metadata = metadata::decode(bytes).wrap_err("Failed to decode metadata")?;
	info!(
		path = %cfg.metadata_path,
		pallets = metadata.pallets.len(),
		"Loaded metadata"
	);
	Ok(metadata)
}

#[derive(Serialize)]
struct PalletSummary<'a> {
	name: &'a str,
	index: u8,
	storage_entries: usize,
	calls: bool,
	events: bool,
	constants: usize,
	errors: bool,
}

#[derive(Serialize)]
struct StorageSummary<'a> {
	#[serde(flatten)]
	entry: &'a StorageEntryMetadata,
	key_hashers: Vec<StorageHasher>,
	key_prefix: String,
}

/// Hashers of every key component, in order. Plain entries have no key.
fn key_hashers(entry: &StorageEntryMetadata) -> Result<Vec<StorageHasher>> {
	let hashers = if entry.is_plain() {
		vec![]
	} else if entry.is_n_map() {
		entry.hashers()?
	} else if entry.is_double_map() {
		vec![entry.hasher()?, entry.second_hasher()?]
	} else {
		vec![entry.hasher()?]
	};
	Ok(hashers)
}

fn print<T: Serialize>(json: bool, value: &T, plain: impl FnOnce() -> String) -> Result<()> {
	if json {
		println!("{}", serde_json::to_string_pretty(value)?);
	} else {
		println!("{}", plain());
	}
	Ok(())
}

fn run(metadata: &MetadataV14, command: &Command, json: bool) -> Result<()> {
	match command {
		Command::Pallets => {
			let pallets = metadata
				.pallets
				.iter()
				.map(|pallet| PalletSummary {
					name: &pallet.name,
					index: pallet.index,
					storage_entries: pallet
						.storage
						.as_ref()
						.map_or(0, |storage| storage.entries.len()),
					calls: pallet.calls.is_some(),
					events: pallet.event.is_some(),
					constants: pallet.constants.len(),
					errors: pallet.error.is_some(),
				})
				.collect::<Vec<_>>();
			print(json, &pallets, || {
				pallets
					.iter()
					.map(|pallet| format!("{:>3} {}", pallet.index, pallet.name))
					.collect::<Vec<_>>()
					.join("\n")
			})
		},
		Command::Call { path } => {
			let call_index = metadata.find_call_index_path(path)?;
			print(json, &call_index, || {
				format!("{path}: {call_index} (0x{})", hex::encode(call_index.to_bytes()))
			})
		},
		Command::Event {
			pallet_index,
			event_index,
		} => {
			let (module, event) =
				metadata.find_event_names(EventId([*pallet_index, *event_index]))?;
			print(json, &(module, event), || format!("{module}.{event}"))
		},
		Command::Storage { prefix, item } => {
			let entry = metadata.find_storage_entry(prefix, item)?;
			let summary = StorageSummary {
				entry,
				key_hashers: key_hashers(entry)?,
				key_prefix: format!("0x{}", hex::encode(storage_prefix(prefix, item))),
			};
			print(json, &summary, || {
				let hashers = summary
					.key_hashers
					.iter()
					.map(StorageHasher::to_string)
					.collect::<Vec<_>>()
					.join(", ");
				format!(
					"{prefix}.{item}: {} [{hashers}] {}",
					entry.shape(),
					summary.key_prefix
				)
			})
		},
		Command::Constant { module, name } => {
			let value = format!(
				"0x{}",
				hex::encode(metadata.find_constant_value(module, name)?)
			);
			print(json, &value, || format!("{module}.{name}: {value}"))
		},
	}
}

pub fn main() -> Result<()> {
	let opts = CliOpts::parse();
	let cfg = load_runtime_config(&opts)?;

	if cfg.log_format_json {
		tracing::subscriber::set_global_default(json_subscriber(cfg.log_level))?;
	} else {
		tracing::subscriber::set_global_default(default_subscriber(cfg.log_level))?;
	};

	// install custom panic hooks
	install_panic_hooks()?;

	let span = span!(Level::INFO, "run", command = ?opts.command);
	let _enter = span.enter();

	let metadata = load_metadata(&cfg)?;
	run(&metadata, &opts.command, cfg.output_json)
		.wrap_err(format!("Command {:?} failed", opts.command))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chain_metadata_core::{
		metadata::{StorageEntryModifier, StorageEntryType},
		Error,
	};
	use hex_literal::hex;
	use test_case::test_case;

	#[test_case(b"meta\x0e".to_vec() => hex!("6d657461 0e").to_vec() ; "raw bytes")]
	#[test_case(b"0x6d6574610e\n".to_vec() => hex!("6d657461 0e").to_vec() ; "hex with newline")]
	#[test_case(b"  0x".to_vec() => Vec::<u8>::new() ; "empty hex")]
	fn reads_raw_and_hex_files(file_content: Vec<u8>) -> Vec<u8> {
		metadata_bytes(file_content).unwrap()
	}

	#[test]
	fn invalid_hex_is_rejected() {
		assert!(metadata_bytes(b"0xzz".to_vec()).is_err());
	}

	fn entry(ty: StorageEntryType) -> StorageEntryMetadata {
		StorageEntryMetadata {
			name: "Entry".to_string(),
			modifier: StorageEntryModifier::Optional,
			ty,
			fallback: vec![0],
			docs: vec![],
		}
	}

	#[test]
	fn key_hashers_follow_shape() {
		assert_eq!(
			key_hashers(&entry(StorageEntryType::Plain(0u32.into()))).unwrap(),
			Vec::<StorageHasher>::new()
		);
		assert_eq!(
			key_hashers(&entry(StorageEntryType::DoubleMap {
				hasher: StorageHasher::Blake2_128Concat,
				key1: 0u32.into(),
				key2: 1u32.into(),
				value: 2u32.into(),
				key2_hasher: StorageHasher::Twox64Concat,
			}))
			.unwrap(),
			vec![StorageHasher::Blake2_128Concat, StorageHasher::Twox64Concat]
		);

		let missing = key_hashers(&entry(StorageEntryType::Map {
			hashers: vec![],
			key: 0u32.into(),
			value: 1u32.into(),
		}))
		.unwrap_err();
		assert_eq!(
			missing.downcast_ref::<Error>(),
			Some(&Error::MissingHasher("Entry".to_string()))
		);
	}

	#[test]
	fn flags_override_config() {
		let opts = CliOpts::parse_from([
			"chain-metadata",
			"--metadata",
			"runtime.hex",
			"--length-prefixed",
			"--verbosity",
			"debug",
			"pallets",
		]);
		let cfg = load_runtime_config(&opts).unwrap();
		assert_eq!(
			cfg,
			RuntimeConfig {
				metadata_path: "runtime.hex".to_string(),
				length_prefixed: true,
				log_level: Level::DEBUG,
				..Default::default()
			}
		);
	}
}
