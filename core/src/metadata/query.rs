//! Name and index lookups over decoded metadata.

use super::{
	storage::{storage_prefix, StorageEntryMetadata},
	MetadataV14,
};
use crate::{
	error::{Error, Result},
	registry::{TypeId, Variant},
	types::{CallIndex, EventId},
};
use tracing::trace;

impl MetadataV14 {
	pub fn exists_module(&self, name: &str) -> bool {
		self.pallets.iter().any(|pallet| pallet.name == name)
	}

	/// Indices to put in front of an encoded call to `module.method`.
	pub fn find_call_index(&self, module: &str, method: &str) -> Result<CallIndex> {
		trace!(module, method, "Looking up call index");
		let pallet = self
			.pallet(module)
			.ok_or_else(|| Error::ModuleNotFound(module.to_string()))?;
		let method_not_found = || Error::MethodNotFound {
			module: module.to_string(),
			method: method.to_string(),
		};

		let calls = pallet.calls.as_ref().ok_or_else(method_not_found)?;
		let variant = self
			.variants(&calls.ty)?
			.iter()
			.find(|variant| variant.name == method)
			.ok_or_else(method_not_found)?;

		Ok(CallIndex {
			section_index: pallet.index,
			method_index: variant.index,
		})
	}

	/// Same as [`MetadataV14::find_call_index`] with a `Module.method` path.
	pub fn find_call_index_path(&self, call: &str) -> Result<CallIndex> {
		let (module, method) = call.split_once('.').unwrap_or((call, ""));
		self.find_call_index(module, method)
	}

	/// Names of the pallet and of the event identified by `event_id`.
	pub fn find_event_names(&self, event_id: EventId) -> Result<(&str, &str)> {
		let EventId([module_index, event_index]) = event_id;
		trace!(module_index, event_index, "Looking up event names");

		// Pallets without events don't count.
		let (pallet, events) = self
			.pallets
			.iter()
			.find_map(|pallet| match &pallet.event {
				Some(events) if pallet.index == module_index => Some((pallet, events)),
				_ => None,
			})
			.ok_or(Error::ModuleIndexOutOfRange(module_index))?;

		let variant = self
			.variants(&events.ty)?
			.iter()
			.find(|variant| variant.index == event_index)
			.ok_or_else(|| Error::EventNotFound {
				module: pallet.name.clone(),
				index: event_index,
			})?;

		Ok((pallet.name.as_str(), variant.name.as_str()))
	}

	/// Looks up a storage entry by the storage prefix of its pallet, which usually but not
	/// necessarily is the pallet name.
	pub fn find_storage_entry(&self, prefix: &str, item: &str) -> Result<&StorageEntryMetadata> {
		trace!(prefix, item, "Looking up storage entry");
		let storage = self
			.pallets
			.iter()
			.filter_map(|pallet| pallet.storage.as_ref())
			.find(|storage| storage.prefix == prefix)
			.ok_or_else(|| Error::ModuleNotFound(prefix.to_string()))?;

		storage.entry(item).ok_or_else(|| Error::StorageNotFound {
			module: prefix.to_string(),
			item: item.to_string(),
		})
	}

	/// SCALE-encoded value of a pallet constant.
	pub fn find_constant_value(&self, module: &str, constant: &str) -> Result<&[u8]> {
		trace!(module, constant, "Looking up constant");
		self.pallet(module)
			.and_then(|pallet| pallet.constant(constant))
			.map(|constant| &constant.value[..])
			.ok_or_else(|| Error::ConstantNotFound {
				module: module.to_string(),
				constant: constant.to_string(),
			})
	}

	/// Variants of the calls or events type of a pallet. Non-enum types have none.
	fn variants(&self, ty: &TypeId) -> Result<&[Variant]> {
		Ok(self.lookup.resolve(ty)?.def.variants())
	}
}

/// Storage key under which the runtime stores the events of the current block.
pub fn events_storage_key(metadata: &MetadataV14) -> Result<[u8; 32]> {
	let system = metadata
		.pallets
		.iter()
		.find(|pallet| pallet.name == "System")
		.and_then(|pallet| pallet.storage.as_ref())
		.ok_or_else(|| Error::ModuleNotFound("System".to_string()))?;

	let events = system
		.entry("Events")
		.ok_or_else(|| Error::StorageNotFound {
			module: system.prefix.clone(),
			item: "Events".to_string(),
		})?;

	if !events.is_plain() {
		return Err(Error::WrongStorageShape {
			accessor: "plain key",
			actual: events.shape(),
		});
	}

	Ok(storage_prefix(&system.prefix, &events.name))
}
