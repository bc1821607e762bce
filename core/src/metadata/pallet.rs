use super::storage::StorageMetadata;
use crate::{
	error::Result,
	registry::TypeId,
	scale::{decode_bytes, Decode},
	types::hex_format,
};
use codec::{Encode, Input, Output};
use serde::Serialize;

/// Calls of a pallet, described by an enum type of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct PalletCallMetadata {
	pub ty: TypeId,
}

/// Events of a pallet, described by an enum type of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct PalletEventMetadata {
	pub ty: TypeId,
}

/// Errors of a pallet, described by an enum type of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct PalletErrorMetadata {
	pub ty: TypeId,
}

macro_rules! impl_decode_for_type_ref {
	($($name:ident),*) => {$(
		impl Decode for $name {
			fn decode<I: Input>(input: &mut I) -> Result<Self> {
				Ok($name { ty: Decode::decode(input)? })
			}
		}
	)*};
}

impl_decode_for_type_ref!(PalletCallMetadata, PalletEventMetadata, PalletErrorMetadata);

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct PalletConstantMetadata {
	pub name: String,
	pub ty: TypeId,
	/// SCALE-encoded value of the constant.
	#[serde(with = "hex_format")]
	pub value: Vec<u8>,
	pub docs: Vec<String>,
}

impl Decode for PalletConstantMetadata {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		Ok(PalletConstantMetadata {
			name: Decode::decode(input)?,
			ty: Decode::decode(input)?,
			value: decode_bytes(input)?,
			docs: Decode::decode(input)?,
		})
	}
}

/// All metadata about a runtime pallet.
///
/// On the wire: `name | guard [storage] | guard [calls] | guard [event] | constants |
/// guard [error] | index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PalletMetadata {
	pub name: String,
	pub storage: Option<StorageMetadata>,
	pub calls: Option<PalletCallMetadata>,
	pub event: Option<PalletEventMetadata>,
	pub constants: Vec<PalletConstantMetadata>,
	pub error: Option<PalletErrorMetadata>,
	/// Index of the pallet in calls and events, independent of its position in the metadata.
	pub index: u8,
}

impl PalletMetadata {
	pub fn constant(&self, name: &str) -> Option<&PalletConstantMetadata> {
		self.constants.iter().find(|constant| constant.name == name)
	}

	/// Encodes every field, errors included, so that the output decodes back to `self`.
	pub fn encode_complete_to<T: Output + ?Sized>(&self, dest: &mut T) {
		self.encode_fields(dest, true)
	}

	fn encode_fields<T: Output + ?Sized>(&self, dest: &mut T, with_error: bool) {
		self.name.encode_to(dest);
		self.storage.encode_to(dest);
		self.calls.encode_to(dest);
		self.event.encode_to(dest);
		self.constants.encode_to(dest);
		if with_error {
			self.error.encode_to(dest);
		}
		self.index.encode_to(dest);
	}
}

/// Re-emits everything but the errors guard and type.
///
/// The output can't be decoded back into a [`PalletMetadata`]; use
/// [`PalletMetadata::encode_complete_to`] for that.
impl Encode for PalletMetadata {
	fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
		self.encode_fields(dest, false)
	}
}

impl Decode for PalletMetadata {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		Ok(PalletMetadata {
			name: Decode::decode(input)?,
			storage: Decode::decode(input)?,
			calls: Decode::decode(input)?,
			event: Decode::decode(input)?,
			constants: Decode::decode(input)?,
			error: Decode::decode(input)?,
			index: Decode::decode(input)?,
		})
	}
}
