//! Runtime-provided metadata
//!
//! From the point of the view of the Substrate/Polkadot client, the runtime is a program
//! compiled to WebAssembly that provides a certain list of entry points and has access to a
//! *storage* (provided by the client) as a way to hold information.
//!
//! In order to be able to query an information, for example the amount of tokens present on a
//! certain account, the client can directly read the storage rather than having to enter the
//! WebAssembly code. This is where the *metadata* comes into play.
//!
//! The *metadata* is a collection of data provided by the runtime and that contains useful
//! information to the client, such as:
//!
//! - A registry of every type the runtime exposes, see [`crate::registry`].
//! - A list of storage keys whose value contains information that might be useful to the client.
//! - A list of calls that can be performed by emitting transactions.
//! - A list of *events* that can happen in a block, such as a new account.
//! - ...
//!
//! Only version 14 of the metadata is supported. Its layout is:
//!
//! ```text
//! "meta" | 14 | registry | pallets | extrinsic | runtime type id
//! ```
//!
//! Once decoded, a [`MetadataV14`] is never modified and can be shared between threads. Name
//! and index lookups are implemented in the `query` submodule.

use crate::{
	error::{Error, Result},
	registry::{PortableRegistry, TypeId},
	scale::{decode_all, read_array, read_byte, CompactInteger, Decode},
};
use codec::{Encode, Input, Output};
use serde::Serialize;
use tracing::debug;

pub mod pallet;
mod query;
pub mod storage;

pub use pallet::*;
pub use query::events_storage_key;
pub use storage::*;

/// Magic number found at the start of the metadata, `"meta"` in ASCII. Decoding it also
/// catches badly handled endianness.
pub const MAGIC_NUMBER: [u8; 4] = *b"meta";

pub const METADATA_VERSION: u8 = 14;

/// Decodes the given SCALE-encoded metadata, magic number and version byte included.
pub fn decode(scale_encoded_metadata: &[u8]) -> Result<MetadataV14> {
	let mut input = scale_encoded_metadata;
	let magic: [u8; 4] = read_array(&mut input, "magic number")?;
	if magic != MAGIC_NUMBER {
		return Err(Error::InvalidMagic(magic));
	}
	let version = read_byte(&mut input, "metadata version")?;
	if version != METADATA_VERSION {
		return Err(Error::UnsupportedVersion(version));
	}
	MetadataV14::from_bytes(input)
}

/// Removes the compact length prefix that the `Metadata_metadata` runtime entry point puts in
/// front of the metadata. Fails if the prefix doesn't match the length of what follows.
pub fn remove_length_prefix(metadata: &[u8]) -> Result<&[u8]> {
	let (length, prefix_len) =
		CompactInteger::decode_from_slice(metadata).map_err(|_| Error::BadLengthPrefix)?;
	let after_prefix = &metadata[prefix_len..];

	if length.to_usize() != Some(after_prefix.len()) {
		return Err(Error::BadLengthPrefix);
	}

	Ok(after_prefix)
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct SignedExtensionMetadata {
	pub identifier: String,
	pub ty: TypeId,
	pub additional_signed: TypeId,
}

impl Decode for SignedExtensionMetadata {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		Ok(SignedExtensionMetadata {
			identifier: Decode::decode(input)?,
			ty: Decode::decode(input)?,
			additional_signed: Decode::decode(input)?,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct ExtrinsicMetadata {
	/// Type of the extrinsic.
	pub ty: TypeId,
	/// Extrinsic version.
	pub version: u8,
	/// The signed extensions in the order they appear in the extrinsic.
	pub signed_extensions: Vec<SignedExtensionMetadata>,
}

impl Decode for ExtrinsicMetadata {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		Ok(ExtrinsicMetadata {
			ty: Decode::decode(input)?,
			version: Decode::decode(input)?,
			signed_extensions: Decode::decode(input)?,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataV14 {
	pub lookup: PortableRegistry,
	pub pallets: Vec<PalletMetadata>,
	pub extrinsic: ExtrinsicMetadata,
	/// Type of the runtime itself.
	pub ty: TypeId,
}

impl MetadataV14 {
	/// Decodes metadata without magic number and version byte. All of `bytes` must be used.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		let metadata: MetadataV14 = decode_all(bytes)?;
		debug!(
			types = metadata.lookup.len(),
			pallets = metadata.pallets.len(),
			extrinsic_version = metadata.extrinsic.version,
			"Decoded metadata"
		);
		Ok(metadata)
	}

	pub fn pallet(&self, name: &str) -> Option<&PalletMetadata> {
		self.pallets.iter().find(|pallet| pallet.name == name)
	}

	/// Encodes every field, registry and runtime type included, so that the output decodes back
	/// to `self` through [`MetadataV14::from_bytes`].
	pub fn encode_complete(&self) -> Vec<u8> {
		let mut out = Vec::new();
		self.encode_complete_to(&mut out);
		out
	}

	/// Same as [`MetadataV14::encode_complete`], preceded by magic number and version, as
	/// expected by [`decode`].
	pub fn encode_prefixed(&self) -> Vec<u8> {
		let mut out = MAGIC_NUMBER.to_vec();
		out.push(METADATA_VERSION);
		self.encode_complete_to(&mut out);
		out
	}

	fn encode_complete_to<T: Output + ?Sized>(&self, dest: &mut T) {
		self.lookup.encode_to(dest);
		CompactInteger::from(self.pallets.len()).encode_to(dest);
		for pallet in &self.pallets {
			pallet.encode_complete_to(dest);
		}
		self.extrinsic.encode_to(dest);
		self.ty.encode_to(dest);
	}
}

/// Re-emits the pallets, in their partial form, and the extrinsic metadata only.
///
/// Neither the registry nor the runtime type is part of the output, so it can't be decoded back;
/// use [`MetadataV14::encode_complete`] for that.
impl Encode for MetadataV14 {
	fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
		self.pallets.encode_to(dest);
		self.extrinsic.encode_to(dest);
	}
}

impl Decode for MetadataV14 {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		Ok(MetadataV14 {
			lookup: Decode::decode(input)?,
			pallets: Decode::decode(input)?,
			extrinsic: Decode::decode(input)?,
			ty: Decode::decode(input)?,
		})
	}
}
