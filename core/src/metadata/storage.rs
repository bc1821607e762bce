//! Storage entries and the hashers used to derive their keys.
//!
//! The key of a storage value is `twox128(pallet prefix) ++ twox128(entry name)`, followed, for
//! maps, by every map key passed through the hasher declared for it. Which hasher applies to
//! which key depends on the shape of the entry, see [`StorageEntryMetadata::hasher`],
//! [`StorageEntryMetadata::second_hasher`] and [`StorageEntryMetadata::hashers`].

use crate::{
	error::{Error, Result},
	registry::TypeId,
	scale::{decode_bytes, read_byte, Decode},
	types::hex_format,
};
use codec::{Encode, Input};
use serde::Serialize;
use std::hash::Hasher as _;
use strum::{FromRepr, IntoStaticStr};
use twox_hash::XxHash64;

/// Storage items of one pallet.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct StorageMetadata {
	/// Common prefix of every entry key. Not necessarily equal to the pallet name.
	pub prefix: String,
	pub entries: Vec<StorageEntryMetadata>,
}

impl StorageMetadata {
	pub fn entry(&self, name: &str) -> Option<&StorageEntryMetadata> {
		self.entries.iter().find(|entry| entry.name == name)
	}
}

impl Decode for StorageMetadata {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		Ok(StorageMetadata {
			prefix: Decode::decode(input)?,
			entries: Decode::decode(input)?,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct StorageEntryMetadata {
	pub name: String,
	pub modifier: StorageEntryModifier,
	pub ty: StorageEntryType,
	/// Value returned when nothing is stored under the key.
	#[serde(with = "hex_format")]
	pub fallback: Vec<u8>,
	pub docs: Vec<String>,
}

impl Decode for StorageEntryMetadata {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		Ok(StorageEntryMetadata {
			name: Decode::decode(input)?,
			modifier: Decode::decode(input)?,
			ty: Decode::decode(input)?,
			fallback: decode_bytes(input)?,
			docs: Decode::decode(input)?,
		})
	}
}

impl StorageEntryMetadata {
	pub fn is_plain(&self) -> bool {
		matches!(self.ty, StorageEntryType::Plain(_))
	}

	pub fn is_map(&self) -> bool {
		matches!(self.ty, StorageEntryType::Map { .. })
	}

	pub fn is_double_map(&self) -> bool {
		matches!(self.ty, StorageEntryType::DoubleMap { .. })
	}

	pub fn is_n_map(&self) -> bool {
		matches!(self.ty, StorageEntryType::NMap { .. })
	}

	/// Name of the shape of the entry: `Plain`, `Map`, `DoubleMap` or `NMap`.
	pub fn shape(&self) -> &'static str {
		(&self.ty).into()
	}

	/// Hasher of the first key.
	///
	/// Plain entries have no key and use [`StorageHasher::Twox128`]. Fails for N-maps, whose
	/// hashers come from [`StorageEntryMetadata::hashers`].
	pub fn hasher(&self) -> Result<StorageHasher> {
		match &self.ty {
			StorageEntryType::Plain(_) => Ok(StorageHasher::Twox128),
			StorageEntryType::Map { hashers, .. } => hashers
				.first()
				.copied()
				.ok_or_else(|| Error::MissingHasher(self.name.clone())),
			StorageEntryType::DoubleMap { hasher, .. } => Ok(*hasher),
			StorageEntryType::NMap { .. } => Err(self.wrong_shape("hasher")),
		}
	}

	/// Hasher of the second key of a double map.
	pub fn second_hasher(&self) -> Result<StorageHasher> {
		match &self.ty {
			StorageEntryType::DoubleMap { key2_hasher, .. } => Ok(*key2_hasher),
			_ => Err(self.wrong_shape("second hasher")),
		}
	}

	/// Hashers of an N-map, one per key component, in declaration order.
	pub fn hashers(&self) -> Result<Vec<StorageHasher>> {
		match &self.ty {
			StorageEntryType::NMap { hashers, .. } => Ok(hashers.clone()),
			_ => Err(self.wrong_shape("hasher list")),
		}
	}

	fn wrong_shape(&self, accessor: &'static str) -> Error {
		Error::WrongStorageShape {
			accessor,
			actual: self.shape(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Serialize, FromRepr)]
#[repr(u8)]
pub enum StorageEntryModifier {
	/// Missing values read as `None`.
	Optional = 0,
	/// Missing values read as the entry fallback.
	Default = 1,
}

impl Decode for StorageEntryModifier {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		let discriminant = read_byte(input, "StorageEntryModifier")?;
		StorageEntryModifier::from_repr(discriminant).ok_or(Error::UnknownVariant {
			type_name: "StorageEntryModifier",
			discriminant,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize, IntoStaticStr)]
pub enum StorageEntryType {
	Plain(TypeId),
	Map {
		hashers: Vec<StorageHasher>,
		key: TypeId,
		value: TypeId,
	},
	DoubleMap {
		hasher: StorageHasher,
		key1: TypeId,
		key2: TypeId,
		value: TypeId,
		key2_hasher: StorageHasher,
	},
	NMap {
		keys: Vec<TypeId>,
		hashers: Vec<StorageHasher>,
		value: TypeId,
	},
}

impl Decode for StorageEntryType {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		let ty = match read_byte(input, "StorageEntryType")? {
			0 => StorageEntryType::Plain(Decode::decode(input)?),
			1 => StorageEntryType::Map {
				hashers: Decode::decode(input)?,
				key: Decode::decode(input)?,
				value: Decode::decode(input)?,
			},
			2 => StorageEntryType::DoubleMap {
				hasher: Decode::decode(input)?,
				key1: Decode::decode(input)?,
				key2: Decode::decode(input)?,
				value: Decode::decode(input)?,
				key2_hasher: Decode::decode(input)?,
			},
			3 => StorageEntryType::NMap {
				keys: Decode::decode(input)?,
				hashers: Decode::decode(input)?,
				value: Decode::decode(input)?,
			},
			discriminant => {
				return Err(Error::UnknownVariant {
					type_name: "StorageEntryType",
					discriminant,
				})
			},
		};
		Ok(ty)
	}
}

/// Hash function applied to a storage map key.
///
/// `*Concat` hashers append the unhashed key after the hash so that keys can be recovered when
/// iterating over a map.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Serialize, FromRepr, strum::Display,
)]
#[repr(u8)]
pub enum StorageHasher {
	Blake2_128 = 0,
	Blake2_256 = 1,
	Blake2_128Concat = 2,
	Twox128 = 3,
	Twox256 = 4,
	Twox64Concat = 5,
	Identity = 6,
}

impl StorageHasher {
	pub fn hash(&self, data: &[u8]) -> Vec<u8> {
		match self {
			StorageHasher::Blake2_128 => blake2::<16>(data).to_vec(),
			StorageHasher::Blake2_256 => blake2::<32>(data).to_vec(),
			StorageHasher::Blake2_128Concat => [&blake2::<16>(data)[..], data].concat(),
			StorageHasher::Twox128 => twox(data, 2),
			StorageHasher::Twox256 => twox(data, 4),
			StorageHasher::Twox64Concat => [twox(data, 1), data.to_vec()].concat(),
			StorageHasher::Identity => data.to_vec(),
		}
	}

	/// Whether the hash is followed by the original data.
	pub fn is_concat(&self) -> bool {
		matches!(
			self,
			StorageHasher::Blake2_128Concat | StorageHasher::Twox64Concat | StorageHasher::Identity
		)
	}
}

impl Decode for StorageHasher {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		let discriminant = read_byte(input, "StorageHasher")?;
		StorageHasher::from_repr(discriminant).ok_or(Error::UnknownVariant {
			type_name: "StorageHasher",
			discriminant,
		})
	}
}

fn blake2<const N: usize>(data: &[u8]) -> [u8; N] {
	blake2b_simd::Params::new()
		.hash_length(N)
		.hash(data)
		.as_bytes()
		.try_into()
		.expect("slice is always the necessary length")
}

/// XXHash64 of `data` with seeds `0..rounds`, concatenated in little endian.
fn twox(data: &[u8], rounds: u64) -> Vec<u8> {
	(0..rounds)
		.flat_map(|seed| {
			let mut hasher = XxHash64::with_seed(seed);
			hasher.write(data);
			hasher.finish().to_le_bytes()
		})
		.collect()
}

/// Key prefix shared by every value of a storage entry.
pub fn storage_prefix(pallet_prefix: &str, entry: &str) -> [u8; 32] {
	let mut out = [0; 32];
	out[..16].copy_from_slice(&StorageHasher::Twox128.hash(pallet_prefix.as_bytes()));
	out[16..].copy_from_slice(&StorageHasher::Twox128.hash(entry.as_bytes()));
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scale::decode_all;
	use hex_literal::hex;
	use test_case::test_case;

	fn entry(ty: StorageEntryType) -> StorageEntryMetadata {
		StorageEntryMetadata {
			name: "Entry".to_string(),
			modifier: StorageEntryModifier::Default,
			ty,
			fallback: vec![0],
			docs: vec![],
		}
	}

	fn map(hashers: Vec<StorageHasher>) -> StorageEntryMetadata {
		entry(StorageEntryType::Map {
			hashers,
			key: 1u32.into(),
			value: 2u32.into(),
		})
	}

	fn double_map() -> StorageEntryMetadata {
		entry(StorageEntryType::DoubleMap {
			hasher: StorageHasher::Blake2_128Concat,
			key1: 1u32.into(),
			key2: 2u32.into(),
			value: 3u32.into(),
			key2_hasher: StorageHasher::Twox64Concat,
		})
	}

	fn n_map() -> StorageEntryMetadata {
		entry(StorageEntryType::NMap {
			keys: vec![1u32.into(), 2u32.into(), 3u32.into()],
			hashers: vec![
				StorageHasher::Blake2_128Concat,
				StorageHasher::Twox64Concat,
				StorageHasher::Identity,
			],
			value: 4u32.into(),
		})
	}

	#[test]
	fn plain_entries_use_twox128() {
		let plain = entry(StorageEntryType::Plain(5u32.into()));
		assert!(plain.is_plain());
		assert_eq!(plain.hasher(), Ok(StorageHasher::Twox128));
		assert_eq!(
			plain.second_hasher(),
			Err(Error::WrongStorageShape {
				accessor: "second hasher",
				actual: "Plain"
			})
		);
	}

	#[test]
	fn map_selects_its_declared_hasher() {
		let map = map(vec![StorageHasher::Blake2_128Concat]);
		assert!(map.is_map());
		assert_eq!(map.hasher(), Ok(StorageHasher::Blake2_128Concat));
		assert_eq!(
			map.second_hasher(),
			Err(Error::WrongStorageShape {
				accessor: "second hasher",
				actual: "Map"
			})
		);
		assert_eq!(
			map.hashers(),
			Err(Error::WrongStorageShape {
				accessor: "hasher list",
				actual: "Map"
			})
		);
	}

	#[test]
	fn map_without_hasher() {
		assert_eq!(
			map(vec![]).hasher(),
			Err(Error::MissingHasher("Entry".to_string()))
		);
	}

	#[test]
	fn double_map_has_two_independent_hashers() {
		let double_map = double_map();
		assert!(double_map.is_double_map());
		assert_eq!(double_map.hasher(), Ok(StorageHasher::Blake2_128Concat));
		assert_eq!(double_map.second_hasher(), Ok(StorageHasher::Twox64Concat));
		assert!(double_map.hashers().is_err());
	}

	#[test]
	fn n_map_returns_hashers_in_declared_order() {
		let n_map = n_map();
		assert!(n_map.is_n_map());
		assert_eq!(
			n_map.hashers(),
			Ok(vec![
				StorageHasher::Blake2_128Concat,
				StorageHasher::Twox64Concat,
				StorageHasher::Identity,
			])
		);
		assert_eq!(
			n_map.hasher(),
			Err(Error::WrongStorageShape {
				accessor: "hasher",
				actual: "NMap"
			})
		);
		assert!(n_map.second_hasher().is_err());
	}

	#[test]
	fn storage_entry_type_table() {
		for entry in [
			entry(StorageEntryType::Plain(5u32.into())),
			map(vec![StorageHasher::Twox64Concat, StorageHasher::Identity]),
			double_map(),
			n_map(),
		] {
			let encoded = entry.encode();
			assert_eq!(decode_all::<StorageEntryMetadata>(&encoded), Ok(entry));
		}

		// Name "E", modifier Default, Plain(type 5), fallback [0], no docs.
		let plain = hex!("04 45 01 00 14 04 00 00");
		assert_eq!(
			decode_all::<StorageEntryMetadata>(&plain).map(|entry| entry.ty),
			Ok(StorageEntryType::Plain(5u32.into()))
		);

		let unknown = hex!("04 45 01 04 14 04 00 00");
		assert_eq!(
			decode_all::<StorageEntryMetadata>(&unknown),
			Err(Error::UnknownVariant {
				type_name: "StorageEntryType",
				discriminant: 4
			})
		);

		let bad_modifier = hex!("04 45 02 00 14 04 00 00");
		assert_eq!(
			decode_all::<StorageEntryMetadata>(&bad_modifier),
			Err(Error::UnknownVariant {
				type_name: "StorageEntryModifier",
				discriminant: 2
			})
		);
	}

	#[test_case(0 => StorageHasher::Blake2_128)]
	#[test_case(2 => StorageHasher::Blake2_128Concat)]
	#[test_case(5 => StorageHasher::Twox64Concat)]
	#[test_case(6 => StorageHasher::Identity)]
	fn hasher_discriminant(discriminant: u8) -> StorageHasher {
		decode_all(&[discriminant]).unwrap()
	}

	#[test]
	fn known_hashes() {
		assert_eq!(
			StorageHasher::Twox128.hash(b"System"),
			hex!("26aa394eea5630e07c48ae0c9558cef7")
		);
		assert_eq!(
			StorageHasher::Twox64Concat.hash(b""),
			hex!("99e9d85137db46ef")
		);
		assert_eq!(
			StorageHasher::Blake2_256.hash(b""),
			hex!("0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8")
		);
		assert_eq!(StorageHasher::Identity.hash(b"key"), b"key");
		assert_eq!(StorageHasher::Twox256.hash(b"key").len(), 32);

		let concat = StorageHasher::Blake2_128Concat.hash(b"key");
		assert_eq!(concat.len(), 16 + 3);
		assert_eq!(&concat[..16], &StorageHasher::Blake2_128.hash(b"key")[..]);
		assert_eq!(&concat[16..], b"key");
		assert!(StorageHasher::Blake2_128Concat.is_concat());
		assert!(!StorageHasher::Twox128.is_concat());
	}

	#[test]
	fn storage_prefix_of_system_events() {
		assert_eq!(
			storage_prefix("System", "Events"),
			hex!("26aa394eea5630e07c48ae0c9558cef780d41e5e16056765bc8461851072c9d7")
		);
		assert_eq!(
			storage_prefix("System", "Account"),
			hex!("26aa394eea5630e07c48ae0c9558cef7b99d880ec681799c0cf30e8886371da9")
		);
	}
}
