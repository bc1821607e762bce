//! Small values produced by metadata lookups, plus a few fixed-layout wire types.

use crate::{
	error::{Error, Result},
	scale::{read_array, read_byte, Decode},
};
use codec::{Encode, Input};
use derive_more::derive::Display;
use serde::Serialize;
use strum::FromRepr;

/// Pallet and variant indices addressing a call, the first two bytes of an encoded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Serialize, Display)]
#[display("{section_index}:{method_index}")]
pub struct CallIndex {
	pub section_index: u8,
	pub method_index: u8,
}

impl CallIndex {
	pub fn to_bytes(&self) -> [u8; 2] {
		[self.section_index, self.method_index]
	}
}

impl Decode for CallIndex {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		let [section_index, method_index] = read_array::<_, 2>(input, "call index")?;
		Ok(CallIndex {
			section_index,
			method_index,
		})
	}
}

/// Pallet index followed by event variant index, as found at the start of an event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Serialize, Display)]
#[display("{}:{}", _0[0], _0[1])]
pub struct EventId(pub [u8; 2]);

impl Decode for EventId {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		read_array(input, "event id").map(EventId)
	}
}

/// Balance bucket a reserved or repatriated amount ends up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Serialize, FromRepr)]
#[repr(u8)]
pub enum BalanceStatus {
	Free = 0,
	Reserved = 1,
}

impl Decode for BalanceStatus {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		let discriminant = read_byte(input, "balance status")?;
		BalanceStatus::from_repr(discriminant).ok_or(Error::UnknownVariant {
			type_name: "BalanceStatus",
			discriminant,
		})
	}
}

/// ECDSA signature over a BEEFY commitment: `r`, `s` and the recovery id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode)]
pub struct BeefySignature(pub [u8; 65]);

impl Decode for BeefySignature {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		read_array(input, "beefy signature").map(BeefySignature)
	}
}

/// Serializes bytes as a `0x`-prefixed hex string.
pub mod hex_format {
	use serde::Serializer;

	pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
	}
}

pub mod tracing_level_format {
	use serde::{self, Deserialize, Deserializer, Serializer};
	use std::str::FromStr;
	use tracing::Level;

	pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&level.to_string())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		Level::from_str(&value).map_err(serde::de::Error::custom)
	}
}
