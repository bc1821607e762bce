//! Portable type registry.
//!
//! The metadata carries a flat table of every type used by the runtime. Entries are addressed by
//! a [`TypeId`] and refer to each other only through further type ids, so the table can describe
//! recursive and mutually recursive types. Nothing is followed while decoding: a type id is only
//! looked up when [`PortableRegistry::resolve`] is called, which means cycles and forward
//! references are never a problem.

use crate::{
	error::{Error, Result},
	scale::{read_byte, CompactInteger, Decode},
};
use codec::{Encode, Input, Output};
use derive_more::{Display, From};
use serde::Serialize;
use strum::{FromRepr, IntoStaticStr};

/// Key of an entry in the [`PortableRegistry`].
#[derive(
	Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, From,
)]
#[serde(transparent)]
pub struct TypeId(pub CompactInteger);

impl From<u32> for TypeId {
	fn from(id: u32) -> Self {
		TypeId(CompactInteger::from(id))
	}
}

impl Encode for TypeId {
	fn size_hint(&self) -> usize {
		self.0.size_hint()
	}

	fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
		self.0.encode_to(dest)
	}
}

impl Decode for TypeId {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		CompactInteger::decode(input).map(TypeId)
	}
}

/// Named or unnamed field of a composite type or of an enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct Field {
	pub name: Option<String>,
	pub ty: TypeId,
	/// Name of the type as written in the runtime source code.
	pub type_name: Option<String>,
	pub docs: Vec<String>,
}

impl Decode for Field {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		Ok(Field {
			name: Decode::decode(input)?,
			ty: Decode::decode(input)?,
			type_name: Decode::decode(input)?,
			docs: Decode::decode(input)?,
		})
	}
}

/// One variant of an enum type.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct Variant {
	pub name: String,
	pub fields: Vec<Field>,
	/// Index used on the wire. Not necessarily the position of the variant in its list.
	pub index: u8,
	pub docs: Vec<String>,
}

impl Decode for Variant {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		Ok(Variant {
			name: Decode::decode(input)?,
			fields: Decode::decode(input)?,
			index: Decode::decode(input)?,
			docs: Decode::decode(input)?,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct TypeDefComposite {
	pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct TypeDefVariant {
	pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct TypeDefSequence {
	pub type_param: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct TypeDefArray {
	pub len: u32,
	pub type_param: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct TypeDefTuple {
	pub fields: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct TypeDefCompact {
	pub type_param: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct TypeDefBitSequence {
	pub bit_store_type: TypeId,
	pub bit_order_type: TypeId,
}

/// Primitive types, in wire discriminant order.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Encode, Serialize, FromRepr, IntoStaticStr, strum::Display,
)]
#[repr(u8)]
pub enum TypeDefPrimitive {
	Bool = 0,
	Char = 1,
	#[strum(serialize = "String")]
	Str = 2,
	U8 = 3,
	U16 = 4,
	U32 = 5,
	U64 = 6,
	U128 = 7,
	U256 = 8,
	I8 = 9,
	I16 = 10,
	I32 = 11,
	I64 = 12,
	I128 = 13,
	I256 = 14,
}

impl Decode for TypeDefPrimitive {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		let discriminant = read_byte(input, "TypeDefPrimitive")?;
		TypeDefPrimitive::from_repr(discriminant).ok_or(Error::UnknownVariant {
			type_name: "TypeDefPrimitive",
			discriminant,
		})
	}
}

/// Definition of a type. The discriminant byte order is fixed by the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize, IntoStaticStr)]
pub enum TypeDef {
	Composite(TypeDefComposite),
	Variant(TypeDefVariant),
	Sequence(TypeDefSequence),
	Array(TypeDefArray),
	Tuple(TypeDefTuple),
	Primitive(TypeDefPrimitive),
	Compact(TypeDefCompact),
	BitSequence(TypeDefBitSequence),
	/// Type only known by its name, kept for compatibility with metadata predating the registry.
	HistoricMetaCompat(String),
}

impl TypeDef {
	/// Variants of an enum type, empty for every other kind of type.
	pub fn variants(&self) -> &[Variant] {
		match self {
			TypeDef::Variant(TypeDefVariant { variants }) => variants,
			_ => &[],
		}
	}
}

impl Decode for TypeDef {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		let def = match read_byte(input, "TypeDef")? {
			0 => TypeDef::Composite(TypeDefComposite {
				fields: Decode::decode(input)?,
			}),
			1 => TypeDef::Variant(TypeDefVariant {
				variants: Decode::decode(input)?,
			}),
			2 => TypeDef::Sequence(TypeDefSequence {
				type_param: Decode::decode(input)?,
			}),
			3 => TypeDef::Array(TypeDefArray {
				len: Decode::decode(input)?,
				type_param: Decode::decode(input)?,
			}),
			4 => TypeDef::Tuple(TypeDefTuple {
				fields: Decode::decode(input)?,
			}),
			5 => TypeDef::Primitive(Decode::decode(input)?),
			6 => TypeDef::Compact(TypeDefCompact {
				type_param: Decode::decode(input)?,
			}),
			7 => TypeDef::BitSequence(TypeDefBitSequence {
				bit_store_type: Decode::decode(input)?,
				bit_order_type: Decode::decode(input)?,
			}),
			8 => TypeDef::HistoricMetaCompat(Decode::decode(input)?),
			discriminant => {
				return Err(Error::UnknownVariant {
					type_name: "TypeDef",
					discriminant,
				})
			},
		};
		Ok(def)
	}
}

/// Generic parameter of a type. The type is absent for parameters that aren't used.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct Param {
	pub name: String,
	pub ty: Option<TypeId>,
}

impl Decode for Param {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		Ok(Param {
			name: Decode::decode(input)?,
			ty: Decode::decode(input)?,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct LookupType {
	/// Module path segments followed by the type name, empty for primitives and tuples.
	pub path: Vec<String>,
	pub params: Vec<Param>,
	pub def: TypeDef,
	pub docs: Vec<String>,
}

impl LookupType {
	pub fn path_string(&self) -> String {
		self.path.join("::")
	}
}

impl Decode for LookupType {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		Ok(LookupType {
			path: Decode::decode(input)?,
			params: Decode::decode(input)?,
			def: Decode::decode(input)?,
			docs: Decode::decode(input)?,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct PortableType {
	pub id: TypeId,
	pub ty: LookupType,
}

impl Decode for PortableType {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		Ok(PortableType {
			id: Decode::decode(input)?,
			ty: Decode::decode(input)?,
		})
	}
}

/// Table of every type referenced by the metadata.
///
/// Type ids are not assumed to be dense nor sorted, lookups scan the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Serialize)]
pub struct PortableRegistry {
	pub types: Vec<PortableType>,
}

impl PortableRegistry {
	pub fn resolve(&self, id: &TypeId) -> Result<&LookupType> {
		self.types
			.iter()
			.find(|portable| &portable.id == id)
			.map(|portable| &portable.ty)
			.ok_or_else(|| Error::TypeNotFound(id.clone()))
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}
}

impl Decode for PortableRegistry {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		Ok(PortableRegistry {
			types: Decode::decode(input)?,
		})
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::scale::decode_all;
	use hex_literal::hex;
	use test_case::test_case;

	pub fn variant(name: &str, index: u8) -> Variant {
		Variant {
			name: name.to_string(),
			fields: vec![],
			index,
			docs: vec![],
		}
	}

	pub fn enum_type(id: u32, path: &[&str], variants: Vec<Variant>) -> PortableType {
		PortableType {
			id: id.into(),
			ty: LookupType {
				path: path.iter().map(|segment| segment.to_string()).collect(),
				params: vec![],
				def: TypeDef::Variant(TypeDefVariant { variants }),
				docs: vec![],
			},
		}
	}

	fn plain_type(id: u32, def: TypeDef) -> PortableType {
		PortableType {
			id: id.into(),
			ty: LookupType {
				path: vec![],
				params: vec![],
				def,
				docs: vec![],
			},
		}
	}

	#[test_case(&hex!("00 00") => "Composite")]
	#[test_case(&hex!("01 00") => "Variant")]
	#[test_case(&hex!("02 04") => "Sequence")]
	#[test_case(&hex!("03 20000000 04") => "Array")]
	#[test_case(&hex!("04 08 04 08") => "Tuple")]
	#[test_case(&hex!("05 03") => "Primitive")]
	#[test_case(&hex!("06 04") => "Compact")]
	#[test_case(&hex!("07 04 08") => "BitSequence")]
	#[test_case(&hex!("08 0c 753332") => "HistoricMetaCompat")]
	fn type_def_discriminant_dispatch(bytes: &[u8]) -> &'static str {
		let def: TypeDef = decode_all(bytes).unwrap();
		(&def).into()
	}

	#[test_case(9)]
	#[test_case(10)]
	#[test_case(255)]
	fn type_def_unknown_discriminant_is_rejected(discriminant: u8) {
		assert_eq!(
			decode_all::<TypeDef>(&[discriminant, 0]),
			Err(Error::UnknownVariant {
				type_name: "TypeDef",
				discriminant
			})
		);
	}

	#[test]
	fn type_def_payloads() {
		assert_eq!(
			decode_all::<TypeDef>(&hex!("03 20000000 04")),
			Ok(TypeDef::Array(TypeDefArray {
				len: 32,
				type_param: 1u32.into()
			}))
		);
		assert_eq!(
			decode_all::<TypeDef>(&hex!("08 0c 753332")),
			Ok(TypeDef::HistoricMetaCompat("u32".to_string()))
		);
		assert_eq!(
			decode_all::<TypeDef>(&hex!("03 2000")),
			Err(Error::TruncatedInput("u32"))
		);
	}

	#[test]
	fn primitive_discriminant_table() {
		let names = (0u8..15)
			.map(|discriminant| {
				decode_all::<TypeDefPrimitive>(&[discriminant])
					.unwrap()
					.to_string()
			})
			.collect::<Vec<_>>();
		assert_eq!(
			names,
			[
				"Bool", "Char", "String", "U8", "U16", "U32", "U64", "U128", "U256", "I8", "I16",
				"I32", "I64", "I128", "I256"
			]
		);
		assert_eq!(
			decode_all::<TypeDefPrimitive>(&[15]),
			Err(Error::UnknownVariant {
				type_name: "TypeDefPrimitive",
				discriminant: 15
			})
		);
	}

	#[test]
	fn decodes_named_and_unnamed_fields() {
		let field = Field {
			name: Some("dest".to_string()),
			ty: 7u32.into(),
			type_name: Some("AccountIdLookupOf<T>".to_string()),
			docs: vec!["Recipient.".to_string()],
		};
		assert_eq!(decode_all::<Field>(&field.encode()), Ok(field));

		// No name, type 2, no type name, no docs.
		assert_eq!(
			decode_all::<Field>(&hex!("00 08 00 00")),
			Ok(Field {
				name: None,
				ty: 2u32.into(),
				type_name: None,
				docs: vec![]
			})
		);
	}

	#[test]
	fn cyclic_references_resolve_lazily() {
		// 0: struct { next: 1 }, 1: Vec<0>
		let registry = PortableRegistry {
			types: vec![
				plain_type(
					0,
					TypeDef::Composite(TypeDefComposite {
						fields: vec![Field {
							name: Some("next".to_string()),
							ty: 1u32.into(),
							type_name: None,
							docs: vec![],
						}],
					}),
				),
				plain_type(
					1,
					TypeDef::Sequence(TypeDefSequence {
						type_param: 0u32.into(),
					}),
				),
			],
		};
		let decoded: PortableRegistry = decode_all(&registry.encode()).unwrap();
		assert_eq!(decoded, registry);

		let TypeDef::Composite(node) = &decoded.resolve(&0u32.into()).unwrap().def else {
			panic!("type 0 should be a composite");
		};
		let TypeDef::Sequence(seq) = &decoded.resolve(&node.fields[0].ty).unwrap().def else {
			panic!("type 1 should be a sequence");
		};
		assert_eq!(seq.type_param, 0u32.into());
	}

	#[test]
	fn resolve_does_not_assume_dense_ids() {
		let registry = PortableRegistry {
			types: vec![
				enum_type(12, &["pallet_balances", "pallet", "Call"], vec![]),
				plain_type(3, TypeDef::Primitive(TypeDefPrimitive::U32)),
			],
		};
		assert_eq!(
			registry.resolve(&3u32.into()).unwrap().def,
			TypeDef::Primitive(TypeDefPrimitive::U32)
		);
		assert_eq!(
			registry.resolve(&12u32.into()).unwrap().path_string(),
			"pallet_balances::pallet::Call"
		);
		assert_eq!(
			registry.resolve(&0u32.into()),
			Err(Error::TypeNotFound(0u32.into()))
		);
	}

	#[test]
	fn variant_index_is_kept_apart_from_position() {
		let def = TypeDef::Variant(TypeDefVariant {
			variants: vec![variant("transfer", 7), variant("burn", 0)],
		});
		let decoded: TypeDef = decode_all(&def.encode()).unwrap();
		let indices = decoded.variants().iter().map(|v| v.index).collect::<Vec<_>>();
		assert_eq!(indices, [7, 0]);
		assert!(TypeDef::Primitive(TypeDefPrimitive::Bool)
			.variants()
			.is_empty());
	}

	#[test]
	fn param_without_type() {
		assert_eq!(
			decode_all::<Param>(&hex!("04 54 00")),
			Ok(Param {
				name: "T".to_string(),
				ty: None
			})
		);
	}
}
