use super::{read_array, read_byte, read_vec, Decode};
use crate::error::{Error, Result};
use codec::{Encode, Input, Output};
use num::{BigInt, BigUint, ToPrimitive};
use serde::{Serialize, Serializer};
use std::fmt;

/// Number of value bytes the big-integer mode can carry: the six upper bits of the first byte
/// hold `length - 4`.
const MAX_BIG_INT_BYTES: u64 = 0b11_1111 + 4;

/// Arbitrary precision unsigned integer in SCALE compact form.
///
/// The two low bits of the first byte select the mode:
///
/// - `0b00`: the value fits in the six upper bits of that byte.
/// - `0b01`: the value fits in 14 bits spread over two bytes.
/// - `0b10`: the value fits in 30 bits spread over four bytes.
/// - `0b11`: the six upper bits hold `length - 4`, followed by `length` little-endian bytes.
///
/// Encoding always picks the shortest mode. Values that don't fit in 67 bytes are rejected at
/// construction, so encoding a [`CompactInteger`] can't fail.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompactInteger(BigUint);

impl CompactInteger {
	pub fn new(value: BigUint) -> Result<Self> {
		if value.bits() > MAX_BIG_INT_BYTES * 8 {
			return Err(Error::OutOfRange(value.to_string()));
		}
		Ok(Self(value))
	}

	pub fn value(&self) -> &BigUint {
		&self.0
	}

	pub fn to_u64(&self) -> Option<u64> {
		self.0.to_u64()
	}

	pub fn to_usize(&self) -> Option<usize> {
		self.0.to_usize()
	}

	/// Lowest 64 bits of the value.
	pub fn truncate_u64(&self) -> u64 {
		self.0.iter_u64_digits().next().unwrap_or(0)
	}

	/// Number of bytes of the canonical encoding.
	pub fn encoded_len(&self) -> usize {
		match self.0.to_u32() {
			Some(value) if value < 1 << 6 => 1,
			Some(value) if value < 1 << 14 => 2,
			Some(value) if value < 1 << 30 => 4,
			_ => 1 + self.0.bits().div_ceil(8) as usize,
		}
	}

	/// Decodes a compact integer from the start of `bytes`, returning it together with the
	/// number of bytes it took.
	pub fn decode_from_slice(bytes: &[u8]) -> Result<(Self, usize)> {
		let mut input = bytes;
		let value = Self::decode(&mut input)?;
		Ok((value, bytes.len() - input.len()))
	}
}

macro_rules! impl_from_unsigned {
	($($ty:ty),*) => {$(
		impl From<$ty> for CompactInteger {
			fn from(value: $ty) -> Self {
				Self(BigUint::from(value))
			}
		}
	)*};
}

impl_from_unsigned!(u8, u16, u32, u64, u128, usize);

impl TryFrom<i64> for CompactInteger {
	type Error = Error;

	fn try_from(value: i64) -> Result<Self> {
		u64::try_from(value)
			.map(Self::from)
			.map_err(|_| Error::OutOfRange(value.to_string()))
	}
}

impl TryFrom<BigInt> for CompactInteger {
	type Error = Error;

	fn try_from(value: BigInt) -> Result<Self> {
		let unsigned = value
			.to_biguint()
			.ok_or_else(|| Error::OutOfRange(value.to_string()))?;
		Self::new(unsigned)
	}
}

impl TryFrom<BigUint> for CompactInteger {
	type Error = Error;

	fn try_from(value: BigUint) -> Result<Self> {
		Self::new(value)
	}
}

impl fmt::Display for CompactInteger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

impl Encode for CompactInteger {
	fn size_hint(&self) -> usize {
		self.encoded_len()
	}

	fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
		match self.0.to_u32() {
			Some(value) if value < 1 << 6 => dest.push_byte((value as u8) << 2),
			Some(value) if value < 1 << 14 => {
				dest.write(&(((value as u16) << 2) | 0b01).to_le_bytes())
			},
			Some(value) if value < 1 << 30 => dest.write(&((value << 2) | 0b10).to_le_bytes()),
			_ => {
				// At least 2^30, so never shorter than four bytes.
				let bytes = self.0.to_bytes_le();
				dest.push_byte((((bytes.len() - 4) as u8) << 2) | 0b11);
				dest.write(&bytes);
			},
		}
	}
}

impl Decode for CompactInteger {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		const WHAT: &str = "compact integer";

		let first = read_byte(input, WHAT)?;
		let value = match first & 0b11 {
			0b00 => BigUint::from(first >> 2),
			0b01 => {
				let [second] = read_array::<_, 1>(input, WHAT)?;
				BigUint::from(u16::from_le_bytes([first, second]) >> 2)
			},
			0b10 => {
				let [b1, b2, b3] = read_array::<_, 3>(input, WHAT)?;
				BigUint::from(u32::from_le_bytes([first, b1, b2, b3]) >> 2)
			},
			_ => {
				let len = usize::from(first >> 2) + 4;
				BigUint::from_bytes_le(&read_vec(input, len, WHAT)?)
			},
		};
		Ok(Self(value))
	}
}

impl Serialize for CompactInteger {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		match self.to_u64() {
			Some(value) => serializer.serialize_u64(value),
			None => serializer.collect_str(&self.0),
		}
	}
}
