//! SCALE decoding conventions.
//!
//! Encoding goes through [`codec::Encode`], which already produces the exact byte layout used
//! on the wire. Decoding is done through the [`Decode`] trait of this module instead of
//! [`codec::Decode`] so that failures keep their cause (truncated input, unknown discriminant,
//! ...) rather than being flattened into a static message. Both sides share [`codec::Input`] as
//! the byte cursor.
//!
//! Two shapes recur in every decoder:
//!
//! - A *guarded optional* field is a `0x00`/`0x01` byte followed, only when `0x01`, by the
//!   value. See the [`Decode`] implementation of `Option<T>`.
//! - A *tagged union* is a single discriminant byte followed by the payload of the selected
//!   variant. Each type defines its own table; an unknown byte is an
//!   [`Error::UnknownVariant`].

use crate::error::{Error, Result};
use codec::Input;

mod compact;

pub use compact::CompactInteger;

/// Largest number of bytes read in one go for variable-length data. Bounds the allocation made
/// before the input has proven it actually holds that many bytes.
const MAX_READ_CHUNK: usize = 16 * 1024;

/// Types that can be decoded from SCALE-encoded bytes.
pub trait Decode: Sized {
	/// Decodes one value, consuming exactly the bytes that make it up.
	fn decode<I: Input>(input: &mut I) -> Result<Self>;
}

/// Decodes a value from `bytes`, failing if any byte is left over.
pub fn decode_all<T: Decode>(mut bytes: &[u8]) -> Result<T> {
	let value = T::decode(&mut bytes)?;
	if !bytes.is_empty() {
		return Err(Error::TrailingInput(bytes.len()));
	}
	Ok(value)
}

pub(crate) fn read_byte<I: Input>(input: &mut I, what: &'static str) -> Result<u8> {
	input.read_byte().map_err(|_| Error::TruncatedInput(what))
}

pub(crate) fn read_array<I: Input, const N: usize>(
	input: &mut I,
	what: &'static str,
) -> Result<[u8; N]> {
	let mut buffer = [0u8; N];
	input
		.read(&mut buffer)
		.map_err(|_| Error::TruncatedInput(what))?;
	Ok(buffer)
}

pub(crate) fn read_vec<I: Input>(input: &mut I, len: usize, what: &'static str) -> Result<Vec<u8>> {
	if let Ok(Some(remaining)) = input.remaining_len() {
		if remaining < len {
			return Err(Error::TruncatedInput(what));
		}
	}

	let mut buffer = Vec::new();
	while buffer.len() < len {
		let start = buffer.len();
		buffer.resize(len.min(start + MAX_READ_CHUNK), 0);
		input
			.read(&mut buffer[start..])
			.map_err(|_| Error::TruncatedInput(what))?;
	}
	Ok(buffer)
}

/// Decodes a compact length prefix.
pub(crate) fn decode_length<I: Input>(input: &mut I, what: &'static str) -> Result<usize> {
	CompactInteger::decode(input)?
		.to_usize()
		.ok_or(Error::LengthOverflow(what))
}

/// Decodes a length-prefixed byte blob.
pub fn decode_bytes<I: Input>(input: &mut I) -> Result<Vec<u8>> {
	let len = decode_length(input, "bytes")?;
	read_vec(input, len, "bytes")
}

macro_rules! impl_decode_for_int {
	($($ty:ty),*) => {$(
		impl Decode for $ty {
			fn decode<I: Input>(input: &mut I) -> Result<Self> {
				read_array(input, stringify!($ty)).map(<$ty>::from_le_bytes)
			}
		}
	)*};
}

impl_decode_for_int!(u8, u16, u32, u64, u128);

impl Decode for bool {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		match read_byte(input, "bool")? {
			0 => Ok(false),
			1 => Ok(true),
			discriminant => Err(Error::UnknownVariant {
				type_name: "bool",
				discriminant,
			}),
		}
	}
}

impl Decode for String {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		let len = decode_length(input, "string")?;
		let bytes = read_vec(input, len, "string")?;
		String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8("string"))
	}
}

impl<const N: usize> Decode for [u8; N] {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		read_array(input, "byte array")
	}
}

impl<T: Decode> Decode for Vec<T> {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		let len = decode_length(input, "sequence")?;
		// Every item takes at least one byte, so the input length bounds the capacity.
		let capacity = match input.remaining_len() {
			Ok(Some(remaining)) => len.min(remaining),
			_ => len.min(MAX_READ_CHUNK),
		};
		let mut items = Vec::with_capacity(capacity);
		for _ in 0..len {
			items.push(T::decode(input)?);
		}
		Ok(items)
	}
}

impl<T: Decode> Decode for Option<T> {
	fn decode<I: Input>(input: &mut I) -> Result<Self> {
		match read_byte(input, "option guard")? {
			0 => Ok(None),
			1 => T::decode(input).map(Some),
			discriminant => Err(Error::UnknownVariant {
				type_name: "Option",
				discriminant,
			}),
		}
	}
}
