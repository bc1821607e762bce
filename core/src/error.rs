use crate::registry::TypeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while decoding SCALE data or resolving metadata lookups.
///
/// Decode errors abort the decode that raised them. Lookup errors are ordinary outcomes, such as
/// a chain not exposing a given call, and carry the names or indices that were searched for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	#[error("Not enough bytes left to decode {0}")]
	TruncatedInput(&'static str),
	#[error("Unknown {type_name} discriminant {discriminant}")]
	UnknownVariant {
		type_name: &'static str,
		discriminant: u8,
	},
	#[error("Invalid UTF-8 in {0}")]
	InvalidUtf8(&'static str),
	#[error("Length prefix of {0} doesn't fit in memory")]
	LengthOverflow(&'static str),
	#[error("Value out of range for compact encoding: {0}")]
	OutOfRange(String),
	#[error("{0} bytes left over after decoding")]
	TrailingInput(usize),
	#[error("Invalid metadata magic number {0:02x?}")]
	InvalidMagic([u8; 4]),
	#[error("Unsupported metadata version {0}, only version 14 is supported")]
	UnsupportedVersion(u8),
	#[error("Length prefix doesn't match the length of the metadata")]
	BadLengthPrefix,
	#[error("Type {0} not found in the registry")]
	TypeNotFound(TypeId),
	#[error("Module {0} not found in metadata")]
	ModuleNotFound(String),
	#[error("Method {method} not found within module {module}")]
	MethodNotFound { module: String, method: String },
	#[error("Storage {item} not found within module {module}")]
	StorageNotFound { module: String, item: String },
	#[error("Could not find constant {module}.{constant}")]
	ConstantNotFound { module: String, constant: String },
	#[error("Module index {0} out of range")]
	ModuleIndexOutOfRange(u8),
	#[error("Event index {index} not found within module {module}")]
	EventNotFound { module: String, index: u8 },
	#[error("Storage entry of shape {actual} has no {accessor}")]
	WrongStorageShape {
		accessor: &'static str,
		actual: &'static str,
	},
	#[error("Storage entry {0} declares no hasher")]
	MissingHasher(String),
}

impl Error {
	/// Returns `true` for errors raised while decoding bytes, as opposed to failed lookups.
	pub fn is_decode_error(&self) -> bool {
		matches!(
			self,
			Error::TruncatedInput(_)
				| Error::UnknownVariant { .. }
				| Error::InvalidUtf8(_)
				| Error::LengthOverflow(_)
				| Error::TrailingInput(_)
				| Error::InvalidMagic(_)
				| Error::UnsupportedVersion(_)
				| Error::BadLengthPrefix
		)
	}
}
