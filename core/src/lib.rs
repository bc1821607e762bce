//! SCALE codec and runtime metadata resolver.
//!
//! Chains built with Substrate describe themselves through the *metadata*: a SCALE-encoded
//! document listing every pallet together with its calls, events, storage entries and constants,
//! plus a registry of all the types those items refer to. Decoding it lets a client address
//! calls and storage of a chain it was never compiled against.
//!
//! - [`scale`] holds the compact integer codec and the decoding conventions shared by every
//!   other type.
//! - [`registry`] is the portable type registry.
//! - [`metadata`] decodes the versioned metadata document and answers name and index lookups.
//! - [`types`] holds the small values produced by lookups, such as [`types::CallIndex`].

pub mod error;
pub mod metadata;
pub mod registry;
pub mod scale;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
