//! # quarry-storage
//!
//! Moving task artifacts between object storage and the local disk.
//!
//! - [`ObjectStorage`] downloads sources and uploads outputs by bucket and
//!   key over `object_store`.
//! - [`files`] opens gzip-aware inputs and outputs and guards scratch files
//!   so they are removed on every exit path.

pub mod error;
pub mod files;
pub mod object;

pub use error::StorageError;
pub use files::{OutputWriter, ScratchFile, is_gzip, open_input, strip_gzip};
pub use object::ObjectStorage;
