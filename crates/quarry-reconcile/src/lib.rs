//! # quarry-reconcile
//!
//! Last-write-wins reconciliation of records delivered more than once.
//!
//! A detect-only pass raises, per [`ResolutionKey`], the stored
//! [`VersionMarker`] to the highest one seen. A later cold-start pass keeps
//! only the record whose marker equals the stored one; an incremental pass
//! keeps everything except records marked obsolete, which are retracted.

pub mod error;
pub mod key;
pub mod resolver;
pub mod status;
pub mod store;

pub use error::ReconcileError;
pub use key::{ResolutionKey, VersionMarker};
pub use resolver::{Decision, RunMode, UpdateResolver, decide};
pub use status::RecordStatus;
pub use store::CoordinationStore;
