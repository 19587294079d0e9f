//! Record domain model shared by every storage backend.
//!
//! # Responsibility
//! - Define the closed set of record shapes the core can persist.
//! - Keep shape dispatch a `match` over `Record`, never runtime inspection.
//!
//! # Invariants
//! - Every record is identified by a `RecordId` unique within its kind.

pub mod record;
