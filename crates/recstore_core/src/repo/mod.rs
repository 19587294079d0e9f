//! Record store contract and its two persistence backends.
//!
//! # Responsibility
//! - Define the backend-agnostic `RecordStore` facade.
//! - Keep CSV and SQLite details inside the persistence boundary.
//!
//! # Invariants
//! - Boundary input is validated before any medium is touched.
//! - Stores return semantic errors (`NotFound`) in addition to transport
//!   errors from the file system or the database.

pub mod csv_store;
pub mod record_store;
pub mod sqlite_store;
