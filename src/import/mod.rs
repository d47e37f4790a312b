//! Tools for importing parsed subscriber records into a PostgreSQL database.
//!
//! This module provides functionality to import subscriber records into the mailing-list
//! database. It manages the database session, creates one list per import run, and inserts
//! or reuses subscriber rows before linking each of them to the new list. Statements commit
//! individually by default, so an interrupted run keeps every row already imported.
//!
//! ## Usage
//!
//! The main entry point is the [`run_import`] function, which takes a database client, the
//! operator's account email, and an iterator of parsed records. It resolves the account,
//! creates the list, imports every record, and returns a summary of the run. The session
//! itself is opened with [`connect`].
//!
//! ## Submodules
//!
//! - **postgres**: Contains PostgreSQL-specific import functionality.

mod postgres;

pub use postgres::{connect, import_subscribers, run_import, ImportSummary, LIST_NAME_PREFIX};
