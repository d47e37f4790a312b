//! # Parsing Mailchimp CSV Exports into Subscriber Records
//!
//! This module provides functionality to parse a Mailchimp subscriber export read
//! from an input stream into structured records. It processes the raw
//! comma-separated bytes, decoding each field from the Latin-1 family encoding
//! the exports are delivered in, and yields `SubscriberRecord` structs ready for
//! import into the mailing-list database.
//!
//! ## Usage
//!
//! The main entry point is `SubscriberRecords`, an iterator built from any byte
//! source (typically standard input) that yields one parsed record per CSV row.
//!
//! ## Submodules
//!
//! - **records**: Contains the streaming CSV record reader.
//! - **types**: Defines data structures used in the parsing process.

mod records;
mod types;

pub use records::SubscriberRecords;
pub use types::SubscriberRecord;
