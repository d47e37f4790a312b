use std::fmt::Debug;

/// Represents a single subscriber record read from a Mailchimp CSV export.
///
/// This struct carries the three columns the import consumes along with the record's
/// position in the input stream, which error reporting and logging refer back to.
/// Any columns beyond the third are ignored by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberRecord {
    /// The 1-based position of this record in the input stream.
    pub row: u64,
    /// The subscriber's email address.
    pub email: String,
    /// The subscriber's first name.
    pub first_name: String,
    /// The subscriber's last name.
    pub last_name: String,
}
