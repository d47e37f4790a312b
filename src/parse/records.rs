use super::types::SubscriberRecord;
use crate::error::{ImportError, ImportResult};
use csv::{ByteRecord, Reader, ReaderBuilder};
use encoding_rs::WINDOWS_1252;
use std::io::Read;

// Leading columns consumed from each record: email, first name, last name.
const REQUIRED_FIELDS: usize = 3;

/// A streaming reader that parses Mailchimp CSV exports into subscriber records.
///
/// Records are read one at a time from the underlying byte source, so input of any
/// size can be processed without buffering it in memory. The reader expects no
/// header row, accepts records of varying length, and decodes every field from
/// Windows-1252, the Latin-1 family encoding Mailchimp exports are delivered in.
/// Fields beyond the third are ignored; records with fewer than three fields stop
/// the iteration with an error naming the offending row.
pub struct SubscriberRecords<R: Read> {
    reader: Reader<R>,
    record: ByteRecord,
    row: u64,
}

impl<R: Read> SubscriberRecords<R> {
    /// Creates a new record reader over the given byte source.
    ///
    /// # Arguments
    ///
    /// * `input` - The byte source to read CSV records from, typically standard input.
    ///
    /// # Returns
    ///
    /// A `SubscriberRecords` iterator yielding one `SubscriberRecord` per CSV row.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mailchimp_import::parse::SubscriberRecords;
    ///
    /// let input = &b"alice@example.com,Alice,Anderson,extra\n"[..];
    /// let mut records = SubscriberRecords::new(input);
    /// let record = records.next().unwrap().unwrap();
    /// assert_eq!(record.row, 1);
    /// assert_eq!(record.email, "alice@example.com");
    /// assert_eq!(record.first_name, "Alice");
    /// assert_eq!(record.last_name, "Anderson");
    /// ```
    pub fn new(input: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(input);

        SubscriberRecords {
            reader,
            record: ByteRecord::new(),
            row: 0,
        }
    }
}

/// Yields parsed records in input order, stopping at the first malformed row or read error.
impl<R: Read> Iterator for SubscriberRecords<R> {
    type Item = ImportResult<SubscriberRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_byte_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                self.row += 1;
                if self.record.len() < REQUIRED_FIELDS {
                    return Some(Err(ImportError::MalformedRow {
                        row: self.row,
                        fields: self.record.len(),
                    }));
                }
                Some(Ok(SubscriberRecord {
                    row: self.row,
                    email: decode_field(&self.record[0]),
                    first_name: decode_field(&self.record[1]),
                    last_name: decode_field(&self.record[2]),
                }))
            }
            Err(e) => Some(Err(ImportError::Csv(e))),
        }
    }
}

/// Decodes a raw field from Windows-1252 into an owned string.
///
/// Every byte maps to a character in this encoding, so decoding cannot fail.
fn decode_field(field: &[u8]) -> String {
    let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(field);
    decoded.into_owned()
}
