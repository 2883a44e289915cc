//! Sequential access to the records of a DBF table.
//!
//! # Example
//! ```no_run
//! # use dbf_reader::{DbfReader, DecodeOptions};
//! let reader = DbfReader::open("customers.dbf", DecodeOptions::default()).unwrap();
//! for result in reader.records() {
//!     let record = result.unwrap();
//!     println!("{} {:?}", record.sequence_number, record.get("NAME"));
//! }
//! ```

use std::io::Read;
use std::iter::FusedIterator;
use log::{trace, warn};

use super::format::record::{self, DecodeContext};
use super::types::error::Result;
use super::types::memo::MemoProvider;
use super::types::models::{DbfHeader, DecodeOptions, Record};

/// Iterator over decoded records, in file order.
///
/// Stops after the number of records declared in the header or when the
/// source runs out, whichever comes first. A trailing partial record is
/// dropped. After yielding an error the iterator is exhausted.
///
/// Created by [`DbfReader::records()`](crate::DbfReader::records).
pub struct RecordIterator<R: Read, P: MemoProvider> {
    reader: R,
    source: String,
    header: DbfHeader,
    options: DecodeOptions,
    memo: P,
    buffer: Vec<u8>,
    next_sequence: u64,
    finished: bool,
}

impl<R: Read, P: MemoProvider> RecordIterator<R, P> {
    pub(super) fn new(reader: R, source: String, header: DbfHeader, options: DecodeOptions, memo: P) -> Self {
        Self {
            reader,
            source,
            buffer: Vec::with_capacity(usize::from(header.record_length)),
            header,
            options,
            memo,
            next_sequence: 1,
            finished: false,
        }
    }

    /// The table header, available while iterating.
    pub fn header(&self) -> &DbfHeader {
        &self.header
    }

    fn remaining(&self) -> u64 {
        (self.header.declared_records() + 1).saturating_sub(self.next_sequence)
    }
}

impl<R: Read, P: MemoProvider> Iterator for RecordIterator<R, P> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.remaining() == 0 {
            return None;
        }

        let record_length = u64::from(self.header.record_length);
        self.buffer.clear();
        if let Err(e) = self.reader.by_ref().take(record_length).read_to_end(&mut self.buffer) {
            self.finished = true;
            return Some(Err(e.into()));
        }

        if (self.buffer.len() as u64) < record_length {
            self.finished = true;
            warn!(
                "Table '{}' ends after {} of {} declared records ({} trailing bytes dropped)",
                self.source,
                self.next_sequence - 1,
                self.header.declared_records(),
                self.buffer.len()
            );
            return None;
        }

        let sequence_number = self.next_sequence;
        self.next_sequence += 1;
        trace!(
            "Decoding record {} at offset {}",
            sequence_number,
            u64::from(self.header.data_start) + (sequence_number - 1) * record_length
        );

        let ctx = DecodeContext {
            source: &self.source,
            memo: &self.memo,
            options: &self.options,
        };
        Some(Ok(record::decode_record(&self.header.fields, &self.buffer, sequence_number, &ctx)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        (0, usize::try_from(self.remaining()).ok())
    }
}

impl<R: Read, P: MemoProvider> FusedIterator for RecordIterator<R, P> {}
