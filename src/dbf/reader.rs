use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use log::info;

use super::format;
use super::iter::RecordIterator;
use super::types::error::Result;
use super::types::memo::{MemoProvider, NoMemo};
use super::types::models::{DbfHeader, DecodeOptions, Record};

/// The main reader for DBF table files.
///
/// The header is parsed once when the reader is created. Records are then
/// pulled in file order through [`records`](Self::records), which consumes
/// the reader: reading the table again means opening it again.
#[derive(Debug)]
pub struct DbfReader<R: Read> {
    reader: R,
    source: String,
    header: DbfHeader,
    options: DecodeOptions,
}

impl DbfReader<BufReader<File>> {
    /// Opens a DBF file from the given path.
    ///
    /// The path doubles as the source identity handed to memo providers.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be opened or its header cannot be read
    /// - The header geometry is inconsistent
    pub fn open(path: impl AsRef<Path>, options: DecodeOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening DBF file: {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), path.display().to_string(), options)
    }
}

impl<R: Read> DbfReader<R> {
    /// Reads a table from any byte source positioned at the start of the file.
    ///
    /// `source` identifies the table to memo providers and in log output.
    pub fn from_reader(mut reader: R, source: impl Into<String>, options: DecodeOptions) -> Result<Self> {
        let source = source.into();
        let header = format::header::read_header(&mut reader)?;
        info!(
            "DBF table '{}' ready: {} declared records, {} fields, data ends at byte {}",
            source,
            header.declared_records(),
            header.fields.len(),
            header.data_end()
        );

        Ok(Self {
            reader,
            source,
            header,
            options,
        })
    }

    pub fn header(&self) -> &DbfHeader {
        &self.header
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns an iterator over all records. Memo fields decode to null.
    pub fn records(self) -> RecordIterator<R, NoMemo> {
        self.records_with_memo(NoMemo)
    }

    /// Returns an iterator over all records, resolving memo fields through `memo`.
    pub fn records_with_memo<P: MemoProvider>(self, memo: P) -> RecordIterator<R, P> {
        RecordIterator::new(self.reader, self.source, self.header, self.options, memo)
    }

    /// Convenience method: decode every record into memory.
    pub fn read_all(self) -> Result<Vec<Record>> {
        self.records().collect()
    }
}
