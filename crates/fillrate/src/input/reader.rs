//! Streaming row reader with delimiter detection.
//!
//! Rows are lines: there is no quoting, so a `"` is an ordinary character and
//! a line can never spill into the next one. Cells are kept as bytes, so
//! files that are not UTF-8 are read the same way as files that are.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use csv::{ByteRecord, Trim};
use tracing::debug;

use crate::error::{FillrateError, Result};

use super::source::SourceMetadata;

/// Delimiters to try when auto-detecting, most preferred first.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// How much of the file to look at when detecting the delimiter.
const SNIFF_BYTES: u64 = 64 * 1024;

/// Data lines compared against the header by delimiter detection.
const SNIFF_LINES: usize = 10;

/// A delimited data file on disk.
///
/// Each call to [`DataSource::open`] starts a fresh pass over the file, so the
/// header can be read during configuration and again right before evaluation.
#[derive(Debug, Clone)]
pub struct DataSource {
    path: PathBuf,
    delimiter: u8,
}

impl DataSource {
    /// Point at a file, detecting the delimiter unless one is given.
    pub fn new(path: impl AsRef<Path>, delimiter: Option<u8>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let delimiter = match delimiter {
            Some(d) => d,
            None => {
                let file = open_file(&path)?;
                let mut prefix = Vec::new();
                file.take(SNIFF_BYTES)
                    .read_to_end(&mut prefix)
                    .map_err(|e| FillrateError::Io {
                        path: path.clone(),
                        source: e,
                    })?;
                detect_delimiter(complete_lines(&prefix))
            }
        };

        debug!(path = %path.display(), delimiter = %(delimiter as char).escape_default(), "data source");
        Ok(Self { path, delimiter })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Open the file and consume its header line.
    pub fn open(&self) -> Result<(Vec<String>, RowReader<File>)> {
        let file = open_file(&self.path)?;
        let mut rows = RowReader::new(file, self.delimiter);
        match rows.read_header()? {
            Some(headers) => Ok((headers, rows)),
            None => Err(FillrateError::EmptyHeader(self.path.clone())),
        }
    }

    /// Read only the header line.
    pub fn headers(&self) -> Result<Vec<String>> {
        self.open().map(|(headers, _)| headers)
    }

    /// Describe the file for reports.
    pub fn metadata(&self, column_count: usize) -> Result<SourceMetadata> {
        let size_bytes = std::fs::metadata(&self.path)
            .map_err(|e| FillrateError::Io {
                path: self.path.clone(),
                source: e,
            })?
            .len();

        Ok(SourceMetadata::new(
            self.path.clone(),
            size_bytes,
            format_name(self.delimiter),
            column_count,
        ))
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| FillrateError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Drop a trailing line cut off by the sniff limit.
fn complete_lines(prefix: &[u8]) -> &[u8] {
    if (prefix.len() as u64) < SNIFF_BYTES {
        return prefix;
    }
    match prefix.iter().rposition(|&b| b == b'\n') {
        Some(end) => &prefix[..end],
        None => prefix,
    }
}

/// Reads one line at a time from delimited input.
///
/// Fields are trimmed and rows may have any number of fields. A blank line is
/// returned as a row with no fields.
pub struct RowReader<R> {
    reader: csv::Reader<NewlineTerminated<R>>,
    pending: ByteRecord,
    has_pending: bool,
    blank_lines: u64,
    finished: bool,
}

impl<R: Read> RowReader<R> {
    pub fn new(input: R, delimiter: u8) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .trim(Trim::All)
            .from_reader(NewlineTerminated::new(input));
        Self {
            reader,
            pending: ByteRecord::new(),
            has_pending: false,
            blank_lines: 0,
            finished: false,
        }
    }

    /// Read the header row. Returns `None` if the input has no usable header.
    ///
    /// Header cells that are not UTF-8 are decoded lossily.
    pub fn read_header(&mut self) -> Result<Option<Vec<String>>> {
        let mut record = ByteRecord::new();
        if !self.reader.read_byte_record(&mut record)? {
            return Ok(None);
        }

        let headers: Vec<String> = record
            .iter()
            .map(|cell| String::from_utf8_lossy(cell).into_owned())
            .collect();
        if headers.iter().all(String::is_empty) {
            return Ok(None);
        }
        Ok(Some(headers))
    }

    /// Read the next data row into `record`. Returns `false` at end of input.
    pub fn read_row(&mut self, record: &mut ByteRecord) -> Result<bool> {
        loop {
            if self.blank_lines > 0 {
                self.blank_lines -= 1;
                record.clear();
                return Ok(true);
            }
            if self.has_pending {
                self.has_pending = false;
                std::mem::swap(record, &mut self.pending);
                return Ok(true);
            }
            if self.finished {
                return Ok(false);
            }

            // The csv reader skips empty lines; recover them from the line
            // count. Every record ends with its own newline.
            let start = self.reader.position().line();
            let found = self.reader.read_byte_record(&mut self.pending)?;
            let consumed = self.reader.position().line().saturating_sub(start);
            if found {
                self.blank_lines = consumed.saturating_sub(1);
                self.has_pending = true;
            } else {
                self.blank_lines = consumed;
                self.finished = true;
            }
        }
    }
}

/// Adds a final `\n` to input that does not end with one.
struct NewlineTerminated<R> {
    inner: R,
    last: Option<u8>,
    done: bool,
}

impl<R> NewlineTerminated<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            last: None,
            done: false,
        }
    }
}

impl<R: Read> Read for NewlineTerminated<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }

        let n = self.inner.read(buf)?;
        if n > 0 {
            self.last = Some(buf[n - 1]);
            return Ok(n);
        }

        self.done = true;
        match self.last {
            Some(byte) if byte != b'\n' => {
                buf[0] = b'\n';
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

fn format_name(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
    .to_string()
}

/// Pick the delimiter that splits the header and agrees with the most data
/// lines.
///
/// A candidate must occur in the first non-blank line. Candidates are ranked
/// by how many of the following lines contain it exactly as often as the
/// header does, then by header field count, then by [`DELIMITERS`] order.
/// Falls back to a comma.
pub fn detect_delimiter(bytes: &[u8]) -> u8 {
    let mut lines = bytes
        .split(|&b| b == b'\n')
        .filter(|line| !line.trim_ascii().is_empty());
    let Some(header) = lines.next() else {
        return b',';
    };
    let sample: Vec<&[u8]> = lines.take(SNIFF_LINES).collect();

    DELIMITERS
        .iter()
        .enumerate()
        .filter_map(|(rank, &delimiter)| {
            let expected = count_byte(header, delimiter);
            if expected == 0 {
                return None;
            }
            let agreeing = sample
                .iter()
                .filter(|line| count_byte(line, delimiter) == expected)
                .count();
            Some(((agreeing, expected, std::cmp::Reverse(rank)), delimiter))
        })
        .max_by_key(|&(key, _)| key)
        .map_or(b',', |(_, delimiter)| delimiter)
}

fn count_byte(line: &[u8], byte: u8) -> usize {
    line.iter().filter(|&&b| b == byte).count()
}
