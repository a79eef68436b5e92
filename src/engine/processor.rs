//! File processor: one input file → one [`Summary`].

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use log::{debug, warn};

use crate::engine::classify::RowClassifier;
use crate::engine::header::HeaderIndex;
use crate::error::FileError;
use crate::utils::config::UTF8_BOM;
use crate::{CountSettings, DEGENERATE_KEY, DuplicateHeaders, StockCounts, Summary};

/// Summary for a file with no data rows: the sentinel key with zero counts.
pub fn degenerate_summary() -> Summary {
    Summary::from([(DEGENERATE_KEY.to_string(), StockCounts::default())])
}

/// Drop a leading UTF-8 byte-order mark; every other byte is passed through.
pub fn strip_bom<R: Read>(mut reader: R) -> io::Result<impl Read> {
    let mut prefix = [0u8; 3];
    let mut filled = 0;
    while filled < prefix.len() {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    let keep = if filled == prefix.len() && prefix == UTF8_BOM {
        0
    } else {
        filled
    };
    Ok(io::Cursor::new(prefix).take(keep as u64).chain(reader))
}

/// Open `path` and summarize it. The file handle is released on every return path.
pub fn process_file(path: &Path, settings: &CountSettings) -> Result<Summary, FileError> {
    let file = File::open(path)?;
    process_reader(BufReader::new(file), path, settings)
}

/// Summarize delimited rows from `reader`. `path` is only used in log messages.
///
/// The first row is the header. Any decode or classification error fails the whole input;
/// there is no partial summary.
pub fn process_reader<R: Read>(
    reader: R,
    path: &Path,
    settings: &CountSettings,
) -> Result<Summary, FileError> {
    let mut rows = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(settings.delimiter)
        .from_reader(strip_bom(reader)?);

    let mut record = ByteRecord::new();
    if !rows.read_byte_record(&mut record)? {
        debug!("{}: empty file", path.display());
        return Ok(degenerate_summary());
    }

    let header = HeaderIndex::build(
        record.iter().map(String::from_utf8_lossy),
        settings.duplicate_headers,
    );
    if !header.duplicates().is_empty() && settings.duplicate_headers != DuplicateHeaders::Reject
    {
        warn!(
            "{}: duplicate header columns {:?}, resolved {:?}",
            path.display(),
            header.duplicates(),
            settings.duplicate_headers
        );
    }
    let classifier = RowClassifier::new(&header, settings)?;

    let mut summary = Summary::new();
    let mut data_rows = 0_usize;
    while rows.read_byte_record(&mut record)? {
        let (key, class) = classifier.classify(&record, data_rows)?;
        match summary.get_mut(key.as_ref()) {
            Some(counts) => counts.record(class),
            None => summary.entry(key.into_owned()).or_default().record(class),
        }
        data_rows += 1;
    }

    if data_rows == 0 {
        debug!("{}: header only", path.display());
        return Ok(degenerate_summary());
    }
    Ok(summary)
}
