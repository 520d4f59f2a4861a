/*!
# Recipients CSV I/O

Reads and writes the `index,recipient,amount` file that feeds `build-tree`.
Rows are parsed with the engine's strict parsers; structural checks such as
duplicate indices are left to tree construction so every violation is reported
together.
*/

use crate::{
    errors::{DataError, DataResult},
    schemas::{RecipientRow, RECIPIENTS_CSV_HEADERS},
};
use airdrop_merkle::AllocationRecord;
use csv::{Reader, Writer};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

// ================================================================================================
// CSV Reading with Validation
// ================================================================================================

/// Read and validate a recipients CSV file
pub fn read_recipients_csv<P: AsRef<Path>>(path: P) -> DataResult<Vec<AllocationRecord>> {
    let file = File::open(path)?;
    read_recipients(file)
}

/// Read recipients from any reader; headers must match exactly.
pub fn read_recipients<R: Read>(reader: R) -> DataResult<Vec<AllocationRecord>> {
    let mut rdr = Reader::from_reader(reader);

    let headers = rdr.headers()?;
    validate_headers(headers.iter(), RECIPIENTS_CSV_HEADERS, "recipients.csv")?;

    let mut records = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let row: RecipientRow = result?;
        // header is line 1
        records.push(row_to_record(&row, i + 2)?);
    }

    if records.is_empty() {
        return Err(DataError::SchemaValidation(
            "Recipients CSV file is empty".to_string(),
        ));
    }

    Ok(records)
}

fn row_to_record(row: &RecipientRow, line: usize) -> DataResult<AllocationRecord> {
    AllocationRecord::parse(&row.index, &row.recipient, &row.amount).map_err(|source| {
        DataError::InvalidEntry {
            context: format!("recipients.csv line {}", line),
            source,
        }
    })
}

// ================================================================================================
// CSV Writing
// ================================================================================================

/// Write a recipients CSV file
pub fn write_recipients_csv<P: AsRef<Path>>(
    path: P,
    records: &[AllocationRecord],
) -> DataResult<()> {
    let file = File::create(path)?;
    write_recipients(file, records)
}

pub fn write_recipients<W: Write>(writer: W, records: &[AllocationRecord]) -> DataResult<()> {
    let mut wtr = Writer::from_writer(writer);

    // csv writes the header from the first serialized row
    for record in records {
        wtr.serialize(RecipientRow {
            index: record.index.to_string(),
            recipient: record.recipient.to_checksum(),
            amount: record.amount.to_string(),
        })?;
    }

    wtr.flush()?;
    Ok(())
}

// ================================================================================================
// Header Validation
// ================================================================================================

fn validate_headers<'a, I>(actual: I, expected: &[&str], file_type: &str) -> DataResult<()>
where
    I: Iterator<Item = &'a str>,
{
    let actual_headers: Vec<&str> = actual.map(str::trim).collect();

    if actual_headers.len() != expected.len() {
        return Err(DataError::SchemaValidation(format!(
            "{}: expected {} headers, found {}",
            file_type,
            expected.len(),
            actual_headers.len()
        )));
    }

    for (i, (actual, expected)) in actual_headers.iter().zip(expected.iter()).enumerate() {
        if actual != expected {
            return Err(DataError::SchemaValidation(format!(
                "{}: header {} should be '{}', found '{}'",
                file_type,
                i + 1,
                expected,
                actual
            )));
        }
    }

    Ok(())
}

// ================================================================================================
// Tests
// ================================================================================================
