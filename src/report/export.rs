use std::io::Write;

use csv::WriterBuilder;

use super::Report;
use crate::core::ProjectionRecord;
use crate::error::Result;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Trailing field that marks the highlighted row in the report CSV.
pub const RETIREMENT_MARKER: &str = "Retirement Year";

/// Spreadsheet download: title row, assumptions row, header row, then the
/// formatted body rows. The highlighted row carries one extra trailing field,
/// so rows differ in length and the writer is flexible.
pub fn write_report_csv<W: Write>(report: &Report, writer: W) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().flexible(true).from_writer(writer);

    csv_writer.write_record([report.title.as_str()])?;
    csv_writer.write_record([report.assumptions.as_str()])?;
    csv_writer.write_record(report.columns.iter().map(|c| c.header.as_str()))?;
    for row in &report.rows {
        let marker = row.highlighted.then_some(RETIREMENT_MARKER);
        csv_writer.write_record(row.cells.iter().map(|c| c.text.as_str()).chain(marker))?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn report_csv_string(report: &Report) -> Result<String> {
    let mut buffer = Vec::new();
    write_report_csv(report, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Raw numeric dump: camelCase record field names as headers, one row per year.
pub fn write_records_csv<W: Write>(records: &[ProjectionRecord], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut count = 0;
    for record in records {
        csv_writer.serialize(record)?;
        count += 1;
    }

    csv_writer.flush()?;
    Ok(count)
}

pub fn records_csv_string(records: &[ProjectionRecord]) -> Result<String> {
    let mut csv_writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        csv_writer.serialize(record)?;
    }
    let buffer = csv_writer.into_inner()?;
    Ok(String::from_utf8(buffer)?)
}
