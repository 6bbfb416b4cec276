use crate::result::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A record that can be written as one CSV line
pub trait CsvRecord {
    /// Column names, in field order
    const HEADER: &'static [&'static str];

    fn to_fields(&self) -> Vec<String>;
}

/// Quote a field when it contains a separator, a quote or a line break
pub fn escape_csv_value(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
    {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_csv_row<W: Write, S: AsRef<str>>(writer: &mut W, values: &[S]) -> Result<()> {
    let csv_line = values
        .iter()
        .map(|v| escape_csv_value(v.as_ref()))
        .collect::<Vec<_>>()
        .join(",");

    writeln!(writer, "{csv_line}")?;
    Ok(())
}

/// Write a header line followed by one line per record
pub fn write_csv<W: Write, R: CsvRecord>(writer: &mut W, records: &[R]) -> Result<()> {
    write_csv_row(writer, R::HEADER)?;
    for record in records {
        write_csv_row(writer, &record.to_fields())?;
    }
    Ok(())
}

/// Write records to a CSV file, replacing any existing file
pub fn write_csv_file<R: CsvRecord>(path: &Path, records: &[R]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_csv(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}
