use crate::error::EmitError;
use crate::flatten::schema::Schema;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes flattened rows as CSV: two header rows, then one row per record
pub struct RowWriter<W: Write> {
    writer: csv::Writer<W>,
    width: Option<usize>,
    rows_written: u64,
}

impl RowWriter<BufWriter<File>> {
    /// Create (or truncate) a CSV file at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, EmitError> {
        let file = File::create(path)?;
        Ok(RowWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write> RowWriter<W> {
    pub fn new(writer: W) -> Self {
        RowWriter {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .terminator(csv::Terminator::CRLF)
                .from_writer(writer),
            width: None,
            rows_written: 0,
        }
    }

    /// Write the display-header row followed by the sub-header row
    pub fn write_headers(&mut self, schema: &Schema) -> Result<(), EmitError> {
        if self.width.is_some() {
            return Err(EmitError::HeadersAlreadyWritten);
        }

        self.writer.write_record(schema.header_row())?;
        self.writer.write_record(schema.sub_header_row())?;
        self.width = Some(schema.column_count());
        Ok(())
    }

    pub fn write_row<S: AsRef<[u8]>>(&mut self, row: &[S]) -> Result<(), EmitError> {
        let expected = self.width.ok_or(EmitError::HeadersMissing)?;
        if row.len() != expected {
            return Err(EmitError::WidthMismatch {
                expected,
                found: row.len(),
            });
        }

        self.writer.write_record(row)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Data rows written so far, headers excluded
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn flush(&mut self) -> Result<(), EmitError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying sink
    pub fn finish(self) -> Result<W, EmitError> {
        self.writer
            .into_inner()
            .map_err(|e| EmitError::Io(e.into_error()))
    }
}
