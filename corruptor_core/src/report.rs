use crate::error::CorruptorError;
use crate::stream::ChangeRecord;
use std::io::{self, Write};

/// Formats change records with an address column wide enough for the largest
/// address in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeReport {
    address_width: usize,
}

impl ChangeReport {
    pub fn for_file_size(file_size: u64) -> Self {
        let max_address = file_size.saturating_sub(1);
        let digits = (u64::BITS - max_address.leading_zeros()).div_ceil(4) as usize;
        Self {
            address_width: digits.max(1),
        }
    }

    pub fn address_width(&self) -> usize {
        self.address_width
    }

    /// `0x<address>: 0x<old> -> 0x<new>`
    pub fn format(&self, record: &ChangeRecord) -> String {
        format!(
            "0x{:0width$x}: 0x{:02x} -> 0x{:02x}",
            record.address,
            record.old_byte,
            record.new_byte,
            width = self.address_width
        )
    }
}

/// Writes one report line per change record to `W`.
///
/// Writing happens inside the streaming callback, which cannot fail, so the
/// first write error is held until [`ReportWriter::finish`].
pub struct ReportWriter<W: Write> {
    out: W,
    report: ChangeReport,
    lines_written: u64,
    error: Option<io::Error>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W, report: ChangeReport) -> Self {
        Self {
            out,
            report,
            lines_written: 0,
            error: None,
        }
    }

    pub fn record(&mut self, record: &ChangeRecord) {
        if self.error.is_some() {
            return;
        }
        match writeln!(self.out, "{}", self.report.format(record)) {
            Ok(()) => self.lines_written += 1,
            Err(e) => self.error = Some(e),
        }
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Flushes the sink and returns it, or the first error seen while writing.
    pub fn finish(mut self) -> Result<W, CorruptorError> {
        if let Some(e) = self.error.take() {
            return Err(CorruptorError::Report(e));
        }
        self.out.flush().map_err(CorruptorError::Report)?;
        Ok(self.out)
    }
}
