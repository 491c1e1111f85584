//! JSON I/O handling for the `invoke` command
//!
//! - Input: one gateway event as a JSON document on stdin
//! - Output: one response envelope as a JSON line on stdout

use std::io::{self, Read, Write};

use crate::api::Envelope;

use super::errors::{CliError, CliResult};

/// Read the whole event document from `reader`
pub fn read_event<R: Read>(mut reader: R) -> CliResult<String> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;

    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    Ok(input)
}

/// Write `envelope` as a single JSON line to `writer`
pub fn write_envelope<W: Write>(mut writer: W, envelope: &Envelope) -> CliResult<()> {
    serde_json::to_writer(&mut writer, envelope)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_stdin_event() -> CliResult<String> {
    read_event(io::stdin().lock())
}

pub fn write_stdout_envelope(envelope: &Envelope) -> CliResult<()> {
    write_envelope(io::stdout().lock(), envelope)
}
