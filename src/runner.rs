//! Stream runner for the `vjson` tool
//!
//! Splits an input stream into messages on the configured delimiter and
//! runs each one through a codec. One bad message never stops the run.

use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use vehicle_json::config::IoConfig;
use vehicle_json::error::{Result, ToolError};
use vehicle_json::stats::Stats;
use vehicle_json::Codec;

/// What to do with each decoded message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Decode only
    Check,
    /// Decode, re-encode and write to the output
    Canon,
}

/// Drives a codec over a delimited byte stream
pub struct Runner<'a, C: Codec> {
    codec: C,
    io: &'a IoConfig,
    stats: Stats,
    /// Encode buffer, reused for every message
    buffer: Vec<u8>,
}

impl<'a, C: Codec> Runner<'a, C> {
    pub fn new(codec: C, io: &'a IoConfig) -> Self {
        Self {
            codec,
            io,
            stats: Stats::new(),
            buffer: vec![0; io.buffer_size],
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Process every message in `input`
    ///
    /// `source` labels I/O errors (a file path, or `<stdin>`). At most
    /// `max_message_size` bytes of a message are held in memory; the rest
    /// of an oversized message is skipped.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mode: Mode,
        mut input: R,
        source: &Path,
        output: &mut W,
    ) -> Result<()> {
        let delimiter = self.io.delimiter.byte();
        let max = self.io.max_message_size;
        // Room for the delimiter, so a message of exactly `max` bytes fits
        let limit = max as u64 + 1;
        let mut chunk = Vec::with_capacity(max + 1);
        let mut number = 0;

        loop {
            chunk.clear();
            let read = (&mut input)
                .take(limit)
                .read_until(delimiter, &mut chunk)
                .map_err(|e| io_error(source, e))?;
            if read == 0 {
                break;
            }
            // Messages are numbered from 1, like editor lines
            number += 1;

            if chunk.last() == Some(&delimiter) {
                chunk.pop();
            } else if read as u64 == limit {
                let rest =
                    discard_message(&mut input, delimiter).map_err(|e| io_error(source, e))?;
                let err = ToolError::MessageTooLarge {
                    size: read + rest,
                    max,
                };
                warn!("message {}: {}", number, err);
                continue;
            }

            let message = trim(&chunk);
            if message.is_empty() {
                continue;
            }

            let decoded = match self.codec.decode(message) {
                Ok(decoded) => {
                    self.stats.record_decoded(decoded.kind(), message.len());
                    debug!("message {}: {}", number, decoded.kind().as_str());
                    decoded
                }
                Err(err) => {
                    self.stats.record_rejected(&err, message.len());
                    warn!("message {}: rejected: {}", number, err);
                    continue;
                }
            };

            if mode == Mode::Check {
                continue;
            }

            match self.codec.encode(&decoded, &mut self.buffer) {
                Ok(written) => {
                    self.stats.record_encoded(written);
                    output
                        .write_all(&self.buffer[..written])
                        .and_then(|()| output.write_all(&[delimiter]))
                        .map_err(|e| io_error(Path::new("<stdout>"), e))?;
                }
                Err(err) => {
                    self.stats.record_encode_failure(&err);
                    warn!("message {}: encode failed: {}", number, err);
                }
            }
        }

        output
            .flush()
            .map_err(|e| io_error(Path::new("<stdout>"), e))
    }
}

/// Skip input through the next delimiter, returning the bytes dropped
/// before it
fn discard_message<R: BufRead>(input: &mut R, delimiter: u8) -> io::Result<usize> {
    let mut discarded = 0;
    loop {
        let available = input.fill_buf()?;
        if available.is_empty() {
            return Ok(discarded);
        }
        match available.iter().position(|&b| b == delimiter) {
            Some(i) => {
                input.consume(i + 1);
                return Ok(discarded + i);
            }
            None => {
                let n = available.len();
                input.consume(n);
                discarded += n;
            }
        }
    }
}

/// Strip surrounding ASCII whitespace (including a trailing `\r`)
fn trim(chunk: &[u8]) -> &[u8] {
    let start = chunk
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(chunk.len());
    let end = chunk
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &chunk[start..end]
}

fn io_error(path: &Path, source: std::io::Error) -> ToolError {
    ToolError::Io {
        path: PathBuf::from(path),
        source,
    }
}
