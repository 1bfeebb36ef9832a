//! NDJSON transport for JSON-RPC 2.0.
//!
//! One message per line in each direction. The default instance reads stdin
//! and writes stdout; any buffered reader and writer pair works, which keeps
//! the framing testable without a process boundary.

use std::io::{BufRead, BufReader, BufWriter, Stdin, Stdout, Write};

use crate::error::Error;
use crate::transports::Transport;

/// Newline-delimited JSON transport, stdin/stdout by default.
///
/// Batch arrays must arrive on a single line. Blank lines are skipped and a
/// trailing `\r` is stripped.
pub struct Stdio<R = BufReader<Stdin>, W = BufWriter<Stdout>> {
    reader: R,
    writer: W,
    line: String,
}

impl Stdio {
    /// Frame messages over stdin and stdout.
    pub fn new() -> Self {
        Self::from_parts(BufReader::new(std::io::stdin()), BufWriter::new(std::io::stdout()))
    }
}

impl<R, W> Stdio<R, W>
where
    R: BufRead,
    W: Write,
{
    /// Frame messages over an arbitrary reader and writer.
    pub fn from_parts(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new(),
        }
    }

    /// Give back the writer, e.g. to inspect what was sent.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Read the next non-blank line.
    pub fn read_message(&mut self) -> Result<String, Error> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Err(Error::transport(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "End of input",
                )));
            }

            let message = self.line.trim_end_matches(['\n', '\r']);
            if !message.trim().is_empty() {
                return Ok(message.to_string());
            }
        }
    }

    /// Write `message` as one line and flush.
    pub fn write_message(&mut self, message: &str) -> Result<(), Error> {
        self.writer.write_all(message.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<R, W> Transport for Stdio<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn receive_message(&mut self) -> Result<String, Error> {
        self.read_message()
    }

    fn send_message(&mut self, json: &str) -> Result<(), Error> {
        self.write_message(json)
    }
}

impl Default for Stdio {
    fn default() -> Self {
        Self::new()
    }
}
