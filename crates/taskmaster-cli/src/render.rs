//! Prints daemon responses as they stream in.

use std::io::{self, Write};

use crate::transport::Completion;

pub(crate) const SHUTDOWN_ACKNOWLEDGEMENT: &str = "Shutdown successful";

/// Forwards response bytes verbatim to a writer.
///
/// Output is flushed after every chunk so a following tail reaches the
/// terminal immediately. [`Renderer::finish`] terminates the output with a
/// newline when the daemon did not.
#[derive(Debug)]
pub struct Renderer<W: Write> {
    writer: W,
    printed: bool,
    ends_with_newline: bool,
}

impl<W: Write> Renderer<W> {
    /// Wraps `writer` for a fresh exchange.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            printed: false,
            ends_with_newline: false,
        }
    }

    /// Writes and flushes one chunk. Empty chunks are ignored.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        let Some(&last) = chunk.last() else {
            return Ok(());
        };
        self.writer.write_all(chunk)?;
        self.writer.flush()?;
        self.printed = true;
        self.ends_with_newline = last == b'\n';
        Ok(())
    }

    /// Whether any response bytes have been printed.
    #[must_use]
    pub const fn printed(&self) -> bool {
        self.printed
    }

    /// Completes the output of one exchange.
    ///
    /// `completion` is `None` when the exchange failed part way through; the
    /// output is still newline-terminated but no acknowledgement is printed.
    pub fn finish(&mut self, shutdown: bool, completion: Option<Completion>) -> io::Result<()> {
        if self.printed && !self.ends_with_newline {
            self.writer.write_all(b"\n")?;
        } else if !self.printed && shutdown && completion == Some(Completion::PeerClosed) {
            writeln!(self.writer, "{SHUTDOWN_ACKNOWLEDGEMENT}")?;
        }
        self.writer.flush()
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
