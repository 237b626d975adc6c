//! Line-oriented operator console.

use std::{
    fmt::Display,
    io::{self, Stdout, Write, stdout},
};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Stdin, stdin};

pub struct Console<R, W> {
    input: BufReader<R>,
    out: W,
}

impl Console<Stdin, Stdout> {
    pub fn stdio() -> Self {
        Self::new(stdin(), stdout())
    }
}

impl<R: AsyncRead + Unpin, W: Write> Console<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            input: BufReader::new(input),
            out,
        }
    }

    /// Print `text` without a newline and wait for one line of input.
    ///
    /// Returns `None` once input is closed. Bytes that are not UTF-8 are replaced, so a
    /// garbled answer is rejected by whoever parses it.
    pub async fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.out, "{text}")?;
        self.out.flush()?;

        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&line).trim().to_string()))
    }

    pub fn say(&mut self, line: impl Display) -> io::Result<()> {
        writeln!(self.out, "{line}")
    }

    /// Everything written so far, for writers that keep it.
    pub fn output(&self) -> &W {
        &self.out
    }
}
