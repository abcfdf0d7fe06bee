//! Destination for `print` output and REPL echoes.
//!
//! Enum dispatch rather than a trait object: there are exactly two sinks.
//! - `Stdout`: the process standard output (default)
//! - `Buffer`: an in‑memory capture, for tests and embedding

use std::io::{self, Write};

#[derive(Debug, Default)]
pub enum Output {
    #[default]
    Stdout,
    Buffer(String),
}

impl Output {
    /// A capturing sink.
    pub fn buffer() -> Self {
        Output::Buffer(String::new())
    }

    /// Write `msg` followed by a newline.
    pub fn println(&mut self, msg: &str) -> io::Result<()> {
        match self {
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}", msg)
            }
            Output::Buffer(buf) => {
                buf.push_str(msg);
                buf.push('\n');
                Ok(())
            }
        }
    }

    /// Everything captured so far; empty for stdout.
    pub fn captured(&self) -> &str {
        match self {
            Output::Stdout => "",
            Output::Buffer(buf) => buf,
        }
    }

    /// Drop captured text.  No‑op for stdout.
    pub fn clear(&mut self) {
        if let Output::Buffer(buf) = self {
            buf.clear();
        }
    }
}
