//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) convert their
//! internal failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow` in the binary, while still preserving rich diagnostic detail.
//!
//! The module **does not** print diagnostics itself; the host decides where
//! they go and which exit code to use.

use std::fmt;
use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Invocation misuse (bad CLI arguments).
pub const EX_USAGE: i32 = 64;

/// Malformed input: lexical, syntax or resolving errors.
pub const EX_DATAERR: i32 = 65;

/// Uncaught runtime error in user code.
pub const EX_SOFTWARE: i32 = 70;

/// Failure reading input.
pub const EX_IOERR: i32 = 74;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        line: usize,
        /// ` at 'lexeme'` or ` at end`.
        location: String,
    },

    /// Static‑analysis failure found by the resolver.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        line: usize,
        location: String,
    },

    /// Runtime evaluation error.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

/// Renders the `at ...` part of a diagnostic for `token`.
fn location(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**, located at `token`.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse {
            message,
            line: token.line,
            location: location(token),
        }
    }

    /// Helper constructor for the **resolver**, located at `token`.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        LoxError::Resolve {
            message,
            line: token.line,
            location: location(token),
        }
    }

    /// Helper constructor for the **interpreter**; `token` is the operator,
    /// name or paren the failure is attributed to.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", token.line, message);

        LoxError::Runtime {
            message,
            line: token.line,
        }
    }

    /// Process exit code a host should use when this error ends a run.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Lex { .. } | LoxError::Parse { .. } | LoxError::Resolve { .. } => EX_DATAERR,
            LoxError::Runtime { .. } => EX_SOFTWARE,
            LoxError::Io(_) | LoxError::Utf8(_) => EX_IOERR,
        }
    }

    /// `true` for the syntax-class kinds that withhold execution.
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            LoxError::Lex { .. } | LoxError::Parse { .. } | LoxError::Resolve { .. }
        )
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

/// Outcome of a failed `run`: either the static checks rejected the program
/// (every diagnostic is kept) or execution stopped at a runtime error.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{}", Diagnostics(.0))]
    Static(Vec<LoxError>),

    #[error(transparent)]
    Runtime(LoxError),
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Static(_) => EX_DATAERR,
            RunError::Runtime(e) => e.exit_code(),
        }
    }

    /// All diagnostics carried by this outcome, in report order.
    pub fn errors(&self) -> &[LoxError] {
        match self {
            RunError::Static(errors) => errors,
            RunError::Runtime(e) => std::slice::from_ref(e),
        }
    }
}

impl From<LoxError> for RunError {
    fn from(err: LoxError) -> Self {
        if err.is_static() {
            RunError::Static(vec![err])
        } else {
            RunError::Runtime(err)
        }
    }
}

/// One diagnostic per line.
struct Diagnostics<'a>(&'a [LoxError]);

impl fmt::Display for Diagnostics<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}
