//! A tree‑walk interpreter for the Lox scripting language.
//!
//! Pipeline: [`scanner`] → [`parser`] → [`resolver`] → [`interpreter`].
//! [`Lox`] drives one source text through all of it and keeps interpreter
//! state between runs, which is what the REPL needs.

pub mod ast;
pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use log::{debug, info};

use crate::ast::{Expr, Stmt};
use crate::error::{LoxError, RunError};
use crate::interpreter::Interpreter;
use crate::output::Output;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::scan_tokens;
use crate::value::Value;

/// The runner: owns one interpreter and feeds it source texts.
pub struct Lox {
    interpreter: Interpreter,
    next_expr_id: usize,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    /// A runner printing to standard output.
    pub fn new() -> Self {
        Self::with_output(Output::Stdout)
    }

    pub fn with_output(output: Output) -> Self {
        Self {
            interpreter: Interpreter::with_output(output),
            next_expr_id: 0,
        }
    }

    pub fn output(&self) -> &Output {
        self.interpreter.output()
    }

    pub fn output_mut(&mut self) -> &mut Output {
        self.interpreter.output_mut()
    }

    /// Scan, parse and resolve `source`.  On success the resolver's table is
    /// installed in the interpreter and the program is ready to execute.
    pub fn compile(&mut self, source: &str) -> Result<Vec<Stmt>, RunError> {
        let mut parser = self.parser_for(source);
        let parsed = parser.parse();
        self.next_expr_id = parser.next_id();

        let statements = parsed.map_err(RunError::Static)?;
        self.install(Resolver::new().resolve(&statements))?;

        Ok(statements)
    }

    pub fn execute(&mut self, statements: &[Stmt]) -> Result<(), RunError> {
        self.interpreter
            .interpret(statements)
            .map_err(RunError::Runtime)
    }

    /// Run a script.  Nothing executes if any static error was found.
    pub fn run(&mut self, source: &str) -> Result<(), RunError> {
        info!("Running script ({} bytes)", source.len());

        let statements = self.compile(source)?;
        self.execute(&statements)
    }

    /// Run one line typed at the prompt.  A trailing bare expression is
    /// evaluated and its value echoed.
    pub fn run_prompt(&mut self, source: &str) -> Result<(), RunError> {
        let mut parser = self.parser_for(source);
        let parsed = parser.parse_repl();
        self.next_expr_id = parser.next_id();

        let (statements, expr) = parsed.map_err(RunError::Static)?;

        self.install(Resolver::new().resolve(&statements))?;
        if let Some(expr) = &expr {
            self.install(Resolver::new().resolve_expression(expr))?;
        }

        self.execute(&statements)?;

        if let Some(expr) = &expr {
            self.interpreter
                .interpret_expression(expr)
                .map_err(RunError::Runtime)?;
        }

        Ok(())
    }

    /// Evaluate `source` as a single expression.
    pub fn evaluate(&mut self, source: &str) -> Result<Value, RunError> {
        let expr: Expr = self.parse_expression(source)?;

        self.interpreter.evaluate(&expr).map_err(RunError::Runtime)
    }

    /// Parse `source` as a single expression without evaluating it.
    pub fn parse_expression(&mut self, source: &str) -> Result<Expr, RunError> {
        let mut parser = self.parser_for(source);
        let parsed = parser.parse_expression();
        self.next_expr_id = parser.next_id();

        let expr = parsed.map_err(RunError::Static)?;
        self.install(Resolver::new().resolve_expression(&expr))?;

        Ok(expr)
    }

    /// Scan `source`, failing on lexical errors only once the parser has had a
    /// chance to add its own diagnostics.
    fn parser_for(&self, source: &str) -> StagedParser {
        let (tokens, lex_errors) = scan_tokens(source);

        StagedParser {
            parser: Parser::new(tokens).with_first_id(self.next_expr_id),
            lex_errors,
        }
    }

    fn install(
        &mut self,
        resolved: Result<resolver::Locals, Vec<LoxError>>,
    ) -> Result<(), RunError> {
        let locals = resolved.map_err(RunError::Static)?;
        debug!("Installing {} resolved local(s)", locals.len());
        self.interpreter.resolve(locals);
        Ok(())
    }
}

/// A parser plus the lexical errors met while scanning its input.  Every
/// parse entry point merges both, lexical errors first.
struct StagedParser {
    parser: Parser,
    lex_errors: Vec<LoxError>,
}

impl StagedParser {
    fn next_id(&self) -> usize {
        self.parser.next_id()
    }

    fn merge<T>(&mut self, parsed: Result<T, Vec<LoxError>>) -> Result<T, Vec<LoxError>> {
        let mut errors = std::mem::take(&mut self.lex_errors);

        match parsed {
            Ok(value) if errors.is_empty() => Ok(value),
            Ok(_) => Err(errors),
            Err(parse_errors) => {
                errors.extend(parse_errors);
                Err(errors)
            }
        }
    }

    fn parse(&mut self) -> Result<Vec<Stmt>, Vec<LoxError>> {
        let parsed = self.parser.parse();
        self.merge(parsed)
    }

    fn parse_repl(&mut self) -> Result<(Vec<Stmt>, Option<Expr>), Vec<LoxError>> {
        let parsed = self.parser.parse_repl();
        self.merge(parsed)
    }

    fn parse_expression(&mut self) -> Result<Expr, Vec<LoxError>> {
        let parsed = self.parser.parse_expression();
        self.merge(parsed)
    }
}
