use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rox::ast_printer::AstPrinter;
use rox::error::{RunError, EX_DATAERR, EX_USAGE};
use rox::scanner::Scanner;
use rox::token::Token;
use rox::Lox;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses a program and prints its AST as S-expressions
    Parse { filename: PathBuf },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs a Lox program; starts an interactive prompt when no file is given
    Run {
        filename: Option<PathBuf>,

        /// Print the parsed program to stderr before running it
        #[arg(long)]
        print_ast: bool,
    },
}

/// Reads a script through a read‑only memory map and validates it as UTF‑8.
fn read_file(filename: &Path) -> rox::error::Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename)?;

    // Mapping an empty file is an error on some platforms.
    if file.metadata()?.len() == 0 {
        return Ok(String::new());
    }

    // SAFETY: the map is read‑only and copied out before returning; scripts
    // are not expected to be truncated while being read.
    let map = unsafe { Mmap::map(&file) }?;
    let source = std::str::from_utf8(&map)?.to_owned();

    info!("Read {} bytes from {:?}", source.len(), filename);

    Ok(source)
}

/// Loads `filename` or exits with the I/O status.
fn load(filename: &Path) -> String {
    read_file(filename).unwrap_or_else(|e| {
        eprintln!("Failed to read file {:?}: {}", filename, e);
        std::process::exit(e.exit_code());
    })
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Prints every diagnostic and exits with the matching code.
fn fail(err: RunError) -> ! {
    debug!("Run failed: {:?}", err);
    eprintln!("{}", err);
    std::process::exit(err.exit_code());
}

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    let source = load(filename);
    let mut tokens: Vec<Token> = Vec::new();
    let mut tokenized = true;

    for token in Scanner::new(&source) {
        match token {
            Ok(token) => {
                if !json {
                    println!("{}", token);
                }
                tokens.push(token);
            }

            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code {}", EX_DATAERR);
        std::process::exit(EX_DATAERR);
    }

    info!("Tokenization completed successfully");
    Ok(())
}

fn run_prompt(lox: &mut Lox) -> Result<()> {
    info!("Starting interactive prompt");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        // Errors are reported and forgotten; the session goes on.
        if let Err(e) = lox.run_prompt(&line) {
            eprintln!("{}", e);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(EX_USAGE);
        }
    };

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => tokenize(&filename, json)?,

        Commands::Parse { filename } => {
            let source = load(&filename);
            let mut lox = Lox::new();

            match lox.compile(&source) {
                Ok(statements) => println!("{}", AstPrinter::print_program(&statements)),
                Err(e) => fail(e),
            }
        }

        Commands::Evaluate { filename } => {
            let source = load(&filename);
            let mut lox = Lox::new();

            match lox.evaluate(&source) {
                Ok(value) => println!("{}", value),
                Err(e) => fail(e),
            }
        }

        Commands::Run {
            filename: Some(filename),
            print_ast,
        } => {
            let source = load(&filename);
            let mut lox = Lox::new();

            let statements = lox.compile(&source).unwrap_or_else(|e| fail(e));
            info!("Parsed {} statements", statements.len());

            if print_ast {
                eprintln!("{}", AstPrinter::print_program(&statements));
            }

            if let Err(e) = lox.execute(&statements) {
                fail(e);
            }

            info!("Program executed successfully");
        }

        Commands::Run { filename: None, .. } => {
            let mut lox = Lox::new();
            run_prompt(&mut lox)?;
        }
    }

    Ok(())
}
