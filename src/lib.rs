//! # ordtrees
//! Ordered in-memory containers: an AVL tree whose nodes know their
//! in-order position, and a B-tree of configurable order.
//!
//! ## Features
//! - [`AvlTree`]: self-balancing insertion, ascending iteration,
//!   lookup by position (negative positions count from the end) and
//!   inclusive range queries.
//! - [`BTree`]: insertion with node splitting, removal with sibling
//!   transfer and merging, merging a child into its parent, and a
//!   structural `validate` check.
//! - A line-oriented shell over both trees, used by the binary in
//!   `main.rs`.
//!
//! ## Usage
//! All reusable logic and unit tests live in the library so the binary
//! stays a thin wrapper around [`repl_loop`].
// =====================================================================
// File: lib.rs
//
//   The shell accepts the following commands (case-insensitive):
//
//     `ADD <n> [<n> ...]`  -> Add integers to both trees: OK
//     `REMOVE <n>`         -> Remove from the B-tree: 1 if removed, 0 if not found
//     `GET <i>`            -> AVL value at position i (negative from the end) or nil
//     `RANGE <a> <b>`      -> AVL keys in [a, b], one per line, then END
//     `LEN`                -> avl=<n> btree=<m>
//     `CONTAINS <n>`       -> avl=<0|1> btree=<0|1>
//     `PRINT`              -> Render both trees
//     `CHECK`              -> Validate the B-tree: OK or ERR: <violation>
//     `EXIT` / `QUIT`      -> Terminate the shell
//
//   Malformed input prints a single `ERR: ...` line and the shell
//   keeps reading.
// =====================================================================
pub mod avl;
pub use avl::{AvlNode, AvlTree};

pub mod btree;
pub use btree::{BNode, BTree, NodeId};

pub mod error;
pub use error::BTreeError;

pub mod config;
pub use config::{ConfigError, ShellConfig};

pub mod session;
pub use session::Session;

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

/// Result of handling a single user command.
///
/// - `Continue` means the REPL should keep running.
/// - `Exit` means the REPL should break out and terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    Exit,
}

/// Why a command line could not be carried out.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("{cmd} expects {expected}")]
    Arguments { cmd: String, expected: &'static str },

    #[error("'{0}' is not a valid integer")]
    InvalidInteger(String),

    #[error(transparent)]
    Tree(#[from] BTreeError),

    #[error(transparent)]
    Io(#[from] io::Error),
}


/// Read–Evaluate–Print Loop (REPL) over a [`Session`].
///
/// Reads one command per line from `input`, executes it against the
/// session and writes the response to `output`. Stops at end of input or
/// after `EXIT`/`QUIT`. Only I/O failures end the loop with an error;
/// bad commands are answered with an `ERR:` line.
///
/// # Example
/// ```
/// use ordtrees::{repl_loop, Session, ShellConfig};
///
/// let mut session = Session::new(&ShellConfig::default()).unwrap();
/// let mut output = Vec::new();
/// repl_loop(&mut session, "ADD 3 1 2\nGET -1\n".as_bytes(), &mut output).unwrap();
/// assert_eq!(String::from_utf8(output).unwrap(), "OK\n3\n");
/// ```
pub fn repl_loop<R: BufRead, W: Write>(session: &mut Session, input: R, output: &mut W) -> io::Result<()> {
    for input_line in input.lines() {
        let full_command = input_line?;
        let (cmd, args) = parse_command(&full_command);
        if cmd.is_empty() {
            continue;
        }

        match handle_command(&cmd, &args, session, output) {
            Ok(CommandResult::Exit) => break,
            Ok(CommandResult::Continue) => {}
            Err(CommandError::Io(e)) => return Err(e),
            Err(e) => {
                warn!(command = %cmd, error = %e, "command rejected");
                writeln!(output, "ERR: {e}")?;
            }
        }
    }
    output.flush()
}


/// Parses a raw input line into a command and its arguments.
///
/// The first token is treated as the command (normalized to uppercase),
/// and the remaining tokens are collected as arguments. Leading and
/// trailing whitespace is ignored.
fn parse_command(line: &str) -> (String, Vec<&str>) {
    let mut command_segments = line.split_whitespace();
    let cmd = command_segments.next().unwrap_or("").to_uppercase();
    (cmd, command_segments.collect())
}

fn parse_int<N: FromStr>(raw: &str) -> Result<N, CommandError> {
    raw.parse().map_err(|_| CommandError::InvalidInteger(raw.to_string()))
}

/// Fails unless exactly `count` arguments were given.
fn expect_args(cmd: &str, args: &[&str], count: usize, expected: &'static str) -> Result<(), CommandError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(CommandError::Arguments {
            cmd: cmd.to_string(),
            expected,
        })
    }
}


/// Handles a single command and returns whether the REPL should continue.
fn handle_command<W: Write>(
    cmd: &str,
    args: &[&str],
    session: &mut Session,
    out: &mut W,
) -> Result<CommandResult, CommandError> {
    debug!(command = cmd, ?args, "handling command");
    match cmd {
        // ADD <n> [<n> ...]; nothing is added unless every argument parses
        "ADD" => {
            if args.is_empty() {
                return Err(CommandError::Arguments {
                    cmd: cmd.to_string(),
                    expected: "at least one integer",
                });
            }
            let values = args.iter().map(|a| parse_int::<i64>(a)).collect::<Result<Vec<_>, _>>()?;
            for value in values {
                session.add(value);
            }
            writeln!(out, "OK")?;
        }

        "REMOVE" => {
            expect_args(cmd, args, 1, "one integer")?;
            let value: i64 = parse_int(args[0])?;
            match session.btree.remove(&value) {
                Ok(()) => writeln!(out, "1")?,
                Err(BTreeError::NotFound) => writeln!(out, "0")?,
                Err(e) => return Err(e.into()),
            }
        }

        "GET" => {
            expect_args(cmd, args, 1, "one position")?;
            let index: isize = parse_int(args[0])?;
            match session.avl.get(index) {
                Some(value) => writeln!(out, "{value}")?,
                None => writeln!(out, "nil")?,
            }
        }

        // RANGE <start> <end>, both inclusive
        "RANGE" => {
            expect_args(cmd, args, 2, "a start and an end")?;
            let start: i64 = parse_int(args[0])?;
            let end: i64 = parse_int(args[1])?;
            for value in session.avl.range(&start, &end) {
                writeln!(out, "{value}")?;
            }
            writeln!(out, "END")?;
        }

        "LEN" => {
            expect_args(cmd, args, 0, "no arguments")?;
            writeln!(out, "avl={} btree={}", session.avl.len(), session.btree.len())?;
        }

        "CONTAINS" => {
            expect_args(cmd, args, 1, "one integer")?;
            let value: i64 = parse_int(args[0])?;
            writeln!(
                out,
                "avl={} btree={}",
                u8::from(session.avl.contains(&value)),
                u8::from(session.btree.contains(&value))
            )?;
        }

        "PRINT" => {
            expect_args(cmd, args, 0, "no arguments")?;
            writeln!(out, "avl:")?;
            write!(out, "{}", session.avl)?;
            writeln!(out, "btree:")?;
            write!(out, "{}", session.btree)?;
        }

        "CHECK" => {
            expect_args(cmd, args, 0, "no arguments")?;
            session.btree.validate()?;
            writeln!(out, "OK")?;
        }

        "EXIT" | "QUIT" => {
            writeln!(out, "Exiting...")?;
            return Ok(CommandResult::Exit);
        }

        _ => return Err(CommandError::Unknown(cmd.to_string())),
    }
    Ok(CommandResult::Continue)
}


// =====================================================================
// Unit Tests for command parsing
// =====================================================================
