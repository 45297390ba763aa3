// This file is part of oxsh, a job-control-aware command interpreter.
// Copyright (C) 2026 The oxsh developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Debug dumps of the token stream and the syntax tree.
//!
//! Enabled with the `OXSH_TRACE` environment variable; both dumps go to
//! stderr so they interleave with diagnostics, not with command output.

use itertools::Itertools;
use oxsh_syntax::syntax::{LogicalOp, Node, RedirEntry, Token};
use std::io::{self, Write};

/// Whether tracing was requested via a non-empty `OXSH_TRACE`.
#[must_use]
pub fn enabled() -> bool {
    std::env::var_os("OXSH_TRACE").is_some_and(|value| !value.is_empty())
}

/// Writes the token stream on one line, each token as `([text] kind)`.
pub fn log_tokens(w: &mut impl Write, tokens: &[Token]) -> io::Result<()> {
    writeln!(w, "LOG: TOKENS:")?;
    let line = tokens
        .iter()
        .map(|token| format!("([{}] {})", token, token.name()))
        .join(" ");
    writeln!(w, "{}", line)
}

/// Writes the statement list as an indented tree.
pub fn log_ast(w: &mut impl Write, statements: &[Node]) -> io::Result<()> {
    writeln!(w, "LOG: AST:")?;
    writeln!(w, "list:")?;
    for node in statements {
        log_node(w, node, 1)?;
    }
    Ok(())
}

fn indent(w: &mut impl Write, depth: usize) -> io::Result<()> {
    for _ in 0..depth {
        write!(w, "\t")?;
    }
    Ok(())
}

fn format_entry(entry: &RedirEntry) -> String {
    format!("{}{} {}", entry.target_fd, entry.kind, entry.filename)
}

fn log_node(w: &mut impl Write, node: &Node, depth: usize) -> io::Result<()> {
    indent(w, depth)?;
    match node {
        Node::Command(argv) => writeln!(w, "command: [{}]", argv.iter().join(", ")),
        Node::Subshell(body) => {
            writeln!(w, "subshell:")?;
            for child in body {
                log_node(w, child, depth + 1)?;
            }
            Ok(())
        }
        Node::Redirection { entries, child } => {
            writeln!(w, "redirect: [{}]", entries.iter().map(format_entry).join(", "))?;
            log_node(w, child, depth + 1)
        }
        Node::Pipeline(children) => {
            writeln!(w, "pipe:")?;
            for child in children {
                log_node(w, child, depth + 1)?;
            }
            Ok(())
        }
        Node::Logical { op, left, right } => {
            let name = match op {
                LogicalOp::And => "and",
                LogicalOp::Or => "or",
            };
            writeln!(w, "{}:", name)?;
            log_node(w, left, depth + 1)?;
            log_node(w, right, depth + 1)
        }
        Node::Background(child) => {
            writeln!(w, "background:")?;
            log_node(w, child, depth + 1)
        }
    }
}
