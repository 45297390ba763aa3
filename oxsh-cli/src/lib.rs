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

//! The interactive front end: prompt, read loop, and diagnostics.
//!
//! One iteration of the loop prints the prompt, [reads](input) a line into
//! the lexer, parses the tokens, and hands the statement list to the
//! executor. A lexer or parser error rejects the line with a one-line
//! diagnostic and the loop continues; end of input ends the session with a
//! final newline and exit status zero. Setting the `OXSH_TRACE`
//! environment variable dumps the [token stream and the syntax
//! tree](trace) of every line to stderr.

pub mod input;
pub mod trace;

use crate::input::LineStatus;
use oxsh_env::ShellState;
use oxsh_semantics::Executor;
use oxsh_syntax::lexer::Lexer;
use oxsh_syntax::parser;
use std::io::{self, Write};
use std::process::ExitCode;

/// Runs the prompt loop until end of input.
pub fn run() -> ExitCode {
    let mut state = ShellState::init();
    let mut lexer = Lexer::new();
    let tracing = trace::enabled();
    loop {
        print!("> ");
        let _: io::Result<_> = io::stdout().flush();
        let line = input::read_line(&mut lexer);
        if line == LineStatus::Interrupted {
            // Abandon the partial line and offer a fresh prompt.
            println!();
            continue;
        }
        match lexer.end() {
            Err(error) => eprintln!("lexer error: {}", error),
            Ok(tokens) => {
                if tracing {
                    let _: io::Result<_> = trace::log_tokens(&mut io::stderr(), &tokens);
                }
                match parser::parse(tokens) {
                    Err(error) => eprintln!("{}", error),
                    Ok(statements) => {
                        if tracing {
                            let _: io::Result<_> = trace::log_ast(&mut io::stderr(), &statements);
                        }
                        Executor::new(&mut state).run(&statements);
                    }
                }
            }
        }
        if line == LineStatus::Eof {
            break;
        }
    }
    println!();
    ExitCode::SUCCESS
}
