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

//! Builtin utilities.
//!
//! A builtin runs inside the shell process itself, which is the point:
//! `cd` must change the interpreter's working directory, not a child's.
//! Inside a pipeline stage the caller turns the returned status into the
//! stage's process exit status.

use oxsh_env::system;
use oxsh_env::{ExitStatus, ShellState};
use std::path::Path;

pub(crate) type Builtin = fn(&[String], &mut ShellState) -> ExitStatus;

/// Looks up a builtin utility by command name.
pub(crate) fn find(name: &str) -> Option<Builtin> {
    match name {
        "cd" => Some(cd),
        _ => None,
    }
}

/// `cd [dir]`: changes the working directory, defaulting to `$HOME`.
fn cd(argv: &[String], _state: &mut ShellState) -> ExitStatus {
    let path = match argv.get(1) {
        Some(operand) => operand.clone(),
        None => match std::env::var("HOME") {
            Ok(home) => home,
            Err(_) => {
                eprintln!("cd: HOME variable is not set");
                return ExitStatus::FAILURE;
            }
        },
    };
    match system::chdir(Path::new(&path)) {
        Ok(()) => ExitStatus::SUCCESS,
        Err(errno) => {
            eprintln!("cd: {}: {}", path, errno.desc());
            ExitStatus::FAILURE
        }
    }
}
