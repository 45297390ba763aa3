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

//! Process environment of the oxsh shell.
//!
//! This crate is the seam between the interpreter and the operating
//! system:
//!
//! - The [`system`] module wraps the POSIX calls the interpreter relies on,
//!   restarting on `EINTR` and enforcing the fatal-failure policy so the
//!   rest of the code never sees a raw return code.
//! - The [`signal`] module owns the interpreter's signal regime: the
//!   `SIGINT` note, the `SIGCHLD` zombie reaper, and the per-child reset.
//! - [`ShellState`] carries the interpreter-wide mutable state: the last
//!   exit status, the shell's process group, and the controlling terminal.

pub mod io;
pub mod signal;
pub mod system;

use crate::io::Fd;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use std::ffi::c_int;
use std::fmt;

/// Summarized result of executing a command.
///
/// Zero is success. The status of a child killed by a signal is folded
/// into the conventional `128 + signal` range.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExitStatus(pub c_int);

impl ExitStatus {
    /// Exit status of a successful command
    pub const SUCCESS: Self = ExitStatus(0);
    /// General failure status the interpreter itself produces
    pub const FAILURE: Self = ExitStatus(1);
    /// Status a child reports when `execvp` fails, and the interpreter's
    /// own status after an unrecoverable wrapper failure
    pub const EXEC_FAILURE: Self = ExitStatus(13);

    #[must_use]
    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Converts a terminated wait status into an exit status.
    ///
    /// Returns `None` for reports that are not a termination (a stopped or
    /// continued child), which callers treat as "keep waiting".
    #[must_use]
    pub fn from_wait(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(ExitStatus(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ExitStatus(128 + signal as c_int)),
            _ => None,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<c_int> for ExitStatus {
    fn from(value: c_int) -> ExitStatus {
        ExitStatus(value)
    }
}

/// Interpreter-wide mutable state.
///
/// Created once at startup and threaded through the executor for the whole
/// run. Forked children inherit a copy and may overwrite `pgid`,
/// `in_background`, and `in_pipeline` for their own subtree.
#[derive(Clone, Debug)]
pub struct ShellState {
    /// Exit status of the most recently completed command
    pub last_status: ExitStatus,
    /// Process group owning the terminal when no job is in the foreground
    pub pgid: Pid,
    /// Controlling terminal, if standard input is one
    pub tty_fd: Option<Fd>,
    /// Whether this process runs as a backgrounded subtree and must not
    /// touch the terminal's foreground group
    pub in_background: bool,
    /// Whether this process is a pipeline stage
    pub in_pipeline: bool,
}

impl ShellState {
    /// Initializes the interpreter's state and installs the interactive
    /// signal regime.
    ///
    /// This is meant to run exactly once, from `main`.
    #[must_use]
    pub fn init() -> Self {
        signal::install_interactive();
        signal::enable_zombie_cleanup();
        ShellState {
            last_status: ExitStatus::SUCCESS,
            pgid: system::getpgid(),
            tty_fd: system::stdin_tty(),
            in_background: false,
            in_pipeline: false,
        }
    }

    /// Hands the terminal's foreground to `pgid`.
    ///
    /// Does nothing when there is no terminal or the shell itself runs in
    /// the background.
    pub fn set_fg_pgroup(&self, pgid: Pid) {
        if self.in_background {
            return;
        }
        if let Some(fd) = self.tty_fd {
            let _: Result<_, _> = system::tcsetpgrp(fd, pgid);
        }
    }

    /// Returns the terminal's foreground to the shell's own group.
    pub fn restore_fg_pgroup(&self) {
        self.set_fg_pgroup(self.pgid);
    }
}
