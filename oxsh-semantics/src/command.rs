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

//! Simple-command execution and foreground job placement.
//!
//! A foreground child is started with a small choreography that closes the
//! classic job-control race: the child stops itself with `SIGSTOP` right
//! after the fork, the parent observes the stop, moves the child into its
//! own process group, hands it the terminal, and only then resumes it with
//! `SIGCONT`. Without the stop, the child could `exec` and start reading
//! the terminal before the parent had assigned the foreground group.

use crate::{Executor, Mode, builtin};
use nix::sys::signal::Signal;
use nix::sys::wait::{WaitPidFlag, WaitStatus};
use nix::unistd::{ForkResult, Pid};
use oxsh_env::signal;
use oxsh_env::system;
use oxsh_env::{ExitStatus, ShellState};

impl Executor<'_> {
    /// Executes one command: a builtin in-process, anything else through
    /// `fork` and `execvp`.
    pub(crate) fn execute_command(&mut self, argv: &[String]) {
        let Some(name) = argv.first() else { return };

        if let Some(builtin) = builtin::find(name) {
            let status = builtin(argv, self.state);
            if self.state.in_pipeline {
                system::exit_now(status)
            }
            self.state.last_status = status;
            return;
        }

        if self.mode == Mode::Replace {
            exec_or_die(argv)
        }

        signal::disable_zombie_cleanup();
        match unsafe { system::fork() } {
            ForkResult::Child => {
                // Hold still until the parent has placed us.
                let _: Result<_, _> = system::raise(Signal::SIGSTOP);
                signal::reset_for_child();
                exec_or_die(argv)
            }
            ForkResult::Parent { child } => {
                self.state.last_status = supervise_foreground(self.state, child);
            }
        }
        signal::enable_zombie_cleanup();
    }
}

/// Replaces the current process with the command, reporting and dying on
/// failure.
fn exec_or_die(argv: &[String]) -> ! {
    let errno = system::execvp(argv);
    let name = argv.first().map(String::as_str).unwrap_or("exec");
    eprintln!("{}: {}", name, errno.desc());
    system::exit_now(ExitStatus::EXEC_FAILURE)
}

/// First half of the placement dance: waits for the self-stopped child,
/// gives it its own process group and the terminal, and resumes it.
///
/// Returns the exit status early if the child managed to die before
/// stopping; the dance is then moot.
pub(crate) fn place_foreground(state: &mut ShellState, pid: Pid) -> Option<ExitStatus> {
    match system::waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
        Ok(WaitStatus::Stopped(..)) => {}
        Ok(status) => {
            if let Some(exit) = ExitStatus::from_wait(status) {
                return Some(exit);
            }
        }
        Err(_) => return Some(ExitStatus::FAILURE),
    }
    let _: Result<_, _> = system::setpgid(pid, pid);
    state.set_fg_pgroup(pid);
    let _: Result<_, _> = system::kill(pid, Signal::SIGCONT);
    None
}

/// Runs the whole placement dance and waits for the child to finish,
/// restoring the terminal to the shell afterwards.
pub(crate) fn supervise_foreground(state: &mut ShellState, pid: Pid) -> ExitStatus {
    if let Some(early) = place_foreground(state, pid) {
        return early;
    }
    let status = wait_for_termination(pid);
    state.restore_fg_pgroup();
    status
}

/// Blocks until `pid` terminates and normalizes its status: the exit code
/// for a normal exit, `128 + signal` otherwise.
pub(crate) fn wait_for_termination(pid: Pid) -> ExitStatus {
    loop {
        match system::waitpid(pid, None) {
            Ok(status) => {
                if let Some(exit) = ExitStatus::from_wait(status) {
                    return exit;
                }
            }
            Err(_) => return ExitStatus::FAILURE,
        }
    }
}
