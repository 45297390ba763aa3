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

//! Execution of the syntax tree.
//!
//! The [`Executor`] walks a statement list depth first and maps each node
//! onto the process machinery: `fork` and `execvp` for commands, pipes and
//! process groups for pipelines, descriptor save/restore for redirections,
//! and the terminal's foreground group for job placement. Every node's
//! result lands in [`ShellState::last_status`].
//!
//! Besides the ordinary walk in the parent shell, a walker can run in two
//! other modes, both only ever seen inside a forked child: *replace* (the
//! next command must `execvp` in place, used for pipeline stages) and
//! *exit* (the process terminates with the last status once the subtree is
//! done, used for backgrounded subtrees and subshells).

mod builtin;
mod command;
mod pipeline;
mod redir;

use nix::sys::signal::Signal;
use nix::unistd::{ForkResult, Pid};
use oxsh_env::signal;
use oxsh_env::system;
use oxsh_env::{ExitStatus, ShellState};
use oxsh_syntax::syntax::{LogicalOp, Node};

/// How the current walker relates to the process it runs in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Mode {
    /// The original interpreter: evaluate and return to the caller.
    Return,
    /// A pipeline stage: the next command overwrites this process.
    Replace,
    /// A disposable child: terminate with the last status after the
    /// subtree.
    Exit,
}

/// Walks a syntax tree against a [`ShellState`].
#[derive(Debug)]
pub struct Executor<'a> {
    pub(crate) state: &'a mut ShellState,
    pub(crate) mode: Mode,
}

impl<'a> Executor<'a> {
    pub fn new(state: &'a mut ShellState) -> Self {
        Executor {
            state,
            mode: Mode::Return,
        }
    }

    /// Runs a statement sequence in order, threading the exit status.
    pub fn run(&mut self, statements: &[Node]) {
        signal::enable_zombie_cleanup();
        for statement in statements {
            self.execute(statement);
        }
    }

    pub(crate) fn execute(&mut self, node: &Node) {
        match node {
            Node::Command(argv) => self.execute_command(argv),
            Node::Subshell(body) => self.execute_subshell(body),
            Node::Redirection { entries, child } => self.execute_redirection(entries, child),
            Node::Pipeline(children) => self.execute_pipeline(children),
            Node::Logical { op, left, right } => self.execute_logical(*op, left, right),
            Node::Background(child) => self.execute_background(child),
        }
    }

    /// `left && right` / `left || right` with short-circuit evaluation.
    fn execute_logical(&mut self, op: LogicalOp, left: &Node, right: &Node) {
        self.execute(left);
        let run_right = match op {
            LogicalOp::And => self.state.last_status.is_success(),
            LogicalOp::Or => !self.state.last_status.is_success(),
        };
        if run_right {
            self.execute(right);
        }
    }

    /// `child &`: the subtree runs in its own process group, detached from
    /// the terminal; the shell moves on with status zero.
    fn execute_background(&mut self, child: &Node) {
        match unsafe { system::fork() } {
            ForkResult::Child => {
                signal::reset_for_child();
                let _: Result<_, _> = system::setpgid(Pid::from_raw(0), Pid::from_raw(0));
                self.state.pgid = system::getpid();
                self.state.in_background = true;
                self.mode = Mode::Exit;
                self.execute(child);
                system::exit_now(self.state.last_status)
            }
            ForkResult::Parent { .. } => {
                self.state.last_status = ExitStatus::SUCCESS;
            }
        }
    }

    /// `( body )`: the statement list runs in a child so in-process
    /// changes like `cd` stay contained.
    fn execute_subshell(&mut self, body: &[Node]) {
        if self.mode != Mode::Return {
            // Already inside a disposable process; no further fork needed.
            self.mode = Mode::Exit;
            self.run(body);
            system::exit_now(self.state.last_status)
        }
        signal::disable_zombie_cleanup();
        match unsafe { system::fork() } {
            ForkResult::Child => {
                // Stop so the parent can place us before the body starts.
                let _: Result<_, _> = system::raise(Signal::SIGSTOP);
                self.state.pgid = system::getpid();
                self.mode = Mode::Exit;
                self.run(body);
                system::exit_now(self.state.last_status)
            }
            ForkResult::Parent { child } => {
                self.state.last_status = command::supervise_foreground(self.state, child);
            }
        }
        signal::enable_zombie_cleanup();
    }
}
