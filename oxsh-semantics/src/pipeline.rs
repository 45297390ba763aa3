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

//! Pipeline execution.
//!
//! All stages of a pipeline form one job in one process group. The first
//! child founds the group through the same stop-place-resume dance as a
//! simple command; the later children are forked only afterwards and join
//! the group themselves with `setpgid(0, pgid)` before touching anything.
//! Stage `k` reads the previous pipe and writes the next one; the first
//! stage keeps the shell's stdin and the last stage keeps the shell's
//! stdout. The job's reported status is the last stage's.

use crate::{Executor, Mode, command};
use nix::sys::signal::Signal;
use nix::unistd::{ForkResult, Pid};
use oxsh_env::ExitStatus;
use oxsh_env::io::Fd;
use oxsh_env::signal;
use oxsh_env::system;
use oxsh_syntax::syntax::Node;

impl Executor<'_> {
    /// Executes a pipe chain of at least two stages as one foreground or
    /// background job.
    pub(crate) fn execute_pipeline(&mut self, children: &[Node]) {
        let Some((first, rest)) = children.split_first() else {
            return;
        };
        let Some((last, middle)) = rest.split_last() else {
            return;
        };

        signal::disable_zombie_cleanup();
        let mut pids = Vec::with_capacity(children.len());

        // First stage: founds the process group once it has stopped
        // itself.
        let (mut next_read, write_end) = system::pipe();
        let pgid = match unsafe { system::fork() } {
            ForkResult::Child => {
                system::close(next_read);
                let _: Result<_, _> = system::raise(Signal::SIGSTOP);
                self.into_pipeline_stage(None, Some(write_end), first)
            }
            ForkResult::Parent { child } => child,
        };
        pids.push(pgid);
        system::close(write_end);
        // An early death of the first stage does not matter here: the
        // job's status comes from the last stage.
        command::place_foreground(self.state, pgid);

        // Middle stages join the group themselves.
        for node in middle {
            let (read_end, write_end) = system::pipe();
            match unsafe { system::fork() } {
                ForkResult::Child => {
                    let _: Result<_, _> = system::setpgid(Pid::from_raw(0), pgid);
                    system::close(read_end);
                    self.into_pipeline_stage(Some(next_read), Some(write_end), node)
                }
                ForkResult::Parent { child } => pids.push(child),
            }
            system::close(next_read);
            system::close(write_end);
            next_read = read_end;
        }

        // Last stage: inherits the shell's stdout.
        match unsafe { system::fork() } {
            ForkResult::Child => {
                let _: Result<_, _> = system::setpgid(Pid::from_raw(0), pgid);
                self.into_pipeline_stage(Some(next_read), None, last)
            }
            ForkResult::Parent { child } => pids.push(child),
        }
        system::close(next_read);

        // Completion order across stages is arbitrary; the job's status is
        // deterministically the last stage's.
        let mut status = ExitStatus::SUCCESS;
        let stage_count = pids.len();
        for (index, pid) in pids.into_iter().enumerate() {
            let exit = command::wait_for_termination(pid);
            if index == stage_count - 1 {
                status = exit;
            }
        }
        self.state.last_status = status;

        self.state.restore_fg_pgroup();
        signal::enable_zombie_cleanup();
    }

    /// Becomes one stage of the pipeline: rebinds the pipe ends, sheds the
    /// shell's signal regime, and executes the node in place.
    fn into_pipeline_stage(
        &mut self,
        read_end: Option<Fd>,
        write_end: Option<Fd>,
        node: &Node,
    ) -> ! {
        if let Some(fd) = read_end {
            system::dup2(fd, Fd::STDIN);
            system::close(fd);
        }
        if let Some(fd) = write_end {
            system::dup2(fd, Fd::STDOUT);
            system::close(fd);
        }
        signal::reset_for_child();
        self.state.in_pipeline = true;
        self.mode = Mode::Replace;
        self.execute(node);
        system::exit_now(self.state.last_status)
    }
}
