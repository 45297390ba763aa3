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

//! Redirection semantics.
//!
//! In the parent shell, redirections are applied around the child node
//! with full save and restore: the original descriptor of each redirected
//! standard slot (0, 1, 2) is saved once with `dup`, the slot is rebound
//! with `dup2`, and after the child completes every redirected slot is
//! closed and the saves go back, most recent first. The surrounding shell
//! therefore always sees its own descriptors again, whatever the child
//! did.
//!
//! A pipeline stage is about to be overwritten by `execvp`, so there the
//! bindings are applied in place with no saves, and an open failure
//! terminates the stage.

use crate::{Executor, Mode};
use nix::fcntl::OFlag;
use oxsh_env::ExitStatus;
use oxsh_env::io::Fd;
use oxsh_env::system;
use oxsh_syntax::syntax::{Node, RedirEntry, RedirKind};

impl Executor<'_> {
    /// Binds the entries around the child node, in declaration order.
    ///
    /// An open failure skips the child and sets `last_status` to 1,
    /// closing whatever had been opened already.
    pub(crate) fn execute_redirection(&mut self, entries: &[RedirEntry], child: &Node) {
        if self.mode == Mode::Replace {
            // This process is about to be overwritten; nothing to restore,
            // and an open failure ends it.
            if apply_in_child(entries).is_err() {
                system::exit_now(ExitStatus::FAILURE)
            }
            self.execute(child);
            return;
        }
        // In the shell itself, and in any child that keeps interpreting
        // after this node, the surrounding descriptors must survive.
        match RedirGuard::apply(entries) {
            Ok(guard) => {
                self.execute(child);
                guard.restore();
            }
            Err(OpenFailed) => self.state.last_status = ExitStatus::FAILURE,
        }
    }
}

/// Marker for a reported open failure.
pub(crate) struct OpenFailed;

fn open_flags(kind: RedirKind) -> OFlag {
    match kind {
        RedirKind::In => OFlag::O_RDONLY,
        RedirKind::Out => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
        RedirKind::Append => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND,
    }
}

/// Opens every entry in declaration order. On the first failure the
/// already-opened descriptors are closed again and the failure has been
/// reported.
fn open_all(entries: &[RedirEntry]) -> Result<Vec<Fd>, OpenFailed> {
    let mut sources = Vec::with_capacity(entries.len());
    for entry in entries {
        match system::open(&entry.filename, open_flags(entry.kind)) {
            Ok(fd) => sources.push(fd),
            Err(errno) => {
                eprintln!("open failed for {}: {}", entry.filename, errno.desc());
                for fd in sources {
                    system::close(fd);
                }
                return Err(OpenFailed);
            }
        }
    }
    Ok(sources)
}

struct SavedFd {
    target: Fd,
    save: Fd,
}

/// Record of applied bindings, for undoing them in the parent shell.
pub(crate) struct RedirGuard {
    /// Slots that were rebound, deduplicated
    redirected: Vec<Fd>,
    /// Original descriptors of the standard slots, at most one per slot
    saves: Vec<SavedFd>,
}

impl RedirGuard {
    /// Opens and binds the entries, saving the affected standard slots.
    pub fn apply(entries: &[RedirEntry]) -> Result<RedirGuard, OpenFailed> {
        let sources = open_all(entries)?;
        let mut guard = RedirGuard {
            redirected: Vec::new(),
            saves: Vec::new(),
        };
        for (entry, source) in entries.iter().zip(sources) {
            let target = entry.target_fd;
            if (0..=2).contains(&target.0) && !guard.saves.iter().any(|s| s.target == target) {
                guard.saves.push(SavedFd {
                    target,
                    save: system::dup(target),
                });
            }
            system::dup2(source, target);
            system::close(source);
            if !guard.redirected.contains(&target) {
                guard.redirected.push(target);
            }
        }
        Ok(guard)
    }

    /// Undoes the bindings: every redirected slot is closed, then each
    /// saved original returns to its place, most recent save first.
    pub fn restore(self) {
        for target in &self.redirected {
            system::close(*target);
        }
        for SavedFd { target, save } in self.saves.into_iter().rev() {
            system::dup2(save, target);
            system::close(save);
        }
    }
}

/// Binds without saving, for a child that will not outlive the
/// redirection.
fn apply_in_child(entries: &[RedirEntry]) -> Result<(), OpenFailed> {
    let sources = open_all(entries)?;
    for (entry, source) in entries.iter().zip(sources) {
        system::dup2(source, entry.target_fd);
        system::close(source);
    }
    Ok(())
}
