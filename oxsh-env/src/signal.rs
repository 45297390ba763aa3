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

//! The interpreter's signal regime.
//!
//! The interactive shell ignores `SIGTTOU` (it reassigns the terminal's
//! foreground group freely), notes `SIGINT` in an atomic flag (so a
//! blocked read returns and the prompt loop can abandon the line), and
//! reaps finished background children from a `SIGCHLD` handler.
//!
//! The `SIGCHLD` handler and the executor's synchronous `waitpid` must not
//! compete for the same child, so the executor brackets every foreground
//! wait between [`disable_zombie_cleanup`] and [`enable_zombie_cleanup`].
//!
//! The `SIGINT` handler is installed without `SA_RESTART` on purpose: the
//! interrupt must surface as `EINTR` from the blocking read.

use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use std::ffi::c_int;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

/// Signal-handler-to-main-loop note that a `SIGINT` arrived.
static HAVE_SIGINT: AtomicBool = AtomicBool::new(false);

extern "C" fn sigint_handler(_signal: c_int) {
    HAVE_SIGINT.store(true, Ordering::Relaxed);
}

extern "C" fn sigchld_handler(_signal: c_int) {
    // Only async-signal-safe calls are allowed here: waitpid qualifies,
    // allocation and locking do not.
    loop {
        let pid = unsafe { libc::waitpid(-1, ptr::null_mut(), libc::WNOHANG) };
        if pid <= 0 {
            break;
        }
    }
}

fn set_handler(signal: Signal, handler: SigHandler, flags: SaFlags) {
    let action = SigAction::new(handler, flags, SigSet::empty());
    let _: Result<_, _> = unsafe { sigaction(signal, &action) };
}

/// Installs the interactive regime: `SIGTTOU` ignored, `SIGINT` noted in
/// the flag read by [`take_sigint`].
pub fn install_interactive() {
    set_handler(Signal::SIGTTOU, SigHandler::SigIgn, SaFlags::empty());
    set_handler(
        Signal::SIGINT,
        SigHandler::Handler(sigint_handler),
        SaFlags::empty(),
    );
}

/// Arranges for `SIGCHLD` to reap finished background children.
pub fn enable_zombie_cleanup() {
    set_handler(
        Signal::SIGCHLD,
        SigHandler::Handler(sigchld_handler),
        SaFlags::SA_NOCLDSTOP,
    );
}

/// Restores the default `SIGCHLD` disposition so a synchronous `waitpid`
/// observes the child instead of the reaper.
pub fn disable_zombie_cleanup() {
    set_handler(Signal::SIGCHLD, SigHandler::SigDfl, SaFlags::empty());
}

/// Returns `SIGTTOU` and `SIGINT` to their default dispositions.
///
/// Every forked child calls this before `exec`, or before acting as a
/// backgrounded subtree, so the interactive regime stays confined to the
/// shell itself.
pub fn reset_for_child() {
    set_handler(Signal::SIGTTOU, SigHandler::SigDfl, SaFlags::empty());
    set_handler(Signal::SIGINT, SigHandler::SigDfl, SaFlags::empty());
}

/// Consumes the `SIGINT` note, reporting whether one had arrived since the
/// last call.
#[must_use]
pub fn take_sigint() -> bool {
    HAVE_SIGINT.swap(false, Ordering::Relaxed)
}
