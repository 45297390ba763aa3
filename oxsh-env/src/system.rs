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

//! Thin, EINTR-aware wrappers over the POSIX call surface.
//!
//! Every wrapper restarts on `EINTR`, with two exceptions: [`close`]
//! reports the failure and moves on, and [`read`] hands `EINTR` back to
//! the caller because the prompt loop uses it to notice an interrupt.
//!
//! Failures of `fork`, `pipe`, `dup`, and `dup2` leave the interpreter no
//! sensible way to continue; those wrappers print `<op>: <strerror>` and
//! terminate the process with [`ExitStatus::EXEC_FAILURE`]. The remaining
//! wrappers return a [`Result`] for the caller to handle.
//!
//! File descriptors cross this interface as the typed [`Fd`]; process IDs
//! as [`Pid`]. Raw return codes stay inside this module.

use crate::ExitStatus;
use crate::io::Fd;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::Signal;
use nix::sys::wait::{WaitPidFlag, WaitStatus};
use nix::unistd::{ForkResult, Pid};
use std::ffi::CString;
use std::path::Path;

/// Result of a system call, with the raw `errno` as the error.
pub type Result<T> = std::result::Result<T, Errno>;

/// Reports an unrecoverable system-call failure and terminates.
fn fatal(op: &str, errno: Errno) -> ! {
    eprintln!("{}: {}", op, errno.desc());
    std::process::exit(ExitStatus::EXEC_FAILURE.0);
}

/// Creates a child process.
///
/// # Safety
///
/// The interpreter is single-threaded, which makes the usual
/// fork-in-a-threaded-program hazards moot; the caller must keep it that
/// way. The child must restrict itself to async-signal-safe work until it
/// calls [`execvp`] or [`exit_now`].
pub unsafe fn fork() -> ForkResult {
    match unsafe { nix::unistd::fork() } {
        Ok(result) => result,
        Err(errno) => fatal("fork", errno),
    }
}

/// Creates a pipe, returning the read and write ends in that order.
pub fn pipe() -> (Fd, Fd) {
    let mut fds = [0; 2];
    match Errno::result(unsafe { libc::pipe(fds.as_mut_ptr()) }) {
        Ok(_) => (Fd(fds[0]), Fd(fds[1])),
        Err(errno) => fatal("pipe", errno),
    }
}

/// Duplicates a file descriptor into the lowest free slot.
pub fn dup(fd: Fd) -> Fd {
    loop {
        match Errno::result(unsafe { libc::dup(fd.0) }) {
            Ok(new_fd) => return Fd(new_fd),
            Err(Errno::EINTR) => (),
            Err(errno) => fatal("dup", errno),
        }
    }
}

/// Rebinds `to` to the open file `from` refers to.
pub fn dup2(from: Fd, to: Fd) {
    loop {
        match Errno::result(unsafe { libc::dup2(from.0, to.0) }) {
            Ok(_) => return,
            Err(Errno::EINTR) => (),
            Err(errno) => fatal("dup2", errno),
        }
    }
}

/// Closes a file descriptor. A failure is reported, not retried: the
/// descriptor's state is unspecified after an interrupted `close`.
pub fn close(fd: Fd) {
    if let Err(errno) = Errno::result(unsafe { libc::close(fd.0) }) {
        eprintln!("close: {}", errno.desc());
    }
}

/// Opens `path` with the given flags and mode `0666` (subject to the
/// umask).
pub fn open(path: &str, flags: OFlag) -> Result<Fd> {
    let path = CString::new(path).map_err(|_| Errno::EINVAL)?;
    loop {
        let raw = unsafe { libc::open(path.as_ptr(), flags.bits(), 0o666 as libc::c_uint) };
        match Errno::result(raw) {
            Ok(fd) => return Ok(Fd(fd)),
            Err(Errno::EINTR) => (),
            Err(errno) => return Err(errno),
        }
    }
}

/// Reads from a file descriptor.
///
/// `EINTR` is returned rather than retried; the prompt loop checks the
/// interrupt note before deciding to read again.
pub fn read(fd: Fd, buffer: &mut [u8]) -> Result<usize> {
    let count = unsafe { libc::read(fd.0, buffer.as_mut_ptr().cast(), buffer.len()) };
    Errno::result(count).map(|n| n as usize)
}

/// Replaces the current process image with `argv[0]` searched on `PATH`.
///
/// Returns only on failure, with the reason.
pub fn execvp(argv: &[String]) -> Errno {
    let args: std::result::Result<Vec<CString>, _> =
        argv.iter().map(|arg| CString::new(arg.as_str())).collect();
    let args = match args {
        Ok(args) if !args.is_empty() => args,
        _ => return Errno::EINVAL,
    };
    match nix::unistd::execvp(&args[0], &args) {
        Ok(impossible) => match impossible {},
        Err(errno) => errno,
    }
}

/// Waits for the given child, restarting on `EINTR`.
pub fn waitpid(pid: Pid, options: Option<WaitPidFlag>) -> Result<WaitStatus> {
    loop {
        match nix::sys::wait::waitpid(pid, options) {
            Err(Errno::EINTR) => (),
            result => return result,
        }
    }
}

/// Sends a signal to a process.
pub fn kill(pid: Pid, signal: Signal) -> Result<()> {
    nix::sys::signal::kill(pid, signal)
}

/// Sends a signal to the calling process itself.
pub fn raise(signal: Signal) -> Result<()> {
    nix::sys::signal::raise(signal)
}

/// Moves a process into a process group. Both arguments may be zero,
/// meaning the calling process and a group named after `pid`.
pub fn setpgid(pid: Pid, pgid: Pid) -> Result<()> {
    nix::unistd::setpgid(pid, pgid)
}

/// Returns the process group of the calling process.
pub fn getpgid() -> Pid {
    nix::unistd::getpgid(None).unwrap_or_else(|_| nix::unistd::getpid())
}

/// Returns the process ID of the calling process.
pub fn getpid() -> Pid {
    nix::unistd::getpid()
}

/// Makes `pgid` the foreground process group of the terminal open on
/// `fd`.
pub fn tcsetpgrp(fd: Fd, pgid: Pid) -> Result<()> {
    loop {
        match Errno::result(unsafe { libc::tcsetpgrp(fd.0, pgid.as_raw()) }) {
            Ok(_) => return Ok(()),
            Err(Errno::EINTR) => (),
            Err(errno) => return Err(errno),
        }
    }
}

/// Returns the standard input descriptor if it is a terminal.
#[must_use]
pub fn stdin_tty() -> Option<Fd> {
    (unsafe { libc::isatty(Fd::STDIN.0) } == 1).then_some(Fd::STDIN)
}

/// Changes the working directory.
pub fn chdir(path: &Path) -> Result<()> {
    nix::unistd::chdir(path)
}

/// Terminates the current process immediately, skipping destructors and
/// stream flushing. The only way out of a forked child that is not
/// `execvp`.
pub fn exit_now(status: ExitStatus) -> ! {
    unsafe { libc::_exit(status.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn pipe_ends_are_connected() {
        let (read_end, write_end) = pipe();
        let wrote = unsafe { libc::write(write_end.0, b"ping".as_ptr().cast(), 4) };
        assert_eq!(wrote, 4);
        let mut buffer = [0u8; 8];
        let count = read(read_end, &mut buffer).unwrap();
        assert_eq!(&buffer[..count], b"ping");
        close(read_end);
        close(write_end);
    }

    #[test]
    fn open_reads_back_a_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"abc")
            .unwrap();

        let fd = open(path.to_str().unwrap(), OFlag::O_RDONLY).unwrap();
        let mut buffer = [0u8; 8];
        let count = read(fd, &mut buffer).unwrap();
        assert_eq!(&buffer[..count], b"abc");
        close(fd);
    }

    #[test]
    fn open_missing_file_reports_enoent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing");
        let result = open(path.to_str().unwrap(), OFlag::O_RDONLY);
        assert_eq!(result, Err(Errno::ENOENT));
    }

    #[test]
    fn open_rejects_an_interior_nul() {
        assert_eq!(open("a\0b", OFlag::O_RDONLY), Err(Errno::EINVAL));
    }

    #[test]
    fn dup2_rebinds_a_descriptor() {
        let (read_end, write_end) = pipe();
        let spare = dup(read_end);
        dup2(write_end, spare);
        let wrote = unsafe { libc::write(spare.0, b"x".as_ptr().cast(), 1) };
        assert_eq!(wrote, 1);
        let mut buffer = [0u8; 1];
        assert_eq!(read(read_end, &mut buffer).unwrap(), 1);
        assert_eq!(buffer[0], b'x');
        close(read_end);
        close(write_end);
        close(spare);
    }

    #[test]
    fn execvp_with_empty_argv_fails_cleanly() {
        assert_eq!(execvp(&[]), Errno::EINVAL);
    }
}
