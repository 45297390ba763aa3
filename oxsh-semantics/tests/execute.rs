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

//! End-to-end execution tests.
//!
//! These run real command lines through the lexer, the parser, and the
//! executor, forking real processes. Process-global state (the `SIGCHLD`
//! regime, the working directory, descriptors 0-2) is touched throughout,
//! so every test serializes on [`LOCK`]. The terminal hand-off is inert
//! here because the test state carries no tty.

use oxsh_env::{ExitStatus, ShellState, system};
use oxsh_semantics::Executor;
use oxsh_syntax::lexer::Lexer;
use oxsh_syntax::parser;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

static LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn test_state() -> ShellState {
    ShellState {
        last_status: ExitStatus::SUCCESS,
        pgid: system::getpgid(),
        tty_fd: None,
        in_background: false,
        in_pipeline: false,
    }
}

/// Lexes, parses, and executes one line against the given state.
fn run_line(state: &mut ShellState, line: &str) {
    let mut lexer = Lexer::new();
    lexer.start();
    for ch in line.chars() {
        lexer.feed(ch);
    }
    let tokens = lexer.end().unwrap();
    let statements = parser::parse(tokens).unwrap();
    Executor::new(state).run(&statements);
}

fn status_of(line: &str) -> ExitStatus {
    let mut state = test_state();
    run_line(&mut state, line);
    state.last_status
}

/// Device and inode identifying the open file behind a descriptor.
fn fd_identity(fd: i32) -> (u64, u64) {
    let mut stat = std::mem::MaybeUninit::<libc::stat>::uninit();
    let result = unsafe { libc::fstat(fd, stat.as_mut_ptr()) };
    assert_eq!(result, 0, "fstat({fd})");
    let stat = unsafe { stat.assume_init() };
    (stat.st_dev as u64, stat.st_ino as u64)
}

fn read_file(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn true_succeeds_and_false_fails() {
    let _guard = lock();
    assert_eq!(status_of("true"), ExitStatus::SUCCESS);
    assert_eq!(status_of("false"), ExitStatus(1));
}

#[test]
fn exit_code_passes_through() {
    let _guard = lock();
    assert_eq!(status_of("sh -c 'exit 7'"), ExitStatus(7));
}

#[test]
fn signal_death_is_normalized_past_128() {
    let _guard = lock();
    // SIGTERM is 15, so the reported status is 143.
    assert_eq!(status_of("sh -c 'kill -TERM $$'"), ExitStatus(143));
}

#[test]
fn unknown_command_reports_status_13() {
    let _guard = lock();
    assert_eq!(
        status_of("definitely-no-such-command-here"),
        ExitStatus::EXEC_FAILURE
    );
}

#[test]
fn sequence_threads_the_status() {
    let _guard = lock();
    assert_eq!(status_of("false ; true"), ExitStatus::SUCCESS);
    assert_eq!(status_of("true ; false"), ExitStatus(1));
}

#[test]
fn output_redirection_writes_the_file() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let mut state = test_state();
    run_line(&mut state, &format!("echo hello > {}", out.display()));
    assert_eq!(state.last_status, ExitStatus::SUCCESS);
    assert_eq!(read_file(&out), "hello\n");
}

#[test]
fn append_redirection_accumulates() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("log");
    let mut state = test_state();
    run_line(&mut state, &format!("echo a >> {0} ; echo b >> {0}", out.display()));
    assert_eq!(read_file(&out), "a\nb\n");
}

#[test]
fn truncating_redirection_replaces_content() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let mut state = test_state();
    run_line(&mut state, &format!("echo aaaa > {0} ; echo b > {0}", out.display()));
    assert_eq!(read_file(&out), "b\n");
}

#[test]
fn input_redirection_feeds_the_command() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let out = dir.path().join("out");
    fs::write(&input, "data\n").unwrap();
    let mut state = test_state();
    run_line(
        &mut state,
        &format!("cat < {} > {}", input.display(), out.display()),
    );
    assert_eq!(state.last_status, ExitStatus::SUCCESS);
    assert_eq!(read_file(&out), "data\n");
}

#[test]
fn explicit_descriptor_captures_stderr() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let err = dir.path().join("err");
    let mut state = test_state();
    run_line(
        &mut state,
        &format!("sh -c 'echo oops >&2' 2> {}", err.display()),
    );
    assert_eq!(state.last_status, ExitStatus::SUCCESS);
    assert_eq!(read_file(&err), "oops\n");
}

#[test]
fn open_failure_skips_the_command() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no/such/dir/file");
    let out = dir.path().join("out");
    let mut state = test_state();
    run_line(
        &mut state,
        &format!("echo x < {} > {}", missing.display(), out.display()),
    );
    assert_eq!(state.last_status, ExitStatus(1));
    // The input entry failed first, so the output file was never opened.
    assert!(!out.exists());
}

#[test]
fn standard_descriptors_survive_redirection() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let before = [fd_identity(0), fd_identity(1), fd_identity(2)];
    let mut state = test_state();
    run_line(
        &mut state,
        &format!(
            "echo x > {} 2>> {} < /dev/null",
            dir.path().join("a").display(),
            dir.path().join("b").display(),
        ),
    );
    let after = [fd_identity(0), fd_identity(1), fd_identity(2)];
    assert_eq!(before, after);
}

#[test]
fn repeated_target_keeps_the_last_binding() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    let mut state = test_state();
    run_line(
        &mut state,
        &format!("echo x > {} > {}", first.display(), second.display()),
    );
    assert_eq!(read_file(&first), "");
    assert_eq!(read_file(&second), "x\n");
}

#[test]
fn pipeline_plumbs_stage_to_stage() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let mut state = test_state();
    run_line(&mut state, &format!("echo hi | cat > {}", out.display()));
    assert_eq!(state.last_status, ExitStatus::SUCCESS);
    assert_eq!(read_file(&out), "hi\n");
}

#[test]
fn three_stage_pipeline() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let mut state = test_state();
    run_line(&mut state, &format!("echo abc | cat | cat > {}", out.display()));
    assert_eq!(read_file(&out), "abc\n");
}

#[test]
fn pipeline_status_is_the_last_stage() {
    let _guard = lock();
    assert_eq!(status_of("false | true"), ExitStatus::SUCCESS);
    assert_eq!(status_of("true | false"), ExitStatus(1));
    assert_eq!(status_of("true | sh -c 'exit 3'"), ExitStatus(3));
}

#[test]
fn and_runs_the_right_side_only_on_success() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let witness = dir.path().join("w");
    let mut state = test_state();
    run_line(&mut state, &format!("false && echo no > {}", witness.display()));
    assert_eq!(state.last_status, ExitStatus(1));
    assert!(!witness.exists());

    run_line(&mut state, &format!("true && echo yes > {}", witness.display()));
    assert_eq!(state.last_status, ExitStatus::SUCCESS);
    assert_eq!(read_file(&witness), "yes\n");
}

#[test]
fn or_runs_the_right_side_only_on_failure() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let witness = dir.path().join("w");
    let mut state = test_state();
    run_line(&mut state, &format!("true || echo no > {}", witness.display()));
    assert_eq!(state.last_status, ExitStatus::SUCCESS);
    assert!(!witness.exists());

    run_line(&mut state, &format!("false || echo ok > {}", witness.display()));
    assert_eq!(state.last_status, ExitStatus::SUCCESS);
    assert_eq!(read_file(&witness), "ok\n");
}

#[test]
fn logical_chain_left_to_right() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let mut state = test_state();
    // false || echo ok && echo done  ==  ((false || echo ok) && echo done)
    run_line(
        &mut state,
        &format!("false || echo ok >> {0} && echo done >> {0}", out.display()),
    );
    assert_eq!(state.last_status, ExitStatus::SUCCESS);
    assert_eq!(read_file(&out), "ok\ndone\n");
}

#[test]
fn background_reports_success_immediately() {
    let _guard = lock();
    assert_eq!(status_of("false &"), ExitStatus::SUCCESS);
}

#[test]
fn background_statement_then_foreground() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let mut state = test_state();
    run_line(&mut state, &format!("true & echo fg > {}", out.display()));
    assert_eq!(state.last_status, ExitStatus::SUCCESS);
    assert_eq!(read_file(&out), "fg\n");
}

#[test]
fn cd_changes_the_working_directory() {
    let _guard = lock();
    let original = std::env::current_dir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut state = test_state();
    run_line(&mut state, &format!("cd {}", dir.path().display()));
    assert_eq!(state.last_status, ExitStatus::SUCCESS);
    assert_eq!(
        std::env::current_dir().unwrap(),
        dir.path().canonicalize().unwrap()
    );
    std::env::set_current_dir(original).unwrap();
}

#[test]
fn cd_to_a_missing_directory_fails() {
    let _guard = lock();
    let original = std::env::current_dir().unwrap();
    let mut state = test_state();
    run_line(&mut state, "cd /definitely/not/a/directory");
    assert_eq!(state.last_status, ExitStatus(1));
    assert_eq!(std::env::current_dir().unwrap(), original);
}

#[test]
fn cd_inside_a_subshell_is_contained() {
    let _guard = lock();
    let original = std::env::current_dir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut state = test_state();
    run_line(&mut state, &format!("(cd {})", dir.path().display()));
    assert_eq!(state.last_status, ExitStatus::SUCCESS);
    assert_eq!(std::env::current_dir().unwrap(), original);
}

#[test]
fn subshell_propagates_its_status() {
    let _guard = lock();
    assert_eq!(status_of("(false)"), ExitStatus(1));
    assert_eq!(status_of("(sh -c 'exit 5')"), ExitStatus(5));
    assert_eq!(status_of("(false; true)"), ExitStatus::SUCCESS);
}

#[test]
fn subshell_output_can_be_redirected() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let mut state = test_state();
    run_line(&mut state, &format!("(echo a; echo b) > {}", out.display()));
    assert_eq!(read_file(&out), "a\nb\n");
}

#[test]
fn redirection_inside_a_subshell_is_undone_per_statement() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let inner = dir.path().join("inner");
    let outer = dir.path().join("outer");
    let mut state = test_state();
    // The first statement's binding must not leak into the second.
    run_line(
        &mut state,
        &format!("(echo a > {}; echo b) > {}", inner.display(), outer.display()),
    );
    assert_eq!(read_file(&inner), "a\n");
    assert_eq!(read_file(&outer), "b\n");
}

#[test]
fn subshell_as_a_pipeline_stage() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let mut state = test_state();
    run_line(
        &mut state,
        &format!("(echo a; echo b) | cat > {}", out.display()),
    );
    assert_eq!(read_file(&out), "a\nb\n");
}

#[test]
fn quoted_argument_reaches_the_command_intact() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let mut state = test_state();
    run_line(&mut state, &format!("echo \"a b\" > {}", out.display()));
    assert_eq!(read_file(&out), "a b\n");
}
