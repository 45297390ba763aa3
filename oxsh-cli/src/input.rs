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

//! Feeding standard input into the lexer.
//!
//! Input is read byte by byte through the wrapper layer so an interrupt
//! surfaces as `EINTR` rather than being swallowed by a buffering layer.
//! The lexer consumes characters, not bytes, so the bytes of a multibyte
//! UTF-8 sequence are first reassembled into one `char`; a malformed
//! sequence degrades to U+FFFD instead of spoiling the whole line.
//! `EINTR` without a pending `SIGINT` is retried; with one, the current
//! line is abandoned and the caller offers a fresh prompt.

use nix::errno::Errno;
use oxsh_env::io::Fd;
use oxsh_env::signal;
use oxsh_env::system;
use oxsh_syntax::lexer::Lexer;

/// Outcome of reading one line into the lexer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineStatus {
    /// The lexer saw its end-of-line; the line is ready to tokenize.
    Ready,
    /// A `SIGINT` arrived; the partial line should be thrown away.
    Interrupted,
    /// Standard input is exhausted. Whatever was read still forms a line.
    Eof,
}

/// Incremental UTF-8 decoder for the byte-at-a-time read loop.
///
/// A character is at most 4 bytes in UTF-8, so the accumulator grows a
/// prefix until `from_utf8` either accepts it as one character or rejects
/// it outright. A rejected prefix is dropped, but the byte that exposed it
/// is re-examined on its own: an ASCII byte (a newline, say) must never be
/// lost to a truncated sequence before it.
#[derive(Clone, Copy, Debug, Default)]
struct Utf8Accumulator {
    buffer: [u8; 4],
    len: usize,
}

impl Utf8Accumulator {
    fn push(&mut self, byte: u8) -> Option<char> {
        self.buffer[self.len] = byte;
        self.len += 1;
        match std::str::from_utf8(&self.buffer[..self.len]) {
            Ok(sequence) => {
                self.len = 0;
                sequence.chars().next()
            }
            Err(error) => {
                if error.error_len().is_none() {
                    // Incomplete prefix of a multibyte character; wait
                    // for the next byte.
                    return None;
                }
                // Malformed. A lone bad byte becomes the replacement
                // character; a bad prefix is dropped and the final byte
                // gets a fresh chance.
                let bad_byte_alone = self.len == 1;
                self.len = 0;
                if bad_byte_alone {
                    Some(char::REPLACEMENT_CHARACTER)
                } else {
                    self.push(byte)
                }
            }
        }
    }
}

/// Feeds characters from standard input into the lexer until the end of
/// the line, an interrupt, or end of input.
pub fn read_line(lexer: &mut Lexer) -> LineStatus {
    lexer.start();
    let mut decoder = Utf8Accumulator::default();
    let mut byte = [0u8; 1];
    loop {
        match system::read(Fd::STDIN, &mut byte) {
            Ok(0) => return LineStatus::Eof,
            Ok(_) => {
                if let Some(ch) = decoder.push(byte[0]) {
                    lexer.feed(ch);
                    if lexer.at_eol() {
                        return LineStatus::Ready;
                    }
                }
            }
            Err(Errno::EINTR) => {
                if signal::take_sigint() {
                    return LineStatus::Interrupted;
                }
            }
            Err(_) => return LineStatus::Eof,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> String {
        let mut decoder = Utf8Accumulator::default();
        bytes.iter().filter_map(|&b| decoder.push(b)).collect()
    }

    #[test]
    fn ascii_passes_through() {
        assert_eq!(decode(b"ls -l\n"), "ls -l\n");
    }

    #[test]
    fn multibyte_sequences_are_reassembled() {
        assert_eq!(decode("é ñ 漢 🦀".as_bytes()), "é ñ 漢 🦀");
    }

    #[test]
    fn stray_continuation_byte_is_replaced() {
        assert_eq!(decode(&[0x80, b'a']), "\u{FFFD}a");
    }

    #[test]
    fn truncated_sequence_does_not_eat_the_next_ascii_byte() {
        // A lead byte followed by a newline: the newline must survive.
        assert_eq!(decode(&[0xC3, b'\n']), "\n");
    }
}
