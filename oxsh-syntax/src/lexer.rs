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

//! Character-driven scanner producing the token stream.
//!
//! The [`Lexer`] is a streaming state machine: the caller invokes
//! [`start`](Lexer::start), [feeds](Lexer::feed) one character at a time
//! until [`at_eol`](Lexer::at_eol) reports the end of the line, and then
//! calls [`end`](Lexer::end) to collect the tokens.
//!
//! Three flags track quoting state (single quote, double quote, escape); at
//! most one of them is set at any time. Operators made of a repeatable
//! character (`&`, `|`, `>`) are held pending until the next character
//! decides between the single and the doubled form. A word consisting of
//! decimal digits is re-interpreted as the target file descriptor of an
//! immediately following redirection operator; this is the only context in
//! which a committed-looking word is consumed by the lexer itself.

use crate::syntax::{Fd, Token};
use std::ffi::c_int;
use std::mem;
use thiserror::Error;

/// Failure to tokenize a line.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum LexError {
    /// A single or double quote was still open at the end of the line.
    #[error("unclosed quote")]
    UnclosedQuote,
    /// A backslash was the last character of the input.
    #[error("unfinished escaping")]
    UnfinishedEscape,
}

/// Kind of the token currently being accumulated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Pending {
    Word,
    Bg,
    Pipe,
    Semicolon,
    LParen,
    RParen,
    // `<` is single-shot and commits immediately, so it never goes
    // through the pending slot.
    RedirOut(Fd),
}

/// Character stream to token stream state machine.
#[derive(Debug, Default)]
pub struct Lexer {
    tokens: Vec<Token>,
    /// Text of the pending word token
    current: String,
    /// Kind of the token being accumulated, if any
    pending: Option<Pending>,
    eol: bool,
    in_single_quote: bool,
    in_double_quote: bool,
    in_escape: bool,
}

/// Re-interprets a word as a redirection's target file descriptor.
///
/// Only a non-empty all-digit word qualifies. A value too large for the
/// descriptor type does not qualify either; the word is then kept as a
/// word.
fn parse_fd(word: &str) -> Option<Fd> {
    if word.is_empty() || !word.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    word.parse::<c_int>().ok().map(Fd)
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the machine for a fresh line.
    pub fn start(&mut self) {
        self.tokens.clear();
        self.current.clear();
        self.pending = None;
        self.eol = false;
        self.in_single_quote = false;
        self.in_double_quote = false;
        self.in_escape = false;
    }

    /// Whether the machine has seen the end of the current line.
    ///
    /// Once this returns `true`, the caller should stop feeding and call
    /// [`end`](Lexer::end).
    #[must_use]
    pub fn at_eol(&self) -> bool {
        self.eol
    }

    /// Processes one character of input.
    pub fn feed(&mut self, ch: char) {
        if self.in_escape {
            // A backslash-newline pair is a line continuation and leaves
            // no trace in the output.
            if ch != '\n' {
                self.append_word_char(ch);
            }
            self.in_escape = false;
        } else if ch == '\\' && !self.in_single_quote && !self.in_double_quote {
            self.in_escape = true;
        } else if ch == '\n' {
            self.eol = true;
        } else if self.in_double_quote {
            if ch == '"' {
                self.in_double_quote = false;
            } else {
                self.append_word_char(ch);
            }
        } else if self.in_single_quote {
            if ch == '\'' {
                self.in_single_quote = false;
            } else {
                self.append_word_char(ch);
            }
        } else if ch == '"' {
            self.begin_word();
            self.in_double_quote = true;
        } else if ch == '\'' {
            self.begin_word();
            self.in_single_quote = true;
        } else if ch.is_whitespace() {
            self.commit_pending();
        } else if ch == '&' {
            self.scan_doubleable(Pending::Bg, Token::And);
        } else if ch == '|' {
            self.scan_doubleable(Pending::Pipe, Token::Or);
        } else if ch == '>' {
            self.scan_redir_out();
        } else if ch == '<' {
            self.scan_redir_in();
        } else if ch == ';' {
            self.scan_single_shot(Pending::Semicolon);
        } else if ch == '(' {
            self.scan_single_shot(Pending::LParen);
        } else if ch == ')' {
            self.scan_single_shot(Pending::RParen);
        } else {
            self.append_word_char(ch);
        }
    }

    /// Finishes the line, returning the tokens or a quoting error.
    pub fn end(&mut self) -> Result<Vec<Token>, LexError> {
        if self.in_single_quote || self.in_double_quote {
            return Err(LexError::UnclosedQuote);
        }
        if self.in_escape {
            return Err(LexError::UnfinishedEscape);
        }
        self.commit_pending();
        Ok(mem::take(&mut self.tokens))
    }

    /// Makes sure the pending token is a word, flushing any pending
    /// operator first. `""` reaches this, which is how an empty word still
    /// gets emitted.
    fn begin_word(&mut self) {
        match self.pending {
            Some(Pending::Word) => {}
            Some(_) => {
                self.commit_pending();
                self.pending = Some(Pending::Word);
            }
            None => self.pending = Some(Pending::Word),
        }
    }

    fn append_word_char(&mut self, ch: char) {
        self.begin_word();
        self.current.push(ch);
    }

    /// Emits the pending token, if any.
    fn commit_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let token = match pending {
            Pending::Word => Token::Word(mem::take(&mut self.current)),
            Pending::Bg => Token::Bg,
            Pending::Pipe => Token::Pipe,
            Pending::Semicolon => Token::Semicolon,
            Pending::LParen => Token::LParen,
            Pending::RParen => Token::RParen,
            Pending::RedirOut(fd) => Token::RedirOut(fd),
        };
        self.tokens.push(token);
    }

    /// Handles `&` and `|`: a second occurrence upgrades the pending single
    /// operator to its doubled form and commits it; anything else pending
    /// is flushed first.
    fn scan_doubleable(&mut self, single: Pending, doubled: Token) {
        match self.pending {
            None => self.pending = Some(single),
            Some(pending) if pending == single => {
                self.pending = None;
                self.tokens.push(doubled);
            }
            Some(_) => {
                self.commit_pending();
                self.pending = Some(single);
            }
        }
    }

    /// Handles `>`: doubleable into `>>`, and an all-digit pending word is
    /// consumed as the target file descriptor.
    fn scan_redir_out(&mut self) {
        match self.pending {
            None => self.pending = Some(Pending::RedirOut(Fd::STDOUT)),
            Some(Pending::RedirOut(fd)) => {
                self.pending = None;
                self.tokens.push(Token::RedirAppend(fd));
            }
            Some(Pending::Word) => {
                if let Some(fd) = parse_fd(&self.current) {
                    self.current.clear();
                    self.pending = Some(Pending::RedirOut(fd));
                } else {
                    self.commit_pending();
                    self.pending = Some(Pending::RedirOut(Fd::STDOUT));
                }
            }
            Some(_) => {
                self.commit_pending();
                self.pending = Some(Pending::RedirOut(Fd::STDOUT));
            }
        }
    }

    /// Handles `<`: single-shot, with the same file-descriptor attribution
    /// as `>`.
    fn scan_redir_in(&mut self) {
        if self.pending == Some(Pending::Word) {
            if let Some(fd) = parse_fd(&self.current) {
                self.current.clear();
                self.pending = None;
                self.tokens.push(Token::RedirIn(fd));
                return;
            }
        }
        self.commit_pending();
        self.tokens.push(Token::RedirIn(Fd::STDIN));
    }

    /// Handles `;`, `(`, and `)`: flush, emit, commit.
    fn scan_single_shot(&mut self, operator: Pending) {
        self.commit_pending();
        self.pending = Some(operator);
        self.commit_pending();
    }
}
