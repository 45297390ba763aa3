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

//! Tokens and the abstract syntax tree.
//!
//! The [`Lexer`](crate::lexer::Lexer) produces a `Vec<Token>`, the
//! [parser](crate::parser) consumes it and produces a statement list of
//! [`Node`]s. Every non-leaf node exclusively owns its children, so dropping
//! the root of a tree releases the whole tree.

use std::ffi::c_int;
use std::fmt;

/// File descriptor number attached to a redirection.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fd(pub c_int);

impl Fd {
    /// File descriptor for the standard input
    pub const STDIN: Fd = Fd(0);
    /// File descriptor for the standard output
    pub const STDOUT: Fd = Fd(1);
    /// File descriptor for the standard error
    pub const STDERR: Fd = Fd(2);
}

impl From<c_int> for Fd {
    fn from(raw_fd: c_int) -> Fd {
        Fd(raw_fd)
    }
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lexical unit of the command language.
///
/// A word token owns its text; a redirection operator carries the file
/// descriptor it applies to, either written explicitly (`2>log`) or
/// defaulted (0 for `<`, 1 for `>` and `>>`). The remaining operators carry
/// nothing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    /// Word: a command name, argument, or redirection operand
    Word(String),
    /// `&`
    Bg,
    /// `&&`
    And,
    /// `|`
    Pipe,
    /// `||`
    Or,
    /// `;`
    Semicolon,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `<` with its target file descriptor
    RedirIn(Fd),
    /// `>` with its target file descriptor
    RedirOut(Fd),
    /// `>>` with its target file descriptor
    RedirAppend(Fd),
}

impl Token {
    /// Returns a human-readable name for the token's kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        use Token::*;
        match self {
            Word(_) => "word",
            Bg => "background",
            And => "and",
            Pipe => "pipe",
            Or => "or",
            Semicolon => "semicolon",
            LParen => "left parenthesis",
            RParen => "right parenthesis",
            RedirIn(_) => "redir in",
            RedirOut(_) => "redir out",
            RedirAppend(_) => "redir append",
        }
    }
}

/// Formats the token as it appears in the source: a word prints its text,
/// an operator prints its lexeme.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;
        match self {
            Word(word) => f.write_str(word),
            Bg => f.write_str("&"),
            And => f.write_str("&&"),
            Pipe => f.write_str("|"),
            Or => f.write_str("||"),
            Semicolon => f.write_str(";"),
            LParen => f.write_str("("),
            RParen => f.write_str(")"),
            RedirIn(_) => f.write_str("<"),
            RedirOut(_) => f.write_str(">"),
            RedirAppend(_) => f.write_str(">>"),
        }
    }
}

/// Direction of a redirection clause.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirKind {
    /// `< file`: open the file for reading
    In,
    /// `> file`: open the file for writing, truncating it
    Out,
    /// `>> file`: open the file for writing, appending to it
    Append,
}

impl fmt::Display for RedirKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirKind::In => f.write_str("<"),
            RedirKind::Out => f.write_str(">"),
            RedirKind::Append => f.write_str(">>"),
        }
    }
}

/// One `< file` / `> file` / `>> file` clause.
///
/// Constructed by the parser, consumed by the executor, dropped with the
/// owning [`Node::Redirection`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RedirEntry {
    pub kind: RedirKind,
    /// Pathname operand of the clause
    pub filename: String,
    /// File descriptor the opened file is bound to
    pub target_fd: Fd,
}

/// Operator of a [`Node::Logical`] composition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogicalOp {
    /// `&&`: run the right side only if the left side succeeded
    And,
    /// `||`: run the right side only if the left side failed
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => f.write_str("&&"),
            LogicalOp::Or => f.write_str("||"),
        }
    }
}

/// Node of the abstract syntax tree.
///
/// A whole program is a statement list (`Vec<Node>`) executed left to
/// right; there is no separate node shape for the sequence itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    /// External program invocation; the argv is never empty.
    Command(Vec<String>),
    /// `( … )`: the statement list runs in a child process, isolating
    /// working-directory and other in-process changes.
    Subshell(Vec<Node>),
    /// File descriptor bindings wrapped around a child node, in source
    /// order.
    Redirection {
        entries: Vec<RedirEntry>,
        child: Box<Node>,
    },
    /// Left-to-right pipe chain of at least two children.
    Pipeline(Vec<Node>),
    /// Short-circuit composition of two children.
    Logical {
        op: LogicalOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Asynchronous execution of the child.
    Background(Box<Node>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_display_is_the_lexeme() {
        assert_eq!(Token::Word("ls".to_string()).to_string(), "ls");
        assert_eq!(Token::Bg.to_string(), "&");
        assert_eq!(Token::And.to_string(), "&&");
        assert_eq!(Token::Pipe.to_string(), "|");
        assert_eq!(Token::Or.to_string(), "||");
        assert_eq!(Token::Semicolon.to_string(), ";");
        assert_eq!(Token::LParen.to_string(), "(");
        assert_eq!(Token::RParen.to_string(), ")");
        assert_eq!(Token::RedirIn(Fd::STDIN).to_string(), "<");
        assert_eq!(Token::RedirOut(Fd::STDOUT).to_string(), ">");
        assert_eq!(Token::RedirAppend(Fd(2)).to_string(), ">>");
    }

    #[test]
    fn token_names() {
        assert_eq!(Token::Word(String::new()).name(), "word");
        assert_eq!(Token::RParen.name(), "right parenthesis");
        assert_eq!(Token::RedirAppend(Fd::STDOUT).name(), "redir append");
    }

    #[test]
    fn dropping_a_tree_drops_the_subtrees() {
        // Exclusive ownership: a deep tree must be releasable from the root
        // without touching the leaves first.
        let mut node = Node::Command(vec!["true".to_string()]);
        for _ in 0..1000 {
            node = Node::Background(Box::new(node));
        }
        drop(node);
    }
}
